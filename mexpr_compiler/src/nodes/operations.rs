//! Operator typing and runtime semantics
//!
//! Static rules:
//!
//! - `+ - * %`: numeric operands give the wider type, at least integer;
//!   `+` also concatenates string+string and binary+binary
//! - `/` and `^`: numeric operands give float
//! - `& | #`: boolean pairs give boolean, boolean/integer mixes give
//!   integer (bitwise), binary pairs give binary
//! - `<< >>`: integer or binary on the left, integer on the right
//! - `= !=`: numeric, string or binary pairs give boolean
//! - `< <= > >=`: numeric or string pairs give boolean
//! - unary `-`: boolean/integer give integer, float gives float
//! - unary `!`: boolean, integer (bitwise) and binary keep their type

use super::types::{TypeSet, ValueType};
use super::value::Value;
use crate::computation::error::{EvaluationError, EvaluationResult};
use crate::config::compile_time::evaluation::MAX_SEQUENCE_LENGTH;
use crate::grammar::{BinaryOperator, UnaryOperator};
use std::cmp::Ordering;

// ============================================================================
// STATIC TYPING
// ============================================================================

pub fn binary_result_type(
    operator: BinaryOperator,
    left: ValueType,
    right: ValueType,
) -> Option<ValueType> {
    use BinaryOperator::*;
    use ValueType::*;

    match operator {
        Add => match (left, right) {
            (String, String) => Some(String),
            (Binary, Binary) => Some(Binary),
            _ => ValueType::arithmetic_promotion(left, right),
        },
        Subtract | Multiply | Modulo => ValueType::arithmetic_promotion(left, right),
        Divide | Power => ValueType::arithmetic_promotion(left, right).map(|_| Float),
        And | Or | Xor => match (left, right) {
            (Boolean, Boolean) => Some(Boolean),
            (Boolean | Integer, Boolean | Integer) => Some(Integer),
            (Binary, Binary) => Some(Binary),
            _ => None,
        },
        ShiftLeft | ShiftRight => match (left, right) {
            (Integer, Integer) => Some(Integer),
            (Binary, Integer) => Some(Binary),
            _ => None,
        },
        Equal | NotEqual => match (left, right) {
            (String, String) | (Binary, Binary) => Some(Boolean),
            _ if left.is_numeric() && right.is_numeric() => Some(Boolean),
            _ => None,
        },
        Less | LessEqual | Greater | GreaterEqual => match (left, right) {
            (String, String) => Some(Boolean),
            _ if left.is_numeric() && right.is_numeric() => Some(Boolean),
            _ => None,
        },
    }
}

pub fn unary_result_type(operator: UnaryOperator, operand: ValueType) -> Option<ValueType> {
    match (operator, operand) {
        (UnaryOperator::Negate, ValueType::Boolean | ValueType::Integer) => {
            Some(ValueType::Integer)
        }
        (UnaryOperator::Negate, ValueType::Float) => Some(ValueType::Float),
        (UnaryOperator::Not, ValueType::Boolean | ValueType::Integer | ValueType::Binary) => {
            Some(operand)
        }
        _ => None,
    }
}

/// Every type the operator can produce from the given operand sets
pub fn binary_result_types(operator: BinaryOperator, left: TypeSet, right: TypeSet) -> TypeSet {
    left.iter()
        .flat_map(|l| {
            right
                .iter()
                .filter_map(move |r| binary_result_type(operator, l, r))
        })
        .collect()
}

/// Left operand types that combine with at least one right operand type
pub fn accepted_left_types(operator: BinaryOperator, left: TypeSet, right: TypeSet) -> TypeSet {
    left.iter()
        .filter(|l| right.iter().any(|r| binary_result_type(operator, *l, r).is_some()))
        .collect()
}

/// Right operand types that combine with at least one left operand type
pub fn accepted_right_types(operator: BinaryOperator, left: TypeSet, right: TypeSet) -> TypeSet {
    right
        .iter()
        .filter(|r| left.iter().any(|l| binary_result_type(operator, l, *r).is_some()))
        .collect()
}

pub fn unary_result_types(operator: UnaryOperator, operand: TypeSet) -> TypeSet {
    operand
        .iter()
        .filter_map(|t| unary_result_type(operator, t))
        .collect()
}

pub fn accepted_unary_types(operator: UnaryOperator, operand: TypeSet) -> TypeSet {
    operand
        .iter()
        .filter(|t| unary_result_type(operator, *t).is_some())
        .collect()
}

// ============================================================================
// RUNTIME EVALUATION
// ============================================================================

pub fn evaluate_binary(operator: BinaryOperator, left: &Value, right: &Value) -> EvaluationResult<Value> {
    use BinaryOperator::*;

    let symbol = operator.as_str();
    let result_type = binary_result_type(operator, left.value_type(), right.value_type())
        .ok_or_else(|| {
            EvaluationError::incompatible_binary(symbol, left.value_type(), right.value_type())
        })?;

    match operator {
        Add | Subtract | Multiply | Modulo => match (left, right) {
            (Value::String(a), Value::String(b)) => {
                check_length(symbol, a.len() + b.len())?;
                Ok(Value::String(format!("{}{}", a, b)))
            }
            (Value::Binary(a), Value::Binary(b)) => {
                check_length(symbol, a.len() + b.len())?;
                Ok(Value::Binary([a.as_slice(), b.as_slice()].concat()))
            }
            _ if result_type == ValueType::Integer => integer_arithmetic(operator, left, right),
            _ => float_arithmetic(operator, left, right),
        },
        Divide => {
            let (a, b) = float_pair(symbol, left, right)?;
            if b == 0.0 {
                return Err(EvaluationError::division_by_zero(symbol));
            }
            Ok(Value::Float(a / b))
        }
        Power => {
            let (a, b) = float_pair(symbol, left, right)?;
            Ok(Value::Float(a.powf(b)))
        }
        And | Or | Xor => bitwise(operator, left, right),
        ShiftLeft | ShiftRight => shift(operator, left, right),
        Equal => Ok(Value::Boolean(equals(left, right))),
        NotEqual => Ok(Value::Boolean(!equals(left, right))),
        Less | LessEqual | Greater | GreaterEqual => {
            let ordering = compare(left, right).ok_or_else(|| {
                EvaluationError::incompatible_binary(symbol, left.value_type(), right.value_type())
            })?;
            let result = match operator {
                Less => ordering == Ordering::Less,
                LessEqual => ordering != Ordering::Greater,
                Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Boolean(result))
        }
    }
}

pub fn evaluate_unary(operator: UnaryOperator, operand: &Value) -> EvaluationResult<Value> {
    let symbol = operator.as_str();
    match (operator, operand) {
        (UnaryOperator::Negate, Value::Boolean(b)) => Ok(Value::Integer(-i64::from(*b))),
        (UnaryOperator::Negate, Value::Integer(i)) => i
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| EvaluationError::integer_overflow(symbol)),
        (UnaryOperator::Negate, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOperator::Not, Value::Integer(i)) => Ok(Value::Integer(!i)),
        (UnaryOperator::Not, Value::Binary(bytes)) => {
            Ok(Value::Binary(bytes.iter().map(|b| !b).collect()))
        }
        _ => Err(EvaluationError::incompatible_unary(symbol, operand.value_type())),
    }
}

fn check_length(operator: &str, length: usize) -> EvaluationResult<()> {
    if length > MAX_SEQUENCE_LENGTH {
        return Err(EvaluationError::SequenceTooLong {
            operator: operator.to_string(),
            length,
            limit: MAX_SEQUENCE_LENGTH,
        });
    }
    Ok(())
}

fn integer_pair(operator: &str, left: &Value, right: &Value) -> EvaluationResult<(i64, i64)> {
    match (left.as_i64(), right.as_i64()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(EvaluationError::incompatible_binary(
            operator,
            left.value_type(),
            right.value_type(),
        )),
    }
}

fn float_pair(operator: &str, left: &Value, right: &Value) -> EvaluationResult<(f64, f64)> {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(EvaluationError::incompatible_binary(
            operator,
            left.value_type(),
            right.value_type(),
        )),
    }
}

fn integer_arithmetic(operator: BinaryOperator, left: &Value, right: &Value) -> EvaluationResult<Value> {
    let symbol = operator.as_str();
    let (a, b) = integer_pair(symbol, left, right)?;

    let result = match operator {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Subtract => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Modulo => {
            if b == 0 {
                return Err(EvaluationError::division_by_zero(symbol));
            }
            // i64::MIN % -1 is mathematically 0
            Some(a.wrapping_rem(b))
        }
        _ => None,
    };

    result
        .map(Value::Integer)
        .ok_or_else(|| EvaluationError::integer_overflow(symbol))
}

fn float_arithmetic(operator: BinaryOperator, left: &Value, right: &Value) -> EvaluationResult<Value> {
    let symbol = operator.as_str();
    let (a, b) = float_pair(symbol, left, right)?;

    let result = match operator {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Modulo => {
            if b == 0.0 {
                return Err(EvaluationError::division_by_zero(symbol));
            }
            a % b
        }
        _ => {
            return Err(EvaluationError::incompatible_binary(
                symbol,
                left.value_type(),
                right.value_type(),
            ))
        }
    };

    Ok(Value::Float(result))
}

fn bitwise(operator: BinaryOperator, left: &Value, right: &Value) -> EvaluationResult<Value> {
    let combine = |a: u8, b: u8| match operator {
        BinaryOperator::And => a & b,
        BinaryOperator::Or => a | b,
        _ => a ^ b,
    };

    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => {
            Ok(Value::Boolean(combine(u8::from(*a), u8::from(*b)) != 0))
        }
        (Value::Binary(a), Value::Binary(b)) => {
            let width = a.len().max(b.len());
            let (a, b) = (left_pad(a, width), left_pad(b, width));
            Ok(Value::Binary(
                a.iter().zip(b.iter()).map(|(x, y)| combine(*x, *y)).collect(),
            ))
        }
        _ => {
            let (a, b) = integer_pair(operator.as_str(), left, right)?;
            let result = match operator {
                BinaryOperator::And => a & b,
                BinaryOperator::Or => a | b,
                _ => a ^ b,
            };
            Ok(Value::Integer(result))
        }
    }
}

fn left_pad(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut padded = vec![0u8; width - bytes.len()];
    padded.extend_from_slice(bytes);
    padded
}

fn shift(operator: BinaryOperator, left: &Value, right: &Value) -> EvaluationResult<Value> {
    let amount = match right {
        Value::Integer(n) => *n,
        _ => {
            return Err(EvaluationError::incompatible_binary(
                operator.as_str(),
                left.value_type(),
                right.value_type(),
            ))
        }
    };
    if !(0..=63).contains(&amount) {
        return Err(EvaluationError::ShiftOutOfRange { amount });
    }
    let amount = amount as u32;

    match left {
        Value::Integer(i) => Ok(Value::Integer(match operator {
            BinaryOperator::ShiftLeft => i << amount,
            _ => i >> amount,
        })),
        Value::Binary(bytes) => Ok(Value::Binary(match operator {
            BinaryOperator::ShiftLeft => shift_bytes_left(bytes, amount as usize),
            _ => shift_bytes_right(bytes, amount as usize),
        })),
        _ => Err(EvaluationError::incompatible_binary(
            operator.as_str(),
            left.value_type(),
            right.value_type(),
        )),
    }
}

/// Shift a big-endian bit string left, keeping its length
fn shift_bytes_left(bytes: &[u8], amount: usize) -> Vec<u8> {
    let (byte_shift, bit_shift) = (amount / 8, (amount % 8) as u32);
    let at = |index: usize| bytes.get(index).copied().unwrap_or(0);

    (0..bytes.len())
        .map(|i| {
            let high = at(i + byte_shift) << bit_shift;
            let low = if bit_shift == 0 {
                0
            } else {
                at(i + byte_shift + 1) >> (8 - bit_shift)
            };
            high | low
        })
        .collect()
}

/// Shift a big-endian bit string right, keeping its length
fn shift_bytes_right(bytes: &[u8], amount: usize) -> Vec<u8> {
    let (byte_shift, bit_shift) = (amount / 8, (amount % 8) as u32);
    let at = |index: usize| {
        index
            .checked_sub(byte_shift)
            .and_then(|source| bytes.get(source).copied())
            .unwrap_or(0)
    };

    (0..bytes.len())
        .map(|i| {
            let low = at(i) >> bit_shift;
            let high = if bit_shift == 0 || i == 0 {
                0
            } else {
                at(i - 1) << (8 - bit_shift)
            };
            high | low
        })
        .collect()
}

/// Equality across the numeric lattice, or within string/binary
pub fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Binary(a), Value::Binary(b)) => a == b,
        _ => compare(left, right) == Some(Ordering::Equal),
    }
}

/// Ordering across the numeric lattice, or between strings
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            left.as_f64()?.partial_cmp(&right.as_f64()?)
        }
        _ => Some(left.as_i64()?.cmp(&right.as_i64()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use BinaryOperator::*;

    fn eval(op: BinaryOperator, a: Value, b: Value) -> EvaluationResult<Value> {
        evaluate_binary(op, &a, &b)
    }

    #[test]
    fn test_static_arithmetic_rules() {
        use ValueType::*;
        assert_eq!(binary_result_type(Add, Integer, Integer), Some(Integer));
        assert_eq!(binary_result_type(Add, Boolean, Boolean), Some(Integer));
        assert_eq!(binary_result_type(Multiply, Integer, Float), Some(Float));
        assert_eq!(binary_result_type(Divide, Integer, Integer), Some(Float));
        assert_eq!(binary_result_type(Power, Integer, Integer), Some(Float));
        assert_eq!(binary_result_type(Add, String, String), Some(String));
        assert_eq!(binary_result_type(Subtract, String, String), None);
        assert_eq!(binary_result_type(Add, String, Integer), None);
    }

    #[test]
    fn test_static_logical_rules() {
        use ValueType::*;
        assert_eq!(binary_result_type(And, Boolean, Boolean), Some(Boolean));
        assert_eq!(binary_result_type(Or, Boolean, Integer), Some(Integer));
        assert_eq!(binary_result_type(Xor, Binary, Binary), Some(Binary));
        assert_eq!(binary_result_type(And, Float, Integer), None);
        assert_eq!(binary_result_type(ShiftLeft, Binary, Integer), Some(Binary));
        assert_eq!(binary_result_type(ShiftLeft, Integer, Boolean), None);
        assert_eq!(binary_result_type(Equal, Binary, Binary), Some(Boolean));
        assert_eq!(binary_result_type(Less, Binary, Binary), None);
        assert_eq!(unary_result_type(UnaryOperator::Negate, Boolean), Some(Integer));
        assert_eq!(unary_result_type(UnaryOperator::Not, Float), None);
    }

    #[test]
    fn test_operand_narrowing_sets() {
        let accepted = accepted_left_types(Subtract, TypeSet::ANY, TypeSet::ANY);
        assert_eq!(accepted, TypeSet::NUMERIC);

        let accepted = accepted_left_types(Add, TypeSet::ANY, TypeSet::STRING);
        assert_eq!(accepted, TypeSet::STRING);

        let results = binary_result_types(Add, TypeSet::INTEGER, TypeSet::NUMERIC);
        assert_eq!(results, TypeSet::INTEGER.union(TypeSet::FLOAT));

        assert!(binary_result_types(Subtract, TypeSet::STRING, TypeSet::ANY).is_empty());
    }

    #[test]
    fn test_integer_division_is_exact_float() {
        assert_eq!(
            eval(Divide, Value::Integer(7), Value::Integer(2)),
            Ok(Value::Float(3.5))
        );
        assert_eq!(
            eval(Divide, Value::Integer(6), Value::Integer(3)),
            Ok(Value::Float(2.0))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_matches!(
            eval(Divide, Value::Integer(1), Value::Integer(0)),
            Err(EvaluationError::DivisionByZero { .. })
        );
        assert_matches!(
            eval(Modulo, Value::Float(1.0), Value::Float(0.0)),
            Err(EvaluationError::DivisionByZero { .. })
        );
        assert_matches!(
            eval(Modulo, Value::Integer(5), Value::Integer(0)),
            Err(EvaluationError::DivisionByZero { .. })
        );
    }

    #[test]
    fn test_checked_integer_arithmetic() {
        assert_matches!(
            eval(Add, Value::Integer(i64::MAX), Value::Integer(1)),
            Err(EvaluationError::IntegerOverflow { .. })
        );
        assert_eq!(
            eval(Modulo, Value::Integer(i64::MIN), Value::Integer(-1)),
            Ok(Value::Integer(0))
        );
        assert_eq!(
            eval(Add, Value::Boolean(true), Value::Boolean(true)),
            Ok(Value::Integer(2))
        );
        assert_matches!(
            evaluate_unary(UnaryOperator::Negate, &Value::Integer(i64::MIN)),
            Err(EvaluationError::IntegerOverflow { .. })
        );
    }

    #[test]
    fn test_bitwise_and_shift() {
        assert_eq!(
            eval(And, Value::Boolean(true), Value::Boolean(false)),
            Ok(Value::Boolean(false))
        );
        assert_eq!(
            eval(Or, Value::Integer(0b1010), Value::Boolean(true)),
            Ok(Value::Integer(0b1011))
        );
        assert_eq!(
            eval(Xor, Value::Binary(vec![0x0F]), Value::Binary(vec![0x01, 0xFF])),
            Ok(Value::Binary(vec![0x01, 0xF0]))
        );
        assert_eq!(
            eval(ShiftLeft, Value::Integer(1), Value::Integer(4)),
            Ok(Value::Integer(16))
        );
        assert_eq!(
            eval(ShiftLeft, Value::Binary(vec![0x01, 0x80]), Value::Integer(1)),
            Ok(Value::Binary(vec![0x03, 0x00]))
        );
        assert_eq!(
            eval(ShiftRight, Value::Binary(vec![0x01, 0x00]), Value::Integer(9)),
            Ok(Value::Binary(vec![0x00, 0x00]))
        );
        assert_eq!(
            eval(ShiftRight, Value::Binary(vec![0x03, 0x00]), Value::Integer(1)),
            Ok(Value::Binary(vec![0x01, 0x80]))
        );
        assert_matches!(
            eval(ShiftLeft, Value::Integer(1), Value::Integer(64)),
            Err(EvaluationError::ShiftOutOfRange { amount: 64 })
        );
    }

    #[test]
    fn test_comparisons_across_lattice() {
        assert_eq!(
            eval(Equal, Value::Integer(1), Value::Float(1.0)),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            eval(Less, Value::Boolean(false), Value::Integer(1)),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            eval(GreaterEqual, Value::String("b".into()), Value::String("a".into())),
            Ok(Value::Boolean(true))
        );
        assert_matches!(
            eval(Less, Value::String("a".into()), Value::Integer(1)),
            Err(EvaluationError::IncompatibleOperandTypes { .. })
        );
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(
            eval(Add, Value::String("ab".into()), Value::String("cd".into())),
            Ok(Value::String("abcd".into()))
        );
        assert_eq!(
            eval(Add, Value::Binary(vec![1]), Value::Binary(vec![2])),
            Ok(Value::Binary(vec![1, 2]))
        );
    }
}
