//! Function library resolved by case-insensitive name and arity

use super::types::{TypeSet, ValueType};
use super::value::Value;
use crate::computation::error::{EvaluationError, EvaluationResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Result type of a call given concrete argument types, `None` if the
/// combination is not accepted
pub type ResultTypeRule = fn(&[ValueType]) -> Option<ValueType>;

pub type Implementation = fn(&[Value]) -> EvaluationResult<Value>;

pub struct FunctionDefinition {
    pub name: String,
    pub parameters: Vec<TypeSet>,
    pub result: ResultTypeRule,
    pub implementation: Implementation,
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl FunctionDefinition {
    pub fn new(
        name: &str,
        parameters: Vec<TypeSet>,
        result: ResultTypeRule,
        implementation: Implementation,
    ) -> Self {
        Self {
            name: name.to_lowercase(),
            parameters,
            result,
            implementation,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Every concrete argument type combination allowed by the declared
    /// parameter sets and the given argument sets
    fn combinations(&self, arguments: &[TypeSet]) -> Vec<Vec<ValueType>> {
        let mut combos: Vec<Vec<ValueType>> = vec![Vec::new()];
        for (declared, actual) in self.parameters.iter().zip(arguments) {
            let allowed = declared.intersection(*actual);
            combos = combos
                .into_iter()
                .flat_map(|prefix| {
                    allowed.iter().map(move |t| {
                        let mut next = prefix.clone();
                        next.push(t);
                        next
                    })
                })
                .collect();
        }
        combos
    }

    pub fn result_types(&self, arguments: &[TypeSet]) -> TypeSet {
        if arguments.len() != self.arity() {
            return TypeSet::EMPTY;
        }
        self.combinations(arguments)
            .iter()
            .filter_map(|combo| (self.result)(combo.as_slice()))
            .collect()
    }

    /// Types of argument `index` that take part in at least one valid call
    pub fn accepted_argument_types(&self, index: usize, arguments: &[TypeSet]) -> TypeSet {
        if arguments.len() != self.arity() {
            return TypeSet::EMPTY;
        }
        self.combinations(arguments)
            .iter()
            .filter(|combo| (self.result)(combo.as_slice()).is_some())
            .filter_map(|combo| combo.get(index).copied())
            .collect()
    }

    pub fn invoke(&self, arguments: &[Value]) -> EvaluationResult<Value> {
        if arguments.len() != self.arity() {
            return Err(EvaluationError::invalid_argument(
                &self.name,
                format!("expected {} arguments, got {}", self.arity(), arguments.len()),
            ));
        }

        for (index, (declared, value)) in self.parameters.iter().zip(arguments).enumerate() {
            if !declared.contains(value.value_type()) {
                return Err(EvaluationError::invalid_argument(
                    &self.name,
                    format!(
                        "argument {} is {}, expected {}",
                        index + 1,
                        value.value_type(),
                        declared
                    ),
                ));
            }
        }

        let types: Vec<ValueType> = arguments.iter().map(Value::value_type).collect();
        if (self.result)(&types).is_none() {
            return Err(EvaluationError::invalid_argument(
                &self.name,
                "unsupported argument combination",
            ));
        }

        (self.implementation)(arguments)
    }
}

/// Registry of callable functions
#[derive(Debug, Clone, Default)]
pub struct FunctionLibrary {
    functions: HashMap<(String, usize), Arc<FunctionDefinition>>,
}

impl FunctionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the built-in math and string functions
    pub fn standard() -> Self {
        let mut library = Self::new();
        builtins::register_all(&mut library);
        library
    }

    /// Add or replace a function; returns the definition it replaced
    pub fn register(&mut self, definition: FunctionDefinition) -> Option<Arc<FunctionDefinition>> {
        let key = (definition.name.clone(), definition.arity());
        self.functions.insert(key, Arc::new(definition))
    }

    pub fn lookup(&self, name: &str, arity: usize) -> Option<Arc<FunctionDefinition>> {
        self.functions.get(&(name.to_lowercase(), arity)).cloned()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.functions.keys().any(|(n, _)| *n == name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Sorted `name/arity` signatures
    pub fn signatures(&self) -> Vec<String> {
        let mut signatures: Vec<String> = self
            .functions
            .keys()
            .map(|(name, arity)| format!("{}/{}", name, arity))
            .collect();
        signatures.sort();
        signatures
    }
}

mod builtins {
    use super::*;

    const NUMERIC: TypeSet = TypeSet::NUMERIC;
    const TEXT_OR_BYTES: TypeSet = TypeSet::STRING.union(TypeSet::BINARY);

    pub(super) fn register_all(library: &mut FunctionLibrary) {
        let float_functions: [(&str, Implementation); 10] = [
            ("sqrt", sqrt),
            ("sin", |a| unary_float("sin", a, f64::sin)),
            ("cos", |a| unary_float("cos", a, f64::cos)),
            ("tan", |a| unary_float("tan", a, f64::tan)),
            ("asin", asin),
            ("acos", acos),
            ("atan", |a| unary_float("atan", a, f64::atan)),
            ("exp", |a| unary_float("exp", a, f64::exp)),
            ("ln", ln),
            ("lg", lg),
        ];
        for (name, implementation) in float_functions {
            library.register(FunctionDefinition::new(name, vec![NUMERIC], always_float, implementation));
        }

        let rounding: [(&str, Implementation); 4] = [
            ("floor", |a| rounding_op(a, f64::floor)),
            ("ceiling", |a| rounding_op(a, f64::ceil)),
            ("round", |a| rounding_op(a, f64::round)),
            ("truncate", |a| rounding_op(a, f64::trunc)),
        ];
        for (name, implementation) in rounding {
            library.register(FunctionDefinition::new(name, vec![NUMERIC], keep_numeric, implementation));
        }

        library.register(FunctionDefinition::new("abs", vec![NUMERIC], keep_numeric, abs));
        library.register(FunctionDefinition::new("min", vec![NUMERIC, NUMERIC], widest_numeric, min));
        library.register(FunctionDefinition::new("max", vec![NUMERIC, NUMERIC], widest_numeric, max));
        library.register(FunctionDefinition::new("pow", vec![NUMERIC, NUMERIC], always_float, pow));
        library.register(FunctionDefinition::new("log", vec![NUMERIC, NUMERIC], always_float, log));
        library.register(FunctionDefinition::new(
            "strlen",
            vec![TEXT_OR_BYTES],
            |_| Some(ValueType::Integer),
            strlen,
        ));
        library.register(FunctionDefinition::new(
            "substring",
            vec![TypeSet::STRING, TypeSet::INTEGER],
            |_| Some(ValueType::String),
            substring,
        ));
        library.register(FunctionDefinition::new(
            "substring",
            vec![TypeSet::STRING, TypeSet::INTEGER, TypeSet::INTEGER],
            |_| Some(ValueType::String),
            substring,
        ));
        library.register(FunctionDefinition::new(
            "trim",
            vec![TypeSet::STRING],
            |_| Some(ValueType::String),
            trim,
        ));
    }

    // Result type rules

    fn always_float(_: &[ValueType]) -> Option<ValueType> {
        Some(ValueType::Float)
    }

    /// Booleans and integers give integer, floats stay float
    fn keep_numeric(types: &[ValueType]) -> Option<ValueType> {
        ValueType::arithmetic_promotion(types[0], types[0])
    }

    fn widest_numeric(types: &[ValueType]) -> Option<ValueType> {
        ValueType::arithmetic_promotion(types[0], types[1])
    }

    // Implementations

    fn float_arg(function: &str, value: &Value) -> EvaluationResult<f64> {
        value
            .as_f64()
            .ok_or_else(|| EvaluationError::invalid_argument(function, "expected a number"))
    }

    fn finite(function: &str, result: f64) -> EvaluationResult<Value> {
        if result.is_finite() {
            Ok(Value::Float(result))
        } else {
            Err(EvaluationError::invalid_argument(function, "result is not finite"))
        }
    }

    fn unary_float(function: &str, args: &[Value], op: fn(f64) -> f64) -> EvaluationResult<Value> {
        finite(function, op(float_arg(function, &args[0])?))
    }

    fn sqrt(args: &[Value]) -> EvaluationResult<Value> {
        let x = float_arg("sqrt", &args[0])?;
        if x < 0.0 {
            return Err(EvaluationError::invalid_argument("sqrt", "argument is negative"));
        }
        Ok(Value::Float(x.sqrt()))
    }

    fn asin(args: &[Value]) -> EvaluationResult<Value> {
        let x = float_arg("asin", &args[0])?;
        if !(-1.0..=1.0).contains(&x) {
            return Err(EvaluationError::invalid_argument("asin", "argument is outside [-1, 1]"));
        }
        Ok(Value::Float(x.asin()))
    }

    fn acos(args: &[Value]) -> EvaluationResult<Value> {
        let x = float_arg("acos", &args[0])?;
        if !(-1.0..=1.0).contains(&x) {
            return Err(EvaluationError::invalid_argument("acos", "argument is outside [-1, 1]"));
        }
        Ok(Value::Float(x.acos()))
    }

    fn ln(args: &[Value]) -> EvaluationResult<Value> {
        let x = float_arg("ln", &args[0])?;
        if x <= 0.0 {
            return Err(EvaluationError::invalid_argument("ln", "argument is not positive"));
        }
        Ok(Value::Float(x.ln()))
    }

    fn lg(args: &[Value]) -> EvaluationResult<Value> {
        let x = float_arg("lg", &args[0])?;
        if x <= 0.0 {
            return Err(EvaluationError::invalid_argument("lg", "argument is not positive"));
        }
        Ok(Value::Float(x.log10()))
    }

    fn log(args: &[Value]) -> EvaluationResult<Value> {
        let x = float_arg("log", &args[0])?;
        let base = float_arg("log", &args[1])?;
        if x <= 0.0 {
            return Err(EvaluationError::invalid_argument("log", "argument is not positive"));
        }
        if base <= 0.0 || base == 1.0 {
            return Err(EvaluationError::invalid_argument("log", "base must be positive and not 1"));
        }
        Ok(Value::Float(x.log(base)))
    }

    fn pow(args: &[Value]) -> EvaluationResult<Value> {
        let x = float_arg("pow", &args[0])?;
        let y = float_arg("pow", &args[1])?;
        Ok(Value::Float(x.powf(y)))
    }

    fn rounding_op(args: &[Value], op: fn(f64) -> f64) -> EvaluationResult<Value> {
        match &args[0] {
            Value::Float(x) => Ok(Value::Float(op(*x))),
            other => Ok(Value::Integer(other.as_i64().unwrap_or_default())),
        }
    }

    fn abs(args: &[Value]) -> EvaluationResult<Value> {
        match &args[0] {
            Value::Float(x) => Ok(Value::Float(x.abs())),
            other => {
                let i = other.as_i64().unwrap_or_default();
                i.checked_abs()
                    .map(Value::Integer)
                    .ok_or_else(|| EvaluationError::integer_overflow("abs"))
            }
        }
    }

    fn pick(args: &[Value], take_right: fn(std::cmp::Ordering) -> bool) -> EvaluationResult<Value> {
        let target = ValueType::arithmetic_promotion(args[0].value_type(), args[1].value_type())
            .ok_or_else(|| EvaluationError::invalid_argument("min/max", "expected numbers"))?;
        let left = args[0].promote_to(target);
        let right = args[1].promote_to(target);
        match (left, right) {
            (Some(left), Some(right)) => {
                let ordering = crate::nodes::operations::compare(&left, &right)
                    .unwrap_or(std::cmp::Ordering::Equal);
                Ok(if take_right(ordering) { right } else { left })
            }
            _ => Err(EvaluationError::invalid_argument("min/max", "expected numbers")),
        }
    }

    fn min(args: &[Value]) -> EvaluationResult<Value> {
        pick(args, |ordering| ordering == std::cmp::Ordering::Greater)
    }

    fn max(args: &[Value]) -> EvaluationResult<Value> {
        pick(args, |ordering| ordering == std::cmp::Ordering::Less)
    }

    fn strlen(args: &[Value]) -> EvaluationResult<Value> {
        match &args[0] {
            Value::String(s) => Ok(Value::Integer(s.chars().count() as i64)),
            Value::Binary(bytes) => Ok(Value::Integer(bytes.len() as i64)),
            _ => Err(EvaluationError::invalid_argument("strlen", "expected string or binary")),
        }
    }

    fn substring(args: &[Value]) -> EvaluationResult<Value> {
        let text = args[0]
            .as_str()
            .ok_or_else(|| EvaluationError::invalid_argument("substring", "expected a string"))?;
        let total = text.chars().count() as i64;

        let start = args[1].as_i64().unwrap_or_default();
        if start < 0 || start > total {
            return Err(EvaluationError::invalid_argument(
                "substring",
                format!("start {} is outside 0..={}", start, total),
            ));
        }

        let length = match args.get(2) {
            Some(value) => value.as_i64().unwrap_or_default(),
            None => total - start,
        };
        if length < 0 || start + length > total {
            return Err(EvaluationError::invalid_argument(
                "substring",
                format!("length {} exceeds the remaining {} characters", length, total - start),
            ));
        }

        Ok(Value::String(
            text.chars().skip(start as usize).take(length as usize).collect(),
        ))
    }

    fn trim(args: &[Value]) -> EvaluationResult<Value> {
        args[0]
            .as_str()
            .map(|s| Value::String(s.trim().to_string()))
            .ok_or_else(|| EvaluationError::invalid_argument("trim", "expected a string"))
    }
}
