//! Operator table for expression text
//!
//! Binary operators, lowest precedence first:
//!
//! | level | operators              |
//! |-------|------------------------|
//! | 1     | `\|` or                |
//! | 2     | `#` xor                |
//! | 3     | `&` and                |
//! | 4     | `=` `!=`               |
//! | 5     | `<` `<=` `>` `>=`      |
//! | 6     | `<<` `>>`              |
//! | 7     | `+` `-`                |
//! | 8     | `*` `/` `%`            |
//! | 9     | `^` (right-associative)|
//!
//! Unary `-` and `!` bind tighter than every binary operator except `^`,
//! so `-2^2` is `-(2^2)`.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Or,
    Xor,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 17] = [
        Self::Or,
        Self::Xor,
        Self::And,
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessEqual,
        Self::Greater,
        Self::GreaterEqual,
        Self::ShiftLeft,
        Self::ShiftRight,
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
        Self::Power,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Or => "|",
            Self::Xor => "#",
            Self::And => "&",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "^",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == symbol)
    }

    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::Xor => 2,
            Self::And => 3,
            Self::Equal | Self::NotEqual => 4,
            Self::Less | Self::LessEqual | Self::Greater | Self::GreaterEqual => 5,
            Self::ShiftLeft | Self::ShiftRight => 6,
            Self::Add | Self::Subtract => 7,
            Self::Multiply | Self::Divide | Self::Modulo => 8,
            Self::Power => 9,
        }
    }

    pub const fn is_right_associative(self) -> bool {
        matches!(self, Self::Power)
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
        )
    }

    pub const fn is_bitwise(self) -> bool {
        matches!(self, Self::Or | Self::Xor | Self::And)
    }

    pub const fn is_shift(self) -> bool {
        matches!(self, Self::ShiftLeft | Self::ShiftRight)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl UnaryOperator {
    pub const ALL: [UnaryOperator; 2] = [Self::Negate, Self::Not];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == symbol)
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precedence at which the operand of a unary operator is parsed
pub const UNARY_OPERAND_PRECEDENCE: u8 = BinaryOperator::Power.precedence();

/// Every distinct operator symbol, binary and unary
pub fn operator_symbols() -> Vec<&'static str> {
    let mut symbols: Vec<&'static str> = BinaryOperator::ALL.iter().map(|op| op.as_str()).collect();
    for op in UnaryOperator::ALL {
        if !symbols.contains(&op.as_str()) {
            symbols.push(op.as_str());
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(BinaryOperator::from_symbol("<="), Some(BinaryOperator::LessEqual));
        assert_eq!(BinaryOperator::from_symbol("#"), Some(BinaryOperator::Xor));
        assert_eq!(BinaryOperator::from_symbol("!"), None);
        assert_eq!(UnaryOperator::from_symbol("!"), Some(UnaryOperator::Not));
        assert_eq!(UnaryOperator::from_symbol("-"), Some(UnaryOperator::Negate));
    }

    #[test]
    fn test_precedence_ordering() {
        assert!(BinaryOperator::Or.precedence() < BinaryOperator::Xor.precedence());
        assert!(BinaryOperator::Xor.precedence() < BinaryOperator::And.precedence());
        assert!(BinaryOperator::Equal.precedence() < BinaryOperator::Less.precedence());
        assert!(BinaryOperator::ShiftLeft.precedence() < BinaryOperator::Add.precedence());
        assert!(BinaryOperator::Add.precedence() < BinaryOperator::Multiply.precedence());
        assert!(BinaryOperator::Multiply.precedence() < BinaryOperator::Power.precedence());
        assert!(BinaryOperator::Power.is_right_associative());
        assert!(!BinaryOperator::Subtract.is_right_associative());
    }

    #[test]
    fn test_operator_symbols_include_unary_not() {
        let symbols = operator_symbols();
        assert_eq!(symbols.len(), 18);
        assert!(symbols.contains(&"!"));
        assert!(symbols.contains(&"!="));
    }
}
