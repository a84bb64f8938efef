use crate::logging::codes;
use crate::logging::Code;
use crate::nodes::{TypeSet, ValueType};

/// Failures while evaluating a compiled expression
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("No value bound for parameter '{name}'")]
    MissingParameter { name: String },

    #[error("Parameter '{name}' expects {expected} but was bound to {actual}")]
    ParameterTypeMismatch {
        name: String,
        expected: TypeSet,
        actual: ValueType,
    },

    #[error("Expected {expected} positional values, got {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    #[error("Division by zero in '{operator}'")]
    DivisionByZero { operator: String },

    #[error("Integer overflow in '{operator}'")]
    IntegerOverflow { operator: String },

    #[error("Shift amount {amount} is outside 0..=63")]
    ShiftOutOfRange { amount: i64 },

    #[error("Invalid argument to {function}: {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error("Operator '{operator}' cannot combine {left} and {right}")]
    IncompatibleOperandTypes {
        operator: String,
        left: ValueType,
        right: String,
    },

    #[error("Result of '{operator}' would hold {length} bytes (limit {limit})")]
    SequenceTooLong {
        operator: String,
        length: usize,
        limit: usize,
    },
}

impl EvaluationError {
    pub fn division_by_zero(operator: &str) -> Self {
        Self::DivisionByZero {
            operator: operator.to_string(),
        }
    }

    pub fn integer_overflow(operator: &str) -> Self {
        Self::IntegerOverflow {
            operator: operator.to_string(),
        }
    }

    pub fn invalid_argument(function: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function: function.to_string(),
            reason: reason.into(),
        }
    }

    pub fn incompatible_binary(operator: &str, left: ValueType, right: ValueType) -> Self {
        Self::IncompatibleOperandTypes {
            operator: operator.to_string(),
            left,
            right: right.to_string(),
        }
    }

    pub fn incompatible_unary(operator: &str, operand: ValueType) -> Self {
        Self::IncompatibleOperandTypes {
            operator: operator.to_string(),
            left: operand,
            right: "nothing".to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::MissingParameter { .. } => codes::evaluation::MISSING_PARAMETER,
            Self::ParameterTypeMismatch { .. } => codes::evaluation::PARAMETER_TYPE_MISMATCH,
            Self::ParameterCountMismatch { .. } => codes::evaluation::PARAMETER_COUNT_MISMATCH,
            Self::DivisionByZero { .. } => codes::evaluation::DIVISION_BY_ZERO,
            Self::IntegerOverflow { .. } => codes::evaluation::INTEGER_OVERFLOW,
            Self::ShiftOutOfRange { .. } => codes::evaluation::SHIFT_OUT_OF_RANGE,
            Self::InvalidArgument { .. } => codes::evaluation::INVALID_ARGUMENT,
            Self::IncompatibleOperandTypes { .. } => codes::evaluation::RUNTIME_TYPE_ERROR,
            Self::SequenceTooLong { .. } => codes::evaluation::SEQUENCE_TOO_LONG,
        }
    }
}

pub type EvaluationResult<T> = Result<T, EvaluationError>;
