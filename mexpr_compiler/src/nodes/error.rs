use crate::logging::codes;
use crate::logging::Code;
use crate::nodes::TypeSet;
use crate::symbols::SymbolError;

pub type BuildResult<T> = Result<T, BuildError>;

/// Failures while turning extracted symbols into a typed tree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("Operator '{operator}' cannot combine {left} and {right} in '{expression}'")]
    IncompatibleOperandTypes {
        operator: String,
        left: TypeSet,
        right: TypeSet,
        expression: String,
    },

    #[error("Operator '{operator}' cannot be applied to {operand} in '{expression}'")]
    IncompatibleUnaryOperand {
        operator: String,
        operand: TypeSet,
        expression: String,
    },

    #[error("Unknown function '{name}' taking {arity} arguments")]
    UnknownFunction { name: String, arity: usize },

    #[error("Argument {index} of '{function}' cannot be {types}")]
    IncompatibleArgumentType {
        function: String,
        index: usize,
        types: TypeSet,
    },

    #[error("Malformed expression '{expression}': {reason}")]
    MalformedExpression { expression: String, reason: String },

    #[error("Symbol '{key}' refers to itself")]
    CircularSymbolReference { key: String },

    #[error("Symbol '{key}' is referenced but not registered")]
    UnknownSymbol { key: String },

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

impl BuildError {
    pub fn malformed(expression: &str, reason: impl Into<String>) -> Self {
        Self::MalformedExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        match self {
            Self::CircularSymbolReference { .. } | Self::UnknownSymbol { .. } => true,
            Self::Symbol(error) => error.requires_halt(),
            _ => false,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::IncompatibleOperandTypes { .. } | Self::IncompatibleUnaryOperand { .. } => {
                codes::build::INCOMPATIBLE_OPERAND_TYPES
            }
            Self::UnknownFunction { .. } => codes::build::UNKNOWN_FUNCTION,
            Self::IncompatibleArgumentType { .. } => codes::build::INCOMPATIBLE_ARGUMENT,
            Self::MalformedExpression { .. } => codes::build::MALFORMED_EXPRESSION,
            Self::CircularSymbolReference { .. } => codes::build::CIRCULAR_SYMBOL_REFERENCE,
            Self::UnknownSymbol { .. } => codes::extraction::UNKNOWN_SYMBOL_KEY,
            Self::Symbol(error) => error.error_code(),
        }
    }
}
