//! Error types for the constant, parameter and symbol tables

use crate::logging::codes;
use crate::logging::Code;
use crate::nodes::TypeSet;

/// Result type for table operations
pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SymbolError {
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error("Symbol key '{key}' is already registered")]
    DuplicateSymbolKey { key: String },

    #[error("Symbol key '{key}' is not registered")]
    UnknownSymbolKey { key: String },

    #[error("The {table} table is full (limit {limit})")]
    LimitExceeded { table: &'static str, limit: usize },

    #[error("Nesting depth {depth} exceeds the limit of {max}")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("Parameter '{name}' is used as {existing} and as {requested}")]
    ConflictingParameterType {
        name: String,
        existing: TypeSet,
        requested: TypeSet,
    },
}

impl SymbolError {
    pub fn invalid_identifier(name: &str, reason: &str) -> Self {
        Self::InvalidIdentifier {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn duplicate_key(key: &str) -> Self {
        Self::DuplicateSymbolKey {
            key: key.to_string(),
        }
    }

    pub fn unknown_key(key: &str) -> Self {
        Self::UnknownSymbolKey {
            key: key.to_string(),
        }
    }

    /// Internal invariant violations; the compilation cannot be trusted
    pub fn requires_halt(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSymbolKey { .. } | Self::UnknownSymbolKey { .. }
        )
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::InvalidIdentifier { .. } => codes::extraction::INVALID_IDENTIFIER,
            Self::DuplicateSymbolKey { .. } => codes::extraction::DUPLICATE_SYMBOL_KEY,
            Self::UnknownSymbolKey { .. } => codes::extraction::UNKNOWN_SYMBOL_KEY,
            Self::LimitExceeded { .. } => codes::extraction::LIMIT_EXCEEDED,
            Self::NestingTooDeep { .. } => codes::extraction::NESTING_TOO_DEEP,
            Self::ConflictingParameterType { .. } => codes::extraction::CONFLICTING_PARAMETER_TYPE,
        }
    }
}
