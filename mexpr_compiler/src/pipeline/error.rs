use crate::grammar::SyntaxConfigError;
use crate::logging::codes;
use crate::logging::Code;
use crate::nodes::BuildError;
use crate::symbols::SymbolError;

pub type CompileResult<T> = Result<T, CompileError>;

/// Compilation errors; the first hard error stops the compilation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("Expression is empty")]
    EmptyExpression,

    #[error("Expression is {length} characters long (limit {limit})")]
    ExpressionTooLong { length: usize, limit: usize },

    #[error("Invalid syntax configuration: {0}")]
    Syntax(#[from] SyntaxConfigError),

    #[error("Symbol extraction failed: {0}")]
    Symbol(#[from] SymbolError),

    #[error("Tree construction failed: {0}")]
    Build(#[from] BuildError),
}

impl CompileError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::EmptyExpression => codes::input::EMPTY_EXPRESSION,
            Self::ExpressionTooLong { .. } => codes::input::EXPRESSION_TOO_LONG,
            Self::Syntax(error) => error.error_code(),
            Self::Symbol(error) => error.error_code(),
            Self::Build(error) => error.error_code(),
        }
    }

    /// Internal invariant violations; batch runs stop on these
    pub fn requires_halt(&self) -> bool {
        match self {
            Self::Symbol(error) => error.requires_halt(),
            Self::Build(error) => error.requires_halt(),
            _ => false,
        }
    }
}
