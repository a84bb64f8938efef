//! Grammar of expression text: operators, literals, structural tokens

pub mod literals;
pub mod operators;
pub mod syntax;
pub mod tokenizer;

pub use literals::LiteralPolicy;
pub use operators::{BinaryOperator, UnaryOperator};
pub use syntax::{ExpressionSyntax, SymbolRole, SyntaxConfigError};
pub use tokenizer::{tokenize, Token, TokenKind};
