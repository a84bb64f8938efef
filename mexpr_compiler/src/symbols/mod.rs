//! Per-compilation tables: constants, parameters and placeholder symbols

pub mod constants;
pub mod error;
pub mod parameters;
pub mod table;

pub use constants::{ConstantTable, CONSTANT_KEY_PREFIX};
pub use error::{SymbolError, SymbolResult};
pub use parameters::{is_placeholder_name, ParameterNode, ParameterRegistry};
pub use table::{ExpressionSymbol, SymbolTable, ROOT_KEY, SYMBOL_KEY_PREFIX};
