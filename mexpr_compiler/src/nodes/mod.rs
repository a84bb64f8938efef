//! Typed expression tree: values, type sets, operators, functions and the
//! builder that assembles them from extracted symbols

pub mod builder;
pub mod error;
pub mod functions;
pub mod node;
pub mod operations;
pub mod types;
pub mod value;

pub use builder::TreeBuilder;
pub use error::{BuildError, BuildResult};
pub use functions::{FunctionDefinition, FunctionLibrary};
pub use node::{ConstantNode, ExpressionNode};
pub use types::{TypeSet, ValueType};
pub use value::Value;
