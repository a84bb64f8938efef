// Internal modules
pub mod config;
#[macro_use]
pub mod logging;
pub mod batch;
pub mod computation;
pub mod extraction;
pub mod grammar;
pub mod nodes;
pub mod pipeline;
pub mod symbols;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use computation::{ComputationBody, EvaluationError, ParameterBindings};
pub use grammar::{ExpressionSyntax, LiteralPolicy};
pub use nodes::{FunctionLibrary, TypeSet, Value, ValueType};
pub use pipeline::{compile, CompilationResult, CompileError, CompileResult, Compiler};

// Serializable compilation report
pub use pipeline::output::CompilationOutput;
