//! Computation body: the immutable result of a compilation
//!
//! A body pairs the root of the typed tree with the parameter registry it
//! was built against. It is `Send + Sync` and may be evaluated from many
//! threads at once.

pub mod bindings;
pub mod error;
pub mod evaluator;

pub use bindings::ParameterBindings;
pub use error::{EvaluationError, EvaluationResult};
pub use evaluator::{Evaluator, ParameterSource};

use crate::nodes::{ExpressionNode, TypeSet, Value};
use crate::symbols::ParameterRegistry;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ComputationBody {
    root: ExpressionNode,
    parameters: Arc<ParameterRegistry>,
}

impl ComputationBody {
    pub fn new(root: ExpressionNode, parameters: ParameterRegistry) -> Self {
        Self {
            root,
            parameters: Arc::new(parameters),
        }
    }

    pub fn root(&self) -> &ExpressionNode {
        &self.root
    }

    pub fn parameters(&self) -> &ParameterRegistry {
        &self.parameters
    }

    /// Parameter names in slot order
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.names()
    }

    /// Types the expression may produce
    pub fn result_types(&self) -> TypeSet {
        self.root.types()
    }

    /// Evaluate with values bound by parameter name
    pub fn evaluate(&self, bindings: &ParameterBindings) -> EvaluationResult<Value> {
        Evaluator::new(&self.parameters, ParameterSource::Named(bindings)).evaluate(&self.root)
    }

    /// Evaluate with one value per parameter slot
    pub fn evaluate_positional(&self, values: &[Value]) -> EvaluationResult<Value> {
        if values.len() != self.parameters.len() {
            return Err(EvaluationError::ParameterCountMismatch {
                expected: self.parameters.len(),
                actual: values.len(),
            });
        }
        Evaluator::new(&self.parameters, ParameterSource::Positional(values)).evaluate(&self.root)
    }

    /// Tree re-rendered with the default syntax tokens
    pub fn render(&self) -> String {
        self.root.render()
    }
}
