//! Recursive tree evaluation

use super::bindings::ParameterBindings;
use super::error::{EvaluationError, EvaluationResult};
use crate::nodes::operations::{evaluate_binary, evaluate_unary};
use crate::nodes::{ExpressionNode, TypeSet, Value};
use crate::symbols::ParameterRegistry;

/// Where parameter values come from
#[derive(Debug, Clone, Copy)]
pub enum ParameterSource<'v> {
    Named(&'v ParameterBindings),
    Positional(&'v [Value]),
}

impl<'v> ParameterSource<'v> {
    fn value(&self, name: &str, slot: usize) -> Option<&'v Value> {
        match self {
            ParameterSource::Named(bindings) => bindings.get(name),
            ParameterSource::Positional(values) => values.get(slot),
        }
    }
}

pub struct Evaluator<'v> {
    registry: &'v ParameterRegistry,
    source: ParameterSource<'v>,
}

impl<'v> Evaluator<'v> {
    pub fn new(registry: &'v ParameterRegistry, source: ParameterSource<'v>) -> Self {
        Self { registry, source }
    }

    pub fn evaluate(&self, node: &ExpressionNode) -> EvaluationResult<Value> {
        match node {
            ExpressionNode::Constant(constant) => Ok(constant.value.clone()),
            ExpressionNode::Parameter { name, slot, .. } => self.parameter(name, *slot),
            ExpressionNode::Unary {
                operator, operand, ..
            } => {
                let value = self.evaluate(operand)?;
                evaluate_unary(*operator, &value)
            }
            ExpressionNode::Binary {
                operator,
                left,
                right,
                ..
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                evaluate_binary(*operator, &left, &right)
            }
            ExpressionNode::FunctionCall {
                function,
                arguments,
                ..
            } => {
                let values = arguments
                    .iter()
                    .map(|argument| self.evaluate(argument))
                    .collect::<EvaluationResult<Vec<Value>>>()?;
                function.invoke(&values)
            }
        }
    }

    /// Bound value checked against the types the compilation inferred
    fn parameter(&self, name: &str, slot: usize) -> EvaluationResult<Value> {
        let value = self
            .source
            .value(name, slot)
            .ok_or_else(|| EvaluationError::MissingParameter {
                name: name.to_string(),
            })?;

        let expected = self
            .registry
            .get(name)
            .map_or(TypeSet::ANY, |parameter| parameter.allowed);
        if !expected.contains(value.value_type()) {
            return Err(EvaluationError::ParameterTypeMismatch {
                name: name.to_string(),
                expected,
                actual: value.value_type(),
            });
        }

        Ok(value.clone())
    }
}
