use super::functions::FunctionDefinition;
use super::types::TypeSet;
use super::value::Value;
use crate::grammar::operators::UNARY_OPERAND_PRECEDENCE;
use crate::grammar::{BinaryOperator, UnaryOperator};
use std::fmt;
use std::sync::Arc;

/// A literal value together with the source text it was recognized from.
/// One instance exists per distinct literal text in a compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantNode {
    pub value: Value,
    pub canonical_text: String,
}

/// Typed expression tree
#[derive(Debug, Clone)]
pub enum ExpressionNode {
    Constant(Arc<ConstantNode>),
    Parameter {
        name: String,
        slot: usize,
        types: TypeSet,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<ExpressionNode>,
        types: TypeSet,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
        types: TypeSet,
    },
    FunctionCall {
        function: Arc<FunctionDefinition>,
        arguments: Vec<ExpressionNode>,
        types: TypeSet,
    },
}

const LEAF_PRECEDENCE: u8 = u8::MAX;

impl ExpressionNode {
    /// Types this node may produce
    pub fn types(&self) -> TypeSet {
        match self {
            ExpressionNode::Constant(constant) => TypeSet::single(constant.value.value_type()),
            ExpressionNode::Parameter { types, .. }
            | ExpressionNode::Unary { types, .. }
            | ExpressionNode::Binary { types, .. }
            | ExpressionNode::FunctionCall { types, .. } => *types,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, ExpressionNode::Constant(_))
    }

    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            ExpressionNode::Parameter { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        match self {
            ExpressionNode::Constant(_) | ExpressionNode::Parameter { .. } => 1,
            ExpressionNode::Unary { operand, .. } => 1 + operand.node_count(),
            ExpressionNode::Binary { left, right, .. } => 1 + left.node_count() + right.node_count(),
            ExpressionNode::FunctionCall { arguments, .. } => {
                1 + arguments.iter().map(ExpressionNode::node_count).sum::<usize>()
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            ExpressionNode::Constant(_) | ExpressionNode::Parameter { .. } => 1,
            ExpressionNode::Unary { operand, .. } => 1 + operand.depth(),
            ExpressionNode::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
            ExpressionNode::FunctionCall { arguments, .. } => {
                1 + arguments.iter().map(ExpressionNode::depth).max().unwrap_or(0)
            }
        }
    }

    fn render_precedence(&self) -> u8 {
        match self {
            ExpressionNode::Binary { operator, .. } => operator.precedence(),
            ExpressionNode::Unary { .. } => UNARY_OPERAND_PRECEDENCE,
            _ => LEAF_PRECEDENCE,
        }
    }

    /// Render with the default syntax tokens, parenthesizing only where needed
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn write_operand(
    f: &mut fmt::Formatter<'_>,
    operand: &ExpressionNode,
    needs_parens: bool,
) -> fmt::Result {
    if needs_parens {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionNode::Constant(constant) => f.write_str(&constant.canonical_text),
            ExpressionNode::Parameter { name, .. } => f.write_str(name),
            ExpressionNode::Unary {
                operator, operand, ..
            } => {
                f.write_str(operator.as_str())?;
                let needs_parens = matches!(
                    operand.as_ref(),
                    ExpressionNode::Binary { operator, .. } if operator.precedence() < UNARY_OPERAND_PRECEDENCE
                );
                write_operand(f, operand, needs_parens)
            }
            ExpressionNode::Binary {
                operator,
                left,
                right,
                ..
            } => {
                let precedence = operator.precedence();
                let right_assoc = operator.is_right_associative();

                let left_parens = left.render_precedence() < precedence
                    || (left.render_precedence() == precedence && right_assoc);
                let right_parens = right.render_precedence() < precedence
                    || (right.render_precedence() == precedence && !right_assoc);

                write_operand(f, left, left_parens)?;
                f.write_str(operator.as_str())?;
                write_operand(f, right, right_parens)
            }
            ExpressionNode::FunctionCall {
                function,
                arguments,
                ..
            } => {
                write!(f, "{}(", function.name)?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", argument)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: i64) -> ExpressionNode {
        ExpressionNode::Constant(Arc::new(ConstantNode {
            value: Value::Integer(value),
            canonical_text: value.to_string(),
        }))
    }

    fn binary(operator: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
        ExpressionNode::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            types: TypeSet::INTEGER,
        }
    }

    #[test]
    fn test_render_adds_needed_parentheses() {
        let sum = binary(BinaryOperator::Add, constant(1), constant(2));
        let product = binary(BinaryOperator::Multiply, sum.clone(), constant(3));
        assert_eq!(product.render(), "(1+2)*3");

        let difference = binary(BinaryOperator::Subtract, constant(1), sum);
        assert_eq!(difference.render(), "1-(1+2)");

        let nested_power = binary(
            BinaryOperator::Power,
            constant(2),
            binary(BinaryOperator::Power, constant(3), constant(2)),
        );
        assert_eq!(nested_power.render(), "2^3^2");
    }

    #[test]
    fn test_render_unary() {
        let negated = ExpressionNode::Unary {
            operator: UnaryOperator::Negate,
            operand: Box::new(binary(BinaryOperator::Add, constant(1), constant(2))),
            types: TypeSet::INTEGER,
        };
        assert_eq!(negated.render(), "-(1+2)");

        let squared = binary(BinaryOperator::Power, negated.clone(), constant(2));
        assert_eq!(squared.render(), "(-(1+2))^2");
    }

    #[test]
    fn test_tree_metrics() {
        let tree = binary(
            BinaryOperator::Add,
            constant(1),
            binary(BinaryOperator::Multiply, constant(2), constant(3)),
        );
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.types(), TypeSet::INTEGER);
        assert!(constant(4).is_constant());
    }
}
