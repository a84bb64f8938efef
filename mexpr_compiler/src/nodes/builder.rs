//! Tree builder: turns the extracted symbol table into a typed tree
//!
//! Symbols are visited by ascending level. A symbol referenced before it
//! has been built is built on demand and memoized. Non-call text is parsed
//! by precedence climbing; call text resolves against the function library.
//! Parameter operands are narrowed to the types their use accepts.

use super::error::{BuildError, BuildResult};
use super::functions::FunctionLibrary;
use super::node::ExpressionNode;
use super::operations::{
    accepted_left_types, accepted_right_types, accepted_unary_types, binary_result_types,
    unary_result_types,
};
use super::types::TypeSet;
use crate::config::compile_time::evaluation::MAX_FUNCTION_ARITY;
use crate::config::compile_time::extraction::MAX_NESTING_DEPTH;
use crate::extraction::scan::{is_call_open, split_top_level};
use crate::extraction::CompilationContext;
use crate::grammar::operators::UNARY_OPERAND_PRECEDENCE;
use crate::grammar::{tokenize, BinaryOperator, Token, TokenKind, UnaryOperator};
use crate::logging::codes;
use crate::symbols::{SymbolError, ROOT_KEY};
use crate::{log_debug, log_warning};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Token stream over one symbol's text
struct Cursor<'t> {
    text: &'t str,
    tokens: Vec<Token<'t>>,
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn peek(&self) -> Option<Token<'t>> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Binary operator at the cursor binding at least as tight as `min`
    fn peek_binary(&self, min_precedence: u8) -> Option<BinaryOperator> {
        let token = self.peek()?;
        if token.kind != TokenKind::Operator {
            return None;
        }
        BinaryOperator::from_symbol(token.text).filter(|op| op.precedence() >= min_precedence)
    }

    fn at_call_header(&self) -> bool {
        self.pos + 1 < self.tokens.len() && is_call_open(&self.tokens, self.pos + 1)
    }

    /// Remaining text from the cursor, consuming every token
    fn take_rest(&mut self) -> &'t str {
        let start = self.peek().map_or(self.text.len(), |token| token.start);
        self.pos = self.tokens.len();
        &self.text[start..]
    }
}

pub struct TreeBuilder<'c, 'a> {
    context: &'c mut CompilationContext<'a>,
    functions: &'c FunctionLibrary,
    built: HashMap<String, ExpressionNode>,
    in_progress: HashSet<String>,
}

impl<'c, 'a> TreeBuilder<'c, 'a> {
    pub fn new(context: &'c mut CompilationContext<'a>, functions: &'c FunctionLibrary) -> Self {
        Self {
            context,
            functions,
            built: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Build every symbol and return the root tree
    pub fn build(mut self) -> BuildResult<ExpressionNode> {
        let keys: Vec<String> = self
            .context
            .symbols
            .keys_by_level()
            .into_iter()
            .map(str::to_string)
            .collect();

        for key in &keys {
            self.build_symbol(key)?;
        }

        let root = self
            .built
            .remove(ROOT_KEY)
            .ok_or_else(|| BuildError::UnknownSymbol {
                key: ROOT_KEY.to_string(),
            })?;

        if self.context.log_details() {
            log_debug!("Expression tree built",
                "symbols" => keys.len(),
                "nodes" => root.node_count(),
                "depth" => root.depth()
            );
        }
        Ok(root)
    }

    fn build_symbol(&mut self, key: &str) -> BuildResult<ExpressionNode> {
        if let Some(node) = self.built.get(key) {
            return Ok(node.clone());
        }
        if !self.in_progress.insert(key.to_string()) {
            return Err(BuildError::CircularSymbolReference {
                key: key.to_string(),
            });
        }

        let symbol = self
            .context
            .symbols
            .get(key)
            .cloned()
            .ok_or_else(|| BuildError::UnknownSymbol {
                key: key.to_string(),
            })?;

        let node = if symbol.is_function_call {
            self.build_call(&symbol.expression)
        } else {
            self.parse_text(&symbol.expression)
        };
        self.in_progress.remove(key);

        let node = node?;
        self.built.insert(key.to_string(), node.clone());
        Ok(node)
    }

    // ========================================================================
    // PRECEDENCE CLIMBING
    // ========================================================================

    fn parse_text(&mut self, text: &str) -> BuildResult<ExpressionNode> {
        let mut cursor = Cursor {
            text,
            tokens: tokenize(text, self.context.syntax),
            pos: 0,
        };
        if cursor.tokens.is_empty() {
            return Err(BuildError::malformed(text, "empty expression"));
        }

        let node = self.parse_binary(&mut cursor, 0, 0)?;
        if let Some(token) = cursor.peek() {
            return Err(BuildError::malformed(
                text,
                format!("unexpected '{}'", token.text),
            ));
        }
        Ok(node)
    }

    fn parse_binary(
        &mut self,
        cursor: &mut Cursor<'_>,
        min_precedence: u8,
        depth: usize,
    ) -> BuildResult<ExpressionNode> {
        if depth > MAX_NESTING_DEPTH {
            return Err(SymbolError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            }
            .into());
        }

        let mut left = self.parse_unary(cursor, depth)?;

        while let Some(operator) = cursor.peek_binary(min_precedence) {
            cursor.advance();
            let precedence = operator.precedence();
            let next_min = if operator.is_right_associative() {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_binary(cursor, next_min, depth + 1)?;
            left = self.make_binary(operator, left, right)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self, cursor: &mut Cursor<'_>, depth: usize) -> BuildResult<ExpressionNode> {
        let Some(token) = cursor.peek() else {
            return Err(BuildError::malformed(cursor.text, "missing operand"));
        };

        match token.kind {
            TokenKind::Operator => match UnaryOperator::from_symbol(token.text) {
                Some(operator) => {
                    cursor.advance();
                    let operand = self.parse_binary(cursor, UNARY_OPERAND_PRECEDENCE, depth + 1)?;
                    self.make_unary(operator, operand)
                }
                None => Err(BuildError::malformed(
                    cursor.text,
                    format!("dangling operator '{}'", token.text),
                )),
            },
            TokenKind::Operand if !cursor.at_call_header() => {
                cursor.advance();
                self.resolve_leaf(token.text)
            }
            // Unbalanced call or group left behind by extraction
            TokenKind::Operand | TokenKind::Open => {
                let rest = cursor.take_rest();
                log_warning!(code = codes::extraction::UNBALANCED_PARENTHESES,
                    "Unbalanced text treated as a parameter",
                    "text" => rest
                );
                self.parameter_leaf(rest)
            }
            TokenKind::Close | TokenKind::Separator => Err(BuildError::malformed(
                cursor.text,
                format!("unexpected '{}'", token.text),
            )),
        }
    }

    // ========================================================================
    // LEAVES AND CALLS
    // ========================================================================

    /// Constant key, literal, symbol key, then parameter
    fn resolve_leaf(&mut self, text: &str) -> BuildResult<ExpressionNode> {
        if let Some(constant) = self.context.constants.get(text) {
            return Ok(ExpressionNode::Constant(Arc::clone(constant)));
        }

        let syntax = self.context.syntax;
        if let Some(key) = self.context.constants.check_and_add(text, syntax.literals())? {
            let constant = self
                .context
                .constants
                .get(&key)
                .ok_or_else(|| BuildError::UnknownSymbol { key: key.clone() })?;
            return Ok(ExpressionNode::Constant(Arc::clone(constant)));
        }

        if text != ROOT_KEY && self.context.symbols.contains(text) {
            return self.build_symbol(text);
        }

        self.parameter_leaf(text)
    }

    fn parameter_leaf(&mut self, name: &str) -> BuildResult<ExpressionNode> {
        let parameter = self.context.parameters.get_or_create(name)?;
        Ok(ExpressionNode::Parameter {
            name: parameter.name.clone(),
            slot: parameter.position,
            types: parameter.allowed,
        })
    }

    /// Canonical `name(arg,arg)` text with placeholder arguments
    fn build_call(&mut self, text: &str) -> BuildResult<ExpressionNode> {
        let syntax = self.context.syntax;
        let open = text
            .find(syntax.open())
            .ok_or_else(|| BuildError::malformed(text, "call without argument list"))?;
        let body = text[open + syntax.open().len()..]
            .strip_suffix(syntax.close())
            .ok_or_else(|| BuildError::malformed(text, "call without closing token"))?;
        let name = &text[..open];

        let fragments = split_top_level(body, syntax);
        if fragments.len() > MAX_FUNCTION_ARITY {
            return Err(BuildError::malformed(
                text,
                format!("more than {} arguments", MAX_FUNCTION_ARITY),
            ));
        }

        let mut arguments = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            arguments.push(self.parse_text(fragment)?);
        }

        let function = self
            .functions
            .lookup(name, arguments.len())
            .ok_or_else(|| BuildError::UnknownFunction {
                name: name.to_string(),
                arity: arguments.len(),
            })?;

        check_tree_depth(1 + arguments.iter().map(ExpressionNode::depth).max().unwrap_or(0))?;

        let argument_types: Vec<TypeSet> = arguments.iter().map(ExpressionNode::types).collect();
        let mut narrowed = Vec::with_capacity(arguments.len());
        for (index, argument) in arguments.into_iter().enumerate() {
            let accepted = function.accepted_argument_types(index, &argument_types);
            if accepted.is_empty() {
                return Err(BuildError::IncompatibleArgumentType {
                    function: function.name.clone(),
                    index: index + 1,
                    types: argument_types[index],
                });
            }
            narrowed.push(self.narrow(argument, accepted)?);
        }

        let narrowed_types: Vec<TypeSet> = narrowed.iter().map(ExpressionNode::types).collect();
        let types = function.result_types(&narrowed_types);
        if types.is_empty() {
            return Err(BuildError::IncompatibleArgumentType {
                function: function.name.clone(),
                index: 1,
                types: narrowed_types.first().copied().unwrap_or(TypeSet::EMPTY),
            });
        }

        Ok(ExpressionNode::FunctionCall {
            function,
            arguments: narrowed,
            types,
        })
    }

    // ========================================================================
    // TYPING
    // ========================================================================

    fn make_binary(
        &mut self,
        operator: BinaryOperator,
        left: ExpressionNode,
        right: ExpressionNode,
    ) -> BuildResult<ExpressionNode> {
        check_tree_depth(1 + left.depth().max(right.depth()))?;

        let (left_types, right_types) = (left.types(), right.types());
        let accepted_left = accepted_left_types(operator, left_types, right_types);
        let accepted_right = accepted_right_types(operator, left_types, right_types);

        if accepted_left.is_empty() || accepted_right.is_empty() {
            return Err(incompatible_binary(operator, left, right));
        }

        let left = self.narrow(left, accepted_left)?;
        let right = self.narrow(right, accepted_right)?;
        let types = binary_result_types(operator, left.types(), right.types());
        if types.is_empty() {
            return Err(incompatible_binary(operator, left, right));
        }

        Ok(ExpressionNode::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            types,
        })
    }

    fn make_unary(&mut self, operator: UnaryOperator, operand: ExpressionNode) -> BuildResult<ExpressionNode> {
        check_tree_depth(1 + operand.depth())?;

        let accepted = accepted_unary_types(operator, operand.types());
        if accepted.is_empty() {
            let operand_types = operand.types();
            let expression = ExpressionNode::Unary {
                operator,
                operand: Box::new(operand),
                types: TypeSet::EMPTY,
            }
            .render();
            return Err(BuildError::IncompatibleUnaryOperand {
                operator: operator.as_str().to_string(),
                operand: operand_types,
                expression,
            });
        }

        let operand = self.narrow(operand, accepted)?;
        let types = unary_result_types(operator, operand.types());
        Ok(ExpressionNode::Unary {
            operator,
            operand: Box::new(operand),
            types,
        })
    }

    /// Restrict a parameter node and its registry entry to `accepted`
    fn narrow(&mut self, node: ExpressionNode, accepted: TypeSet) -> BuildResult<ExpressionNode> {
        match node {
            ExpressionNode::Parameter { name, slot, .. } => {
                let types = self.context.parameters.narrow(&name, accepted)?;
                Ok(ExpressionNode::Parameter { name, slot, types })
            }
            other => Ok(other),
        }
    }
}

/// Every walk over the finished tree recurses once per level
fn check_tree_depth(depth: usize) -> BuildResult<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(SymbolError::NestingTooDeep {
            depth,
            max: MAX_NESTING_DEPTH,
        }
        .into());
    }
    Ok(())
}

fn incompatible_binary(operator: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> BuildError {
    let (left_types, right_types) = (left.types(), right.types());
    let expression = ExpressionNode::Binary {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        types: TypeSet::EMPTY,
    }
    .render();

    BuildError::IncompatibleOperandTypes {
        operator: operator.as_str().to_string(),
        left: left_types,
        right: right_types,
        expression,
    }
}
