//! Compilation pipeline
//!
//! text -> string literals -> whitespace removal -> function calls ->
//! groupings -> tree construction -> computation body

mod error;
pub mod output;
mod result;

pub use error::{CompileError, CompileResult};
pub use output::CompilationOutput;
pub use result::CompilationResult;

use crate::computation::ComputationBody;
use crate::config::compile_time::input::MAX_EXPRESSION_LENGTH;
use crate::config::runtime::CompilerPreferences;
use crate::extraction::{extract_groupings, extract_strings, replace_functions, CompilationContext};
use crate::grammar::{tokenize, ExpressionSyntax, TokenKind};
use crate::logging::codes;
use crate::nodes::{BuildError, FunctionLibrary, TreeBuilder};
use crate::symbols::{ConstantTable, SymbolTable};
use crate::{log_debug, log_error, log_performance};
use std::time::Instant;

type StageOutput = (ComputationBody, SymbolTable, ConstantTable);

/// Compiles expressions against one syntax and function library.
/// Each call owns a fresh set of tables, so a compiler can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Compiler {
    syntax: ExpressionSyntax,
    functions: FunctionLibrary,
    preferences: CompilerPreferences,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Default syntax, the standard function library and default preferences
    pub fn new() -> Self {
        Self {
            syntax: ExpressionSyntax::default(),
            functions: FunctionLibrary::standard(),
            preferences: CompilerPreferences::default(),
        }
    }

    pub fn with_syntax(mut self, syntax: ExpressionSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn with_functions(mut self, functions: FunctionLibrary) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_preferences(mut self, preferences: CompilerPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn syntax(&self) -> &ExpressionSyntax {
        &self.syntax
    }

    pub fn functions(&self) -> &FunctionLibrary {
        &self.functions
    }

    pub fn preferences(&self) -> &CompilerPreferences {
        &self.preferences
    }

    pub fn compile(&self, text: &str) -> CompileResult<ComputationBody> {
        self.compile_detailed(text).map(|result| result.body)
    }

    /// Compile and keep the populated tables
    pub fn compile_detailed(&self, text: &str) -> CompileResult<CompilationResult> {
        let start_time = Instant::now();

        match self.run_stages(text) {
            Ok((body, symbols, constants)) => {
                let result = CompilationResult::new(
                    text,
                    body,
                    symbols,
                    constants,
                    self.syntax.clone(),
                    start_time.elapsed(),
                );
                result.log_success();
                Ok(result)
            }
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(),
                    "expression_length" => text.len()
                );
                Err(error)
            }
        }
    }

    fn run_stages(&self, text: &str) -> CompileResult<StageOutput> {
        validate_input(text)?;

        let mut context = CompilationContext::new(&self.syntax, &self.preferences);

        // Stage 1: string literals
        let stage_start = Instant::now();
        let without_strings = extract_strings(&mut context, text)?;
        log_performance!(codes::success::STRING_EXTRACTION_COMPLETE, "String literals extracted",
            duration = stage_start.elapsed(),
            "constants" => context.constants.len()
        );

        // Stage 2: whitespace carries no meaning outside literals
        reject_adjacent_operands(&without_strings, &self.syntax)?;
        let compact: String = without_strings.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(CompileError::EmptyExpression);
        }
        context.register_root(&compact)?;

        // Stage 3: function calls
        let stage_start = Instant::now();
        replace_functions(&mut context)?;
        log_performance!(codes::success::FUNCTION_EXTRACTION_COMPLETE, "Function calls extracted",
            duration = stage_start.elapsed(),
            "symbols" => context.symbols.sub_expression_count()
        );

        // Stage 4: grouping parentheses
        let stage_start = Instant::now();
        extract_groupings(&mut context)?;
        log_performance!(codes::success::GROUPING_EXTRACTION_COMPLETE, "Groupings extracted",
            duration = stage_start.elapsed(),
            "symbols" => context.symbols.sub_expression_count()
        );

        if self.preferences.log_extraction_details {
            for (key, symbol) in context.symbols.iter() {
                log_debug!("Symbol",
                    "key" => key,
                    "expression" => symbol.expression,
                    "call" => symbol.is_function_call,
                    "level" => symbol.level
                );
            }
        }

        // Stage 5: typed tree
        let stage_start = Instant::now();
        let root = TreeBuilder::new(&mut context, &self.functions).build()?;
        log_performance!(codes::success::TREE_CONSTRUCTION_COMPLETE, "Expression tree built",
            duration = stage_start.elapsed(),
            "nodes" => root.node_count()
        );

        let CompilationContext {
            constants,
            symbols,
            parameters,
            ..
        } = context;
        Ok((ComputationBody::new(root, parameters), symbols, constants))
    }
}

fn validate_input(text: &str) -> CompileResult<()> {
    if text.trim().is_empty() {
        return Err(CompileError::EmptyExpression);
    }

    let length = text.chars().count();
    if length > MAX_EXPRESSION_LENGTH {
        return Err(CompileError::ExpressionTooLong {
            length,
            limit: MAX_EXPRESSION_LENGTH,
        });
    }
    Ok(())
}

/// Operands separated only by whitespace would fuse once it is removed.
/// Text of an unterminated literal is exempt.
fn reject_adjacent_operands(text: &str, syntax: &ExpressionSyntax) -> CompileResult<()> {
    let delimiter = syntax.string_delimiter();
    let tokens = tokenize(text, syntax);

    for pair in tokens.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if first.kind != TokenKind::Operand || second.kind != TokenKind::Operand {
            continue;
        }
        if !delimiter.is_empty() && (first.text.contains(delimiter) || second.text.contains(delimiter)) {
            continue;
        }
        return Err(BuildError::malformed(
            text,
            format!("missing operator between '{}' and '{}'", first.text, second.text),
        )
        .into());
    }
    Ok(())
}

/// Compile with the default syntax and standard function library
pub fn compile(text: &str) -> CompileResult<ComputationBody> {
    Compiler::new().compile(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::computation::ParameterBindings;
    use crate::config::compile_time::extraction::MAX_NESTING_DEPTH;
    use crate::grammar::LiteralPolicy;
    use crate::nodes::{BuildError, Value};
    use crate::symbols::{SymbolError, ROOT_KEY};
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use std::thread;

    fn evaluate(text: &str) -> Value {
        compile(text)
            .unwrap()
            .evaluate(&ParameterBindings::new())
            .unwrap()
    }

    #[test]
    fn test_grouped_arithmetic() {
        let result = Compiler::new().compile_detailed("3 + (4 * 5)").unwrap();

        assert_eq!(result.symbols.count(), 2);
        let group_key = result.symbols.find_by_expression("4*5").unwrap();
        assert!(!result.symbols.get(group_key).unwrap().is_function_call);
        assert_eq!(result.symbols.get(ROOT_KEY).unwrap().expression, "3+item0001");
        assert_eq!(
            result.body.evaluate(&ParameterBindings::new()).unwrap(),
            Value::Integer(23)
        );
    }

    #[test]
    fn test_function_call_with_parameter() {
        let result = Compiler::new().compile_detailed("max(x, 5) + 1").unwrap();

        let (key, symbol) = result
            .symbols
            .iter()
            .find(|(_, symbol)| symbol.is_function_call)
            .unwrap();
        assert_eq!(result.resolved_text(key).unwrap(), "max(x,5)");
        assert_eq!(symbol.level, 1);

        let value = result
            .body
            .evaluate(&ParameterBindings::new().with("x", Value::Integer(10)))
            .unwrap();
        assert_eq!(value, Value::Integer(11));
    }

    #[test]
    fn test_parameters_match_literals() {
        let with_parameters = compile("x + y")
            .unwrap()
            .evaluate(&ParameterBindings::new().with("x", Value::Integer(3)).with("y", Value::Integer(4)))
            .unwrap();
        assert_eq!(with_parameters, evaluate("3 + 4"));
    }

    #[test]
    fn test_integer_division_is_exact() {
        assert_eq!(evaluate("7 / 2"), Value::Float(3.5));
        assert_eq!(evaluate("-2 ^ 2"), Value::Float(-4.0));
        assert_eq!(evaluate("2 ^ 3 ^ 2"), Value::Float(512.0));
        assert_eq!(evaluate("7 % 3 * 2"), Value::Integer(2));
    }

    #[test]
    fn test_operators_across_domains() {
        assert_eq!(evaluate("1 < 2 & 3 >= 3"), Value::Boolean(true));
        assert_eq!(evaluate("true + true"), Value::Integer(2));
        assert_eq!(evaluate("0x10 + 3"), Value::Integer(19));
        assert_eq!(evaluate("0b1100 & 0b1010"), Value::Binary(vec![0b1000]));
        assert_eq!(evaluate("1 << 4"), Value::Integer(16));
        assert_eq!(evaluate("\"ab\" + \"cd\""), Value::String("abcd".into()));
        assert_eq!(evaluate("strlen(\"a b c\")"), Value::Integer(5));
        assert_eq!(evaluate("ROUND(2.5) + abs(-1)"), Value::Float(4.0));
    }

    #[test]
    fn test_constants_are_shared() {
        let result = Compiler::new().compile_detailed("2 * x + 2 * y + 2").unwrap();
        assert_eq!(result.constant_count(), 1);
    }

    #[test]
    fn test_unbalanced_input_does_not_fail_extraction() {
        let result = Compiler::new().compile_detailed("foo(1, 2");
        let body = result.unwrap().body;
        assert_eq!(body.parameter_names(), vec!["foo(1,2"]);
    }

    #[test]
    fn test_input_validation() {
        assert_matches!(compile(""), Err(CompileError::EmptyExpression));
        assert_matches!(compile("   \t"), Err(CompileError::EmptyExpression));

        let long = "1+".repeat(MAX_EXPRESSION_LENGTH / 2 + 1);
        assert_matches!(compile(&long), Err(CompileError::ExpressionTooLong { .. }));
    }

    #[test]
    fn test_stage_errors_are_wrapped() {
        assert_matches!(
            compile("item0001 + 1"),
            Err(CompileError::Symbol(SymbolError::InvalidIdentifier { .. }))
                | Err(CompileError::Build(BuildError::Symbol(SymbolError::InvalidIdentifier { .. })))
        );
        assert_matches!(
            compile("\"text\" - 1"),
            Err(CompileError::Build(BuildError::IncompatibleOperandTypes { .. }))
        );
        assert_matches!(
            compile("frobnicate(1)"),
            Err(CompileError::Build(BuildError::UnknownFunction { .. }))
        );
    }

    #[test]
    fn test_stage_timing_macro_needs_no_other_imports() {
        let stage_start = Instant::now();
        log_performance!(codes::success::TREE_CONSTRUCTION_COMPLETE, "Expression tree built",
            duration = stage_start.elapsed()
        );
        log_performance!(codes::success::TREE_CONSTRUCTION_COMPLETE, "Expression tree built",
            duration = stage_start.elapsed(),
            "nodes" => 3
        );
    }

    #[test]
    fn test_placeholder_shaped_names_are_rejected() {
        for text in ["5 + const0001", "(1 + 2) * item0001", "\"a\" + const0001"] {
            assert_matches!(
                compile(text),
                Err(CompileError::Symbol(SymbolError::InvalidIdentifier { .. })),
                "{}",
                text
            );
        }
        assert_eq!(evaluate("strlen(\"item0001\")"), Value::Integer(8));
    }

    #[test]
    fn test_whitespace_does_not_join_operands() {
        assert_matches!(
            compile("1 2 + 0"),
            Err(CompileError::Build(BuildError::MalformedExpression { .. }))
        );
        assert_matches!(
            compile("x y"),
            Err(CompileError::Build(BuildError::MalformedExpression { .. }))
        );
        assert_matches!(
            compile("\"a\" \"b\""),
            Err(CompileError::Build(BuildError::MalformedExpression { .. }))
        );
        assert_eq!(evaluate(" 1 +\t2 "), Value::Integer(3));
        assert_eq!(evaluate("max (1, 2) < = 2"), Value::Boolean(true));
    }

    #[test]
    fn test_long_operator_chain_is_rejected() {
        let chain = format!("{}1", "1+".repeat(15000));
        assert_matches!(
            compile(&chain),
            Err(CompileError::Build(BuildError::Symbol(SymbolError::NestingTooDeep { .. })))
        );

        let chain = format!("{}1", "1+".repeat(MAX_NESTING_DEPTH - 1));
        assert_eq!(evaluate(&chain), Value::Integer(MAX_NESTING_DEPTH as i64));
    }

    #[test]
    fn test_custom_syntax() {
        let syntax = ExpressionSyntax::new("[", "]", ";", "'", LiteralPolicy::default()).unwrap();
        let compiler = Compiler::new().with_syntax(syntax);

        let body = compiler.compile("max[a; 2] * [1 + 1]").unwrap();
        let value = body.evaluate_positional(&[Value::Integer(3)]).unwrap();
        assert_eq!(value, Value::Integer(6));

        let body = compiler.compile("strlen['a;b']").unwrap();
        assert_eq!(body.evaluate(&ParameterBindings::new()).unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_parallel_compilation() {
        let compiler = Arc::new(Compiler::new());

        let handles: Vec<_> = (0..8i64)
            .map(|n| {
                let compiler = Arc::clone(&compiler);
                thread::spawn(move || {
                    let body = compiler.compile(&format!("x * {} + (x - {})", n, n)).unwrap();
                    body.evaluate_positional(&[Value::Integer(10)]).unwrap()
                })
            })
            .collect();

        for (n, handle) in handles.into_iter().enumerate() {
            let n = n as i64;
            assert_eq!(handle.join().unwrap(), Value::Integer(10 * n + 10 - n));
        }
    }
}
