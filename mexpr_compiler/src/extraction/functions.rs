//! Function call extraction
//!
//! Every `name(args)` occurrence is replaced by the key of a call symbol
//! whose text is the canonical body `name(arg,arg)` with each argument
//! already resolved to a placeholder. Arguments are processed before the
//! call itself, and the scan restarts on the rewritten text after each
//! replacement.

use super::population::resolve_argument;
use super::scan::{find_matching_close, is_call_open, split_top_level};
use super::CompilationContext;
use crate::config::compile_time::extraction::MAX_NESTING_DEPTH;
use crate::grammar::{tokenize, Token};
use crate::log_debug;
use crate::symbols::{SymbolError, SymbolResult};

struct CallSite {
    header_start: usize,
    header_end: usize,
    args_start: usize,
    args_end: usize,
    end: usize,
}

/// Extract calls from the root and every symbol in the table, including
/// symbols registered while the pass runs. Call symbols are skipped.
pub fn replace_functions(context: &mut CompilationContext<'_>) -> SymbolResult<()> {
    let mut index = 0;

    while let Some(key) = context.symbols.key_at(index).map(str::to_string) {
        index += 1;

        let Some(symbol) = context.symbols.get(&key).cloned() else {
            continue;
        };
        if symbol.is_function_call {
            continue;
        }

        let rewritten = replace_functions_in(context, &symbol.expression, symbol.level, 0)?;
        if rewritten != symbol.expression {
            context.symbols.set_expression(&key, &rewritten)?;
        }
    }
    Ok(())
}

/// Rewrite `text` found at `level`, replacing each call with its key
pub fn replace_functions_in(
    context: &mut CompilationContext<'_>,
    text: &str,
    level: usize,
    depth: usize,
) -> SymbolResult<String> {
    if depth > MAX_NESTING_DEPTH {
        return Err(SymbolError::NestingTooDeep {
            depth,
            max: MAX_NESTING_DEPTH,
        });
    }

    let mut current = text.to_string();

    while let Some(site) = find_call(&current, context) {
        let header = current[site.header_start..site.header_end].to_string();
        let raw_arguments = current[site.args_start..site.args_end].to_string();

        let arguments = replace_functions_in(context, &raw_arguments, level + 1, depth + 1)?;
        let fragments: Vec<String> = split_top_level(&arguments, context.syntax)
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut resolved = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            resolved.push(resolve_argument(context, fragment, level + 1)?);
        }

        let body = format!(
            "{}{}{}{}",
            header,
            context.syntax.open(),
            resolved.join(context.syntax.separator()),
            context.syntax.close()
        );
        let key = context.symbols.get_or_add(&body, true, level + 1)?;

        if context.log_details() {
            log_debug!("Function call extracted",
                "key" => key,
                "call" => body,
                "level" => level + 1
            );
        }

        current = format!("{}{}{}", &current[..site.header_start], key, &current[site.end..]);
    }

    Ok(current)
}

/// First call in `text` with a matching close; unmatched opens are skipped
fn find_call(text: &str, context: &CompilationContext<'_>) -> Option<CallSite> {
    let tokens: Vec<Token<'_>> = tokenize(text, context.syntax);

    (0..tokens.len())
        .filter(|&index| is_call_open(&tokens, index))
        .find_map(|open| {
            let close = find_matching_close(&tokens, open)?;
            Some(CallSite {
                header_start: tokens[open - 1].start,
                header_end: tokens[open - 1].end,
                args_start: tokens[open].end,
                args_end: tokens[close].start,
                end: tokens[close].end,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::CompilerPreferences;
    use crate::grammar::ExpressionSyntax;
    use crate::symbols::ROOT_KEY;
    use assert_matches::assert_matches;

    fn run(text: &str) -> SymbolResult<Vec<(String, String, bool)>> {
        let syntax = ExpressionSyntax::default();
        let preferences = CompilerPreferences::default();
        let mut context = CompilationContext::new(&syntax, &preferences);
        context.register_root(text)?;
        replace_functions(&mut context)?;

        Ok(context
            .symbols
            .iter()
            .map(|(key, symbol)| (key.to_string(), symbol.expression.clone(), symbol.is_function_call))
            .collect())
    }

    #[test]
    fn test_single_call() {
        let symbols = run("max(x,5)+1").unwrap();
        assert_eq!(
            symbols,
            vec![
                (ROOT_KEY.to_string(), "item0001+1".to_string(), false),
                ("item0001".to_string(), "max(x,const0001)".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_nested_calls_are_depth_first() {
        let symbols = run("max(min(a,b),c)").unwrap();
        assert_eq!(symbols[0].1, "item0002");
        assert_eq!(symbols[1], ("item0001".to_string(), "min(a,b)".to_string(), true));
        assert_eq!(symbols[2], ("item0002".to_string(), "max(item0001,c)".to_string(), true));
    }

    #[test]
    fn test_repeated_call_shares_key() {
        let symbols = run("sqrt(x)+sqrt(x)").unwrap();
        assert_eq!(symbols[0].1, "item0001+item0001");
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn test_compound_argument_becomes_symbol() {
        let symbols = run("abs(x-1)").unwrap();
        assert_eq!(symbols[0].1, "item0002");
        assert_eq!(symbols[1], ("item0001".to_string(), "x-1".to_string(), false));
        assert_eq!(symbols[2].1, "abs(item0001)");
    }

    #[test]
    fn test_unbalanced_call_is_left_alone() {
        let symbols = run("foo(1,2").unwrap();
        assert_eq!(symbols, vec![(ROOT_KEY.to_string(), "foo(1,2".to_string(), false)]);
    }

    #[test]
    fn test_grouping_is_not_a_call() {
        let symbols = run("(a+b)*2").unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].1, "(a+b)*2");
    }

    #[test]
    fn test_nesting_limit() {
        let text = format!("{}x{}", "f(".repeat(MAX_NESTING_DEPTH + 2), ")".repeat(MAX_NESTING_DEPTH + 2));
        assert_matches!(run(&text), Err(SymbolError::NestingTooDeep { .. }));
    }
}
