//! Grouping extraction: parenthesized sub-expressions become symbols

use super::population::resolve_argument;
use super::scan::is_group_open;
use super::CompilationContext;
use crate::config::compile_time::extraction::MAX_NESTING_DEPTH;
use crate::grammar::{tokenize, TokenKind};
use crate::logging::codes;
use crate::symbols::{SymbolError, SymbolResult};
use crate::{log_debug, log_warning};

/// Innermost grouping in the text, or the reason none can be replaced
enum GroupScan {
    Found { open_start: usize, inner_start: usize, inner_end: usize, end: usize },
    None { unbalanced: bool },
}

/// Replace grouping parentheses in every non-call symbol, innermost first
pub fn extract_groupings(context: &mut CompilationContext<'_>) -> SymbolResult<()> {
    let mut index = 0;

    while let Some(key) = context.symbols.key_at(index).map(str::to_string) {
        index += 1;

        let Some(symbol) = context.symbols.get(&key).cloned() else {
            continue;
        };
        if symbol.is_function_call {
            continue;
        }

        let rewritten = replace_groups(context, &symbol.expression, symbol.level)?;
        if rewritten != symbol.expression {
            context.symbols.set_expression(&key, &rewritten)?;
        }
    }
    Ok(())
}

/// Rewrite `text`, replacing each group with the placeholder of its contents
pub fn replace_groups(
    context: &mut CompilationContext<'_>,
    text: &str,
    level: usize,
) -> SymbolResult<String> {
    let mut current = text.to_string();

    loop {
        match scan_groups(&current, context)? {
            GroupScan::Found {
                open_start,
                inner_start,
                inner_end,
                end,
            } => {
                let inner = current[inner_start..inner_end].to_string();
                let resolved = resolve_argument(context, &inner, level + 1)?;

                if context.log_details() {
                    log_debug!("Grouping extracted",
                        "group" => inner,
                        "resolved" => resolved,
                        "level" => level + 1
                    );
                }

                current = format!("{}{}{}", &current[..open_start], resolved, &current[end..]);
            }
            GroupScan::None { unbalanced } => {
                if unbalanced {
                    log_warning!(code = codes::extraction::UNBALANCED_PARENTHESES,
                        "Unbalanced parentheses left as text",
                        "expression" => current
                    );
                }
                return Ok(current);
            }
        }
    }
}

/// First grouping whose close comes earliest; such a group holds no other
/// grouping, so replacing it works inside out
fn scan_groups(text: &str, context: &CompilationContext<'_>) -> SymbolResult<GroupScan> {
    let tokens = tokenize(text, context.syntax);
    let mut stack: Vec<usize> = Vec::new();
    let mut unbalanced = false;

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Open => {
                stack.push(index);
                if stack.len() > MAX_NESTING_DEPTH {
                    return Err(SymbolError::NestingTooDeep {
                        depth: stack.len(),
                        max: MAX_NESTING_DEPTH,
                    });
                }
            }
            TokenKind::Close => match stack.pop() {
                Some(open) if is_group_open(&tokens, open) => {
                    return Ok(GroupScan::Found {
                        open_start: tokens[open].start,
                        inner_start: tokens[open].end,
                        inner_end: token.start,
                        end: token.end,
                    });
                }
                Some(_) => {}
                None => unbalanced = true,
            },
            _ => {}
        }
    }

    if stack.iter().any(|&open| is_group_open(&tokens, open)) {
        unbalanced = true;
    }
    Ok(GroupScan::None { unbalanced })
}
