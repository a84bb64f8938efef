//! Token-level scanning helpers shared by the extraction passes

use crate::grammar::{tokenize, ExpressionSyntax, Token, TokenKind};

/// Index of the close matching the open at `open_index`, nesting-aware
pub fn find_matching_close(tokens: &[Token<'_>], open_index: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open_index) {
        match token.kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// An open directly preceded by an operand starts a call
pub fn is_call_open(tokens: &[Token<'_>], index: usize) -> bool {
    index > 0
        && tokens[index].kind == TokenKind::Open
        && tokens[index - 1].is_operand()
        && tokens[index - 1].end == tokens[index].start
}

/// An open at position 0 or after another structural symbol groups
pub fn is_group_open(tokens: &[Token<'_>], index: usize) -> bool {
    tokens[index].kind == TokenKind::Open && !is_call_open(tokens, index)
}

/// Inner text when the whole of `text` is one parenthesized group
pub fn enclosing_group<'t>(text: &'t str, syntax: &ExpressionSyntax) -> Option<&'t str> {
    let tokens = tokenize(text, syntax);
    let first = tokens.first()?;
    let last = tokens.last()?;
    if first.kind != TokenKind::Open || first.start != 0 || last.end != text.len() {
        return None;
    }
    match find_matching_close(&tokens, 0) {
        Some(close) if close == tokens.len() - 1 => Some(&text[first.end..last.start]),
        _ => None,
    }
}

/// Split on separators outside any nesting, dropping empty fragments
pub fn split_top_level<'t>(text: &'t str, syntax: &ExpressionSyntax) -> Vec<&'t str> {
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for token in tokenize(text, syntax) {
        match token.kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close => depth = depth.saturating_sub(1),
            TokenKind::Separator if depth == 0 => {
                fragments.push(&text[start..token.start]);
                start = token.end;
            }
            _ => {}
        }
    }
    fragments.push(&text[start..]);

    fragments
        .into_iter()
        .filter(|fragment| !fragment.trim().is_empty())
        .collect()
}

/// Operand tokens outside any parentheses, excluding call headers
pub fn top_level_operands<'t>(text: &'t str, syntax: &ExpressionSyntax) -> Vec<&'t str> {
    let tokens = tokenize(text, syntax);
    let mut depth = 0usize;
    let mut operands = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close => depth = depth.saturating_sub(1),
            TokenKind::Operand if depth == 0 => {
                let is_header = index + 1 < tokens.len() && is_call_open(&tokens, index + 1);
                if !is_header {
                    operands.push(token.text);
                }
            }
            _ => {}
        }
    }
    operands
}

/// Last operand fragment of `text` after splitting on structural symbols
pub fn last_fragment<'t>(text: &'t str, syntax: &ExpressionSyntax) -> Option<&'t str> {
    tokenize(text, syntax)
        .last()
        .filter(|token| token.is_operand() && token.end == text.len())
        .map(|token| token.text)
}
