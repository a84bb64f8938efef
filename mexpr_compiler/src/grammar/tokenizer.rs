//! Splits expression text into structural symbols and operand runs

use super::syntax::{ExpressionSyntax, SymbolRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Open,
    Close,
    Separator,
    Operator,
    Operand,
}

impl From<SymbolRole> for TokenKind {
    fn from(role: SymbolRole) -> Self {
        match role {
            SymbolRole::Open => TokenKind::Open,
            SymbolRole::Close => TokenKind::Close,
            SymbolRole::Separator => TokenKind::Separator,
            SymbolRole::Operator => TokenKind::Operator,
        }
    }
}

/// A token borrowing its text; `start..end` is the byte range in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Token<'a> {
    pub fn is_operand(&self) -> bool {
        self.kind == TokenKind::Operand
    }
}

/// Tokenize `text`. Whitespace only terminates operands.
///
/// A `+` or `-` directly after a float mantissa ending in an exponent marker
/// (`1e-3`) stays inside the operand when a digit follows it.
pub fn tokenize<'a>(text: &'a str, syntax: &ExpressionSyntax) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    let mut operand_start: Option<usize> = None;
    let mut pos = 0;

    let flush = |tokens: &mut Vec<Token<'a>>, start: &mut Option<usize>, end: usize| {
        if let Some(s) = start.take() {
            tokens.push(Token {
                kind: TokenKind::Operand,
                text: &text[s..end],
                start: s,
                end,
            });
        }
    };

    while pos < text.len() {
        let rest = &text[pos..];

        if let Some((symbol, role)) = syntax.match_structural(rest) {
            let absorbed = (symbol == "+" || symbol == "-")
                && operand_start.is_some_and(|s| {
                    syntax.literals().is_exponent_prefix(&text[s..pos])
                        && rest[symbol.len()..].starts_with(|c: char| c.is_ascii_digit())
                });

            if !absorbed {
                flush(&mut tokens, &mut operand_start, pos);
                tokens.push(Token {
                    kind: role.into(),
                    text: &text[pos..pos + symbol.len()],
                    start: pos,
                    end: pos + symbol.len(),
                });
                pos += symbol.len();
                continue;
            }
        }

        let Some(c) = rest.chars().next() else {
            break;
        };

        if c.is_whitespace() {
            flush(&mut tokens, &mut operand_start, pos);
        } else if operand_start.is_none() {
            operand_start = Some(pos);
        }
        pos += c.len_utf8();
    }

    flush(&mut tokens, &mut operand_start, text.len());
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(text: &str) -> Vec<(TokenKind, &str)> {
        tokenize(text, &ExpressionSyntax::default())
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_basic_tokenization() {
        assert_eq!(
            kinds_and_text("max(x,5)+1"),
            vec![
                (TokenKind::Operand, "max"),
                (TokenKind::Open, "("),
                (TokenKind::Operand, "x"),
                (TokenKind::Separator, ","),
                (TokenKind::Operand, "5"),
                (TokenKind::Close, ")"),
                (TokenKind::Operator, "+"),
                (TokenKind::Operand, "1"),
            ]
        );
    }

    #[test]
    fn test_longest_operator_match() {
        assert_eq!(
            kinds_and_text("a<=b!=c<<2"),
            vec![
                (TokenKind::Operand, "a"),
                (TokenKind::Operator, "<="),
                (TokenKind::Operand, "b"),
                (TokenKind::Operator, "!="),
                (TokenKind::Operand, "c"),
                (TokenKind::Operator, "<<"),
                (TokenKind::Operand, "2"),
            ]
        );
    }

    #[test]
    fn test_exponent_sign_stays_in_literal() {
        assert_eq!(
            kinds_and_text("x+1e-3"),
            vec![
                (TokenKind::Operand, "x"),
                (TokenKind::Operator, "+"),
                (TokenKind::Operand, "1e-3"),
            ]
        );
        assert_eq!(
            kinds_and_text("e-3"),
            vec![
                (TokenKind::Operand, "e"),
                (TokenKind::Operator, "-"),
                (TokenKind::Operand, "3"),
            ]
        );
    }

    #[test]
    fn test_whitespace_splits_operands() {
        let tokens = tokenize("a b", &ExpressionSyntax::default());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].start, 2);
        assert_eq!(tokens[1].end, 3);
    }
}
