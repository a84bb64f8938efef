//! Configurable structural tokens of the expression language

use super::literals::LiteralPolicy;
use super::operators::operator_symbols;
use crate::logging::codes;
use crate::logging::Code;

/// Role a structural symbol plays in expression text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRole {
    Open,
    Close,
    Separator,
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxConfigError {
    #[error("The {role} token must not be empty")]
    EmptyToken { role: &'static str },

    #[error("The {role} token '{token}' must not contain whitespace")]
    WhitespaceInToken { role: &'static str, token: String },

    #[error("The {first} and {second} tokens are both '{token}'")]
    DuplicateToken {
        first: &'static str,
        second: &'static str,
        token: String,
    },

    #[error("The {role} token '{token}' starts with the {other} token '{prefix}'")]
    PrefixConflict {
        role: &'static str,
        token: String,
        other: &'static str,
        prefix: String,
    },

    #[error("The {role} token '{token}' is already an operator symbol")]
    OperatorConflict { role: &'static str, token: String },

    #[error("Decimal separator '{separator}' appears in structural symbol '{token}'")]
    DecimalSeparatorConflict { separator: char, token: String },
}

impl SyntaxConfigError {
    pub fn error_code(&self) -> Code {
        codes::input::INVALID_SYNTAX_CONFIGURATION
    }
}

/// Open, close, separator and string delimiter tokens plus the literal policy.
///
/// Structural symbols are every operator symbol plus open, close and
/// separator; they are kept sorted longest first so scanning always takes
/// the longest match.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionSyntax {
    open: String,
    close: String,
    separator: String,
    string_delimiter: String,
    literals: LiteralPolicy,
    structural: Vec<(String, SymbolRole)>,
}

impl Default for ExpressionSyntax {
    fn default() -> Self {
        let literals = LiteralPolicy::default();
        let structural = build_structural("(", ")", ",");
        Self {
            open: "(".to_string(),
            close: ")".to_string(),
            separator: ",".to_string(),
            string_delimiter: "\"".to_string(),
            literals,
            structural,
        }
    }
}

impl ExpressionSyntax {
    pub fn new(
        open: &str,
        close: &str,
        separator: &str,
        string_delimiter: &str,
        literals: LiteralPolicy,
    ) -> Result<Self, SyntaxConfigError> {
        let tokens = [
            ("open", open),
            ("close", close),
            ("separator", separator),
            ("string delimiter", string_delimiter),
        ];

        for (role, token) in tokens {
            if token.is_empty() {
                return Err(SyntaxConfigError::EmptyToken { role });
            }
            if token.chars().any(char::is_whitespace) {
                return Err(SyntaxConfigError::WhitespaceInToken {
                    role,
                    token: token.to_string(),
                });
            }
        }

        for (i, (first, a)) in tokens.iter().enumerate() {
            for (second, b) in tokens.iter().skip(i + 1) {
                if a == b {
                    return Err(SyntaxConfigError::DuplicateToken {
                        first: *first,
                        second: *second,
                        token: a.to_string(),
                    });
                }
            }
        }

        // Open, close and separator must be distinguishable at every position
        for (role, token) in &tokens[..3] {
            for (other, prefix) in &tokens[..3] {
                if role != other && token.starts_with(*prefix) {
                    return Err(SyntaxConfigError::PrefixConflict {
                        role: *role,
                        token: token.to_string(),
                        other: *other,
                        prefix: prefix.to_string(),
                    });
                }
            }
        }

        let operators = operator_symbols();
        for (role, token) in tokens {
            if operators.iter().any(|symbol| *symbol == token) {
                return Err(SyntaxConfigError::OperatorConflict {
                    role,
                    token: token.to_string(),
                });
            }
        }

        let structural = build_structural(open, close, separator);
        if let Some((token, _)) = structural
            .iter()
            .find(|(symbol, _)| symbol.contains(literals.decimal_separator))
        {
            return Err(SyntaxConfigError::DecimalSeparatorConflict {
                separator: literals.decimal_separator,
                token: token.clone(),
            });
        }

        Ok(Self {
            open: open.to_string(),
            close: close.to_string(),
            separator: separator.to_string(),
            string_delimiter: string_delimiter.to_string(),
            literals,
            structural,
        })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn string_delimiter(&self) -> &str {
        &self.string_delimiter
    }

    pub fn literals(&self) -> &LiteralPolicy {
        &self.literals
    }

    /// Structural symbols with their roles, longest first
    pub fn structural_symbols(&self) -> &[(String, SymbolRole)] {
        &self.structural
    }

    /// Longest structural symbol starting `text`
    pub fn match_structural(&self, text: &str) -> Option<(&str, SymbolRole)> {
        self.structural
            .iter()
            .find(|(symbol, _)| text.starts_with(symbol.as_str()))
            .map(|(symbol, role)| (symbol.as_str(), *role))
    }

    pub fn ends_with_structural(&self, text: &str) -> bool {
        self.structural
            .iter()
            .any(|(symbol, _)| text.ends_with(symbol.as_str()))
    }

    pub fn contains_structural(&self, text: &str) -> bool {
        self.structural
            .iter()
            .any(|(symbol, _)| text.contains(symbol.as_str()))
    }
}

fn build_structural(open: &str, close: &str, separator: &str) -> Vec<(String, SymbolRole)> {
    let mut structural: Vec<(String, SymbolRole)> = operator_symbols()
        .into_iter()
        .map(|symbol| (symbol.to_string(), SymbolRole::Operator))
        .collect();

    structural.push((open.to_string(), SymbolRole::Open));
    structural.push((close.to_string(), SymbolRole::Close));
    structural.push((separator.to_string(), SymbolRole::Separator));

    structural.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    structural
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn syntax(open: &str, close: &str, separator: &str) -> Result<ExpressionSyntax, SyntaxConfigError> {
        ExpressionSyntax::new(open, close, separator, "\"", LiteralPolicy::default())
    }

    #[test]
    fn test_default_syntax() {
        let syntax = ExpressionSyntax::default();
        assert_eq!(syntax.open(), "(");
        assert_eq!(syntax.close(), ")");
        assert_eq!(syntax.separator(), ",");
        assert_eq!(syntax.string_delimiter(), "\"");
        assert_eq!(syntax, ExpressionSyntax::new("(", ")", ",", "\"", LiteralPolicy::default()).unwrap());
    }

    #[test]
    fn test_longest_match_wins() {
        let syntax = ExpressionSyntax::default();
        assert_eq!(syntax.match_structural("<=1"), Some(("<=", SymbolRole::Operator)));
        assert_eq!(syntax.match_structural("<<2"), Some(("<<", SymbolRole::Operator)));
        assert_eq!(syntax.match_structural("!x"), Some(("!", SymbolRole::Operator)));
        assert_eq!(syntax.match_structural("(a"), Some(("(", SymbolRole::Open)));
        assert_eq!(syntax.match_structural("abc"), None);
    }

    #[test]
    fn test_multi_character_tokens() {
        let syntax = syntax("<:", ":>", ";;").unwrap();
        assert_eq!(syntax.match_structural("<:x"), Some(("<:", SymbolRole::Open)));
        assert_eq!(syntax.match_structural(";;"), Some((";;", SymbolRole::Separator)));
        assert!(syntax.ends_with_structural("max<:"));
    }

    #[test]
    fn test_invalid_configurations() {
        assert_matches!(syntax("", ")", ","), Err(SyntaxConfigError::EmptyToken { role: "open" }));
        assert_matches!(syntax("( ", ")", ","), Err(SyntaxConfigError::WhitespaceInToken { .. }));
        assert_matches!(syntax("(", "(", ","), Err(SyntaxConfigError::DuplicateToken { .. }));
        assert_matches!(syntax("[", "[[", ","), Err(SyntaxConfigError::PrefixConflict { .. }));
        assert_matches!(syntax("(", ")", "+"), Err(SyntaxConfigError::OperatorConflict { .. }));
    }

    #[test]
    fn test_decimal_separator_conflict() {
        let policy = LiteralPolicy {
            decimal_separator: ',',
            ..LiteralPolicy::default()
        };
        let result = ExpressionSyntax::new("(", ")", ",", "\"", policy.clone());
        assert_matches!(result, Err(SyntaxConfigError::DecimalSeparatorConflict { separator: ',', .. }));

        assert!(ExpressionSyntax::new("(", ")", ";", "\"", policy).is_ok());
    }
}
