//! String literal pre-pass
//!
//! Quoted text is registered as a string constant and replaced by its key so
//! later passes never see delimiters or whitespace inside literals.

use super::CompilationContext;
use crate::config::compile_time::input::MAX_STRING_LITERAL_LENGTH;
use crate::grammar::{tokenize, TokenKind};
use crate::logging::codes;
use crate::nodes::Value;
use crate::symbols::{is_placeholder_name, SymbolError, SymbolResult};
use crate::{log_debug, log_warning};

const ESCAPE: char = '\\';

/// Replace every delimited string literal in `text` with its constant key.
///
/// `\` escapes the delimiter and itself; any other escaped character is
/// kept with its backslash. An unterminated literal is left as text.
/// Operands outside literals shaped like generated keys are rejected with
/// `InvalidIdentifier`.
pub fn extract_strings(context: &mut CompilationContext<'_>, text: &str) -> SymbolResult<String> {
    let delimiter = context.syntax.string_delimiter().to_string();
    if delimiter.is_empty() || !text.contains(delimiter.as_str()) {
        check_plain_text(context, text)?;
        return Ok(text.to_string());
    }

    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(delimiter.as_str()) {
        check_plain_text(context, &rest[..open])?;
        output.push_str(&rest[..open]);
        let body_start = open + delimiter.len();

        let Some((content, consumed)) = read_literal(&rest[body_start..], &delimiter) else {
            log_warning!(code = codes::extraction::UNTERMINATED_STRING,
                "Unterminated string literal left as text",
                "position" => text.len() - rest.len() + open
            );
            check_plain_text(context, &rest[open..])?;
            output.push_str(&rest[open..]);
            return Ok(output);
        };

        if content.chars().count() > MAX_STRING_LITERAL_LENGTH {
            return Err(SymbolError::LimitExceeded {
                table: "string literal",
                limit: MAX_STRING_LITERAL_LENGTH,
            });
        }

        let literal_end = body_start + consumed;
        let literal_text = &rest[open..literal_end];
        let key = context
            .constants
            .register(literal_text, Value::String(content))?;

        if context.log_details() {
            log_debug!("String literal registered", "key" => key, "literal" => literal_text);
        }

        output.push_str(&key);
        rest = &rest[literal_end..];
    }

    check_plain_text(context, rest)?;
    output.push_str(rest);
    Ok(output)
}

fn check_plain_text(context: &CompilationContext<'_>, text: &str) -> SymbolResult<()> {
    match tokenize(text, context.syntax)
        .into_iter()
        .find(|token| token.kind == TokenKind::Operand && is_placeholder_name(token.text))
    {
        Some(token) => Err(SymbolError::invalid_identifier(
            token.text,
            "collides with generated placeholder names",
        )),
        None => Ok(()),
    }
}

/// Unescaped content and the byte length consumed including the closing
/// delimiter, or `None` when the delimiter never closes
fn read_literal(body: &str, delimiter: &str) -> Option<(String, usize)> {
    let mut content = String::new();
    let mut pos = 0;

    while pos < body.len() {
        let rest = &body[pos..];
        if rest.starts_with(delimiter) {
            return Some((content, pos + delimiter.len()));
        }

        let c = rest.chars().next()?;
        pos += c.len_utf8();
        if c != ESCAPE {
            content.push(c);
            continue;
        }

        let escaped = &body[pos..];
        if escaped.starts_with(delimiter) {
            content.push_str(delimiter);
            pos += delimiter.len();
            continue;
        }
        let next = escaped.chars().next()?;
        pos += next.len_utf8();
        if next != ESCAPE {
            content.push(ESCAPE);
        }
        content.push(next);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::CompilerPreferences;
    use crate::grammar::ExpressionSyntax;
    use assert_matches::assert_matches;

    fn extract(text: &str) -> (String, Vec<(String, Value)>) {
        let syntax = ExpressionSyntax::default();
        let preferences = CompilerPreferences::default();
        let mut context = CompilationContext::new(&syntax, &preferences);
        let output = extract_strings(&mut context, text).unwrap();
        let constants = context
            .constants
            .iter()
            .map(|(key, node)| (key.to_string(), node.value.clone()))
            .collect();
        (output, constants)
    }

    #[test]
    fn test_literals_become_keys() {
        let (output, constants) = extract("strlen(\"hello world\") + strlen(\"hello world\")");
        assert_eq!(output, "strlen(const0001) + strlen(const0001)");
        assert_eq!(constants, vec![("const0001".into(), Value::String("hello world".into()))]);
    }

    #[test]
    fn test_escapes() {
        let (output, constants) = extract(r#"trim("say \"hi\" \\ \n")"#);
        assert_eq!(output, "trim(const0001)");
        assert_eq!(constants[0].1, Value::String(r#"say "hi" \ \n"#.into()));
    }

    #[test]
    fn test_unterminated_literal_is_left_alone() {
        let (output, constants) = extract("x + \"open");
        assert_eq!(output, "x + \"open");
        assert!(constants.is_empty());
    }

    #[test]
    fn test_no_literals() {
        let (output, _) = extract("a + b");
        assert_eq!(output, "a + b");
    }

    #[test]
    fn test_placeholder_names_outside_literals_are_rejected() {
        let syntax = ExpressionSyntax::default();
        let preferences = CompilerPreferences::default();

        for text in ["5 + const0001", "\"a\" + item0001", "x * item0002(1)"] {
            let mut context = CompilationContext::new(&syntax, &preferences);
            assert_matches!(
                extract_strings(&mut context, text),
                Err(SymbolError::InvalidIdentifier { .. }),
                "{}",
                text
            );
        }

        let (output, _) = extract("\"const0001\" + item1");
        assert_eq!(output, "const0001 + item1");
    }
}
