//! Literal grammar
//!
//! A token is tried against each literal form in order and the first match
//! wins:
//!
//! 1. boolean: the configured true/false words, case-insensitive
//! 2. decimal integer: ASCII digits only, no sign, no thousands separators,
//!    must fit `i64` (larger values fall through to floating point)
//! 3. floating point: `digits [sep digits*] | sep digits`, optionally followed
//!    by `e|E [+|-] digits` when exponents are allowed; must be finite
//! 4. hexadecimal integer: prefix (case-insensitive) and 1-16 hex digits,
//!    read as the two's complement bit pattern of an `i64`
//! 5. binary byte sequence: prefix (case-insensitive) and `0`/`1` digits,
//!    grouped into bytes from the right
//!
//! Signs are never part of a literal; `-5` is negation applied to `5`.
use crate::nodes::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralPolicy {
    pub decimal_separator: char,
    pub allow_exponent: bool,
    pub hex_prefix: String,
    pub binary_prefix: String,
    pub true_literal: String,
    pub false_literal: String,
}

impl Default for LiteralPolicy {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            allow_exponent: true,
            hex_prefix: "0x".to_string(),
            binary_prefix: "0b".to_string(),
            true_literal: "true".to_string(),
            false_literal: "false".to_string(),
        }
    }
}

impl LiteralPolicy {
    /// Parse literal text; `None` means the text is not a constant
    pub fn parse(&self, text: &str) -> Option<Value> {
        if text.is_empty() {
            return None;
        }

        self.parse_boolean(text)
            .or_else(|| self.parse_integer(text))
            .or_else(|| self.parse_float(text))
            .or_else(|| self.parse_hex(text))
            .or_else(|| self.parse_binary(text))
    }

    pub fn is_literal(&self, text: &str) -> bool {
        self.parse(text).is_some()
    }

    fn parse_boolean(&self, text: &str) -> Option<Value> {
        if text.eq_ignore_ascii_case(&self.true_literal) {
            Some(Value::Boolean(true))
        } else if text.eq_ignore_ascii_case(&self.false_literal) {
            Some(Value::Boolean(false))
        } else {
            None
        }
    }

    fn parse_integer(&self, text: &str) -> Option<Value> {
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse::<i64>().ok().map(Value::Integer)
    }

    fn parse_float(&self, text: &str) -> Option<Value> {
        let (mantissa_end, has_digits) = self.scan_mantissa(text);
        if !has_digits {
            return None;
        }

        let rest = &text[mantissa_end..];
        if !rest.is_empty() && !(self.allow_exponent && is_exponent(rest)) {
            return None;
        }

        let normalized: String = text
            .chars()
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();

        normalized
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Value::Float)
    }

    /// Length of the leading `digits [sep digits*] | sep digits` run and
    /// whether it holds at least one digit
    fn scan_mantissa(&self, text: &str) -> (usize, bool) {
        let mut end = 0;
        let mut digits = 0;
        let mut seen_separator = false;

        for (index, c) in text.char_indices() {
            if c.is_ascii_digit() {
                digits += 1;
            } else if c == self.decimal_separator && !seen_separator {
                seen_separator = true;
            } else {
                break;
            }
            end = index + c.len_utf8();
        }

        (end, digits > 0)
    }

    fn parse_hex(&self, text: &str) -> Option<Value> {
        let digits = strip_prefix_ignore_case(text, &self.hex_prefix)?;
        if digits.is_empty() || digits.len() > 16 || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return None;
        }
        u64::from_str_radix(digits, 16)
            .ok()
            .map(|bits| Value::Integer(bits as i64))
    }

    fn parse_binary(&self, text: &str) -> Option<Value> {
        let bits = strip_prefix_ignore_case(text, &self.binary_prefix)?;
        if bits.is_empty() || !bits.bytes().all(|b| b == b'0' || b == b'1') {
            return None;
        }

        let padding = (8 - bits.len() % 8) % 8;
        let padded: Vec<u8> = std::iter::repeat(b'0')
            .take(padding)
            .chain(bits.bytes())
            .collect();

        let bytes = padded
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .fold(0u8, |byte, bit| (byte << 1) | (bit - b'0'))
            })
            .collect();

        Some(Value::Binary(bytes))
    }

    /// True when `text` is a float mantissa ending in an exponent marker,
    /// so a following sign belongs to the literal
    pub fn is_exponent_prefix(&self, text: &str) -> bool {
        if !self.allow_exponent {
            return false;
        }
        let Some(body) = text.strip_suffix(['e', 'E']) else {
            return false;
        };
        let (end, has_digits) = self.scan_mantissa(body);
        has_digits && end == body.len()
    }
}

fn is_exponent(text: &str) -> bool {
    let Some(rest) = text.strip_prefix(['e', 'E']) else {
        return false;
    };
    let digits = rest.strip_prefix(['+', '-']).unwrap_or(rest);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() || text.len() < prefix.len() || !text.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, tail) = text.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix).then_some(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_order() {
        let policy = LiteralPolicy::default();

        assert_eq!(policy.parse("TRUE"), Some(Value::Boolean(true)));
        assert_eq!(policy.parse("false"), Some(Value::Boolean(false)));
        assert_eq!(policy.parse("42"), Some(Value::Integer(42)));
        assert_eq!(policy.parse("2.5"), Some(Value::Float(2.5)));
        assert_eq!(policy.parse(".5"), Some(Value::Float(0.5)));
        assert_eq!(policy.parse("3."), Some(Value::Float(3.0)));
        assert_eq!(policy.parse("1e3"), Some(Value::Float(1000.0)));
        assert_eq!(policy.parse("2.5E-1"), Some(Value::Float(0.25)));
        assert_eq!(policy.parse("0xFF"), Some(Value::Integer(255)));
        assert_eq!(policy.parse("0Xff"), Some(Value::Integer(255)));
        assert_eq!(policy.parse("0b1"), Some(Value::Binary(vec![1])));
    }

    #[test]
    fn test_non_literals() {
        let policy = LiteralPolicy::default();

        for text in ["", "x", "1,000", "-5", "+5", "1e", "e5", "0x", "0xG1", "0b2", "inf", "NaN", "1.2.3"] {
            assert_eq!(policy.parse(text), None, "{text:?} should not be a literal");
        }
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        let policy = LiteralPolicy::default();
        assert_eq!(
            policy.parse("9223372036854775808"),
            Some(Value::Float(9223372036854775808.0))
        );
    }

    #[test]
    fn test_hex_uses_full_bit_pattern() {
        let policy = LiteralPolicy::default();
        assert_eq!(policy.parse("0xFFFFFFFFFFFFFFFF"), Some(Value::Integer(-1)));
        assert_eq!(policy.parse("0x1FFFFFFFFFFFFFFFF"), None);
    }

    #[test]
    fn test_binary_groups_from_right() {
        let policy = LiteralPolicy::default();
        assert_eq!(
            policy.parse("0b100000001"),
            Some(Value::Binary(vec![0x01, 0x01]))
        );
        assert_eq!(
            policy.parse("0b1111111100000000"),
            Some(Value::Binary(vec![0xFF, 0x00]))
        );
    }

    #[test]
    fn test_custom_decimal_separator_and_words() {
        let policy = LiteralPolicy {
            decimal_separator: ',',
            allow_exponent: false,
            true_literal: "yes".to_string(),
            false_literal: "no".to_string(),
            ..LiteralPolicy::default()
        };

        assert_eq!(policy.parse("2,5"), Some(Value::Float(2.5)));
        assert_eq!(policy.parse("2.5"), None);
        assert_eq!(policy.parse("1e3"), None);
        assert_eq!(policy.parse("Yes"), Some(Value::Boolean(true)));
        assert_eq!(policy.parse("true"), None);
    }

    #[test]
    fn test_exponent_prefix_detection() {
        let policy = LiteralPolicy::default();
        assert!(policy.is_exponent_prefix("1e"));
        assert!(policy.is_exponent_prefix("2.5E"));
        assert!(!policy.is_exponent_prefix("e"));
        assert!(!policy.is_exponent_prefix("x1e"));
        assert!(!policy.is_exponent_prefix("0x1e"));
    }
}
