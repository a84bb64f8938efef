use super::types::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A runtime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Binary(Vec<u8>),
    String(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Binary(_) => ValueType::Binary,
            Value::String(_) => ValueType::String,
        }
    }

    /// Integer view of booleans and integers
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Boolean(b) => Some(i64::from(*b)),
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float view of any numeric value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Widen along the numeric lattice; identity for the same type
    pub fn promote_to(&self, target: ValueType) -> Option<Value> {
        match (self, target) {
            (_, t) if t == self.value_type() => Some(self.clone()),
            (Value::Boolean(_), ValueType::Integer) => self.as_i64().map(Value::Integer),
            (Value::Boolean(_) | Value::Integer(_), ValueType::Float) => {
                self.as_f64().map(Value::Float)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Binary(bytes) => {
                f.write_str("0b")?;
                if bytes.is_empty() {
                    return f.write_str("0");
                }
                for byte in bytes {
                    write!(f, "{:08b}", byte)?;
                }
                Ok(())
            }
            Value::String(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::Boolean(true).as_i64(), Some(1));
        assert_eq!(Value::Integer(7).as_f64(), Some(7.0));
        assert_eq!(Value::Float(1.5).as_i64(), None);
        assert_eq!(Value::String("a".into()).as_f64(), None);
    }

    #[test]
    fn test_promotion() {
        assert_eq!(
            Value::Boolean(true).promote_to(ValueType::Float),
            Some(Value::Float(1.0))
        );
        assert_eq!(
            Value::Integer(3).promote_to(ValueType::Integer),
            Some(Value::Integer(3))
        );
        assert_eq!(Value::Float(3.0).promote_to(ValueType::Integer), None);
        assert_eq!(Value::Binary(vec![1]).promote_to(ValueType::Integer), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(23.0).to_string(), "23.0");
        assert_eq!(Value::Binary(vec![0x01, 0xFF]).to_string(), "0b0000000111111111");
        assert_eq!(Value::String("hi".into()).to_string(), "hi");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Value::Integer(5)).unwrap();
        assert_eq!(json, r#"{"type":"integer","value":5}"#);
    }
}
