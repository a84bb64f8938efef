use crate::nodes::Value;
use std::collections::HashMap;

/// Named parameter values for one evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBindings {
    values: HashMap<String, Value>,
}

impl ParameterBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the value it replaced
    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bind(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ParameterBindings {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_replace() {
        let mut bindings = ParameterBindings::new();
        assert!(bindings.is_empty());
        assert_eq!(bindings.bind("x", Value::Integer(1)), None);
        assert_eq!(bindings.bind("x", Value::Integer(2)), Some(Value::Integer(1)));
        assert_eq!(bindings.get("x"), Some(&Value::Integer(2)));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_builder_and_collect() {
        let chained = ParameterBindings::new()
            .with("a", Value::Boolean(true))
            .with("b", Value::Float(0.5));
        let collected: ParameterBindings = vec![("a", Value::Boolean(true)), ("b", Value::Float(0.5))]
            .into_iter()
            .collect();
        assert_eq!(chained, collected);
    }
}
