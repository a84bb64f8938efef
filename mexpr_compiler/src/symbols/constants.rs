//! Constant table: literal text to shared constant nodes

use super::error::{SymbolError, SymbolResult};
use crate::config::compile_time::extraction::MAX_CONSTANTS;
use crate::grammar::LiteralPolicy;
use crate::nodes::{ConstantNode, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub const CONSTANT_KEY_PREFIX: &str = "const";

/// Constants keyed `const0001`, `const0002`, ... in recognition order, with
/// a reverse lookup from literal text so one text maps to one node.
#[derive(Debug, Clone, Default)]
pub struct ConstantTable {
    entries: HashMap<String, Arc<ConstantNode>>,
    order: Vec<String>,
    by_text: HashMap<String, String>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of `text` if it is a literal, registering it on first sight
    pub fn check_and_add(&mut self, text: &str, policy: &LiteralPolicy) -> SymbolResult<Option<String>> {
        if let Some(key) = self.by_text.get(text) {
            return Ok(Some(key.clone()));
        }

        match policy.parse(text) {
            Some(value) => self.insert(text, value).map(Some),
            None => Ok(None),
        }
    }

    /// Register a pre-parsed value (string literals); idempotent on `text`
    pub fn register(&mut self, text: &str, value: Value) -> SymbolResult<String> {
        if let Some(key) = self.by_text.get(text) {
            return Ok(key.clone());
        }
        self.insert(text, value)
    }

    fn insert(&mut self, text: &str, value: Value) -> SymbolResult<String> {
        if self.order.len() >= MAX_CONSTANTS {
            return Err(SymbolError::LimitExceeded {
                table: "constant",
                limit: MAX_CONSTANTS,
            });
        }

        let key = format!("{}{:04}", CONSTANT_KEY_PREFIX, self.order.len() + 1);
        let node = Arc::new(ConstantNode {
            value,
            canonical_text: text.to_string(),
        });

        self.entries.insert(key.clone(), node);
        self.order.push(key.clone());
        self.by_text.insert(text.to_string(), key.clone());
        Ok(key)
    }

    pub fn get(&self, key: &str) -> Option<&Arc<ConstantNode>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Key registered for literal text, without parsing
    pub fn lookup_literal(&self, text: &str) -> Option<&str> {
        self.by_text.get(text).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in recognition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<ConstantNode>)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|node| (key.as_str(), node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_is_idempotent() {
        let policy = LiteralPolicy::default();
        let mut table = ConstantTable::new();

        let first = table.check_and_add("42", &policy).unwrap();
        let second = table.check_and_add("42", &policy).unwrap();

        assert_eq!(first, Some("const0001".to_string()));
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_same_text_shares_node() {
        let policy = LiteralPolicy::default();
        let mut table = ConstantTable::new();

        let key = table.check_and_add("2.5", &policy).unwrap().unwrap();
        let again = table.check_and_add("2.5", &policy).unwrap().unwrap();
        let a = table.get(&key).unwrap();
        let b = table.get(&again).unwrap();
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(a.value, Value::Float(2.5));
        assert_eq!(a.canonical_text, "2.5");
    }

    #[test]
    fn test_non_literal_is_not_an_error() {
        let policy = LiteralPolicy::default();
        let mut table = ConstantTable::new();

        assert_eq!(table.check_and_add("x", &policy).unwrap(), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_string_registration_and_order() {
        let policy = LiteralPolicy::default();
        let mut table = ConstantTable::new();

        table.check_and_add("1", &policy).unwrap();
        let key = table.register("\"hi\"", Value::String("hi".into())).unwrap();
        assert_eq!(key, "const0002");
        assert_eq!(table.lookup_literal("\"hi\""), Some("const0002"));
        assert!(table.contains_key("const0002"));

        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["const0001", "const0002"]);
    }
}
