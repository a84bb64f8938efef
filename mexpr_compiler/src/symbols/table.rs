//! Symbol table: placeholder keys for sub-expressions and function calls

use super::error::{SymbolError, SymbolResult};
use crate::config::compile_time::extraction::MAX_SYMBOLS;
use serde::Serialize;
use std::collections::HashMap;

pub const SYMBOL_KEY_PREFIX: &str = "item";

/// Key of the top-level expression
pub const ROOT_KEY: &str = "";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionSymbol {
    /// Current text; rewritten in place as inner parts are replaced by keys
    pub expression: String,
    /// Call symbols hold `name(args)` and are never re-scanned
    pub is_function_call: bool,
    /// Discovery depth; the root is level 0
    pub level: usize,
}

/// Level dictionary of symbols.
///
/// Keys are `item0001`, `item0002`, ... in discovery order; the root lives
/// under [`ROOT_KEY`]. A reverse map from text to key de-duplicates
/// registrations and never contains the root.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, ExpressionSymbol>,
    order: Vec<String>,
    by_text: HashMap<String, String>,
    sequence: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, text: &str, is_function_call: bool, level: usize) -> SymbolResult<()> {
        if self.symbols.contains_key(key) {
            return Err(SymbolError::duplicate_key(key));
        }
        if self.order.len() >= MAX_SYMBOLS {
            return Err(SymbolError::LimitExceeded {
                table: "symbol",
                limit: MAX_SYMBOLS,
            });
        }

        self.symbols.insert(
            key.to_string(),
            ExpressionSymbol {
                expression: text.to_string(),
                is_function_call,
                level,
            },
        );
        self.order.push(key.to_string());
        if key != ROOT_KEY {
            self.by_text
                .entry(text.to_string())
                .or_insert_with(|| key.to_string());
        }
        Ok(())
    }

    /// Key already holding `text`, or a new `itemNNNN` registration
    pub fn get_or_add(&mut self, text: &str, is_function_call: bool, level: usize) -> SymbolResult<String> {
        if let Some(key) = self.by_text.get(text) {
            return Ok(key.clone());
        }

        let key = self.next_key();
        self.add(&key, text, is_function_call, level)?;
        Ok(key)
    }

    fn next_key(&mut self) -> String {
        loop {
            self.sequence += 1;
            let key = format!("{}{:04}", SYMBOL_KEY_PREFIX, self.sequence);
            if !self.symbols.contains_key(&key) {
                return key;
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ExpressionSymbol> {
        self.symbols.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.symbols.contains_key(key)
    }

    /// Rewrite the text of `key`; the new text also resolves to `key`
    pub fn set_expression(&mut self, key: &str, text: &str) -> SymbolResult<()> {
        let symbol = self
            .symbols
            .get_mut(key)
            .ok_or_else(|| SymbolError::unknown_key(key))?;
        symbol.expression = text.to_string();

        if key != ROOT_KEY {
            self.by_text
                .entry(text.to_string())
                .or_insert_with(|| key.to_string());
        }
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Key at insertion index; used to walk the table while it grows
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    pub fn find_by_expression(&self, text: &str) -> Option<&str> {
        self.by_text.get(text).map(String::as_str)
    }

    /// Keys by ascending level, insertion order within a level
    pub fn keys_by_level(&self) -> Vec<&str> {
        let mut keys: Vec<(usize, usize, &str)> = self
            .order
            .iter()
            .enumerate()
            .filter_map(|(index, key)| {
                self.symbols
                    .get(key)
                    .map(|symbol| (symbol.level, index, key.as_str()))
            })
            .collect();
        keys.sort();
        keys.into_iter().map(|(_, _, key)| key).collect()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExpressionSymbol)> {
        self.order
            .iter()
            .filter_map(|key| self.symbols.get(key).map(|symbol| (key.as_str(), symbol)))
    }

    /// Number of symbols excluding the root
    pub fn sub_expression_count(&self) -> usize {
        self.order.iter().filter(|key| key.as_str() != ROOT_KEY).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_add_and_duplicate_key() {
        let mut table = SymbolTable::new();
        table.add(ROOT_KEY, "a+b", false, 0).unwrap();
        table.add("item0001", "max(a,b)", true, 1).unwrap();

        assert_matches!(
            table.add("item0001", "other", false, 1),
            Err(SymbolError::DuplicateSymbolKey { .. })
        );
        assert_eq!(table.count(), 2);
        assert!(table.get("item0001").unwrap().is_function_call);
    }

    #[test]
    fn test_get_or_add_deduplicates() {
        let mut table = SymbolTable::new();
        table.add(ROOT_KEY, "4*5", false, 0).unwrap();

        let first = table.get_or_add("4*5", false, 1).unwrap();
        assert_eq!(first, "item0001");
        let second = table.get_or_add("4*5", false, 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(table.get_or_add("x-1", false, 1).unwrap(), "item0002");
        assert_eq!(table.find_by_expression("x-1"), Some("item0002"));
    }

    #[test]
    fn test_set_expression_updates_reverse_lookup() {
        let mut table = SymbolTable::new();
        let key = table.get_or_add("f(g(x))", true, 1).unwrap();

        table.set_expression(&key, "f(item0002)").unwrap();
        assert_eq!(table.get(&key).unwrap().expression, "f(item0002)");
        assert_eq!(table.find_by_expression("f(item0002)"), Some(key.as_str()));
        assert_matches!(
            table.set_expression("item0099", "x"),
            Err(SymbolError::UnknownSymbolKey { .. })
        );
    }

    #[test]
    fn test_level_ordering() {
        let mut table = SymbolTable::new();
        table.add(ROOT_KEY, "root", false, 0).unwrap();
        table.add("item0001", "deep", false, 2).unwrap();
        table.add("item0002", "shallow", false, 1).unwrap();
        table.add("item0003", "also shallow", false, 1).unwrap();

        assert_eq!(
            table.keys_by_level(),
            vec![ROOT_KEY, "item0002", "item0003", "item0001"]
        );
        assert_eq!(table.key_at(1), Some("item0001"));
        assert_eq!(table.sub_expression_count(), 3);
    }

    #[test]
    fn test_generated_keys_skip_manual_ones() {
        let mut table = SymbolTable::new();
        table.add("item0001", "manual", false, 1).unwrap();
        assert_eq!(table.get_or_add("generated", false, 1).unwrap(), "item0002");
    }
}
