//! Parameter registry: one node per distinct name, slots in discovery order

use super::constants::CONSTANT_KEY_PREFIX;
use super::error::{SymbolError, SymbolResult};
use super::table::SYMBOL_KEY_PREFIX;
use crate::config::compile_time::extraction::MAX_PARAMETERS;
use crate::config::compile_time::input::MAX_IDENTIFIER_LENGTH;
use crate::nodes::TypeSet;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterNode {
    pub name: String,
    pub position: usize,
    pub allowed: TypeSet,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    nodes: Vec<ParameterNode>,
    index: HashMap<String, usize>,
}

/// True for names of the form `<prefix>` followed by four or more digits
fn is_placeholder(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|digits| digits.len() >= 4 && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Whether `name` has the shape of a generated symbol or constant key
pub fn is_placeholder_name(name: &str) -> bool {
    is_placeholder(name, SYMBOL_KEY_PREFIX) || is_placeholder(name, CONSTANT_KEY_PREFIX)
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Existing parameter or a new one with all types allowed
    pub fn get_or_create(&mut self, name: &str) -> SymbolResult<&ParameterNode> {
        if let Some(&slot) = self.index.get(name) {
            return Ok(&self.nodes[slot]);
        }

        if name.is_empty() {
            return Err(SymbolError::invalid_identifier(name, "parameter name is empty"));
        }
        if name.chars().count() > MAX_IDENTIFIER_LENGTH {
            return Err(SymbolError::invalid_identifier(
                name,
                &format!("longer than {} characters", MAX_IDENTIFIER_LENGTH),
            ));
        }
        if is_placeholder_name(name) {
            return Err(SymbolError::invalid_identifier(
                name,
                "collides with generated placeholder names",
            ));
        }
        if self.nodes.len() >= MAX_PARAMETERS {
            return Err(SymbolError::LimitExceeded {
                table: "parameter",
                limit: MAX_PARAMETERS,
            });
        }

        let slot = self.nodes.len();
        self.nodes.push(ParameterNode {
            name: name.to_string(),
            position: slot,
            allowed: TypeSet::ANY,
        });
        self.index.insert(name.to_string(), slot);
        Ok(&self.nodes[slot])
    }

    pub fn get(&self, name: &str) -> Option<&ParameterNode> {
        self.index.get(name).map(|&slot| &self.nodes[slot])
    }

    pub fn by_slot(&self, slot: usize) -> Option<&ParameterNode> {
        self.nodes.get(slot)
    }

    /// Restrict the allowed types of `name`; an empty result is an error
    pub fn narrow(&mut self, name: &str, types: TypeSet) -> SymbolResult<TypeSet> {
        let slot = *self
            .index
            .get(name)
            .ok_or_else(|| SymbolError::unknown_key(name))?;
        let node = &mut self.nodes[slot];

        let narrowed = node.allowed.intersection(types);
        if narrowed.is_empty() {
            return Err(SymbolError::ConflictingParameterType {
                name: name.to_string(),
                existing: node.allowed,
                requested: types,
            });
        }

        node.allowed = narrowed;
        Ok(narrowed)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Names in slot order
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_one_node_per_name() {
        let mut registry = ParameterRegistry::new();
        assert!(!registry.exists("x"));

        let slot = registry.get_or_create("x").unwrap().position;
        registry.get_or_create("y").unwrap();
        let again = registry.get_or_create("x").unwrap().position;

        assert_eq!(slot, again);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["x", "y"]);
        assert_eq!(registry.by_slot(1).map(|p| p.name.as_str()), Some("y"));
    }

    #[test]
    fn test_invalid_identifiers() {
        let mut registry = ParameterRegistry::new();

        assert_matches!(registry.get_or_create(""), Err(SymbolError::InvalidIdentifier { .. }));
        assert_matches!(
            registry.get_or_create("item0003"),
            Err(SymbolError::InvalidIdentifier { .. })
        );
        assert_matches!(
            registry.get_or_create("const0001"),
            Err(SymbolError::InvalidIdentifier { .. })
        );
        let long = "p".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert_matches!(registry.get_or_create(&long), Err(SymbolError::InvalidIdentifier { .. }));

        assert!(registry.get_or_create("item").is_ok());
        assert!(registry.get_or_create("item12").is_ok());
    }

    #[test]
    fn test_narrowing() {
        let mut registry = ParameterRegistry::new();
        registry.get_or_create("x").unwrap();

        assert_eq!(registry.narrow("x", TypeSet::NUMERIC).unwrap(), TypeSet::NUMERIC);
        assert_eq!(
            registry.narrow("x", TypeSet::INTEGER.union(TypeSet::STRING)).unwrap(),
            TypeSet::INTEGER
        );
        assert_matches!(
            registry.narrow("x", TypeSet::STRING),
            Err(SymbolError::ConflictingParameterType { .. })
        );
        assert_eq!(registry.get("x").unwrap().allowed, TypeSet::INTEGER);
    }
}
