//! Symbol and constant extraction
//!
//! Rewrites the expression text into placeholder form. String literals are
//! registered first, then function calls (depth-first, restarting the scan
//! after every replacement), then grouping parentheses innermost-first.
//! Every pass works on one [`CompilationContext`] owned by the compilation.

use crate::config::runtime::CompilerPreferences;
use crate::grammar::ExpressionSyntax;
use crate::symbols::{ConstantTable, ParameterRegistry, SymbolResult, SymbolTable, ROOT_KEY};

pub mod functions;
pub mod population;
pub mod scan;
pub mod strings;
pub mod subexpressions;

pub use functions::replace_functions;
pub use strings::extract_strings;
pub use subexpressions::extract_groupings;

/// Classification of a resolved token against the current tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClass {
    Constant(String),
    Parameter(String),
    Symbol(String),
    Unrecognized,
}

/// Tables and settings for a single compilation
#[derive(Debug)]
pub struct CompilationContext<'a> {
    pub syntax: &'a ExpressionSyntax,
    pub preferences: &'a CompilerPreferences,
    pub constants: ConstantTable,
    pub symbols: SymbolTable,
    pub parameters: ParameterRegistry,
}

impl<'a> CompilationContext<'a> {
    pub fn new(syntax: &'a ExpressionSyntax, preferences: &'a CompilerPreferences) -> Self {
        Self {
            syntax,
            preferences,
            constants: ConstantTable::new(),
            symbols: SymbolTable::new(),
            parameters: ParameterRegistry::new(),
        }
    }

    /// Register the top-level expression under the root key
    pub fn register_root(&mut self, text: &str) -> SymbolResult<()> {
        self.symbols.add(ROOT_KEY, text, false, 0)
    }

    /// Class of `token`; placeholder keys win over text lookups
    pub fn classify(&self, token: &str) -> TokenClass {
        if token.is_empty() {
            return TokenClass::Unrecognized;
        }
        if self.constants.contains_key(token) {
            return TokenClass::Constant(token.to_string());
        }
        if token != ROOT_KEY && self.symbols.contains(token) {
            return TokenClass::Symbol(token.to_string());
        }
        if let Some(key) = self.constants.lookup_literal(token) {
            return TokenClass::Constant(key.to_string());
        }
        if self.parameters.exists(token) {
            return TokenClass::Parameter(token.to_string());
        }
        if let Some(key) = self.symbols.find_by_expression(token) {
            return TokenClass::Symbol(key.to_string());
        }
        TokenClass::Unrecognized
    }

    /// Whether `token` is an existing placeholder key
    pub fn is_placeholder_key(&self, token: &str) -> bool {
        self.constants.contains_key(token) || (token != ROOT_KEY && self.symbols.contains(token))
    }

    pub(crate) fn log_details(&self) -> bool {
        self.preferences.log_extraction_details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_order() {
        let syntax = ExpressionSyntax::default();
        let preferences = CompilerPreferences::default();
        let mut context = CompilationContext::new(&syntax, &preferences);
        context.register_root("x+1").unwrap();

        let policy = syntax.literals().clone();
        let key = context.constants.check_and_add("1", &policy).unwrap().unwrap();
        context.parameters.get_or_create("x").unwrap();
        let symbol = context.symbols.get_or_add("x*2", false, 1).unwrap();

        assert_eq!(context.classify("1"), TokenClass::Constant(key.clone()));
        assert_eq!(context.classify(&key), TokenClass::Constant(key));
        assert_eq!(context.classify("x"), TokenClass::Parameter("x".into()));
        assert_eq!(context.classify("x*2"), TokenClass::Symbol(symbol.clone()));
        assert_eq!(context.classify(&symbol), TokenClass::Symbol(symbol));
        assert_eq!(context.classify("y"), TokenClass::Unrecognized);
        assert_eq!(context.classify(""), TokenClass::Unrecognized);
    }
}
