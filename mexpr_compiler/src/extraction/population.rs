//! Table population: registers raw tokens as constants or parameters and
//! resolves argument fragments to placeholder keys

use super::scan::{enclosing_group, top_level_operands};
use super::{CompilationContext, TokenClass};
use crate::symbols::SymbolResult;

/// Register `token` in the tables. Idempotent.
///
/// Groupings are stripped one level at a time, compound text populates each
/// top-level operand, and a bare leaf becomes a constant when it parses as a
/// literal or a parameter otherwise.
pub fn populate(context: &mut CompilationContext<'_>, token: &str) -> SymbolResult<()> {
    if token.is_empty() || context.is_placeholder_key(token) {
        return Ok(());
    }

    if let Some(inner) = enclosing_group(token, context.syntax) {
        return populate(context, inner);
    }

    let policy = context.syntax.literals().clone();
    if context.constants.check_and_add(token, &policy)?.is_some() {
        return Ok(());
    }

    if context.syntax.contains_structural(token) {
        let operands: Vec<String> = top_level_operands(token, context.syntax)
            .into_iter()
            .map(str::to_string)
            .collect();
        // A single operand equal to the token is a leaf with an absorbed sign
        if !(operands.len() == 1 && operands[0] == token) {
            for operand in &operands {
                populate(context, operand)?;
            }
            return Ok(());
        }
    }

    if !context.parameters.exists(token) {
        context.parameters.get_or_create(token)?;
    }
    Ok(())
}

/// Placeholder text standing for `fragment` after population: a constant
/// key, a parameter name, or a symbol key (registered at `level` if new)
pub fn resolve_argument(
    context: &mut CompilationContext<'_>,
    fragment: &str,
    level: usize,
) -> SymbolResult<String> {
    let mut text = fragment;
    while let Some(inner) = enclosing_group(text, context.syntax) {
        text = inner;
    }

    populate(context, text)?;

    match context.classify(text) {
        TokenClass::Constant(key) | TokenClass::Symbol(key) => Ok(key),
        TokenClass::Parameter(name) => Ok(name),
        TokenClass::Unrecognized => context.symbols.get_or_add(text, false, level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::CompilerPreferences;
    use crate::grammar::ExpressionSyntax;
    use crate::symbols::SymbolError;
    use assert_matches::assert_matches;

    #[test]
    fn test_populate_leaves() {
        let syntax = ExpressionSyntax::default();
        let preferences = CompilerPreferences::default();
        let mut context = CompilationContext::new(&syntax, &preferences);

        populate(&mut context, "42").unwrap();
        populate(&mut context, "x").unwrap();
        populate(&mut context, "x").unwrap();
        populate(&mut context, "(y)").unwrap();

        assert_eq!(context.constants.len(), 1);
        assert_eq!(context.parameters.names(), vec!["x", "y"]);
    }

    #[test]
    fn test_populate_compound_registers_operands() {
        let syntax = ExpressionSyntax::default();
        let preferences = CompilerPreferences::default();
        let mut context = CompilationContext::new(&syntax, &preferences);

        populate(&mut context, "a*2+b").unwrap();
        assert_eq!(context.parameters.names(), vec!["a", "b"]);
        assert_eq!(context.constants.lookup_literal("2"), Some("const0001"));
    }

    #[test]
    fn test_resolve_argument_variants() {
        let syntax = ExpressionSyntax::default();
        let preferences = CompilerPreferences::default();
        let mut context = CompilationContext::new(&syntax, &preferences);
        context.register_root("").unwrap();

        assert_eq!(resolve_argument(&mut context, "5", 1).unwrap(), "const0001");
        assert_eq!(resolve_argument(&mut context, "x", 1).unwrap(), "x");
        assert_eq!(resolve_argument(&mut context, "((x))", 1).unwrap(), "x");

        let key = resolve_argument(&mut context, "x-1", 1).unwrap();
        assert_eq!(key, "item0001");
        assert_eq!(resolve_argument(&mut context, "(x-1)", 1).unwrap(), key);
        assert_eq!(context.symbols.get(&key).unwrap().level, 1);
    }

    #[test]
    fn test_placeholder_names_are_rejected_as_parameters() {
        let syntax = ExpressionSyntax::default();
        let preferences = CompilerPreferences::default();
        let mut context = CompilationContext::new(&syntax, &preferences);

        assert_matches!(
            populate(&mut context, "item0042"),
            Err(SymbolError::InvalidIdentifier { .. })
        );
    }
}
