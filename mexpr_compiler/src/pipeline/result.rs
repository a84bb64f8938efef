use crate::computation::ComputationBody;
use crate::grammar::{tokenize, ExpressionSyntax, TokenKind};
use crate::logging::codes;
use crate::symbols::{ConstantTable, SymbolTable};
use std::time::Duration;

/// Everything a compilation produced: the body plus the populated tables
#[derive(Debug, Clone)]
pub struct CompilationResult {
    pub source: String,
    pub body: ComputationBody,
    pub symbols: SymbolTable,
    pub constants: ConstantTable,
    pub syntax: ExpressionSyntax,
    pub duration: Duration,
}

impl CompilationResult {
    pub fn new(
        source: &str,
        body: ComputationBody,
        symbols: SymbolTable,
        constants: ConstantTable,
        syntax: ExpressionSyntax,
        duration: Duration,
    ) -> Self {
        Self {
            source: source.to_string(),
            body,
            symbols,
            constants,
            syntax,
            duration,
        }
    }

    /// Symbol text with constant keys replaced by their literal text
    pub fn resolved_text(&self, key: &str) -> Option<String> {
        let text = &self.symbols.get(key)?.expression;
        let mut resolved = String::with_capacity(text.len());
        let mut last = 0;

        for token in tokenize(text, &self.syntax) {
            resolved.push_str(&text[last..token.start]);
            match self.constants.get(token.text) {
                Some(constant) if token.kind == TokenKind::Operand => {
                    resolved.push_str(&constant.canonical_text)
                }
                _ => resolved.push_str(token.text),
            }
            last = token.end;
        }
        resolved.push_str(&text[last..]);
        Some(resolved)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.sub_expression_count()
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    pub fn log_success(&self) {
        crate::log_success!(
            codes::success::COMPILATION_COMPLETE,
            "Expression compiled",
            "symbols" => self.symbol_count(),
            "constants" => self.constant_count(),
            "parameters" => self.body.parameters().len(),
            "duration_ms" => format!("{:.3}", self.duration.as_secs_f64() * 1000.0)
        );
    }
}
