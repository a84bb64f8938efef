use super::result::CompilationResult;
use crate::nodes::{TypeSet, Value};
use crate::symbols::ParameterNode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SymbolOutput {
    pub key: String,
    pub expression: String,
    pub resolved: String,
    pub is_function_call: bool,
    pub level: usize,
}

#[derive(Debug, Serialize)]
pub struct ConstantOutput {
    pub key: String,
    pub text: String,
    pub value: Value,
}

/// Serializable view of a compilation, optionally with an evaluated value
#[derive(Debug, Serialize)]
pub struct CompilationOutput {
    pub expression: String,
    pub rendered: String,
    pub result_types: TypeSet,
    pub parameters: Vec<ParameterNode>,
    pub symbols: Vec<SymbolOutput>,
    pub constants: Vec<ConstantOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl CompilationOutput {
    pub fn new(result: &CompilationResult, include_timing: bool) -> Self {
        let symbols = result
            .symbols
            .iter()
            .map(|(key, symbol)| SymbolOutput {
                key: key.to_string(),
                expression: symbol.expression.clone(),
                resolved: result
                    .resolved_text(key)
                    .unwrap_or_else(|| symbol.expression.clone()),
                is_function_call: symbol.is_function_call,
                level: symbol.level,
            })
            .collect();

        let constants = result
            .constants
            .iter()
            .map(|(key, node)| ConstantOutput {
                key: key.to_string(),
                text: node.canonical_text.clone(),
                value: node.value.clone(),
            })
            .collect();

        Self {
            expression: result.source.clone(),
            rendered: result.body.render(),
            result_types: result.body.result_types(),
            parameters: result.body.parameters().iter().cloned().collect(),
            symbols,
            constants,
            value: None,
            evaluation_error: None,
            duration_ms: include_timing.then(|| result.duration.as_secs_f64() * 1000.0),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_evaluation_error(mut self, error: impl ToString) -> Self {
        self.evaluation_error = Some(error.to_string());
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
