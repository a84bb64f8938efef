//! Event system for compiler logging

use super::codes::Code;
use crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub context: BTreeMap<String, String>,
}

fn bounded(message: &str) -> String {
    if message.len() <= MAX_LOG_MESSAGE_LENGTH {
        return message.to_string();
    }
    let mut end = MAX_LOG_MESSAGE_LENGTH;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

impl LogEvent {
    fn with_level(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message: bounded(message),
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Error, error_code, message)
    }

    /// Generic warning (code W000)
    pub fn warning(message: &str) -> Self {
        Self::with_level(LogLevel::Warning, Code::new("W000"), message)
    }

    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Warning, warning_code, message)
    }

    /// Generic info (code I000)
    pub fn info(message: &str) -> Self {
        Self::with_level(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Info, success_code, message)
    }

    /// Generic debug (code D000)
    pub fn debug(message: &str) -> Self {
        Self::with_level(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn requires_halt(&self) -> bool {
        super::codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        super::codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        super::codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        super::codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        super::codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        super::codes::is_recoverable(self.code.as_str())
    }

    /// Format for display
    pub fn format(&self) -> String {
        let expression = self
            .context
            .get("expression")
            .map(|e| format!(" in `{}`", e))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            expression
        )
    }

    /// One-line JSON record for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let error = self.is_error().then(|| ErrorDetails {
            recoverable: self.is_recoverable(),
            requires_halt: self.requires_halt(),
            description: self.description(),
            recommended_action: self.recommended_action(),
        });

        serde_json::to_string(&JsonEvent {
            timestamp: self
                .timestamp
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            level: self.level.as_str(),
            code: self.code.as_str(),
            message: &self.message,
            category: self.category(),
            severity: self.severity(),
            error,
            context: (!self.context.is_empty()).then_some(&self.context),
        })
    }
}

#[derive(Serialize)]
struct ErrorDetails {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
}

#[derive(Serialize)]
struct JsonEvent<'e> {
    timestamp: u64,
    level: &'static str,
    code: &'static str,
    message: &'e str,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'e BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::input::EMPTY_EXPRESSION, "Expression is empty");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E005");
        assert_eq!(event.category(), "Input");
    }

    #[test]
    fn test_event_with_context() {
        let event = LogEvent::error(codes::extraction::NESTING_TOO_DEEP, "Too deep")
            .with_context("depth", "300")
            .with_context("limit", "256");

        assert_eq!(event.context.get("depth"), Some(&"300".to_string()));
        assert_eq!(event.context.get("limit"), Some(&"256".to_string()));
    }

    #[test]
    fn test_event_formatting_names_expression() {
        let event = LogEvent::error(codes::build::UNKNOWN_FUNCTION, "Unknown function")
            .with_context("expression", "foo(1)");
        let formatted = event.format();

        assert!(formatted.contains("[ERROR]"));
        assert!(formatted.contains("E041"));
        assert!(formatted.contains("`foo(1)`"));
    }

    #[test]
    fn test_warning_codes() {
        let generic = LogEvent::warning("Generic warning");
        assert_eq!(generic.code.as_str(), "W000");

        let specific = LogEvent::warning_with_code(
            codes::extraction::UNBALANCED_PARENTHESES,
            "Unbalanced",
        );
        assert!(specific.is_warning());
        assert_eq!(specific.category(), "Extraction");
    }

    #[test]
    fn test_long_messages_are_bounded() {
        let long = "x".repeat(MAX_LOG_MESSAGE_LENGTH + 50);
        let event = LogEvent::info(&long);
        assert!(event.message.len() <= MAX_LOG_MESSAGE_LENGTH + 3);
        assert!(event.message.ends_with("..."));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::evaluation::DIVISION_BY_ZERO, "Division by zero")
            .with_context("expression", "1/0");

        let json = event.format_json().unwrap();
        assert!(json.contains("\"level\":\"ERROR\""));
        assert!(json.contains("\"code\":\"E063\""));
        assert!(json.contains("\"expression\":\"1/0\""));
        assert!(json.contains("\"requires_halt\":false"));

        let info = LogEvent::info("Compiled").format_json().unwrap();
        assert!(!info.contains("\"error\""));
        assert!(!info.contains("\"context\""));
    }
}
