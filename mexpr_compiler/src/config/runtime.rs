// RUNTIME PREFERENCES (User Experience)

use crate::grammar::{ExpressionSyntax, LiteralPolicy, SyntaxConfigError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxPreferences {
    /// Token opening a call argument list or a grouping
    pub open_token: String,

    /// Token closing a call argument list or a grouping
    pub close_token: String,

    /// Argument separator inside call argument lists
    pub separator: String,

    /// Delimiter of string literals
    pub string_delimiter: String,
}

impl Default for SyntaxPreferences {
    fn default() -> Self {
        Self {
            open_token: env::var("MEXPR_SYNTAX_OPEN").unwrap_or_else(|_| "(".to_string()),
            close_token: env::var("MEXPR_SYNTAX_CLOSE").unwrap_or_else(|_| ")".to_string()),
            separator: env::var("MEXPR_SYNTAX_SEPARATOR").unwrap_or_else(|_| ",".to_string()),
            string_delimiter: env::var("MEXPR_SYNTAX_STRING_DELIMITER")
                .unwrap_or_else(|_| "\"".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteralPreferences {
    /// Decimal separator of floating point literals
    pub decimal_separator: char,

    /// Whether floating point literals may carry an exponent
    pub allow_exponent: bool,

    /// Prefix of hexadecimal integer literals (matched case-insensitively)
    pub hex_prefix: String,

    /// Prefix of binary byte-sequence literals (matched case-insensitively)
    pub binary_prefix: String,

    /// Spelling of the boolean true literal
    pub true_literal: String,

    /// Spelling of the boolean false literal
    pub false_literal: String,
}

impl Default for LiteralPreferences {
    fn default() -> Self {
        Self {
            decimal_separator: env::var("MEXPR_LITERAL_DECIMAL_SEPARATOR")
                .ok()
                .and_then(|v| v.chars().next())
                .unwrap_or('.'),
            allow_exponent: env::var("MEXPR_LITERAL_ALLOW_EXPONENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            hex_prefix: env::var("MEXPR_LITERAL_HEX_PREFIX").unwrap_or_else(|_| "0x".to_string()),
            binary_prefix: env::var("MEXPR_LITERAL_BINARY_PREFIX")
                .unwrap_or_else(|_| "0b".to_string()),
            true_literal: env::var("MEXPR_LITERAL_TRUE").unwrap_or_else(|_| "true".to_string()),
            false_literal: env::var("MEXPR_LITERAL_FALSE").unwrap_or_else(|_| "false".to_string()),
        }
    }
}

impl LiteralPreferences {
    pub fn to_policy(&self) -> LiteralPolicy {
        LiteralPolicy {
            decimal_separator: self.decimal_separator,
            allow_exponent: self.allow_exponent,
            hex_prefix: self.hex_prefix.clone(),
            binary_prefix: self.binary_prefix.clone(),
            true_literal: self.true_literal.clone(),
            false_literal: self.false_literal.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerPreferences {
    /// Whether every placeholder replacement is logged at debug level
    pub log_extraction_details: bool,

    /// Whether compile durations are reported in results
    pub include_timing: bool,
}

impl Default for CompilerPreferences {
    fn default() -> Self {
        Self {
            log_extraction_details: env::var("MEXPR_COMPILER_LOG_EXTRACTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_timing: env::var("MEXPR_COMPILER_INCLUDE_TIMING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Preferred minimum log level (the compile-time floor still applies)
    pub min_log_level: LogLevel,

    /// Whether to include timing metrics in logs
    pub log_performance_events: bool,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to tag events with the expression being compiled
    pub include_expression_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("MEXPR_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("MEXPR_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("MEXPR_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var("MEXPR_LOGGING_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            enable_cargo_style_output: env::var("MEXPR_LOGGING_CARGO_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_expression_context: env::var("MEXPR_LOGGING_INCLUDE_EXPRESSION_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
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

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors raised while loading runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Invalid expression syntax configuration: {0}")]
    Syntax(#[from] SyntaxConfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub syntax: SyntaxPreferences,
    pub literals: LiteralPreferences,
    pub compiler: CompilerPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a configuration document; missing sections fall back to the environment
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            origin: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            origin: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Build the validated expression syntax described by these preferences
    pub fn expression_syntax(&self) -> Result<ExpressionSyntax, ConfigError> {
        let syntax = ExpressionSyntax::new(
            &self.syntax.open_token,
            &self.syntax.close_token,
            &self.syntax.separator,
            &self.syntax.string_delimiter,
            self.literals.to_policy(),
        )?;
        Ok(syntax)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Syntax
    pub const SYNTAX_OPEN: &str = "MEXPR_SYNTAX_OPEN";
    pub const SYNTAX_CLOSE: &str = "MEXPR_SYNTAX_CLOSE";
    pub const SYNTAX_SEPARATOR: &str = "MEXPR_SYNTAX_SEPARATOR";
    pub const SYNTAX_STRING_DELIMITER: &str = "MEXPR_SYNTAX_STRING_DELIMITER";

    // Literals
    pub const LITERAL_DECIMAL_SEPARATOR: &str = "MEXPR_LITERAL_DECIMAL_SEPARATOR";
    pub const LITERAL_ALLOW_EXPONENT: &str = "MEXPR_LITERAL_ALLOW_EXPONENT";
    pub const LITERAL_HEX_PREFIX: &str = "MEXPR_LITERAL_HEX_PREFIX";
    pub const LITERAL_BINARY_PREFIX: &str = "MEXPR_LITERAL_BINARY_PREFIX";
    pub const LITERAL_TRUE: &str = "MEXPR_LITERAL_TRUE";
    pub const LITERAL_FALSE: &str = "MEXPR_LITERAL_FALSE";

    // Compiler
    pub const COMPILER_LOG_EXTRACTION: &str = "MEXPR_COMPILER_LOG_EXTRACTION";
    pub const COMPILER_INCLUDE_TIMING: &str = "MEXPR_COMPILER_INCLUDE_TIMING";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "MEXPR_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "MEXPR_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "MEXPR_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "MEXPR_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "MEXPR_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_EXPRESSION_CONTEXT: &str =
        "MEXPR_LOGGING_INCLUDE_EXPRESSION_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_toml_overrides_sections() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [syntax]
            open_token = "["
            close_token = "]"
            separator = ";"
            string_delimiter = "'"

            [literals]
            decimal_separator = "."
            allow_exponent = false
            "#,
        )
        .unwrap();

        assert_eq!(config.syntax.open_token, "[");
        assert_eq!(config.syntax.separator, ";");
        assert!(!config.literals.allow_exponent);

        let syntax = config.expression_syntax().unwrap();
        assert_eq!(syntax.open(), "[");
        assert_eq!(syntax.close(), "]");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = RuntimeConfig::from_toml_str("[syntax\nopen_token = 1");
        assert_matches!(result, Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn test_conflicting_tokens_rejected() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [syntax]
            open_token = "("
            close_token = "("
            separator = ","
            string_delimiter = "\""
            "#,
        )
        .unwrap();

        assert_matches!(config.expression_syntax(), Err(ConfigError::Syntax(_)));
    }

    #[test]
    fn test_config_file_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[compiler]\nlog_extraction_details = true").unwrap();

        let config = RuntimeConfig::from_toml_file(file.path()).unwrap();
        assert!(config.compiler.log_extraction_details);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = RuntimeConfig::from_toml_file(&dir.path().join("absent.toml"));
        assert_matches!(result, Err(ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(!env_vars::SYNTAX_OPEN.is_empty());
        assert!(!env_vars::LOGGING_MIN_LEVEL.is_empty());
        assert!(env_vars::LITERAL_HEX_PREFIX.starts_with("MEXPR_"));
    }
}
