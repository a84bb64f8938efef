//! Consolidated error codes and classification system
//!
//! Single source of truth for all codes, their metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Input and configuration error codes
pub mod input {
    use super::Code;

    pub const EMPTY_EXPRESSION: Code = Code::new("E005");
    pub const EXPRESSION_TOO_LONG: Code = Code::new("E006");
    pub const INVALID_SYNTAX_CONFIGURATION: Code = Code::new("E007");
    pub const IO_ERROR: Code = Code::new("E008");
    pub const INVALID_BATCH_FILE: Code = Code::new("E009");
}

/// Symbol and constant extraction codes
pub mod extraction {
    use super::Code;

    pub const INVALID_IDENTIFIER: Code = Code::new("E020");
    pub const DUPLICATE_SYMBOL_KEY: Code = Code::new("E021");
    pub const UNKNOWN_SYMBOL_KEY: Code = Code::new("E022");
    pub const LIMIT_EXCEEDED: Code = Code::new("E023");
    pub const NESTING_TOO_DEEP: Code = Code::new("E024");
    pub const CONFLICTING_PARAMETER_TYPE: Code = Code::new("E025");

    // Warnings
    pub const UNBALANCED_PARENTHESES: Code = Code::new("W020");
    pub const UNTERMINATED_STRING: Code = Code::new("W021");
}

/// Tree construction and type checking codes
pub mod build {
    use super::Code;

    pub const INCOMPATIBLE_OPERAND_TYPES: Code = Code::new("E040");
    pub const UNKNOWN_FUNCTION: Code = Code::new("E041");
    pub const INCOMPATIBLE_ARGUMENT: Code = Code::new("E042");
    pub const MALFORMED_EXPRESSION: Code = Code::new("E043");
    pub const CIRCULAR_SYMBOL_REFERENCE: Code = Code::new("E044");
}

/// Evaluation codes
pub mod evaluation {
    use super::Code;

    pub const MISSING_PARAMETER: Code = Code::new("E060");
    pub const PARAMETER_TYPE_MISMATCH: Code = Code::new("E061");
    pub const PARAMETER_COUNT_MISMATCH: Code = Code::new("E062");
    pub const DIVISION_BY_ZERO: Code = Code::new("E063");
    pub const INTEGER_OVERFLOW: Code = Code::new("E064");
    pub const SHIFT_OUT_OF_RANGE: Code = Code::new("E065");
    pub const INVALID_ARGUMENT: Code = Code::new("E066");
    pub const RUNTIME_TYPE_ERROR: Code = Code::new("E067");
    pub const SEQUENCE_TOO_LONG: Code = Code::new("E068");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const STRING_EXTRACTION_COMPLETE: Code = Code::new("I010");
    pub const FUNCTION_EXTRACTION_COMPLETE: Code = Code::new("I020");
    pub const GROUPING_EXTRACTION_COMPLETE: Code = Code::new("I021");
    pub const TREE_CONSTRUCTION_COMPLETE: Code = Code::new("I040");
    pub const COMPILATION_COMPLETE: Code = Code::new("I050");
    pub const EVALUATION_COMPLETE: Code = Code::new("I060");
    pub const BATCH_COMPLETE: Code = Code::new("I070");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal compiler error",
                "File a bug report with the failing expression",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check configuration files and environment variables",
            ),
            // Input
            ErrorMetadata::new(
                "E005",
                "Input",
                Severity::Medium,
                false,
                true,
                "Expression is empty or only whitespace",
                "Provide a non-empty expression",
            ),
            ErrorMetadata::new(
                "E006",
                "Input",
                Severity::Medium,
                false,
                true,
                "Expression exceeds maximum length",
                "Split the expression or raise the input limit in the build profile",
            ),
            ErrorMetadata::new(
                "E007",
                "Input",
                Severity::High,
                false,
                true,
                "Expression syntax configuration is inconsistent",
                "Use distinct, non-empty, whitespace-free tokens",
            ),
            ErrorMetadata::new(
                "E008",
                "Input",
                Severity::Medium,
                false,
                true,
                "I/O error while reading input",
                "Check the path and file permissions",
            ),
            ErrorMetadata::new(
                "E009",
                "Input",
                Severity::Medium,
                false,
                true,
                "Batch file is invalid or exceeds limits",
                "Reduce the batch size or fix the file encoding",
            ),
            // Extraction
            ErrorMetadata::new(
                "E020",
                "Extraction",
                Severity::Medium,
                false,
                true,
                "Parameter name is empty, reserved, or too long",
                "Rename the parameter; names matching itemNNNN or constNNNN are reserved",
            ),
            ErrorMetadata::new(
                "E021",
                "Extraction",
                Severity::Critical,
                false,
                true,
                "Symbol key registered twice",
                "Internal invariant violation; file a bug report",
            ),
            ErrorMetadata::new(
                "E022",
                "Extraction",
                Severity::Critical,
                false,
                true,
                "Reference to a symbol key that was never registered",
                "Internal invariant violation; file a bug report",
            ),
            ErrorMetadata::new(
                "E023",
                "Extraction",
                Severity::High,
                false,
                true,
                "Compilation table exceeds its configured capacity",
                "Simplify the expression or raise the extraction limits",
            ),
            ErrorMetadata::new(
                "E024",
                "Extraction",
                Severity::High,
                false,
                true,
                "Parenthesis nesting exceeds maximum depth",
                "Flatten the expression or raise max_nesting_depth",
            ),
            ErrorMetadata::new(
                "E025",
                "Extraction",
                Severity::Medium,
                false,
                true,
                "Parameter is used with mutually incompatible types",
                "Use the parameter consistently as numeric, string or binary",
            ),
            ErrorMetadata::new(
                "W020",
                "Extraction",
                Severity::Low,
                true,
                false,
                "Unbalanced parentheses left unextracted",
                "Add the missing close token",
            ),
            ErrorMetadata::new(
                "W021",
                "Extraction",
                Severity::Low,
                true,
                false,
                "Unterminated string literal left as plain text",
                "Add the closing string delimiter",
            ),
            // Build
            ErrorMetadata::new(
                "E040",
                "Build",
                Severity::Medium,
                false,
                true,
                "Operator applied to incompatible operand types",
                "Convert operands to compatible types",
            ),
            ErrorMetadata::new(
                "E041",
                "Build",
                Severity::Medium,
                false,
                true,
                "Unknown function name or arity",
                "Check the function name and number of arguments",
            ),
            ErrorMetadata::new(
                "E042",
                "Build",
                Severity::Medium,
                false,
                true,
                "Function argument has an incompatible type",
                "Pass an argument of the accepted type",
            ),
            ErrorMetadata::new(
                "E043",
                "Build",
                Severity::Medium,
                false,
                true,
                "Expression text is malformed",
                "Check for dangling operators or empty groups",
            ),
            ErrorMetadata::new(
                "E044",
                "Build",
                Severity::Critical,
                false,
                true,
                "Symbol references itself through its placeholders",
                "Internal invariant violation; file a bug report",
            ),
            // Evaluation
            ErrorMetadata::new(
                "E060",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "No value bound for a parameter",
                "Bind every parameter before evaluating",
            ),
            ErrorMetadata::new(
                "E061",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "Bound value type is not accepted by the parameter",
                "Bind a value of one of the parameter's allowed types",
            ),
            ErrorMetadata::new(
                "E062",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "Positional value count differs from parameter count",
                "Pass exactly one value per parameter slot",
            ),
            ErrorMetadata::new(
                "E063",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "Division or remainder by zero",
                "Guard the divisor",
            ),
            ErrorMetadata::new(
                "E064",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "Integer arithmetic overflow",
                "Use floating point operands for large magnitudes",
            ),
            ErrorMetadata::new(
                "E065",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Shift amount outside the valid range",
                "Use a shift amount between 0 and 63",
            ),
            ErrorMetadata::new(
                "E066",
                "Evaluation",
                Severity::Low,
                true,
                false,
                "Function argument outside its domain",
                "Check the function's accepted value range",
            ),
            ErrorMetadata::new(
                "E067",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "Runtime operand types do not match the operator",
                "Bind parameters with types the expression accepts",
            ),
            ErrorMetadata::new(
                "E068",
                "Evaluation",
                Severity::Medium,
                true,
                false,
                "String or byte sequence result exceeds maximum length",
                "Reduce concatenation size or raise max_sequence_length",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
