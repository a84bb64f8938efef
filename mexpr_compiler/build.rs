// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    input: InputLimits,
    extraction: ExtractionLimits,
    evaluation: EvaluationLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct InputLimits {
    max_expression_length: usize,
    max_identifier_length: usize,
    max_string_literal_length: usize,
}

#[derive(serde::Deserialize)]
struct ExtractionLimits {
    max_symbols: usize,
    max_constants: usize,
    max_parameters: usize,
    max_nesting_depth: usize,
}

#[derive(serde::Deserialize)]
struct EvaluationLimits {
    max_function_arity: usize,
    max_sequence_length: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_expressions_per_batch: usize,
    max_batch_file_size: u64,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_expression: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MEXPR_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=MEXPR_CONFIG_DIR");

    let profile = env::var("MEXPR_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("MEXPR_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the mexpr_compiler directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_EXPRESSION_LENGTH: usize = 10_000_000;
    const ABSOLUTE_MAX_BATCH_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_NESTING_DEPTH: usize = 4_096;

    if config.input.max_expression_length > ABSOLUTE_MAX_EXPRESSION_LENGTH {
        panic!("LIMITS: max_expression_length exceeds absolute maximum");
    }

    if config.input.max_identifier_length == 0 {
        panic!("LIMITS: max_identifier_length must be positive");
    }

    if config.extraction.max_nesting_depth > ABSOLUTE_MAX_NESTING_DEPTH {
        panic!("LIMITS: max_nesting_depth exceeds absolute maximum");
    }

    if config.batch_processing.max_batch_file_size > ABSOLUTE_MAX_BATCH_FILE_SIZE {
        panic!("LIMITS: max_batch_file_size exceeds absolute maximum");
    }

    if config.batch_processing.max_worker_threads == 0 {
        panic!("LIMITS: max_worker_threads must be at least 1");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("LIMITS: security_min_log_level too high (max: 2)");
    }

    if profile == "production" {
        if config.input.max_expression_length > 1_000_000 {
            panic!("PRODUCTION: max_expression_length too high for production");
        }
        if config.extraction.max_nesting_depth > 256 {
            panic!("PRODUCTION: max_nesting_depth too high for production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod input {{
        pub const MAX_EXPRESSION_LENGTH: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_STRING_LITERAL_LENGTH: usize = {};
    }}

    pub mod extraction {{
        pub const MAX_SYMBOLS: usize = {};
        pub const MAX_CONSTANTS: usize = {};
        pub const MAX_PARAMETERS: usize = {};
        pub const MAX_NESTING_DEPTH: usize = {};
    }}

    pub mod evaluation {{
        pub const MAX_FUNCTION_ARITY: usize = {};
        pub const MAX_SEQUENCE_LENGTH: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_EXPRESSIONS_PER_BATCH: usize = {};
        pub const MAX_BATCH_FILE_SIZE: u64 = {};
    }}

    pub mod logging {{
        pub const MAX_ERROR_COLLECTION: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_EXPRESSION: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        // Input
        config.input.max_expression_length,
        config.input.max_identifier_length,
        config.input.max_string_literal_length,
        // Extraction
        config.extraction.max_symbols,
        config.extraction.max_constants,
        config.extraction.max_parameters,
        config.extraction.max_nesting_depth,
        // Evaluation
        config.evaluation.max_function_arity,
        config.evaluation.max_sequence_length,
        // Batch processing
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_expressions_per_batch,
        config.batch_processing.max_batch_file_size,
        // Logging
        config.logging.max_error_collection,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_expression,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
