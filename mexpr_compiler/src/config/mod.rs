//! Configuration module for the expression compiler
//!
//! Compile-time limits are generated by build.rs from `config/<profile>.toml`.
//! Runtime preferences live in [`runtime`] and come from environment variables
//! or an optional TOML file.

// Generated at build time from the selected TOML profile
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("MEXPR_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("MEXPR_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(compile_time::input::MAX_EXPRESSION_LENGTH > 0);
        assert!(compile_time::input::MAX_IDENTIFIER_LENGTH > 0);
        assert!(compile_time::extraction::MAX_NESTING_DEPTH > 0);
        assert!(compile_time::batch_processing::MAX_WORKER_THREADS >= 1);
        assert!(compile_time::logging::SECURITY_MIN_LOG_LEVEL <= 2);
    }

    #[test]
    fn test_source_info_names_profile() {
        let info = super::build_info::source_info();
        assert!(info.contains(super::build_info::profile()));
        assert!(info.ends_with(".toml"));
    }
}
