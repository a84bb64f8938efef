//! Global logging module for the expression compiler
//!
//! Provides thread-safe global logging with per-expression context,
//! cargo-style error reporting for batch runs, and a macro interface.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, ExpressionContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static EXPRESSION_CONTEXT: RefCell<Option<ExpressionContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(LoggingService::from_preferences());
    init_global_logging_with_service(logging_service.clone())?;

    for &code in &["ERR001", "E005", "E020", "E040", "E060"] {
        if codes::get_description(code) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with a custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized")?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized")?;

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// EXPRESSION CONTEXT MANAGEMENT
// ============================================================================

/// Mark the current thread as compiling the labelled expression
pub fn set_expression_context(label: impl Into<String>, expression_id: usize) {
    let context = ExpressionContext::new(label, expression_id);
    EXPRESSION_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_expression_context() {
    EXPRESSION_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the expression context set, clearing it afterwards
pub fn with_expression_context<F, R>(label: impl Into<String>, expression_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_expression_context(label, expression_id);
    let result = f();
    clear_expression_context();
    result
}

pub fn get_current_expression_context() -> Option<ExpressionContext> {
    EXPRESSION_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Tag an event with the current expression label, if any
pub fn attach_expression_context(event: LogEvent) -> LogEvent {
    match get_current_expression_context() {
        Some(ctx) if config::include_expression_context() => event
            .with_context("label", &ctx.label)
            .with_context("expression_id", &ctx.expression_id.to_string()),
        _ => event,
    }
}

fn collect(event: &LogEvent) {
    if let Some(ctx) = get_current_expression_context() {
        if let Some(collector) = try_get_global_error_collector() {
            collector.record_event(&ctx, event.clone());
        }
    }
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Used by `log_error!`
pub fn log_error_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::error(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    let event = attach_expression_context(event);

    collect(&event);
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Used by `log_warning!`
pub fn log_warning_with_context(code: Option<Code>, message: &str, context: Vec<(&str, &str)>) {
    let mut event = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    let event = attach_expression_context(event);

    collect(&event);
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Used by `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(attach_expression_context(event));
    }
}

/// Used by `log_info!`
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::info(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(attach_expression_context(event));
    }
}

// ============================================================================
// BATCH REPORTING
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

/// Print collected errors and warnings unless cargo-style output is disabled
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }
    if let Some(collector) = try_get_global_error_collector() {
        let report = collector::format_cargo_style_errors(collector);
        if !report.is_empty() {
            println!("{}", report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_logging_initialization() {
        if is_initialized() {
            return;
        }

        // Another test thread may win the race
        let _ = init_global_logging();
        assert!(is_initialized());
    }

    #[test]
    fn test_expression_context_management() {
        assert!(get_current_expression_context().is_none());

        set_expression_context("line 3", 3);
        let context = get_current_expression_context();
        assert_eq!(context.map(|c| c.label), Some("line 3".to_string()));

        clear_expression_context();
        assert!(get_current_expression_context().is_none());
    }

    #[test]
    fn test_with_expression_context() {
        let result = with_expression_context("line 9", 9, || {
            let context = get_current_expression_context();
            assert_eq!(context.map(|c| c.expression_id), Some(9));
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_expression_context().is_none());
    }
}
