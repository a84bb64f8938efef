//! Logging service and logger implementations

use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::Arc;

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Filters events by level and forwards them to one logger
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Console, JSON or silent output chosen from the runtime preferences
    pub fn from_preferences() -> Self {
        let min_level = config::get_min_log_level();
        let logger: Arc<dyn Logger> = if !config::use_console_logging() {
            Arc::new(SilentLogger)
        } else if config::use_structured_logging() {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger)
        };

        Self::new(logger, min_level)
    }

    pub fn log_event(&self, event: LogEvent) {
        if event.level <= self.min_level {
            self.logger.log(&event);
        }
    }
}

fn emit(level: LogLevel, line: &str) {
    match level {
        LogLevel::Error | LogLevel::Warning => eprintln!("{}", line),
        _ => println!("{}", line),
    }
}

/// Plain-text console logger; errors and warnings go to stderr
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        emit(event.level, &event.format());
    }
}

/// One JSON object per line
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        let line = event.format_json().unwrap_or_else(|_| event.format());
        emit(event.level, &line);
    }
}

pub struct SilentLogger;

impl Logger for SilentLogger {
    fn log(&self, _event: &LogEvent) {}
}
