//! Event collector for batch compilation with cargo-style output

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Identifies the expression a thread is currently compiling
#[derive(Debug, Clone)]
pub struct ExpressionContext {
    pub label: String,
    pub expression_id: usize,
}

impl ExpressionContext {
    pub fn new(label: impl Into<String>, expression_id: usize) -> Self {
        Self {
            label: label.into(),
            expression_id,
        }
    }
}

/// Error and warning totals over every collected expression
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_expressions: usize,
    pub failed_expressions: usize,
    pub expressions_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
    pub dropped_events: usize,
}

#[derive(Default)]
struct Collected {
    by_expression: BTreeMap<usize, (String, Vec<LogEvent>)>,
    stored: usize,
    dropped: usize,
}

/// Thread-safe collector keyed by expression id
pub struct ErrorCollector {
    collected: Mutex<Collected>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            collected: Mutex::new(Collected::default()),
            processing_start: Instant::now(),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Collected> {
        self.collected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an event for the expression described by `context`.
    /// Events past the per-expression or global limit are counted, not kept.
    pub fn record_event(&self, context: &ExpressionContext, event: LogEvent) {
        let mut collected = self.guard();
        if collected.stored >= LOG_BUFFER_SIZE {
            collected.dropped += 1;
            return;
        }

        let (_, events) = collected
            .by_expression
            .entry(context.expression_id)
            .or_insert_with(|| (context.label.clone(), Vec::new()));

        if events.len() >= MAX_LOG_EVENTS_PER_EXPRESSION {
            collected.dropped += 1;
            return;
        }
        events.push(event);
        collected.stored += 1;
    }

    /// All events grouped by label, in expression id order
    pub fn get_all_events(&self) -> Vec<(String, Vec<LogEvent>)> {
        self.guard().by_expression.values().cloned().collect()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let collected = self.guard();

        let mut summary = ProcessingSummary {
            total_expressions: collected.by_expression.len(),
            total_processing_time: self.processing_start.elapsed(),
            dropped_events: collected.dropped,
            ..ProcessingSummary::default()
        };

        for (_, events) in collected.by_expression.values() {
            let errors = events.iter().filter(|e| e.is_error()).count();
            let warnings = events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_expressions += 1;
            } else if warnings > 0 {
                summary.expressions_with_warnings += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (label, events) in collector.get_all_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", label));

        for event in errors {
            output.push_str(&format!(
                "error[{}]: {}\n",
                event.code.as_str(),
                event.message
            ));
            output.push_str(&format!(
                "  = severity: {}, category: {}\n",
                event.severity(),
                event.category()
            ));

            for (key, value) in &event.context {
                if key != "expression_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }

            let action = event.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }

        for event in warnings {
            output.push_str(&format!(
                "warning[{}]: {}\n",
                event.code.as_str(),
                event.message
            ));
            for (key, value) in &event.context {
                if key != "expression_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }
    if summary.dropped_events > 0 {
        output.push_str(&format!(
            "({} further events not shown)\n",
            summary.dropped_events
        ));
    }

    output
}
