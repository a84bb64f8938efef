//! Batch compilation of expression files
//!
//! An expression file holds one expression per line; blank lines and lines
//! starting with `#` are skipped. Expressions compile independently, either
//! sequentially or on worker threads in chunks, with each one logged under
//! its own expression context for cargo-style reporting.

use crate::computation::{ComputationBody, EvaluationResult, ParameterBindings};
use crate::config::compile_time::batch_processing::{
    MAX_BATCH_FILE_SIZE, MAX_EXPRESSIONS_PER_BATCH, MAX_WORKER_THREADS,
};
use crate::logging::{self, codes, Code};
use crate::nodes::Value;
use crate::pipeline::{CompileError, Compiler};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub progress_reporting: bool,
    pub fail_fast: bool,
    /// Evaluate expressions that have no parameters
    pub evaluate_constants: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4)
                .min(MAX_WORKER_THREADS),
            progress_reporting: false,
            fail_fast: false,
            evaluate_constants: true,
        }
    }
}

impl BatchConfig {
    fn worker_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }
}

/// One expression read from a batch file
#[derive(Debug, Clone, PartialEq)]
pub struct BatchExpression {
    pub line: usize,
    pub text: String,
}

impl BatchExpression {
    pub fn label(&self) -> String {
        format!("line {}", self.line)
    }
}

#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub expression: BatchExpression,
    pub body: ComputationBody,
    pub value: Option<EvaluationResult<Value>>,
}

/// Batch processing results
#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful: Vec<BatchEntry>,
    pub failed: Vec<(BatchExpression, CompileError)>,
    pub processing_duration: Duration,
    pub expressions_processed: usize,
    pub expressions_discovered: usize,
    pub halted: bool,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.expressions_processed == 0 {
            0.0
        } else {
            self.successful.len() as f64 / self.expressions_processed as f64
        }
    }

    pub fn add_success(&mut self, entry: BatchEntry) {
        self.successful.push(entry);
        self.expressions_processed += 1;
    }

    pub fn add_failure(&mut self, expression: BatchExpression, error: CompileError) {
        if error.requires_halt() {
            self.halted = true;
        }
        self.failed.push((expression, error));
        self.expressions_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful.extend(other.successful);
        self.failed.extend(other.failed);
        self.expressions_processed += other.expressions_processed;
        self.halted |= other.halted;
    }

    /// Restore file order after parallel processing
    pub fn sort_by_line(&mut self) {
        self.successful.sort_by_key(|entry| entry.expression.line);
        self.failed.sort_by_key(|(expression, _)| expression.line);
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch compilation completed: {} expressions processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.expressions_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Expression file not found: {path}")]
    FileNotFound { path: String },

    #[error("Expression file too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("No expressions found in: {path}")]
    NoExpressions { path: String },

    #[error("Too many expressions: {count} (max: {max})")]
    TooManyExpressions { count: usize, max: usize },

    #[error("IO error reading {path}: {error}")]
    Io { path: String, error: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::FileNotFound { .. } | Self::Io { .. } => codes::input::IO_ERROR,
            Self::FileTooLarge { .. } | Self::NoExpressions { .. } | Self::TooManyExpressions { .. } => {
                codes::input::INVALID_BATCH_FILE
            }
            Self::ThreadError { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}

// ============================================================================
// EXPRESSION FILES
// ============================================================================

/// Expressions in `content`, numbered by their 1-based line
pub fn parse_expressions(content: &str) -> Vec<BatchExpression> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(BatchExpression {
                    line: index + 1,
                    text: trimmed.to_string(),
                })
            }
        })
        .collect()
}

/// Read and validate an expression file against the batch limits
pub fn read_expression_file(path: &Path) -> Result<Vec<BatchExpression>, BatchError> {
    if !path.is_file() {
        return Err(BatchError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let io_error = |e: std::io::Error| BatchError::Io {
        path: path.display().to_string(),
        error: e.to_string(),
    };

    let size = fs::metadata(path).map_err(io_error)?.len();
    if size > MAX_BATCH_FILE_SIZE {
        return Err(BatchError::FileTooLarge {
            size,
            max: MAX_BATCH_FILE_SIZE,
        });
    }

    let content = fs::read_to_string(path).map_err(io_error)?;
    let expressions = parse_expressions(&content);

    if expressions.is_empty() {
        return Err(BatchError::NoExpressions {
            path: path.display().to_string(),
        });
    }
    if expressions.len() > MAX_EXPRESSIONS_PER_BATCH {
        return Err(BatchError::TooManyExpressions {
            count: expressions.len(),
            max: MAX_EXPRESSIONS_PER_BATCH,
        });
    }

    crate::log_info!("Expression file loaded",
        "file" => path.display(),
        "expressions" => expressions.len(),
        "bytes" => size
    );

    Ok(expressions)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Compile one expression under its own logging context
fn compile_expression(
    compiler: &Compiler,
    expression: &BatchExpression,
    expression_id: usize,
    config: &BatchConfig,
) -> Result<BatchEntry, CompileError> {
    logging::with_expression_context(expression.label(), expression_id, || -> Result<BatchEntry, CompileError> {
        let body = compiler.compile(&expression.text)?;
        let value = (config.evaluate_constants && body.parameters().is_empty())
            .then(|| body.evaluate(&ParameterBindings::new()));

        Ok(BatchEntry {
            expression: expression.clone(),
            body,
            value,
        })
    })
}

/// Compile expressions one after another
pub fn process_sequential(
    compiler: &Compiler,
    expressions: &[BatchExpression],
    config: &BatchConfig,
) -> BatchResults {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch compilation",
        "expressions" => expressions.len()
    );

    let mut results = BatchResults::new();
    results.expressions_discovered = expressions.len();

    for (expression_id, expression) in expressions.iter().enumerate() {
        if config.progress_reporting {
            println!(
                "Compiling expression {} of {} ({})",
                expression_id + 1,
                expressions.len(),
                expression.label()
            );
        }

        match compile_expression(compiler, expression, expression_id, config) {
            Ok(entry) => results.add_success(entry),
            Err(error) => {
                results.add_failure(expression.clone(), error);

                if results.halted {
                    crate::log_error!(codes::system::INTERNAL_ERROR,
                        "Internal error, stopping batch compilation",
                        "expression" => expression.label()
                    );
                    break;
                }
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch compilation");
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_completion("Sequential batch compilation completed", &results, 1);
    results
}

/// Compile expressions on worker threads, chunk by chunk
pub fn process_parallel(
    compiler: Arc<Compiler>,
    expressions: &[BatchExpression],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.worker_threads();

    crate::log_info!("Starting parallel batch compilation",
        "expressions" => expressions.len(),
        "max_threads" => threads
    );

    let mut results = BatchResults::new();
    results.expressions_discovered = expressions.len();

    if expressions.is_empty() {
        results.processing_duration = start_time.elapsed();
        return Ok(results);
    }

    let chunk_size = calculate_chunk_size(expressions.len(), threads);

    crate::log_debug!("Parallel compilation configuration",
        "total_expressions" => expressions.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    for (chunk_index, chunk) in expressions.chunks(chunk_size).enumerate() {
        let chunk_results =
            process_chunk_parallel(&compiler, chunk, chunk_index * chunk_size, threads, config)?;
        results.merge(chunk_results);

        if results.halted {
            crate::log_error!(codes::system::INTERNAL_ERROR,
                "Internal error, stopping batch compilation"
            );
            break;
        }
        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch compilation");
            break;
        }
    }

    results.sort_by_line();
    results.processing_duration = start_time.elapsed();
    log_completion("Parallel batch compilation completed", &results, threads);
    Ok(results)
}

/// Compile one chunk with up to `threads` workers
fn process_chunk_parallel(
    compiler: &Arc<Compiler>,
    expressions: &[BatchExpression],
    first_id: usize,
    threads: usize,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));

    let mut handles = Vec::new();
    let per_thread = expressions.len().div_ceil(threads);

    for thread_id in 0..threads {
        let start_idx = thread_id * per_thread;
        let end_idx = ((thread_id + 1) * per_thread).min(expressions.len());

        if start_idx >= expressions.len() {
            break;
        }

        let thread_expressions: Vec<BatchExpression> = expressions[start_idx..end_idx].to_vec();
        let results_clone = Arc::clone(&results);
        let compiler = Arc::clone(compiler);
        let config = config.clone();

        let handle = thread::spawn(move || {
            for (offset, expression) in thread_expressions.iter().enumerate() {
                let expression_id = first_id + start_idx + offset;
                let outcome = compile_expression(&compiler, expression, expression_id, &config);

                let mut guard = results_clone.lock().unwrap_or_else(PoisonError::into_inner);
                match outcome {
                    Ok(entry) => guard.add_success(entry),
                    Err(error) => guard.add_failure(expression.clone(), error),
                }
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::ThreadError {
            message: "Worker thread panicked during compilation".to_string(),
        })?;
    }

    let chunk_results = Arc::try_unwrap(results)
        .map_err(|_| BatchError::ThreadError {
            message: "Failed to collect results from worker threads".to_string(),
        })?
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);

    Ok(chunk_results)
}

/// Chunk size bounded to keep per-chunk memory small
fn calculate_chunk_size(total: usize, max_threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 50;

    let ideal_chunk_size = total.div_ceil(max_threads.max(1));
    ideal_chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

fn log_completion(message: &str, results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        message,
        "expressions_processed" => results.expressions_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Compile a list of expressions, in parallel when more than one thread is allowed
pub fn process_expressions(
    compiler: Arc<Compiler>,
    expressions: &[BatchExpression],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.worker_threads() == 1 {
        Ok(process_sequential(&compiler, expressions, config))
    } else {
        process_parallel(compiler, expressions, config)
    }
}

/// Read an expression file and compile every expression in it
pub fn process_file(
    path: &Path,
    compiler: Arc<Compiler>,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let expressions = read_expression_file(path)?;
    process_expressions(compiler, &expressions, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "# sample batch\n\n3 + (4 * 5)\nmax(x, 5) + 1\n  # indented comment\n7 / 2\nnosuch(1)\n";

    fn texts(results: &BatchResults) -> Vec<&str> {
        results
            .successful
            .iter()
            .map(|entry| entry.expression.text.as_str())
            .collect()
    }

    #[test]
    fn test_parse_expressions_skips_comments_and_blanks() {
        let expressions = parse_expressions(SAMPLE);
        let lines: Vec<usize> = expressions.iter().map(|e| e.line).collect();

        assert_eq!(lines, vec![3, 4, 6, 7]);
        assert_eq!(expressions[0].text, "3 + (4 * 5)");
        assert_eq!(expressions[0].label(), "line 3");
    }

    #[test]
    fn test_read_expression_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("exprs.txt");
        fs::write(&path, SAMPLE).unwrap();

        assert_eq!(read_expression_file(&path).unwrap().len(), 4);

        let empty = temp_dir.path().join("empty.txt");
        fs::write(&empty, "# nothing\n\n").unwrap();
        assert_matches!(read_expression_file(&empty), Err(BatchError::NoExpressions { .. }));

        assert_matches!(
            read_expression_file(&temp_dir.path().join("missing.txt")),
            Err(BatchError::FileNotFound { .. })
        );
    }

    #[test]
    fn test_sequential_processing() {
        let compiler = Compiler::new();
        let expressions = parse_expressions(SAMPLE);
        let config = BatchConfig {
            max_threads: 1,
            ..BatchConfig::default()
        };

        let results = process_sequential(&compiler, &expressions, &config);
        assert_eq!(results.expressions_processed, 4);
        assert_eq!(results.success_count(), 3);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.failed[0].0.line, 7);

        let constant = results.successful[0].value.clone().unwrap().unwrap();
        assert_eq!(constant, Value::Integer(23));
        assert!(results.successful[1].value.is_none());
    }

    #[test]
    fn test_fail_fast_stops_early() {
        let compiler = Compiler::new();
        let expressions = parse_expressions("1 +\n2 + 2\n");
        let config = BatchConfig {
            max_threads: 1,
            fail_fast: true,
            ..BatchConfig::default()
        };

        let results = process_sequential(&compiler, &expressions, &config);
        assert_eq!(results.expressions_processed, 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let text: String = (0..40).map(|n| format!("x * {} + {}\n", n, n)).collect();
        let expressions = parse_expressions(&text);
        let compiler = Arc::new(Compiler::new());

        let sequential = process_sequential(
            &compiler,
            &expressions,
            &BatchConfig {
                max_threads: 1,
                ..BatchConfig::default()
            },
        );
        let parallel = process_parallel(
            Arc::clone(&compiler),
            &expressions,
            &BatchConfig {
                max_threads: 4,
                ..BatchConfig::default()
            },
        )
        .unwrap();

        assert_eq!(parallel.success_count(), 40);
        assert_eq!(texts(&parallel), texts(&sequential));
    }

    #[test]
    fn test_process_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("exprs.txt");
        fs::write(&path, SAMPLE).unwrap();

        let results = process_file(&path, Arc::new(Compiler::new()), &BatchConfig::default()).unwrap();
        assert_eq!(results.expressions_discovered, 4);
        assert_eq!(results.success_count() + results.failure_count(), 4);
        assert!(results.summary().contains("4 expressions processed"));
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(200, 4), 50);
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert!(config.max_threads >= 1);
        assert!(config.max_threads <= MAX_WORKER_THREADS);
        assert!(!config.fail_fast);
        assert!(config.evaluate_constants);
    }
}
