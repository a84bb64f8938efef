use mexpr_compiler::config::runtime::RuntimeConfig;
use mexpr_compiler::{
    batch, logging, CompilationOutput, CompilationResult, Compiler, ExpressionSyntax,
    ParameterBindings, Value,
};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    expression: Option<String>,
    assignments: Vec<(String, String)>,
    batch_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    json: bool,
    tables: bool,
    threads: Option<usize>,
    sequential: bool,
    fail_fast: bool,
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} \"<expression>\" [name=value ...] [options]", args[0]);
        eprintln!("       {} --batch <file> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = parse_options(&args[1..]);

    // Runtime configuration must be installed before logging starts
    let runtime_config = match &options.config_file {
        Some(path) => RuntimeConfig::from_toml_file(path)?,
        None => RuntimeConfig::default(),
    };
    logging::config::init_runtime_preferences(runtime_config.logging.clone())?;
    logging::init_global_logging()?;

    let compiler = Compiler::new()
        .with_syntax(runtime_config.expression_syntax()?)
        .with_preferences(runtime_config.compiler.clone());

    if let Some(batch_file) = &options.batch_file {
        process_batch(batch_file, compiler, &options);
    } else if let Some(expression) = &options.expression {
        process_expression(expression, &compiler, &options)?;
    } else {
        eprintln!("Error: no expression given");
        std::process::exit(1);
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("mexpr v{}", env!("CARGO_PKG_VERSION"));
    println!("Math-expression compiler with typed evaluation and batch processing");
    println!();
    println!("USAGE:");
    println!("    {} \"<expression>\" [name=value ...] [options]", program_name);
    println!("    {} --batch <file> [options]", program_name);
    println!();
    println!("ARGUMENTS:");
    println!("    <expression>    Expression to compile, e.g. \"max(x, 5) + 1\"");
    println!("    name=value      Parameter binding; values use the literal grammar,");
    println!("                    anything else is bound as a string");
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Print the compilation as JSON");
    println!("    --tables            Print the symbol and constant tables");
    println!("    --config FILE       Load runtime preferences from a TOML file");
    println!("    --batch FILE        Compile every expression in FILE (one per line)");
    println!("    --threads N         Set maximum number of threads (default: auto)");
    println!("    --sequential        Force sequential batch processing");
    println!("    --fail-fast         Stop the batch on the first error");
    println!("    --quiet             Suppress progress reporting");
    println!();
    println!("EXAMPLES:");
    println!("    {} \"3 + (4 * 5)\"", program_name);
    println!("    {} \"max(x, 5) + 1\" x=10 --tables", program_name);
    println!("    {} --batch expressions.txt --threads 4 --fail-fast", program_name);
    println!();
    println!("CONFIGURATION:");
    println!("    {}", mexpr_compiler::config::build_info::source_info());
    for line in logging::config::get_config_summary().lines() {
        println!("    {}", line);
    }
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--json" => options.json = true,
            "--tables" => options.tables = true,
            "--sequential" => options.sequential = true,
            "--fail-fast" => options.fail_fast = true,
            "--quiet" => options.quiet = true,
            "--config" | "--batch" | "--threads" => {
                let flag = args[i].as_str();
                match args.get(i + 1) {
                    Some(value) => {
                        match flag {
                            "--config" => options.config_file = Some(PathBuf::from(value)),
                            "--batch" => options.batch_file = Some(PathBuf::from(value)),
                            _ => match value.parse::<usize>() {
                                Ok(threads) => options.threads = Some(threads.max(1)),
                                Err(_) => eprintln!(
                                    "Warning: Invalid thread count '{}', using default",
                                    value
                                ),
                            },
                        }
                        i += 1;
                    }
                    None => eprintln!("Warning: {} requires a value", flag),
                }
            }
            arg if arg.starts_with("--") => {
                eprintln!("Warning: Unknown option '{}'", arg);
            }
            arg => match arg.split_once('=') {
                Some((name, value)) if options.expression.is_some() && !name.is_empty() => {
                    options
                        .assignments
                        .push((name.trim().to_string(), value.trim().to_string()));
                }
                _ if options.expression.is_none() => options.expression = Some(arg.to_string()),
                _ => eprintln!("Warning: Ignoring extra argument '{}'", arg),
            },
        }
        i += 1;
    }

    options
}

/// Parameter value from the command line: a literal if the grammar accepts it,
/// a delimited string, or the raw text as a string
fn parse_value(text: &str, syntax: &ExpressionSyntax) -> Value {
    if let Some(value) = syntax.literals().parse(text) {
        return value;
    }

    let delimiter = syntax.string_delimiter();
    if text.len() >= 2 * delimiter.len() && text.starts_with(delimiter) && text.ends_with(delimiter) {
        return Value::String(text[delimiter.len()..text.len() - delimiter.len()].to_string());
    }

    Value::String(text.to_string())
}

fn process_expression(
    expression: &str,
    compiler: &Compiler,
    options: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = match compiler.compile_detailed(expression) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("FAILED [{}]: {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    };

    let bindings: ParameterBindings = options
        .assignments
        .iter()
        .map(|(name, value)| (name.as_str(), parse_value(value, compiler.syntax())))
        .collect();

    let missing: Vec<&str> = result
        .body
        .parameter_names()
        .into_iter()
        .filter(|name| bindings.get(name).is_none())
        .collect();

    let evaluation = missing
        .is_empty()
        .then(|| result.body.evaluate(&bindings));

    if options.json {
        let mut output = CompilationOutput::new(&result, compiler.preferences().include_timing);
        match &evaluation {
            Some(Ok(value)) => output = output.with_value(value.clone()),
            Some(Err(error)) => output = output.with_evaluation_error(error),
            None => {}
        }
        println!("{}", output.to_json()?);
    } else {
        print_compilation(&result, options.tables, compiler.preferences().include_timing);
        match &evaluation {
            Some(Ok(value)) => println!("Value: {}", value),
            Some(Err(error)) => println!("Evaluation failed [{}]: {}", error.error_code(), error),
            None => println!("Unbound parameters: {}", missing.join(", ")),
        }
    }

    logging::print_cargo_style_summary();

    if matches!(evaluation, Some(Err(_))) {
        std::process::exit(1);
    }
    Ok(())
}

fn print_compilation(result: &CompilationResult, tables: bool, include_timing: bool) {
    println!("Expression: {}", result.source);
    println!("Rendered:   {}", result.body.render());
    println!("Result:     {}", result.body.result_types());

    if !result.body.parameters().is_empty() {
        println!("Parameters:");
        for parameter in result.body.parameters().iter() {
            println!("  #{} {}: {}", parameter.position, parameter.name, parameter.allowed);
        }
    }

    if include_timing {
        println!("Compiled in {:.3}ms", result.duration.as_secs_f64() * 1000.0);
    }

    if tables {
        println!("\nSymbols:");
        for (key, symbol) in result.symbols.iter() {
            let key = if key.is_empty() { "<root>" } else { key };
            println!(
                "  {:<10} level {} {:<5} {}",
                key,
                symbol.level,
                if symbol.is_function_call { "call" } else { "group" },
                symbol.expression
            );
        }

        println!("\nConstants:");
        for (key, constant) in result.constants.iter() {
            println!("  {:<10} {} = {}", key, constant.canonical_text, constant.value);
        }
        println!();
    }
}

fn process_batch(path: &Path, compiler: Compiler, options: &CliOptions) {
    let mut config = batch::BatchConfig {
        progress_reporting: !options.quiet,
        fail_fast: options.fail_fast,
        ..batch::BatchConfig::default()
    };
    if let Some(threads) = options.threads {
        config.max_threads = threads;
    }
    if options.sequential {
        config.max_threads = 1;
    }

    println!("Starting batch compilation: {}", path.display());
    println!(
        "Configuration: {} threads, fail_fast={}",
        config.max_threads, config.fail_fast
    );

    match batch::process_file(path, Arc::new(compiler), &config) {
        Ok(results) => {
            println!("\nBatch compilation completed!");
            print_batch_results(&results);

            logging::print_cargo_style_summary();

            if results.failure_count() > 0 {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Batch compilation failed [{}]: {}", error.error_code(), error);

            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("Batch Compilation Summary:");
    println!("  Expressions discovered: {}", results.expressions_discovered);
    println!("  Expressions processed: {}", results.expressions_processed);
    println!(
        "  Successful: {} ({:.1}%)",
        results.success_count(),
        results.success_rate() * 100.0
    );
    println!("  Failed: {}", results.failure_count());
    println!(
        "  Total time: {:.2}s",
        results.processing_duration.as_secs_f64()
    );

    let logged = logging::get_processing_summary();
    if logged.total_warnings > 0 {
        println!(
            "  Warnings: {} in {} expressions",
            logged.total_warnings, logged.expressions_with_warnings
        );
    }

    if results.failure_count() > 0 {
        println!("\nFailed Expressions:");
        for (expression, error) in &results.failed {
            println!("  {}: [{}] {}", expression.label(), error.error_code(), error);
        }
    }

    let shown = results.successful.iter().take(10);
    if results.success_count() > 0 {
        println!("\nSuccessful Expressions:");
    }
    for entry in shown {
        let outcome = match &entry.value {
            Some(Ok(value)) => format!("= {}", value),
            Some(Err(error)) => format!("evaluation failed: {}", error),
            None => format!("parameters: {}", entry.body.parameter_names().join(", ")),
        };
        println!("  {}: {} {}", entry.expression.label(), entry.body.render(), outcome);
    }
    if results.success_count() > 10 {
        println!("  ... and {} more", results.success_count() - 10);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_expression_options() {
        let options = parse_options(&args(&["max(x, 5) + 1", "x=10", "--json", "--tables"]));

        assert_eq!(options.expression.as_deref(), Some("max(x, 5) + 1"));
        assert_eq!(options.assignments, vec![("x".to_string(), "10".to_string())]);
        assert!(options.json);
        assert!(options.tables);
        assert!(options.batch_file.is_none());
    }

    #[test]
    fn test_parse_batch_options() {
        let options = parse_options(&args(&[
            "--batch",
            "exprs.txt",
            "--threads",
            "4",
            "--fail-fast",
            "--quiet",
        ]));

        assert_eq!(options.batch_file, Some(PathBuf::from("exprs.txt")));
        assert_eq!(options.threads, Some(4));
        assert!(options.fail_fast);
        assert!(options.quiet);
        assert!(!options.sequential);
    }

    #[test]
    fn test_invalid_thread_count_is_ignored() {
        let options = parse_options(&args(&["--batch", "f", "--threads", "many"]));
        assert_eq!(options.threads, None);
    }

    #[test]
    fn test_expression_containing_equals_sign() {
        let options = parse_options(&args(&["a=b"]));
        assert_eq!(options.expression.as_deref(), Some("a=b"));
        assert!(options.assignments.is_empty());
    }

    #[test]
    fn test_parse_value() {
        let syntax = ExpressionSyntax::default();

        assert_eq!(parse_value("10", &syntax), Value::Integer(10));
        assert_eq!(parse_value("2.5", &syntax), Value::Float(2.5));
        assert_eq!(parse_value("true", &syntax), Value::Boolean(true));
        assert_eq!(parse_value("\"hi\"", &syntax), Value::String("hi".into()));
        assert_eq!(parse_value("hello", &syntax), Value::String("hello".into()));
    }
}
