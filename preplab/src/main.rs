//! Preplab CLI: batch access to the practice lab pipeline.
//!
//! `list` shows the catalog, `check` runs the static validator, `run`
//! executes a submission against a problem and reports the verdict with a
//! stable exit code.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use preplab::core::outcome::{CompareResult, ExecutionOutcome, compare};
use preplab::core::validate::{ValidationReport, Verdict, validate_source};
use preplab::exit_codes;
use preplab::io::catalog::{list_problems, load_tables};
use preplab::io::config::load_config;
use preplab::io::sandbox::{PythonRunner, RunRequest, TransformRunner};
use preplab::logging;
use preplab::scaffold::SAMPLE_SCAFFOLD;

#[derive(Parser)]
#[command(
    name = "preplab",
    version,
    about = "Practice lab for tabular preprocessing exercises"
)]
struct Cli {
    /// Path to the lab configuration file.
    #[arg(long, default_value = "preplab.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available problems.
    List,
    /// Print the sample submission scaffold (or write it to a file).
    Scaffold {
        /// Write to this path instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the static validator checks on a submission file.
    Check {
        /// Submission source file.
        file: PathBuf,
    },
    /// Validate, execute and compare a submission against a problem.
    Run {
        /// Problem id (folder name), e.g. problem001.
        #[arg(long)]
        problem: String,
        /// Submission source file.
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::List => cmd_list(&cli.config),
        Command::Scaffold { output } => cmd_scaffold(output.as_deref()),
        Command::Check { file } => cmd_check(&file),
        Command::Run { problem, file } => cmd_run(&cli.config, &problem, &file),
    }
}

fn cmd_list(config_path: &std::path::Path) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let problems = list_problems(&cfg.problems_dir)
        .with_context(|| format!("list problems in {}", cfg.problems_dir.display()))?;
    for (id, meta) in &problems {
        println!("{id}  {}", meta.name);
    }
    Ok(exit_codes::OK)
}

fn cmd_scaffold(output: Option<&std::path::Path>) -> Result<i32> {
    match output {
        Some(path) => {
            fs::write(path, SAMPLE_SCAFFOLD)
                .with_context(|| format!("write {}", path.display()))?;
            println!("wrote scaffold to {}", path.display());
        }
        None => print!("{SAMPLE_SCAFFOLD}"),
    }
    Ok(exit_codes::OK)
}

fn cmd_check(file: &std::path::Path) -> Result<i32> {
    let source = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let report = validate_source(Some(&source));
    print_report(&report);
    if report.all_passed() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::REJECTED)
    }
}

fn cmd_run(config_path: &std::path::Path, problem: &str, file: &std::path::Path) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let source = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let (before, after) = load_tables(&cfg.problems_dir, problem)
        .with_context(|| format!("load tables for {problem}"))?;

    let report = validate_source(Some(&source));
    print_report(&report);
    if !report.all_passed() {
        return Ok(exit_codes::REJECTED);
    }

    let runner = PythonRunner::new(cfg.interpreter.clone());
    let outcome = runner.run(&RunRequest {
        source,
        input: before,
        policy: cfg.policy(),
    })?;

    match outcome {
        ExecutionOutcome::Failure { trace } => {
            println!("submission failed:\n{trace}");
            Ok(exit_codes::FAILED)
        }
        ExecutionOutcome::Table(actual) => match compare(&after, &actual) {
            CompareResult::Match => {
                println!("correct");
                Ok(exit_codes::OK)
            }
            CompareResult::Mismatch => {
                println!("incorrect");
                println!("expected:\n{after}");
                println!("actual:\n{actual}");
                Ok(exit_codes::MISMATCH)
            }
        },
    }
}

fn print_report(report: &ValidationReport) {
    for check in &report.checks {
        let verdict = match check.verdict {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
        };
        println!("[{verdict}] {}", check.name);
    }
}
