//! Isolated execution of learner submissions.
//!
//! The [`TransformRunner`] trait decouples the pipeline from the actual
//! execution backend. Tests use scripted runners that return predetermined
//! outcomes without spawning processes; production uses [`PythonRunner`],
//! which gives every attempt its own throwaway directory so attempts can
//! never observe each other's code or output.

use std::fs;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, info, instrument};

use crate::core::outcome::ExecutionOutcome;
use crate::io::process::{CommandOutput, run_command_with_timeout};
use crate::io::table::{read_table, write_table};

/// File the submission source is persisted as inside the attempt directory.
pub const SUBMISSION_FILE: &str = "answer.py";
/// File the input table is handed over as.
pub const INPUT_FILE: &str = "input.csv";
/// File the submission's entry point is expected to write.
pub const OUTPUT_FILE: &str = "after.csv";

/// Resource bounds applied to one submission run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxPolicy {
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            output_limit_bytes: 100_000,
        }
    }
}

/// Parameters for one submission run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Submission source text, written verbatim into the attempt directory.
    pub source: String,
    /// The "before" table. The runner hands user code its own serialized
    /// copy; the canonical frame is never exposed to the attempt.
    pub input: DataFrame,
    pub policy: SandboxPolicy,
}

/// Abstraction over submission execution backends.
pub trait TransformRunner: Send + Sync {
    /// Run the submission against the input table. Execution problems are
    /// captured in the returned outcome; only infrastructure failures
    /// (scratch dir or file setup) surface as errors.
    fn run(&self, request: &RunRequest) -> Result<ExecutionOutcome>;
}

/// Runner that invokes a Python interpreter on the persisted submission.
///
/// Contract with the submission (matching the scaffold): it is invoked as
/// `<interpreter> answer.py input.csv` with the attempt directory as cwd and
/// must write its transformed table to `after.csv` there.
pub struct PythonRunner {
    interpreter: Vec<String>,
}

impl PythonRunner {
    /// `interpreter` is the argv prefix, e.g. `["python3"]`.
    pub fn new(interpreter: Vec<String>) -> Self {
        Self { interpreter }
    }
}

impl Default for PythonRunner {
    fn default() -> Self {
        Self::new(vec!["python3".to_string()])
    }
}

impl TransformRunner for PythonRunner {
    #[instrument(skip_all, fields(timeout_secs = request.policy.timeout.as_secs()))]
    fn run(&self, request: &RunRequest) -> Result<ExecutionOutcome> {
        let attempt = tempfile::tempdir().context("create attempt directory")?;
        let dir = attempt.path();
        info!(attempt_dir = %dir.display(), "running submission");

        fs::write(dir.join(SUBMISSION_FILE), &request.source)
            .with_context(|| format!("write {SUBMISSION_FILE}"))?;
        write_table(&dir.join(INPUT_FILE), &request.input)
            .with_context(|| format!("write {INPUT_FILE}"))?;

        let (program, prefix_args) = self
            .interpreter
            .split_first()
            .context("interpreter argv is empty")?;
        let mut cmd = Command::new(program);
        cmd.args(prefix_args)
            .arg(SUBMISSION_FILE)
            .arg(INPUT_FILE)
            .current_dir(dir);

        let output = match run_command_with_timeout(
            cmd,
            request.policy.timeout,
            request.policy.output_limit_bytes,
        ) {
            Ok(output) => output,
            Err(err) => {
                return Ok(ExecutionOutcome::Failure {
                    trace: format!("failed to launch interpreter: {err:#}"),
                });
            }
        };

        if output.timed_out {
            return Ok(ExecutionOutcome::Failure {
                trace: format!(
                    "submission timed out after {}s\n{}",
                    request.policy.timeout.as_secs(),
                    capture_sections(&output)
                ),
            });
        }
        if !output.status.success() {
            return Ok(ExecutionOutcome::Failure {
                trace: format!(
                    "interpreter exited with status {:?}\n{}",
                    output.status.code(),
                    capture_sections(&output)
                ),
            });
        }

        let produced = dir.join(OUTPUT_FILE);
        if !produced.exists() {
            return Ok(ExecutionOutcome::Failure {
                trace: format!(
                    "submission did not write {OUTPUT_FILE}\n{}",
                    capture_sections(&output)
                ),
            });
        }

        match read_table(&produced) {
            Ok(frame) => {
                debug!(rows = frame.height(), cols = frame.width(), "parsed result table");
                Ok(ExecutionOutcome::Table(frame))
            }
            Err(err) => Ok(ExecutionOutcome::Failure {
                trace: format!(
                    "unreadable {OUTPUT_FILE}: {err}\n{}",
                    capture_sections(&output)
                ),
            }),
        }
    }
}

fn capture_sections(output: &CommandOutput) -> String {
    let mut buf = String::new();
    buf.push_str("=== stdout ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stdout));
    buf.push_str(&output.stdout_truncated_notice("submission"));
    buf.push_str("\n=== stderr ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stderr));
    buf.push_str(&output.stderr_truncated_notice("submission"));
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{DOUBLING_SUBMISSION, python3_available};
    use polars::df;

    fn request(source: &str, timeout: Duration) -> RunRequest {
        RunRequest {
            source: source.to_string(),
            input: df!("a" => [1i64, 2]).expect("frame"),
            policy: SandboxPolicy {
                timeout,
                ..SandboxPolicy::default()
            },
        }
    }

    #[test]
    fn runs_submission_and_parses_result_table() {
        if !python3_available() {
            eprintln!("skipping: python3 not available");
            return;
        }
        let runner = PythonRunner::default();
        let outcome = runner
            .run(&request(DOUBLING_SUBMISSION, Duration::from_secs(30)))
            .expect("run");
        let frame = outcome.table().expect("table outcome");
        assert!(frame.equals_missing(&df!("a" => [2i64, 4]).expect("frame")));
    }

    #[test]
    fn raising_submission_becomes_failure_with_trace() {
        if !python3_available() {
            eprintln!("skipping: python3 not available");
            return;
        }
        let source = "def preprocess(df):\n    raise ValueError(\"bad data\")\n\nif __name__ == \"__main__\":\n    preprocess(None)\n";
        let runner = PythonRunner::default();
        let outcome = runner
            .run(&request(source, Duration::from_secs(30)))
            .expect("run");
        match outcome {
            ExecutionOutcome::Failure { trace } => {
                assert!(!trace.is_empty());
                assert!(trace.contains("bad data"));
            }
            ExecutionOutcome::Table(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn silent_submission_fails_for_missing_output() {
        if !python3_available() {
            eprintln!("skipping: python3 not available");
            return;
        }
        let source = "def preprocess(df):\n    return df\n\nif __name__ == \"__main__\":\n    pass\n";
        let runner = PythonRunner::default();
        let outcome = runner
            .run(&request(source, Duration::from_secs(30)))
            .expect("run");
        match outcome {
            ExecutionOutcome::Failure { trace } => {
                assert!(trace.contains(OUTPUT_FILE));
            }
            ExecutionOutcome::Table(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn infinite_loop_is_cut_off_by_policy_timeout() {
        if !python3_available() {
            eprintln!("skipping: python3 not available");
            return;
        }
        let source = "if __name__ == \"__main__\":\n    while True:\n        pass\n";
        let runner = PythonRunner::default();
        let outcome = runner
            .run(&request(source, Duration::from_secs(1)))
            .expect("run");
        match outcome {
            ExecutionOutcome::Failure { trace } => {
                assert!(trace.contains("timed out"));
            }
            ExecutionOutcome::Table(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn missing_interpreter_becomes_failure() {
        let runner = PythonRunner::new(vec!["definitely-not-an-interpreter".to_string()]);
        let outcome = runner
            .run(&request("x = 1", Duration::from_secs(5)))
            .expect("run");
        match outcome {
            ExecutionOutcome::Failure { trace } => {
                assert!(trace.contains("failed to launch interpreter"));
            }
            ExecutionOutcome::Table(_) => panic!("expected failure"),
        }
    }
}
