//! Test-only helpers: problem directory fixtures and scripted runners.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tempfile::TempDir;

use crate::core::outcome::ExecutionOutcome;
use crate::io::sandbox::{RunRequest, TransformRunner};

/// A stdlib-only submission that doubles column `a`. Passes both validator
/// checks and needs no third-party Python packages, so engine tests run on a
/// bare `python3`.
pub const DOUBLING_SUBMISSION: &str = r#"import csv
import sys


def preprocess(rows):
    for row in rows:
        row["a"] = str(int(row["a"]) * 2)
    return rows


if __name__ == "__main__":
    with open(sys.argv[1], newline="") as f:
        reader = csv.DictReader(f)
        fields = reader.fieldnames
        rows = preprocess(list(reader))
    with open("after.csv", "w", newline="") as f:
        writer = csv.DictWriter(f, fieldnames=fields)
        writer.writeheader()
        writer.writerows(rows)
"#;

/// Whether a `python3` binary is on PATH. Engine tests that spawn an
/// interpreter skip themselves when it is absent.
pub fn python3_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// A temporary problems directory seeded with deterministic fixtures.
pub struct ProblemFixture {
    dir: TempDir,
}

impl ProblemFixture {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Create a problems directory with two fixtures:
///
/// - `problem001` "Double the values": `a: [1, 2]` -> `a: [2, 4]`
/// - `problem002` "Identity": before and after are the same table
pub fn sample_problems() -> Result<ProblemFixture> {
    let dir = tempfile::tempdir().context("create fixture dir")?;
    write_problem(
        dir.path(),
        "problem001",
        "Double the values",
        "Multiply every value in column `a` by 2.",
        "a\n1\n2\n",
        "a\n2\n4\n",
    )?;
    write_problem(
        dir.path(),
        "problem002",
        "Identity",
        "Return the table unchanged.",
        "b\nx\ny\n",
        "b\nx\ny\n",
    )?;
    Ok(ProblemFixture { dir })
}

/// Write one problem folder (metadata plus both tables) under `root`.
pub fn write_problem(
    root: &Path,
    id: &str,
    name: &str,
    description: &str,
    before_csv: &str,
    after_csv: &str,
) -> Result<()> {
    let dir = root.join(id);
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let meta = format!("name = {name:?}\ndescription = {description:?}\n");
    fs::write(dir.join("explain.toml"), meta).context("write explain.toml")?;
    fs::write(dir.join("before.csv"), before_csv).context("write before.csv")?;
    fs::write(dir.join("after.csv"), after_csv).context("write after.csv")?;
    Ok(())
}

/// Runner returning a predetermined outcome and counting invocations.
pub struct ScriptedRunner {
    outcome: ExecutionOutcome,
    calls: AtomicUsize,
}

impl ScriptedRunner {
    pub fn table(frame: DataFrame) -> Self {
        Self {
            outcome: ExecutionOutcome::Table(frame),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failure(trace: &str) -> Self {
        Self {
            outcome: ExecutionOutcome::Failure {
                trace: trace.to_string(),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TransformRunner for ScriptedRunner {
    fn run(&self, _request: &RunRequest) -> Result<ExecutionOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome.clone())
    }
}

/// Runner that signals when a run starts and blocks until released, for
/// tests that interleave other session actions with an in-flight run.
pub struct GatedRunner {
    outcome: ExecutionOutcome,
    started: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl GatedRunner {
    /// Returns the runner plus the test's ends of the gate: a receiver that
    /// fires once the run has started, and a sender that lets it finish.
    pub fn table(frame: DataFrame) -> (Self, Receiver<()>, Sender<()>) {
        let (started_tx, started_rx) = channel();
        let (release_tx, release_rx) = channel();
        let runner = Self {
            outcome: ExecutionOutcome::Table(frame),
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        };
        (runner, started_rx, release_tx)
    }
}

impl TransformRunner for GatedRunner {
    fn run(&self, _request: &RunRequest) -> Result<ExecutionOutcome> {
        self.started
            .lock()
            .expect("gate lock")
            .send(())
            .expect("signal start");
        self.release
            .lock()
            .expect("gate lock")
            .recv()
            .expect("wait for release");
        Ok(self.outcome.clone())
    }
}

/// Runner that returns its input table unchanged (an identity transform).
pub struct EchoRunner;

impl TransformRunner for EchoRunner {
    fn run(&self, request: &RunRequest) -> Result<ExecutionOutcome> {
        Ok(ExecutionOutcome::Table(request.input.clone()))
    }
}
