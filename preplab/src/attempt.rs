//! Orchestration of the validate -> execute -> compare pipeline.

use anyhow::{Context, Result, anyhow};
use polars::prelude::DataFrame;

use crate::core::outcome::{CompareResult, ExecutionOutcome, compare};
use crate::core::session::SessionState;
use crate::core::validate::{ValidationReport, validate_source};
use crate::io::sandbox::{RunRequest, SandboxPolicy, TransformRunner};

/// When the compare step evaluates the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Reuse the outcome captured at submission time. Default.
    Memoize,
    /// Re-run the persisted submission on entering compare, as the reference
    /// implementation did. Nondeterministic submissions can then disagree
    /// between the submit-time preview and the compare view.
    ReevaluateOnCompare,
}

impl EvaluationMode {
    pub fn from_flag(reevaluate_on_compare: bool) -> Self {
        if reevaluate_on_compare {
            EvaluationMode::ReevaluateOnCompare
        } else {
            EvaluationMode::Memoize
        }
    }
}

/// What the compare step shows.
#[derive(Debug, Clone)]
pub enum CompareOutcome {
    Verdict {
        verdict: CompareResult,
        expected: DataFrame,
        actual: DataFrame,
    },
    /// The recorded (or re-run) execution was a failure.
    Failed { trace: String },
}

/// Validate the source and, when both checks pass, run it once against the
/// input table. The validation-failed case never reaches the runner.
pub fn evaluate_submission<R: TransformRunner + ?Sized>(
    source: &str,
    before: &DataFrame,
    runner: &R,
    policy: &SandboxPolicy,
) -> Result<(ValidationReport, Option<ExecutionOutcome>)> {
    let report = validate_source(Some(source));
    if !report.all_passed() {
        return Ok((report, None));
    }
    let outcome = runner
        .run(&RunRequest {
            source: source.to_string(),
            input: before.clone(),
            policy: policy.clone(),
        })
        .context("run submission")?;
    Ok((report, Some(outcome)))
}

/// Full submission pipeline: evaluate, then record everything into the
/// session. The session's `submitted` invariant is maintained by
/// [`SessionState::record_attempt`].
pub fn submit_attempt<R: TransformRunner + ?Sized>(
    session: &mut SessionState,
    source: String,
    before: &DataFrame,
    runner: &R,
    policy: &SandboxPolicy,
) -> Result<()> {
    let (report, outcome) = evaluate_submission(&source, before, runner, policy)?;
    session.record_attempt(source, report, outcome);
    Ok(())
}

/// Build the compare view for a session.
///
/// With [`EvaluationMode::Memoize`] the outcome recorded at submission time
/// is reused; the runner is not consulted. With
/// [`EvaluationMode::ReevaluateOnCompare`] the persisted source is run again
/// and the fresh result is shown, without touching the recorded outcome.
pub fn compare_view<R: TransformRunner + ?Sized>(
    session: &SessionState,
    after: &DataFrame,
    before: &DataFrame,
    runner: &R,
    policy: &SandboxPolicy,
    mode: EvaluationMode,
) -> Result<CompareOutcome> {
    let outcome = match mode {
        EvaluationMode::Memoize => session
            .outcome
            .clone()
            .ok_or_else(|| anyhow!("no recorded execution (submit first)"))?,
        EvaluationMode::ReevaluateOnCompare => {
            let source = session
                .submission
                .as_deref()
                .ok_or_else(|| anyhow!("no submission (submit first)"))?;
            runner
                .run(&RunRequest {
                    source: source.to_string(),
                    input: before.clone(),
                    policy: policy.clone(),
                })
                .context("re-run submission")?
        }
    };

    Ok(match outcome {
        ExecutionOutcome::Table(actual) => CompareOutcome::Verdict {
            verdict: compare(after, &actual),
            expected: after.clone(),
            actual,
        },
        ExecutionOutcome::Failure { trace } => CompareOutcome::Failed { trace },
    })
}
