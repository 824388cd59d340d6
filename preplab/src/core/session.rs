//! Session state: everything one learner's interaction carries between
//! actions. An explicit context object passed to every operation; there is no
//! ambient global state.

use crate::core::flow::{Step, TransitionRefused};
use crate::core::outcome::ExecutionOutcome;
use crate::core::validate::ValidationReport;

/// All mutable state for one practice session.
///
/// Invariant: `submitted` is true only if the most recent report passed every
/// check and the validation-triggered run did not fail. [`record_attempt`]
/// is the single place that sets it.
///
/// [`record_attempt`]: SessionState::record_attempt
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    step: Step,
    pub problem_id: Option<String>,
    pub submission: Option<String>,
    pub report: Option<ValidationReport>,
    pub outcome: Option<ExecutionOutcome>,
    submitted: bool,
    revision: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }

    /// Monotonic change counter, bumped by every successful mutation.
    ///
    /// Callers that release their lock on the session around a long-running
    /// evaluation capture the revision first and re-check it before recording
    /// the result, so an attempt that raced a reset or a problem switch is
    /// discarded instead of repopulating the session.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Select a problem. Deliberately does not touch the step: switching
    /// problems mid-flow keeps the current step, matching the reference
    /// behavior.
    pub fn select_problem(&mut self, problem_id: impl Into<String>) {
        self.problem_id = Some(problem_id.into());
        self.revision += 1;
    }

    /// Record one submission attempt, replacing any prior attempt wholesale.
    ///
    /// `outcome` is `None` when validation failed and the engine never ran.
    pub fn record_attempt(
        &mut self,
        source: String,
        report: ValidationReport,
        outcome: Option<ExecutionOutcome>,
    ) {
        self.submitted = report.all_passed()
            && outcome.as_ref().is_some_and(|outcome| !outcome.is_failure());
        self.submission = Some(source);
        self.report = Some(report);
        self.outcome = outcome;
        self.revision += 1;
    }

    pub fn advance(&mut self) -> Result<(), TransitionRefused> {
        self.step = self.step.advance(self.submitted)?;
        self.revision += 1;
        Ok(())
    }

    pub fn retreat(&mut self) -> Result<(), TransitionRefused> {
        self.step = self.step.retreat()?;
        self.revision += 1;
        Ok(())
    }

    /// Back to Confirm, clearing the submission, report, outcome and
    /// submitted flag. The selected problem survives a reset.
    pub fn reset(&mut self) {
        self.step = Step::Confirm;
        self.submission = None;
        self.report = None;
        self.outcome = None;
        self.submitted = false;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validate::validate_source;
    use polars::df;

    const ACCEPTED: &str = "def preprocess(df):\n    return df\n\nif __name__ == \"__main__\":\n    pass\n";

    #[test]
    fn new_session_starts_at_confirm_with_nothing_recorded() {
        let session = SessionState::new();
        assert_eq!(session.step(), Step::Confirm);
        assert!(session.problem_id.is_none());
        assert!(session.submission.is_none());
        assert!(session.report.is_none());
        assert!(session.outcome.is_none());
        assert!(!session.submitted());
    }

    #[test]
    fn record_attempt_sets_submitted_on_pass_and_table() {
        let mut session = SessionState::new();
        let frame = df!("a" => [1i64]).expect("frame");
        session.record_attempt(
            ACCEPTED.to_string(),
            validate_source(Some(ACCEPTED)),
            Some(ExecutionOutcome::Table(frame)),
        );
        assert!(session.submitted());
    }

    #[test]
    fn record_attempt_keeps_submitted_false_on_failed_checks() {
        let mut session = SessionState::new();
        let frame = df!("a" => [1i64]).expect("frame");
        session.record_attempt(
            "print('hello')".to_string(),
            validate_source(Some("print('hello')")),
            Some(ExecutionOutcome::Table(frame)),
        );
        assert!(!session.submitted());
    }

    #[test]
    fn record_attempt_keeps_submitted_false_on_execution_failure() {
        let mut session = SessionState::new();
        session.record_attempt(
            ACCEPTED.to_string(),
            validate_source(Some(ACCEPTED)),
            Some(ExecutionOutcome::Failure {
                trace: "boom".to_string(),
            }),
        );
        assert!(!session.submitted());
    }

    #[test]
    fn new_attempt_supersedes_previous_one() {
        let mut session = SessionState::new();
        let frame = df!("a" => [1i64]).expect("frame");
        session.record_attempt(
            ACCEPTED.to_string(),
            validate_source(Some(ACCEPTED)),
            Some(ExecutionOutcome::Table(frame)),
        );
        assert!(session.submitted());

        session.record_attempt(
            "broken".to_string(),
            validate_source(Some("broken")),
            None,
        );
        assert!(!session.submitted());
        assert_eq!(session.submission.as_deref(), Some("broken"));
        assert!(session.outcome.is_none());
    }

    #[test]
    fn reset_restores_initial_state_but_keeps_problem() {
        let mut session = SessionState::new();
        session.select_problem("problem001");
        let frame = df!("a" => [1i64]).expect("frame");
        session.record_attempt(
            ACCEPTED.to_string(),
            validate_source(Some(ACCEPTED)),
            Some(ExecutionOutcome::Table(frame)),
        );
        session.advance().expect("confirm -> submit");
        session.advance().expect("submit -> compare");

        session.reset();
        assert_eq!(session.step(), Step::Confirm);
        assert!(session.submission.is_none());
        assert!(session.report.is_none());
        assert!(session.outcome.is_none());
        assert!(!session.submitted());
        assert_eq!(session.problem_id.as_deref(), Some("problem001"));
    }

    #[test]
    fn selecting_a_problem_does_not_reset_the_step() {
        let mut session = SessionState::new();
        session.select_problem("problem001");
        session.advance().expect("confirm -> submit");
        session.select_problem("problem002");
        assert_eq!(session.step(), Step::Submit);
    }

    #[test]
    fn revision_changes_on_every_mutation_but_not_on_refusals() {
        let mut session = SessionState::new();
        let r0 = session.revision();
        session.select_problem("problem001");
        assert_ne!(session.revision(), r0);

        let r1 = session.revision();
        session.advance().expect("confirm -> submit");
        assert_ne!(session.revision(), r1);

        let r2 = session.revision();
        assert!(session.advance().is_err());
        assert_eq!(session.revision(), r2);

        session.record_attempt(
            "broken".to_string(),
            validate_source(Some("broken")),
            None,
        );
        assert_ne!(session.revision(), r2);

        let r3 = session.revision();
        session.reset();
        assert_ne!(session.revision(), r3);
    }

    #[test]
    fn advance_refused_without_accepted_submission() {
        let mut session = SessionState::new();
        session.advance().expect("confirm -> submit");
        assert!(session.advance().is_err());
        assert_eq!(session.step(), Step::Submit);
    }
}
