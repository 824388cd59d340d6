//! Execution outcomes and structural table comparison.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Result of actually running a submission: a produced table, or a captured
/// failure. Failures are data, never propagated errors.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    Table(DataFrame),
    Failure { trace: String },
}

impl ExecutionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionOutcome::Failure { .. })
    }

    pub fn table(&self) -> Option<&DataFrame> {
        match self {
            ExecutionOutcome::Table(frame) => Some(frame),
            ExecutionOutcome::Failure { .. } => None,
        }
    }
}

/// Verdict of comparing produced output against the expected table.
/// Mismatch is a normal negative result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareResult {
    Match,
    Mismatch,
}

/// Structural equality: same columns in the same order, same row order, same
/// values under dtype-sensitive comparison. A column read as integers does not
/// match the same digits read as floats. Nulls compare equal to nulls.
pub fn compare(expected: &DataFrame, actual: &DataFrame) -> CompareResult {
    if expected.equals_missing(actual) {
        CompareResult::Match
    } else {
        CompareResult::Mismatch
    }
}
