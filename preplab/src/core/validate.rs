//! Static textual checks on submitted source.
//!
//! Both checks are plain substring searches, not parse-based. That is
//! deliberately permissive: the transform name appearing only in a comment
//! still passes check 1. Execution is what settles correctness.

use serde::{Deserialize, Serialize};

/// Name of the learner-authored transform function.
pub const TRANSFORM_FN: &str = "preprocess";

/// Entry-point guard the scaffold ships with; must survive editing verbatim.
pub const ENTRY_POINT_GUARD: &str = "if __name__ == \"__main__\":";

pub const CHECK_TRANSFORM_PRESENT: &str = "transform function present";
pub const CHECK_ENTRY_POINT_UNCHANGED: &str = "entry point unchanged";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    fn from_bool(passed: bool) -> Self {
        if passed { Verdict::Pass } else { Verdict::Fail }
    }
}

/// One named check and its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub verdict: Verdict,
}

/// Ordered verdicts for all checks of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checks: Vec<Check>,
}

impl ValidationReport {
    pub fn all_passed(&self) -> bool {
        self.checks
            .iter()
            .all(|check| check.verdict == Verdict::Pass)
    }
}

/// Validate submitted source text. Never errors; a missing or empty
/// submission fails both checks.
pub fn validate_source(source: Option<&str>) -> ValidationReport {
    let text = source.unwrap_or_default();
    let checks = vec![
        Check {
            name: CHECK_TRANSFORM_PRESENT.to_string(),
            verdict: Verdict::from_bool(text.contains(TRANSFORM_FN)),
        },
        Check {
            name: CHECK_ENTRY_POINT_UNCHANGED.to_string(),
            verdict: Verdict::from_bool(text.contains(ENTRY_POINT_GUARD)),
        },
    ];
    ValidationReport { checks }
}
