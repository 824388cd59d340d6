//! Step progression for a practice session.
//!
//! The four steps gate which views and actions are available. Transitions are
//! enforced here centrally; callers surface refusals instead of bypassing them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four session steps, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Read the problem statement and inspect both tables.
    #[default]
    Confirm,
    /// Upload or edit the candidate source.
    Submit,
    /// See the verdict next to expected and actual tables.
    Compare,
    /// Everything finished.
    Done,
}

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionRefused {
    #[error("already at the first step")]
    AtStart,
    #[error("no forward step from here")]
    AtEnd,
    #[error("submission must pass validation and execute before comparing")]
    NotSubmitted,
}

impl Step {
    /// Zero-based index, matching the order the steps are presented in.
    pub fn index(self) -> u8 {
        match self {
            Step::Confirm => 0,
            Step::Submit => 1,
            Step::Compare => 2,
            Step::Done => 3,
        }
    }

    /// Move forward one step.
    ///
    /// Submit -> Compare requires an accepted submission. Compare is
    /// terminal-forward: the reference flow never advances out of it.
    pub fn advance(self, submitted: bool) -> Result<Step, TransitionRefused> {
        match self {
            Step::Confirm => Ok(Step::Submit),
            Step::Submit if submitted => Ok(Step::Compare),
            Step::Submit => Err(TransitionRefused::NotSubmitted),
            Step::Compare | Step::Done => Err(TransitionRefused::AtEnd),
        }
    }

    /// Move back one step. Refused at Confirm.
    pub fn retreat(self) -> Result<Step, TransitionRefused> {
        match self {
            Step::Confirm => Err(TransitionRefused::AtStart),
            Step::Submit => Ok(Step::Confirm),
            Step::Compare => Ok(Step::Submit),
            Step::Done => Ok(Step::Compare),
        }
    }
}
