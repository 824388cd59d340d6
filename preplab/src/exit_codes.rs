//! Stable exit codes for preplab CLI commands.

/// Command succeeded; for `run`, the produced table matched the expected one.
pub const OK: i32 = 0;
/// Command failed due to invalid catalog/config/arguments or other errors.
pub const ERROR: i32 = 1;
/// `check` or `run` rejected the submission at validation.
pub const REJECTED: i32 = 2;
/// `run` executed the submission but it failed (load, raise, timeout).
pub const FAILED: i32 = 3;
/// `run` executed the submission but the produced table did not match.
pub const MISMATCH: i32 = 4;
