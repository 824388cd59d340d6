//! Pure, deterministic logic: step flow, validation, session state,
//! table comparison. No I/O; fully testable in isolation.

pub mod flow;
pub mod outcome;
pub mod session;
pub mod table;
pub mod validate;
