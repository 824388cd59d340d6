//! Practice lab for tabular preprocessing exercises.
//!
//! A learner picks a problem (a before/after CSV pair plus a description),
//! submits a Python source defining a `preprocess` transform, and the lab
//! validates, executes and compares it against the expected table. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (step flow, validation, session
//!   state, comparison). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (catalog, config, sandboxed
//!   process execution). Isolated to enable scripted fakes in tests.
//!
//! The [`attempt`] module coordinates core logic with I/O to implement the
//! submission pipeline used by the CLI and the `preplab-ui` server.

pub mod attempt;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod scaffold;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
