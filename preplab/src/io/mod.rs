//! Side-effecting operations: filesystem catalog, configuration, process
//! execution, sandboxed submission runs. Isolated to enable scripted fakes
//! in tests.

pub mod catalog;
pub mod config;
pub mod process;
pub mod sandbox;
pub mod table;
