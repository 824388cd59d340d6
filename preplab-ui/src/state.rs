//! Shared application state for the UI server.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use preplab::core::session::SessionState;
use preplab::io::config::LabConfig;
use preplab::io::sandbox::TransformRunner;
use uuid::Uuid;

/// Execution backend shared by all request handlers. Tests inject scripted
/// runners; production uses the configured Python interpreter.
pub type SharedRunner = Arc<dyn TransformRunner>;

/// Shared state accessible from all request handlers.
///
/// Every session lives behind the same mutex; handlers hold the lock only to
/// read or write session fields, never across an execution run.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LabConfig>,
    pub runner: SharedRunner,
    pub sessions: Arc<Mutex<HashMap<Uuid, SessionState>>>,
}

impl AppState {
    pub fn new(config: LabConfig, runner: SharedRunner) -> Self {
        Self {
            config: Arc::new(config),
            runner,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Directory holding `problemNNN/` folders.
    pub fn problems_dir(&self) -> &Path {
        &self.config.problems_dir
    }
}
