//! Lab configuration stored in `preplab.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::sandbox::SandboxPolicy;

/// Lab configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabConfig {
    /// Directory holding `problemNNN/` folders.
    pub problems_dir: PathBuf,

    /// Interpreter argv used to run submissions (e.g. `["python3"]`).
    pub interpreter: Vec<String>,

    /// Wall-clock budget for one submission run in seconds.
    pub run_timeout_secs: u64,

    /// Truncate captured submission stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,

    /// Legacy compatibility: re-run the persisted submission when entering
    /// the compare step instead of reusing the memoized outcome. Off by
    /// default; nondeterministic submissions can disagree between the
    /// submit-time preview and the compare view when this is on.
    pub reevaluate_on_compare: bool,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            problems_dir: PathBuf::from("problems"),
            interpreter: vec!["python3".to_string()],
            run_timeout_secs: 30,
            output_limit_bytes: 100_000,
            reevaluate_on_compare: false,
        }
    }
}

impl LabConfig {
    pub fn validate(&self) -> Result<()> {
        if self.run_timeout_secs == 0 {
            return Err(anyhow!("run_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.interpreter.is_empty() || self.interpreter[0].trim().is_empty() {
            return Err(anyhow!("interpreter must be a non-empty array"));
        }
        Ok(())
    }

    /// Sandbox policy derived from the timeout and output bounds.
    pub fn policy(&self) -> SandboxPolicy {
        SandboxPolicy {
            timeout: Duration::from_secs(self.run_timeout_secs),
            output_limit_bytes: self.output_limit_bytes,
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LabConfig::default()`.
pub fn load_config(path: &Path) -> Result<LabConfig> {
    if !path.exists() {
        let cfg = LabConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LabConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &LabConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
