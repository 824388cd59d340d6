//! Problem catalog: folder-per-problem discovery and loading.
//!
//! Layout consumed: `<root>/problemNNN/` containing `explain.toml` (name and
//! description), `before.csv` and `after.csv`. No caching; the expected
//! catalog size makes a re-scan per call acceptable.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, PolarsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::io::table::read_table;

/// Directories matching this prefix are treated as problems.
pub const PROBLEM_PREFIX: &str = "problem";
pub const METADATA_FILE: &str = "explain.toml";
pub const BEFORE_FILE: &str = "before.csv";
pub const AFTER_FILE: &str = "after.csv";

/// Human-readable metadata loaded from a problem's `explain.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemMeta {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown problem '{0}'")]
    NotFound(String),
    #[error("scan problems directory {path}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read metadata {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse metadata {path}")]
    ParseMetadata {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("read table {path}")]
    Table {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("read {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scan `root` and return metadata for every problem folder, keyed by id.
///
/// A matched folder with a missing or unreadable metadata file fails the
/// whole listing; there are no partial catalogs.
pub fn list_problems(root: &Path) -> Result<BTreeMap<String, ProblemMeta>, CatalogError> {
    let entries = fs::read_dir(root).map_err(|source| CatalogError::Scan {
        path: root.to_path_buf(),
        source,
    })?;

    let mut problems = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|source| CatalogError::Scan {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(id) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !id.starts_with(PROBLEM_PREFIX) {
            continue;
        }
        let meta = read_meta(&path.join(METADATA_FILE))?;
        problems.insert(id.to_string(), meta);
    }

    debug!(count = problems.len(), root = %root.display(), "scanned catalog");
    Ok(problems)
}

/// Load metadata for one problem.
pub fn load_meta(root: &Path, id: &str) -> Result<ProblemMeta, CatalogError> {
    read_meta(&problem_dir(root, id)?.join(METADATA_FILE))
}

/// Load the canonical before/after table pair for one problem.
pub fn load_tables(root: &Path, id: &str) -> Result<(DataFrame, DataFrame), CatalogError> {
    let dir = problem_dir(root, id)?;
    let before = read_problem_table(&dir.join(BEFORE_FILE))?;
    let after = read_problem_table(&dir.join(AFTER_FILE))?;
    Ok((before, after))
}

/// Raw CSV text of one of a problem's tables, for downloads.
pub fn load_csv_text(root: &Path, id: &str, file_name: &str) -> Result<String, CatalogError> {
    let path = problem_dir(root, id)?.join(file_name);
    fs::read_to_string(&path).map_err(|source| CatalogError::Csv { path, source })
}

fn problem_dir(root: &Path, id: &str) -> Result<PathBuf, CatalogError> {
    let dir = root.join(id);
    if !id.starts_with(PROBLEM_PREFIX) || !dir.is_dir() {
        return Err(CatalogError::NotFound(id.to_string()));
    }
    Ok(dir)
}

fn read_meta(path: &Path) -> Result<ProblemMeta, CatalogError> {
    let contents = fs::read_to_string(path).map_err(|source| CatalogError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| CatalogError::ParseMetadata {
        path: path.to_path_buf(),
        source,
    })
}

fn read_problem_table(path: &Path) -> Result<DataFrame, CatalogError> {
    read_table(path).map_err(|source| CatalogError::Table {
        path: path.to_path_buf(),
        source,
    })
}
