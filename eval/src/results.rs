//! Result persistence.
//!
//! Each batch gets its own run directory under the output base:
//!
//! ```text
//! <out>/<batch_run_id>/manifest.json
//! <out>/<batch_run_id>/config.toml
//! <out>/<batch_run_id>/results/<task_id>.json
//! ```
//!
//! The manifest records timing, input hashes, non-fatal errors, and the
//! relative path of every result it owns.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use rca::AnalysisResult;
use rca::Workflow;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const CONFIG_FILE: &str = "config.toml";
pub const RESULTS_DIR: &str = "results";

/// Metadata for a batch run, persisted to `manifest.json`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchManifest {
    pub batch_run_id: String,
    pub tasks_dir: String,
    /// Workflow passed on the command line, if any.
    pub workflow: Option<Workflow>,
    pub start_time: String,
    pub end_time: String,
    pub duration_secs: f64,
    pub tasks: Vec<TaskEntry>,
    /// Non-fatal errors: unreadable tasks, duplicates, missing workflows.
    pub errors: Vec<String>,
}

/// One classified task in the manifest.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    pub task_id: String,
    pub source: String,
    /// SHA-256 of the task file for reproducibility tracking.
    pub input_hash: String,
    pub workflow: Workflow,
    pub root_cause: String,
    /// Result file, relative to the run directory.
    pub result: String,
}

pub fn results_dir(base_dir: &Path, batch_run_id: &str) -> PathBuf {
    base_dir.join(batch_run_id)
}

/// Result file for `task_id`, relative to the run directory.
pub fn result_relpath(task_id: &str) -> PathBuf {
    Path::new(RESULTS_DIR).join(format!("{task_id}.json"))
}

pub fn write_result(run_dir: &Path, result: &AnalysisResult) -> Result<PathBuf> {
    let relpath = result_relpath(&result.task_id);
    let path = run_dir.join(&relpath);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    write_json(&path, result).context("write result")?;
    Ok(relpath)
}

pub fn write_manifest(run_dir: &Path, manifest: &BatchManifest) -> Result<()> {
    write_json(&run_dir.join(MANIFEST_FILE), manifest).context("write manifest")
}

pub fn read_manifest(run_dir: &Path) -> Result<BatchManifest> {
    let path = run_dir.join(MANIFEST_FILE);
    let contents =
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// True when `dir` holds a batch written by `run`.
pub fn is_run_dir(dir: &Path) -> bool {
    dir.join(MANIFEST_FILE).is_file() && dir.join(CONFIG_FILE).is_file()
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let digest = hasher.finalize();
    Ok(hex::encode(digest))
}

/// Serialize `value` to pretty-printed JSON with trailing newline.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value).context("serialize json")?;
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
