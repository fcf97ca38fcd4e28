//! Task file loading.
//!
//! Task files are JSON documents deserialized into [`TaskInput`]. A missing
//! `task_id` falls back to the file stem.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::core::task::TaskInput;

/// Load and validate a task file.
pub fn load_task(path: &Path) -> Result<TaskInput> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read task {}", path.display()))?;
    let mut task: TaskInput = serde_json::from_str(&contents)
        .with_context(|| format!("parse task {}", path.display()))?;
    if task.task_id.trim().is_empty()
        && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
    {
        task.task_id = stem.to_string();
    }
    validate_task_id(&task.task_id).with_context(|| format!("validate task {}", path.display()))?;
    Ok(task)
}

/// List `*.json` files in `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn discover_task_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read tasks dir {}", dir.display()))? {
        let entry = entry.context("read task entry")?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Task ids become result file names, so they must be path-safe.
pub fn validate_task_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("task_id must be non-empty");
    }
    if id.contains('/') || id.contains('\\') {
        bail!("task_id must not contain path separators");
    }
    if id.contains("..") {
        bail!("task_id must not contain '..'");
    }
    if !id
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.')
    {
        bail!("task_id must use [A-Za-z0-9._-] only");
    }
    Ok(())
}
