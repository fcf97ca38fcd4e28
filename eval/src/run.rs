//! Batch classification orchestration.
//!
//! Loads every task in a directory, classifies it, and persists the results
//! and manifest into a fresh run directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use rca::Workflow;
use rca::analyze_task;
use rca::io::config::{ClassifierConfig, write_config};
use rca::io::task_store::{discover_task_files, load_task};

use crate::results::{
    BatchManifest, CONFIG_FILE, TaskEntry, file_sha256, results_dir, write_manifest,
    write_result,
};

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub batch_run_id: String,
    /// Path to this batch's run directory.
    pub run_dir: PathBuf,
    pub manifest: BatchManifest,
}

/// Classify every `*.json` task in `tasks_dir` into a new run directory under
/// `out_dir`. Earlier runs in `out_dir` are left untouched.
///
/// Tasks that cannot be loaded, repeat an earlier `task_id`, or name no
/// workflow are skipped and recorded in the manifest's `errors`.
#[instrument(skip_all, fields(tasks_dir = %tasks_dir.display()))]
pub fn run_batch(
    tasks_dir: &Path,
    out_dir: &Path,
    workflow: Option<Workflow>,
    config: &ClassifierConfig,
) -> Result<BatchOutcome> {
    info!("batch started");
    if !tasks_dir.is_dir() {
        bail!("tasks dir {} not found", tasks_dir.display());
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create results dir {}", out_dir.display()))?;
    if same_dir(tasks_dir, out_dir)? {
        bail!("results dir must differ from tasks dir {}", tasks_dir.display());
    }

    let started_at = Utc::now();
    let (batch_run_id, run_dir) = create_run_dir(out_dir, &started_at)?;
    debug!(batch_run_id = %batch_run_id, "run directory created");
    write_config(&run_dir.join(CONFIG_FILE), config).context("write effective config")?;

    let mut seen = BTreeSet::new();
    let mut tasks = Vec::new();
    let mut errors = Vec::new();

    for path in discover_task_files(tasks_dir)? {
        let task = match load_task(&path) {
            Ok(task) => task,
            Err(err) => {
                warn!(path = %path.display(), "task skipped");
                errors.push(format!("skip {}: {err:#}", path.display()));
                continue;
            }
        };
        if !seen.insert(task.task_id.clone()) {
            errors.push(format!(
                "skip {}: duplicate task_id {}",
                path.display(),
                task.task_id
            ));
            continue;
        }
        let Some(task_workflow) = task.workflow_or(workflow) else {
            errors.push(format!("skip {}: no workflow", path.display()));
            continue;
        };

        let input_hash = match file_sha256(&path) {
            Ok(hash) => hash,
            Err(err) => {
                errors.push(format!("{}: input hash: {err}", task.task_id));
                String::new()
            }
        };

        let result = analyze_task(&task, task_workflow, config);
        let result_file = write_result(&run_dir, &result)?;
        debug!(task_id = %task.task_id, root_cause = %result.root_cause, "task classified");

        tasks.push(TaskEntry {
            task_id: task.task_id.clone(),
            source: path.display().to_string(),
            input_hash,
            workflow: task_workflow,
            root_cause: result.root_cause.label().to_string(),
            result: result_file.display().to_string(),
        });
    }

    if !errors.is_empty() {
        warn!(errors = ?errors, "batch had skipped tasks");
    }

    let finished_at = Utc::now();
    let duration = finished_at - started_at;
    let manifest = BatchManifest {
        batch_run_id: batch_run_id.clone(),
        tasks_dir: tasks_dir.display().to_string(),
        workflow,
        start_time: started_at.to_rfc3339(),
        end_time: finished_at.to_rfc3339(),
        duration_secs: duration.num_milliseconds() as f64 / 1000.0,
        tasks,
        errors,
    };
    write_manifest(&run_dir, &manifest)?;

    info!(
        classified = manifest.tasks.len(),
        skipped = manifest.errors.len(),
        run_dir = %run_dir.display(),
        "batch complete"
    );
    Ok(BatchOutcome {
        batch_run_id,
        run_dir,
        manifest,
    })
}

/// Create `<out_dir>/batch-<timestamp>`, suffixed when that name is taken.
fn create_run_dir(out_dir: &Path, started_at: &DateTime<Utc>) -> Result<(String, PathBuf)> {
    let stem = format!("batch-{}", started_at.format("%Y%m%d_%H%M%S"));
    let mut batch_run_id = stem.clone();
    let mut suffix = 1;
    while results_dir(out_dir, &batch_run_id).exists() {
        suffix += 1;
        batch_run_id = format!("{stem}-{suffix}");
    }
    let run_dir = results_dir(out_dir, &batch_run_id);
    fs::create_dir(&run_dir).with_context(|| format!("create {}", run_dir.display()))?;
    Ok((batch_run_id, run_dir))
}

fn same_dir(left: &Path, right: &Path) -> Result<bool> {
    let left = left
        .canonicalize()
        .with_context(|| format!("resolve {}", left.display()))?;
    let right = right
        .canonicalize()
        .with_context(|| format!("resolve {}", right.display()))?;
    Ok(left == right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{MANIFEST_FILE, read_manifest, result_relpath};
    use rca::test_support::dropdown_success_actions;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), value.to_string()).expect("write task");
    }

    fn success_actions() -> Value {
        Value::Array(
            dropdown_success_actions()
                .iter()
                .map(|action| {
                    json!({
                        "action": action.action,
                        "target": action.target,
                        "value": action.value,
                        "success": action.success,
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn classifies_tasks_and_records_skips() {
        let temp = tempdir().expect("tempdir");
        let tasks = temp.path().join("tasks");
        let out = temp.path().join("out");
        fs::create_dir_all(&tasks).expect("tasks dir");

        write(&tasks, "a.json", &json!({"task_id": "ok", "actions": success_actions()}));
        write(
            &tasks,
            "b.json",
            &json!({"task_id": "dom", "log": "Error: Cannot find dropdown element in DOM", "dom_snapshot": ""}),
        );
        write(&tasks, "c.json", &json!({"task_id": "ok", "log": "duplicate"}));
        fs::write(tasks.join("d.json"), "{broken").expect("broken");
        write(
            &tasks,
            "e.json",
            &json!({"task_id": "search-1", "workflow": "search", "log": "Navigate to arxiv"}),
        );

        let outcome =
            run_batch(&tasks, &out, Some(Workflow::Dropdown), &ClassifierConfig::default())
                .expect("batch");

        let ids: Vec<_> = outcome.manifest.tasks.iter().map(|t| t.task_id.as_str()).collect();
        assert_eq!(ids, vec!["ok", "dom", "search-1"]);
        let causes: Vec<_> = outcome
            .manifest
            .tasks
            .iter()
            .map(|t| t.root_cause.as_str())
            .collect();
        assert_eq!(causes, vec!["SUCCESS", "DOM_PARSING_FAILURE", "WEBSITE_STATE_FAILURE"]);
        assert_eq!(outcome.manifest.tasks[2].workflow, Workflow::Dropdown);
        assert_eq!(outcome.manifest.errors.len(), 2);
        assert!(outcome.manifest.tasks.iter().all(|t| t.input_hash.len() == 64));

        let run_dir = &outcome.run_dir;
        assert_eq!(run_dir, &out.join(&outcome.batch_run_id));
        assert!(run_dir.join(result_relpath("ok")).exists());
        assert!(run_dir.join(result_relpath("dom")).exists());
        assert!(run_dir.join(MANIFEST_FILE).exists());
        assert!(run_dir.join(CONFIG_FILE).exists());
        assert_eq!(outcome.manifest.tasks[0].result, "results/ok.json");
    }

    #[test]
    fn repeated_runs_get_separate_directories() {
        let temp = tempdir().expect("tempdir");
        let tasks = temp.path().join("tasks");
        let out = temp.path().join("out");
        fs::create_dir_all(&tasks).expect("tasks dir");
        write(&tasks, "a.json", &json!({"task_id": "a", "log": "Navigate"}));
        let config = ClassifierConfig::default();

        let first = run_batch(&tasks, &out, Some(Workflow::Search), &config).expect("first");
        fs::remove_file(tasks.join("a.json")).expect("remove");
        write(&tasks, "b.json", &json!({"task_id": "b", "log": "Navigate"}));
        let second = run_batch(&tasks, &out, Some(Workflow::Search), &config).expect("second");

        assert_ne!(first.run_dir, second.run_dir);
        assert!(first.run_dir.join(result_relpath("a")).exists());
        assert!(!second.run_dir.join(result_relpath("a")).exists());
        let manifest = read_manifest(&second.run_dir).expect("manifest");
        assert_eq!(manifest.batch_run_id, second.batch_run_id);
        assert_eq!(manifest.tasks.len(), 1);
        assert_eq!(manifest.tasks[0].task_id, "b");
    }

    #[test]
    fn reserved_file_names_are_ordinary_task_ids() {
        let temp = tempdir().expect("tempdir");
        let tasks = temp.path().join("tasks");
        fs::create_dir_all(&tasks).expect("tasks dir");
        write(&tasks, "m.json", &json!({"task_id": "manifest", "log": "Navigate"}));

        let outcome = run_batch(
            &tasks,
            &temp.path().join("out"),
            Some(Workflow::Search),
            &ClassifierConfig::default(),
        )
        .expect("batch");
        let result = fs::read_to_string(outcome.run_dir.join(result_relpath("manifest")))
            .expect("result");
        assert!(result.contains("root_cause"));
        assert_eq!(read_manifest(&outcome.run_dir).expect("manifest").tasks.len(), 1);
    }

    #[test]
    fn tasks_without_workflow_are_skipped() {
        let temp = tempdir().expect("tempdir");
        let tasks = temp.path().join("tasks");
        fs::create_dir_all(&tasks).expect("tasks dir");
        write(&tasks, "a.json", &json!({"task_id": "a", "log": "Navigate"}));

        let outcome = run_batch(&tasks, &temp.path().join("out"), None, &ClassifierConfig::default())
            .expect("batch");
        assert!(outcome.manifest.tasks.is_empty());
        assert_eq!(outcome.manifest.errors.len(), 1);
        assert!(outcome.manifest.errors[0].contains("no workflow"));
    }

    #[test]
    fn rejects_results_inside_tasks_dir() {
        let temp = tempdir().expect("tempdir");
        let err = run_batch(temp.path(), temp.path(), None, &ClassifierConfig::default())
            .expect_err("same dir");
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn rejects_missing_tasks_dir() {
        let temp = tempdir().expect("tempdir");
        let err = run_batch(
            &temp.path().join("missing"),
            &temp.path().join("out"),
            None,
            &ClassifierConfig::default(),
        )
        .expect_err("missing dir");
        assert!(err.to_string().contains("not found"));
    }
}
