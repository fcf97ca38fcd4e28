use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use rca::core::evaluate::CheckpointOutcome;

use crate::results::{is_run_dir, read_manifest};

/// Fields of a persisted result that the report needs.
#[derive(Debug, Deserialize)]
struct ResultRecord {
    workflow: String,
    root_cause: String,
    #[serde(default)]
    framework: String,
    #[serde(default)]
    checkpoints: Vec<CheckpointOutcome>,
}

/// Key for per-checkpoint stats: workflow, position, checkpoint name.
pub type CheckpointKey = (String, usize, String);

#[derive(Debug, Default)]
pub struct ReportSummary {
    pub runs: usize,
    pub records: usize,
    pub success: usize,
    /// workflow → root cause → count.
    pub root_causes: BTreeMap<String, BTreeMap<String, usize>>,
    /// (reached, total) per checkpoint.
    pub checkpoint_reach: BTreeMap<CheckpointKey, (usize, usize)>,
    pub frameworks: BTreeMap<String, usize>,
}

/// Run directories to report on.
///
/// `dir` is either one run directory or an output base holding several.
pub fn load_run_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    if is_run_dir(dir) {
        return Ok(vec![dir.to_path_buf()]);
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Aggregate the results each run's manifest lists.
///
/// Files in a run directory that its manifest does not name are ignored.
pub fn aggregate(dir: &Path) -> Result<(ReportSummary, Vec<String>)> {
    let mut summary = ReportSummary::default();
    let mut warnings = Vec::new();

    for run_dir in load_run_dirs(dir)? {
        let manifest = match read_manifest(&run_dir) {
            Ok(manifest) => manifest,
            Err(err) => {
                warnings.push(format!(
                    "skip {}: manifest.json invalid ({err:#})",
                    run_dir.display()
                ));
                continue;
            }
        };
        summary.runs += 1;

        for entry in &manifest.tasks {
            let path = run_dir.join(&entry.result);
            let record: ResultRecord = match fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))
                .and_then(|contents| serde_json::from_str(&contents).context("parse result"))
            {
                Ok(record) => record,
                Err(err) => {
                    warnings.push(format!("skip {}: result invalid ({err})", path.display()));
                    continue;
                }
            };
            add_record(&mut summary, &record);
        }
    }

    Ok((summary, warnings))
}

fn add_record(summary: &mut ReportSummary, record: &ResultRecord) {
    summary.records += 1;
    if record.root_cause == "SUCCESS" {
        summary.success += 1;
    }
    *summary
        .root_causes
        .entry(record.workflow.clone())
        .or_default()
        .entry(record.root_cause.clone())
        .or_insert(0) += 1;
    if !record.framework.is_empty() {
        *summary.frameworks.entry(record.framework.clone()).or_insert(0) += 1;
    }
    for (position, outcome) in record.checkpoints.iter().enumerate() {
        let key = (
            record.workflow.clone(),
            position,
            outcome.checkpoint_name.clone(),
        );
        let entry = summary.checkpoint_reach.entry(key).or_insert((0, 0));
        if outcome.reached {
            entry.0 += 1;
        }
        entry.1 += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{
        BatchManifest, CONFIG_FILE, TaskEntry, result_relpath, write_manifest, write_result,
    };
    use rca::Workflow;
    use rca::core::advice::AdviceTable;
    use rca::core::report::build_result;
    use rca::core::workflow::Branch;
    use tempfile::tempdir;

    fn outcome(name: &str, reached: bool) -> CheckpointOutcome {
        CheckpointOutcome {
            checkpoint_name: name.to_string(),
            reached,
            step_index: None,
            failure_detail: None,
        }
    }

    /// Write a run directory holding one result per `(task_id, branch, reached_first)`.
    fn write_run(run_dir: &Path, results: &[(&str, Branch, bool)]) {
        fs::create_dir_all(run_dir).expect("run dir");
        fs::write(run_dir.join(CONFIG_FILE), "").expect("config");
        let mut tasks = Vec::new();
        for (task_id, branch, reached_first) in results {
            let result = build_result(
                task_id,
                Workflow::Dropdown,
                Workflow::Dropdown.root_cause(*branch),
                vec![outcome("first", *reached_first), outcome("second", false)],
                "selenium",
                &AdviceTable::default(),
            );
            let relpath = write_result(run_dir, &result).expect("write result");
            tasks.push(TaskEntry {
                task_id: task_id.to_string(),
                source: format!("tasks/{task_id}.json"),
                input_hash: String::new(),
                workflow: Workflow::Dropdown,
                root_cause: result.root_cause.label().to_string(),
                result: relpath.display().to_string(),
            });
        }
        let manifest = BatchManifest {
            batch_run_id: "batch".to_string(),
            tasks_dir: "tasks".to_string(),
            workflow: None,
            start_time: String::new(),
            end_time: String::new(),
            duration_secs: 0.0,
            tasks,
            errors: Vec::new(),
        };
        write_manifest(run_dir, &manifest).expect("manifest");
    }

    #[test]
    fn aggregates_results() {
        let temp = tempdir().expect("tempdir");
        write_run(
            temp.path(),
            &[
                ("t1", Branch::Success, true),
                ("t2", Branch::DomParsing, false),
                ("t3", Branch::DomParsing, true),
            ],
        );

        let (summary, warnings) = aggregate(temp.path()).expect("aggregate");
        assert!(warnings.is_empty());
        assert_eq!(summary.runs, 1);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.success, 1);

        let dropdown = summary.root_causes.get("dropdown").expect("dropdown");
        assert_eq!(dropdown.get("DOM_PARSING_FAILURE"), Some(&2));
        assert_eq!(dropdown.get("SUCCESS"), Some(&1));
        assert_eq!(summary.frameworks.get("selenium"), Some(&3));

        let first = ("dropdown".to_string(), 0, "first".to_string());
        let second = ("dropdown".to_string(), 1, "second".to_string());
        assert_eq!(summary.checkpoint_reach.get(&first), Some(&(2, 3)));
        assert_eq!(summary.checkpoint_reach.get(&second), Some(&(0, 3)));
    }

    #[test]
    fn only_results_listed_in_the_manifest_count() {
        let temp = tempdir().expect("tempdir");
        write_run(temp.path(), &[("t1", Branch::WebsiteState, false)]);
        let stray = temp.path().join(result_relpath("stale"));
        fs::write(&stray, r#"{"workflow": "dropdown", "root_cause": "SUCCESS"}"#)
            .expect("stray result");

        let (summary, _) = aggregate(temp.path()).expect("aggregate");
        assert_eq!(summary.records, 1);
        assert_eq!(summary.success, 0);
    }

    #[test]
    fn base_dir_aggregates_every_run() {
        let temp = tempdir().expect("tempdir");
        write_run(&temp.path().join("batch-1"), &[("t1", Branch::Success, true)]);
        write_run(&temp.path().join("batch-2"), &[("t1", Branch::DomParsing, false)]);

        let (summary, warnings) = aggregate(temp.path()).expect("aggregate");
        assert!(warnings.is_empty());
        assert_eq!(summary.runs, 2);
        assert_eq!(summary.records, 2);

        let (summary, _) = aggregate(&temp.path().join("batch-2")).expect("aggregate");
        assert_eq!(summary.runs, 1);
        assert_eq!(summary.success, 0);
    }

    #[test]
    fn invalid_records_become_warnings() {
        let temp = tempdir().expect("tempdir");
        write_run(temp.path(), &[("t1", Branch::WebsiteState, false)]);
        fs::write(temp.path().join(result_relpath("t1")), "{").expect("broken");
        fs::create_dir_all(temp.path().join("scratch")).expect("scratch");

        let (summary, warnings) = aggregate(temp.path()).expect("aggregate");
        assert_eq!(summary.records, 0);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("t1.json"));
    }

    #[test]
    fn missing_dir_is_empty_report() {
        let temp = tempdir().expect("tempdir");
        let (summary, warnings) = aggregate(&temp.path().join("missing")).expect("aggregate");
        assert_eq!(summary.records, 0);
        assert!(warnings.is_empty());
    }
}
