//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use rca::Workflow;
use rca::io::config::{ClassifierConfig, load_config};
use rca::io::task_store::{discover_task_files, load_task};

use crate::report::aggregate;
use crate::results::{CONFIG_FILE, MANIFEST_FILE, is_run_dir};
use crate::run::run_batch;

/// List tasks in a directory with the workflow each would run under.
pub fn list_tasks(tasks_dir: &Path) -> Result<()> {
    for path in discover_task_files(tasks_dir)? {
        match load_task(&path) {
            Ok(task) => {
                let workflow = task
                    .workflow
                    .map(|workflow| workflow.as_str())
                    .unwrap_or("-");
                println!("{} {}", task.task_id, workflow);
            }
            Err(err) => eprintln!("warning: {:#}", err),
        }
    }
    Ok(())
}

/// Classify every task in `tasks_dir` into a new run directory under `out_dir`.
pub fn run_tasks(
    tasks_dir: &Path,
    out_dir: &Path,
    workflow: Option<Workflow>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => load_config(path).context("load config")?,
        None => ClassifierConfig::default(),
    };
    debug!(config = ?config, "config loaded");

    let outcome = run_batch(tasks_dir, out_dir, workflow, &config).context("run batch")?;
    for entry in &outcome.manifest.tasks {
        println!(
            "run: task={} workflow={} root_cause={}",
            entry.task_id, entry.workflow, entry.root_cause
        );
    }
    println!(
        "run: batch_run_id={} classified={} skipped={} results={}",
        outcome.batch_run_id,
        outcome.manifest.tasks.len(),
        outcome.manifest.errors.len(),
        outcome.run_dir.display()
    );
    for error in &outcome.manifest.errors {
        eprintln!("warning: {}", error);
    }
    Ok(())
}

/// Show aggregated root-cause counts for one run or every run under a base.
pub fn report_results(results_dir: &Path) -> Result<()> {
    let (summary, warnings) = aggregate(results_dir)?;
    println!(
        "report: runs={} results={} success={} failure={}",
        summary.runs,
        summary.records,
        summary.success,
        summary.records - summary.success
    );
    for (workflow, causes) in &summary.root_causes {
        for (cause, count) in causes {
            println!("report: {} {} {}", workflow, cause, count);
        }
    }
    for ((workflow, _, checkpoint), (reached, total)) in &summary.checkpoint_reach {
        println!(
            "report: checkpoint {}/{} {}/{}",
            workflow, checkpoint, reached, total
        );
    }
    for (framework, count) in &summary.frameworks {
        println!("report: framework {} {}", framework, count);
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

/// Remove a run directory, or an output base that holds only run directories.
pub fn clean_results(results_dir: &Path) -> Result<()> {
    if !results_dir.exists() {
        println!("clean: nothing at {}", results_dir.display());
        return Ok(());
    }
    if !is_run_dir(results_dir) && !holds_only_runs(results_dir)? {
        bail!(
            "{} does not look like a results directory (missing {} or {})",
            results_dir.display(),
            MANIFEST_FILE,
            CONFIG_FILE
        );
    }
    std::fs::remove_dir_all(results_dir)
        .with_context(|| format!("remove {}", results_dir.display()))?;
    info!(results_dir = %results_dir.display(), "results removed");
    println!("clean: results={}", results_dir.display());
    Ok(())
}

fn holds_only_runs(dir: &Path) -> Result<bool> {
    let mut any = false;
    for entry in std::fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        if !is_run_dir(&entry.path()) {
            return Ok(false);
        }
        any = true;
    }
    Ok(any)
}
