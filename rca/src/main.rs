//! Deterministic root-cause classifier CLI.
//!
//! Classifies one task file against a workflow and prints the result as
//! JSON on stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::debug;

use rca::analyze_task;
use rca::exit_codes;
use rca::io::config::{ClassifierConfig, load_config};
use rca::io::task_store::load_task;
use rca::{AnalysisResult, Workflow};

#[derive(Parser)]
#[command(
    name = "rca",
    version,
    about = "Deterministic root-cause classifier for browser automation runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a task file and print the result as JSON.
    ///
    /// Exits 0 when the task succeeded, 2 when a failure root cause was assigned.
    Analyze {
        /// Path to the task JSON file.
        task: PathBuf,
        /// Workflow to evaluate against (overrides the task's own `workflow`).
        #[arg(short, long)]
        workflow: Option<Workflow>,
        /// Classifier config (TOML). Built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print single-line JSON.
        #[arg(long)]
        compact: bool,
    },
    /// List workflows and their checkpoints.
    Workflows,
}

fn main() {
    rca::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            task,
            workflow,
            config,
            compact,
        } => cmd_analyze(&task, workflow, config.as_deref(), compact),
        Command::Workflows => {
            cmd_workflows();
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_analyze(
    task_path: &Path,
    workflow: Option<Workflow>,
    config_path: Option<&Path>,
    compact: bool,
) -> Result<i32> {
    let config = match config_path {
        Some(path) => load_config(path).context("load config")?,
        None => ClassifierConfig::default(),
    };
    let task = load_task(task_path)?;
    let workflow = task.workflow_or(workflow).ok_or_else(|| {
        anyhow!(
            "task {} names no workflow; pass --workflow (dropdown or search)",
            task.task_id
        )
    })?;
    debug!(task_id = %task.task_id, %workflow, "task loaded");

    let result = analyze_task(&task, workflow, &config);
    print_result(&result, compact)?;

    Ok(if result.root_cause.is_success() {
        exit_codes::OK
    } else {
        exit_codes::FAILURE_CLASSIFIED
    })
}

fn print_result(result: &AnalysisResult, compact: bool) -> Result<()> {
    let payload = if compact {
        serde_json::to_string(result)
    } else {
        serde_json::to_string_pretty(result)
    }
    .context("serialize result")?;
    println!("{payload}");
    Ok(())
}

fn cmd_workflows() {
    for workflow in Workflow::ALL {
        println!("{workflow}");
        for checkpoint in workflow.definition().checkpoints() {
            let kinds: Vec<_> = checkpoint
                .matcher
                .kinds
                .iter()
                .map(|kind| kind.as_str())
                .collect();
            println!(
                "  {}. {} [{}]{}",
                checkpoint.order,
                checkpoint.name,
                kinds.join(","),
                if checkpoint.dynamic_content.is_some() {
                    " (dynamic)"
                } else {
                    ""
                }
            );
        }
    }
}
