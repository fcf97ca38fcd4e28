mod cli;
mod report;
mod results;
mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use rca::Workflow;

#[derive(Parser)]
#[command(name = "eval", version, about = "Batch harness for the rca classifier")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List task files and their declared workflow.
    List { tasks_dir: PathBuf },
    /// Classify every task in a directory.
    Run {
        tasks_dir: PathBuf,
        /// Workflow for every task (overrides each task's own `workflow`).
        #[arg(short, long)]
        workflow: Option<Workflow>,
        #[arg(short, long, default_value = "results")]
        out: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Summarize a results directory.
    Report { results_dir: PathBuf },
    /// Remove a results directory.
    Clean { results_dir: PathBuf },
}

fn main() -> Result<()> {
    rca::logging::init();
    let cli = Cli::parse();
    match cli.command {
        Command::List { tasks_dir } => cli::list_tasks(&tasks_dir),
        Command::Run {
            tasks_dir,
            workflow,
            out,
            config,
        } => cli::run_tasks(&tasks_dir, &out, workflow, config.as_deref()),
        Command::Report { results_dir } => cli::report_results(&results_dir),
        Command::Clean { results_dir } => cli::clean_results(&results_dir),
    }
}
