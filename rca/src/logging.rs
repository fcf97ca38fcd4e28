//! Diagnostic tracing for the classifier binaries.
//!
//! stdout carries JSON results and report lines, so every event goes to
//! stderr. What gets emitted:
//!
//! - `analyze_task` span (`task_id`, `workflow`) with debug events for the
//!   normalized step count and the final root cause.
//! - One debug event per cascade decision naming the pivot and branch.
//! - Info events for batch start and completion in `eval`, and a warning
//!   listing skipped task files.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber. Call once at binary start.
///
/// ```bash
/// RUST_LOG=rca::core::cascade=debug rca analyze task.json --workflow dropdown
/// RUST_LOG=eval=info eval run tasks/ --workflow search
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .init();
}
