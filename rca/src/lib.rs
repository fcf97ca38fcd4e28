//! Deterministic root-cause classifier for browser automation runs.
//!
//! A task's outcome log is normalized into ordered steps, matched against the
//! checkpoints of an expected workflow, and resolved to exactly one root
//! cause by a fixed cascade of rules:
//!
//! - **[`core`]**: Pure, deterministic logic (normalization, checkpoint
//!   evaluation, cascade, result assembly). No I/O.
//! - **[`io`]**: Config and task file loading.
//!
//! [`analyze::analyze_task`] composes the stages for a single task.

pub mod analyze;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use analyze::analyze_task;
pub use crate::core::report::AnalysisResult;
pub use crate::core::task::TaskInput;
pub use crate::core::workflow::{RootCause, Workflow};
