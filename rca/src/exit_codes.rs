//! Stable exit codes for `rca` CLI commands.

/// Command succeeded; for `rca analyze`, the task was classified as `SUCCESS`.
pub const OK: i32 = 0;
/// Command failed due to an unreadable task, invalid config, or other errors.
pub const INVALID: i32 = 1;
/// `rca analyze` classified the task under a failure root cause.
pub const FAILURE_CLASSIFIED: i32 = 2;
