//! I/O helpers for classifier commands.

pub mod config;
pub mod task_store;
