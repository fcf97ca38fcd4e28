//! Deterministic, pure classification logic.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return identical outputs for identical inputs.

pub mod advice;
pub mod cascade;
pub mod checkpoint;
pub mod evaluate;
pub mod keywords;
pub mod normalize;
pub mod report;
pub mod step;
pub mod task;
pub mod workflow;
