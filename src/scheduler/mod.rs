//! Scheduler module
//!
//! This module owns periodic job execution: job definitions with their
//! single-flight guards, and the orchestrator that times, bounds and
//! monitors them.

pub mod jobs;
pub mod orchestrator;

// Re-export commonly used scheduler components
pub use jobs::{JobKind, JobOutcome, JobReport, JobSet};
pub use orchestrator::Orchestrator;
