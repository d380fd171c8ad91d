//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod group;
pub mod report;
pub mod stats;

// Re-export commonly used models
pub use group::{Group, Membership};
pub use report::{DiscoveryReport, DispatchReport, RunSummary, StatsReport};
pub use stats::FleetStats;
