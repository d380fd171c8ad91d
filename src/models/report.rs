//! Per-run result reports
//!
//! Every job run produces a structured report that travels through the
//! orchestrator's result channel and is retained for status queries.

use serde::{Deserialize, Serialize};

use crate::models::stats::FleetStats;

/// Outcome of one discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    /// Memberships observed from the platform.
    pub observed: usize,
    /// Groups seen for the first time.
    pub new_groups: usize,
    /// Previously known groups refreshed in place.
    pub refreshed: usize,
    /// Previously active groups soft-disabled because they were absent.
    pub deactivated: u64,
}

/// Outcome of one dispatch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Size of the eligibility snapshot taken at run start.
    pub eligible: usize,
    pub sent: usize,
    pub transient_failures: usize,
    pub permanent_failures: usize,
    /// True when a shutdown request stopped the run between groups.
    pub interrupted: bool,
}

/// Outcome of one stats aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    pub stats: FleetStats,
    pub snapshot_saved: bool,
    /// True when the snapshot was also published to Redis.
    pub published: bool,
}

/// What a completed job run accomplished, by job kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunSummary {
    Discovery(DiscoveryReport),
    Dispatch(DispatchReport),
    Stats(StatsReport),
}
