//! Fleet statistics model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Fleet-wide aggregates computed from the groups table.
///
/// One snapshot row is persisted per stats run; mean_error_rate averages
/// error_count / (message_count + error_count) over groups with at least one
/// recorded outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FleetStats {
    pub total_groups: i64,
    pub active_groups: i64,
    pub target_groups: i64,
    pub permanent_error_groups: i64,
    pub total_messages: i64,
    pub mean_error_rate: f64,
    pub computed_at: DateTime<Utc>,
}

impl FleetStats {
    /// An all-zero snapshot for an empty fleet.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            total_groups: 0,
            active_groups: 0,
            target_groups: 0,
            permanent_error_groups: 0,
            total_messages: 0,
            mean_error_rate: 0.0,
            computed_at: now,
        }
    }
}
