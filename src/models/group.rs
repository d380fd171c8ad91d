//! Group model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One row per remote group the account has ever been a member of.
///
/// Rows are created by discovery and soft-disabled when the account leaves
/// or a permanent send failure is observed. They are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub group_id: i64,
    pub name: String,
    pub join_date: DateTime<Utc>,
    pub last_message: Option<DateTime<Utc>>,
    pub message_count: i64,
    pub member_count: i32,
    pub error_count: i32,
    pub last_error: Option<String>,
    pub is_active: bool,
    pub permanent_error: bool,
    pub is_target: bool,
    pub retry_after: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Whether a dispatch run starting at `now` may select this group.
    ///
    /// permanent_error is terminal and overrides everything else; retry_after
    /// suppresses dispatch until it elapses.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.is_target
            && self.is_active
            && !self.permanent_error
            && self.retry_after.map_or(true, |t| t <= now)
    }
}

/// A single membership as observed from the messaging platform.
///
/// Produced by the messaging client, consumed by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub group_id: i64,
    pub name: String,
    pub member_count: i32,
}
