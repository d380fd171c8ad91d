//! Group store contract
//!
//! The store is the only shared mutable resource in the system. Every
//! mutating operation is atomic per row; increments are computed inside the
//! UPDATE statement so concurrent writers can never apply a stale
//! read-modify-write. Implementations must guarantee per-group_id
//! serializability; callers hold no additional locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::group::{Group, Membership};
use crate::models::stats::FleetStats;
use crate::utils::errors::Result;

#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Insert-or-update a group row from an observed membership.
    ///
    /// Inserts set join_date to `now` and leave is_target at its default.
    /// Updates refresh name and member_count and set
    /// `is_active = NOT permanent_error`, so a permanently failed group is
    /// never resurrected by discovery. Idempotent.
    async fn upsert_membership(&self, membership: &Membership, now: DateTime<Utc>) -> Result<()>;

    /// Soft-disable every currently active group absent from `present_ids`.
    ///
    /// Touches only is_active and updated_at; counters, error fields and
    /// is_target are preserved. Returns the number of rows deactivated.
    async fn deactivate_absent(&self, present_ids: &[i64], now: DateTime<Utc>) -> Result<u64>;

    /// Ids of all groups currently marked active.
    async fn list_active_group_ids(&self) -> Result<Vec<i64>>;

    /// Groups a dispatch run starting at `now` may select.
    ///
    /// Predicate: is_target AND is_active AND NOT permanent_error AND
    /// (retry_after IS NULL OR retry_after <= now). Ordered
    /// least-recently-messaged first (never-messaged groups lead), group_id
    /// as tiebreak.
    async fn query_eligible_targets(&self, now: DateTime<Utc>) -> Result<Vec<Group>>;

    /// Record a successful send: message_count += 1, last_message = now,
    /// error state cleared. Refuses permanently failed rows.
    async fn record_send_success(&self, group_id: i64, now: DateTime<Utc>) -> Result<()>;

    /// Record a transient send failure: error_count += 1, last_error set,
    /// dispatch suppressed until `retry_after`. Refuses permanently failed
    /// rows.
    async fn record_transient_failure(
        &self,
        group_id: i64,
        reason: &str,
        retry_after: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Record a permanent send failure: permanent_error = true,
    /// is_active = false. Terminal; the group is never selected again.
    async fn record_permanent_failure(&self, group_id: i64, reason: &str, now: DateTime<Utc>) -> Result<()>;

    /// Operator-facing reset: reactivate a group and clear its transient
    /// error state. Refuses permanently failed rows.
    async fn reactivate_group(&self, group_id: i64, now: DateTime<Utc>) -> Result<()>;

    /// Fetch one group by id.
    async fn find_group(&self, group_id: i64) -> Result<Option<Group>>;

    /// List groups with pagination, most recently discovered first.
    async fn list_groups(&self, limit: i64, offset: i64) -> Result<Vec<Group>>;

    /// Recompute fleet-wide aggregates from current rows.
    async fn aggregate_stats(&self, now: DateTime<Utc>) -> Result<FleetStats>;

    /// Append a stats snapshot to the history table.
    async fn save_stats_snapshot(&self, stats: &FleetStats) -> Result<()>;

    /// The most recently computed stats snapshot, if any.
    async fn latest_stats_snapshot(&self) -> Result<Option<FleetStats>>;
}
