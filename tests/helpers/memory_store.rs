//! In-memory group store
//!
//! Mirrors the row semantics of the PostgreSQL repository: atomic per-group
//! updates, store-side increments, NOT-permanent_error guards on the outcome
//! writers, and the same eligibility ordering. Kept deliberately boring so a
//! divergence from the real repository reads as a bug here.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use GroupHerald::database::GroupStore;
use GroupHerald::models::{FleetStats, Group, Membership};
use GroupHerald::utils::errors::{GroupHeraldError, Result};

#[derive(Default)]
pub struct MemoryGroupStore {
    groups: Mutex<HashMap<i64, Group>>,
    snapshots: Mutex<Vec<FleetStats>>,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully specified row, bypassing the contract. Test setup only.
    pub fn seed(&self, group: Group) {
        self.groups.lock().unwrap().insert(group.group_id, group);
    }

    /// Copy of one row for assertions; panics when the row is missing.
    pub fn get(&self, group_id: i64) -> Group {
        self.groups
            .lock()
            .unwrap()
            .get(&group_id)
            .cloned()
            .unwrap_or_else(|| panic!("no group {group_id} in store"))
    }

    /// All rows, ordered by group_id, for whole-store diff assertions.
    pub fn dump(&self) -> Vec<Group> {
        let mut rows: Vec<Group> = self.groups.lock().unwrap().values().cloned().collect();
        rows.sort_by_key(|g| g.group_id);
        rows
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn upsert_membership(&self, membership: &Membership, now: DateTime<Utc>) -> Result<()> {
        let mut groups = self.groups.lock().unwrap();
        match groups.get_mut(&membership.group_id) {
            Some(group) => {
                group.name = membership.name.clone();
                group.member_count = membership.member_count;
                group.is_active = !group.permanent_error;
                group.updated_at = now;
            }
            None => {
                groups.insert(
                    membership.group_id,
                    Group {
                        group_id: membership.group_id,
                        name: membership.name.clone(),
                        join_date: now,
                        last_message: None,
                        message_count: 0,
                        member_count: membership.member_count,
                        error_count: 0,
                        last_error: None,
                        is_active: true,
                        permanent_error: false,
                        is_target: true,
                        retry_after: None,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn deactivate_absent(&self, present_ids: &[i64], now: DateTime<Utc>) -> Result<u64> {
        let mut groups = self.groups.lock().unwrap();
        let mut deactivated = 0;
        for group in groups.values_mut() {
            if group.is_active && !present_ids.contains(&group.group_id) {
                group.is_active = false;
                group.updated_at = now;
                deactivated += 1;
            }
        }
        Ok(deactivated)
    }

    async fn list_active_group_ids(&self) -> Result<Vec<i64>> {
        let groups = self.groups.lock().unwrap();
        let mut ids: Vec<i64> = groups
            .values()
            .filter(|g| g.is_active)
            .map(|g| g.group_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn query_eligible_targets(&self, now: DateTime<Utc>) -> Result<Vec<Group>> {
        let groups = self.groups.lock().unwrap();
        let mut eligible: Vec<Group> = groups
            .values()
            .filter(|g| g.is_eligible(now))
            .cloned()
            .collect();
        // Matches the repository: least recently messaged first, never-messaged
        // groups lead (None sorts before Some), group_id as tiebreak.
        eligible.sort_by_key(|g| (g.last_message, g.group_id));
        Ok(eligible)
    }

    async fn record_send_success(&self, group_id: i64, now: DateTime<Utc>) -> Result<()> {
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .get_mut(&group_id)
            .filter(|g| !g.permanent_error)
            .ok_or(GroupHeraldError::GroupNotFound { group_id })?;
        group.message_count += 1;
        group.last_message = Some(now);
        group.error_count = 0;
        group.last_error = None;
        group.retry_after = None;
        group.updated_at = now;
        Ok(())
    }

    async fn record_transient_failure(
        &self,
        group_id: i64,
        reason: &str,
        retry_after: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .get_mut(&group_id)
            .filter(|g| !g.permanent_error)
            .ok_or(GroupHeraldError::GroupNotFound { group_id })?;
        group.error_count += 1;
        group.last_error = Some(reason.to_string());
        group.retry_after = Some(retry_after);
        group.updated_at = now;
        Ok(())
    }

    async fn record_permanent_failure(&self, group_id: i64, reason: &str, now: DateTime<Utc>) -> Result<()> {
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .get_mut(&group_id)
            .ok_or(GroupHeraldError::GroupNotFound { group_id })?;
        group.permanent_error = true;
        group.is_active = false;
        group.last_error = Some(reason.to_string());
        group.updated_at = now;
        Ok(())
    }

    async fn reactivate_group(&self, group_id: i64, now: DateTime<Utc>) -> Result<()> {
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .get_mut(&group_id)
            .filter(|g| !g.permanent_error)
            .ok_or(GroupHeraldError::GroupNotFound { group_id })?;
        group.is_active = true;
        group.error_count = 0;
        group.last_error = None;
        group.retry_after = None;
        group.updated_at = now;
        Ok(())
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        Ok(self.groups.lock().unwrap().get(&group_id).cloned())
    }

    async fn list_groups(&self, limit: i64, offset: i64) -> Result<Vec<Group>> {
        let groups = self.groups.lock().unwrap();
        let mut rows: Vec<Group> = groups.values().cloned().collect();
        rows.sort_by_key(|g| (std::cmp::Reverse(g.created_at), g.group_id));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn aggregate_stats(&self, now: DateTime<Utc>) -> Result<FleetStats> {
        let groups = self.groups.lock().unwrap();
        let rates: Vec<f64> = groups
            .values()
            .filter(|g| g.message_count + g.error_count as i64 > 0)
            .map(|g| g.error_count as f64 / (g.message_count + g.error_count as i64) as f64)
            .collect();
        let mean_error_rate = if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        };

        Ok(FleetStats {
            total_groups: groups.len() as i64,
            active_groups: groups.values().filter(|g| g.is_active).count() as i64,
            target_groups: groups.values().filter(|g| g.is_target).count() as i64,
            permanent_error_groups: groups.values().filter(|g| g.permanent_error).count() as i64,
            total_messages: groups.values().map(|g| g.message_count).sum(),
            mean_error_rate,
            computed_at: now,
        })
    }

    async fn save_stats_snapshot(&self, stats: &FleetStats) -> Result<()> {
        self.snapshots.lock().unwrap().push(stats.clone());
        Ok(())
    }

    async fn latest_stats_snapshot(&self) -> Result<Option<FleetStats>> {
        Ok(self.snapshots.lock().unwrap().last().cloned())
    }
}
