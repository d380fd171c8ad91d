//! Group discovery service
//!
//! Reconciles the group store against the account's live memberships: every
//! observed group is upserted, every previously active group that vanished
//! is soft-disabled. Counters, error fields and is_target are never touched
//! here, so discovery can run at any cadence without disturbing dispatch
//! state.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::database::store::GroupStore;
use crate::models::report::DiscoveryReport;
use crate::telegram::MessagingClient;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct GroupDiscovery {
    store: Arc<dyn GroupStore>,
    client: Arc<dyn MessagingClient>,
}

impl GroupDiscovery {
    /// Create a new GroupDiscovery instance
    pub fn new(store: Arc<dyn GroupStore>, client: Arc<dyn MessagingClient>) -> Self {
        Self { store, client }
    }

    /// Run one discovery pass.
    ///
    /// The membership list is fetched exactly once; a client failure aborts
    /// the run before any write. Writes are per-row upserts followed by a
    /// single deactivation sweep, so running twice on unchanged membership
    /// changes nothing.
    pub async fn run(&self) -> Result<DiscoveryReport> {
        let memberships = self.client.list_memberships().await?;
        let now = Utc::now();

        if memberships.is_empty() {
            warn!("Membership listing returned no groups; all active groups will be deactivated");
        }

        let known_active: HashSet<i64> = self
            .store
            .list_active_group_ids()
            .await?
            .into_iter()
            .collect();

        let mut new_groups = 0usize;
        let mut refreshed = 0usize;
        for membership in &memberships {
            self.store.upsert_membership(membership, now).await?;
            if known_active.contains(&membership.group_id) {
                refreshed += 1;
            } else {
                new_groups += 1;
            }
        }

        let present_ids: Vec<i64> = memberships.iter().map(|m| m.group_id).collect();
        let deactivated = self.store.deactivate_absent(&present_ids, now).await?;

        let report = DiscoveryReport {
            observed: memberships.len(),
            new_groups,
            refreshed,
            deactivated,
        };
        info!(
            observed = report.observed,
            new_groups = report.new_groups,
            refreshed = report.refreshed,
            deactivated = report.deactivated,
            "Discovery run completed"
        );
        Ok(report)
    }
}
