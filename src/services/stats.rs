//! Stats aggregation service
//!
//! Recomputes fleet-wide aggregates from committed group rows, appends a
//! snapshot to the history table and, when Redis is configured, publishes
//! the snapshot for dashboards. Never talks to the messaging client, so it
//! is safe to run alongside discovery and dispatch.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::database::store::GroupStore;
use crate::models::report::StatsReport;
use crate::services::publisher::StatsPublisher;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn GroupStore>,
    publisher: Option<StatsPublisher>,
}

impl StatsAggregator {
    /// Create a new StatsAggregator instance
    pub fn new(store: Arc<dyn GroupStore>, publisher: Option<StatsPublisher>) -> Self {
        Self { store, publisher }
    }

    /// Run one aggregation pass.
    ///
    /// The database snapshot is the durable record; Redis publishing is
    /// best-effort and a publish failure only costs dashboard freshness.
    pub async fn run(&self) -> Result<StatsReport> {
        let now = Utc::now();
        let stats = self.store.aggregate_stats(now).await?;
        self.store.save_stats_snapshot(&stats).await?;

        let published = match &self.publisher {
            Some(publisher) => match publisher.publish(&stats).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Failed to publish fleet stats to Redis");
                    false
                }
            },
            None => false,
        };

        info!(
            total_groups = stats.total_groups,
            active_groups = stats.active_groups,
            target_groups = stats.target_groups,
            permanent_error_groups = stats.permanent_error_groups,
            total_messages = stats.total_messages,
            mean_error_rate = stats.mean_error_rate,
            published = published,
            "Fleet stats recomputed"
        );
        Ok(StatsReport {
            stats,
            snapshot_saved: true,
            published,
        })
    }
}
