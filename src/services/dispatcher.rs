//! Message dispatcher service
//!
//! Selects the groups eligible for outreach, sends one templated message to
//! each with a pacing delay between sends, and converts every send outcome
//! into a per-group state transition. Send failures never fail the run;
//! store failures do.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::seq::SliceRandom;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::settings::DispatchConfig;
use crate::database::store::GroupStore;
use crate::models::group::Group;
use crate::models::report::DispatchReport;
use crate::telegram::{MessagingClient, SendError};
use crate::utils::errors::{GroupHeraldError, Result};

/// Capped-doubling retry backoff.
///
/// backoff(k) = min(base * 2^(k-1), max) for the k-th consecutive transient
/// failure, so repeated failures widen the suppression window without
/// unbounded growth. Monotonically non-decreasing in k.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    base: Duration,
    max: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Suppression window after the k-th consecutive transient failure.
    pub fn backoff(&self, error_count: i32) -> Duration {
        let k = error_count.max(1) as u32;
        // Shifts of 32+ and multiplication overflow both saturate to the cap.
        match 1u32.checked_shl(k - 1) {
            Some(factor) => self
                .base
                .checked_mul(factor)
                .map_or(self.max, |d| d.min(self.max)),
            None => self.max,
        }
    }
}

#[derive(Clone)]
pub struct MessageDispatcher {
    store: Arc<dyn GroupStore>,
    client: Arc<dyn MessagingClient>,
    pacing: Duration,
    backoff: BackoffPolicy,
    messages: Vec<String>,
    shutdown: watch::Receiver<bool>,
}

impl MessageDispatcher {
    /// Create a new MessageDispatcher instance
    pub fn new(
        store: Arc<dyn GroupStore>,
        client: Arc<dyn MessagingClient>,
        settings: &DispatchConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            client,
            pacing: Duration::from_secs(settings.pacing_seconds),
            backoff: BackoffPolicy::new(
                Duration::from_secs(settings.backoff_base_seconds),
                Duration::from_secs(settings.backoff_max_seconds),
            ),
            messages: settings.messages.clone(),
            shutdown,
        }
    }

    /// Run one dispatch pass.
    ///
    /// Eligibility is snapshotted once at run start and processed strictly
    /// sequentially; groups becoming eligible mid-run wait for the next run.
    /// A shutdown request stops the run between groups and marks the report
    /// interrupted; everything already persisted stays valid.
    pub async fn run(&self) -> Result<DispatchReport> {
        let now = Utc::now();
        let targets = self.store.query_eligible_targets(now).await?;

        let mut report = DispatchReport {
            eligible: targets.len(),
            sent: 0,
            transient_failures: 0,
            permanent_failures: 0,
            interrupted: false,
        };

        let mut shutdown = self.shutdown.clone();
        for (index, group) in targets.iter().enumerate() {
            if index > 0 && !self.pace(&mut shutdown).await {
                report.interrupted = true;
                break;
            }
            if *shutdown.borrow() {
                report.interrupted = true;
                break;
            }
            self.dispatch_one(group, &mut report).await?;
        }

        info!(
            eligible = report.eligible,
            sent = report.sent,
            transient_failures = report.transient_failures,
            permanent_failures = report.permanent_failures,
            interrupted = report.interrupted,
            "Dispatch run completed"
        );
        Ok(report)
    }

    /// Wait out the pacing delay. Returns false when shutdown was requested
    /// (or the shutdown channel is gone) before the delay elapsed.
    async fn pace(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.pacing) => true,
            _ = shutdown.wait_for(|stop| *stop) => false,
        }
    }

    async fn dispatch_one(&self, group: &Group, report: &mut DispatchReport) -> Result<()> {
        let text = self.pick_template()?;

        match self.client.send_message(group.group_id, &text).await {
            Ok(()) => {
                self.store.record_send_success(group.group_id, Utc::now()).await?;
                report.sent += 1;
                debug!(group_id = group.group_id, "Message sent");
            }
            Err(SendError::Transient(reason)) => {
                // The dispatcher is the only error_count writer and runs
                // single-flight, so the snapshot plus one is the count the
                // store-side increment will land on.
                let attempts = group.error_count.saturating_add(1);
                let delay = self.backoff.backoff(attempts);
                let now = Utc::now();
                let retry_after = now + chrono_delay(delay);
                self.store
                    .record_transient_failure(group.group_id, &reason, retry_after, now)
                    .await?;
                report.transient_failures += 1;
                warn!(
                    group_id = group.group_id,
                    attempts = attempts,
                    retry_in_secs = delay.as_secs(),
                    reason = %reason,
                    "Transient send failure, dispatch suppressed"
                );
            }
            Err(SendError::Permanent(reason)) => {
                self.store
                    .record_permanent_failure(group.group_id, &reason, Utc::now())
                    .await?;
                report.permanent_failures += 1;
                error!(
                    group_id = group.group_id,
                    reason = %reason,
                    "Group disabled after permanent send failure"
                );
            }
        }
        Ok(())
    }

    fn pick_template(&self) -> Result<String> {
        self.messages
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| {
                GroupHeraldError::InvalidInput("no message templates configured".to_string())
            })
    }
}

/// Whole-second std-to-chrono conversion, clamped so it cannot overflow.
fn chrono_delay(delay: Duration) -> chrono::Duration {
    chrono::Duration::seconds(delay.as_secs().min(i32::MAX as u64) as i64)
}
