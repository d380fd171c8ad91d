//! Job definitions and single-flight execution
//!
//! Each job kind carries its own guard: an invocation that finds the guard
//! taken reports Skipped and is dropped, never queued. Job errors become
//! Failed reports and stay isolated to that run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, warn};
use uuid::Uuid;

use crate::models::report::RunSummary;
use crate::services::{GroupDiscovery, MessageDispatcher, StatsAggregator};
use crate::utils::errors::Result;

/// The three periodic job types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    Discovery,
    Dispatch,
    Stats,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Discovery, JobKind::Dispatch, JobKind::Stats];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Discovery => "discovery",
            JobKind::Dispatch => "dispatch",
            JobKind::Stats => "stats",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one execution attempt ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JobOutcome {
    Completed(RunSummary),
    /// The same kind was already running; the attempt was dropped, not queued.
    Skipped,
    Failed(String),
}

/// Record of one execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub kind: JobKind,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: JobOutcome,
}

impl JobReport {
    pub fn skipped(kind: JobKind) -> Self {
        Self {
            kind,
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            duration_ms: 0,
            outcome: JobOutcome::Skipped,
        }
    }
}

/// The jobs plus their single-flight guards.
pub struct JobSet {
    discovery: GroupDiscovery,
    dispatcher: MessageDispatcher,
    aggregator: StatsAggregator,
    discovery_guard: Mutex<()>,
    dispatch_guard: Mutex<()>,
    stats_guard: Mutex<()>,
}

impl JobSet {
    /// Create a new JobSet instance
    pub fn new(
        discovery: GroupDiscovery,
        dispatcher: MessageDispatcher,
        aggregator: StatsAggregator,
    ) -> Self {
        Self {
            discovery,
            dispatcher,
            aggregator,
            discovery_guard: Mutex::new(()),
            dispatch_guard: Mutex::new(()),
            stats_guard: Mutex::new(()),
        }
    }

    /// Execute one job under its single-flight guard.
    ///
    /// Never panics and never exits the process: a busy guard yields a
    /// Skipped report, a job error a Failed one.
    pub async fn execute(&self, kind: JobKind) -> JobReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = std::time::Instant::now();

        let _guard = match self.guard(kind).try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!(kind = %kind, run_id = %run_id, "Job already running, skipping this invocation");
                return JobReport {
                    kind,
                    run_id,
                    started_at,
                    duration_ms: 0,
                    outcome: JobOutcome::Skipped,
                };
            }
        };

        let outcome = match self.run_job(kind).await {
            Ok(summary) => JobOutcome::Completed(summary),
            Err(e) => {
                if e.is_recoverable() {
                    warn!(kind = %kind, run_id = %run_id, error = %e, "Job run failed, will retry on next tick");
                } else {
                    error!(kind = %kind, run_id = %run_id, severity = %e.severity(), error = %e, "Job run failed");
                }
                JobOutcome::Failed(e.to_string())
            }
        };

        JobReport {
            kind,
            run_id,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            outcome,
        }
    }

    fn guard(&self, kind: JobKind) -> &Mutex<()> {
        match kind {
            JobKind::Discovery => &self.discovery_guard,
            JobKind::Dispatch => &self.dispatch_guard,
            JobKind::Stats => &self.stats_guard,
        }
    }

    async fn run_job(&self, kind: JobKind) -> Result<RunSummary> {
        match kind {
            JobKind::Discovery => Ok(RunSummary::Discovery(self.discovery.run().await?)),
            JobKind::Dispatch => Ok(RunSummary::Dispatch(self.dispatcher.run().await?)),
            JobKind::Stats => Ok(RunSummary::Stats(self.aggregator.run().await?)),
        }
    }
}
