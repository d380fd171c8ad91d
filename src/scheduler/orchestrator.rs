//! Periodic job orchestration
//!
//! One ticker task per job kind fires on its own cadence and dispatches the
//! job under its single-flight guard and a fleet-wide concurrency bound.
//! Results travel over a channel to a monitor task that logs them and keeps
//! the last report per kind. No job blocks another kind's timer, and no job
//! failure is fatal to the process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{mpsc, watch, Mutex, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::settings::SchedulerConfig;
use crate::scheduler::jobs::{JobKind, JobOutcome, JobReport, JobSet};

const REPORT_CHANNEL_CAPACITY: usize = 32;

pub struct Orchestrator {
    jobs: Arc<JobSet>,
    settings: SchedulerConfig,
    semaphore: Arc<Semaphore>,
    shutdown_tx: watch::Sender<bool>,
    report_tx: Option<mpsc::Sender<JobReport>>,
    report_rx: Option<mpsc::Receiver<JobReport>>,
    last_reports: Arc<Mutex<HashMap<JobKind, JobReport>>>,
    handles: Vec<JoinHandle<()>>,
}

impl Orchestrator {
    /// Create a new Orchestrator instance.
    ///
    /// `shutdown_tx` is the write side of the shutdown signal the dispatcher
    /// and all ticker tasks listen on.
    pub fn new(jobs: Arc<JobSet>, settings: SchedulerConfig, shutdown_tx: watch::Sender<bool>) -> Self {
        let (report_tx, report_rx) = mpsc::channel(REPORT_CHANNEL_CAPACITY);
        Self {
            jobs,
            semaphore: Arc::new(Semaphore::new(settings.max_concurrent_jobs)),
            settings,
            shutdown_tx,
            report_tx: Some(report_tx),
            report_rx: Some(report_rx),
            last_reports: Arc::new(Mutex::new(HashMap::new())),
            handles: Vec::new(),
        }
    }

    /// Spawn the monitor task and one ticker task per job kind.
    ///
    /// Every ticker fires immediately on startup, then on its configured
    /// period; a tick that lands while the previous run of the same kind is
    /// still executing is skipped by the job guard.
    pub fn start(&mut self) {
        let Some(report_rx) = self.report_rx.take() else {
            warn!("Orchestrator already started");
            return;
        };

        let monitor = self.spawn_monitor(report_rx);
        self.handles.push(monitor);
        for kind in JobKind::ALL {
            let ticker = self.spawn_ticker(kind);
            self.handles.push(ticker);
        }

        info!(
            discovery_interval_secs = self.settings.discovery_interval_secs,
            dispatch_interval_secs = self.settings.dispatch_interval_secs,
            stats_interval_secs = self.settings.stats_interval_secs,
            max_concurrent_jobs = self.settings.max_concurrent_jobs,
            "Orchestrator started"
        );
    }

    /// Trigger one discovery run outside the schedule.
    pub async fn run_discovery(&self) -> JobReport {
        self.trigger(JobKind::Discovery).await
    }

    /// Trigger one dispatch run outside the schedule.
    pub async fn run_dispatch(&self) -> JobReport {
        self.trigger(JobKind::Dispatch).await
    }

    /// Trigger one stats run outside the schedule.
    pub async fn run_stats_update(&self) -> JobReport {
        self.trigger(JobKind::Stats).await
    }

    /// The most recent report per job kind.
    pub async fn last_reports(&self) -> HashMap<JobKind, JobReport> {
        self.last_reports.lock().await.clone()
    }

    /// Request shutdown and wait for every task to finish.
    ///
    /// A dispatch run in flight stops between groups; everything already
    /// persisted stays valid.
    pub async fn shutdown(&mut self) {
        info!("Orchestrator shutting down");
        let _ = self.shutdown_tx.send(true);
        // Dropping the result sender lets the monitor drain and exit.
        self.report_tx = None;
        join_all(self.handles.drain(..)).await;
        info!("Orchestrator stopped");
    }

    async fn trigger(&self, kind: JobKind) -> JobReport {
        let report = run_guarded(&self.jobs, &self.semaphore, kind).await;
        if let Some(report_tx) = &self.report_tx {
            let _ = report_tx.send(report.clone()).await;
        }
        report
    }

    fn spawn_ticker(&self, kind: JobKind) -> JoinHandle<()> {
        let jobs = Arc::clone(&self.jobs);
        let semaphore = Arc::clone(&self.semaphore);
        let report_tx = match &self.report_tx {
            Some(report_tx) => report_tx.clone(),
            None => return tokio::spawn(async {}),
        };
        let mut shutdown = self.shutdown_tx.subscribe();
        let period = self.period(kind);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = run_guarded(&jobs, &semaphore, kind).await;
                        if report_tx.send(report).await.is_err() {
                            break;
                        }
                    }
                    // The watch::Ref returned by wait_for is not Send; drop it
                    // inside the branch so the select output stays Send.
                    _ = async { let _ = shutdown.wait_for(|stop| *stop).await; } => {
                        debug!(kind = %kind, "Ticker stopped");
                        break;
                    }
                }
            }
        })
    }

    fn spawn_monitor(&self, mut report_rx: mpsc::Receiver<JobReport>) -> JoinHandle<()> {
        let last_reports = Arc::clone(&self.last_reports);
        tokio::spawn(async move {
            while let Some(report) = report_rx.recv().await {
                match &report.outcome {
                    JobOutcome::Completed(_) => {
                        info!(
                            kind = %report.kind,
                            run_id = %report.run_id,
                            duration_ms = report.duration_ms,
                            "Job completed"
                        );
                    }
                    JobOutcome::Skipped => {
                        debug!(kind = %report.kind, run_id = %report.run_id, "Job skipped");
                    }
                    JobOutcome::Failed(message) => {
                        warn!(
                            kind = %report.kind,
                            run_id = %report.run_id,
                            duration_ms = report.duration_ms,
                            message = %message,
                            "Job failed"
                        );
                    }
                }
                last_reports.lock().await.insert(report.kind, report);
            }
        })
    }

    fn period(&self, kind: JobKind) -> Duration {
        let secs = match kind {
            JobKind::Discovery => self.settings.discovery_interval_secs,
            JobKind::Dispatch => self.settings.dispatch_interval_secs,
            JobKind::Stats => self.settings.stats_interval_secs,
        };
        Duration::from_secs(secs)
    }
}

async fn run_guarded(jobs: &Arc<JobSet>, semaphore: &Arc<Semaphore>, kind: JobKind) -> JobReport {
    match semaphore.acquire().await {
        Ok(_permit) => jobs.execute(kind).await,
        // The semaphore is never closed while tasks run; a closed one means
        // teardown is already underway.
        Err(_) => JobReport::skipped(kind),
    }
}
