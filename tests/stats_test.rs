//! Integration tests for the stats aggregation job

mod helpers;

use std::sync::Arc;

use chrono::Utc;

use helpers::{group, MemoryGroupStore};
use GroupHerald::database::GroupStore;
use GroupHerald::models::FleetStats;
use GroupHerald::services::StatsAggregator;

#[tokio::test]
async fn test_empty_fleet_aggregates_to_zero() {
    let store = Arc::new(MemoryGroupStore::new());
    let aggregator = StatsAggregator::new(Arc::clone(&store) as Arc<dyn GroupStore>, None);

    let report = aggregator.run().await.unwrap();

    assert_eq!(report.stats, FleetStats::empty(report.stats.computed_at));
    assert!(report.snapshot_saved);
    assert!(!report.published);
}

#[tokio::test]
async fn test_aggregates_reflect_current_rows() {
    let now = Utc::now();
    let store = Arc::new(MemoryGroupStore::new());

    let mut healthy = group(-1, now);
    healthy.message_count = 8;
    healthy.error_count = 2; // 2 / 10 = 0.2
    store.seed(healthy);

    let mut failing = group(-2, now);
    failing.message_count = 0;
    failing.error_count = 1; // 1 / 1 = 1.0
    store.seed(failing);

    let mut dead = group(-3, now);
    dead.permanent_error = true;
    dead.is_active = false;
    dead.is_target = false;
    dead.message_count = 5;
    store.seed(dead);

    store.seed(group(-4, now)); // no outcomes yet, excluded from the mean

    let aggregator = StatsAggregator::new(Arc::clone(&store) as Arc<dyn GroupStore>, None);
    let report = aggregator.run().await.unwrap();
    let stats = &report.stats;

    assert_eq!(stats.total_groups, 4);
    assert_eq!(stats.active_groups, 3);
    assert_eq!(stats.target_groups, 3);
    assert_eq!(stats.permanent_error_groups, 1);
    assert_eq!(stats.total_messages, 13);
    // Mean over -1 (0.2), -2 (1.0) and -3 (0.0).
    assert!((stats.mean_error_rate - 0.4).abs() < 1e-9);
}

#[tokio::test]
async fn test_each_run_appends_a_snapshot() {
    let store = Arc::new(MemoryGroupStore::new());
    store.seed(group(-1, Utc::now()));
    let aggregator = StatsAggregator::new(Arc::clone(&store) as Arc<dyn GroupStore>, None);

    aggregator.run().await.unwrap();
    aggregator.run().await.unwrap();

    assert_eq!(store.snapshot_count(), 2);
    let latest = store.latest_stats_snapshot().await.unwrap().unwrap();
    assert_eq!(latest.total_groups, 1);
}
