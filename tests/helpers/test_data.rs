//! Test data builders

use chrono::{DateTime, Utc};

use GroupHerald::config::{DispatchConfig, SchedulerConfig};
use GroupHerald::models::{Group, Membership};

/// A healthy eligible target with all counters at zero.
pub fn group(group_id: i64, now: DateTime<Utc>) -> Group {
    Group {
        group_id,
        name: format!("Group {group_id}"),
        join_date: now,
        last_message: None,
        message_count: 0,
        member_count: 25,
        error_count: 0,
        last_error: None,
        is_active: true,
        permanent_error: false,
        is_target: true,
        retry_after: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn membership(group_id: i64, name: &str, member_count: i32) -> Membership {
    Membership {
        group_id,
        name: name.to_string(),
        member_count,
    }
}

/// Dispatch settings with pacing disabled so runs finish instantly.
pub fn dispatch_config() -> DispatchConfig {
    DispatchConfig {
        pacing_seconds: 0,
        backoff_base_seconds: 300,
        backoff_max_seconds: 28_800,
        messages: vec!["Hello from the fleet".to_string()],
    }
}

/// Long cadences so scheduled tickers fire exactly once, at startup.
pub fn scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        discovery_interval_secs: 3_600,
        dispatch_interval_secs: 3_600,
        stats_interval_secs: 3_600,
        max_concurrent_jobs: 3,
    }
}
