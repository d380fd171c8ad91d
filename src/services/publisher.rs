//! Fleet stats publishing
//!
//! Pushes the latest stats snapshot to Redis so dashboards can read it
//! without touching the database. Publishing is best-effort; the database
//! snapshot written by the aggregator remains the durable record.

use redis::{AsyncCommands, Client};
use tracing::debug;

use crate::config::settings::RedisConfig;
use crate::models::stats::FleetStats;
use crate::utils::errors::{GroupHeraldError, Result};

/// Key under the configured prefix where the latest snapshot lives.
const FLEET_STATS_KEY: &str = "stats:fleet";

#[derive(Debug, Clone)]
pub struct StatsPublisher {
    client: Client,
    prefix: String,
    ttl_seconds: u64,
}

impl StatsPublisher {
    /// Create a new StatsPublisher instance
    pub fn new(settings: &RedisConfig) -> Result<Self> {
        let client = Client::open(settings.url.as_str())
            .map_err(|e| GroupHeraldError::Redis(e))?;

        Ok(Self {
            client,
            prefix: settings.prefix.clone(),
            ttl_seconds: settings.ttl_seconds,
        })
    }

    /// Publish a stats snapshot as JSON with the configured TTL
    pub async fn publish(&self, stats: &FleetStats) -> Result<()> {
        let mut conn = self.client.get_async_connection().await
            .map_err(|e| GroupHeraldError::Redis(e))?;

        let serialized = serde_json::to_string(stats)
            .map_err(|e| GroupHeraldError::Serialization(e))?;
        let full_key = format!("{}{}", self.prefix, FLEET_STATS_KEY);

        let _: () = conn.set_ex(&full_key, serialized, self.ttl_seconds).await
            .map_err(|e| GroupHeraldError::Redis(e))?;

        debug!(key = %full_key, ttl = self.ttl_seconds, "Fleet stats published");
        Ok(())
    }
}
