//! Group repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use chrono::{DateTime, Utc};

use crate::database::store::GroupStore;
use crate::models::group::{Group, Membership};
use crate::models::stats::FleetStats;
use crate::utils::errors::{GroupHeraldError, Result};

const GROUP_COLUMNS: &str = "group_id, name, join_date, last_message, message_count, member_count, \
     error_count, last_error, is_active, permanent_error, is_target, retry_after, \
     created_at, updated_at";

#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupStore for GroupRepository {
    async fn upsert_membership(&self, membership: &Membership, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO groups (group_id, name, join_date, member_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $3, $3)
            ON CONFLICT (group_id) DO UPDATE
            SET name = EXCLUDED.name,
                member_count = EXCLUDED.member_count,
                is_active = NOT groups.permanent_error,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(membership.group_id)
        .bind(&membership.name)
        .bind(now)
        .bind(membership.member_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn deactivate_absent(&self, present_ids: &[i64], now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET is_active = FALSE,
                updated_at = $2
            WHERE is_active = TRUE AND NOT (group_id = ANY($1))
            "#,
        )
        .bind(present_ids)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_active_group_ids(&self) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT group_id FROM groups WHERE is_active = TRUE ORDER BY group_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn query_eligible_targets(&self, now: DateTime<Utc>) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            r#"
            SELECT {GROUP_COLUMNS}
            FROM groups
            WHERE is_target = TRUE
              AND is_active = TRUE
              AND permanent_error = FALSE
              AND (retry_after IS NULL OR retry_after <= $1)
            ORDER BY last_message ASC NULLS FIRST, group_id ASC
            "#,
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn record_send_success(&self, group_id: i64, now: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET message_count = message_count + 1,
                last_message = $2,
                error_count = 0,
                last_error = NULL,
                retry_after = NULL,
                updated_at = $2
            WHERE group_id = $1 AND permanent_error = FALSE
            "#,
        )
        .bind(group_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GroupHeraldError::GroupNotFound { group_id });
        }
        Ok(())
    }

    async fn record_transient_failure(
        &self,
        group_id: i64,
        reason: &str,
        retry_after: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET error_count = error_count + 1,
                last_error = $2,
                retry_after = $3,
                updated_at = $4
            WHERE group_id = $1 AND permanent_error = FALSE
            "#,
        )
        .bind(group_id)
        .bind(reason)
        .bind(retry_after)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GroupHeraldError::GroupNotFound { group_id });
        }
        Ok(())
    }

    async fn record_permanent_failure(&self, group_id: i64, reason: &str, now: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET permanent_error = TRUE,
                is_active = FALSE,
                last_error = $2,
                updated_at = $3
            WHERE group_id = $1
            "#,
        )
        .bind(group_id)
        .bind(reason)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GroupHeraldError::GroupNotFound { group_id });
        }
        Ok(())
    }

    async fn reactivate_group(&self, group_id: i64, now: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET is_active = TRUE,
                error_count = 0,
                last_error = NULL,
                retry_after = NULL,
                updated_at = $2
            WHERE group_id = $1 AND permanent_error = FALSE
            "#,
        )
        .bind(group_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GroupHeraldError::GroupNotFound { group_id });
        }
        Ok(())
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE group_id = $1",
        ))
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn list_groups(&self, limit: i64, offset: i64) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups ORDER BY created_at DESC, group_id LIMIT $1 OFFSET $2",
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn aggregate_stats(&self, now: DateTime<Utc>) -> Result<FleetStats> {
        let row: (i64, i64, i64, i64, i64, f64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE is_active),
                COUNT(*) FILTER (WHERE is_target),
                COUNT(*) FILTER (WHERE permanent_error),
                COALESCE(SUM(message_count), 0)::BIGINT,
                COALESCE(AVG(
                    CASE WHEN message_count + error_count > 0
                         THEN error_count::DOUBLE PRECISION / (message_count + error_count)
                    END
                ), 0.0)
            FROM groups
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(FleetStats {
            total_groups: row.0,
            active_groups: row.1,
            target_groups: row.2,
            permanent_error_groups: row.3,
            total_messages: row.4,
            mean_error_rate: row.5,
            computed_at: now,
        })
    }

    async fn save_stats_snapshot(&self, stats: &FleetStats) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fleet_stats
                (total_groups, active_groups, target_groups, permanent_error_groups,
                 total_messages, mean_error_rate, computed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(stats.total_groups)
        .bind(stats.active_groups)
        .bind(stats.target_groups)
        .bind(stats.permanent_error_groups)
        .bind(stats.total_messages)
        .bind(stats.mean_error_rate)
        .bind(stats.computed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest_stats_snapshot(&self) -> Result<Option<FleetStats>> {
        let stats = sqlx::query_as::<_, FleetStats>(
            r#"
            SELECT total_groups, active_groups, target_groups, permanent_error_groups,
                   total_messages, mean_error_rate, computed_at
            FROM fleet_stats
            ORDER BY computed_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats)
    }
}
