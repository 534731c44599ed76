//! Database operations for the `vip_observations` table.
//!
//! The latest `observed_at` per entity doubles as the poll clock: VIP
//! cadence is decided by comparing it against the tier interval, so the
//! insert and the [`latest_observation_times`] query must agree on it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use trendwatch_engine::VipObservation;

use crate::DbError;

/// A row from the `vip_observations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VipObservationRow {
    pub id: i64,
    pub entity_id: String,
    pub name: String,
    pub tier: i16,
    pub total_mentions: i64,
    /// JSONB array of source names.
    pub sources: Value,
    /// JSONB array of sample content items.
    pub sample_content: Value,
    pub observed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insert one VIP observation and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, or [`DbError::Json`] if
/// the source set or samples cannot be serialized.
pub async fn insert_vip_observation(
    pool: &PgPool,
    observation: &VipObservation,
) -> Result<i64, DbError> {
    let sources = serde_json::to_value(&observation.sources)?;
    let samples = serde_json::to_value(&observation.sample_content)?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO vip_observations \
             (entity_id, name, tier, total_mentions, sources, sample_content, observed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(&observation.entity_id)
    .bind(&observation.name)
    .bind(i16::from(observation.tier))
    .bind(i64::try_from(observation.total_mentions).unwrap_or(i64::MAX))
    .bind(sources)
    .bind(samples)
    .bind(observation.observed_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// The most recent `observed_at` per entity, for cadence decisions.
/// Entities never observed are simply absent from the map.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_observation_times(
    pool: &PgPool,
) -> Result<HashMap<String, DateTime<Utc>>, DbError> {
    let rows = sqlx::query_as::<_, (String, DateTime<Utc>)>(
        "SELECT entity_id, MAX(observed_at) \
         FROM vip_observations \
         GROUP BY entity_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// List recent observations, optionally filtered by entity, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_vip_observations(
    pool: &PgPool,
    entity_id: Option<&str>,
    limit: i64,
) -> Result<Vec<VipObservationRow>, DbError> {
    let rows = match entity_id {
        Some(entity_id) => {
            sqlx::query_as::<_, VipObservationRow>(
                "SELECT id, entity_id, name, tier, total_mentions, sources, \
                        sample_content, observed_at, created_at \
                 FROM vip_observations \
                 WHERE entity_id = $1 \
                 ORDER BY observed_at DESC, id DESC \
                 LIMIT $2",
            )
            .bind(entity_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, VipObservationRow>(
                "SELECT id, entity_id, name, tier, total_mentions, sources, \
                        sample_content, observed_at, created_at \
                 FROM vip_observations \
                 ORDER BY observed_at DESC, id DESC \
                 LIMIT $1",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}
