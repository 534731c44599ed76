//! Database operations for `trend_snapshots` and `trend_snapshot_entries`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use trendwatch_engine::TrendSnapshot;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `trend_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: i64,
    pub captured_at: DateTime<Utc>,
    pub entry_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A row from the `trend_snapshot_entries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotEntryRow {
    pub id: i64,
    pub snapshot_id: i64,
    pub rank: i32,
    pub canonical_keyword: String,
    pub score: f64,
    pub total_mentions: i64,
    pub daily_mentions: i64,
    pub unique_source_count: i32,
    pub growth_rate: f64,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a snapshot and its ranked entries in one transaction.
///
/// Returns the generated snapshot id. Entries land with the parent id, so a
/// failed insert rolls the whole snapshot back rather than leaving a header
/// without rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn insert_snapshot(pool: &PgPool, snapshot: &TrendSnapshot) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let entry_count = i32::try_from(snapshot.entries.len()).unwrap_or(i32::MAX);
    let snapshot_id: i64 = sqlx::query_scalar(
        "INSERT INTO trend_snapshots (captured_at, entry_count) \
         VALUES ($1, $2) \
         RETURNING id",
    )
    .bind(snapshot.captured_at)
    .bind(entry_count)
    .fetch_one(&mut *tx)
    .await?;

    for entry in &snapshot.entries {
        sqlx::query(
            "INSERT INTO trend_snapshot_entries \
                 (snapshot_id, rank, canonical_keyword, score, total_mentions, \
                  daily_mentions, unique_source_count, growth_rate, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(snapshot_id)
        .bind(i32::try_from(entry.rank).unwrap_or(i32::MAX))
        .bind(&entry.canonical_keyword)
        .bind(entry.score)
        .bind(i64::try_from(entry.total_mentions).unwrap_or(i64::MAX))
        .bind(i64::try_from(entry.daily_mentions).unwrap_or(i64::MAX))
        .bind(i32::try_from(entry.unique_source_count).unwrap_or(i32::MAX))
        .bind(entry.growth_rate)
        .bind(entry.status.as_str())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(snapshot_id)
}

/// Returns the most recent `limit` snapshot headers, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_snapshots(pool: &PgPool, limit: i64) -> Result<Vec<SnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, SnapshotRow>(
        "SELECT id, captured_at, entry_count, created_at \
         FROM trend_snapshots \
         ORDER BY captured_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the newest snapshot header, or `None` if no cycle has run yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_snapshot(pool: &PgPool) -> Result<Option<SnapshotRow>, DbError> {
    let row = sqlx::query_as::<_, SnapshotRow>(
        "SELECT id, captured_at, entry_count, created_at \
         FROM trend_snapshots \
         ORDER BY captured_at DESC, id DESC \
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all entries for a snapshot in rank order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_snapshot_entries(
    pool: &PgPool,
    snapshot_id: i64,
) -> Result<Vec<SnapshotEntryRow>, DbError> {
    let rows = sqlx::query_as::<_, SnapshotEntryRow>(
        "SELECT id, snapshot_id, rank, canonical_keyword, score, total_mentions, \
                daily_mentions, unique_source_count, growth_rate, status \
         FROM trend_snapshot_entries \
         WHERE snapshot_id = $1 \
         ORDER BY rank ASC",
    )
    .bind(snapshot_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
