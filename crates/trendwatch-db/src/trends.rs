//! Database operations for the `tracked_trends` table.
//!
//! Rows cross the persistence boundary as [`TrackedTrendRow`] and are
//! converted to the domain [`TrackedTrend`] with validation: unknown status
//! strings, negative counts, and malformed JSON arrays surface as
//! [`DbError::CorruptRecord`] instead of leaking into the engine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use trendwatch_core::{TrackedTrend, TrendStatus};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `tracked_trends` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrackedTrendRow {
    pub id: i64,
    pub canonical_keyword: String,
    /// JSONB array of raw keyword spellings.
    pub original_variants: Value,
    pub total_mentions: i64,
    pub daily_mentions: i64,
    /// JSONB array of source names.
    pub sources: Value,
    pub avg_reliability: f64,
    pub score: f64,
    pub growth_rate: f64,
    pub peak_mentions: i64,
    pub days_without_growth: i32,
    pub first_seen: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TrackedTrendRow> for TrackedTrend {
    type Error = DbError;

    fn try_from(row: TrackedTrendRow) -> Result<Self, Self::Error> {
        let status = TrendStatus::parse(&row.status).ok_or_else(|| DbError::CorruptRecord {
            table: "tracked_trends",
            reason: format!("unknown status '{}' for '{}'", row.status, row.canonical_keyword),
        })?;

        Ok(TrackedTrend {
            original_variants: string_set(&row.original_variants, "original_variants")?,
            sources: string_set(&row.sources, "sources")?,
            total_mentions: count(row.total_mentions, "total_mentions")?,
            daily_mentions: count(row.daily_mentions, "daily_mentions")?,
            peak_mentions: count(row.peak_mentions, "peak_mentions")?,
            days_without_growth: u32::try_from(row.days_without_growth).map_err(|_| {
                DbError::CorruptRecord {
                    table: "tracked_trends",
                    reason: format!("negative days_without_growth {}", row.days_without_growth),
                }
            })?,
            canonical_keyword: row.canonical_keyword,
            avg_reliability: row.avg_reliability,
            score: row.score,
            growth_rate: row.growth_rate,
            first_seen: row.first_seen,
            last_update: row.last_update,
            status,
        })
    }
}

fn string_set(value: &Value, field: &'static str) -> Result<BTreeSet<String>, DbError> {
    serde_json::from_value(value.clone()).map_err(|_| DbError::CorruptRecord {
        table: "tracked_trends",
        reason: format!("{field} is not a JSON array of strings"),
    })
}

fn count(value: i64, field: &'static str) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|_| DbError::CorruptRecord {
        table: "tracked_trends",
        reason: format!("negative {field} {value}"),
    })
}

fn db_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert or update the trend keyed by its canonical keyword.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails, or [`DbError::Json`] if the
/// variant or source sets cannot be serialized.
pub async fn upsert_trend(pool: &PgPool, trend: &TrackedTrend) -> Result<(), DbError> {
    let variants = serde_json::to_value(&trend.original_variants)?;
    let sources = serde_json::to_value(&trend.sources)?;

    sqlx::query(
        "INSERT INTO tracked_trends \
             (canonical_keyword, original_variants, total_mentions, daily_mentions, \
              sources, avg_reliability, score, growth_rate, peak_mentions, \
              days_without_growth, first_seen, last_update, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (canonical_keyword) DO UPDATE SET \
             original_variants   = EXCLUDED.original_variants, \
             total_mentions      = EXCLUDED.total_mentions, \
             daily_mentions      = EXCLUDED.daily_mentions, \
             sources             = EXCLUDED.sources, \
             avg_reliability     = EXCLUDED.avg_reliability, \
             score               = EXCLUDED.score, \
             growth_rate         = EXCLUDED.growth_rate, \
             peak_mentions       = EXCLUDED.peak_mentions, \
             days_without_growth = EXCLUDED.days_without_growth, \
             first_seen          = EXCLUDED.first_seen, \
             last_update         = EXCLUDED.last_update, \
             status              = EXCLUDED.status, \
             updated_at          = NOW()",
    )
    .bind(&trend.canonical_keyword)
    .bind(variants)
    .bind(db_count(trend.total_mentions))
    .bind(db_count(trend.daily_mentions))
    .bind(sources)
    .bind(trend.avg_reliability)
    .bind(trend.score)
    .bind(trend.growth_rate)
    .bind(db_count(trend.peak_mentions))
    .bind(i32::try_from(trend.days_without_growth).unwrap_or(i32::MAX))
    .bind(trend.first_seen)
    .bind(trend.last_update)
    .bind(trend.status.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load tracked trends, optionally including archived ones, as validated
/// domain values ordered by score descending.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or
/// [`DbError::CorruptRecord`] if a row fails validation.
pub async fn list_trends(
    pool: &PgPool,
    include_archived: bool,
) -> Result<Vec<TrackedTrend>, DbError> {
    let rows = if include_archived {
        sqlx::query_as::<_, TrackedTrendRow>(
            "SELECT id, canonical_keyword, original_variants, total_mentions, daily_mentions, \
                    sources, avg_reliability, score, growth_rate, peak_mentions, \
                    days_without_growth, first_seen, last_update, status, created_at, updated_at \
             FROM tracked_trends \
             ORDER BY score DESC, last_update DESC, canonical_keyword ASC",
        )
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, TrackedTrendRow>(
            "SELECT id, canonical_keyword, original_variants, total_mentions, daily_mentions, \
                    sources, avg_reliability, score, growth_rate, peak_mentions, \
                    days_without_growth, first_seen, last_update, status, created_at, updated_at \
             FROM tracked_trends \
             WHERE status <> 'archived' \
             ORDER BY score DESC, last_update DESC, canonical_keyword ASC",
        )
        .fetch_all(pool)
        .await?
    };

    rows.into_iter().map(TrackedTrend::try_from).collect()
}

/// Fetch a single trend by its canonical keyword.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, [`DbError::Sqlx`] on query
/// failure, or [`DbError::CorruptRecord`] if the row fails validation.
pub async fn get_trend_by_keyword(
    pool: &PgPool,
    canonical_keyword: &str,
) -> Result<TrackedTrend, DbError> {
    let row = sqlx::query_as::<_, TrackedTrendRow>(
        "SELECT id, canonical_keyword, original_variants, total_mentions, daily_mentions, \
                sources, avg_reliability, score, growth_rate, peak_mentions, \
                days_without_growth, first_seen, last_update, status, created_at, updated_at \
         FROM tracked_trends \
         WHERE canonical_keyword = $1",
    )
    .bind(canonical_keyword)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    TrackedTrend::try_from(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> TrackedTrendRow {
        TrackedTrendRow {
            id: 1,
            canonical_keyword: "bts".to_string(),
            original_variants: json!(["BTS", "bts"]),
            total_mentions: 1200,
            daily_mentions: 400,
            sources: json!(["google_news", "reddit"]),
            avg_reliability: 0.85,
            score: 120.5,
            growth_rate: 0.5,
            peak_mentions: 400,
            days_without_growth: 0,
            first_seen: Utc::now(),
            last_update: Utc::now(),
            status: "active".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn valid_row_converts_to_domain_trend() {
        let trend = TrackedTrend::try_from(sample_row()).unwrap();

        assert_eq!(trend.canonical_keyword, "bts");
        assert_eq!(trend.total_mentions, 1200);
        assert_eq!(trend.unique_source_count(), 2);
        assert!(trend.original_variants.contains("BTS"));
        assert_eq!(trend.status, TrendStatus::Active);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut row = sample_row();
        row.status = "paused".to_string();

        let err = TrackedTrend::try_from(row).unwrap_err();
        assert!(matches!(err, DbError::CorruptRecord { table: "tracked_trends", .. }));
    }

    #[test]
    fn negative_count_is_rejected() {
        let mut row = sample_row();
        row.total_mentions = -1;

        assert!(TrackedTrend::try_from(row).is_err());
    }

    #[test]
    fn non_array_sources_are_rejected() {
        let mut row = sample_row();
        row.sources = json!({"reddit": true});

        assert!(TrackedTrend::try_from(row).is_err());
    }
}
