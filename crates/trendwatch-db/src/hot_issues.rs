//! Database operations for the `hot_issues` table. Rows are append-only:
//! a raised hot issue is a historical record of the alert, never updated.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use trendwatch_engine::HotIssueSnapshot;

use crate::DbError;

/// A row from the `hot_issues` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HotIssueRow {
    pub id: i64,
    pub keyword: String,
    pub mentions: i64,
    /// JSONB object with `positive` / `neutral` / `negative` counts.
    pub sentiment_breakdown: Value,
    /// JSONB array of sample content items.
    pub sample_content: Value,
    pub priority: i32,
    pub should_auto_generate: bool,
    pub detected_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insert a hot-issue record and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, or [`DbError::Json`] if
/// the sentiment breakdown or samples cannot be serialized.
pub async fn insert_hot_issue(pool: &PgPool, issue: &HotIssueSnapshot) -> Result<i64, DbError> {
    let sentiment = serde_json::to_value(&issue.sentiment_breakdown)?;
    let samples = serde_json::to_value(&issue.sample_content)?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO hot_issues \
             (keyword, mentions, sentiment_breakdown, sample_content, \
              priority, should_auto_generate, detected_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(&issue.keyword)
    .bind(i64::try_from(issue.mentions).unwrap_or(i64::MAX))
    .bind(sentiment)
    .bind(samples)
    .bind(issue.priority)
    .bind(issue.should_auto_generate)
    .bind(issue.timestamp)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List recent hot issues, optionally filtered by keyword, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_hot_issues(
    pool: &PgPool,
    keyword: Option<&str>,
    limit: i64,
) -> Result<Vec<HotIssueRow>, DbError> {
    let rows = match keyword {
        Some(keyword) => {
            sqlx::query_as::<_, HotIssueRow>(
                "SELECT id, keyword, mentions, sentiment_breakdown, sample_content, \
                        priority, should_auto_generate, detected_at, created_at \
                 FROM hot_issues \
                 WHERE keyword = $1 \
                 ORDER BY detected_at DESC, id DESC \
                 LIMIT $2",
            )
            .bind(keyword)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, HotIssueRow>(
                "SELECT id, keyword, mentions, sentiment_breakdown, sample_content, \
                        priority, should_auto_generate, detected_at, created_at \
                 FROM hot_issues \
                 ORDER BY detected_at DESC, id DESC \
                 LIMIT $1",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}
