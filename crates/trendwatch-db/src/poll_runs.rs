//! Database operations for the `poll_runs` table.
//!
//! Every poll cycle — trend or VIP, whether fired by the scheduler, the
//! HTTP trigger, or the CLI — books a row here and walks it through
//! `queued` → `running` → `succeeded` / `failed`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `poll_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollRunRow {
    pub id: i64,
    pub public_id: Uuid,
    /// `trends` or `vips`.
    pub run_type: String,
    /// `cron`, `api`, or `cli`.
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creates a new poll run in `queued` status.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_poll_run(
    pool: &PgPool,
    run_type: &str,
    trigger_source: &str,
) -> Result<PollRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, PollRunRow>(
        "INSERT INTO poll_runs (public_id, run_type, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING id, public_id, run_type, trigger_source, status, \
                   started_at, completed_at, records_processed, error_message, created_at",
    )
    .bind(public_id)
    .bind(run_type)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidPollRunTransition`] if the run is not `queued`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn start_poll_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE poll_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidPollRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded`, sets `completed_at = NOW()` and `records_processed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidPollRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_poll_run(
    pool: &PgPool,
    id: i64,
    records_processed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE poll_runs \
         SET status = 'succeeded', completed_at = NOW(), records_processed = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(records_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidPollRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed`, sets `completed_at = NOW()` and `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidPollRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_poll_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE poll_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidPollRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_poll_run(pool: &PgPool, id: i64) -> Result<PollRunRow, DbError> {
    let row = sqlx::query_as::<_, PollRunRow>(
        "SELECT id, public_id, run_type, trigger_source, status, \
                started_at, completed_at, records_processed, error_message, created_at \
         FROM poll_runs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, ordered by `created_at DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_poll_runs(pool: &PgPool, limit: i64) -> Result<Vec<PollRunRow>, DbError> {
    let rows = sqlx::query_as::<_, PollRunRow>(
        "SELECT id, public_id, run_type, trigger_source, status, \
                started_at, completed_at, records_processed, error_message, created_at \
         FROM poll_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
