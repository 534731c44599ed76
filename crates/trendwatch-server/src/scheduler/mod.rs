//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring trend and VIP poll jobs.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::jobs;

/// Builds and starts the background job scheduler.
///
/// Registers both recurring poll jobs and starts the scheduler. Returns
/// the running [`JobScheduler`] handle, which must be kept alive for the
/// lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<trendwatch_core::AppConfig>,
    roster: Arc<trendwatch_core::Roster>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_trend_poll_job(&scheduler, pool.clone(), Arc::clone(&config), Arc::clone(&roster))
        .await?;
    register_vip_poll_job(&scheduler, pool, config, roster).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring trend poll.
///
/// Runs every 30 minutes by default (`0 */30 * * * *`); override with
/// `TRENDWATCH_TREND_POLL_CRON`.
async fn register_trend_poll_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<trendwatch_core::AppConfig>,
    roster: Arc<trendwatch_core::Roster>,
) -> Result<(), JobSchedulerError> {
    let cron =
        std::env::var("TRENDWATCH_TREND_POLL_CRON").unwrap_or_else(|_| "0 */30 * * * *".to_string());

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let pool = pool.clone();
        let config = Arc::clone(&config);
        let roster = Arc::clone(&roster);

        Box::pin(async move {
            tracing::info!("scheduler: starting trend poll");
            match jobs::run_trend_poll(&pool, &config, &roster, "cron").await {
                Ok(summary) => tracing::info!(
                    run_id = summary.run_id,
                    keywords = summary.keywords_polled,
                    records = summary.records_collected,
                    hot_issues = summary.hot_issues_raised,
                    "scheduler: trend poll complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: trend poll failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered trend poll job");
    Ok(())
}

/// Register the recurring VIP poll.
///
/// Runs every 10 minutes by default (`0 */10 * * * *`); override with
/// `TRENDWATCH_VIP_POLL_CRON`. The job fires often so that tier-1 entities
/// get near-continuous coverage; tier 2 and 3 cadence is enforced per
/// entity by comparing their last observation time against the tier
/// interval, not by the cron expression.
async fn register_vip_poll_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<trendwatch_core::AppConfig>,
    roster: Arc<trendwatch_core::Roster>,
) -> Result<(), JobSchedulerError> {
    let cron =
        std::env::var("TRENDWATCH_VIP_POLL_CRON").unwrap_or_else(|_| "0 */10 * * * *".to_string());

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let pool = pool.clone();
        let config = Arc::clone(&config);
        let roster = Arc::clone(&roster);

        Box::pin(async move {
            tracing::info!("scheduler: starting VIP poll");
            match jobs::run_vip_poll(&pool, &config, &roster, "cron").await {
                Ok(summary) => tracing::info!(
                    run_id = summary.run_id,
                    due = summary.entities_due,
                    observations = summary.observations_recorded,
                    "scheduler: VIP poll complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: VIP poll failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered VIP poll job");
    Ok(())
}
