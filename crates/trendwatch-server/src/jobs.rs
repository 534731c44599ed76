//! Poll cycle orchestration shared by the scheduler and the cron trigger
//! endpoints.
//!
//! Each run books a `poll_runs` row, drives collection through the engine,
//! and persists the outcome. Persistence failures are logged and counted
//! but never abort the cycle; the run only fails when collection or the
//! initial trend load does.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;

use trendwatch_core::{normalize_keyword, AppConfig, Roster, SampleContent, ScoreWeights};
use trendwatch_engine::{aggregate_entity, is_due, keyword_universe, run_cycle, CycleConfig};
use trendwatch_sources::{build_sources, collect_keywords, CollectOptions};

/// What a trend poll did, reported by the cron endpoints and the CLI.
#[derive(Debug, Serialize)]
pub struct TrendPollSummary {
    pub run_id: i64,
    pub keywords_polled: usize,
    pub records_collected: usize,
    pub trends_tracked: usize,
    pub trends_created: usize,
    pub hot_issues_raised: usize,
    pub failed_sources: Vec<&'static str>,
    pub persist_failures: usize,
}

/// What a VIP poll did.
#[derive(Debug, Serialize)]
pub struct VipPollSummary {
    pub run_id: i64,
    pub entities_due: usize,
    pub observations_recorded: usize,
    pub records_collected: usize,
    pub failed_sources: Vec<&'static str>,
    pub persist_failures: usize,
}

/// Run one trend poll cycle with `poll_runs` bookkeeping.
///
/// # Errors
///
/// Returns an error if the run cannot be booked, existing trends cannot be
/// loaded, or the run-state transition fails.
pub async fn run_trend_poll(
    pool: &PgPool,
    config: &AppConfig,
    roster: &Roster,
    trigger: &str,
) -> anyhow::Result<TrendPollSummary> {
    let run = trendwatch_db::create_poll_run(pool, "trends", trigger).await?;
    trendwatch_db::start_poll_run(pool, run.id).await?;

    match execute_trend_cycle(pool, config, roster, run.id).await {
        Ok(summary) => {
            let processed = i32::try_from(summary.records_collected).unwrap_or(i32::MAX);
            trendwatch_db::complete_poll_run(pool, run.id, processed).await?;
            Ok(summary)
        }
        Err(e) => {
            if let Err(mark) = trendwatch_db::fail_poll_run(pool, run.id, &e.to_string()).await {
                tracing::error!(run_id = run.id, error = %mark, "failed to mark poll run as failed");
            }
            Err(e)
        }
    }
}

async fn execute_trend_cycle(
    pool: &PgPool,
    config: &AppConfig,
    roster: &Roster,
    run_id: i64,
) -> anyhow::Result<TrendPollSummary> {
    let existing = trendwatch_db::list_trends(pool, true).await?;
    let keywords = keyword_universe(&roster.issues, &roster.custom_keywords, &existing);

    if keywords.is_empty() {
        tracing::info!(run_id, "no keywords to poll; cycle is a no-op");
        return Ok(TrendPollSummary {
            run_id,
            keywords_polled: 0,
            records_collected: 0,
            trends_tracked: existing.len(),
            trends_created: 0,
            hot_issues_raised: 0,
            failed_sources: vec![],
            persist_failures: 0,
        });
    }

    let sources = build_sources(config, roster);
    let options = CollectOptions {
        fetch_timeout: Duration::from_secs(config.source_fetch_timeout_secs),
        ..CollectOptions::default()
    };
    let now = Utc::now();
    let collected = collect_keywords(&sources, &keywords, options, now).await;
    let records_collected = collected.records.len();

    let cycle = CycleConfig {
        thresholds: config.lifecycle_thresholds(),
        weights: ScoreWeights::default(),
        top_n: config.snapshot_top_n,
        default_hot_threshold: config.hot_issue_threshold,
        allow_resurrection: config.allow_resurrection,
    };
    let outcome = run_cycle(
        existing,
        collected.records,
        &collected.samples,
        &roster.issues,
        &cycle,
        now,
    );

    let mut persist_failures = 0usize;
    for trend in &outcome.trends {
        if let Err(e) = trendwatch_db::upsert_trend(pool, trend).await {
            tracing::error!(keyword = %trend.canonical_keyword, error = %e, "trend upsert failed");
            persist_failures += 1;
        }
    }
    if let Err(e) = trendwatch_db::insert_snapshot(pool, &outcome.snapshot).await {
        tracing::error!(run_id, error = %e, "snapshot insert failed");
        persist_failures += 1;
    }
    for issue in &outcome.hot_issues {
        if let Err(e) = trendwatch_db::insert_hot_issue(pool, issue).await {
            tracing::error!(keyword = %issue.keyword, error = %e, "hot issue insert failed");
            persist_failures += 1;
        }
    }

    Ok(TrendPollSummary {
        run_id,
        keywords_polled: keywords.len(),
        records_collected,
        trends_tracked: outcome.trends.len(),
        trends_created: outcome.created,
        hot_issues_raised: outcome.hot_issues.len(),
        failed_sources: collected.failed_sources,
        persist_failures,
    })
}

/// Run one VIP poll cycle with `poll_runs` bookkeeping.
///
/// Only entities whose last observation is older than their tier interval
/// are polled. An observation is recorded even when an entity had zero
/// mentions, which is what advances its poll clock.
///
/// # Errors
///
/// Returns an error if the run cannot be booked, last-observation times
/// cannot be loaded, or the run-state transition fails.
pub async fn run_vip_poll(
    pool: &PgPool,
    config: &AppConfig,
    roster: &Roster,
    trigger: &str,
) -> anyhow::Result<VipPollSummary> {
    let run = trendwatch_db::create_poll_run(pool, "vips", trigger).await?;
    trendwatch_db::start_poll_run(pool, run.id).await?;

    match execute_vip_cycle(pool, config, roster, run.id).await {
        Ok(summary) => {
            let processed = i32::try_from(summary.records_collected).unwrap_or(i32::MAX);
            trendwatch_db::complete_poll_run(pool, run.id, processed).await?;
            Ok(summary)
        }
        Err(e) => {
            if let Err(mark) = trendwatch_db::fail_poll_run(pool, run.id, &e.to_string()).await {
                tracing::error!(run_id = run.id, error = %mark, "failed to mark poll run as failed");
            }
            Err(e)
        }
    }
}

async fn execute_vip_cycle(
    pool: &PgPool,
    config: &AppConfig,
    roster: &Roster,
    run_id: i64,
) -> anyhow::Result<VipPollSummary> {
    let last_observed = trendwatch_db::latest_observation_times(pool).await?;
    let intervals = config.tier_intervals();
    let now = Utc::now();

    let due: Vec<_> = roster
        .vips
        .iter()
        .filter(|v| is_due(v.tier, intervals, last_observed.get(&v.id).copied(), now))
        .collect();

    if due.is_empty() {
        tracing::info!(run_id, "no VIP entities due this cycle");
        return Ok(VipPollSummary {
            run_id,
            entities_due: 0,
            observations_recorded: 0,
            records_collected: 0,
            failed_sources: vec![],
            persist_failures: 0,
        });
    }

    // One fetch per distinct keyword even when entities share keywords.
    let mut seen = HashSet::new();
    let keywords: Vec<String> = due
        .iter()
        .flat_map(|v| v.keywords.iter())
        .filter(|k| seen.insert(normalize_keyword(k)))
        .cloned()
        .collect();

    let sources = build_sources(config, roster);
    let options = CollectOptions {
        fetch_timeout: Duration::from_secs(config.source_fetch_timeout_secs),
        ..CollectOptions::default()
    };
    let collected = collect_keywords(&sources, &keywords, options, now).await;

    let mut observations_recorded = 0usize;
    let mut persist_failures = 0usize;
    for entity in &due {
        let samples: Vec<SampleContent> = entity
            .keywords
            .iter()
            .filter_map(|k| collected.samples.get(&normalize_keyword(k)))
            .flatten()
            .cloned()
            .collect();
        let observation = aggregate_entity(entity, &collected.records, &samples, now);

        match trendwatch_db::insert_vip_observation(pool, &observation).await {
            Ok(_) => observations_recorded += 1,
            Err(e) => {
                tracing::error!(entity = %entity.id, error = %e, "VIP observation insert failed");
                persist_failures += 1;
            }
        }
    }

    Ok(VipPollSummary {
        run_id,
        entities_due: due.len(),
        observations_recorded,
        records_collected: collected.records.len(),
        failed_sources: collected.failed_sources,
        persist_failures,
    })
}
