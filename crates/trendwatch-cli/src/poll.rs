//! Poll cycle command handlers for the CLI.
//!
//! Drives the same collect → fold → persist cycle the server scheduler
//! runs, with `poll_runs` bookkeeping under the `cli` trigger and
//! human-readable output.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use sqlx::PgPool;

use trendwatch_core::{normalize_keyword, AppConfig, Roster, SampleContent, ScoreWeights};
use trendwatch_engine::{aggregate_entity, is_due, keyword_universe, run_cycle, CycleConfig};
use trendwatch_sources::{build_sources, collect_keywords, CollectOptions};

use crate::{bootstrap, fail_run_best_effort};

/// Sub-commands available under `poll`.
#[derive(Debug, Subcommand)]
pub enum PollCommands {
    /// Poll all tracked keywords and update trend state
    Trends {
        /// Preview the keyword universe without fetching or writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Poll due VIP entities and record observations
    Vips {
        /// Preview which entities are due without fetching or writing
        #[arg(long)]
        dry_run: bool,
    },
}

pub(crate) async fn dispatch(command: PollCommands) -> anyhow::Result<()> {
    let (config, roster, pool) = bootstrap().await?;
    match command {
        PollCommands::Trends { dry_run } => run_poll_trends(&pool, &config, &roster, dry_run).await,
        PollCommands::Vips { dry_run } => run_poll_vips(&pool, &config, &roster, dry_run).await,
    }
}

fn collect_options(config: &AppConfig) -> CollectOptions {
    CollectOptions {
        fetch_timeout: Duration::from_secs(config.source_fetch_timeout_secs),
        ..CollectOptions::default()
    }
}

/// Run one trend poll cycle from the command line.
///
/// # Errors
///
/// Returns an error if existing trends cannot be loaded or the run cannot
/// be booked. Per-record persistence failures are logged and counted.
pub(crate) async fn run_poll_trends(
    pool: &PgPool,
    config: &AppConfig,
    roster: &Roster,
    dry_run: bool,
) -> anyhow::Result<()> {
    let existing = trendwatch_db::list_trends(pool, true).await?;
    let keywords = keyword_universe(&roster.issues, &roster.custom_keywords, &existing);

    if keywords.is_empty() {
        println!("no keywords to poll; roster has no issues or custom keywords");
        return Ok(());
    }

    if dry_run {
        println!(
            "dry-run: would poll {} keywords: [{}]",
            keywords.len(),
            keywords.join(", ")
        );
        return Ok(());
    }

    let run = trendwatch_db::create_poll_run(pool, "trends", "cli").await?;
    if let Err(e) = trendwatch_db::start_poll_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "trends", format!("{e:#}")).await;
        return Err(e.into());
    }

    let sources = build_sources(config, roster);
    let now = Utc::now();
    let collected = collect_keywords(&sources, &keywords, collect_options(config), now).await;
    if !collected.failed_sources.is_empty() {
        tracing::warn!(
            sources = ?collected.failed_sources,
            "some sources failed during collection"
        );
    }

    let cycle = CycleConfig {
        thresholds: config.lifecycle_thresholds(),
        weights: ScoreWeights::default(),
        top_n: config.snapshot_top_n,
        default_hot_threshold: config.hot_issue_threshold,
        allow_resurrection: config.allow_resurrection,
    };
    let records_collected = collected.records.len();
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
        tracing::error!(error = %e, "snapshot insert failed");
        persist_failures += 1;
    }
    for issue in &outcome.hot_issues {
        if let Err(e) = trendwatch_db::insert_hot_issue(pool, issue).await {
            tracing::error!(keyword = %issue.keyword, error = %e, "hot issue insert failed");
            persist_failures += 1;
        }
    }

    let processed = i32::try_from(records_collected).unwrap_or(i32::MAX);
    if let Err(err) = trendwatch_db::complete_poll_run(pool, run.id, processed).await {
        fail_run_best_effort(pool, run.id, "trends", format!("{err:#}")).await;
        return Err(err.into());
    }

    println!(
        "trend poll complete: {} keywords, {} records, {} trends ({} new), {} hot issues, {} persist failures",
        keywords.len(),
        records_collected,
        outcome.trends.len(),
        outcome.created,
        outcome.hot_issues.len(),
        persist_failures
    );
    Ok(())
}

/// Run one VIP poll cycle from the command line.
///
/// # Errors
///
/// Returns an error if observation times cannot be loaded or the run
/// cannot be booked. Per-entity persistence failures are logged.
pub(crate) async fn run_poll_vips(
    pool: &PgPool,
    config: &AppConfig,
    roster: &Roster,
    dry_run: bool,
) -> anyhow::Result<()> {
    let last_observed = trendwatch_db::latest_observation_times(pool).await?;
    let intervals = config.tier_intervals();
    let now = Utc::now();

    let due: Vec<_> = roster
        .vips
        .iter()
        .filter(|v| is_due(v.tier, intervals, last_observed.get(&v.id).copied(), now))
        .collect();

    if due.is_empty() {
        println!("no VIP entities due; nothing to poll");
        return Ok(());
    }

    if dry_run {
        let ids: Vec<&str> = due.iter().map(|v| v.id.as_str()).collect();
        println!(
            "dry-run: would poll {} of {} VIP entities: [{}]",
            due.len(),
            roster.vips.len(),
            ids.join(", ")
        );
        return Ok(());
    }

    let run = trendwatch_db::create_poll_run(pool, "vips", "cli").await?;
    if let Err(e) = trendwatch_db::start_poll_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "vips", format!("{e:#}")).await;
        return Err(e.into());
    }

    let mut seen = HashSet::new();
    let keywords: Vec<String> = due
        .iter()
        .flat_map(|v| v.keywords.iter())
        .filter(|k| seen.insert(normalize_keyword(k)))
        .cloned()
        .collect();

    let sources = build_sources(config, roster);
    let collected = collect_keywords(&sources, &keywords, collect_options(config), now).await;

    let mut recorded = 0usize;
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
            Ok(_) => {
                tracing::info!(
                    entity = %entity.id,
                    mentions = observation.total_mentions,
                    "VIP observation recorded"
                );
                recorded += 1;
            }
            Err(e) => {
                tracing::error!(entity = %entity.id, error = %e, "VIP observation insert failed");
                persist_failures += 1;
            }
        }
    }

    let processed = i32::try_from(collected.records.len()).unwrap_or(i32::MAX);
    if let Err(err) = trendwatch_db::complete_poll_run(pool, run.id, processed).await {
        fail_run_best_effort(pool, run.id, "vips", format!("{err:#}")).await;
        return Err(err.into());
    }

    println!(
        "VIP poll complete: {} entities due, {} observations recorded, {} persist failures",
        due.len(),
        recorded,
        persist_failures
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{Cli, Commands};

    use super::PollCommands;

    #[test]
    fn parses_poll_trends_defaults() {
        let cli = Cli::try_parse_from(["trendwatch-cli", "poll", "trends"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Poll {
                command: PollCommands::Trends { dry_run: false }
            })
        ));
    }

    #[test]
    fn parses_poll_trends_dry_run() {
        let cli = Cli::try_parse_from(["trendwatch-cli", "poll", "trends", "--dry-run"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Poll {
                command: PollCommands::Trends { dry_run: true }
            })
        ));
    }

    #[test]
    fn parses_poll_vips() {
        let cli = Cli::try_parse_from(["trendwatch-cli", "poll", "vips"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Poll {
                command: PollCommands::Vips { dry_run: false }
            })
        ));
    }
}
