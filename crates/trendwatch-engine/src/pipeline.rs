//! One poll cycle over the trend set.
//!
//! Folds collected mention records into the durable trend aggregates:
//! create on first sighting, merge variants and sources, update lifecycle
//! state, rescore, then select the snapshot and hot issues. The fold is
//! single-threaded: all writes to a given canonical keyword happen here,
//! in one place, after the concurrent collection pass has finished.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use trendwatch_core::{
    normalize_keyword, LifecycleThresholds, MentionRecord, SampleContent, ScoreWeights,
    TrackedIssueConfig, TrackedTrend, TrendStatus,
};

use crate::dedup::{deduplicate, AggregatedMention};
use crate::emitter::{build_snapshot, detect_hot_issues, HotIssueSnapshot, TrendSnapshot};
use crate::lifecycle::apply_poll;
use crate::scorer::score_trend;

/// Tunables for one cycle, derived from app config and roster.
#[derive(Debug, Clone, Copy)]
pub struct CycleConfig {
    pub thresholds: LifecycleThresholds,
    pub weights: ScoreWeights,
    pub top_n: usize,
    pub default_hot_threshold: u64,
    /// When set, mentions of an archived canonical keyword re-seed a fresh
    /// trend under the same key. Off by default: archived is terminal.
    pub allow_resurrection: bool,
}

/// Everything a cycle produced, ready for persistence.
#[derive(Debug)]
pub struct CycleOutcome {
    /// The full updated trend set, including untouched archived trends.
    pub trends: Vec<TrackedTrend>,
    pub snapshot: TrendSnapshot,
    pub hot_issues: Vec<HotIssueSnapshot>,
    pub created: usize,
    pub resurrected: usize,
}

/// Build the keyword universe for a cycle: tracked issue keywords, their
/// related keywords, roster custom keywords, and the canonical keywords of
/// every non-archived trend already being tracked. Deduplicated by
/// canonical form, first spelling wins.
#[must_use]
pub fn keyword_universe(
    issues: &[TrackedIssueConfig],
    custom_keywords: &[String],
    trends: &[TrackedTrend],
) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut universe = Vec::new();

    let mut push = |raw: &str| {
        let canonical = normalize_keyword(raw);
        if !canonical.is_empty() && seen.insert(canonical) {
            universe.push(raw.trim().to_string());
        }
    };

    for issue in issues {
        push(&issue.keyword);
        for related in &issue.related_keywords {
            push(related);
        }
    }
    for keyword in custom_keywords {
        push(keyword);
    }
    for trend in trends {
        if trend.status != TrendStatus::Archived {
            push(&trend.canonical_keyword);
        }
    }

    universe
}

/// Run one poll cycle: fold `records` into `existing`, update lifecycles,
/// rescore, and emit the snapshot plus hot issues.
#[must_use]
pub fn run_cycle(
    existing: Vec<TrackedTrend>,
    records: Vec<MentionRecord>,
    samples: &HashMap<String, Vec<SampleContent>>,
    issues: &[TrackedIssueConfig],
    config: &CycleConfig,
    now: DateTime<Utc>,
) -> CycleOutcome {
    let mut trends: BTreeMap<String, TrackedTrend> = existing
        .into_iter()
        .map(|t| (t.canonical_keyword.clone(), t))
        .collect();

    let mut created = 0usize;
    let mut resurrected = 0usize;
    let mut touched: Vec<String> = Vec::new();

    for aggregate in deduplicate(records) {
        let key = aggregate.canonical_keyword.clone();
        match trends.get_mut(&key) {
            Some(trend) if trend.status == TrendStatus::Archived => {
                if config.allow_resurrection {
                    tracing::info!(keyword = %key, "re-seeding archived trend");
                    let mut fresh = TrackedTrend::seed(key.clone(), now);
                    fold_aggregate(&mut fresh, aggregate, config.thresholds, now);
                    trends.insert(key.clone(), fresh);
                    resurrected += 1;
                    touched.push(key);
                }
                // Without resurrection the archived record is left as-is.
            }
            Some(trend) => {
                fold_aggregate(trend, aggregate, config.thresholds, now);
                touched.push(key);
            }
            None => {
                let mut fresh = TrackedTrend::seed(key.clone(), now);
                fold_aggregate(&mut fresh, aggregate, config.thresholds, now);
                trends.insert(key.clone(), fresh);
                created += 1;
                touched.push(key);
            }
        }
    }

    // Trends that went silent this cycle still take a lifecycle step.
    let touched: std::collections::HashSet<String> = touched.into_iter().collect();
    for (key, trend) in &mut trends {
        if !touched.contains(key) && trend.status != TrendStatus::Archived {
            apply_poll(trend, 0, config.thresholds, now);
        }
    }

    for trend in trends.values_mut() {
        if trend.status != TrendStatus::Archived {
            trend.score = score_trend(trend, &config.weights);
        }
    }

    let trends: Vec<TrackedTrend> = trends.into_values().collect();
    let snapshot = build_snapshot(&trends, config.top_n, now);
    let hot_issues = detect_hot_issues(&trends, issues, samples, config.default_hot_threshold, now);

    tracing::info!(
        trends = trends.len(),
        created,
        resurrected,
        snapshot_entries = snapshot.entries.len(),
        hot_issues = hot_issues.len(),
        "poll cycle folded"
    );

    CycleOutcome {
        trends,
        snapshot,
        hot_issues,
        created,
        resurrected,
    }
}

/// Merge one cycle's aggregate into a trend, then take its lifecycle step.
fn fold_aggregate(
    trend: &mut TrackedTrend,
    aggregate: AggregatedMention,
    thresholds: LifecycleThresholds,
    now: DateTime<Utc>,
) {
    let old_total = trend.total_mentions;
    let new_total = old_total + aggregate.total_mentions;
    if new_total > 0 {
        #[allow(clippy::cast_precision_loss)]
        {
            trend.avg_reliability = (trend.avg_reliability * old_total as f64
                + aggregate.reliability_mass)
                / new_total as f64;
        }
    }
    trend.total_mentions = new_total;
    trend.original_variants.extend(aggregate.original_variants);
    trend.sources.extend(aggregate.sources);

    apply_poll(trend, aggregate.total_mentions, thresholds, now);
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn config() -> CycleConfig {
        CycleConfig {
            thresholds: LifecycleThresholds::default(),
            weights: ScoreWeights::default(),
            top_n: 50,
            default_hot_threshold: 1000,
            allow_resurrection: false,
        }
    }

    fn record(keyword: &str, count: u64, source: &str) -> MentionRecord {
        MentionRecord {
            keyword: keyword.to_string(),
            source: source.to_string(),
            count,
            observed_at: Utc::now(),
            source_reliability: 0.8,
        }
    }

    fn issue(keyword: &str, threshold: u64) -> TrackedIssueConfig {
        TrackedIssueConfig {
            keyword: keyword.to_string(),
            description: String::new(),
            related_keywords: vec![],
            priority: 5,
            auto_generate: true,
            mention_threshold: Some(threshold),
        }
    }

    #[test]
    fn end_to_end_three_sources_one_keyword() {
        // Three sources each report 400 mentions of "Huntrix".
        let records = vec![
            record("Huntrix", 400, "google_news"),
            record("Huntrix", 400, "bing_news"),
            record("huntrix", 400, "reddit"),
        ];
        let samples = HashMap::from([(
            "huntrix".to_string(),
            vec![SampleContent {
                text: "Huntrix win again".to_string(),
                url: "https://example.com/1".to_string(),
                source: "reddit".to_string(),
                published_at: None,
            }],
        )]);
        let issues = vec![issue("huntrix", 1000)];

        let outcome = run_cycle(vec![], records, &samples, &issues, &config(), Utc::now());

        assert_eq!(outcome.created, 1);
        let top = &outcome.snapshot.entries[0];
        assert_eq!(top.canonical_keyword, "huntrix");
        assert_eq!(top.total_mentions, 1200);
        assert_eq!(top.unique_source_count, 3);

        assert_eq!(outcome.hot_issues.len(), 1);
        assert_eq!(outcome.hot_issues[0].keyword, "huntrix");
        assert_eq!(outcome.hot_issues[0].mentions, 1200);
    }

    #[test]
    fn repeat_cycles_accumulate_totals_and_track_growth() {
        let now = Utc::now();
        let first = run_cycle(
            vec![],
            vec![record("bts", 100, "reddit")],
            &HashMap::new(),
            &[],
            &config(),
            now,
        );
        let trend = &first.trends[0];
        assert_eq!(trend.total_mentions, 100);
        assert_eq!(trend.daily_mentions, 100);
        assert_eq!(trend.peak_mentions, 100);

        let second = run_cycle(
            first.trends,
            vec![record("BTS", 250, "reddit")],
            &HashMap::new(),
            &[],
            &config(),
            now + Duration::hours(1),
        );
        let trend = &second.trends[0];
        assert_eq!(trend.total_mentions, 350);
        assert_eq!(trend.daily_mentions, 250);
        assert_eq!(trend.peak_mentions, 250);
        assert!((trend.growth_rate - 1.5).abs() < 1e-9);
        assert!(trend.original_variants.contains("BTS"));
        assert!(trend.original_variants.contains("bts"));
    }

    #[test]
    fn silent_trend_takes_lifecycle_step() {
        let now = Utc::now();
        let seeded = run_cycle(
            vec![],
            vec![record("bts", 100, "reddit")],
            &HashMap::new(),
            &[],
            &config(),
            now,
        );

        let next = run_cycle(
            seeded.trends,
            vec![record("aespa", 10, "reddit")],
            &HashMap::new(),
            &[],
            &config(),
            now + Duration::hours(1),
        );
        let bts = next
            .trends
            .iter()
            .find(|t| t.canonical_keyword == "bts")
            .unwrap();
        assert_eq!(bts.daily_mentions, 0);
        assert_eq!(bts.days_without_growth, 1);
    }

    #[test]
    fn archived_trend_is_not_revived_by_default() {
        let now = Utc::now();
        let mut archived = TrackedTrend::seed("bts".to_string(), now);
        archived.status = TrendStatus::Archived;
        archived.total_mentions = 500;
        let before = archived.clone();

        let outcome = run_cycle(
            vec![archived],
            vec![record("bts", 1000, "reddit")],
            &HashMap::new(),
            &[],
            &config(),
            now + Duration::hours(1),
        );

        assert_eq!(outcome.created, 0);
        assert_eq!(outcome.resurrected, 0);
        assert_eq!(outcome.trends[0], before, "archived record untouched");
        assert!(
            outcome.snapshot.entries.is_empty(),
            "archived trends stay out of the snapshot"
        );
    }

    #[test]
    fn resurrection_reseeds_a_fresh_trend() {
        let now = Utc::now();
        let mut archived = TrackedTrend::seed("bts".to_string(), now - Duration::days(30));
        archived.status = TrendStatus::Archived;
        archived.total_mentions = 500;

        let mut cfg = config();
        cfg.allow_resurrection = true;
        let outcome = run_cycle(
            vec![archived],
            vec![record("bts", 1000, "reddit")],
            &HashMap::new(),
            &[],
            &cfg,
            now,
        );

        assert_eq!(outcome.resurrected, 1);
        let trend = &outcome.trends[0];
        assert_eq!(trend.status, TrendStatus::Active);
        assert_eq!(trend.total_mentions, 1000, "history replaced, not merged");
        assert_eq!(trend.first_seen, now);
    }

    #[test]
    fn universe_merges_issue_custom_and_tracked_keywords() {
        let issues = vec![TrackedIssueConfig {
            keyword: "Huntrix".to_string(),
            description: String::new(),
            related_keywords: vec!["Golden".to_string()],
            priority: 3,
            auto_generate: false,
            mention_threshold: None,
        }];
        let custom = vec!["hallyu".to_string(), "HUNTRIX".to_string()];
        let mut archived = TrackedTrend::seed("old news".to_string(), Utc::now());
        archived.status = TrendStatus::Archived;
        let trends = vec![
            TrackedTrend::seed("bts".to_string(), Utc::now()),
            archived,
        ];

        let universe = keyword_universe(&issues, &custom, &trends);
        assert_eq!(universe, vec!["Huntrix", "Golden", "hallyu", "bts"]);
    }
}
