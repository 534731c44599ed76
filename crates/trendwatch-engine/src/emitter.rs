//! Snapshot and hot-issue emission.
//!
//! Selects the top-N trends for the cycle snapshot and raises hot-issue
//! records for tracked issues whose mention totals crossed their
//! threshold. Emission is fire-and-forget with respect to the pipeline:
//! persistence failures downstream never touch the in-memory state built
//! here.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trendwatch_core::{
    normalize_keyword, SampleContent, TrackedIssueConfig, TrackedTrend, TrendStatus,
};

use crate::scorer::rank_cmp;
use crate::sentiment::SentimentBreakdown;

/// Sample content carried on a hot issue, capped at this many items.
pub const HOT_ISSUE_SAMPLE_CAP: usize = 50;

/// One ranked entry in a cycle snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSnapshotEntry {
    pub rank: u32,
    pub canonical_keyword: String,
    pub score: f64,
    pub total_mentions: u64,
    pub daily_mentions: u64,
    pub unique_source_count: u32,
    pub growth_rate: f64,
    pub status: TrendStatus,
}

/// The top-N trends at the end of one poll cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub captured_at: DateTime<Utc>,
    pub entries: Vec<TrendSnapshotEntry>,
}

/// An alert for a tracked issue whose mentions crossed its threshold.
/// Append-only once emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotIssueSnapshot {
    pub keyword: String,
    pub mentions: u64,
    pub sentiment_breakdown: SentimentBreakdown,
    pub sample_content: Vec<SampleContent>,
    pub priority: i32,
    pub should_auto_generate: bool,
    pub timestamp: DateTime<Utc>,
}

/// Select the top `top_n` non-archived trends into a snapshot.
///
/// Ordering is score descending with ties broken by recency then keyword
/// (see [`crate::scorer::rank_cmp`]). Archived trends are excluded from
/// selection but remain in the trend set.
#[must_use]
pub fn build_snapshot(
    trends: &[TrackedTrend],
    top_n: usize,
    captured_at: DateTime<Utc>,
) -> TrendSnapshot {
    let mut candidates: Vec<&TrackedTrend> = trends
        .iter()
        .filter(|t| t.status != TrendStatus::Archived)
        .collect();
    candidates.sort_by(|a, b| rank_cmp(a, b));

    let entries = candidates
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, t)| TrendSnapshotEntry {
            #[allow(clippy::cast_possible_truncation)]
            rank: (i + 1) as u32,
            canonical_keyword: t.canonical_keyword.clone(),
            score: t.score,
            total_mentions: t.total_mentions,
            daily_mentions: t.daily_mentions,
            #[allow(clippy::cast_possible_truncation)]
            unique_source_count: t.unique_source_count() as u32,
            growth_rate: t.growth_rate,
            status: t.status,
        })
        .collect();

    TrendSnapshot {
        captured_at,
        entries,
    }
}

/// Check every tracked issue against the current trend set and build hot
/// issues for those whose totals crossed their threshold.
///
/// An issue's threshold falls back to `default_threshold` when the roster
/// leaves it unset. Samples are drawn from the issue keyword first, then
/// its related keywords, capped at [`HOT_ISSUE_SAMPLE_CAP`].
#[must_use]
pub fn detect_hot_issues(
    trends: &[TrackedTrend],
    issues: &[TrackedIssueConfig],
    samples: &HashMap<String, Vec<SampleContent>>,
    default_threshold: u64,
    now: DateTime<Utc>,
) -> Vec<HotIssueSnapshot> {
    let by_keyword: HashMap<&str, &TrackedTrend> = trends
        .iter()
        .map(|t| (t.canonical_keyword.as_str(), t))
        .collect();

    let mut hot = Vec::new();
    for issue in issues {
        let canonical = normalize_keyword(&issue.keyword);
        let Some(trend) = by_keyword.get(canonical.as_str()) else {
            continue;
        };
        let threshold = issue.mention_threshold.unwrap_or(default_threshold);
        if trend.total_mentions < threshold {
            continue;
        }

        let mut sample_content: Vec<SampleContent> = Vec::new();
        let mut keys = vec![canonical.clone()];
        keys.extend(issue.related_keywords.iter().map(|k| normalize_keyword(k)));
        for key in keys {
            if sample_content.len() >= HOT_ISSUE_SAMPLE_CAP {
                break;
            }
            if let Some(batch) = samples.get(&key) {
                let room = HOT_ISSUE_SAMPLE_CAP - sample_content.len();
                sample_content.extend(batch.iter().take(room).cloned());
            }
        }

        let sentiment_breakdown =
            SentimentBreakdown::from_texts(sample_content.iter().map(|s| s.text.as_str()));

        tracing::info!(
            keyword = %canonical,
            mentions = trend.total_mentions,
            threshold,
            "hot issue detected"
        );

        hot.push(HotIssueSnapshot {
            keyword: canonical,
            mentions: trend.total_mentions,
            sentiment_breakdown,
            sample_content,
            priority: issue.priority,
            should_auto_generate: issue.auto_generate,
            timestamp: now,
        });
    }

    hot
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn trend(keyword: &str, score: f64, total: u64, status: TrendStatus) -> TrackedTrend {
        let mut t = TrackedTrend::seed(keyword.to_string(), Utc::now());
        t.score = score;
        t.total_mentions = total;
        t.status = status;
        t
    }

    fn issue(keyword: &str, threshold: Option<u64>) -> TrackedIssueConfig {
        TrackedIssueConfig {
            keyword: keyword.to_string(),
            description: String::new(),
            related_keywords: vec![],
            priority: 5,
            auto_generate: true,
            mention_threshold: threshold,
        }
    }

    #[test]
    fn snapshot_excludes_archived_and_ranks_by_score() {
        let trends = vec![
            trend("low", 1.0, 10, TrendStatus::Active),
            trend("high", 9.0, 100, TrendStatus::Active),
            trend("gone", 99.0, 9000, TrendStatus::Archived),
            trend("mid", 5.0, 50, TrendStatus::Declining),
        ];
        let snapshot = build_snapshot(&trends, 50, Utc::now());
        let keywords: Vec<_> = snapshot
            .entries
            .iter()
            .map(|e| e.canonical_keyword.as_str())
            .collect();
        assert_eq!(keywords, vec!["high", "mid", "low"]);
        assert_eq!(snapshot.entries[0].rank, 1);
        assert_eq!(snapshot.entries[2].rank, 3);
    }

    #[test]
    fn snapshot_truncates_to_top_n() {
        let trends: Vec<TrackedTrend> = (0..60)
            .map(|i| trend(&format!("kw{i:02}"), f64::from(i), 10, TrendStatus::Active))
            .collect();
        let snapshot = build_snapshot(&trends, 50, Utc::now());
        assert_eq!(snapshot.entries.len(), 50);
        assert_eq!(snapshot.entries[0].canonical_keyword, "kw59");
    }

    #[test]
    fn snapshot_tie_breaks_by_recency() {
        let now = Utc::now();
        let mut a = trend("older", 5.0, 10, TrendStatus::Active);
        a.last_update = now - Duration::hours(1);
        let mut b = trend("newer", 5.0, 10, TrendStatus::Active);
        b.last_update = now;
        let snapshot = build_snapshot(&[a, b], 50, now);
        assert_eq!(snapshot.entries[0].canonical_keyword, "newer");
    }

    #[test]
    fn hot_issue_raised_at_threshold() {
        let trends = vec![trend("huntrix", 50.0, 1200, TrendStatus::Active)];
        let issues = vec![issue("Huntrix", Some(1000))];
        let samples = HashMap::from([(
            "huntrix".to_string(),
            vec![SampleContent {
                text: "fans celebrate the award".to_string(),
                url: "https://example.com/1".to_string(),
                source: "reddit".to_string(),
                published_at: None,
            }],
        )]);

        let hot = detect_hot_issues(&trends, &issues, &samples, 9999, Utc::now());
        assert_eq!(hot.len(), 1);
        assert_eq!(hot[0].keyword, "huntrix");
        assert_eq!(hot[0].mentions, 1200);
        assert_eq!(hot[0].priority, 5);
        assert!(hot[0].should_auto_generate);
        assert_eq!(hot[0].sentiment_breakdown.positive, 1);
    }

    #[test]
    fn below_threshold_is_quiet() {
        let trends = vec![trend("huntrix", 50.0, 800, TrendStatus::Active)];
        let issues = vec![issue("huntrix", Some(1000))];
        let hot = detect_hot_issues(&trends, &issues, &HashMap::new(), 9999, Utc::now());
        assert!(hot.is_empty());
    }

    #[test]
    fn default_threshold_applies_when_issue_has_none() {
        let trends = vec![trend("huntrix", 50.0, 1100, TrendStatus::Active)];
        let issues = vec![issue("huntrix", None)];
        let hot = detect_hot_issues(&trends, &issues, &HashMap::new(), 1000, Utc::now());
        assert_eq!(hot.len(), 1);
    }

    #[test]
    fn samples_capped_at_fifty() {
        let trends = vec![trend("huntrix", 50.0, 2000, TrendStatus::Active)];
        let issues = vec![issue("huntrix", Some(1000))];
        let many: Vec<SampleContent> = (0..80)
            .map(|i| SampleContent {
                text: format!("sample {i}"),
                url: format!("https://example.com/{i}"),
                source: "reddit".to_string(),
                published_at: None,
            })
            .collect();
        let samples = HashMap::from([("huntrix".to_string(), many)]);

        let hot = detect_hot_issues(&trends, &issues, &samples, 9999, Utc::now());
        assert_eq!(hot[0].sample_content.len(), HOT_ISSUE_SAMPLE_CAP);
    }

    #[test]
    fn related_keyword_samples_fill_remaining_room() {
        let trends = vec![trend("huntrix", 50.0, 2000, TrendStatus::Active)];
        let mut config = issue("huntrix", Some(1000));
        config.related_keywords = vec!["Golden".to_string()];
        let samples = HashMap::from([
            (
                "huntrix".to_string(),
                vec![SampleContent {
                    text: "primary".to_string(),
                    url: "https://example.com/p".to_string(),
                    source: "reddit".to_string(),
                    published_at: None,
                }],
            ),
            (
                "golden".to_string(),
                vec![SampleContent {
                    text: "related".to_string(),
                    url: "https://example.com/r".to_string(),
                    source: "reddit".to_string(),
                    published_at: None,
                }],
            ),
        ]);

        let hot = detect_hot_issues(&trends, &[config], &samples, 9999, Utc::now());
        assert_eq!(hot[0].sample_content.len(), 2);
        assert_eq!(hot[0].sample_content[0].text, "primary");
        assert_eq!(hot[0].sample_content[1].text, "related");
    }
}
