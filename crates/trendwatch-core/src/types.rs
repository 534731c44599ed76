use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a keyword from one source at one point in time.
///
/// Produced by the source collectors each poll cycle and discarded after
/// being folded into a [`TrackedTrend`].
#[derive(Debug, Clone, PartialEq)]
pub struct MentionRecord {
    /// Raw keyword string as reported by the source.
    pub keyword: String,
    /// Source name, e.g. `google_news` or `reddit`.
    pub source: String,
    /// Mention count observed this poll.
    pub count: u64,
    pub observed_at: DateTime<Utc>,
    /// Configured reliability weight of the reporting source, in `[0, 1]`.
    pub source_reliability: f64,
}

/// A sample piece of content backing a mention, carried into hot-issue and
/// VIP observation records. Persisted as JSONB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleContent {
    pub text: String,
    pub url: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of a tracked trend.
///
/// Transitions move only forward: `Active` → `Declining` → `Archived`.
/// `Archived` is terminal; an archived trend is excluded from top-N
/// selection but kept for historical queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Active,
    Declining,
    Archived,
}

impl TrendStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrendStatus::Active => "active",
            TrendStatus::Declining => "declining",
            TrendStatus::Archived => "archived",
        }
    }

    /// Parse a status string as stored in the database.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TrendStatus::Active),
            "declining" => Some(TrendStatus::Declining),
            "archived" => Some(TrendStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The durable aggregate for one canonical keyword.
///
/// Identity is `canonical_keyword`, the output of
/// [`crate::normalize_keyword`]; two raw variants with the same normalized
/// form always merge into one trend. `unique_source_count` is exposed as a
/// method over `sources` so the `count == |sources|` invariant cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedTrend {
    pub canonical_keyword: String,
    /// Raw variants that have normalized to this key.
    pub original_variants: BTreeSet<String>,
    /// All-time mention total.
    pub total_mentions: u64,
    /// Mentions observed in the most recent poll period.
    pub daily_mentions: u64,
    pub sources: BTreeSet<String>,
    /// Count-weighted mean reliability across contributing sources.
    pub avg_reliability: f64,
    pub score: f64,
    /// `(current - previous) / max(previous, 1)` for the last two periods.
    pub growth_rate: f64,
    /// Highest single-period mention count seen while growing.
    pub peak_mentions: u64,
    /// Consecutive polls with non-positive growth.
    pub days_without_growth: u32,
    pub first_seen: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub status: TrendStatus,
}

impl TrackedTrend {
    /// Seed a fresh trend on first sighting of a canonical keyword.
    #[must_use]
    pub fn seed(canonical_keyword: String, now: DateTime<Utc>) -> Self {
        Self {
            canonical_keyword,
            original_variants: BTreeSet::new(),
            total_mentions: 0,
            daily_mentions: 0,
            sources: BTreeSet::new(),
            avg_reliability: 0.0,
            score: 0.0,
            growth_rate: 0.0,
            peak_mentions: 0,
            days_without_growth: 0,
            first_seen: now,
            last_update: now,
            status: TrendStatus::Active,
        }
    }

    /// Number of distinct sources that have reported this trend.
    #[must_use]
    pub fn unique_source_count(&self) -> usize {
        self.sources.len()
    }
}

/// Lifecycle thresholds in consecutive growthless polls.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleThresholds {
    /// `days_without_growth` at which an active trend turns declining.
    pub declining_after: u32,
    /// `days_without_growth` at which a trend is archived.
    pub archive_after: u32,
}

impl Default for LifecycleThresholds {
    fn default() -> Self {
        Self {
            declining_after: 3,
            archive_after: 7,
        }
    }
}

/// Weights for the composite trend score.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    /// Applied to `ln(1 + total_mentions)`.
    pub volume: f64,
    /// Applied to the distinct source count.
    pub diversity: f64,
    /// Applied to `max(growth_rate, 0)`.
    pub growth: f64,
    /// Applied to `avg_reliability` as an additive bonus.
    pub reliability: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            volume: 10.0,
            diversity: 5.0,
            growth: 20.0,
            reliability: 2.0,
        }
    }
}

/// Poll interval per VIP tier, in seconds.
///
/// Tier 1 entities are polled on every cycle; tiers 2 and 3 are polled once
/// their last persisted observation is older than the configured interval.
#[derive(Debug, Clone, Copy)]
pub struct TierInterval {
    pub tier2_secs: i64,
    pub tier3_secs: i64,
}

impl Default for TierInterval {
    fn default() -> Self {
        Self {
            tier2_secs: 3_600,
            tier3_secs: 86_400,
        }
    }
}

impl TierInterval {
    /// Minimum seconds between polls for the given tier.
    ///
    /// Tier 1 returns 0 (always due). Unknown tiers fall back to the tier-3
    /// interval, the most conservative cadence.
    #[must_use]
    pub fn for_tier(&self, tier: u8) -> i64 {
        match tier {
            1 => 0,
            2 => self.tier2_secs,
            _ => self.tier3_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            TrendStatus::Active,
            TrendStatus::Declining,
            TrendStatus::Archived,
        ] {
            assert_eq!(TrendStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TrendStatus::parse("resurrected"), None);
    }

    #[test]
    fn seed_starts_active_and_empty() {
        let now = Utc::now();
        let trend = TrackedTrend::seed("bts".to_string(), now);
        assert_eq!(trend.status, TrendStatus::Active);
        assert_eq!(trend.total_mentions, 0);
        assert_eq!(trend.unique_source_count(), 0);
        assert_eq!(trend.first_seen, now);
    }

    #[test]
    fn tier_one_always_due() {
        let intervals = TierInterval::default();
        assert_eq!(intervals.for_tier(1), 0);
        assert_eq!(intervals.for_tier(2), 3_600);
        assert_eq!(intervals.for_tier(3), 86_400);
    }

    #[test]
    fn unknown_tier_uses_slowest_interval() {
        let intervals = TierInterval::default();
        assert_eq!(intervals.for_tier(9), intervals.tier3_secs);
    }
}
