//! Composite trend scoring.
//!
//! The score must be monotonically non-decreasing in total mentions, in
//! distinct source count, and in positive growth rate — those three
//! properties are the contract; the weights are tunable.

use std::cmp::Ordering;

use trendwatch_core::{ScoreWeights, TrackedTrend};

/// Compute the composite score for a trend. Never negative.
///
/// `w_vol · ln(1 + mentions) + w_src · sources + w_growth · max(growth, 0)`
/// plus a small additive reliability bonus. The log on volume keeps a
/// single firehose source from drowning out corroboration and growth.
#[must_use]
pub fn score_trend(trend: &TrackedTrend, weights: &ScoreWeights) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let volume = (trend.total_mentions as f64).ln_1p();
    #[allow(clippy::cast_precision_loss)]
    let diversity = trend.unique_source_count() as f64;
    let growth = trend.growth_rate.max(0.0);
    let reliability = trend.avg_reliability.clamp(0.0, 1.0);

    let score = weights.volume * volume
        + weights.diversity * diversity
        + weights.growth * growth
        + weights.reliability * reliability;
    score.max(0.0)
}

/// Ranking order: score descending, ties broken by `last_update`
/// descending (most recently active wins), then canonical keyword
/// ascending so the order is fully deterministic.
#[must_use]
pub fn rank_cmp(a: &TrackedTrend, b: &TrackedTrend) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.last_update.cmp(&a.last_update))
        .then_with(|| a.canonical_keyword.cmp(&b.canonical_keyword))
}

/// Sort trends into ranking order in place.
pub fn rank_trends(trends: &mut [TrackedTrend]) {
    trends.sort_by(rank_cmp);
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use trendwatch_core::TrendStatus;

    use super::*;

    fn trend(keyword: &str) -> TrackedTrend {
        let mut t = TrackedTrend::seed(keyword.to_string(), Utc::now());
        t.total_mentions = 100;
        t.sources = ["twitter".to_string()].into_iter().collect();
        t.avg_reliability = 0.8;
        t.growth_rate = 0.0;
        t.status = TrendStatus::Active;
        t
    }

    #[test]
    fn monotone_in_total_mentions() {
        let weights = ScoreWeights::default();
        let low = trend("a");
        let mut high = trend("a");
        high.total_mentions = low.total_mentions + 500;
        assert!(score_trend(&high, &weights) >= score_trend(&low, &weights));
    }

    #[test]
    fn monotone_in_source_diversity() {
        let weights = ScoreWeights::default();
        let one_source = trend("a");
        let mut three_sources = trend("a");
        three_sources.sources = ["twitter", "youtube", "reddit"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert!(
            score_trend(&three_sources, &weights) >= score_trend(&one_source, &weights),
            "3-source trend must not rank below 1-source trend at equal mentions"
        );
    }

    #[test]
    fn monotone_in_growth_rate() {
        let weights = ScoreWeights::default();
        let stale = trend("a");
        let mut surging = trend("a");
        surging.growth_rate = 2.5;
        assert!(score_trend(&surging, &weights) >= score_trend(&stale, &weights));
    }

    #[test]
    fn negative_growth_does_not_reduce_below_flat() {
        let weights = ScoreWeights::default();
        let flat = trend("a");
        let mut shrinking = trend("a");
        shrinking.growth_rate = -0.9;
        assert_eq!(
            score_trend(&shrinking, &weights),
            score_trend(&flat, &weights),
            "negative growth clamps to zero contribution"
        );
    }

    #[test]
    fn score_never_negative() {
        let weights = ScoreWeights::default();
        let empty = TrackedTrend::seed("a".to_string(), Utc::now());
        assert!(score_trend(&empty, &weights) >= 0.0);
    }

    #[test]
    fn ties_break_by_recency_then_keyword() {
        let now = Utc::now();
        let mut older = trend("alpha");
        let mut newer = trend("beta");
        older.score = 10.0;
        newer.score = 10.0;
        older.last_update = now - Duration::hours(2);
        newer.last_update = now;

        let mut trends = vec![older.clone(), newer.clone()];
        rank_trends(&mut trends);
        assert_eq!(trends[0].canonical_keyword, "beta");

        // Same score, same timestamp: keyword ascending decides.
        older.last_update = now;
        let mut trends = vec![newer, older];
        rank_trends(&mut trends);
        assert_eq!(trends[0].canonical_keyword, "alpha");
    }
}
