//! Trend lifecycle management.
//!
//! Each poll recomputes the growth rate from the last two periods, updates
//! the growthless-poll counter, and derives the status from that counter.
//! Transitions only move forward along active → declining → archived;
//! archived is terminal.

use chrono::{DateTime, Utc};

use trendwatch_core::{LifecycleThresholds, TrackedTrend, TrendStatus};

/// Fold one poll period's mention count into a trend's lifecycle state.
///
/// `growth_rate = (current - previous) / max(previous, 1)`. Non-positive
/// growth increments `days_without_growth`; positive growth resets it and
/// raises `peak_mentions`. Status is then derived purely from the updated
/// counter. Archived trends are left untouched — callers decide whether to
/// re-seed them (resurrection) before getting here.
pub fn apply_poll(
    trend: &mut TrackedTrend,
    current_period_mentions: u64,
    thresholds: LifecycleThresholds,
    now: DateTime<Utc>,
) {
    if trend.status == TrendStatus::Archived {
        return;
    }

    let previous = trend.daily_mentions;
    #[allow(clippy::cast_precision_loss)]
    let growth = (current_period_mentions as f64 - previous as f64) / previous.max(1) as f64;

    trend.growth_rate = growth;
    if growth <= 0.0 {
        trend.days_without_growth += 1;
    } else {
        trend.days_without_growth = 0;
        trend.peak_mentions = trend.peak_mentions.max(current_period_mentions);
    }
    trend.daily_mentions = current_period_mentions;
    trend.status = next_status(trend.status, trend.days_without_growth, thresholds);
    trend.last_update = now;
}

/// Derive the post-poll status. Forward-only: the result never sits
/// earlier in the lifecycle than `current`.
#[must_use]
pub(crate) fn next_status(
    current: TrendStatus,
    days_without_growth: u32,
    thresholds: LifecycleThresholds,
) -> TrendStatus {
    let candidate = if days_without_growth >= thresholds.archive_after {
        TrendStatus::Archived
    } else if days_without_growth >= thresholds.declining_after {
        TrendStatus::Declining
    } else {
        TrendStatus::Active
    };

    if rank(candidate) >= rank(current) {
        candidate
    } else {
        current
    }
}

fn rank(status: TrendStatus) -> u8 {
    match status {
        TrendStatus::Active => 0,
        TrendStatus::Declining => 1,
        TrendStatus::Archived => 2,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn thresholds() -> LifecycleThresholds {
        LifecycleThresholds {
            declining_after: 3,
            archive_after: 7,
        }
    }

    fn trend_with(previous_period: u64) -> TrackedTrend {
        let mut t = TrackedTrend::seed("bts".to_string(), Utc::now());
        t.daily_mentions = previous_period;
        t.total_mentions = previous_period;
        t
    }

    #[test]
    fn growth_resets_counter_and_raises_peak() {
        let mut t = trend_with(100);
        t.days_without_growth = 2;
        apply_poll(&mut t, 150, thresholds(), Utc::now());
        assert!((t.growth_rate - 0.5).abs() < 1e-9);
        assert_eq!(t.days_without_growth, 0);
        assert_eq!(t.peak_mentions, 150);
        assert_eq!(t.daily_mentions, 150);
        assert_eq!(t.status, TrendStatus::Active);
    }

    #[test]
    fn first_sighting_growth_uses_max_previous_one() {
        let mut t = trend_with(0);
        apply_poll(&mut t, 1200, thresholds(), Utc::now());
        assert!((t.growth_rate - 1200.0).abs() < 1e-9);
        assert_eq!(t.peak_mentions, 1200);
    }

    #[test]
    fn flat_period_counts_as_no_growth() {
        let mut t = trend_with(100);
        apply_poll(&mut t, 100, thresholds(), Utc::now());
        assert_eq!(t.growth_rate, 0.0);
        assert_eq!(t.days_without_growth, 1);
        assert_eq!(t.status, TrendStatus::Active);
    }

    #[test]
    fn declining_at_low_threshold() {
        let mut t = trend_with(100);
        for _ in 0..3 {
            apply_poll(&mut t, 100, thresholds(), Utc::now());
        }
        assert_eq!(t.days_without_growth, 3);
        assert_eq!(t.status, TrendStatus::Declining);
    }

    #[test]
    fn archived_at_high_threshold() {
        let mut t = trend_with(100);
        for _ in 0..7 {
            apply_poll(&mut t, 50, thresholds(), Utc::now());
        }
        assert_eq!(t.status, TrendStatus::Archived);
    }

    #[test]
    fn declining_does_not_return_to_active() {
        let mut t = trend_with(100);
        for _ in 0..3 {
            apply_poll(&mut t, 100, thresholds(), Utc::now());
        }
        assert_eq!(t.status, TrendStatus::Declining);

        // Growth resumes; the counter resets but status stays declining.
        apply_poll(&mut t, 500, thresholds(), Utc::now());
        assert_eq!(t.days_without_growth, 0);
        assert_eq!(t.status, TrendStatus::Declining);
    }

    #[test]
    fn archived_is_terminal_under_apply_poll() {
        let mut t = trend_with(100);
        for _ in 0..7 {
            apply_poll(&mut t, 0, thresholds(), Utc::now());
        }
        assert_eq!(t.status, TrendStatus::Archived);

        let before = t.clone();
        // Mentions resume; the archived record must not move.
        apply_poll(&mut t, 10_000, thresholds(), Utc::now());
        assert_eq!(t, before, "archived trend must be left untouched");
    }

    #[test]
    fn next_status_is_forward_only() {
        let th = thresholds();
        assert_eq!(next_status(TrendStatus::Active, 0, th), TrendStatus::Active);
        assert_eq!(next_status(TrendStatus::Active, 3, th), TrendStatus::Declining);
        assert_eq!(next_status(TrendStatus::Active, 7, th), TrendStatus::Archived);
        assert_eq!(next_status(TrendStatus::Declining, 0, th), TrendStatus::Declining);
        assert_eq!(next_status(TrendStatus::Archived, 0, th), TrendStatus::Archived);
    }
}
