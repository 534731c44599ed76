//! Trend aggregation engine for trendwatch.
//!
//! Pure, deterministic logic: deduplicates mention records under canonical
//! keywords, scores trends on volume / source diversity / growth, walks each
//! trend through its active → declining → archived lifecycle, aggregates VIP
//! mentions, and selects the top-N snapshot plus hot-issue alerts. All I/O
//! (collection, persistence) happens in the sibling crates; everything here
//! takes values in and returns values out, which is what makes the poll
//! cycle testable end to end.

pub mod dedup;
pub mod emitter;
pub mod lifecycle;
pub mod pipeline;
pub mod scorer;
pub mod sentiment;
pub mod vip;

pub use dedup::{deduplicate, AggregatedMention};
pub use emitter::{build_snapshot, detect_hot_issues, HotIssueSnapshot, TrendSnapshot, TrendSnapshotEntry};
pub use lifecycle::apply_poll;
pub use pipeline::{keyword_universe, run_cycle, CycleConfig, CycleOutcome};
pub use scorer::{rank_trends, score_trend};
pub use sentiment::{lexicon_score, SentimentBreakdown};
pub use vip::{aggregate_entity, is_due, VipObservation};
