//! Core domain types and configuration for trendwatch.
//!
//! Holds the shared data model (mention records, tracked trends, the VIP
//! roster), the keyword normalizer that defines trend identity, and the
//! env/YAML configuration loaders. All heavier machinery (collection,
//! aggregation, persistence) lives in the sibling crates.

mod app_config;
mod config;
mod error;
mod normalize;
mod roster;
mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use normalize::normalize_keyword;
pub use roster::{load_roster, Roster, SourceOverride, TrackedIssueConfig, VipEntityConfig};
pub use types::{
    LifecycleThresholds, MentionRecord, SampleContent, ScoreWeights, TierInterval, TrackedTrend,
    TrendStatus,
};
