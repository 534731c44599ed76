use std::net::SocketAddr;
use std::path::PathBuf;

use crate::types::{LifecycleThresholds, TierInterval};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub roster_path: PathBuf,
    /// Shared secret for the cron trigger endpoints. Optional in
    /// development only.
    pub cron_secret: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub source_fetch_timeout_secs: u64,
    pub source_user_agent: String,
    pub source_max_retries: u32,
    pub source_retry_backoff_ms: u64,
    /// Size of the emitted top-N trend snapshot.
    pub snapshot_top_n: usize,
    /// Fallback hot-issue mention threshold for issues without one.
    pub hot_issue_threshold: u64,
    pub lifecycle_declining_after: u32,
    pub lifecycle_archive_after: u32,
    /// When set, a mention of an archived canonical keyword re-seeds a
    /// fresh trend under the same key instead of being ignored.
    pub allow_resurrection: bool,
    pub vip_tier2_interval_secs: i64,
    pub vip_tier3_interval_secs: i64,
}

impl AppConfig {
    #[must_use]
    pub fn lifecycle_thresholds(&self) -> LifecycleThresholds {
        LifecycleThresholds {
            declining_after: self.lifecycle_declining_after,
            archive_after: self.lifecycle_archive_after,
        }
    }

    #[must_use]
    pub fn tier_intervals(&self) -> TierInterval {
        TierInterval {
            tier2_secs: self.vip_tier2_interval_secs,
            tier3_secs: self.vip_tier3_interval_secs,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("roster_path", &self.roster_path)
            .field("database_url", &"[redacted]")
            .field("cron_secret", &self.cron_secret.as_ref().map(|_| "[redacted]"))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("source_fetch_timeout_secs", &self.source_fetch_timeout_secs)
            .field("source_user_agent", &self.source_user_agent)
            .field("source_max_retries", &self.source_max_retries)
            .field("source_retry_backoff_ms", &self.source_retry_backoff_ms)
            .field("snapshot_top_n", &self.snapshot_top_n)
            .field("hot_issue_threshold", &self.hot_issue_threshold)
            .field("lifecycle_declining_after", &self.lifecycle_declining_after)
            .field("lifecycle_archive_after", &self.lifecycle_archive_after)
            .field("allow_resurrection", &self.allow_resurrection)
            .field("vip_tier2_interval_secs", &self.vip_tier2_interval_secs)
            .field("vip_tier3_interval_secs", &self.vip_tier3_interval_secs)
            .finish()
    }
}
