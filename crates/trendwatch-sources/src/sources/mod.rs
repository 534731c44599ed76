//! Concrete mention sources behind one capability surface.

mod bing_news;
mod google_news;
mod reddit;
mod rss;

pub(crate) use rss::parse_rss_feed;

use trendwatch_core::{AppConfig, Roster};

use crate::error::SourceError;
use crate::types::RawHit;

pub use bing_news::BingNewsSource;
pub use google_news::GoogleNewsSource;
pub use reddit::RedditSource;

/// Capability descriptor for a mention source.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub name: &'static str,
    pub enabled: bool,
    /// Reliability weight in `(0, 1]`, folded into `avg_reliability`.
    pub weight: f64,
}

/// A configured mention source.
///
/// Closed set of concrete collectors; each variant knows how to query its
/// surface for a keyword and return raw hits. Dispatch is by match rather
/// than trait objects so `fetch` can stay a plain `async fn`.
pub enum MentionSource {
    GoogleNews(GoogleNewsSource),
    BingNews(BingNewsSource),
    Reddit(RedditSource),
}

impl MentionSource {
    #[must_use]
    pub fn descriptor(&self) -> &SourceDescriptor {
        match self {
            MentionSource::GoogleNews(s) => &s.descriptor,
            MentionSource::BingNews(s) => &s.descriptor,
            MentionSource::Reddit(s) => &s.descriptor,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Fetch raw hits for one keyword.
    ///
    /// Transient HTTP failures are retried internally with back-off; the
    /// caller sees only the final outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the final attempt fails. Callers treat
    /// this as a zero-contribution source for the cycle.
    pub async fn fetch(&self, keyword: &str) -> Result<Vec<RawHit>, SourceError> {
        match self {
            MentionSource::GoogleNews(s) => s.fetch(keyword).await,
            MentionSource::BingNews(s) => s.fetch(keyword).await,
            MentionSource::Reddit(s) => s.fetch(keyword).await,
        }
    }
}

/// Build the full source set from app config and roster overrides.
///
/// Every known source is constructed; roster overrides adjust `enabled`
/// and `weight` per source name. Disabled sources are kept in the list
/// (callers skip them) so an override typo surfaces in logs rather than
/// silently changing the set.
#[must_use]
pub fn build_sources(config: &AppConfig, roster: &Roster) -> Vec<MentionSource> {
    let client = reqwest::Client::builder()
        .user_agent(config.source_user_agent.clone())
        .build()
        .unwrap_or_default();

    let apply = |mut descriptor: SourceDescriptor| -> SourceDescriptor {
        if let Some(o) = roster.source_override(descriptor.name) {
            descriptor.enabled = o.enabled;
            descriptor.weight = o.weight;
        }
        descriptor
    };

    let retries = config.source_max_retries;
    let backoff_ms = config.source_retry_backoff_ms;

    vec![
        MentionSource::GoogleNews(GoogleNewsSource::new(
            client.clone(),
            apply(GoogleNewsSource::default_descriptor()),
            retries,
            backoff_ms,
        )),
        MentionSource::BingNews(BingNewsSource::new(
            client.clone(),
            apply(BingNewsSource::default_descriptor()),
            retries,
            backoff_ms,
        )),
        MentionSource::Reddit(RedditSource::new(
            client,
            apply(RedditSource::default_descriptor()),
            retries,
            backoff_ms,
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendwatch_core::SourceOverride;

    fn test_config() -> AppConfig {
        // Minimal env for config construction in tests.
        let roster = Roster::default();
        drop(roster);
        AppConfig {
            database_url: "postgres://localhost/test".to_string(),
            env: trendwatch_core::Environment::Test,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "info".to_string(),
            roster_path: "./roster.yaml".into(),
            cron_secret: Some("secret".to_string()),
            db_max_connections: 1,
            db_min_connections: 1,
            db_acquire_timeout_secs: 1,
            source_fetch_timeout_secs: 5,
            source_user_agent: "trendwatch-test".to_string(),
            source_max_retries: 0,
            source_retry_backoff_ms: 1,
            snapshot_top_n: 50,
            hot_issue_threshold: 1000,
            lifecycle_declining_after: 3,
            lifecycle_archive_after: 7,
            allow_resurrection: false,
            vip_tier2_interval_secs: 3600,
            vip_tier3_interval_secs: 86400,
        }
    }

    #[test]
    fn builds_all_known_sources() {
        let sources = build_sources(&test_config(), &Roster::default());
        let names: Vec<_> = sources.iter().map(MentionSource::name).collect();
        assert_eq!(names, vec!["google_news", "bing_news", "reddit"]);
        assert!(sources.iter().all(|s| s.descriptor().enabled));
    }

    #[test]
    fn roster_override_disables_and_reweights() {
        let roster = Roster {
            sources: vec![SourceOverride {
                name: "reddit".to_string(),
                enabled: false,
                weight: 0.5,
            }],
            ..Roster::default()
        };
        let sources = build_sources(&test_config(), &roster);
        let reddit = sources
            .iter()
            .find(|s| s.name() == "reddit")
            .expect("reddit source present");
        assert!(!reddit.descriptor().enabled);
        assert!((reddit.descriptor().weight - 0.5).abs() < f64::EPSILON);
    }
}
