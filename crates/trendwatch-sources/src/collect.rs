//! One poll cycle's collection pass: fan keyword queries out across all
//! enabled sources, tolerate per-source failure, and fold the raw hits
//! into mention records plus sample content.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use trendwatch_core::{normalize_keyword, MentionRecord, SampleContent};

use crate::fingerprint::content_fingerprint;
use crate::sources::MentionSource;
use crate::types::RawHit;

/// Knobs for one collection pass.
#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Hard per-source, per-keyword fetch deadline. A timeout counts as a
    /// fetch failure: zero contribution, logged, cycle continues.
    pub fetch_timeout: Duration,
    /// Keywords in flight at once. Source fetches within a keyword always
    /// run concurrently.
    pub max_concurrent_keywords: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(15),
            max_concurrent_keywords: 4,
        }
    }
}

/// Output of one collection pass.
#[derive(Debug, Default)]
pub struct CollectResult {
    /// One record per (keyword, source) pair that produced hits.
    pub records: Vec<MentionRecord>,
    /// Sample content keyed by canonical keyword. Uncapped here; emitters
    /// cap at their own limits.
    pub samples: HashMap<String, Vec<SampleContent>>,
    /// Names of sources that failed or timed out at least once this pass.
    pub failed_sources: Vec<&'static str>,
}

/// Collect mentions for a set of keywords across all enabled sources.
///
/// Failure of any individual source degrades coverage, not correctness:
/// the failing source contributes zero records for that keyword and the
/// failure is logged at warn. Hits are deduplicated per keyword by
/// source+URL fingerprint before counting.
pub async fn collect_keywords(
    sources: &[MentionSource],
    keywords: &[String],
    options: CollectOptions,
    now: DateTime<Utc>,
) -> CollectResult {
    // Collected into a Vec first so the futures carry a concrete lifetime;
    // mapping lazily inside the stream trips rustc's higher-ranked auto-trait
    // check and the whole future loses `Send`.
    let fetches: Vec<_> = keywords
        .iter()
        .map(|keyword| collect_one_keyword(sources, keyword, options.fetch_timeout, now))
        .collect();
    let per_keyword: Vec<KeywordCollection> = stream::iter(fetches)
        .buffer_unordered(options.max_concurrent_keywords.max(1))
        .collect()
        .await;

    let mut result = CollectResult::default();
    let mut failed: HashSet<&'static str> = HashSet::new();

    for collection in per_keyword {
        result.records.extend(collection.records);
        failed.extend(collection.failed_sources);
        if !collection.samples.is_empty() {
            result
                .samples
                .entry(normalize_keyword(&collection.keyword))
                .or_default()
                .extend(collection.samples);
        }
    }

    result.failed_sources = failed.into_iter().collect();
    result.failed_sources.sort_unstable();
    result
}

struct KeywordCollection {
    keyword: String,
    records: Vec<MentionRecord>,
    samples: Vec<SampleContent>,
    failed_sources: Vec<&'static str>,
}

async fn collect_one_keyword(
    sources: &[MentionSource],
    keyword: &str,
    fetch_timeout: Duration,
    now: DateTime<Utc>,
) -> KeywordCollection {
    let enabled: Vec<&MentionSource> = sources.iter().filter(|s| s.descriptor().enabled).collect();

    let fetches = enabled.iter().map(|source| async move {
        let outcome = tokio::time::timeout(fetch_timeout, source.fetch(keyword)).await;
        (source, outcome)
    });
    let outcomes = futures::future::join_all(fetches).await;

    let mut collection = KeywordCollection {
        keyword: keyword.to_string(),
        records: Vec::new(),
        samples: Vec::new(),
        failed_sources: Vec::new(),
    };
    let mut seen_fingerprints: HashSet<String> = HashSet::new();

    for (source, outcome) in outcomes {
        let name = source.name();
        match outcome {
            Ok(Ok(hits)) => {
                let hits: Vec<RawHit> = hits
                    .into_iter()
                    .filter(|h| seen_fingerprints.insert(content_fingerprint(h.source_name, &h.url)))
                    .collect();
                if hits.is_empty() {
                    continue;
                }
                let count: u64 = hits.iter().map(|h| h.raw_count).sum();
                tracing::debug!(keyword, source = name, count, "collected mentions");
                collection.records.push(MentionRecord {
                    keyword: keyword.to_string(),
                    source: name.to_string(),
                    count,
                    observed_at: now,
                    source_reliability: source.descriptor().weight,
                });
                collection.samples.extend(hits.into_iter().map(|h| SampleContent {
                    text: h.text,
                    url: h.url,
                    source: h.source_name.to_string(),
                    published_at: h.published_at,
                }));
            }
            Ok(Err(e)) => {
                tracing::warn!(keyword, source = name, error = %e, "source fetch failed");
                collection.failed_sources.push(name);
            }
            Err(_elapsed) => {
                tracing::warn!(
                    keyword,
                    source = name,
                    timeout_secs = fetch_timeout.as_secs(),
                    "source fetch timed out"
                );
                collection.failed_sources.push(name);
            }
        }
    }

    collection
}
