//! Reddit search mention collector (public JSON listing, no OAuth).

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::sources::SourceDescriptor;
use crate::types::RawHit;

const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
const PAGE_LIMIT: usize = 50;

/// Reddit search listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    selftext: Option<String>,
    permalink: Option<String>,
    created_utc: Option<f64>,
}

pub struct RedditSource {
    client: reqwest::Client,
    pub(crate) descriptor: SourceDescriptor,
    base_url: String,
    max_retries: u32,
    backoff_ms: u64,
}

impl RedditSource {
    #[must_use]
    pub(crate) fn default_descriptor() -> SourceDescriptor {
        SourceDescriptor {
            name: "reddit",
            enabled: true,
            weight: 0.7,
        }
    }

    #[must_use]
    pub(crate) fn new(
        client: reqwest::Client,
        descriptor: SourceDescriptor,
        max_retries: u32,
        backoff_ms: u64,
    ) -> Self {
        Self {
            client,
            descriptor,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries,
            backoff_ms,
        }
    }

    /// Construct against an alternate base URL, for tests.
    #[must_use]
    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            descriptor: Self::default_descriptor(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 0,
            backoff_ms: 1,
        }
    }

    /// Search Reddit posts mentioning a keyword, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Reddit`] if the request fails or the listing
    /// cannot be parsed.
    pub(crate) async fn fetch(&self, keyword: &str) -> Result<Vec<RawHit>, SourceError> {
        let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC).to_string();
        let url = format!(
            "{}/search.json?q={encoded}&sort=new&limit={PAGE_LIMIT}",
            self.base_url
        );

        let listing: Listing = retry_with_backoff(self.max_retries, self.backoff_ms, || async {
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(SourceError::BadStatus {
                    source_name: "reddit",
                    status: response.status(),
                });
            }
            response
                .json::<Listing>()
                .await
                .map_err(|e| SourceError::Reddit(format!("listing parse error: {e}")))
        })
        .await?;

        let base = &self.base_url;
        let hits = listing
            .data
            .children
            .into_iter()
            .filter_map(|post| {
                let data = post.data;
                let permalink = data.permalink?;
                let title = data.title.unwrap_or_default();
                let body = data.selftext.unwrap_or_default();
                let text = if body.is_empty() {
                    title
                } else {
                    format!("{title} {body}")
                };
                if text.trim().is_empty() {
                    return None;
                }
                Some(RawHit {
                    text,
                    url: format!("{base}{permalink}"),
                    source_name: "reddit",
                    published_at: data.created_utc.and_then(epoch_to_datetime),
                    raw_count: 1,
                })
            })
            .collect();

        Ok(hits)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_to_datetime(epoch: f64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(epoch as i64, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_conversion_handles_reasonable_values() {
        let dt = epoch_to_datetime(1_756_000_000.0).expect("valid epoch");
        assert_eq!(dt.timestamp(), 1_756_000_000);
    }
}
