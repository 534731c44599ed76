//! Bing News RSS mention collector.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::sources::{parse_rss_feed, SourceDescriptor};
use crate::types::RawHit;

const DEFAULT_BASE_URL: &str = "https://www.bing.com";

pub struct BingNewsSource {
    client: reqwest::Client,
    pub(crate) descriptor: SourceDescriptor,
    base_url: String,
    max_retries: u32,
    backoff_ms: u64,
}

impl BingNewsSource {
    #[must_use]
    pub(crate) fn default_descriptor() -> SourceDescriptor {
        SourceDescriptor {
            name: "bing_news",
            enabled: true,
            weight: 0.85,
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

    /// Fetch hits from the Bing News RSS search feed for a keyword.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] on network failure, [`SourceError::BadStatus`]
    /// on a non-success response, or [`SourceError::Xml`] on malformed RSS.
    pub(crate) async fn fetch(&self, keyword: &str) -> Result<Vec<RawHit>, SourceError> {
        let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC).to_string();
        let url = format!("{}/news/search?q={encoded}&format=rss", self.base_url);

        let body = retry_with_backoff(self.max_retries, self.backoff_ms, || async {
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(SourceError::BadStatus {
                    source_name: "bing_news",
                    status: response.status(),
                });
            }
            Ok(response.text().await?)
        })
        .await?;

        parse_rss_feed(&body, "bing_news")
    }
}
