use chrono::{DateTime, Utc};

/// One raw hit returned by a source for a keyword query.
#[derive(Debug, Clone)]
pub struct RawHit {
    /// Title plus snippet, HTML stripped.
    pub text: String,
    pub url: String,
    pub source_name: &'static str,
    pub published_at: Option<DateTime<Utc>>,
    /// Mention count this hit represents. Feed items count as 1; sources
    /// that report aggregate counters may report more.
    pub raw_count: u64,
}
