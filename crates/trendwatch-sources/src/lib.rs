//! Mention source collectors for trendwatch.
//!
//! Wraps heterogeneous search surfaces (Google News RSS, Bing News RSS,
//! Reddit search) behind one capability interface with a per-source
//! reliability weight. A failed or slow source contributes zero mentions
//! for the cycle and is logged, never aborting the poll.

pub mod collect;
pub mod error;
pub mod types;

mod fingerprint;
mod retry;
mod sources;

pub use collect::{collect_keywords, CollectOptions, CollectResult};
pub use error::SourceError;
pub use fingerprint::content_fingerprint;
pub use sources::{
    build_sources, BingNewsSource, GoogleNewsSource, MentionSource, RedditSource, SourceDescriptor,
};
pub use types::RawHit;
