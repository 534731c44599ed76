//! VIP mention monitoring.
//!
//! A simpler, closed-vocabulary parallel of the trend pipeline: each
//! configured entity is polled with its fixed keyword list, mentions are
//! summed, and a timestamped observation is emitted. VIPs carry no
//! lifecycle state and are never archived.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trendwatch_core::{
    normalize_keyword, MentionRecord, SampleContent, TierInterval, VipEntityConfig,
};

/// Sample content carried on a VIP observation, capped at this many items.
pub const VIP_SAMPLE_CAP: usize = 20;

/// One per-entity aggregation result for a poll cycle. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VipObservation {
    pub entity_id: String,
    pub name: String,
    pub tier: u8,
    pub total_mentions: u64,
    pub sources: BTreeSet<String>,
    pub sample_content: Vec<SampleContent>,
    pub observed_at: DateTime<Utc>,
}

/// Whether an entity is due for polling this cycle.
///
/// Compares the age of the last persisted observation against the tier's
/// configured interval; an entity with no prior observation is always due.
/// This replaces wall-clock-minute windows, so cycle-timing jitter cannot
/// skip an hour.
#[must_use]
pub fn is_due(
    tier: u8,
    intervals: TierInterval,
    last_polled: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let Some(last) = last_polled else {
        return true;
    };
    (now - last).num_seconds() >= intervals.for_tier(tier)
}

/// Aggregate the collected mentions that belong to one VIP entity.
///
/// A record belongs to the entity when its keyword normalizes to one of
/// the entity's keywords. Samples are passed in keyed the same way and
/// capped at [`VIP_SAMPLE_CAP`].
#[must_use]
pub fn aggregate_entity(
    entity: &VipEntityConfig,
    records: &[MentionRecord],
    samples: &[SampleContent],
    now: DateTime<Utc>,
) -> VipObservation {
    let keys: BTreeSet<String> = entity.keywords.iter().map(|k| normalize_keyword(k)).collect();

    let mut total_mentions = 0u64;
    let mut sources = BTreeSet::new();
    for record in records {
        if keys.contains(&normalize_keyword(&record.keyword)) {
            total_mentions += record.count;
            sources.insert(record.source.clone());
        }
    }

    VipObservation {
        entity_id: entity.id.clone(),
        name: entity.name.clone(),
        tier: entity.tier,
        total_mentions,
        sources,
        sample_content: samples.iter().take(VIP_SAMPLE_CAP).cloned().collect(),
        observed_at: now,
    }
}
