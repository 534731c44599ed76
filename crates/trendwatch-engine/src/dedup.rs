//! Mention deduplication.
//!
//! Folds per-source mention records into one aggregate per canonical
//! keyword. The merge is commutative and associative — sources are polled
//! independently and partial results may be merged in any order.

use std::collections::{BTreeMap, BTreeSet};

use trendwatch_core::{normalize_keyword, MentionRecord};

/// All mentions of one canonical keyword across sources, after dedup.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedMention {
    pub canonical_keyword: String,
    /// Sum of mention counts over all merged records.
    pub total_mentions: u64,
    pub sources: BTreeSet<String>,
    /// Raw keyword spellings that normalized to this key.
    pub original_variants: BTreeSet<String>,
    /// Σ (count × source reliability), kept separately from the mean so
    /// merging stays associative.
    pub reliability_mass: f64,
}

impl AggregatedMention {
    fn new(canonical_keyword: String) -> Self {
        Self {
            canonical_keyword,
            total_mentions: 0,
            sources: BTreeSet::new(),
            original_variants: BTreeSet::new(),
            reliability_mass: 0.0,
        }
    }

    fn fold(&mut self, record: MentionRecord) {
        self.total_mentions += record.count;
        #[allow(clippy::cast_precision_loss)]
        {
            self.reliability_mass += record.count as f64 * record.source_reliability;
        }
        self.sources.insert(record.source);
        self.original_variants.insert(record.keyword);
    }

    /// Count-weighted mean reliability of the contributing sources.
    #[must_use]
    pub fn avg_reliability(&self) -> f64 {
        if self.total_mentions == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.reliability_mass / self.total_mentions as f64
        }
    }

    /// Merge another aggregate for the same canonical keyword into this one.
    pub fn merge(&mut self, other: AggregatedMention) {
        debug_assert_eq!(self.canonical_keyword, other.canonical_keyword);
        self.total_mentions += other.total_mentions;
        self.reliability_mass += other.reliability_mass;
        self.sources.extend(other.sources);
        self.original_variants.extend(other.original_variants);
    }
}

/// Group mention records by their canonical keyword.
///
/// Records whose raw keywords normalize to the same string merge into one
/// aggregate; everything else stays distinct. Records normalizing to the
/// empty string are dropped. Output order follows the canonical keyword
/// (callers must not rely on it).
#[must_use]
pub fn deduplicate(records: impl IntoIterator<Item = MentionRecord>) -> Vec<AggregatedMention> {
    let mut groups: BTreeMap<String, AggregatedMention> = BTreeMap::new();

    for record in records {
        let canonical = normalize_keyword(&record.keyword);
        if canonical.is_empty() {
            continue;
        }
        groups
            .entry(canonical.clone())
            .or_insert_with(|| AggregatedMention::new(canonical))
            .fold(record);
    }

    groups.into_values().collect()
}
