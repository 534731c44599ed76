//! Keyword normalization.
//!
//! The normalizer output is the identity key for a trend: every raw variant
//! that normalizes to the same string is aggregated into one tracked trend.

/// Canonicalize a raw keyword string.
///
/// Trims leading/trailing whitespace, lowercases (Unicode, locale
/// insensitive), and collapses internal runs of whitespace to a single
/// space. Punctuation is preserved, so `"K-pop"` becomes `"k-pop"` with the
/// hyphen intact.
///
/// Deterministic, pure, and idempotent. Spacing/hyphenation variants are NOT
/// merged: `"NewJeans"` and `"New Jeans"` normalize to different strings and
/// stay distinct trends.
#[must_use]
pub fn normalize_keyword(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize_keyword("  BTS  "), "bts");
    }

    #[test]
    fn preserves_internal_punctuation() {
        assert_eq!(normalize_keyword("K-pop"), "k-pop");
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(normalize_keyword("New\t Jeans"), "new jeans");
    }

    #[test]
    fn spacing_variants_stay_distinct() {
        assert_ne!(normalize_keyword("NewJeans"), normalize_keyword("New Jeans"));
    }

    #[test]
    fn unicode_lowercase() {
        assert_eq!(normalize_keyword("ÆSPA"), "æspa");
    }

    #[test]
    fn idempotent() {
        for raw in ["  BTS ", "K-Pop", "New  Jeans", "æspa", "", "  "] {
            let once = normalize_keyword(raw);
            assert_eq!(normalize_keyword(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn empty_input_yields_empty() {
        assert_eq!(normalize_keyword("   "), "");
    }
}
