//! Lexicon sentiment scoring for hot-issue breakdowns.

use serde::{Deserialize, Serialize};

/// Word weights for entertainment/community news.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("love", 0.5),
    ("loved", 0.5),
    ("best", 0.5),
    ("amazing", 0.5),
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("win", 0.4),
    ("won", 0.4),
    ("award", 0.4),
    ("record", 0.3),
    ("hit", 0.3),
    ("debut", 0.3),
    ("comeback", 0.3),
    ("celebrate", 0.4),
    ("praise", 0.4),
    ("popular", 0.3),
    ("trending", 0.3),
    ("success", 0.4),
    ("milestone", 0.3),
    // Negative signals
    ("scandal", -0.7),
    ("controversy", -0.6),
    ("lawsuit", -0.5),
    ("ban", -0.6),
    ("banned", -0.6),
    ("hate", -0.6),
    ("plagiarism", -0.6),
    ("disband", -0.5),
    ("injury", -0.4),
    ("injured", -0.4),
    ("cancelled", -0.5),
    ("canceled", -0.5),
    ("apology", -0.3),
    ("apologize", -0.3),
    ("criticism", -0.4),
    ("boycott", -0.6),
    ("leak", -0.4),
    ("lawsuits", -0.5),
    ("worst", -0.6),
    ("terrible", -0.6),
];

/// Score a text string using the domain lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        for &(lex_word, weight) in LEXICON {
            if w == lex_word {
                score += weight;
                break;
            }
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Counts of sample texts by sentiment polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl SentimentBreakdown {
    /// Classify each text with the lexicon and tally the polarities.
    #[must_use]
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut breakdown = Self::default();
        for text in texts {
            let score = lexicon_score(text);
            if score > 0.0 {
                breakdown.positive += 1;
            } else if score < 0.0 {
                breakdown.negative += 1;
            } else {
                breakdown.neutral += 1;
            }
        }
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = lexicon_score("the comeback was amazing");
        assert!(score > 0.0, "expected positive score, got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = lexicon_score("plagiarism scandal erupts");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn score_clamps_to_unit_interval() {
        let positive = "amazing best love excellent win award success milestone";
        assert_eq!(lexicon_score(positive), 1.0);
        let negative = "scandal controversy lawsuit banned hate plagiarism boycott worst";
        assert_eq!(lexicon_score(negative), -1.0);
    }

    #[test]
    fn punctuation_stripped_from_words() {
        let score = lexicon_score("amazing!");
        assert!(score > 0.0, "expected positive score for 'amazing!', got {score}");
    }

    #[test]
    fn breakdown_tallies_polarities() {
        let breakdown = SentimentBreakdown::from_texts([
            "fans celebrate the award",
            "weather report for tuesday",
            "plagiarism scandal again",
        ]);
        assert_eq!(
            breakdown,
            SentimentBreakdown {
                positive: 1,
                neutral: 1,
                negative: 1
            }
        );
    }
}
