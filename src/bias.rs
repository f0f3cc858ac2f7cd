use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::models::BiasMetrics;

/// Terms whose bare presence flags a hostile comment section.
const TOXIC_TERMS: &[&str] = &[
    "idiot", "stupid", "hate", "dumb", "moron", "trash", "kill", "shut up", "racist", "sexist",
];

/// Keyword lists behind the three bias axes. Each score is the fraction of
/// the list present anywhere in the batch, so it measures breadth of charged
/// vocabulary, not how often it repeats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasLexicon {
    pub political: Vec<String>,
    pub emotional: Vec<String>,
    pub moral: Vec<String>,
}

impl Default for BiasLexicon {
    fn default() -> Self {
        fn own(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            political: own(&[
                "government",
                "policy",
                "democrat",
                "republican",
                "liberal",
                "conservative",
            ]),
            emotional: own(&["love", "hate", "angry", "happy", "sad", "excited"]),
            moral: own(&["right", "wrong", "good", "bad", "moral", "immoral"]),
        }
    }
}

fn incidence(haystack: &str, keywords: &[String]) -> f32 {
    if keywords.is_empty() {
        return 0.0;
    }
    let hits = keywords
        .iter()
        .filter(|w| haystack.contains(w.as_str()))
        .count();
    hits as f32 / keywords.len() as f32
}

/// Bias scores for a whole batch. Substring matching over the lowercased,
/// space-joined texts, per keyword list; empty input scores zero everywhere.
pub fn score_bias(texts: &[&str], lexicon: &BiasLexicon) -> BiasMetrics {
    let joined = texts.iter().map(|t| t.to_lowercase()).join(" ");
    BiasMetrics {
        political: incidence(&joined, &lexicon.political),
        emotional: incidence(&joined, &lexicon.emotional),
        moral: incidence(&joined, &lexicon.moral),
    }
}

/// Toxic-term hits per comment, capped at 1.0.
pub fn score_toxicity(texts: &[&str]) -> f32 {
    let joined = texts.iter().map(|t| t.to_lowercase()).join(" ");
    let hits = TOXIC_TERMS
        .iter()
        .filter(|w| joined.contains(*w))
        .count();
    (hits as f32 / texts.len().max(1) as f32).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn political_batch_scores_highest_on_the_political_axis() {
        let mut texts: Vec<&str> = Vec::new();
        for _ in 0..15 {
            texts.push("the government policy failed us again");
        }
        for _ in 0..5 {
            texts.push("the weather is cloudy today");
        }
        let metrics = score_bias(&texts, &BiasLexicon::default());
        // two of six political keywords present, none from the other lists
        assert!((metrics.political - 2.0 / 6.0).abs() < 1e-6);
        assert_eq!(metrics.emotional, 0.0);
        assert_eq!(metrics.moral, 0.0);
        assert!(metrics.political > metrics.emotional);
        assert!(metrics.political > metrics.moral);
    }

    #[test]
    fn incidence_counts_presence_not_frequency() {
        let once = score_bias(&["government"], &BiasLexicon::default());
        let many = score_bias(
            &["government government government government"],
            &BiasLexicon::default(),
        );
        assert_eq!(once.political, many.political);
    }

    #[test]
    fn scores_stay_in_unit_range() {
        let all = "government policy democrat republican liberal conservative \
                   love hate angry happy sad excited right wrong good bad moral immoral";
        let metrics = score_bias(&[all], &BiasLexicon::default());
        assert_eq!(metrics.political, 1.0);
        assert_eq!(metrics.emotional, 1.0);
        assert_eq!(metrics.moral, 1.0);

        let empty = score_bias(&[], &BiasLexicon::default());
        assert_eq!(empty, BiasMetrics::default());
    }

    #[test]
    fn matching_is_substring_based() {
        // "goodness" still contains "good"
        let metrics = score_bias(&["such goodness here"], &BiasLexicon::default());
        assert!((metrics.moral - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn empty_keyword_list_scores_zero() {
        let lexicon = BiasLexicon {
            political: Vec::new(),
            ..BiasLexicon::default()
        };
        let metrics = score_bias(&["government policy"], &lexicon);
        assert_eq!(metrics.political, 0.0);
    }

    #[test]
    fn toxicity_counts_distinct_terms_per_comment() {
        let texts = ["you idiot", "what a moron", "fine point", "agreed"];
        // two distinct toxic terms across four comments
        assert!((score_toxicity(&texts) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn toxicity_is_capped_at_one() {
        let texts = ["idiot stupid hate dumb moron trash kill shut up racist sexist"];
        assert_eq!(score_toxicity(&texts), 1.0);
        assert_eq!(score_toxicity(&[]), 0.0);
    }
}
