use std::collections::HashMap;

use itertools::Itertools;
use unicode_normalization::UnicodeNormalization;

use crate::similarity::{mean_centroid, squared_euclidean};

/// Words too common to anchor a theme. Everything under three characters is
/// dropped by the tokenizer anyway, so only longer fillers are listed.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "with", "you", "that", "this", "have", "from",
    "they", "your", "was", "what", "when", "will", "just", "about", "would", "there", "their",
    "could", "should", "them", "then", "than", "some", "more", "like", "into", "only", "over",
    "such", "very", "much", "even", "know", "been", "can", "who", "out", "get", "has", "all",
    "too", "got", "our", "had", "did", "why", "how", "his", "her", "him", "she", "himself",
    "herself", "mine", "were", "where", "which", "because", "yes", "down", "off", "see", "say",
    "said", "also", "its", "dont", "does", "doesnt", "cant", "wont", "youre", "youve", "youll",
    "ill", "ive", "didnt", "wasnt", "arent", "isnt", "aint", "lets",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    pub key_phrase: String,
    pub headline: String,
}

fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text.nfc().collect::<String>().to_lowercase();
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Theme of one group of comments.
///
/// The key phrase is the most frequent 2- or 3-gram over the filtered tokens
/// (stopwords drop out before windowing, so a phrase can bridge them); ties
/// go to the phrase seen first. The headline is the comment whose embedding
/// sits closest to the group mean. `embeddings` must either be empty (no
/// headline) or align one-to-one with `texts`.
pub fn extract_theme(texts: &[&str], embeddings: &[&[f32]]) -> Theme {
    assert!(
        embeddings.is_empty() || embeddings.len() == texts.len(),
        "embeddings must be absent or aligned with texts"
    );

    // gram -> (count, first-seen rank)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for text in texts {
        let words = tokenize(text);
        for n in 2..=3 {
            if words.len() < n {
                continue;
            }
            for window in words.windows(n) {
                let gram = window.join(" ");
                let rank = counts.len();
                let entry = counts.entry(gram).or_insert((0, rank));
                entry.0 += 1;
            }
        }
    }
    let key_phrase = counts
        .into_iter()
        .sorted_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then_with(|| fa.cmp(fb)))
        .next()
        .map(|(gram, _)| gram)
        .unwrap_or_default();

    let headline = if embeddings.is_empty() {
        String::new()
    } else {
        let centroid = mean_centroid(embeddings);
        let mut best = 0usize;
        let mut best_dist = f32::INFINITY;
        for (i, emb) in embeddings.iter().enumerate() {
            let d = squared_euclidean(emb, &centroid);
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        texts[best].to_string()
    };

    Theme { key_phrase, headline }
}
