use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::{VectorizerBackend, VectorizerConfig};

/// Turns comment text into embeddings and sentiment scores.
///
/// Both operations are fail-open: provider trouble (network, auth, odd
/// response shapes) degrades to the zero vector of `dimensions()` length or
/// a neutral 0.0, logged but never surfaced as an error. A batch therefore
/// always comes back fully populated and index-aligned.
#[async_trait]
pub trait Vectorizer: Send + Sync {
    async fn embed(&self, text: &str) -> Vec<f32>;
    /// Polarity in [-1.0, 1.0]; 0.0 is neutral.
    async fn sentiment(&self, text: &str) -> f32;
    fn dimensions(&self) -> usize;
}

pub fn build_vectorizer(client: &Client, cfg: &VectorizerConfig) -> Arc<dyn Vectorizer> {
    match cfg.backend {
        VectorizerBackend::Remote => {
            if cfg.hf_api_key.is_empty() {
                warn!("No HuggingFace API key configured - remote requests will likely be rejected");
            }
            Arc::new(HuggingFaceVectorizer::new(client.clone(), cfg.clone()))
        }
        VectorizerBackend::Local => Arc::new(HashedVectorizer::new(cfg.embedding_dimensions)),
    }
}

/// HuggingFace inference API client (feature extraction + text classification).
pub struct HuggingFaceVectorizer {
    client: Client,
    cfg: VectorizerConfig,
    // duplicate comments ("first!", emoji spam) are common; batches are
    // small, so the memo can stay unbounded
    memo: Mutex<HashMap<u64, Vec<f32>>>,
}

impl HuggingFaceVectorizer {
    pub fn new(client: Client, cfg: VectorizerConfig) -> Self {
        Self {
            client,
            cfg,
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.cfg.embedding_dimensions]
    }

    async fn call_model(&self, model: &str, text: &str) -> Result<Value> {
        let url = format!("{}/{}", self.cfg.hf_api_base.trim_end_matches('/'), model);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.cfg.hf_api_key)
            .timeout(Duration::from_secs(self.cfg.request_timeout_secs))
            .json(&json!({ "inputs": text, "options": { "wait_for_model": true } }))
            .send()
            .await
            .with_context(|| format!("Request failed for {}", url))?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("HTTP error for {}", url))?;
        let value = resp
            .json()
            .await
            .with_context(|| format!("Decoding JSON for {}", url))?;
        Ok(value)
    }
}

#[async_trait]
impl Vectorizer for HuggingFaceVectorizer {
    async fn embed(&self, text: &str) -> Vec<f32> {
        let key = xxh3_64(text.as_bytes());
        if let Some(hit) = self.memo.lock().unwrap().get(&key).cloned() {
            return hit;
        }
        let vector = match self.call_model(&self.cfg.embedding_model, text).await {
            Ok(value) => match parse_embedding(&value, self.cfg.embedding_dimensions) {
                Some(v) => v,
                None => {
                    warn!(
                        "Unexpected embedding response shape - model={}, using zero vector",
                        self.cfg.embedding_model
                    );
                    self.zero_vector()
                }
            },
            Err(e) => {
                warn!(
                    "Embedding request failed - model={}, error={:#}",
                    self.cfg.embedding_model, e
                );
                self.zero_vector()
            }
        };
        self.memo.lock().unwrap().insert(key, vector.clone());
        vector
    }

    async fn sentiment(&self, text: &str) -> f32 {
        match self.call_model(&self.cfg.sentiment_model, text).await {
            Ok(value) => parse_sentiment(&value).unwrap_or_else(|| {
                warn!(
                    "Unexpected sentiment response shape - model={}, using neutral score",
                    self.cfg.sentiment_model
                );
                0.0
            }),
            Err(e) => {
                warn!(
                    "Sentiment request failed - model={}, error={:#}",
                    self.cfg.sentiment_model, e
                );
                0.0
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.cfg.embedding_dimensions
    }
}

/// Feature-extraction responses come back either as one flat vector or as a
/// row per input; take the first row in the nested case. Anything that is
/// not `dims` numbers long is treated as malformed.
fn parse_embedding(value: &Value, dims: usize) -> Option<Vec<f32>> {
    let arr = value.as_array()?;
    let row = match arr.first()? {
        Value::Array(inner) => inner,
        _ => arr,
    };
    let vector: Vec<f32> = row.iter().map(|v| v.as_f64().unwrap_or(0.0) as f32).collect();
    (vector.len() == dims).then_some(vector)
}

/// Classification responses nest the label list once per input; descend to
/// the first label object and map POSITIVE/NEGATIVE onto a signed score.
fn parse_sentiment(value: &Value) -> Option<f32> {
    let mut v = value;
    while let Some(arr) = v.as_array() {
        v = arr.first()?;
    }
    let label = v.get("label")?.as_str()?;
    let score = v.get("score")?.as_f64()? as f32;
    match label {
        "POSITIVE" => Some(score),
        "NEGATIVE" => Some(-score),
        _ => Some(0.0),
    }
}

/// In-process fallback backend: hashed bag-of-terms embeddings plus a small
/// lexicon for sentiment. No network, deterministic, coarse but usable for
/// smoke runs and tests.
pub struct HashedVectorizer {
    dimensions: usize,
}

const POSITIVE_TERMS: &[&str] = &[
    "good", "great", "excellent", "love", "amazing", "wonderful", "happy", "fantastic",
    "awesome", "best",
];
const NEGATIVE_TERMS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "horrible", "worst", "sad", "angry", "disappointed",
    "poor",
];

impl HashedVectorizer {
    pub fn new(dimensions: usize) -> Self {
        debug!("Local vectorizer ready - dimensions={}", dimensions);
        Self { dimensions }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= 2)
            .map(str::to_string)
            .collect()
    }

    fn features(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let tokens = Self::tokens(text);
        if tokens.is_empty() {
            return vector;
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in tokens {
            *counts.entry(token).or_insert(0) += 1;
        }
        for (token, count) in counts {
            let bucket = (xxh3_64(token.as_bytes()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0 + (count as f32).ln();
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        vector
    }
}

fn lexicon_sentiment(text: &str) -> f32 {
    let mut pos = 0usize;
    let mut neg = 0usize;
    for token in HashedVectorizer::tokens(text) {
        if POSITIVE_TERMS.contains(&token.as_str()) {
            pos += 1;
        } else if NEGATIVE_TERMS.contains(&token.as_str()) {
            neg += 1;
        }
    }
    if pos + neg == 0 {
        return 0.0;
    }
    (pos as f32 - neg as f32) / (pos + neg) as f32
}

#[async_trait]
impl Vectorizer for HashedVectorizer {
    async fn embed(&self, text: &str) -> Vec<f32> {
        self.features(text)
    }

    async fn sentiment(&self, text: &str) -> f32 {
        lexicon_sentiment(text)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
