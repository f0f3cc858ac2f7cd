use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bias::BiasLexicon;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// YouTube Data API v3 key. Falls back to the YOUTUBE_API_KEY
    /// environment variable when empty.
    pub youtube_api_key: String,
    pub vectorizer: VectorizerConfig,
    pub clustering: ClusterCountPolicy,
    pub bias_lexicon: BiasLexicon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    pub backend: VectorizerBackend,
    /// HuggingFace inference token. Falls back to HF_API_KEY when empty.
    pub hf_api_key: String,
    pub hf_api_base: String,
    pub embedding_model: String,
    pub sentiment_model: String,
    pub embedding_dimensions: usize,
    pub request_timeout_secs: u64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            backend: VectorizerBackend::Local,
            hf_api_key: String::new(),
            hf_api_base: "https://api-inference.huggingface.co/models".to_string(),
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            sentiment_model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            embedding_dimensions: 384,
            request_timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorizerBackend {
    /// HuggingFace inference API over HTTP.
    Remote,
    /// In-process hashed bag-of-terms vectors plus a lexicon sentiment.
    #[default]
    Local,
}

/// How many clusters to ask for given the batch size. Small batches get
/// 2-3 clusters, batches of 15+ get 3-5, and the result always lands in
/// [overall_min, overall_max].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterCountPolicy {
    pub large_batch: usize,
    pub large_divisor: usize,
    pub large_min: usize,
    pub large_max: usize,
    pub small_divisor: usize,
    pub small_min: usize,
    pub small_max: usize,
    pub overall_min: usize,
    pub overall_max: usize,
}

impl Default for ClusterCountPolicy {
    fn default() -> Self {
        Self {
            large_batch: 15,
            large_divisor: 10,
            large_min: 3,
            large_max: 5,
            small_divisor: 7,
            small_min: 2,
            small_max: 3,
            overall_min: 2,
            overall_max: 5,
        }
    }
}

impl ClusterCountPolicy {
    pub fn choose_k(&self, n: usize) -> usize {
        let k = if n >= self.large_batch {
            (n / self.large_divisor).clamp(self.large_min, self.large_max)
        } else {
            (n / self.small_divisor).clamp(self.small_min, self.small_max)
        };
        k.clamp(self.overall_min, self.overall_max)
    }
}

impl AnalyzerConfig {
    /// Defaults plus environment overrides, for running without a config file.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    fn apply_env(&mut self) {
        if self.youtube_api_key.is_empty() {
            if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
                self.youtube_api_key = key;
            }
        }
        if self.vectorizer.hf_api_key.is_empty() {
            if let Ok(key) = std::env::var("HF_API_KEY") {
                self.vectorizer.hf_api_key = key;
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<AnalyzerConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Reading config file {}", path.display()))?;
    let mut cfg: AnalyzerConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Parsing config file {}", path.display()))?;
    cfg.apply_env();
    Ok(cfg)
}
