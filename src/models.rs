use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub like_count: i64,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,       // e.g., "cluster-0"
    pub theme: String,    // dominant key phrase, may be empty
    pub headline: String, // most central comment text
    pub comments: Vec<Comment>,
    pub sentiment: f32, // [-1.0, 1.0]
    pub size: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasMetrics {
    pub political: f32, // [0.0, 1.0]
    pub emotional: f32, // [0.0, 1.0]
    pub moral: f32,     // [0.0, 1.0]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub clusters: Vec<Cluster>,
    pub diversity_score: f32,
    pub bias_metrics: BiasMetrics,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
}

/// Per-video output: video metadata, the analysis proper, and the
/// presentation-level toxicity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoReport {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub toxicity: f32, // [0.0, 1.0]
}
