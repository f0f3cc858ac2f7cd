use serde::Deserialize;

// YouTube Data API v3 list envelopes. Only the fields we read are modeled;
// partial payloads deserialize to defaults instead of failing the batch.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVideoListResponse {
    #[serde(default)]
    pub items: Vec<ApiVideoItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVideoItem {
    #[serde(default)]
    pub snippet: ApiVideoSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCommentThreadListResponse {
    #[serde(default)]
    pub items: Vec<ApiCommentThread>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCommentThread {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub snippet: ApiCommentThreadSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommentThreadSnippet {
    #[serde(default)]
    pub top_level_comment: ApiTopLevelComment,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiTopLevelComment {
    #[serde(default)]
    pub snippet: ApiCommentSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommentSnippet {
    #[serde(default)]
    pub text_display: String,
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub published_at: String, // RFC3339
}
