use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::api_types::{ApiCommentThread, ApiCommentThreadListResponse, ApiVideoListResponse};
use crate::models::{Comment, VideoInfo};

const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Practical ceiling for a single commentThreads page.
pub const MAX_COMMENT_BATCH: usize = 100;

static VIDEO_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Video id from a watch/short/embed URL or a bare 11-character id.
pub fn extract_video_id(input: &str) -> Option<String> {
    if VIDEO_ID_RE.is_match(input) {
        return Some(input.to_string());
    }
    let url = Url::parse(input).ok()?;
    let host = url
        .host_str()?
        .trim_start_matches("www.")
        .trim_start_matches("m.");
    match host {
        "youtu.be" => url
            .path_segments()?
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        "youtube.com" => {
            if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
                if !v.is_empty() {
                    return Some(v.into_owned());
                }
            }
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("embed") | Some("v") => segments
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }
}

pub async fn fetch_video_details(
    client: &Client,
    api_key: &str,
    video_id: &str,
) -> Result<VideoInfo> {
    let url = format!("{}/videos", API_BASE_URL);
    let start = std::time::Instant::now();
    debug!("Fetching video details - video_id={}", video_id);

    let resp = client
        .get(&url)
        .query(&[("part", "snippet"), ("id", video_id), ("key", api_key)])
        .send()
        .await
        .with_context(|| format!("Request failed for {}", url))?;
    let resp = resp
        .error_for_status()
        .with_context(|| format!("HTTP error for {}", url))?;
    let list: ApiVideoListResponse = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {}", url))?;

    let item = list
        .items
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Video not found: {}", video_id))?;

    info!(
        "Video details fetch completed - video_id={}, duration={:.2}s",
        video_id,
        start.elapsed().as_secs_f32()
    );

    Ok(VideoInfo {
        video_id: video_id.to_string(),
        title: item.snippet.title,
        channel_title: item.snippet.channel_title,
    })
}

/// Top-level comments for one video, newest page only, capped at
/// [`MAX_COMMENT_BATCH`]. A 403 means comments are disabled for the video;
/// that comes back as an empty batch rather than an error.
pub async fn fetch_comments(
    client: &Client,
    api_key: &str,
    video_id: &str,
    max_results: usize,
) -> Result<Vec<Comment>> {
    let capped = max_results.min(MAX_COMMENT_BATCH);
    if capped < max_results {
        debug!(
            "Comment request capped - requested={}, capped={}",
            max_results, capped
        );
    }

    let url = format!("{}/commentThreads", API_BASE_URL);
    let start = std::time::Instant::now();
    debug!(
        "Fetching comments - video_id={}, max_results={}",
        video_id, capped
    );

    let max_results_param = capped.to_string();
    let resp = client
        .get(&url)
        .query(&[
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", max_results_param.as_str()),
            ("key", api_key),
        ])
        .send()
        .await
        .with_context(|| format!("Request failed for {}", url))?;

    if resp.status() == reqwest::StatusCode::FORBIDDEN {
        warn!(
            "Comments unavailable (403) - video_id={}, likely disabled",
            video_id
        );
        return Ok(Vec::new());
    }

    let resp = resp
        .error_for_status()
        .with_context(|| format!("HTTP error for {}", url))?;
    let list: ApiCommentThreadListResponse = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {}", url))?;

    let comments = normalize_comments(list.items.into_iter().map(comment_from_thread).collect());

    info!(
        "Comment fetch completed - video_id={}, duration={:.2}s, comments={}",
        video_id,
        start.elapsed().as_secs_f32(),
        comments.len()
    );

    Ok(comments)
}

fn comment_from_thread(thread: ApiCommentThread) -> Comment {
    let snippet = thread.snippet.top_level_comment.snippet;
    Comment {
        id: thread.id,
        text: snippet.text_display,
        author: snippet.author_display_name,
        like_count: snippet.like_count,
        // missing or malformed timestamps pin to the epoch instead of
        // dropping the comment
        published_at: snippet.published_at.parse().unwrap_or(DateTime::UNIX_EPOCH),
    }
}

/// Comment text arrives as display HTML. Strip tags, decode the entities
/// YouTube actually emits, and collapse stray whitespace.
pub fn normalize_comments(mut comments: Vec<Comment>) -> Vec<Comment> {
    for c in comments.iter_mut() {
        c.text = normalize_text(&c.text);
        c.author = c.author.trim().to_string();
    }
    comments
}

fn normalize_text(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, " ");
    let decoded = stripped
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    decoded.split_whitespace().join(" ")
}
