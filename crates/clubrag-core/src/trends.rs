use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[allow(clippy::expect_used)]
static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("hashtag pattern is valid"));

/// A trending short video surfaced by a scraper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendItem {
    /// Video title.
    pub title: String,
    /// Link to the video.
    #[serde(alias = "video_url")]
    pub url: String,
    /// Hashtags found in the video description.
    #[serde(default)]
    pub hashtags: Vec<String>,
}

impl TrendItem {
    /// Create a trend item.
    pub fn new(title: impl Into<String>, url: impl Into<String>, hashtags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            hashtags,
        }
    }

    /// One-line rendering used in generation prompts: `- title (url) #a, #b`.
    pub fn prompt_line(&self) -> String {
        let line = format!("- {} ({}) {}", self.title, self.url, self.hashtags.join(", "));
        line.trim_end().to_string()
    }
}

/// Hashtags (`#` followed by word characters) found in free text.
///
/// Returned in first-seen order without duplicates.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|tag| seen.insert(*tag))
        .map(str::to_string)
        .collect()
}

/// All hashtags carried by a list of trend items, deduplicated in first-seen order.
pub fn collect_hashtags(items: &[TrendItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .flat_map(|item| item.hashtags.iter())
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}
