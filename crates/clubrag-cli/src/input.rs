use std::path::Path;

use anyhow::Context;
use clubrag_core::{collect_hashtags, TrendItem};
use serde::Deserialize;

/// A trend file: either bare hashtags or trending-video records.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TrendFile {
    Hashtags(Vec<String>),
    Items(Vec<TrendItem>),
}

impl TrendFile {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read trend file '{}'", path.display()))?;
        serde_json::from_str(&raw).with_context(|| {
            format!(
                "Trend file '{}' must be a JSON array of hashtags or of {{title, url, hashtags}} records",
                path.display()
            )
        })
    }

    /// Every hashtag in the file, deduplicated, first-seen order.
    pub fn hashtags(&self) -> Vec<String> {
        match self {
            TrendFile::Hashtags(tags) => dedup_hashtags(tags.iter().map(String::as_str)),
            TrendFile::Items(items) => collect_hashtags(items),
        }
    }

    /// The video records, if the file has any.
    pub fn items(&self) -> &[TrendItem] {
        match self {
            TrendFile::Hashtags(_) => &[],
            TrendFile::Items(items) => items,
        }
    }
}

/// Split a comma-separated `--hashtags` value, dropping blanks and repeats.
pub fn split_hashtags(raw: &str) -> Vec<String> {
    dedup_hashtags(raw.split(','))
}

/// Trim each tag, dropping blanks and repeats, first-seen order.
fn dedup_hashtags<'a>(tags: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags.map(str::trim).filter(|t| !t.is_empty()) {
        if !out.iter().any(|seen| seen == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
