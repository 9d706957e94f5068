use clubrag_core::{OrganizationProfile, ProfileSection, RagError, RagResult};
use serde::{Deserialize, Serialize};

/// Section label attached to chunks built from trend signals.
pub const TRENDING_SECTION: &str = "trending_hashtags";

const KEYWORDS_PREFIX: &str = "Company keywords: ";
const TRENDING_PREFIX: &str = "Trending hashtags: ";

/// Atomic unit of retrievable knowledge: a piece of text plus its provenance.
///
/// The content is never empty or whitespace-only; deserializing such a chunk fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChunkRecord")]
pub struct Chunk {
    content: String,
    section: String,
}

#[derive(Deserialize)]
struct ChunkRecord {
    content: String,
    section: String,
}

impl TryFrom<ChunkRecord> for Chunk {
    type Error = String;

    fn try_from(record: ChunkRecord) -> Result<Self, Self::Error> {
        Chunk::new(record.content, record.section)
            .ok_or_else(|| "chunk content must not be blank".to_string())
    }
}

impl Chunk {
    /// Create a chunk, or `None` when `content` is blank.
    pub fn new(content: impl Into<String>, section: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return None;
        }
        Some(Self {
            content,
            section: section.into(),
        })
    }

    /// The chunk text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Provenance label (profile section name or [`TRENDING_SECTION`]).
    pub fn section(&self) -> &str {
        &self.section
    }
}

/// Chunking knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingPolicy {
    /// Maximum number of hashtags folded into one trend chunk.
    #[serde(default = "default_trend_batch_size")]
    pub trend_batch_size: usize,
    /// A paragraph is kept only when its trimmed length (in characters) exceeds this.
    ///
    /// The default of 0 keeps every non-blank paragraph. Set 20 to drop short fragments.
    #[serde(default)]
    pub min_paragraph_chars: usize,
}

fn default_trend_batch_size() -> usize {
    10
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            trend_batch_size: default_trend_batch_size(),
            min_paragraph_chars: 0,
        }
    }
}

impl ChunkingPolicy {
    /// Reject settings that cannot chunk anything.
    pub fn validate(&self) -> RagResult<()> {
        if self.trend_batch_size == 0 {
            return Err(RagError::Config(
                "trend_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Turn a profile into chunks, in section order.
    ///
    /// The `keywords` list becomes one summary chunk; every other string
    /// section yields one chunk per paragraph long enough to keep.
    pub fn chunk_profile(&self, profile: &OrganizationProfile) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for (section, content) in profile.sections() {
            match content {
                ProfileSection::Keywords(keywords) => {
                    let text = format!("{KEYWORDS_PREFIX}{}", keywords.join(", "));
                    chunks.extend(Chunk::new(text, section));
                }
                ProfileSection::Text(text) => {
                    chunks.extend(
                        split_paragraphs(text)
                            .into_iter()
                            .filter(|p| p.chars().count() > self.min_paragraph_chars)
                            .filter_map(|p| Chunk::new(p, section)),
                    );
                }
                ProfileSection::Ignored => {}
            }
        }
        chunks
    }

    /// Fold hashtags into trend chunks of at most `trend_batch_size` items each,
    /// preserving input order.
    pub fn chunk_trends(&self, hashtags: &[String]) -> Vec<Chunk> {
        hashtags
            .chunks(self.trend_batch_size.max(1))
            .filter_map(|batch| {
                Chunk::new(
                    format!("{TRENDING_PREFIX}{}", batch.join(", ")),
                    TRENDING_SECTION,
                )
            })
            .collect()
    }
}

/// Split text into trimmed paragraphs separated by one or more blank lines.
///
/// A line holding only whitespace counts as blank, and `\r\n` endings are accepted.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                paragraphs.push(text[s..end].trim());
            }
        } else {
            if start.is_none() {
                start = Some(line_start);
            }
            end = offset;
        }
    }
    if let Some(s) = start {
        paragraphs.push(text[s..end].trim());
    }

    paragraphs
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn profile(json: &str) -> OrganizationProfile {
        OrganizationProfile::from_json_str(json).unwrap()
    }

    #[test]
    fn test_chunk_rejects_blank() {
        assert!(Chunk::new("", "about").is_none());
        assert!(Chunk::new(" \n\t", "about").is_none());
        assert!(Chunk::new("x", "about").is_some());
    }

    #[test]
    fn test_chunk_deserialize_rejects_blank() {
        let err = serde_json::from_str::<Chunk>(r#"{"content": "  ", "section": "a"}"#);
        assert!(err.is_err());
        let ok: Chunk = serde_json::from_str(r#"{"content": "hi", "section": "a"}"#).unwrap();
        assert_eq!(ok.content(), "hi");
        assert_eq!(ok.section(), "a");
    }

    #[test]
    fn test_split_paragraphs() {
        assert_eq!(
            split_paragraphs("We build robots.\n\nWeekly meetings Tuesdays."),
            vec!["We build robots.", "Weekly meetings Tuesdays."]
        );
    }

    #[test]
    fn test_split_paragraphs_keeps_single_newlines() {
        assert_eq!(
            split_paragraphs("line one\nline two\n\n\n  second  \n"),
            vec!["line one\nline two", "second"]
        );
    }

    #[test]
    fn test_split_paragraphs_whitespace_lines_and_crlf() {
        assert_eq!(
            split_paragraphs("first\r\n \r\nsecond\r\n\t\nthird"),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_split_paragraphs_blank_text() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs("\n\n   \n").is_empty());
    }

    #[test]
    fn test_chunk_profile_example() {
        let p = profile(
            r#"{"about": "We build robots.\n\nWeekly meetings Tuesdays.", "keywords": ["robotics","AI"]}"#,
        );
        let chunks = ChunkingPolicy::default().chunk_profile(&p);
        let contents: Vec<&str> = chunks.iter().map(Chunk::content).collect();
        assert_eq!(
            contents,
            vec![
                "We build robots.",
                "Weekly meetings Tuesdays.",
                "Company keywords: robotics, AI"
            ]
        );
        assert_eq!(chunks[0].section(), "about");
        assert_eq!(chunks[2].section(), "keywords");
    }

    #[test]
    fn test_chunk_profile_min_length() {
        let p = profile(r#"{"about": "Short.\n\nThis paragraph is long enough to keep."}"#);
        let strict = ChunkingPolicy {
            min_paragraph_chars: 20,
            ..ChunkingPolicy::default()
        };
        let chunks = strict.chunk_profile(&p);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content(), "This paragraph is long enough to keep.");
    }

    #[test]
    fn test_chunk_profile_min_length_counts_chars() {
        // 5 characters, 10 bytes.
        let p = profile(r#"{"about": "ééééé"}"#);
        let policy = ChunkingPolicy {
            min_paragraph_chars: 5,
            ..ChunkingPolicy::default()
        };
        assert!(policy.chunk_profile(&p).is_empty());
    }

    #[test]
    fn test_chunk_profile_ignores_other_values() {
        let p = profile(r#"{"founded": 2019, "tags": ["a", "b"], "social": {"ig": "@club"}}"#);
        assert!(ChunkingPolicy::default().chunk_profile(&p).is_empty());
    }

    #[test]
    fn test_chunk_trends_batches() {
        let tags: Vec<String> = (0..23).map(|i| format!("#t{i}")).collect();
        let chunks = ChunkingPolicy::default().chunk_trends(&tags);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].content().starts_with("Trending hashtags: #t0, #t1,"));
        assert!(chunks[0].content().ends_with("#t9"));
        assert_eq!(chunks[2].content(), "Trending hashtags: #t20, #t21, #t22");
        assert!(chunks.iter().all(|c| c.section() == TRENDING_SECTION));
    }

    #[test]
    fn test_chunk_trends_empty() {
        assert!(ChunkingPolicy::default().chunk_trends(&[]).is_empty());
    }

    #[test]
    fn test_policy_validation() {
        assert!(ChunkingPolicy::default().validate().is_ok());
        let bad = ChunkingPolicy {
            trend_batch_size: 0,
            ..ChunkingPolicy::default()
        };
        assert!(matches!(bad.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn test_policy_deserialize_defaults() {
        let policy: ChunkingPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, ChunkingPolicy::default());
        let policy: ChunkingPolicy = serde_json::from_str(r#"{"min_paragraph_chars": 20}"#).unwrap();
        assert_eq!(policy.trend_batch_size, 10);
        assert_eq!(policy.min_paragraph_chars, 20);
    }
}
