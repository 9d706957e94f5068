use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RagError, RagResult};

/// Section name whose list value is summarized as a single keywords chunk.
pub const KEYWORDS_SECTION: &str = "keywords";

/// Section name holding the organization's display name.
const NAME_SECTION: &str = "name";

/// Section-keyed description of an organization, loaded from a JSON object.
///
/// Key order is preserved exactly as it appears in the source document, so the
/// chunks derived from it come out in the same order on every ingest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationProfile {
    sections: Map<String, Value>,
}

/// How a single profile section feeds the knowledge store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSection<'a> {
    /// Free text, split into paragraphs.
    Text(&'a str),
    /// The reserved `keywords` list. Non-string elements are skipped.
    Keywords(Vec<&'a str>),
    /// Anything else (numbers, objects, lists under other keys).
    Ignored,
}

impl OrganizationProfile {
    /// Build a profile from an already-parsed JSON map.
    pub fn from_map(sections: Map<String, Value>) -> Self {
        Self { sections }
    }

    /// Parse a profile from JSON text. The top level must be an object.
    pub fn from_json_str(data: &str) -> RagResult<Self> {
        let value: Value = serde_json::from_str(data)
            .map_err(|e| RagError::ProfileLoad(format!("invalid JSON: {e}")))?;
        match value {
            Value::Object(sections) => Ok(Self { sections }),
            other => Err(RagError::ProfileLoad(format!(
                "expected a JSON object of sections, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Read and parse a profile file.
    pub async fn load(path: &Path) -> RagResult<Self> {
        let data = tokio::fs::read_to_string(path).await.map_err(|e| {
            RagError::ProfileLoad(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&data)
    }

    /// Sections in document order, classified by how they are chunked.
    pub fn sections(&self) -> impl Iterator<Item = (&str, ProfileSection<'_>)> {
        self.sections
            .iter()
            .map(|(key, value)| (key.as_str(), classify(key, value)))
    }

    /// The organization's `name` field, if it is a non-blank string.
    pub fn name(&self) -> Option<&str> {
        self.sections
            .get(NAME_SECTION)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Raw value of a section.
    pub fn get(&self, section: &str) -> Option<&Value> {
        self.sections.get(section)
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the profile has no sections at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn classify<'a>(key: &str, value: &'a Value) -> ProfileSection<'a> {
    match value {
        Value::Array(items) if key == KEYWORDS_SECTION => {
            ProfileSection::Keywords(items.iter().filter_map(Value::as_str).collect())
        }
        Value::String(text) => ProfileSection::Text(text),
        _ => ProfileSection::Ignored,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_preserve_document_order() {
        let profile = OrganizationProfile::from_json_str(
            r#"{"zeta": "last letter", "alpha": "first letter", "keywords": ["a"]}"#,
        )
        .unwrap();
        let keys: Vec<&str> = profile.sections().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "keywords"]);
    }

    #[test]
    fn test_classification() {
        let profile = OrganizationProfile::from_json_str(
            r#"{
                "about": "We build robots.",
                "keywords": ["robotics", 42, "AI"],
                "founded": 2019,
                "tags": ["not", "keywords"]
            }"#,
        )
        .unwrap();
        let sections: Vec<_> = profile.sections().collect();
        assert_eq!(sections[0].1, ProfileSection::Text("We build robots."));
        assert_eq!(
            sections[1].1,
            ProfileSection::Keywords(vec!["robotics", "AI"])
        );
        assert_eq!(sections[2].1, ProfileSection::Ignored);
        assert_eq!(sections[3].1, ProfileSection::Ignored);
    }

    #[test]
    fn test_keywords_as_string_is_text() {
        let profile =
            OrganizationProfile::from_json_str(r#"{"keywords": "robots, drones"}"#).unwrap();
        let (_, section) = profile.sections().next().unwrap();
        assert_eq!(section, ProfileSection::Text("robots, drones"));
    }

    #[test]
    fn test_top_level_array_rejected() {
        let err = OrganizationProfile::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, RagError::ProfileLoad(ref m) if m.contains("an array")));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = OrganizationProfile::from_json_str("{\"about\": ").unwrap_err();
        assert!(matches!(err, RagError::ProfileLoad(_)));
    }

    #[test]
    fn test_name() {
        let profile = OrganizationProfile::from_json_str(r#"{"name": "  Robotics Club "}"#).unwrap();
        assert_eq!(profile.name(), Some("Robotics Club"));

        let blank = OrganizationProfile::from_json_str(r#"{"name": "   "}"#).unwrap();
        assert_eq!(blank.name(), None);
        assert_eq!(OrganizationProfile::default().name(), None);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = OrganizationProfile::load(&tmp.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::ProfileLoad(_)));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("company_details.json");
        tokio::fs::write(&path, r#"{"name": "Club", "about": "text"}"#)
            .await
            .unwrap();
        let profile = OrganizationProfile::load(&path).await.unwrap();
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.get("about").and_then(Value::as_str), Some("text"));
    }
}
