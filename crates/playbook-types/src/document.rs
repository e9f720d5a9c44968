//! Playbook document types.
//!
//! A `Document` is one parsed knowledge-base entry: the markdown body plus
//! the typed frontmatter block that precedes it. Documents are keyed by
//! their path relative to the corpus root (always `/`-separated).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declared difficulty of a playbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Beginner,
    Intermediate,
    Advanced,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [
        Complexity::Beginner,
        Complexity::Intermediate,
        Complexity::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }

    /// Parse from string (case-insensitive), returning None for unknown levels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Complexity::Beginner),
            "intermediate" => Some(Complexity::Intermediate),
            "advanced" => Some(Complexity::Advanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown complexity: {}", s))
    }
}

/// Editorial lifecycle status of a playbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    Validated,
    Superseded,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Validated => "validated",
            Status::Superseded => "superseded",
            Status::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Status::Draft),
            "validated" => Some(Status::Validated),
            "superseded" => Some(Status::Superseded),
            "archived" => Some(Status::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed frontmatter of a playbook.
///
/// Required fields (`domain`, `topic`, `tags`, `complexity`, `last_updated`)
/// may be absent in a source file; the loader fills in a fallback and records
/// a warning on the owning [`Document`] instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Knowledge domain (e.g. "marketing", "product")
    pub domain: String,

    /// Topic of the playbook
    pub topic: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Declared complexity, None when missing or unrecognized
    #[serde(default)]
    pub complexity: Option<Complexity>,

    /// Last update date as written in the source
    #[serde(default)]
    pub last_updated: Option<String>,

    // === Provenance fields (optional) ===
    /// Synthesis confidence in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// DOIs, URLs or internal IDs backing this entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_refs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Relative path of the newer version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,

    /// Staleness deadline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_by: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Monotonically increasing version number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    /// Unknown keys, passed through untyped
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Frontmatter {
    /// Whether the review deadline lies strictly before `today`.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.review_by.is_some_and(|deadline| deadline < today)
    }

    /// Complexity label, "unknown" when not declared.
    pub fn complexity_label(&self) -> &'static str {
        self.complexity.map(|c| c.as_str()).unwrap_or("unknown")
    }
}

/// A parsed playbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Absolute path of the source file
    pub path: String,

    /// Path relative to the corpus root, unique within a corpus
    pub relative_path: String,

    /// First level-1 heading, else topic, else file stem
    pub title: String,

    /// First block-quote line
    pub description: String,

    /// Flattened TL;DR section (at most 500 characters)
    pub tldr: String,

    /// Markdown body without the frontmatter block
    pub content: String,

    pub frontmatter: Frontmatter,

    /// Schema problems found in the frontmatter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Document {
    pub fn domain(&self) -> &str {
        &self.frontmatter.domain
    }

    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.frontmatter.is_stale(today)
    }

    /// Whether domain or topic were missing from the source frontmatter.
    pub fn missing_identity(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.contains("`domain`") || w.contains("`topic`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_parse() {
        assert_eq!(Complexity::parse("Beginner"), Some(Complexity::Beginner));
        assert_eq!(Complexity::parse(" advanced "), Some(Complexity::Advanced));
        assert_eq!(Complexity::parse("expert"), None);
        assert_eq!(
            "intermediate".parse::<Complexity>().unwrap(),
            Complexity::Intermediate
        );
        assert!("expert".parse::<Complexity>().is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("validated"), Some(Status::Validated));
        assert_eq!(Status::parse("ARCHIVED"), Some(Status::Archived));
        assert_eq!(Status::parse("published"), None);
    }

    #[test]
    fn test_stale_when_review_date_passed() {
        let frontmatter = Frontmatter {
            review_by: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        assert!(frontmatter.is_stale(today));

        let same_day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(!frontmatter.is_stale(same_day));
    }

    #[test]
    fn test_not_stale_without_review_date() {
        let frontmatter = Frontmatter::default();
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(!frontmatter.is_stale(today));
    }

    #[test]
    fn test_complexity_serializes_snake_case() {
        let json = serde_json::to_string(&Complexity::Advanced).unwrap();
        assert_eq!(json, "\"advanced\"");
    }
}
