//! Frontmatter decoding and schema validation.
//!
//! The leading YAML block is split off with `gray_matter` and decoded into a
//! loose JSON value, which is then checked field by field against the
//! playbook schema. Schema problems never fail a file: each one becomes a
//! warning and the field falls back to a neutral value. Only a block that
//! cannot be decoded at all is an error.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use gray_matter::engine::YAML;
use gray_matter::{Matter, ParsedEntity};
use serde_json::{Map, Value};

use playbook_types::{Complexity, Frontmatter, Status};

use crate::error::LoadError;

const KNOWN_KEYS: &[&str] = &[
    "domain",
    "topic",
    "tags",
    "complexity",
    "last_updated",
    "confidence",
    "source_refs",
    "status",
    "superseded_by",
    "review_by",
    "author",
    "version",
];

/// Result of splitting and validating a source file.
#[derive(Debug, Clone)]
pub struct ParsedFrontmatter {
    pub frontmatter: Frontmatter,
    /// Markdown body following the metadata block
    pub body: String,
    pub warnings: Vec<String>,
}

/// Split the metadata block from `raw` and validate it.
///
/// `relative_path` is used to derive a fallback domain and in error messages.
pub fn parse_frontmatter(raw: &str, relative_path: &str) -> Result<ParsedFrontmatter, LoadError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<Value> =
        matter.parse(raw).map_err(|e| LoadError::Frontmatter {
            path: relative_path.to_string(),
            message: e.to_string(),
        })?;

    let (frontmatter, warnings) = validate(parsed.data, relative_path);
    Ok(ParsedFrontmatter {
        frontmatter,
        body: parsed.content,
        warnings,
    })
}

/// Validate a decoded metadata value against the playbook schema.
pub fn validate(data: Option<Value>, relative_path: &str) -> (Frontmatter, Vec<String>) {
    let mut warnings = Vec::new();
    let map = match data {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => {
            warnings.push("missing frontmatter block".to_string());
            Map::new()
        }
        Some(other) => {
            warnings.push(format!(
                "frontmatter is not a mapping (found {})",
                type_name(&other)
            ));
            Map::new()
        }
    };

    let domain = match required_string(&map, "domain", &mut warnings) {
        Some(domain) => domain,
        None => domain_from_path(relative_path),
    };
    let topic = required_string(&map, "topic", &mut warnings).unwrap_or_default();

    let tags = match map.get("tags") {
        None | Some(Value::Null) => {
            warnings.push("missing required field `tags`".to_string());
            Vec::new()
        }
        Some(value) => string_list(value, "tags", &mut warnings),
    };

    let complexity = match required_string(&map, "complexity", &mut warnings) {
        Some(raw) => {
            let parsed = Complexity::parse(&raw);
            if parsed.is_none() {
                warnings.push(format!(
                    "`complexity` must be beginner, intermediate or advanced (found \"{}\")",
                    raw
                ));
            }
            parsed
        }
        None => None,
    };

    let last_updated = required_string(&map, "last_updated", &mut warnings);

    let confidence = map.get("confidence").and_then(|value| match value.as_f64() {
        Some(c) if (0.0..=1.0).contains(&c) => Some(c),
        Some(c) => {
            warnings.push(format!("`confidence` must be within [0, 1] (found {})", c));
            None
        }
        None => {
            warnings.push(format!(
                "`confidence` must be a number (found {})",
                type_name(value)
            ));
            None
        }
    });

    let source_refs = map
        .get("source_refs")
        .map(|value| string_list(value, "source_refs", &mut warnings))
        .unwrap_or_default();

    let status = optional_string(&map, "status", &mut warnings).and_then(|raw| {
        let parsed = Status::parse(&raw);
        if parsed.is_none() {
            warnings.push(format!("unknown `status` \"{}\"", raw));
        }
        parsed
    });

    let review_by = optional_string(&map, "review_by", &mut warnings).and_then(|raw| {
        let parsed = parse_date(&raw);
        if parsed.is_none() {
            warnings.push(format!("`review_by` is not a date (found \"{}\")", raw));
        }
        parsed
    });

    let version = map.get("version").and_then(|value| match value.as_u64() {
        Some(v) => Some(v),
        None => {
            warnings.push(format!(
                "`version` must be a non-negative integer (found {})",
                value
            ));
            None
        }
    });

    let extra: BTreeMap<String, Value> = map
        .iter()
        .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let frontmatter = Frontmatter {
        domain,
        topic,
        tags,
        complexity,
        last_updated,
        confidence,
        source_refs,
        status,
        superseded_by: optional_string(&map, "superseded_by", &mut warnings),
        review_by,
        author: optional_string(&map, "author", &mut warnings),
        version,
        extra,
    };

    (frontmatter, warnings)
}

/// Domain implied by a `domains/<domain>/...` path, else "unknown".
pub fn domain_from_path(relative_path: &str) -> String {
    let parts: Vec<&str> = relative_path.split('/').collect();
    parts
        .iter()
        .position(|part| *part == "domains")
        .and_then(|idx| parts.get(idx + 1))
        .filter(|part| !part.is_empty() && !part.ends_with(".md"))
        .map(|part| part.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn required_string(map: &Map<String, Value>, key: &str, warnings: &mut Vec<String>) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => {
            warnings.push(format!("missing required field `{}`", key));
            None
        }
        Some(_) => optional_string(map, key, warnings),
    }
}

fn optional_string(map: &Map<String, Value>, key: &str, warnings: &mut Vec<String>) -> Option<String> {
    match map.get(key)? {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                warnings.push(format!("`{}` is empty", key));
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        // YAML scalars such as dates or bare numbers
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            warnings.push(format!(
                "`{}` must be a string (found {})",
                key,
                type_name(other)
            ));
            None
        }
    }
}

fn string_list(value: &Value, key: &str, warnings: &mut Vec<String>) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::String(_) => None,
                other => {
                    warnings.push(format!(
                        "`{}` entries must be strings (found {})",
                        key,
                        type_name(other)
                    ));
                    None
                }
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        other => {
            warnings.push(format!(
                "`{}` must be a list of strings (found {})",
                key,
                type_name(other)
            ));
            Vec::new()
        }
    }
}

/// Parse `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_frontmatter() {
        let raw = "---\ndomain: marketing\ntopic: Launch plans\ntags:\n  - launch\n  - gtm\ncomplexity: advanced\nlast_updated: 2024-03-01\nconfidence: 0.8\nstatus: validated\nreview_by: 2025-01-01\nversion: 3\n---\n# Launch\n\nBody text.\n";
        let parsed = parse_frontmatter(raw, "domains/marketing/launch.md").unwrap();

        let fm = &parsed.frontmatter;
        assert_eq!(fm.domain, "marketing");
        assert_eq!(fm.topic, "Launch plans");
        assert_eq!(fm.tags, vec!["launch", "gtm"]);
        assert_eq!(fm.complexity, Some(Complexity::Advanced));
        assert_eq!(fm.last_updated.as_deref(), Some("2024-03-01"));
        assert_eq!(fm.confidence, Some(0.8));
        assert_eq!(fm.status, Some(Status::Validated));
        assert_eq!(fm.review_by, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(fm.version, Some(3));
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        assert!(parsed.body.contains("# Launch"));
        assert!(!parsed.body.contains("domain: marketing"));
    }

    #[test]
    fn test_missing_required_fields_are_warnings() {
        let (fm, warnings) = validate(Some(json!({})), "domains/sales/cold-email.md");
        assert_eq!(fm.domain, "sales");
        assert_eq!(fm.topic, "");
        assert!(fm.tags.is_empty());
        assert_eq!(fm.complexity, None);
        assert_eq!(warnings.len(), 5);
        assert!(warnings.iter().any(|w| w.contains("`domain`")));
    }

    #[test]
    fn test_no_frontmatter_block() {
        let (fm, warnings) = validate(None, "notes.md");
        assert_eq!(fm.domain, "unknown");
        assert!(warnings[0].contains("missing frontmatter"));
    }

    #[test]
    fn test_invalid_values_dropped() {
        let (fm, warnings) = validate(
            Some(json!({
                "domain": "ops",
                "topic": "Oncall",
                "tags": ["pager"],
                "complexity": "expert",
                "last_updated": "2024-01-01",
                "confidence": 1.7,
                "status": "published",
                "review_by": "next spring",
                "version": -2
            })),
            "domains/ops/oncall.md",
        );
        assert_eq!(fm.complexity, None);
        assert_eq!(fm.confidence, None);
        assert_eq!(fm.status, None);
        assert_eq!(fm.review_by, None);
        assert_eq!(fm.version, None);
        assert_eq!(warnings.len(), 5, "{:?}", warnings);
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let (fm, _) = validate(
            Some(json!({"domain": "ops", "audience": "sre", "priority": 2})),
            "domains/ops/x.md",
        );
        assert_eq!(fm.extra.get("audience"), Some(&json!("sre")));
        assert_eq!(fm.extra.get("priority"), Some(&json!(2)));
        assert!(!fm.extra.contains_key("domain"));
    }

    #[test]
    fn test_tags_as_comma_string() {
        let (fm, _) = validate(Some(json!({"tags": "a, b ,c"})), "x.md");
        assert_eq!(fm.tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_domain_from_path() {
        assert_eq!(domain_from_path("domains/design/logo.md"), "design");
        assert_eq!(domain_from_path("domains/logo.md"), "unknown");
        assert_eq!(domain_from_path("other/logo.md"), "unknown");
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(
            parse_date("2024-02-29T10:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_date("29/02/2024"), None);
    }
}
