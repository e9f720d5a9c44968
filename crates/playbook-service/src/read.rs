//! Playbook reading with optional section extraction.

use serde::Serialize;

use playbook_loader::{extract_section, first_h1};

use crate::error::ServiceError;
use crate::resolve::{resolve, Resolved};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadFrontmatter {
    pub domain: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub complexity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadResult {
    pub path: String,
    pub title: String,
    pub content: String,
    pub frontmatter: ReadFrontmatter,
}

/// Sentinel body for a missing section
pub fn section_not_found(name: &str) -> String {
    format!("Section \"{}\" not found in playbook.", name)
}

fn select(content: &str, section: Option<&str>) -> String {
    match section.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => extract_section(content, name).unwrap_or_else(|| section_not_found(name)),
        None => content.to_string(),
    }
}

pub fn read_playbook(
    snapshot: &Snapshot,
    path: &str,
    section: Option<&str>,
) -> Result<ReadResult, ServiceError> {
    let requested = path.trim();
    if requested.is_empty() {
        return Err(ServiceError::Validation(
            "Playbook path is required".to_string(),
        ));
    }

    match resolve(snapshot, requested)? {
        Resolved::Document(doc) => Ok(ReadResult {
            path: doc.relative_path.clone(),
            title: doc.title.clone(),
            content: select(&doc.content, section),
            frontmatter: ReadFrontmatter {
                domain: doc.frontmatter.domain.clone(),
                topic: doc.frontmatter.topic.clone(),
                tags: doc.frontmatter.tags.clone(),
                complexity: doc.frontmatter.complexity_label().to_string(),
            },
        }),
        Resolved::File { content } => Ok(ReadResult {
            path: requested.to_string(),
            title: first_h1(&content).unwrap_or_else(|| requested.to_string()),
            content: select(&content, section),
            frontmatter: ReadFrontmatter {
                domain: "unknown".to_string(),
                topic: requested.to_string(),
                tags: Vec::new(),
                complexity: "intermediate".to_string(),
            },
        }),
    }
}
