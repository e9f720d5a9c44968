//! Full-text playbook search.

use serde::Serialize;

use playbook_search::{SearchHit, SearchOptions};
use playbook_types::Status;

use crate::error::ServiceError;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchItem {
    pub path: String,
    pub title: String,
    pub domain: String,
    pub complexity: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tldr: Option<String>,
    pub matched_terms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub stale: bool,
}

impl From<SearchHit> for SearchItem {
    fn from(hit: SearchHit) -> Self {
        let fields = hit.fields;
        Self {
            path: fields.relative_path,
            title: fields.title,
            domain: fields.domain,
            complexity: fields
                .complexity
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            score: (hit.score * 100.0).round() / 100.0,
            tldr: Some(fields.tldr).filter(|t| !t.is_empty()),
            matched_terms: hit.matched_terms,
            confidence: fields.confidence,
            status: fields.status,
            last_updated: fields.last_updated,
            stale: fields.stale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub results: Vec<SearchItem>,
    pub total: usize,
}

pub fn search_playbooks(
    snapshot: &Snapshot,
    query: &str,
    options: &SearchOptions,
) -> Result<SearchResults, ServiceError> {
    let results: Vec<SearchItem> = snapshot
        .search_index()
        .search(query, options)?
        .into_iter()
        .map(SearchItem::from)
        .collect();

    Ok(SearchResults {
        total: results.len(),
        results,
    })
}
