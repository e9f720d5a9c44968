//! Playbook listing and corpus summary.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use playbook_types::{Complexity, Document, Status};

use crate::snapshot::Snapshot;

/// Default number of listed playbooks
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Listing filters.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Case-insensitive exact domain filter
    pub domain: Option<String>,
    pub complexity: Option<Complexity>,
    pub limit: Option<usize>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn accepts(&self, doc: &Document) -> bool {
        let domain_ok = self
            .domain
            .as_deref()
            .map_or(true, |d| doc.domain().eq_ignore_ascii_case(d.trim()));
        let complexity_ok = self
            .complexity
            .map_or(true, |c| doc.frontmatter.complexity == Some(c));
        domain_ok && complexity_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub path: String,
    pub title: String,
    pub domain: String,
    pub complexity: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResults {
    pub results: Vec<ListItem>,
    pub total: usize,
}

/// Case-insensitive ordering, falling back to the raw text on ties.
fn caseless_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// List playbooks sorted by domain, then title.
pub fn list_playbooks(snapshot: &Snapshot, options: &ListOptions) -> ListResults {
    let today = Utc::now().date_naive();
    let mut docs: Vec<&Document> = snapshot
        .documents()
        .iter()
        .filter(|doc| options.accepts(doc))
        .collect();

    docs.sort_by(|a, b| {
        caseless_cmp(a.domain(), b.domain()).then_with(|| caseless_cmp(&a.title, &b.title))
    });
    docs.truncate(options.limit.unwrap_or(DEFAULT_LIST_LIMIT));

    let results: Vec<ListItem> = docs
        .into_iter()
        .map(|doc| ListItem {
            path: doc.relative_path.clone(),
            title: doc.title.clone(),
            domain: doc.domain().to_string(),
            complexity: doc.frontmatter.complexity_label().to_string(),
            tags: doc.frontmatter.tags.clone(),
            last_updated: doc.frontmatter.last_updated.clone(),
            confidence: doc.frontmatter.confidence,
            status: doc.frontmatter.status,
            stale: doc.is_stale(today),
        })
        .collect();

    ListResults {
        total: results.len(),
        results,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplexityDistribution {
    pub beginner: usize,
    pub intermediate: usize,
    pub advanced: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub domains: BTreeMap<String, usize>,
    pub complexity_distribution: ComplexityDistribution,
}

/// Count playbooks per domain and per complexity.
///
/// Documents without a valid complexity are left out of the distribution.
pub fn summarize(snapshot: &Snapshot) -> Summary {
    let mut domains = BTreeMap::new();
    let mut distribution = ComplexityDistribution::default();

    for doc in snapshot.documents() {
        *domains.entry(doc.domain().to_string()).or_insert(0) += 1;
        match doc.frontmatter.complexity {
            Some(Complexity::Beginner) => distribution.beginner += 1,
            Some(Complexity::Intermediate) => distribution.intermediate += 1,
            Some(Complexity::Advanced) => distribution.advanced += 1,
            None => {}
        }
    }

    Summary {
        total: snapshot.documents().len(),
        domains,
        complexity_distribution: distribution,
    }
}
