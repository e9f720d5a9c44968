//! Weighted full-text index over playbooks.
//!
//! An in-memory inverted index with one posting list per term. Each posting
//! records the field it came from so matches can be boosted per field:
//!
//! | Field       | Boost |
//! |-------------|-------|
//! | title       | 4     |
//! | tldr        | 3     |
//! | tags        | 2     |
//! | description | 2     |
//! | topic       | 2     |
//! | content     | 1     |
//!
//! Query terms match index terms exactly, by prefix, or within an edit
//! budget of 20% of their length. Per-field relevance is BM25+.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use playbook_types::{Complexity, Document, Status};

use crate::error::SearchError;
use crate::fuzzy::{bounded_levenshtein, max_distance};
use crate::tokenizer::Tokenizer;

/// Documents longer than this are indexed on their leading characters only
pub const CONTENT_INDEX_CHARS: usize = 5000;

/// Default number of search results
pub const DEFAULT_LIMIT: usize = 10;

/// Upper bound on the number of search results
pub const MAX_LIMIT: usize = 50;

const PREFIX_WEIGHT: f64 = 0.375;
const FUZZY_WEIGHT: f64 = 0.45;
const BM25_K1: f64 = 1.2;
const BM25_B: f64 = 0.7;
const BM25_DELTA: f64 = 0.5;

/// Searchable fields of a playbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Tldr,
    Tags,
    Description,
    Topic,
    Content,
}

const FIELD_COUNT: usize = 6;

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Title,
        Field::Tldr,
        Field::Tags,
        Field::Description,
        Field::Topic,
        Field::Content,
    ];

    pub fn boost(&self) -> f64 {
        match self {
            Field::Title => 4.0,
            Field::Tldr => 3.0,
            Field::Tags | Field::Description | Field::Topic => 2.0,
            Field::Content => 1.0,
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

/// Stored, non-indexed fields used to hydrate results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredFields {
    pub relative_path: String,
    pub path: String,
    pub title: String,
    pub domain: String,
    pub complexity: Option<Complexity>,
    pub tldr: String,
    pub tags: Vec<String>,
    pub confidence: Option<f64>,
    pub status: Option<Status>,
    pub last_updated: Option<String>,
    pub stale: bool,
}

impl StoredFields {
    fn from_document(doc: &Document, today: NaiveDate) -> Self {
        let fm = &doc.frontmatter;
        Self {
            relative_path: doc.relative_path.clone(),
            path: doc.path.clone(),
            title: doc.title.clone(),
            domain: fm.domain.clone(),
            complexity: fm.complexity,
            tldr: doc.tldr.clone(),
            tags: fm.tags.clone(),
            confidence: fm.confidence,
            status: fm.status,
            last_updated: fm.last_updated.clone(),
            stale: doc.is_stale(today),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: usize,
    field: Field,
    tf: u32,
}

/// Search filters and result cap.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Case-insensitive exact domain filter
    pub domain: Option<String>,
    pub complexity: Option<Complexity>,
    /// Maximum results (default 10, capped at 50)
    pub limit: Option<usize>,
}

impl SearchOptions {
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

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    fn accepts(&self, fields: &StoredFields) -> bool {
        let domain_ok = self
            .domain
            .as_deref()
            .map_or(true, |d| fields.domain.eq_ignore_ascii_case(d.trim()));
        let complexity_ok = self
            .complexity
            .map_or(true, |c| fields.complexity == Some(c));
        domain_ok && complexity_ok
    }
}

/// A ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub fields: StoredFields,
    pub score: f64,
    /// Index terms that contributed to the score, in discovery order
    pub matched_terms: Vec<String>,
}

/// In-memory full-text index.
#[derive(Debug)]
pub struct FullTextIndex {
    tokenizer: Tokenizer,
    docs: Vec<StoredFields>,
    ids: HashMap<String, usize>,
    terms: BTreeMap<String, Vec<Posting>>,
    field_lengths: Vec<[u32; FIELD_COUNT]>,
    avg_field_lengths: [f64; FIELD_COUNT],
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

impl FullTextIndex {
    /// Build an index over `documents`.
    ///
    /// `today` decides the stored staleness flag of each document.
    pub fn build(documents: &[Document], today: NaiveDate) -> Result<Self, SearchError> {
        Self::build_with_tokenizer(documents, today, Tokenizer::full_text())
    }

    pub fn build_with_tokenizer(
        documents: &[Document],
        today: NaiveDate,
        tokenizer: Tokenizer,
    ) -> Result<Self, SearchError> {
        let mut index = Self {
            tokenizer,
            docs: Vec::with_capacity(documents.len()),
            ids: HashMap::with_capacity(documents.len()),
            terms: BTreeMap::new(),
            field_lengths: Vec::with_capacity(documents.len()),
            avg_field_lengths: [0.0; FIELD_COUNT],
        };

        for doc in documents {
            index.add(doc, today)?;
        }

        let count = index.docs.len().max(1) as f64;
        for field in Field::ALL {
            let total: u64 = index
                .field_lengths
                .iter()
                .map(|lengths| lengths[field.slot()] as u64)
                .sum();
            index.avg_field_lengths[field.slot()] = total as f64 / count;
        }

        info!(
            documents = index.docs.len(),
            terms = index.terms.len(),
            "Built search index"
        );
        Ok(index)
    }

    fn add(&mut self, doc: &Document, today: NaiveDate) -> Result<(), SearchError> {
        if self.ids.contains_key(&doc.relative_path) {
            return Err(SearchError::DuplicateDocument(doc.relative_path.clone()));
        }
        let id = self.docs.len();
        self.ids.insert(doc.relative_path.clone(), id);
        self.docs.push(StoredFields::from_document(doc, today));

        let tags = doc.frontmatter.tags.join(" ");
        let sources = [
            (Field::Title, doc.title.as_str()),
            (Field::Tldr, doc.tldr.as_str()),
            (Field::Tags, tags.as_str()),
            (Field::Description, doc.description.as_str()),
            (Field::Topic, doc.frontmatter.topic.as_str()),
            (Field::Content, truncate_chars(&doc.content, CONTENT_INDEX_CHARS)),
        ];

        let mut lengths = [0u32; FIELD_COUNT];
        for (field, text) in sources {
            let tokens = self.tokenizer.tokenize(text);
            lengths[field.slot()] = tokens.len() as u32;

            let mut counts: BTreeMap<String, u32> = BTreeMap::new();
            for token in tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            for (term, tf) in counts {
                self.terms
                    .entry(term)
                    .or_default()
                    .push(Posting { doc: id, field, tf });
            }
        }
        self.field_lengths.push(lengths);
        Ok(())
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Number of distinct index terms
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Stored fields of a document by relative path
    pub fn stored(&self, relative_path: &str) -> Option<&StoredFields> {
        self.ids.get(relative_path).map(|&id| &self.docs[id])
    }

    /// Sorted distinct domains of the indexed documents
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.docs.iter().map(|d| d.domain.clone()).collect();
        domains.sort();
        domains.dedup();
        domains
    }

    /// Index terms matching `query_term` with their match weight.
    ///
    /// A term reachable both by prefix and by edit distance keeps the
    /// larger weight.
    fn expand(&self, query_term: &str) -> Vec<(&str, f64)> {
        let query_len = query_term.chars().count();
        let mut expansions: BTreeMap<&str, f64> = BTreeMap::new();

        let range = (Bound::Included(query_term), Bound::Unbounded);
        for (term, _) in self.terms.range::<str, _>(range) {
            if !term.starts_with(query_term) {
                break;
            }
            let term_len = term.chars().count() as f64;
            let weight = if term == query_term {
                1.0
            } else {
                let distance = term_len - query_len as f64;
                PREFIX_WEIGHT * term_len / (term_len + 0.3 * distance)
            };
            expansions.insert(term.as_str(), weight);
        }

        let budget = max_distance(query_len);
        if budget > 0 {
            for term in self.terms.keys() {
                if term == query_term {
                    continue;
                }
                if let Some(distance) = bounded_levenshtein(query_term, term, budget) {
                    let term_len = term.chars().count() as f64;
                    let weight = FUZZY_WEIGHT * term_len / (term_len + 0.3 * distance as f64);
                    let slot = expansions.entry(term.as_str()).or_insert(0.0);
                    *slot = slot.max(weight);
                }
            }
        }

        expansions.into_iter().collect()
    }

    fn bm25(&self, tf: u32, doc_freq: usize, field: Field, doc: usize) -> f64 {
        let n = self.docs.len() as f64;
        let df = doc_freq as f64;
        let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
        let len = self.field_lengths[doc][field.slot()] as f64;
        let avg = self.avg_field_lengths[field.slot()].max(1.0);
        let tf = tf as f64;
        let norm = tf * (BM25_K1 + 1.0) / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * len / avg));
        idf * (BM25_DELTA + norm)
    }

    /// Run a query.
    ///
    /// Fails with [`SearchError::EmptyQuery`] when the query is blank. Any
    /// query term may match (OR semantics); documents are ranked by summed
    /// weighted score, ties broken by relative path.
    pub fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let mut seen = HashSet::new();
        let query_terms: Vec<String> = self
            .tokenizer
            .tokenize(query)
            .into_iter()
            .filter(|term| seen.insert(term.clone()))
            .collect();

        let mut scores: HashMap<usize, (f64, Vec<String>)> = HashMap::new();
        for query_term in &query_terms {
            for (term, weight) in self.expand(query_term) {
                let Some(postings) = self.terms.get(term) else {
                    continue;
                };
                let mut doc_freqs = [0usize; FIELD_COUNT];
                for posting in postings {
                    doc_freqs[posting.field.slot()] += 1;
                }
                for posting in postings {
                    let relevance = self.bm25(
                        posting.tf,
                        doc_freqs[posting.field.slot()],
                        posting.field,
                        posting.doc,
                    );
                    let entry = scores.entry(posting.doc).or_insert_with(|| (0.0, Vec::new()));
                    entry.0 += weight * posting.field.boost() * relevance;
                    if !entry.1.iter().any(|t| t == term) {
                        entry.1.push(term.to_string());
                    }
                }
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .filter(|(doc, _)| options.accepts(&self.docs[*doc]))
            .map(|(doc, (score, matched_terms))| SearchHit {
                fields: self.docs[doc].clone(),
                score,
                matched_terms,
            })
            .collect();

        if hits.iter().any(|hit| !hit.score.is_finite()) {
            return Err(SearchError::Internal("non-finite relevance score".to_string()));
        }

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.fields.relative_path.cmp(&b.fields.relative_path))
        });
        hits.truncate(options.effective_limit());

        debug!(query = query, results = hits.len(), "Search complete");
        Ok(hits)
    }
}
