//! Immutable corpus snapshots.
//!
//! A [`Snapshot`] bundles everything the query operations read: the parsed
//! documents, the route table, the full-text index and the route matcher.
//! It is built in one pass and never mutated afterwards; a rebuild produces
//! a new snapshot.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use playbook_loader::{load_documents, parse_route_table, LoaderConfig, SkippedFile};
use playbook_search::{FullTextIndex, RouteMatcher};
use playbook_types::{Document, RouteEntry};

use crate::error::ServiceError;

/// Modification time of a watched path, `None` when the path is absent.
pub type WatchedMtimes = BTreeMap<PathBuf, Option<SystemTime>>;

/// Paths whose modification time decides snapshot freshness.
pub fn watch_set(root: &Path, config: &LoaderConfig) -> Vec<PathBuf> {
    vec![root.join(&config.index_file), root.join(&config.domains_dir)]
}

/// Stat one watched path. A missing path is `Ok(None)`.
pub fn observe_mtime(path: &Path) -> io::Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Stat the whole watch set. A path that cannot be stat'ed is recorded as
/// absent and fails the freshness check until it can be.
pub fn observe_watch_set(root: &Path, config: &LoaderConfig) -> WatchedMtimes {
    watch_set(root, config)
        .into_iter()
        .map(|path| {
            let mtime = observe_mtime(&path).ok().flatten();
            (path, mtime)
        })
        .collect()
}

/// One fully-built view of a corpus root.
#[derive(Debug)]
pub struct Snapshot {
    root: PathBuf,
    documents: Vec<Document>,
    by_path: HashMap<String, usize>,
    search_index: FullTextIndex,
    route_matcher: RouteMatcher,
    skipped: Vec<SkippedFile>,
    index_exists: bool,
    loaded_at: DateTime<Utc>,
    loaded_instant: Instant,
    watched_mtimes: WatchedMtimes,
}

impl Snapshot {
    /// Load and index the corpus at `root`.
    ///
    /// The watch set is stat'ed before loading so an edit racing the load
    /// invalidates the result on the next lookup.
    pub fn build(root: &Path, config: &LoaderConfig) -> Result<Self, ServiceError> {
        let watched_mtimes = observe_watch_set(root, config);
        let loaded_at = Utc::now();
        let today: NaiveDate = loaded_at.date_naive();

        info!(path = ?root, "Loading playbooks");
        let outcome = load_documents(root, config);

        let index_path = root.join(&config.index_file);
        let index_exists = index_path.is_file();
        let routes = if index_exists {
            parse_route_table(&index_path)
        } else {
            Vec::new()
        };
        info!(count = routes.len(), "Routes loaded");

        let search_index = FullTextIndex::build(&outcome.documents, today)?;
        let route_matcher = RouteMatcher::new(routes);

        let by_path = outcome
            .documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| (doc.relative_path.clone(), idx))
            .collect();

        Ok(Self {
            root: root.to_path_buf(),
            documents: outcome.documents,
            by_path,
            search_index,
            route_matcher,
            skipped: outcome.skipped,
            index_exists,
            loaded_at,
            loaded_instant: Instant::now(),
            watched_mtimes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Documents in relative-path order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, relative_path: &str) -> Option<&Document> {
        self.by_path.get(relative_path).map(|&idx| &self.documents[idx])
    }

    pub fn routes(&self) -> &[RouteEntry] {
        self.route_matcher.routes()
    }

    pub fn search_index(&self) -> &FullTextIndex {
        &self.search_index
    }

    pub fn route_matcher(&self) -> &RouteMatcher {
        &self.route_matcher
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Whether the route table file existed at load time
    pub fn index_exists(&self) -> bool {
        self.index_exists
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Time since the snapshot was built
    pub fn age(&self) -> std::time::Duration {
        self.loaded_instant.elapsed()
    }

    pub fn watched_mtimes(&self) -> &WatchedMtimes {
        &self.watched_mtimes
    }

    /// Sorted distinct domains
    pub fn domains(&self) -> Vec<String> {
        self.search_index.domains()
    }
}
