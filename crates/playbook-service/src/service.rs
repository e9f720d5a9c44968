//! Query facade over one corpus root.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use playbook_loader::LoaderConfig;
use playbook_search::SearchOptions;
use playbook_types::{RouteEntry, Settings};

use crate::cache::{CacheStats, CacheStore};
use crate::diagnose::{diagnose, Diagnosis};
use crate::error::ServiceError;
use crate::list::{list_playbooks, summarize, ListOptions, ListResults, Summary};
use crate::read::{read_playbook, ReadResult};
use crate::route::{route_task, RouteOutcome};
use crate::search::{search_playbooks, SearchResults};
use crate::snapshot::Snapshot;

/// Read-only operations on the playbooks under one root.
///
/// Every call works on the current snapshot from the shared [`CacheStore`],
/// so each operation sees one consistent corpus.
#[derive(Debug, Clone)]
pub struct KnowledgeService {
    store: Arc<CacheStore>,
    root: PathBuf,
}

impl KnowledgeService {
    pub fn new(store: Arc<CacheStore>, root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    /// Service with its own store configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let loader = LoaderConfig {
            domains_dir: settings.domains_dir.clone(),
            index_file: settings.index_file.clone(),
            ..LoaderConfig::default()
        };
        let store = Arc::new(CacheStore::new(settings.cache_ttl(), loader));
        Self::new(store, settings.expanded_knowledge_path())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn snapshot(&self) -> Result<Arc<Snapshot>, ServiceError> {
        self.store.get_or_load(&self.root)
    }

    pub fn route(&self, task: &str) -> Result<RouteOutcome, ServiceError> {
        let snapshot = self.snapshot()?;
        route_task(&snapshot, task)
    }

    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResults, ServiceError> {
        let snapshot = self.snapshot()?;
        search_playbooks(&snapshot, query, options)
    }

    pub fn list(&self, options: &ListOptions) -> Result<ListResults, ServiceError> {
        let snapshot = self.snapshot()?;
        Ok(list_playbooks(&snapshot, options))
    }

    pub fn read(&self, path: &str, section: Option<&str>) -> Result<ReadResult, ServiceError> {
        let snapshot = self.snapshot()?;
        read_playbook(&snapshot, path, section)
    }

    pub fn summary(&self) -> Result<Summary, ServiceError> {
        let snapshot = self.snapshot()?;
        Ok(summarize(&snapshot))
    }

    pub fn diagnose(&self) -> Result<Diagnosis, ServiceError> {
        let snapshot = self.snapshot()?;
        let stats = self.cache_stats();
        Ok(diagnose(
            &self.root,
            self.store.loader_config(),
            &snapshot,
            &stats,
        ))
    }

    pub fn domains(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.snapshot()?.domains())
    }

    pub fn routes_for(&self, target: &str) -> Result<Vec<RouteEntry>, ServiceError> {
        Ok(self
            .snapshot()?
            .route_matcher()
            .routes_for(target)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.store.stats(&self.root)
    }

    /// Force the next call to rebuild the snapshot.
    pub fn invalidate(&self) -> bool {
        self.store.invalidate(&self.root)
    }
}
