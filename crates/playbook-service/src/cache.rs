//! Snapshot cache keyed by corpus root.
//!
//! A cached snapshot stays valid while all of these hold:
//! - it was built for the requested root
//! - it is younger than the TTL
//! - every watched path has the modification time recorded at build
//!
//! The store lock is held across a rebuild, so concurrent misses on any
//! root do the work once.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use playbook_loader::LoaderConfig;
use playbook_types::DEFAULT_CACHE_TTL_MS;

use crate::error::ServiceError;
use crate::snapshot::{observe_mtime, Snapshot};

/// Why a cached snapshot cannot be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Empty,
    RootMismatch,
    Expired,
    Modified(PathBuf),
    StatFailed(PathBuf),
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invalidation::Empty => write!(f, "not cached"),
            Invalidation::RootMismatch => write!(f, "root mismatch"),
            Invalidation::Expired => write!(f, "ttl expired"),
            Invalidation::Modified(path) => write!(f, "modified: {}", path.display()),
            Invalidation::StatFailed(path) => write!(f, "stat failed: {}", path.display()),
        }
    }
}

/// Cache state of one root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub is_cached: bool,
    pub age_ms: Option<u64>,
    pub documents: usize,
    pub routes: usize,
}

/// Store of snapshots, one per corpus root.
#[derive(Debug)]
pub struct CacheStore {
    ttl: Duration,
    loader: LoaderConfig,
    slots: Mutex<HashMap<PathBuf, Arc<Snapshot>>>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            LoaderConfig::default(),
        )
    }
}

impl CacheStore {
    pub fn new(ttl: Duration, loader: LoaderConfig) -> Self {
        Self {
            ttl,
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn loader_config(&self) -> &LoaderConfig {
        &self.loader
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<Snapshot>>> {
        // Entries are whole Arcs; a poisoned map is still consistent
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check whether `snapshot` may serve `root`.
    pub fn check(&self, snapshot: &Snapshot, root: &Path) -> Result<(), Invalidation> {
        if snapshot.root() != root {
            return Err(Invalidation::RootMismatch);
        }
        if snapshot.age() >= self.ttl {
            return Err(Invalidation::Expired);
        }
        for (path, recorded) in snapshot.watched_mtimes() {
            match observe_mtime(path) {
                Ok(current) if current == *recorded => {}
                Ok(_) => return Err(Invalidation::Modified(path.clone())),
                Err(_) => return Err(Invalidation::StatFailed(path.clone())),
            }
        }
        Ok(())
    }

    /// Current snapshot of `root`, rebuilding it when stale.
    pub fn get_or_load(&self, root: &Path) -> Result<Arc<Snapshot>, ServiceError> {
        let mut slots = self.slots();

        let reason = match slots.get(root) {
            Some(snapshot) => match self.check(snapshot, root) {
                Ok(()) => {
                    debug!(path = ?root, "Using cached knowledge base");
                    return Ok(Arc::clone(snapshot));
                }
                Err(reason) => reason,
            },
            None => Invalidation::Empty,
        };

        info!(path = ?root, reason = %reason, "Rebuilding snapshot");
        let snapshot = Arc::new(Snapshot::build(root, &self.loader)?);
        slots.insert(root.to_path_buf(), Arc::clone(&snapshot));
        Ok(snapshot)
    }

    pub fn stats(&self, root: &Path) -> CacheStats {
        match self.slots().get(root) {
            Some(snapshot) => CacheStats {
                is_cached: true,
                age_ms: Some(snapshot.age().as_millis() as u64),
                documents: snapshot.documents().len(),
                routes: snapshot.routes().len(),
            },
            None => CacheStats {
                is_cached: false,
                age_ms: None,
                documents: 0,
                routes: 0,
            },
        }
    }

    /// Drop the snapshot of `root`. Returns whether one was cached.
    pub fn invalidate(&self, root: &Path) -> bool {
        let removed = self.slots().remove(root).is_some();
        debug!(path = ?root, removed, "Invalidated snapshot");
        removed
    }

    pub fn clear(&self) {
        self.slots().clear();
    }

    /// Number of cached roots
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
