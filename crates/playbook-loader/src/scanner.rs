//! Markdown file discovery.
//!
//! Walks a directory depth-first in file-name order so the result is
//! deterministic across runs and platforms.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::LoadError;

/// Directories never descended into (besides hidden ones)
pub const DEFAULT_SKIP_DIRS: &[&str] = &["node_modules"];

/// File discovery rules.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Dependency-manager directory names to skip
    pub skip_dirs: Vec<String>,
    /// File name excluded from the scan (the route table)
    pub index_file: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            index_file: "INDEX.md".to_string(),
        }
    }
}

impl ScanConfig {
    fn skips_dir(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.') || self.skip_dirs.iter().any(|d| d.as_str() == name)
    }

    fn accepts_file(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        name.ends_with(".md") && !name.starts_with('_') && name != self.index_file.as_str()
    }
}

/// Markdown files found under a directory, plus entries that could not be read.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<PathBuf>,
    pub errors: Vec<LoadError>,
}

/// Recursively find playbook files under `dir`.
///
/// Hidden directories, dependency-manager directories, files starting with
/// `_` and the route table file are excluded. Traversal errors are collected
/// and the walk continues.
pub fn find_markdown_files(dir: &Path, config: &ScanConfig) -> ScanResult {
    let mut result = ScanResult::default();

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_type().is_dir() || !config.skips_dir(e));

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && config.accepts_file(&entry) {
                    result.files.push(entry.into_path());
                }
            }
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| dir.display().to_string());
                warn!(path = %path, error = %e, "Failed to scan directory entry");
                result.errors.push(LoadError::Walk {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }

    debug!(dir = ?dir, files = result.files.len(), "Scanned for markdown files");
    result
}
