//! Corpus health check.

use std::fs;
use std::path::Path;

use serde::Serialize;

use playbook_loader::LoaderConfig;

use crate::cache::CacheStats;
use crate::snapshot::Snapshot;

/// Below this many playbooks diagnose suggests adding more
pub const RECOMMENDED_MIN_DOCUMENTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Error,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Error => "error",
        }
    }

    fn degrade(&mut self) {
        if *self == HealthStatus::Healthy {
            *self = HealthStatus::Degraded;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheReport {
    pub is_cached: bool,
    pub age_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub status: HealthStatus,
    pub version: String,
    pub knowledge_path: String,
    pub knowledge_path_exists: bool,
    pub index_exists: bool,
    pub domains_found: Vec<String>,
    pub documents_count: usize,
    pub routes_count: usize,
    pub search_index_size: usize,
    pub skipped_files: usize,
    pub documents_with_warnings: usize,
    pub cache: CacheReport,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

fn subdirectories(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

/// Inspect `root` and the snapshot built from it.
pub fn diagnose(
    root: &Path,
    config: &LoaderConfig,
    snapshot: &Snapshot,
    cache: &CacheStats,
) -> Diagnosis {
    let mut status = HealthStatus::Healthy;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let knowledge_path_exists = root.exists();
    if !knowledge_path_exists {
        issues.push(format!(
            "Knowledge path does not exist: {}",
            root.display()
        ));
        status = HealthStatus::Error;
    }

    let index_exists = root.join(&config.index_file).exists();
    if !index_exists && knowledge_path_exists {
        issues.push(format!("{} not found in knowledge path", config.index_file));
        recommendations.push(format!(
            "Create {} with a task routing table",
            config.index_file
        ));
        status.degrade();
    }

    let domains_dir = root.join(&config.domains_dir);
    let mut domains_found = Vec::new();
    if domains_dir.exists() {
        match subdirectories(&domains_dir) {
            Ok(names) => domains_found = names,
            Err(_) => issues.push(format!("Could not read {} directory", config.domains_dir)),
        }
    } else if knowledge_path_exists {
        issues.push(format!("{}/ directory not found", config.domains_dir));
        recommendations.push(format!(
            "Create {}/ directory with playbook subdirectories",
            config.domains_dir
        ));
        status.degrade();
    }

    let documents_count = snapshot.documents().len();
    if documents_count == 0 && knowledge_path_exists {
        issues.push("No playbooks loaded".to_string());
        recommendations.push(format!(
            "Add .md playbook files to {}/ subdirectories",
            config.domains_dir
        ));
        status.degrade();
    } else if documents_count < RECOMMENDED_MIN_DOCUMENTS {
        recommendations.push(format!(
            "Only {} playbooks found. Consider adding more for better coverage.",
            documents_count
        ));
    }

    let routes_count = snapshot.routes().len();
    if routes_count == 0 && index_exists {
        issues.push(format!("No routes found in {}", config.index_file));
        recommendations.push(format!(
            "Add task routing entries to {}",
            config.index_file
        ));
        status.degrade();
    }

    let missing_identity = snapshot
        .documents()
        .iter()
        .filter(|doc| doc.missing_identity())
        .count();
    if missing_identity > 0 {
        recommendations.push(format!(
            "{} playbooks are missing frontmatter (domain/topic)",
            missing_identity
        ));
    }

    let skipped_files = snapshot.skipped().len();
    if skipped_files > 0 {
        issues.push(format!("{} files could not be parsed and were skipped", skipped_files));
    }

    Diagnosis {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        knowledge_path: root.display().to_string(),
        knowledge_path_exists,
        index_exists,
        domains_found,
        documents_count,
        routes_count,
        search_index_size: snapshot.search_index().len(),
        skipped_files,
        documents_with_warnings: snapshot
            .documents()
            .iter()
            .filter(|doc| !doc.warnings.is_empty())
            .count(),
        cache: CacheReport {
            is_cached: cache.is_cached,
            age_ms: cache.age_ms,
        },
        issues,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run(root: &Path) -> Diagnosis {
        let config = LoaderConfig::default();
        let snapshot = Snapshot::build(root, &config).unwrap();
        let cache = CacheStats {
            is_cached: true,
            age_ms: Some(0),
            documents: snapshot.documents().len(),
            routes: snapshot.routes().len(),
        };
        diagnose(root, &config, &snapshot, &cache)
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let diagnosis = run(&temp.path().join("absent"));
        assert_eq!(diagnosis.status, HealthStatus::Error);
        assert!(!diagnosis.knowledge_path_exists);
        assert!(diagnosis.issues[0].starts_with("Knowledge path does not exist"));
    }

    #[test]
    fn test_empty_root_is_degraded() {
        let temp = TempDir::new().unwrap();
        let diagnosis = run(temp.path());
        assert_eq!(diagnosis.status, HealthStatus::Degraded);
        assert!(diagnosis
            .issues
            .contains(&"INDEX.md not found in knowledge path".to_string()));
        assert!(diagnosis
            .issues
            .contains(&"domains/ directory not found".to_string()));
        assert!(diagnosis.issues.contains(&"No playbooks loaded".to_string()));
    }

    #[test]
    fn test_healthy_small_corpus() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "INDEX.md",
            "| Task | Read This |\n|---|---|\n| logo | domains/design/logo.md |\n",
        );
        write(
            temp.path(),
            "domains/design/logo.md",
            "---\ndomain: design\ntopic: Logos\ntags: [a]\ncomplexity: beginner\nlast_updated: 2024-01-01\n---\n# Logo\n",
        );
        write(temp.path(), "domains/ops/untagged.md", "# No frontmatter\n");

        let diagnosis = run(temp.path());
        assert_eq!(diagnosis.status, HealthStatus::Healthy);
        assert_eq!(diagnosis.domains_found, vec!["design", "ops"]);
        assert_eq!(diagnosis.documents_count, 2);
        assert_eq!(diagnosis.routes_count, 1);
        assert_eq!(diagnosis.search_index_size, 2);
        assert_eq!(diagnosis.documents_with_warnings, 1);
        assert!(diagnosis
            .recommendations
            .contains(&"Only 2 playbooks found. Consider adding more for better coverage.".to_string()));
        assert!(diagnosis
            .recommendations
            .contains(&"1 playbooks are missing frontmatter (domain/topic)".to_string()));
    }

    #[test]
    fn test_index_without_routes_is_degraded() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "INDEX.md", "# Nothing routed\n");
        write(
            temp.path(),
            "domains/design/logo.md",
            "---\ndomain: design\ntopic: Logos\ntags: [a]\ncomplexity: beginner\nlast_updated: 2024-01-01\n---\n# Logo\n",
        );
        let diagnosis = run(temp.path());
        assert_eq!(diagnosis.status, HealthStatus::Degraded);
        assert!(diagnosis
            .issues
            .contains(&"No routes found in INDEX.md".to_string()));
    }
}
