//! Playbook loading.
//!
//! Turns the `domains/` tree of a corpus root into an ordered list of
//! [`Document`]s. Loading is partial-success: a file that fails to parse is
//! logged, recorded in the outcome and skipped.

use std::fs;
use std::path::{Component, Path};

use serde::Serialize;
use tracing::{info, warn};

use playbook_types::Document;

use crate::error::LoadError;
use crate::frontmatter::parse_frontmatter;
use crate::markdown::{extract_tldr, first_blockquote, first_h1};
use crate::scanner::{find_markdown_files, ScanConfig, DEFAULT_SKIP_DIRS};

/// Corpus layout and discovery rules.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Directory holding the playbooks, relative to the root
    pub domains_dir: String,
    /// Route table file name, relative to the root
    pub index_file: String,
    /// Dependency-manager directory names to skip
    pub skip_dirs: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            domains_dir: "domains".to_string(),
            index_file: "INDEX.md".to_string(),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LoaderConfig {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            skip_dirs: self.skip_dirs.clone(),
            index_file: self.index_file.clone(),
        }
    }
}

/// A source file left out of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Documents loaded from a root, sorted by relative path.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedFile>,
}

impl LoadOutcome {
    fn skip(&mut self, error: &LoadError, path: String) {
        warn!(path = %path, error = %error, "Skipping playbook");
        self.skipped.push(SkippedFile {
            path,
            reason: error.to_string(),
        });
    }
}

/// `path` relative to `root`, always `/`-separated.
pub fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse one markdown file into a Document.
pub fn parse_document(path: &Path, root: &Path) -> Result<Document, LoadError> {
    let relative_path = relative_key(root, path);
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: relative_path.clone(),
        source,
    })?;
    parse_document_str(&raw, path, &relative_path)
}

/// Parse already-read file contents into a Document.
pub fn parse_document_str(
    raw: &str,
    path: &Path,
    relative_path: &str,
) -> Result<Document, LoadError> {
    let parsed = parse_frontmatter(raw, relative_path)?;

    let title = first_h1(&parsed.body)
        .or_else(|| Some(parsed.frontmatter.topic.clone()).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| relative_path.to_string())
        });
    let description = first_blockquote(&parsed.body).unwrap_or_default();
    let tldr = extract_tldr(&parsed.body).unwrap_or_default();

    Ok(Document {
        path: path.display().to_string(),
        relative_path: relative_path.to_string(),
        title,
        description,
        tldr,
        content: parsed.body,
        frontmatter: parsed.frontmatter,
        warnings: parsed.warnings,
    })
}

/// Load every playbook under `root/<domains_dir>`.
pub fn load_documents(root: &Path, config: &LoaderConfig) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();
    let domains = root.join(&config.domains_dir);

    if !domains.is_dir() {
        warn!(path = ?domains, "Domains directory not found");
        return outcome;
    }

    let scan = find_markdown_files(&domains, &config.scan_config());
    for error in &scan.errors {
        let path = match error {
            LoadError::Walk { path, .. } => path.clone(),
            _ => domains.display().to_string(),
        };
        outcome.skip(error, path);
    }

    for file in &scan.files {
        match parse_document(file, root) {
            Ok(document) => outcome.documents.push(document),
            Err(e) => outcome.skip(&e, relative_key(root, file)),
        }
    }

    outcome
        .documents
        .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    info!(
        count = outcome.documents.len(),
        skipped = outcome.skipped.len(),
        "Playbooks loaded"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PLAYBOOK: &str = "---\ndomain: design\ntopic: Logos\ntags: [branding]\ncomplexity: beginner\nlast_updated: 2024-05-01\n---\n# Logo Design\n\n> Make a mark.\n\n## TL;DR\n\n- Keep it simple\n";

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_document_fields() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "domains/design/logo.md", PLAYBOOK);

        let doc = parse_document(&temp.path().join("domains/design/logo.md"), temp.path()).unwrap();
        assert_eq!(doc.relative_path, "domains/design/logo.md");
        assert_eq!(doc.title, "Logo Design");
        assert_eq!(doc.description, "Make a mark.");
        assert_eq!(doc.tldr, "Keep it simple");
        assert_eq!(doc.frontmatter.domain, "design");
        assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
    }

    #[test]
    fn test_title_falls_back_to_topic_then_file_stem() {
        let with_topic = parse_document_str(
            "---\ntopic: Cold Outreach\n---\nNo heading.\n",
            Path::new("/kb/domains/sales/cold.md"),
            "domains/sales/cold.md",
        )
        .unwrap();
        assert_eq!(with_topic.title, "Cold Outreach");

        let bare = parse_document_str(
            "No frontmatter, no heading.\n",
            Path::new("/kb/domains/sales/warm-intro.md"),
            "domains/sales/warm-intro.md",
        )
        .unwrap();
        assert_eq!(bare.title, "warm-intro");
        assert_eq!(bare.frontmatter.domain, "sales");
        assert!(!bare.warnings.is_empty());
    }

    #[test]
    fn test_load_documents_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "domains/z/last.md", PLAYBOOK);
        write(temp.path(), "domains/a/first.md", PLAYBOOK);
        write(temp.path(), "domains/a/_template.md", PLAYBOOK);
        write(temp.path(), "INDEX.md", "| Task | Read This |\n");
        write(temp.path(), "outside.md", PLAYBOOK);

        let outcome = load_documents(temp.path(), &LoaderConfig::default());
        let paths: Vec<&str> = outcome
            .documents
            .iter()
            .map(|d| d.relative_path.as_str())
            .collect();
        assert_eq!(paths, vec!["domains/a/first.md", "domains/z/last.md"]);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_broken_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "domains/a/good.md", PLAYBOOK);
        fs::write(temp.path().join("domains/a/binary.md"), [0xff, 0xfe, 0x00]).unwrap();

        let outcome = load_documents(temp.path(), &LoaderConfig::default());
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.documents[0].relative_path, "domains/a/good.md");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].path, "domains/a/binary.md");
    }

    #[test]
    fn test_vendor_domain_is_loaded() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "domains/vendor/contracts.md",
            "---\ndomain: vendor\ntopic: Contracts\ncomplexity: beginner\n---\n# Vendor Contracts\n",
        );

        let outcome = load_documents(temp.path(), &LoaderConfig::default());
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.documents[0].relative_path, "domains/vendor/contracts.md");
        assert_eq!(outcome.documents[0].domain(), "vendor");
    }

    #[test]
    fn test_missing_domains_dir_yields_empty() {
        let temp = TempDir::new().unwrap();
        let outcome = load_documents(temp.path(), &LoaderConfig::default());
        assert!(outcome.documents.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_load_is_idempotent() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "domains/b/two.md", PLAYBOOK);
        write(temp.path(), "domains/a/one.md", PLAYBOOK);

        let first = load_documents(temp.path(), &LoaderConfig::default());
        let second = load_documents(temp.path(), &LoaderConfig::default());
        assert_eq!(first.documents, second.documents);
    }

    #[test]
    fn test_relative_key_uses_forward_slashes() {
        let root = Path::new("/kb");
        let path = Path::new("/kb/domains/x/pitch.md");
        assert_eq!(relative_key(root, path), "domains/x/pitch.md");
    }
}
