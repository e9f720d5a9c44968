//! End-to-end test infrastructure for the playbook engine.
//!
//! Provides a shared TestCorpus that lays out a knowledge base on disk
//! (INDEX.md plus domains/**) and hands out services bound to it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use playbook_loader::LoaderConfig;
use playbook_service::{CacheStore, KnowledgeService};

/// Metadata of a fixture playbook.
#[derive(Debug, Clone)]
pub struct Playbook {
    pub domain: String,
    pub topic: String,
    pub title: String,
    pub tags: Vec<String>,
    pub complexity: String,
    pub review_by: Option<String>,
    pub body: String,
}

impl Playbook {
    pub fn new(domain: &str, title: &str) -> Self {
        Self {
            domain: domain.to_string(),
            topic: title.to_string(),
            title: title.to_string(),
            tags: Vec::new(),
            complexity: "intermediate".to_string(),
            review_by: None,
            body: String::new(),
        }
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn complexity(mut self, complexity: &str) -> Self {
        self.complexity = complexity.to_string();
        self
    }

    pub fn review_by(mut self, date: &str) -> Self {
        self.review_by = Some(date.to_string());
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Markdown source with a YAML frontmatter block.
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "---\ndomain: {}\ntopic: {}\ntags: [{}]\ncomplexity: {}\nlast_updated: 2024-05-01\n",
            self.domain,
            self.topic,
            self.tags.join(", "),
            self.complexity
        );
        if let Some(date) = &self.review_by {
            out.push_str(&format!("review_by: {}\n", date));
        }
        out.push_str(&format!("---\n# {}\n\n{}\n", self.title, self.body));
        out
    }
}

/// A knowledge base laid out in a temp directory.
pub struct TestCorpus {
    /// Keeps temp dir alive for the lifetime of the corpus
    pub _temp_dir: tempfile::TempDir,
    pub root: PathBuf,
    pub store: Arc<CacheStore>,
}

impl TestCorpus {
    /// Empty corpus with a long-lived cache.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(300))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
            store: Arc::new(CacheStore::new(ttl, LoaderConfig::default())),
        }
    }

    /// Write `content` at `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    pub fn add_playbook(&self, rel: &str, playbook: &Playbook) -> PathBuf {
        self.write(rel, &playbook.to_markdown())
    }

    /// Write INDEX.md with a routing table of `(task, target)` rows.
    pub fn write_index(&self, routes: &[(&str, &str)]) -> PathBuf {
        let mut index = String::from("# Index\n\n## Task Routing\n\n| Task | Read This |\n|------|-----------|\n");
        for (task, target) in routes {
            index.push_str(&format!("| {} | `{}` |\n", task, target));
        }
        self.write("INDEX.md", &index)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn service(&self) -> KnowledgeService {
        KnowledgeService::new(Arc::clone(&self.store), &self.root)
    }
}

impl Default for TestCorpus {
    fn default() -> Self {
        Self::new()
    }
}

/// A small mixed-domain corpus used across scenarios.
pub fn sample_corpus() -> TestCorpus {
    let corpus = TestCorpus::new();
    corpus.write_index(&[
        ("pitch deck design", "domains/x/pitch.md"),
        ("logo design", "domains/x/logo.md"),
        ("improve engagement with gamification", "domains/product/gamification.md"),
        ("seo audit", "domains/marketing/seo.md"),
    ]);
    corpus.add_playbook(
        "domains/x/pitch.md",
        &Playbook::new("x", "Pitch Deck Design")
            .tags(&["pitch", "fundraising"])
            .complexity("beginner")
            .body("## TL;DR\n\n- Lead with the problem\n\n## Steps\n\nTen slides.\n"),
    );
    corpus.add_playbook(
        "domains/x/logo.md",
        &Playbook::new("x", "Logo Design").tags(&["branding"]),
    );
    corpus.add_playbook(
        "domains/product/gamification.md",
        &Playbook::new("product", "Gamification Mechanics")
            .tags(&["gamification", "engagement"])
            .complexity("advanced")
            .body("Points, badges and leaderboards."),
    );
    corpus.add_playbook(
        "domains/marketing/seo.md",
        &Playbook::new("marketing", "SEO Basics")
            .tags(&["seo"])
            .complexity("beginner")
            .review_by("2001-01-01"),
    );
    corpus.add_playbook(
        "domains/marketing/launch.md",
        &Playbook::new("marketing", "Product Launch").tags(&["launch"]),
    );
    corpus
}
