//! Caller path resolution.
//!
//! A requested path is resolved in order:
//! 1. exact relative path of a loaded document
//! 2. a document whose relative path ends with, then contains, the request
//! 3. a direct read of a file under the corpus root
//!
//! Step 3 rejects anything that could leave the root before touching the
//! filesystem, then confirms the canonical target is still inside the root.

use std::fs;
use std::path::{Component, Path};

use tracing::{debug, warn};

use playbook_types::Document;

use crate::error::ServiceError;
use crate::snapshot::Snapshot;

pub const OUTSIDE_ROOT_MESSAGE: &str =
    "Invalid path: access outside knowledge base is not allowed.";

/// Outcome of resolving a caller path.
#[derive(Debug)]
pub enum Resolved<'a> {
    /// A loaded playbook
    Document(&'a Document),
    /// A file read straight from the corpus root
    File { content: String },
}

pub fn not_found(requested: &str) -> ServiceError {
    ServiceError::NotFound(format!(
        "Playbook not found: {}. Use list to see available playbooks.",
        requested
    ))
}

/// Find a loaded document by exact path, then by suffix, then by substring.
///
/// Several suffix or substring candidates resolve to the shortest relative
/// path, then the lexicographically smallest.
pub fn find_document<'a>(snapshot: &'a Snapshot, requested: &str) -> Option<&'a Document> {
    if let Some(doc) = snapshot.document(requested) {
        return Some(doc);
    }

    let best = |matches: &dyn Fn(&Document) -> bool| {
        snapshot
            .documents()
            .iter()
            .filter(|doc| matches(doc))
            .min_by(|a, b| {
                a.relative_path
                    .len()
                    .cmp(&b.relative_path.len())
                    .then_with(|| a.relative_path.cmp(&b.relative_path))
            })
    };

    best(&|doc| doc.relative_path.ends_with(requested))
        .or_else(|| best(&|doc| doc.relative_path.contains(requested)))
}

fn has_drive_prefix(requested: &str) -> bool {
    let bytes = requested.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Reject paths that could escape the corpus root.
///
/// Purely lexical: no filesystem access happens here.
pub fn check_confined(requested: &str) -> Result<(), ServiceError> {
    let escapes = requested.contains('\0')
        || requested.starts_with('/')
        || requested.starts_with('\\')
        || has_drive_prefix(requested)
        || Path::new(requested).is_absolute()
        || requested.split(['/', '\\']).any(|segment| segment == "..")
        || Path::new(requested)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes {
        warn!(path = %requested, "Rejected path outside knowledge base");
        return Err(ServiceError::Security(OUTSIDE_ROOT_MESSAGE.to_string()));
    }
    Ok(())
}

/// Read `requested` relative to `root`.
///
/// Returns `Ok(None)` when no such file exists inside the root.
pub fn read_confined(root: &Path, requested: &str) -> Result<Option<String>, ServiceError> {
    check_confined(requested)?;

    let Ok(canonical_root) = root.canonicalize() else {
        return Ok(None);
    };
    let Ok(target) = root.join(requested).canonicalize() else {
        return Ok(None);
    };
    if !target.starts_with(&canonical_root) {
        warn!(path = %requested, target = ?target, "Rejected link outside knowledge base");
        return Err(ServiceError::Security(OUTSIDE_ROOT_MESSAGE.to_string()));
    }
    if !target.is_file() {
        return Ok(None);
    }

    debug!(path = ?target, "Reading file from knowledge base");
    fs::read_to_string(&target)
        .map(Some)
        .map_err(|_| ServiceError::System(format!("Failed to read file: {}", requested)))
}

/// Resolve `requested` against a snapshot.
pub fn resolve<'a>(snapshot: &'a Snapshot, requested: &str) -> Result<Resolved<'a>, ServiceError> {
    if let Some(doc) = find_document(snapshot, requested) {
        return Ok(Resolved::Document(doc));
    }

    match read_confined(snapshot.root(), requested)? {
        Some(content) => Ok(Resolved::File { content }),
        None => Err(not_found(requested)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook_loader::LoaderConfig;
    use tempfile::TempDir;

    fn playbook(domain: &str, title: &str) -> String {
        format!(
            "---\ndomain: {}\ntopic: {}\ntags: []\ncomplexity: beginner\nlast_updated: 2024-01-01\n---\n# {}\n",
            domain, title, title
        )
    }

    fn corpus() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for (rel, domain, title) in [
            ("domains/design/logo.md", "design", "Logo"),
            ("domains/design/brand/logo.md", "design", "Brand Logo"),
            ("domains/marketing/seo.md", "marketing", "SEO"),
        ] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, playbook(domain, title)).unwrap();
        }
        fs::write(root.join("NOTES.txt"), "plain notes").unwrap();
        temp
    }

    fn snapshot(temp: &TempDir) -> Snapshot {
        Snapshot::build(temp.path(), &LoaderConfig::default()).unwrap()
    }

    #[test]
    fn test_exact_match_wins() {
        let temp = corpus();
        let snap = snapshot(&temp);
        let doc = find_document(&snap, "domains/design/brand/logo.md").unwrap();
        assert_eq!(doc.title, "Brand Logo");
    }

    #[test]
    fn test_suffix_prefers_shortest_path() {
        let temp = corpus();
        let snap = snapshot(&temp);
        let doc = find_document(&snap, "logo.md").unwrap();
        assert_eq!(doc.relative_path, "domains/design/logo.md");
    }

    #[test]
    fn test_suffix_beats_substring() {
        let temp = corpus();
        let snap = snapshot(&temp);
        // "brand" only appears mid-path; "seo.md" is a suffix
        assert_eq!(
            find_document(&snap, "brand").unwrap().relative_path,
            "domains/design/brand/logo.md"
        );
        assert_eq!(
            find_document(&snap, "seo.md").unwrap().relative_path,
            "domains/marketing/seo.md"
        );
        assert_eq!(
            find_document(&snap, "design").unwrap().relative_path,
            "domains/design/logo.md"
        );
    }

    #[test]
    fn test_filesystem_fallback() {
        let temp = corpus();
        let snap = snapshot(&temp);
        match resolve(&snap, "NOTES.txt").unwrap() {
            Resolved::File { content } => assert_eq!(content, "plain notes"),
            other => panic!("expected file, got {:?}", other),
        }
    }

    #[test]
    fn test_traversal_is_security_error() {
        let temp = corpus();
        let snap = snapshot(&temp);
        for path in [
            "../../etc/passwd",
            "/etc/passwd",
            "domains/../../etc/passwd",
            "..\\..\\windows\\win.ini",
            "C:\\Windows\\win.ini",
            "c:secret",
            "\\\\server\\share",
            "domains/\0/x",
        ] {
            let err = resolve(&snap, path).unwrap_err();
            assert_eq!(err.kind(), "security_error", "path {:?}", path);
            assert_eq!(err.to_string(), OUTSIDE_ROOT_MESSAGE);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_security_error() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();

        let temp = corpus();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("escape")).unwrap();
        let snap = snapshot(&temp);

        let err = resolve(&snap, "escape/secret.txt").unwrap_err();
        assert_eq!(err.kind(), "security_error");
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let temp = corpus();
        let snap = snapshot(&temp);
        let err = resolve(&snap, "domains/nothing/here.md").unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert!(err.to_string().contains("Use list"));
    }

    #[test]
    fn test_directory_is_not_found() {
        let temp = corpus();
        let snap = snapshot(&temp);
        assert_eq!(resolve(&snap, "./").unwrap_err().kind(), "not_found");
    }
}
