//! Task routing.

use serde::Serialize;
use tracing::debug;

use playbook_loader::domain_from_path;
use playbook_search::{confidence, DEFAULT_ROUTE_LIMIT};

use crate::error::ServiceError;
use crate::resolve::find_document;
use crate::snapshot::Snapshot;

/// Alternatives reported next to the best route
pub const MAX_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteAlternative {
    pub target: String,
    pub confidence: f64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub target: String,
    pub confidence: f64,
    pub title: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tldr: Option<String>,
    pub alternatives: Vec<RouteAlternative>,
}

/// Routing outcome. No match is an answer, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    Matched(RouteResult),
    NoMatch { task: String, message: String },
}

/// Human title for a target path with no loaded document.
///
/// `domains/x/pitch-deck.md` becomes `Pitch Deck`.
pub fn title_from_path(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.strip_suffix(".md").unwrap_or(file);
    stem.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Route `task` to the best playbook of `snapshot`.
pub fn route_task(snapshot: &Snapshot, task: &str) -> Result<RouteOutcome, ServiceError> {
    if task.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Task description is required".to_string(),
        ));
    }

    let matches = snapshot.route_matcher().match_query(task, DEFAULT_ROUTE_LIMIT);
    let Some(top) = matches.first() else {
        debug!(task = task, "No route matched");
        return Ok(RouteOutcome::NoMatch {
            task: task.to_string(),
            message: format!(
                "No matching playbook found for task: \"{}\". Try search for broader results.",
                task
            ),
        });
    };

    let target = top.route.target.as_str();
    let document = find_document(snapshot, target);

    let alternatives = matches
        .iter()
        .skip(1)
        .take(MAX_ALTERNATIVES)
        .map(|m| RouteAlternative {
            target: m.route.target.clone(),
            confidence: confidence(m.score, task),
            title: find_document(snapshot, &m.route.target)
                .map(|doc| doc.title.clone())
                .unwrap_or_else(|| title_from_path(&m.route.target)),
        })
        .collect();

    Ok(RouteOutcome::Matched(RouteResult {
        target: target.to_string(),
        confidence: confidence(top.score, task),
        title: document
            .map(|doc| doc.title.clone())
            .unwrap_or_else(|| title_from_path(target)),
        domain: document
            .map(|doc| doc.domain().to_string())
            .unwrap_or_else(|| domain_from_path(target)),
        tldr: document
            .map(|doc| doc.tldr.clone())
            .filter(|tldr| !tldr.is_empty()),
        alternatives,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook_loader::LoaderConfig;
    use std::fs;
    use tempfile::TempDir;

    const INDEX: &str = "# Index\n\n| Task | Read This |\n|---|---|\n| pitch deck design | `domains/x/pitch.md` |\n| logo design | `domains/x/logo.md` |\n| brand refresh | `domains/brand/brand-refresh-guide.md` |\n";

    fn corpus() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("domains/x")).unwrap();
        fs::write(temp.path().join("INDEX.md"), INDEX).unwrap();
        fs::write(
            temp.path().join("domains/x/pitch.md"),
            "---\ndomain: x\ntopic: Pitch\ntags: [pitch]\ncomplexity: beginner\nlast_updated: 2024-01-01\n---\n# Pitch Decks\n\n## TL;DR\n\nTell a story.\n",
        )
        .unwrap();
        temp
    }

    fn snapshot(temp: &TempDir) -> Snapshot {
        Snapshot::build(temp.path(), &LoaderConfig::default()).unwrap()
    }

    #[test]
    fn test_route_to_loaded_document() {
        let temp = corpus();
        let snap = snapshot(&temp);
        let RouteOutcome::Matched(result) = route_task(&snap, "pitch deck design").unwrap() else {
            panic!("expected a match");
        };
        assert_eq!(result.target, "domains/x/pitch.md");
        assert_eq!(result.title, "Pitch Decks");
        assert_eq!(result.domain, "x");
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.tldr.as_deref(), Some("Tell a story."));
        assert_eq!(result.alternatives.len(), 1);
        assert_eq!(result.alternatives[0].target, "domains/x/logo.md");
        assert_eq!(result.alternatives[0].title, "Logo");
        assert_eq!(result.alternatives[0].confidence, 0.5);
    }

    #[test]
    fn test_unloaded_target_uses_path() {
        let temp = corpus();
        let snap = snapshot(&temp);
        let RouteOutcome::Matched(result) = route_task(&snap, "brand refresh").unwrap() else {
            panic!("expected a match");
        };
        assert_eq!(result.title, "Brand Refresh Guide");
        assert_eq!(result.domain, "brand");
        assert_eq!(result.tldr, None);
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let temp = corpus();
        let snap = snapshot(&temp);
        let outcome = route_task(&snap, "quarterly taxes").unwrap();
        assert!(matches!(outcome, RouteOutcome::NoMatch { .. }));
    }

    #[test]
    fn test_empty_task_is_validation_error() {
        let temp = corpus();
        let snap = snapshot(&temp);
        let err = route_task(&snap, "  ").unwrap_err();
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(err.to_string(), "Task description is required");
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(title_from_path("domains/x/pitch-deck.md"), "Pitch Deck");
        assert_eq!(title_from_path("notes.md"), "Notes");
    }
}
