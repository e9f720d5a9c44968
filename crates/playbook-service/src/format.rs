//! Result rendering as JSON or markdown.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;

use playbook_types::Status;

use crate::diagnose::{Diagnosis, HealthStatus};
use crate::error::ServiceError;
use crate::list::{ListResults, Summary};
use crate::read::ReadResult;
use crate::route::RouteOutcome;
use crate::search::SearchResults;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    #[default]
    Markdown,
}

impl FromStr for ResponseFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "markdown" | "md" => Ok(ResponseFormat::Markdown),
            other => Err(ServiceError::Validation(format!(
                "Unknown response format: {} (expected json or markdown)",
                other
            ))),
        }
    }
}

/// Human-readable markdown view of a result.
pub trait ToMarkdown {
    fn to_markdown(&self) -> String;
}

/// Render `value` in the requested format.
pub fn render<T>(value: &T, format: ResponseFormat) -> Result<String, ServiceError>
where
    T: Serialize + ToMarkdown,
{
    match format {
        ResponseFormat::Markdown => Ok(value.to_markdown()),
        ResponseFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| ServiceError::System(format!("Failed to encode result: {}", e))),
    }
}

fn status_marker(stale: bool, status: Option<Status>) -> String {
    let mut marker = String::new();
    if stale {
        marker.push_str(" (stale)");
    }
    if let Some(status) = status.filter(|s| *s != Status::Validated) {
        let _ = write!(marker, " [{}]", status.as_str());
    }
    marker
}

impl ToMarkdown for RouteOutcome {
    fn to_markdown(&self) -> String {
        let result = match self {
            RouteOutcome::NoMatch { message, .. } => return message.clone(),
            RouteOutcome::Matched(result) => result,
        };

        let mut out = String::new();
        let _ = writeln!(out, "## {}", result.title);
        let _ = writeln!(out, "**Path:** `{}`", result.target);
        let _ = write!(
            out,
            "**Domain:** {} | **Confidence:** {}",
            result.domain, result.confidence
        );
        if let Some(tldr) = &result.tldr {
            let _ = write!(out, "\n\n> {}", tldr);
        }
        if !result.alternatives.is_empty() {
            out.push_str("\n\n### Alternatives");
            for alt in &result.alternatives {
                let _ = write!(
                    out,
                    "\n- `{}` ({}): {}",
                    alt.target, alt.confidence, alt.title
                );
            }
        }
        out
    }
}

impl ToMarkdown for SearchResults {
    fn to_markdown(&self) -> String {
        if self.results.is_empty() {
            return "No results found.".to_string();
        }
        let mut out = format!("## Search Results ({})\n", self.total);
        for item in &self.results {
            let _ = write!(
                out,
                "\n- **{}** (score: {}) `{}`{}",
                item.title,
                item.score,
                item.path,
                status_marker(item.stale, item.status)
            );
            if let Some(tldr) = &item.tldr {
                let _ = write!(out, "\n  > {}", tldr);
            }
        }
        out
    }
}

impl ToMarkdown for ListResults {
    fn to_markdown(&self) -> String {
        if self.results.is_empty() {
            return "No playbooks found.".to_string();
        }
        let mut out = format!("## Playbooks ({})\n", self.total);
        let mut current_domain: Option<&str> = None;
        for item in &self.results {
            if current_domain != Some(item.domain.as_str()) {
                current_domain = Some(item.domain.as_str());
                let _ = write!(out, "\n### {}\n", item.domain);
            }
            let _ = write!(
                out,
                "\n- **{}** (`{}`) `{}`{}",
                item.title,
                item.complexity,
                item.path,
                status_marker(item.stale, item.status)
            );
        }
        out
    }
}

impl ToMarkdown for ReadResult {
    fn to_markdown(&self) -> String {
        format!(
            "# {}\n\n**Domain:** {}\n**Complexity:** {}\n**Tags:** {}\n\n---\n\n{}",
            self.title,
            self.frontmatter.domain,
            self.frontmatter.complexity,
            self.frontmatter.tags.join(", "),
            self.content
        )
    }
}

impl ToMarkdown for Summary {
    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## Knowledge Base Summary\n**Total playbooks:** {}\n\n### Domains",
            self.total
        );
        for (domain, count) in &self.domains {
            let _ = write!(out, "\n- {}: {}", domain, count);
        }
        let dist = &self.complexity_distribution;
        let _ = write!(
            out,
            "\n\n### Complexity Distribution\n- beginner: {}\n- intermediate: {}\n- advanced: {}",
            dist.beginner, dist.intermediate, dist.advanced
        );
        out
    }
}

impl ToMarkdown for Diagnosis {
    fn to_markdown(&self) -> String {
        let badge = match self.status {
            HealthStatus::Healthy => "OK",
            HealthStatus::Degraded => "WARN",
            HealthStatus::Error => "FAIL",
        };
        let mut out = format!(
            "## [{}] Playbook Diagnostics\n**Status:** {} | **Version:** {}\n**Playbooks:** {} | **Routes:** {} | **Search index:** {}",
            badge,
            self.status.as_str(),
            self.version,
            self.documents_count,
            self.routes_count,
            self.search_index_size
        );
        if !self.issues.is_empty() {
            out.push_str("\n\n### Issues");
            for issue in &self.issues {
                let _ = write!(out, "\n- {}", issue);
            }
        }
        if !self.recommendations.is_empty() {
            out.push_str("\n\n### Recommendations");
            for rec in &self.recommendations {
                let _ = write!(out, "\n- {}", rec);
            }
        }
        out
    }
}

impl ToMarkdown for Vec<String> {
    fn to_markdown(&self) -> String {
        self.iter().map(|s| format!("- {}", s)).collect::<Vec<_>>().join("\n")
    }
}
