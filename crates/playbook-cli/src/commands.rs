//! Command implementations for the playbook CLI.
//!
//! Results go to stdout; logs go to stderr so output stays pipeable.

use anyhow::{Context, Result};
use tracing::debug;

use playbook_service::{
    render, KnowledgeService, ListOptions, ResponseFormat, SearchOptions, ServiceError,
};
use playbook_types::Settings;

use crate::cli::{Cli, Commands};

/// Load configuration and apply CLI overrides (highest precedence).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(path) = &cli.knowledge_path {
        settings.knowledge_path = path.clone();
    }
    if let Some(level) = &cli.log_level {
        settings.log_level = level.clone();
    }
    Ok(settings)
}

/// Install a stderr subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Run one command and return its rendered output.
///
/// A read of an unknown path is reported as output, not as a failure.
pub fn execute(
    service: &KnowledgeService,
    command: &Commands,
    format: ResponseFormat,
) -> Result<String, ServiceError> {
    debug!(command = ?command, "Executing command");
    match command {
        Commands::Route { task } => render(&service.route(task)?, format),
        Commands::Search {
            query,
            domain,
            complexity,
            limit,
        } => {
            let options = SearchOptions {
                domain: domain.clone(),
                complexity: *complexity,
                limit: *limit,
            };
            render(&service.search(query, &options)?, format)
        }
        Commands::List {
            domain,
            complexity,
            limit,
        } => {
            let options = ListOptions {
                domain: domain.clone(),
                complexity: *complexity,
                limit: *limit,
            };
            render(&service.list(&options)?, format)
        }
        Commands::Read { path, section } => match service.read(path, section.as_deref()) {
            Ok(result) => render(&result, format),
            Err(ServiceError::NotFound(message)) => Ok(message),
            Err(e) => Err(e),
        },
        Commands::Summary => render(&service.summary()?, format),
        Commands::Diagnose => render(&service.diagnose()?, format),
    }
}

/// Entry point used by the binary.
pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    init_logging(&settings.log_level)?;

    debug!(
        knowledge_path = %settings.knowledge_path,
        cache_ttl_ms = settings.cache_ttl_ms,
        "Configuration loaded"
    );

    let service = KnowledgeService::from_settings(&settings);
    let output = execute(&service, &cli.command, cli.format.into())
        .map_err(|e| anyhow::anyhow!("{}: {}", e.kind(), e))?;
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use playbook_service::CacheStore;
    use tempfile::TempDir;

    fn service() -> (TempDir, KnowledgeService) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("domains/x")).unwrap();
        fs::write(
            temp.path().join("domains/x/pitch.md"),
            "---\ndomain: x\ntopic: Pitch\ntags: [pitch]\ncomplexity: beginner\nlast_updated: 2024-01-01\n---\n# Pitch Decks\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("INDEX.md"),
            "| Task | Read This |\n|---|---|\n| pitch deck design | domains/x/pitch.md |\n",
        )
        .unwrap();
        let service = KnowledgeService::new(Arc::new(CacheStore::default()), temp.path());
        (temp, service)
    }

    #[test]
    fn test_execute_route_markdown() {
        let (_temp, service) = service();
        let command = Commands::Route {
            task: "pitch deck".to_string(),
        };
        let output = execute(&service, &command, ResponseFormat::Markdown).unwrap();
        assert!(output.starts_with("## Pitch Decks"));
    }

    #[test]
    fn test_execute_route_no_match_is_output() {
        let (_temp, service) = service();
        let command = Commands::Route {
            task: "quarterly taxes".to_string(),
        };
        let output = execute(&service, &command, ResponseFormat::Markdown).unwrap();
        assert!(output.starts_with("No matching playbook found"));
    }

    #[test]
    fn test_execute_read_not_found_is_output() {
        let (_temp, service) = service();
        let command = Commands::Read {
            path: "domains/none.md".to_string(),
            section: None,
        };
        let output = execute(&service, &command, ResponseFormat::Json).unwrap();
        assert!(output.starts_with("Playbook not found"));
    }

    #[test]
    fn test_execute_read_traversal_fails() {
        let (_temp, service) = service();
        let command = Commands::Read {
            path: "../../etc/passwd".to_string(),
            section: None,
        };
        let err = execute(&service, &command, ResponseFormat::Json).unwrap_err();
        assert_eq!(err.kind(), "security_error");
    }

    #[test]
    fn test_execute_search_empty_query_fails() {
        let (_temp, service) = service();
        let command = Commands::Search {
            query: " ".to_string(),
            domain: None,
            complexity: None,
            limit: None,
        };
        let err = execute(&service, &command, ResponseFormat::Json).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_execute_summary_json() {
        let (_temp, service) = service();
        let output = execute(&service, &Commands::Summary, ResponseFormat::Json).unwrap();
        assert!(output.contains("\"total\": 1"));
    }
}
