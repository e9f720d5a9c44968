//! Configuration loading for the playbook engine.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/playbook/config.toml.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::error::PlaybookError;

/// Default cache lifetime (5 minutes)
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the knowledge base (contains INDEX.md and domains/)
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: String,

    /// How long a loaded snapshot stays valid, in milliseconds
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// File holding the task routing table, relative to the root
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Directory holding the playbooks, relative to the root
    #[serde(default = "default_domains_dir")]
    pub domains_dir: String,
}

fn default_knowledge_path() -> String {
    "./knowledge".to_string()
}

fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_index_file() -> String {
    "INDEX.md".to_string()
}

fn default_domains_dir() -> String {
    "domains".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            knowledge_path: default_knowledge_path(),
            cache_ttl_ms: default_cache_ttl_ms(),
            log_level: default_log_level(),
            index_file: default_index_file(),
            domains_dir: default_domains_dir(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/playbook/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (PLAYBOOK_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, PlaybookError> {
        let config_dir = ProjectDirs::from("", "", "playbook")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("knowledge_path", default_knowledge_path())
            .map_err(|e| PlaybookError::Config(e.to_string()))?
            .set_default("cache_ttl_ms", default_cache_ttl_ms() as i64)
            .map_err(|e| PlaybookError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| PlaybookError::Config(e.to_string()))?
            .set_default("index_file", default_index_file())
            .map_err(|e| PlaybookError::Config(e.to_string()))?
            .set_default("domains_dir", default_domains_dir())
            .map_err(|e| PlaybookError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PLAYBOOK_KNOWLEDGE_PATH, PLAYBOOK_CACHE_TTL_MS, PLAYBOOK_LOG_LEVEL.
        // Field names contain underscores, so nesting uses a double underscore.
        builder = builder.add_source(
            Environment::with_prefix("PLAYBOOK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| PlaybookError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| PlaybookError::Config(e.to_string()))
    }

    /// Cache TTL as a Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Expand ~ in knowledge_path to the home directory
    pub fn expanded_knowledge_path(&self) -> PathBuf {
        if let Some(rest) = self.knowledge_path.strip_prefix("~/") {
            if let Some(dirs) = BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.knowledge_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.knowledge_path, "./knowledge");
        assert_eq!(settings.cache_ttl_ms, 300_000);
        assert_eq!(settings.index_file, "INDEX.md");
        assert_eq!(settings.domains_dir, "domains");
    }

    #[test]
    fn test_cache_ttl_duration() {
        let settings = Settings {
            cache_ttl_ms: 1500,
            ..Default::default()
        };
        assert_eq!(settings.cache_ttl(), Duration::from_millis(1500));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("playbook.toml");
        std::fs::write(
            &path,
            "knowledge_path = \"/srv/kb\"\ncache_ttl_ms = 1000\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.cache_ttl_ms, 1000);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.index_file, "INDEX.md");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");
        let result = Settings::load(Some(path.to_str().unwrap()));
        assert!(matches!(result, Err(PlaybookError::Config(_))));
    }

    #[test]
    fn test_expanded_path_without_tilde() {
        let settings = Settings {
            knowledge_path: "/srv/kb".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.expanded_knowledge_path(), PathBuf::from("/srv/kb"));
    }

    #[test]
    fn test_expanded_path_with_tilde() {
        let settings = Settings {
            knowledge_path: "~/kb".to_string(),
            ..Default::default()
        };
        let expanded = settings.expanded_knowledge_path();
        assert!(expanded.ends_with("kb"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
