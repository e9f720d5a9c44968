//! CLI argument parsing for the playbook tool.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand, ValueEnum};

use playbook_service::ResponseFormat;
use playbook_types::Complexity;

/// Playbook knowledge base
///
/// Route tasks to playbooks, search them and read them.
#[derive(Parser, Debug)]
#[command(name = "playbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Knowledge base root (contains INDEX.md and domains/)
    #[arg(short, long, global = true)]
    pub knowledge_path: Option<String>,

    /// Path to config file (overrides default ~/.config/playbook/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl From<OutputFormat> for ResponseFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ResponseFormat::Json,
            OutputFormat::Markdown => ResponseFormat::Markdown,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the best playbook for a task
    Route {
        /// Task description
        task: String,
    },

    /// Full-text search over playbooks
    Search {
        /// Search query
        query: String,

        /// Only return playbooks of this domain
        #[arg(short, long)]
        domain: Option<String>,

        /// Only return playbooks of this complexity
        #[arg(long)]
        complexity: Option<Complexity>,

        /// Maximum results (default 10, max 50)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List playbooks sorted by domain and title
    List {
        #[arg(short, long)]
        domain: Option<String>,

        #[arg(long)]
        complexity: Option<Complexity>,

        /// Maximum results (default 50)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Print a playbook or one of its sections
    Read {
        /// Relative playbook path
        path: String,

        /// Heading of the section to extract
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Count playbooks per domain and complexity
    Summary,

    /// Check the knowledge base for problems
    Diagnose,
}
