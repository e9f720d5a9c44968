//! Playbook knowledge base CLI
//!
//! # Usage
//!
//! ```bash
//! playbook route "design a pitch deck"
//! playbook search pricing --domain marketing
//! playbook read domains/product/pricing.md --section "Steps"
//! playbook diagnose --format json
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/playbook/config.toml)
//! 3. Environment variables (PLAYBOOK_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use playbook_cli::{run, Cli};

fn main() -> Result<()> {
    run(Cli::parse())
}
