//! # playbook-loader
//!
//! Corpus ingestion for the playbook engine.
//!
//! ## Features
//! - Deterministic discovery of `domains/**/*.md`
//! - Frontmatter decoding with `gray_matter`, validated into typed records
//! - Title, description and TL;DR extraction from the markdown body
//! - Task routing table parsing from the index file
//!
//! Loading never fails as a whole: unreadable or undecodable files are
//! skipped and reported in [`LoadOutcome::skipped`].

pub mod error;
pub mod frontmatter;
pub mod loader;
pub mod markdown;
pub mod routes;
pub mod scanner;

pub use error::LoadError;
pub use frontmatter::{domain_from_path, parse_frontmatter, ParsedFrontmatter};
pub use loader::{load_documents, parse_document, LoadOutcome, LoaderConfig, SkippedFile};
pub use markdown::{extract_section, extract_tldr, first_h1};
pub use routes::{parse_route_table, parse_route_table_str};
pub use scanner::{find_markdown_files, ScanConfig};
