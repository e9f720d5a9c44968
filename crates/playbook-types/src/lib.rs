//! # playbook-types
//!
//! Shared domain types for the playbook knowledge engine.
//!
//! This crate defines the core data structures used throughout the system:
//! - Documents: parsed playbooks with typed frontmatter
//! - Route entries: rows of the task routing table
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use playbook_types::{Complexity, RouteEntry};
//!
//! let route = RouteEntry::new("pitch deck design", "domains/x/pitch.md");
//! assert_eq!(Complexity::parse("advanced"), Some(Complexity::Advanced));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod route;

pub use config::{Settings, DEFAULT_CACHE_TTL_MS};
pub use document::{Complexity, Document, Frontmatter, Status};
pub use error::PlaybookError;
pub use route::RouteEntry;
