//! # playbook-service
//!
//! Query operations over a playbook corpus.
//!
//! Provides:
//! - [`CacheStore`]: snapshots keyed by corpus root, invalidated by TTL and
//!   by modification times of the route table and the domains directory
//! - Path resolution confined to the corpus root
//! - The route, search, list, read, summary and diagnose operations
//! - JSON and markdown rendering of every result

pub mod cache;
pub mod diagnose;
pub mod error;
pub mod format;
pub mod list;
pub mod read;
pub mod resolve;
pub mod route;
pub mod search;
pub mod service;
pub mod snapshot;

pub use cache::{CacheStats, CacheStore, Invalidation};
pub use diagnose::{Diagnosis, HealthStatus};
pub use error::ServiceError;
pub use format::{render, ResponseFormat, ToMarkdown};
pub use list::{ListItem, ListOptions, ListResults, Summary};
pub use read::ReadResult;
pub use resolve::{check_confined, resolve, Resolved};
pub use route::{RouteAlternative, RouteOutcome, RouteResult};
pub use search::{SearchItem, SearchResults};
pub use service::KnowledgeService;
pub use snapshot::Snapshot;

pub use playbook_search::SearchOptions;
