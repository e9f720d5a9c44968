//! Route table entries.

use serde::{Deserialize, Serialize};

/// One row of the task routing table.
///
/// Several task phrases may point at the same document. The position of an
/// entry in the table is significant: it breaks ties between equal scores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Task phrase as written in the table
    pub task: String,
    /// Relative path of the target document
    pub target: String,
}

impl RouteEntry {
    pub fn new(task: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            target: target.into(),
        }
    }
}
