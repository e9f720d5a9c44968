//! Keyword router from task descriptions to playbooks.
//!
//! Route phrases are tokenized with [`Tokenizer::routing`] into an inverted
//! map of token to route positions. Scores accumulate per target document,
//! so several phrases pointing at one playbook reinforce each other:
//!
//! - +2 for each route containing the query token exactly
//! - +1 for each route holding an index token that is a prefix of the query
//!   token, or that the query token is a prefix of
//!
//! An exact token also satisfies the prefix rule, so it earns 3 in total.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use playbook_types::RouteEntry;

use crate::tokenizer::Tokenizer;

/// Number of matches a route lookup asks for
pub const DEFAULT_ROUTE_LIMIT: usize = 5;

/// One scored routing candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMatch {
    /// Earliest route-table entry that contributed to the target's score
    pub route: RouteEntry,
    /// Accumulated score of the target document
    pub score: u32,
    /// Row of `route` in the route table
    pub position: usize,
}

#[derive(Debug)]
pub struct RouteMatcher {
    tokenizer: Tokenizer,
    routes: Vec<RouteEntry>,
    index: BTreeMap<String, Vec<usize>>,
}

struct Candidate {
    score: u32,
    position: usize,
}

impl RouteMatcher {
    pub fn new(routes: Vec<RouteEntry>) -> Self {
        Self::with_tokenizer(routes, Tokenizer::routing())
    }

    pub fn with_tokenizer(routes: Vec<RouteEntry>, tokenizer: Tokenizer) -> Self {
        let mut index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, route) in routes.iter().enumerate() {
            let mut tokens = tokenizer.tokenize(&route.task);
            tokens.sort();
            tokens.dedup();
            for token in tokens {
                index.entry(token).or_default().push(position);
            }
        }

        debug!(routes = routes.len(), tokens = index.len(), "Built route index");
        Self {
            tokenizer,
            routes,
            index,
        }
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Score `query` against every route, returning at most `limit` targets.
    ///
    /// Higher scores first; equal scores keep route-table order.
    pub fn match_query(&self, query: &str, limit: usize) -> Vec<RouteMatch> {
        let query_tokens = self.tokenizer.tokenize(query);
        let mut candidates: HashMap<&str, Candidate> = HashMap::new();

        let mut credit = |position: usize, points: u32| {
            let target = self.routes[position].target.as_str();
            let candidate = candidates.entry(target).or_insert(Candidate {
                score: 0,
                position,
            });
            candidate.score += points;
            candidate.position = candidate.position.min(position);
        };

        for token in &query_tokens {
            if let Some(positions) = self.index.get(token) {
                for &position in positions {
                    credit(position, 2);
                }
            }
            for (index_token, positions) in &self.index {
                if index_token.starts_with(token.as_str()) || token.starts_with(index_token.as_str())
                {
                    for &position in positions {
                        credit(position, 1);
                    }
                }
            }
        }

        let mut matches: Vec<RouteMatch> = candidates
            .into_values()
            .map(|candidate| RouteMatch {
                route: self.routes[candidate.position].clone(),
                score: candidate.score,
                position: candidate.position,
            })
            .collect();
        matches.sort_by_key(|m| m.position);
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(limit);

        debug!(
            query = query,
            tokens = query_tokens.len(),
            matches = matches.len(),
            "Matched task against routes"
        );
        matches
    }

    /// All route entries pointing at `target`, in table order.
    pub fn routes_for(&self, target: &str) -> Vec<&RouteEntry> {
        self.routes.iter().filter(|r| r.target == target).collect()
    }
}

/// Normalize a raw route score into [0, 1], rounded to two decimals.
///
/// The ceiling is two points per whitespace-separated word of the query
/// longer than two characters.
pub fn confidence(score: u32, query: &str) -> f64 {
    let words = query
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .count();
    let ceiling = (words * 2).max(1) as f64;
    let ratio = (score as f64 / ceiling).clamp(0.0, 1.0);
    (ratio * 100.0).round() / 100.0
}
