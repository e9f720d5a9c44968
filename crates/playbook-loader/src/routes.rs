//! Task routing table parser.
//!
//! The route table is the first pipe-delimited table in the index file whose
//! header row starts with the cells `Task` and `Read This`:
//!
//! ```text
//! | Task              | Read This                    |
//! |-------------------|------------------------------|
//! | pitch deck design | `domains/x/pitch.md`         |
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use playbook_types::RouteEntry;

fn cells(line: &str) -> Vec<&str> {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}

fn is_header_row(line: &str) -> bool {
    let cells = cells(line);
    cells.len() >= 2
        && cells[0].eq_ignore_ascii_case("task")
        && cells[1].eq_ignore_ascii_case("read this")
}

fn is_separator_cell(cell: &str) -> bool {
    cell.contains('-') && cell.chars().all(|c| matches!(c, '-' | ':' | ' '))
}

/// Parse route entries out of markdown text.
///
/// Returns `None` when the text has no route table.
pub fn parse_route_table_str(content: &str) -> Option<Vec<RouteEntry>> {
    let mut lines = content.lines().skip_while(|line| !is_header_row(line));
    lines.next()?;

    let routes = lines
        .take_while(|line| line.trim_start().starts_with('|'))
        .filter_map(|line| {
            let cells = cells(line);
            if cells.len() < 2 || is_separator_cell(cells[0]) {
                return None;
            }
            let task = cells[0].to_string();
            let target = cells[1].replace('`', "").trim().to_string();
            if target.is_empty() {
                return None;
            }
            Some(RouteEntry { task, target })
        })
        .collect();

    Some(routes)
}

/// Parse the route table file at `path`.
///
/// A missing file or a file without a route table yields an empty list.
pub fn parse_route_table(path: &Path) -> Vec<RouteEntry> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = ?path, error = %e, "Failed to read route table");
            return Vec::new();
        }
    };

    match parse_route_table_str(&content) {
        Some(routes) => {
            debug!(path = ?path, count = routes.len(), "Parsed route table");
            routes
        }
        None => {
            warn!(path = ?path, "Could not find routing table");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INDEX: &str = "# Index\n\nIntro text.\n\n## Task Routing\n\n| Task | Read This |\n|------|-----------|\n| pitch deck design | `domains/x/pitch.md` |\n| logo design | domains/x/logo.md |\n| brand refresh | `domains/x/logo.md` |\n\n## Other\n\n| Task | Read This |\n|---|---|\n| ignored | domains/y.md |\n";

    #[test]
    fn test_parse_first_table_in_order() {
        let routes = parse_route_table_str(INDEX).unwrap();
        assert_eq!(
            routes,
            vec![
                RouteEntry::new("pitch deck design", "domains/x/pitch.md"),
                RouteEntry::new("logo design", "domains/x/logo.md"),
                RouteEntry::new("brand refresh", "domains/x/logo.md"),
            ]
        );
    }

    #[test]
    fn test_header_is_case_insensitive() {
        let content = "| TASK | read this |\n| :--- | :--- |\n| onboarding | domains/a.md |\n";
        let routes = parse_route_table_str(content).unwrap();
        assert_eq!(routes, vec![RouteEntry::new("onboarding", "domains/a.md")]);
    }

    #[test]
    fn test_rows_with_missing_cells_dropped() {
        let content = "| Task | Read This |\n|---|---|\n| lonely |\n| | domains/a.md |\n| ok | domains/b.md |\n";
        let routes = parse_route_table_str(content).unwrap();
        assert_eq!(routes, vec![RouteEntry::new("ok", "domains/b.md")]);
    }

    #[test]
    fn test_no_table() {
        assert_eq!(parse_route_table_str("# Nothing here\n| A | B |\n"), None);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(parse_route_table(&temp.path().join("INDEX.md")).is_empty());
    }

    #[test]
    fn test_parse_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("INDEX.md");
        std::fs::write(&path, INDEX).unwrap();
        assert_eq!(parse_route_table(&path).len(), 3);
    }
}
