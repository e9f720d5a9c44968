//! Markdown helpers: ATX heading scanning, title/description/TL;DR
//! extraction and section slicing.
//!
//! Lines inside fenced code blocks (``` or ~~~) are never treated as
//! headings or block quotes.

/// Maximum length of a flattened TL;DR, in characters
pub const TLDR_MAX_CHARS: usize = 500;

/// An ATX heading found in a markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Number of leading `#` characters (1-6)
    pub level: usize,
    /// Heading text, trimmed
    pub text: String,
    /// Zero-based line index in the scanned content
    pub line: usize,
}

/// Parse a single line as an ATX heading.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((level, rest.trim()))
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Lines of `content` paired with a flag telling whether each one sits
/// inside a fenced code block. Fence lines themselves count as fenced.
fn classified_lines(content: &str) -> Vec<(&str, bool)> {
    let mut in_fence = false;
    content
        .lines()
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
                (line, true)
            } else {
                (line, in_fence)
            }
        })
        .collect()
}

/// All headings of `content`, in document order.
pub fn headings(content: &str) -> Vec<Heading> {
    classified_lines(content)
        .into_iter()
        .enumerate()
        .filter(|(_, (_, fenced))| !fenced)
        .filter_map(|(idx, (line, _))| {
            parse_heading(line).map(|(level, text)| Heading {
                level,
                text: text.to_string(),
                line: idx,
            })
        })
        .collect()
}

/// Text of the first non-empty level-1 heading.
pub fn first_h1(content: &str) -> Option<String> {
    headings(content)
        .into_iter()
        .find(|h| h.level == 1 && !h.text.is_empty())
        .map(|h| h.text)
}

/// Text of the first non-empty block-quote line.
pub fn first_blockquote(content: &str) -> Option<String> {
    classified_lines(content)
        .into_iter()
        .filter(|(_, fenced)| !fenced)
        .filter_map(|(line, _)| line.strip_prefix('>'))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Flattened TL;DR of a playbook.
///
/// Looks for a level-2 heading named "TL;DR" or "TLDR" (case-insensitive),
/// takes its body up to the next heading of level 1 or 2, strips list
/// markers and joins the non-empty lines with single spaces.
pub fn extract_tldr(content: &str) -> Option<String> {
    let lines = classified_lines(content);
    let all = headings(content);
    let start = all.iter().position(|h| {
        h.level == 2 && matches!(normalize_name(&h.text).as_str(), "tl;dr" | "tldr")
    })?;
    let heading = &all[start];
    let end = all[start + 1..]
        .iter()
        .find(|h| h.level <= 2)
        .map(|h| h.line)
        .unwrap_or(lines.len());

    let flattened = lines[heading.line + 1..end]
        .iter()
        .map(|(line, _)| strip_list_marker(line.trim()))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if flattened.is_empty() {
        return None;
    }
    Some(truncate_chars(&flattened, TLDR_MAX_CHARS))
}

fn strip_list_marker(line: &str) -> &str {
    for marker in ["- ", "* ", "-\t", "*\t"] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim();
        }
    }
    line
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Slice a named section out of `content`.
///
/// A level-2 heading with a matching name (case-insensitive, whitespace
/// collapsed) wins; otherwise the first matching heading of any level is
/// used. The returned text starts with the heading line and runs up to the
/// next heading of equal or higher level.
pub fn extract_section(content: &str, name: &str) -> Option<String> {
    let wanted = normalize_name(name);
    if wanted.is_empty() {
        return None;
    }
    let lines: Vec<&str> = content.lines().collect();
    let all = headings(content);

    let position = all
        .iter()
        .position(|h| h.level == 2 && normalize_name(&h.text) == wanted)
        .or_else(|| all.iter().position(|h| normalize_name(&h.text) == wanted))?;

    let heading = &all[position];
    let end = all[position + 1..]
        .iter()
        .find(|h| h.level <= heading.level)
        .map(|h| h.line)
        .unwrap_or(lines.len());

    Some(lines[heading.line..end].join("\n").trim().to_string())
}
