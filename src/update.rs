//! Rewrites the `citations` field of entries in the publications data file.
//!
//! The file is treated as text, not parsed. A publication block runs from the nearest `{`
//! before a `title: "..."` literal to the nearest `}` after it. Only the `citations` line inside
//! that span is ever touched.

use std::{collections::HashMap, ops::Range};

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use crate::{normalize::normalize, scholar::PaperRecord};

/// Fuzzy matching compares at most this many normalized characters.
const PREFIX_LEN: usize = 40;
const INDENT: &str = "    ";

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"title:\s*"([^"]+)""#).unwrap());
static CITATIONS_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*citations:\s*\d+,").unwrap());
static CITATIONS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"citations:\s*\d+").unwrap());
static INSERT_AFTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"highlight:\s*true,|venue:\s*"[^"]+","#).unwrap());

/// Scraped citation counts keyed by normalized title.
///
/// Keys keep the position of their first insertion; re-inserting a key only replaces its count.
#[derive(Debug, Default)]
pub struct CitationIndex {
    entries: Vec<(String, u64)>,
    positions: HashMap<String, usize>,
}

impl CitationIndex {
    pub fn from_papers(papers: &[PaperRecord]) -> Self {
        let mut index = CitationIndex::default();
        for paper in papers {
            index.insert(normalize(&paper.title), paper.citations);
        }
        index
    }

    pub fn insert(&mut self, key: String, citations: u64) {
        if let Some(&pos) = self.positions.get(&key) {
            self.entries[pos].1 = citations;
        } else {
            self.positions.insert(key.clone(), self.entries.len());
            self.entries.push((key, citations));
        }
    }

    /// Exact match first, then the first key (in insertion order) that shares a prefix with
    /// `title` over their first [`PREFIX_LEN`] characters.
    pub fn lookup(&self, title: &str) -> Option<u64> {
        if let Some(&pos) = self.positions.get(title) {
            return Some(self.entries[pos].1);
        }
        self.entries
            .iter()
            .find(|(key, _)| key.starts_with(prefix(title)) || title.starts_with(prefix(key)))
            .map(|&(_, citations)| citations)
    }
}

fn prefix(s: &str) -> &str {
    s.char_indices()
        .nth(PREFIX_LEN)
        .map_or(s, |(idx, _)| &s[..idx])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockChange {
    Updated { title: String, citations: u64 },
    Removed { title: String },
}

#[derive(Debug)]
pub struct UpdateOutcome {
    pub content: String,
    pub changes: Vec<BlockChange>,
}

impl UpdateOutcome {
    pub fn updated(&self) -> usize {
        self.changes.len()
    }
}

/// Bring every publication block in `content` in line with `index`.
///
/// Blocks for papers cited at least `min_citations` times get their count set or inserted;
/// any other block loses its `citations` line. Titles whose braces cannot be found are skipped.
pub fn update_publications(
    content: &str,
    index: &CitationIndex,
    min_citations: u64,
) -> UpdateOutcome {
    let mut content = content.to_string();
    let mut changes = Vec::new();
    let mut cursor = 0;

    while let Some(caps) = TITLE_RE.captures_at(&content, cursor) {
        let (Some(found), Some(title)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let title = title.as_str().to_string();
        cursor = found.end();

        let Some(span) = block_span(&content, found.start(), found.end()) else {
            continue;
        };
        let citations = index
            .lookup(&normalize(&title))
            .filter(|&n| n >= min_citations);

        let block = &content[span.clone()];
        let Some(new_block) = rewrite_block(block, citations) else {
            continue;
        };

        // Edits never touch title literals, so the current title is still the same-numbered
        // match inside the rewritten block.
        let ordinal = TITLE_RE
            .find_iter(&block[..found.start() - span.start])
            .count();
        let resume = TITLE_RE
            .find_iter(&new_block)
            .nth(ordinal)
            .map_or(new_block.len(), |m| m.end());

        changes.push(match citations {
            Some(citations) => BlockChange::Updated { title, citations },
            None => BlockChange::Removed { title },
        });
        cursor = span.start + resume;
        content.replace_range(span, &new_block);
    }

    UpdateOutcome { content, changes }
}

/// Byte range of the publication block around a title match, braces included.
fn block_span(content: &str, start: usize, end: usize) -> Option<Range<usize>> {
    let open = content[..start].rfind('{')?;
    let close = end + content[end..].find('}')?;
    Some(open..close + 1)
}

/// The rewritten block, or `None` when it would come out unchanged.
fn rewrite_block(block: &str, citations: Option<u64>) -> Option<String> {
    let new_block = match citations {
        None => CITATIONS_LINE_RE.replace_all(block, "").into_owned(),
        Some(n) if CITATIONS_RE.is_match(block) => {
            let field = format!("citations: {n}");
            CITATIONS_RE
                .replace_all(block, NoExpand(&field))
                .into_owned()
        }
        Some(n) => {
            let anchor = INSERT_AFTER_RE.find(block)?;
            format!(
                "{}\n{INDENT}citations: {n},{}",
                &block[..anchor.end()],
                &block[anchor.end()..]
            )
        }
    };
    (new_block != block).then_some(new_block)
}
