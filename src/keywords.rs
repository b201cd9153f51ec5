//! Keyword scanning.
//!
//! Keywords are plain, case-insensitive substrings with no word-boundary
//! requirement, so a stem like "verif" matches inside "Verification". Every
//! occurrence is recorded, overlapping and repeated ones included.
//!
//! A text is only considered for extraction when at least two *distinct*
//! configured keywords occur in it; how often each occurs does not matter.

use crate::rules::Keyword;
use crate::span::{CharIndex, Span};

/// Minimum number of distinct keywords a text must contain.
pub const MIN_DISTINCT_KEYWORDS: usize = 2;

/// One keyword occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordHit<'r> {
    /// The keyword as configured.
    pub keyword: &'r str,
    /// Where it occurs, in characters.
    pub span: Span,
}

/// Result of scanning one text.
#[derive(Debug, Default)]
pub struct KeywordScan<'r> {
    hits: Vec<KeywordHit<'r>>,
    distinct: Vec<&'r str>,
}

impl<'r> KeywordScan<'r> {
    /// Every occurrence, grouped by keyword in configured order.
    #[must_use]
    pub fn hits(&self) -> &[KeywordHit<'r>] {
        &self.hits
    }

    /// Keywords that occurred at least once, in configured order, without duplicates.
    #[must_use]
    pub fn distinct(&self) -> &[&'r str] {
        &self.distinct
    }

    /// Returns `true` if enough distinct keywords occurred to attempt extraction.
    #[must_use]
    pub fn has_context(&self) -> bool {
        self.distinct.len() >= MIN_DISTINCT_KEYWORDS
    }
}

/// Finds every occurrence of every keyword in `text`.
#[must_use]
pub fn scan<'r>(text: &str, keywords: &'r [Keyword]) -> KeywordScan<'r> {
    scan_indexed(text, keywords, &CharIndex::new(text))
}

pub(crate) fn scan_indexed<'r>(
    text: &str,
    keywords: &'r [Keyword],
    index: &CharIndex,
) -> KeywordScan<'r> {
    let mut scan = KeywordScan::default();

    for keyword in keywords.iter().filter(|k| !k.as_str().is_empty()) {
        let before = scan.hits.len();
        let mut from = 0;
        while let Some(m) = keyword.matcher().find_at(text, from) {
            scan.hits.push(KeywordHit {
                keyword: keyword.as_str(),
                span: index.span(m.range()),
            });
            // Restart one character after the match start to catch overlaps.
            from = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
            if from > text.len() {
                break;
            }
        }

        if scan.hits.len() > before && !scan.distinct.contains(&keyword.as_str()) {
            scan.distinct.push(keyword.as_str());
        }
    }

    scan
}
