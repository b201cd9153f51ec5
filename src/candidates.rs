//! Candidate generation and ranking.
//!
//! Every code pattern is matched globally; each match becomes a [`Candidate`].
//! Candidates are then ranked by the gap to the nearest keyword occurrence on
//! either side, with the pattern priority breaking ties.

use crate::keywords::KeywordHit;
use crate::rules::CodePattern;
use crate::span::{CharIndex, Span};
use tracing::debug;

/// Distance of a candidate that has not been measured against any keyword.
pub const UNMEASURED: i64 = i64::MAX;

/// One pattern match in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'t, 'r> {
    /// The matched text.
    pub code: &'t str,
    /// Where it occurs, in characters.
    pub span: Span,
    /// Priority of the pattern that produced it.
    pub priority: u32,
    /// Source of the pattern that produced it.
    pub pattern: &'r str,
    /// Gap to the nearest keyword occurrence, [`UNMEASURED`] until ranked.
    pub distance: i64,
}

impl Candidate<'_, '_> {
    /// Gap between this candidate and one keyword occurrence.
    ///
    /// Positive when the two are apart; overlapping spans give zero or less.
    #[must_use]
    pub fn gap_to(&self, hit: &KeywordHit<'_>) -> i64 {
        if self.span.start > hit.span.start {
            to_i64(self.span.start) - to_i64(hit.span.end)
        } else {
            to_i64(hit.span.start) - to_i64(self.span.end)
        }
    }
}

fn to_i64(offset: usize) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

/// Collects every non-empty match of every pattern, in pattern order.
#[must_use]
pub fn generate<'t, 'r>(text: &'t str, patterns: &'r [CodePattern]) -> Vec<Candidate<'t, 'r>> {
    generate_indexed(text, patterns, &CharIndex::new(text))
}

pub(crate) fn generate_indexed<'t, 'r>(
    text: &'t str,
    patterns: &'r [CodePattern],
    index: &CharIndex,
) -> Vec<Candidate<'t, 'r>> {
    patterns
        .iter()
        .flat_map(|pattern| {
            pattern
                .regex()
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(move |m| Candidate {
                    code: m.as_str(),
                    span: index.span(m.range()),
                    priority: pattern.priority(),
                    pattern: pattern.source(),
                    distance: UNMEASURED,
                })
        })
        .collect()
}

/// Measures every candidate against every keyword occurrence and sorts them
/// best first: smallest distance, then lowest priority value.
///
/// The sort is stable, so full ties keep pattern order, then text order.
pub fn rank(candidates: &mut [Candidate<'_, '_>], hits: &[KeywordHit<'_>]) {
    for candidate in candidates.iter_mut() {
        candidate.distance = hits
            .iter()
            .map(|hit| candidate.gap_to(hit))
            .min()
            .unwrap_or(UNMEASURED);
    }

    candidates.sort_by_key(|c| (c.distance, c.priority));

    if tracing::enabled!(tracing::Level::DEBUG) {
        let top: Vec<String> = candidates
            .iter()
            .take(3)
            .map(|c| format!("{} (distance: {}, priority: {})", c.code, c.distance, c.priority))
            .collect();
        debug!(
            candidates = candidates.len(),
            keyword_hits = hits.len(),
            top = ?top,
            "Ranked code candidates"
        );
    }
}

/// Ranks the candidates and returns the best one.
pub fn best<'t, 'r>(
    mut candidates: Vec<Candidate<'t, 'r>>,
    hits: &[KeywordHit<'_>],
) -> Option<Candidate<'t, 'r>> {
    rank(&mut candidates, hits);
    candidates.into_iter().next()
}
