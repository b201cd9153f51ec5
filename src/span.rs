//! Character-based spans over message text.
//!
//! Regex matches report byte offsets. Distances between keywords and candidates
//! are measured in characters so that CJK text (three bytes per character in
//! UTF-8) is not penalized against ASCII text. A character is one Unicode
//! scalar value; characters outside the BMP (emoji) count once, not as a
//! UTF-16 surrogate pair.

/// A half-open `[start, end)` range in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// First character.
    pub start: usize,
    /// One past the last character.
    pub end: usize,
}

impl Span {
    /// Returns the span length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the span covers no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Maps byte offsets of one text to character offsets.
#[derive(Debug)]
pub(crate) struct CharIndex {
    /// Byte offset of every character start; `None` when the text is ASCII.
    starts: Option<Vec<usize>>,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let starts = (!text.is_ascii()).then(|| text.char_indices().map(|(i, _)| i).collect());
        Self { starts }
    }

    /// Converts a byte offset on a character boundary (or the text end).
    pub(crate) fn char_offset(&self, byte: usize) -> usize {
        match &self.starts {
            None => byte,
            Some(starts) => starts.partition_point(|&b| b < byte),
        }
    }

    pub(crate) fn span(&self, bytes: std::ops::Range<usize>) -> Span {
        Span {
            start: self.char_offset(bytes.start),
            end: self.char_offset(bytes.end),
        }
    }
}
