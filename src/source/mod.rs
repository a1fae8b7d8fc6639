//! Source model: splits a performer's document into setup statements and
//! pattern blocks, and records where every block character came from.
//!
//! Pipeline: [`lines`] → [`classify`] + [`scanner`] → [`extract`] → [`segment`].

pub mod classify;
pub mod extract;
pub mod lines;
pub mod scanner;
pub mod segment;

pub use classify::{classify, LineKind, SetupForm};
pub use extract::{extract, BlockLines, ContributingLine, Extraction, SetupLine};
pub use lines::{split_lines, SourceLine};
pub use segment::{PatternBlock, Segment, SegmentMap};

/// A half-open byte range `[from, to)`.
///
/// The same type carries ranges in every coordinate space (document,
/// block-local, assembled text); the owning API says which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    pub from: usize,
    pub to: usize,
}

impl TextRange {
    /// Create a range, swapping the ends if they arrive reversed.
    pub fn new(from: usize, to: usize) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    /// Whether the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// The slice of `text` this range covers, if it lies on char boundaries.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.from..self.to)
    }
}

impl From<(usize, usize)> for TextRange {
    fn from((from, to): (usize, usize)) -> Self {
        Self::new(from, to)
    }
}
