//! Segment builder: offset tables from block-local positions to document positions.
//!
//! Every contributing line yields one [`Segment`]. The first line's segment
//! starts after its indentation; every later segment starts at the newline
//! that precedes its line, so concatenating the document slices of a block's
//! segments reproduces the block code byte for byte.

use super::extract::{BlockLines, SetupLine};
use super::TextRange;

/// Calls that force evaluation; stripped from the end of a block.
const FORCED_EVALUATION: &[&str] = &[".play()"];

/// One contiguous run of block code and the document bytes it came from.
///
/// Both sides have the same length: `pattern_to - pattern_from == doc_to - doc_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub pattern_from: usize,
    pub pattern_to: usize,
    pub doc_from: usize,
    pub doc_to: usize,
}

/// Segments ordered by `pattern_from`, with an inverse lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentMap {
    segments: Vec<Segment>,
}

impl SegmentMap {
    /// All segments in pattern order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the map holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment mapping `[pattern_from, ..)` onto `[doc_from, doc_to)`.
    pub fn push(&mut self, pattern_from: usize, doc_from: usize, doc_to: usize) {
        self.segments.push(Segment {
            pattern_from,
            pattern_to: pattern_from + (doc_to - doc_from),
            doc_from,
            doc_to,
        });
    }

    /// Drop everything at or beyond pattern offset `len`.
    pub fn truncate(&mut self, len: usize) {
        self.segments.retain(|s| s.pattern_from < len);
        if let Some(last) = self.segments.last_mut() {
            if last.pattern_to > len {
                let cut = last.pattern_to - len;
                last.pattern_to = len;
                last.doc_to -= cut;
            }
        }
    }

    /// Map a pattern-space range to the document.
    ///
    /// Each end is translated through its own segment, so a range spanning
    /// several lines keeps both exact endpoints. An end that falls between
    /// segments snaps inward to the nearest segment edge. Returns `None` when
    /// nothing of the range lies on a segment.
    pub fn to_document(&self, range: TextRange) -> Option<TextRange> {
        if range.is_empty() {
            return self.point(range.from).map(|p| TextRange::new(p, p));
        }

        let first = self.segments.partition_point(|s| s.pattern_to <= range.from);
        let seg = self.segments.get(first)?;
        let doc_from = seg.doc_from + range.from.saturating_sub(seg.pattern_from);

        let last = self
            .segments
            .partition_point(|s| s.pattern_from < range.to)
            .checked_sub(1)?;
        let seg = &self.segments[last];
        let doc_to = seg.doc_from + range.to.min(seg.pattern_to) - seg.pattern_from;

        (doc_from < doc_to).then(|| TextRange::new(doc_from, doc_to))
    }

    fn point(&self, at: usize) -> Option<usize> {
        let idx = self.segments.partition_point(|s| s.pattern_to <= at);
        match self.segments.get(idx) {
            Some(seg) if seg.pattern_from <= at => Some(seg.doc_from + at - seg.pattern_from),
            Some(_) => None,
            None => self
                .segments
                .last()
                .filter(|seg| seg.pattern_to == at)
                .map(|seg| seg.doc_to),
        }
    }
}

/// A playable block of code with its offset table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternBlock {
    pub code: String,
    /// Zero-based document line where the block starts.
    pub start_line: usize,
    pub segments: SegmentMap,
}

/// Build a block's code and segments from its contributing lines.
///
/// Returns `None` if nothing is left once a trailing forced-evaluation call
/// and trailing whitespace are removed.
pub fn build_block(document: &str, run: &BlockLines) -> Option<PatternBlock> {
    let mut code = String::new();
    let mut segments = SegmentMap::default();

    for (k, contributing) in run.lines.iter().enumerate() {
        let doc_from = if k == 0 {
            contributing.line.indent_end(document)
        } else {
            contributing.line.start - 1
        };
        let doc_to = contributing.code_end.max(doc_from);
        segments.push(code.len(), doc_from, doc_to);
        code.push_str(&document[doc_from..doc_to]);
    }

    let trimmed = code.trim_end().len();
    if let Some(suffix) = FORCED_EVALUATION
        .iter()
        .find(|suffix| code[..trimmed].ends_with(*suffix))
    {
        truncate(&mut code, &mut segments, trimmed - suffix.len());
    }
    let trimmed = code.trim_end().len();
    truncate(&mut code, &mut segments, trimmed);

    if code.is_empty() {
        return None;
    }
    Some(PatternBlock {
        code,
        start_line: run.start_line,
        segments,
    })
}

fn truncate(code: &mut String, segments: &mut SegmentMap, len: usize) {
    code.truncate(len);
    segments.truncate(len);
}

/// Join setup statements into the setup code, one per line.
pub fn join_setup(setup: &[SetupLine]) -> String {
    setup
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Offset table for setup code as produced by [`join_setup`].
///
/// Each statement maps onto its own document span; the joining newlines have
/// no document origin and are left as gaps.
pub fn setup_segments(setup: &[SetupLine]) -> SegmentMap {
    let mut segments = SegmentMap::default();
    let mut offset = 0;
    for (k, line) in setup.iter().enumerate() {
        if k > 0 {
            offset += 1;
        }
        segments.push(offset, line.doc_from, line.doc_to);
        offset += line.text.len();
    }
    segments
}
