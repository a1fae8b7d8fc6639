//! Mapping context: the immutable tables of one evaluation and the
//! position translator that walks them backwards.
//!
//! A range reported in assembled-text coordinates is translated by undoing
//! each assembly step in reverse: region lookup, substitution, block
//! ownership, then the block's segment table. Ranges that only touch
//! injected wrapper text have no origin and translate to `None`.

use std::collections::BTreeSet;

use tracing::trace;

use crate::assemble::{
    assemble, AssembledUnit, Assembly, SubstitutionRecord, SubstitutionRemap, SubstitutionRule,
};
use crate::source::segment::setup_segments;
use crate::source::{extract, PatternBlock, SegmentMap, SetupLine, TextRange};

/// Every table derived from one document evaluation.
///
/// Built once, never mutated; a new evaluation builds a new context.
#[derive(Debug, Clone)]
pub struct MappingContext {
    unit: AssembledUnit,
    blocks: Vec<PatternBlock>,
    block_spans: Vec<TextRange>,
    setup: Vec<SetupLine>,
    setup_segments: SegmentMap,
    substitutions: Vec<SubstitutionRecord>,
    remap: SubstitutionRemap,
    document_len: usize,
}

impl MappingContext {
    /// Extract, assemble and index a document.
    pub fn build(document: &str, rules: &[SubstitutionRule]) -> Self {
        let extraction = extract(document);
        let Assembly {
            unit,
            original_play_code,
            block_spans,
            substitutions,
        } = assemble(&extraction, rules);

        Self {
            setup_segments: setup_segments(&extraction.setup),
            remap: SubstitutionRemap::new(original_play_code.len(), &substitutions),
            unit,
            blocks: extraction.blocks,
            block_spans,
            setup: extraction.setup,
            substitutions,
            document_len: document.len(),
        }
    }

    /// The text to hand to the evaluation engine.
    pub fn assembled_text(&self) -> &str {
        &self.unit.text
    }

    pub fn unit(&self) -> &AssembledUnit {
        &self.unit
    }

    pub fn blocks(&self) -> &[PatternBlock] {
        &self.blocks
    }

    pub fn setup_lines(&self) -> &[SetupLine] {
        &self.setup
    }

    pub fn substitutions(&self) -> &[SubstitutionRecord] {
        &self.substitutions
    }

    /// Length of the document this context was built from.
    pub fn document_len(&self) -> usize {
        self.document_len
    }

    /// Translate an assembled-text range to a document range.
    ///
    /// A range that begins on wrapper text but reaches into code snaps
    /// inward to the code it covers.
    pub fn translate(&self, range: TextRange) -> Option<TextRange> {
        let setup = self.unit.setup_region();

        let mapped = if setup.from <= range.from && range.from < setup.to {
            let local = TextRange::new(
                range.from - setup.from,
                range.to.min(setup.to) - setup.from,
            );
            self.setup_segments.to_document(local).or_else(|| {
                // Past the last setup statement: only the yield keyword is left.
                (range.to > setup.to)
                    .then(|| self.translate_play_region(TextRange::new(setup.to, range.to)))
                    .flatten()
            })
        } else {
            self.translate_play_region(range)
        };

        if mapped.is_none() {
            trace!(from = range.from, to = range.to, "range has no document origin");
        }
        mapped.filter(|r| r.to <= self.document_len)
    }

    /// Translate many ranges, returning each distinct document range once, in order.
    pub fn translate_all(&self, ranges: impl IntoIterator<Item = TextRange>) -> Vec<TextRange> {
        ranges
            .into_iter()
            .filter_map(|r| self.translate(r))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Translate a range that starts inside the play region.
    fn translate_play_region(&self, range: TextRange) -> Option<TextRange> {
        let play = self.unit.play_region();
        if range.from < play.from || range.from >= play.to {
            return None;
        }
        let local = TextRange::new(range.from - play.from, range.to.min(play.to) - play.from);
        self.translate_play(local)
    }

    /// Translate a range local to the substituted play code.
    fn translate_play(&self, local: TextRange) -> Option<TextRange> {
        let original = self.remap.to_original(local);

        let idx = self
            .block_spans
            .partition_point(|span| span.to <= original.from);
        let span = self.block_spans.get(idx)?;
        let outside = if original.is_empty() {
            original.from < span.from
        } else {
            original.to <= span.from
        };
        if outside {
            return None;
        }

        let block_local = TextRange::new(
            original.from.max(span.from) - span.from,
            original.to.min(span.to) - span.from,
        );
        self.blocks[idx].segments.to_document(block_local)
    }
}
