//! Code assembler: joins pattern blocks and setup statements into the single
//! unit handed to the evaluation engine.
//!
//! Layout with setup statements:
//!
//! ```text
//! (async () => {
//! <setup>
//! return <play>
//! })()
//! ```
//!
//! Without setup the unit is the play code itself. Several blocks are
//! combined into one playable expression with `stack(...)`.

pub mod substitute;

pub use substitute::{builtin_rules, SubstitutionRecord, SubstitutionRemap, SubstitutionRule};

use crate::source::segment::join_setup;
use crate::source::{Extraction, TextRange};

pub const COMBINATOR_OPEN: &str = "stack(\n";
pub const COMBINATOR_SEPARATOR: &str = ",\n";
pub const COMBINATOR_CLOSE: &str = "\n)";
pub const SCOPE_OPEN: &str = "(async () => {\n";
pub const SCOPE_YIELD: &str = "\nreturn ";
pub const SCOPE_CLOSE: &str = "\n})()";

/// The text handed to evaluation plus the offsets of its regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledUnit {
    pub text: String,
    pub setup_code_start: usize,
    pub play_code_start: usize,
    pub play_code_end: usize,
}

impl AssembledUnit {
    /// Region holding setup code and the yield keyword that follows it.
    pub fn setup_region(&self) -> TextRange {
        TextRange::new(self.setup_code_start, self.play_code_start)
    }

    /// Region holding the (substituted) play code.
    pub fn play_region(&self) -> TextRange {
        TextRange::new(self.play_code_start, self.play_code_end)
    }

    /// The substituted play code.
    pub fn play_code(&self) -> &str {
        &self.text[self.play_code_start..self.play_code_end]
    }
}

/// Everything the assembler produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub unit: AssembledUnit,
    /// Play code before substitution.
    pub original_play_code: String,
    /// Where each block sits inside the original play code.
    pub block_spans: Vec<TextRange>,
    pub substitutions: Vec<SubstitutionRecord>,
}

/// Assemble extracted blocks and setup statements into one evaluable unit.
pub fn assemble(extraction: &Extraction, rules: &[SubstitutionRule]) -> Assembly {
    let (original_play_code, block_spans) = combine_blocks(extraction);
    let substitutions = substitute::scan(&original_play_code, rules);
    let play = substitute::apply(&original_play_code, &substitutions);

    let unit = if extraction.setup.is_empty() {
        let play_code_end = play.len();
        AssembledUnit {
            text: play,
            setup_code_start: 0,
            play_code_start: 0,
            play_code_end,
        }
    } else {
        let setup = join_setup(&extraction.setup);
        let mut text = String::with_capacity(
            SCOPE_OPEN.len() + setup.len() + SCOPE_YIELD.len() + play.len() + SCOPE_CLOSE.len(),
        );
        text.push_str(SCOPE_OPEN);
        let setup_code_start = text.len();
        text.push_str(&setup);
        text.push_str(SCOPE_YIELD);
        let play_code_start = text.len();
        text.push_str(&play);
        let play_code_end = text.len();
        text.push_str(SCOPE_CLOSE);
        AssembledUnit {
            text,
            setup_code_start,
            play_code_start,
            play_code_end,
        }
    };

    Assembly {
        unit,
        original_play_code,
        block_spans,
        substitutions,
    }
}

fn combine_blocks(extraction: &Extraction) -> (String, Vec<TextRange>) {
    let blocks = &extraction.blocks;
    let mut play = String::new();
    let mut spans = Vec::with_capacity(blocks.len());

    if let [only] = blocks.as_slice() {
        play.push_str(&only.code);
        spans.push(TextRange::new(0, play.len()));
    } else if !blocks.is_empty() {
        play.push_str(COMBINATOR_OPEN);
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                play.push_str(COMBINATOR_SEPARATOR);
            }
            let start = play.len();
            play.push_str(&block.code);
            spans.push(TextRange::new(start, play.len()));
        }
        play.push_str(COMBINATOR_CLOSE);
    }

    (play, spans)
}
