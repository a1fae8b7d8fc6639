//! Pattern engine interface: what the highlight core needs from the
//! evaluation/playback engine.

pub mod mini;

pub use mini::MiniEngine;

use crate::source::TextRange;

/// Outcome of evaluating assembled text.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The pattern is playable; `static_locations` mark its literal
    /// sub-expressions in assembled-text coordinates.
    Ready { static_locations: Vec<TextRange> },
    /// The pattern is invalid.
    Failed { reason: String },
}

/// An event sounding at a queried instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEvent {
    /// `(start, end)` in cycles.
    pub active_window: (f64, f64),
    /// Source locations in assembled-text coordinates.
    pub locations: Vec<TextRange>,
}

/// The evaluation and playback engine.
pub trait PatternEngine {
    /// Evaluate assembled text. Called once per explicit (re-)evaluation.
    fn evaluate(&mut self, assembled: &str) -> Evaluation;

    /// Events active at `time` (in cycles). Called every frame while playing.
    fn current_events(&self, time: f64) -> Vec<ActiveEvent>;
}
