//! Highlight driver: keeps the editor's decorations in step with playback.
//!
//! States: `Idle → Armed → Running → Idle`.
//!
//! - `evaluate` builds a fresh [`MappingContext`], hands the assembled text
//!   to the engine and, on success, swaps the context in and publishes the
//!   static locations as persistent marks (`Idle → Armed`).
//! - `start` enters `Running`; each `tick` translates the engine's active
//!   events through the current context and publishes them as frame marks.
//! - `stop` clears both mark sets before returning (`→ Idle`).
//!
//! No table is rebuilt inside `tick`. The context lives behind an
//! [`ArcSwapOption`]; a frame loads one snapshot and finishes with it even if
//! a new evaluation swaps the context meanwhile.

pub mod clock;

pub use clock::{PlayState, PlaybackClock};

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{debug, info, warn};

use crate::assemble::{builtin_rules, SubstitutionRule};
use crate::engine::{Evaluation, PatternEngine};
use crate::error::EvaluationError;
use crate::mapping::MappingContext;
use crate::source::TextRange;

/// The rendering surface. Both calls replace the previous set and must be
/// idempotent for identical input.
pub trait MarkSink {
    fn apply_persistent_marks(&mut self, ranges: &[TextRange]);
    fn apply_frame_marks(&mut self, time: f64, ranges: &[TextRange]);
}

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Armed,
    Running,
}

/// Shared handle to the current mapping context.
pub type ContextHandle = Arc<ArcSwapOption<MappingContext>>;

pub struct HighlightDriver<E, S> {
    engine: E,
    sink: S,
    state: DriverState,
    context: ContextHandle,
    rules: Vec<SubstitutionRule>,
    last_time: f64,
}

impl<E: PatternEngine, S: MarkSink> HighlightDriver<E, S> {
    /// Create an idle driver using the built-in substitution table.
    pub fn new(engine: E, sink: S) -> Self {
        Self {
            engine,
            sink,
            state: DriverState::Idle,
            context: Arc::new(ArcSwapOption::empty()),
            rules: builtin_rules(),
            last_time: 0.0,
        }
    }

    /// Replace the substitution table used by later evaluations.
    pub fn with_rules(mut self, rules: Vec<SubstitutionRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Snapshot of the current context, if any evaluation has succeeded.
    pub fn context(&self) -> Option<Arc<MappingContext>> {
        self.context.load_full()
    }

    /// Shared handle for readers outside the driver.
    pub fn context_handle(&self) -> ContextHandle {
        Arc::clone(&self.context)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Evaluate the whole document and arm the driver.
    ///
    /// Returns the number of persistent marks published. On failure the
    /// previous context and its decorations stay in effect.
    pub fn evaluate(&mut self, document: &str) -> Result<usize, EvaluationError> {
        let context = MappingContext::build(document, &self.rules);
        debug!(
            blocks = context.blocks().len(),
            setup = context.setup_lines().len(),
            substitutions = context.substitutions().len(),
            "assembled document"
        );

        let static_locations = match self.engine.evaluate(context.assembled_text()) {
            Evaluation::Ready { static_locations } => static_locations,
            Evaluation::Failed { reason } => {
                warn!(%reason, "evaluation failed, keeping previous context");
                return Err(EvaluationError::new(reason));
            }
        };

        let marks = context.translate_all(static_locations);
        self.context.store(Some(Arc::new(context)));
        self.sink.apply_persistent_marks(&marks);
        info!(marks = marks.len(), "context swapped");

        if self.state == DriverState::Idle {
            self.transition(DriverState::Armed);
        }
        Ok(marks.len())
    }

    /// Begin per-frame highlighting. Returns whether the driver is running.
    pub fn start(&mut self) -> bool {
        if self.state == DriverState::Armed {
            self.transition(DriverState::Running);
        }
        self.state == DriverState::Running
    }

    /// Run one frame at playback instant `time` (cycles).
    ///
    /// Returns the number of active marks published; does nothing unless running.
    pub fn tick(&mut self, time: f64) -> usize {
        if self.state != DriverState::Running {
            return 0;
        }
        let Some(context) = self.context.load_full() else {
            return 0;
        };

        let locations = self
            .engine
            .current_events(time)
            .into_iter()
            .flat_map(|event| event.locations);
        let marks = context.translate_all(locations);
        self.sink.apply_frame_marks(time, &marks);
        self.last_time = time;
        marks.len()
    }

    /// Stop highlighting and clear every decoration.
    pub fn stop(&mut self) {
        self.sink.apply_frame_marks(self.last_time, &[]);
        self.sink.apply_persistent_marks(&[]);
        if self.state != DriverState::Idle {
            self.transition(DriverState::Idle);
        }
    }

    fn transition(&mut self, to: DriverState) {
        debug!(from = ?self.state, ?to, "highlight driver");
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ActiveEvent;

    /// Engine that reports fixed locations and fails on demand.
    #[derive(Default)]
    struct ScriptedEngine {
        static_locations: Vec<TextRange>,
        active: Vec<TextRange>,
        fail: bool,
    }

    impl PatternEngine for ScriptedEngine {
        fn evaluate(&mut self, _assembled: &str) -> Evaluation {
            if self.fail {
                Evaluation::Failed {
                    reason: "bad pattern".into(),
                }
            } else {
                Evaluation::Ready {
                    static_locations: self.static_locations.clone(),
                }
            }
        }

        fn current_events(&self, time: f64) -> Vec<ActiveEvent> {
            vec![ActiveEvent {
                active_window: (time, time + 0.25),
                locations: self.active.clone(),
            }]
        }
    }

    #[derive(Default)]
    struct Recorder {
        persistent: Vec<TextRange>,
        frame: Vec<TextRange>,
        frames: usize,
    }

    impl MarkSink for Recorder {
        fn apply_persistent_marks(&mut self, ranges: &[TextRange]) {
            self.persistent = ranges.to_vec();
        }

        fn apply_frame_marks(&mut self, _time: f64, ranges: &[TextRange]) {
            self.frame = ranges.to_vec();
            self.frames += 1;
        }
    }

    fn driver(engine: ScriptedEngine) -> HighlightDriver<ScriptedEngine, Recorder> {
        HighlightDriver::new(engine, Recorder::default())
    }

    #[test]
    fn lifecycle() {
        let engine = ScriptedEngine {
            static_locations: vec![TextRange::new(3, 5)],
            active: vec![TextRange::new(3, 5)],
            ..Default::default()
        };
        let mut d = driver(engine);
        assert_eq!(d.state(), DriverState::Idle);
        assert!(!d.start());
        assert_eq!(d.tick(0.0), 0);

        assert_eq!(d.evaluate("s(\"bd\")"), Ok(1));
        assert_eq!(d.state(), DriverState::Armed);
        assert_eq!(d.sink().persistent, vec![TextRange::new(3, 5)]);

        assert!(d.start());
        assert_eq!(d.tick(0.1), 1);
        assert_eq!(d.sink().frame, vec![TextRange::new(3, 5)]);

        d.stop();
        assert_eq!(d.state(), DriverState::Idle);
        assert!(d.sink().persistent.is_empty());
        assert!(d.sink().frame.is_empty());
        assert_eq!(d.tick(0.2), 0);
    }

    #[test]
    fn failed_evaluation_keeps_previous_context() {
        let engine = ScriptedEngine {
            static_locations: vec![TextRange::new(3, 5)],
            ..Default::default()
        };
        let mut d = driver(engine);
        d.evaluate("s(\"bd\")").unwrap();
        let before = d.context().unwrap();

        d.engine.fail = true;
        let err = d.evaluate("s(\"bd\"").unwrap_err();
        assert_eq!(err.reason, "bad pattern");
        let after = d.context().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(d.sink().persistent, vec![TextRange::new(3, 5)]);
        assert_eq!(d.state(), DriverState::Armed);
    }

    #[test]
    fn failed_first_evaluation_stays_idle() {
        let mut d = driver(ScriptedEngine {
            fail: true,
            ..Default::default()
        });
        assert!(d.evaluate("(").is_err());
        assert_eq!(d.state(), DriverState::Idle);
        assert!(d.context().is_none());
    }

    #[test]
    fn reevaluation_while_running_stays_running() {
        let mut d = driver(ScriptedEngine::default());
        d.evaluate("s(\"bd\")").unwrap();
        d.start();
        let first = d.context().unwrap();
        d.evaluate("s(\"hh\")").unwrap();
        assert_eq!(d.state(), DriverState::Running);
        assert!(!Arc::ptr_eq(&first, &d.context().unwrap()));
    }

    #[test]
    fn frame_snapshot_survives_swap() {
        let mut d = driver(ScriptedEngine::default());
        d.evaluate("s(\"bd\")").unwrap();
        let handle = d.context_handle();
        let snapshot = handle.load_full().unwrap();
        d.evaluate("note(\"c e\")").unwrap();
        assert_eq!(snapshot.assembled_text(), "s(\"bd\")");
        assert_eq!(d.context().unwrap().assembled_text(), "note(\"c e\")");
    }

    #[test]
    fn unmappable_active_ranges_are_dropped() {
        let engine = ScriptedEngine {
            active: vec![TextRange::new(0, 5), TextRange::new(500, 505)],
            ..Default::default()
        };
        let mut d = driver(engine);
        d.evaluate("s(\"bd\")\nnote(\"c\")").unwrap();
        d.start();
        assert_eq!(d.tick(0.0), 0);
        assert_eq!(d.sink().frames, 1);
    }
}
