//! Live session: ties the editor, the highlight driver and the playback
//! clock together, with optional debounced re-evaluation after edits.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::Config;
use crate::editor::{DocumentSource, Editor};
use crate::engine::PatternEngine;
use crate::error::EvaluationError;
use crate::highlight::{DriverState, HighlightDriver, MarkSink, PlaybackClock};

/// Outcome of the most recent evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalStatus {
    Idle,
    Ok { marks: usize },
    Error(String),
}

pub struct LiveSession<E, S> {
    editor: Editor,
    driver: HighlightDriver<E, S>,
    clock: PlaybackClock,
    last_edit: Rc<Cell<Option<Instant>>>,
    debounce: Option<Duration>,
    status: EvalStatus,
}

impl<E: PatternEngine, S: MarkSink> LiveSession<E, S> {
    pub fn new(mut editor: Editor, engine: E, sink: S, config: &Config) -> Self {
        let last_edit = Rc::new(Cell::new(None));
        let edits = Rc::clone(&last_edit);
        editor.on_change(Box::new(move |_| edits.set(Some(Instant::now()))));

        Self {
            editor,
            driver: HighlightDriver::new(engine, sink).with_rules(config.substitutions.clone()),
            clock: PlaybackClock::new(config.cps),
            last_edit,
            debounce: config.auto_evaluate(),
            status: EvalStatus::Idle,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn driver(&self) -> &HighlightDriver<E, S> {
        &self.driver
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn status(&self) -> &EvalStatus {
        &self.status
    }

    /// True when the document changed since the last evaluation.
    pub fn has_pending_edit(&self) -> bool {
        self.last_edit.get().is_some()
    }

    /// Evaluate the current document.
    pub fn evaluate(&mut self) -> Result<usize, EvaluationError> {
        self.last_edit.set(None);
        let result = self.driver.evaluate(&self.editor.text());
        self.status = match &result {
            Ok(marks) => EvalStatus::Ok { marks: *marks },
            Err(e) => EvalStatus::Error(e.reason.clone()),
        };
        result
    }

    /// Start playback, evaluating first if nothing is armed.
    pub fn play(&mut self) -> Result<bool, EvaluationError> {
        if self.driver.state() == DriverState::Idle {
            self.evaluate()?;
        }
        let running = self.driver.start();
        if running {
            self.clock.play();
        }
        Ok(running)
    }

    /// Stop playback and clear all decorations.
    pub fn stop(&mut self) {
        self.clock.stop();
        self.driver.stop();
    }

    /// Run one frame: re-evaluate if an edit has settled, advance the clock
    /// by `elapsed` and publish the active marks.
    pub fn tick(&mut self, now: Instant, elapsed: Duration) -> usize {
        if let (Some(debounce), Some(edited)) = (self.debounce, self.last_edit.get()) {
            if now.saturating_duration_since(edited) >= debounce {
                debug!("auto-evaluating after edit");
                // Failures are kept in `status`; the previous context stays live.
                let _ = self.evaluate();
            }
        }

        match self.clock.advance(elapsed) {
            Some((_, to)) => self.driver.tick(to),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MiniEngine;
    use crate::render::Decorations;

    fn session(text: &str, auto_ms: Option<u64>) -> LiveSession<MiniEngine, Decorations> {
        let config = Config {
            auto_evaluate_ms: auto_ms,
            cps: 1.0,
            ..Config::default()
        };
        LiveSession::new(Editor::new(text), MiniEngine::new(), Decorations::new(), &config)
    }

    #[test]
    fn evaluate_updates_status() {
        let mut s = session("s(\"bd sd\")", None);
        assert_eq!(s.status(), &EvalStatus::Idle);
        assert_eq!(s.evaluate(), Ok(2));
        assert_eq!(s.status(), &EvalStatus::Ok { marks: 2 });
        assert_eq!(s.driver().sink().persistent().len(), 2);
    }

    #[test]
    fn failed_evaluation_reports_error() {
        let mut s = session("s(\"bd\"", None);
        assert!(s.evaluate().is_err());
        assert!(matches!(s.status(), EvalStatus::Error(_)));
        assert_eq!(s.driver().state(), DriverState::Idle);
    }

    #[test]
    fn play_evaluates_and_ticks() {
        let mut s = session("s(\"bd sd\")", None);
        assert_eq!(s.play(), Ok(true));
        let now = Instant::now();
        assert_eq!(s.tick(now, Duration::from_millis(100)), 1);
        let active = s.driver().sink().active().to_vec();
        let doc = s.editor().text();
        assert_eq!(active[0].slice(&doc), Some("bd"));

        s.tick(now, Duration::from_millis(500));
        let active = s.driver().sink().active().to_vec();
        assert_eq!(active[0].slice(&doc), Some("sd"));
    }

    #[test]
    fn stop_clears_decorations() {
        let mut s = session("s(\"bd\")", None);
        s.play().unwrap();
        s.tick(Instant::now(), Duration::from_millis(10));
        s.stop();
        assert!(s.driver().sink().is_clear());
        assert_eq!(s.tick(Instant::now(), Duration::from_millis(10)), 0);
    }

    #[test]
    fn edits_are_tracked() {
        let mut s = session("s(\"bd\")", None);
        assert!(!s.has_pending_edit());
        s.editor_mut().set_content("s(\"hh\")");
        assert!(s.has_pending_edit());
        s.evaluate().unwrap();
        assert!(!s.has_pending_edit());
    }

    #[test]
    fn auto_evaluation_waits_for_debounce() {
        let mut s = session("s(\"bd\")", Some(200));
        s.play().unwrap();
        s.editor_mut().set_content("s(\"bd sd hh\")");

        let edited = Instant::now();
        s.tick(edited, Duration::ZERO);
        assert!(s.has_pending_edit());
        assert_eq!(s.driver().sink().persistent().len(), 1);

        s.tick(edited + Duration::from_millis(250), Duration::ZERO);
        assert!(!s.has_pending_edit());
        assert_eq!(s.status(), &EvalStatus::Ok { marks: 3 });
        assert_eq!(s.driver().sink().persistent().len(), 3);
    }

    #[test]
    fn auto_evaluation_off_without_debounce() {
        let mut s = session("s(\"bd\")", None);
        s.editor_mut().set_content("s(\"sd\")");
        s.tick(Instant::now() + Duration::from_secs(10), Duration::ZERO);
        assert!(s.has_pending_edit());
        assert_eq!(s.status(), &EvalStatus::Idle);
    }
}
