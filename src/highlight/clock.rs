//! Playback clock: turns display-refresh ticks into cycle positions.
//!
//! Position is kept in whole ticks plus a fractional accumulator, so
//! advancing by many small frame intervals does not drift over a long set.

use std::time::Duration;

/// Ticks per cycle.
pub const TICKS_PER_CYCLE: u64 = 3840;

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

/// Cycle clock advanced by elapsed wall-clock time.
#[derive(Debug)]
pub struct PlaybackClock {
    cps: f64,
    state: PlayState,
    position_ticks: u64,
    tick_remainder: f64,
}

impl PlaybackClock {
    /// Create a stopped clock at cycle zero running at `cps` cycles per second.
    pub fn new(cps: f64) -> Self {
        Self {
            cps,
            state: PlayState::Stopped,
            position_ticks: 0,
            tick_remainder: 0.0,
        }
    }

    pub fn play(&mut self) {
        self.state = PlayState::Playing;
    }

    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
    }

    /// Rewind to cycle zero without changing play state.
    pub fn reset(&mut self) {
        self.position_ticks = 0;
        self.tick_remainder = 0.0;
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn cps(&self) -> f64 {
        self.cps
    }

    /// Change speed. Takes effect on the next `advance`.
    pub fn set_cps(&mut self, cps: f64) {
        self.cps = cps;
    }

    /// Current position in cycles.
    pub fn position(&self) -> f64 {
        self.position_ticks as f64 / TICKS_PER_CYCLE as f64
    }

    /// Advance by `elapsed` wall-clock time.
    ///
    /// Returns the `[from, to)` cycle span covered, or `None` while stopped.
    pub fn advance(&mut self, elapsed: Duration) -> Option<(f64, f64)> {
        if self.state == PlayState::Stopped {
            return None;
        }

        let from = self.position();
        let ticks = elapsed.as_secs_f64() * self.cps * TICKS_PER_CYCLE as f64;
        let total = self.tick_remainder + ticks;
        let whole = total.floor() as u64;
        self.tick_remainder = total - whole as f64;
        self.position_ticks += whole;

        Some((from, self.position()))
    }
}
