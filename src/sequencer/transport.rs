//! Transport state — play/stop control and drift-free musical time advancement.
//!
//! The transport tracks the playback position in ticks and advances by elapsed
//! wall-clock time. A fractional tick remainder accumulates to prevent drift over
//! long sessions. The runtime uses the step boundaries crossed by each advance to
//! decide how many sequencer ticks to run.

use std::time::Duration;

use super::beat::{Beat, TICKS_PER_BEAT, TICKS_PER_STEP};

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

/// Musical transport: tracks position and tempo.
#[derive(Debug)]
pub struct Transport {
    bpm: f64,
    state: PlayState,
    position_ticks: u64,
    /// Fractional tick accumulator for drift-free advancement.
    tick_remainder: f64,
}

impl Transport {
    /// Create a new transport in the stopped state at position zero.
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm,
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

    /// Reset position to zero without changing play state.
    pub fn reset(&mut self) {
        self.position_ticks = 0;
        self.tick_remainder = 0.0;
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn position(&self) -> Beat {
        Beat::from_ticks(self.position_ticks)
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Set a new tempo. Takes effect on the next advance.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm;
    }

    /// Advance by an elapsed wall-clock duration.
    ///
    /// Returns the `[from, to)` range covered, or `None` while stopped.
    pub fn advance_by(&mut self, elapsed: Duration) -> Option<(Beat, Beat)> {
        if self.state == PlayState::Stopped {
            return None;
        }

        let from = Beat::from_ticks(self.position_ticks);

        let ticks_f64 = elapsed.as_secs_f64() * (self.bpm / 60.0) * TICKS_PER_BEAT as f64;
        let total = self.tick_remainder + ticks_f64;
        let whole_ticks = total.floor() as u64;
        self.tick_remainder = total - whole_ticks as f64;
        self.position_ticks += whole_ticks;

        Some((from, Beat::from_ticks(self.position_ticks)))
    }

    /// Number of step boundaries (multiples of a 16th note) inside `[from, to)`.
    pub fn steps_in(from: Beat, to: Beat) -> u64 {
        if to <= from {
            return 0;
        }
        let first = from.ticks().div_ceil(TICKS_PER_STEP);
        let end = to.ticks().div_ceil(TICKS_PER_STEP);
        end - first
    }
}
