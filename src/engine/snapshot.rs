//! Read-only view of the engine for displays.

use serde::Serialize;

use crate::sequencer::ClockPosition;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub seed: u32,
    pub scale_name: &'static str,
    pub root_name: &'static str,
    pub bpm: f64,
    pub evolution_phase: &'static str,
    pub playing: bool,
    pub position: ClockPosition,
}

impl DisplaySnapshot {
    /// One-line summary, e.g. `seed 42 | C Major | 120 BPM | Intro`.
    pub fn summary(&self) -> String {
        format!(
            "seed {} | {} {} | {:.0} BPM | {}",
            self.seed, self.root_name, self.scale_name, self.bpm, self.evolution_phase
        )
    }
}
