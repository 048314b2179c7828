//! Sink that only writes to the tracing log. Useful with no synth attached.

use tracing::{debug, info};

use super::{EffectParam, InstrumentSink, NoteEvent};

#[derive(Debug, Default)]
pub struct LogSink {
    notes: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes triggered so far.
    pub fn note_count(&self) -> u64 {
        self.notes
    }
}

impl InstrumentSink for LogSink {
    fn trigger(&mut self, event: &NoteEvent) {
        self.notes += 1;
        debug!(target: "seedwave::notes", "{event}");
    }

    fn set_effect_parameter(&mut self, param: EffectParam, value: f64) {
        info!(param = param.name(), value, "effect");
    }

    fn set_tempo(&mut self, bpm: f64) {
        info!(bpm, "tempo");
    }

    fn silence(&mut self) {
        info!(notes = self.notes, "silenced");
    }
}
