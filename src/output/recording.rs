//! In-memory sink that keeps every call, for tests and offline rendering.

use serde::Serialize;

use super::{EffectParam, InstrumentSink, NoteEvent, SinkError};
use crate::sequencer::beat::Beat;

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Recorded {
    Note(NoteEvent),
    Effect { param: EffectParam, value: f64 },
    Tempo { bpm: f64 },
}

/// Records every call in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Vec<Recorded>,
    prepared: usize,
    silenced: usize,
    flushed_to: Option<Beat>,
    fail_prepare: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `prepare()` always fails.
    pub fn failing() -> Self {
        Self {
            fail_prepare: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[Recorded] {
        &self.calls
    }

    /// Only the note events, in trigger order.
    pub fn notes(&self) -> Vec<&NoteEvent> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Recorded::Note(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Last value sent for an effect parameter.
    pub fn last_effect(&self, param: EffectParam) -> Option<f64> {
        self.calls.iter().rev().find_map(|c| match c {
            Recorded::Effect { param: p, value } if *p == param => Some(*value),
            _ => None,
        })
    }

    pub fn last_tempo(&self) -> Option<f64> {
        self.calls.iter().rev().find_map(|c| match c {
            Recorded::Tempo { bpm } => Some(*bpm),
            _ => None,
        })
    }

    pub fn prepare_count(&self) -> usize {
        self.prepared
    }

    pub fn silence_count(&self) -> usize {
        self.silenced
    }

    pub fn flushed_to(&self) -> Option<Beat> {
        self.flushed_to
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn into_calls(self) -> Vec<Recorded> {
        self.calls
    }
}

impl InstrumentSink for RecordingSink {
    fn prepare(&mut self) -> Result<(), SinkError> {
        if self.fail_prepare {
            return Err(SinkError::NoPorts);
        }
        self.prepared += 1;
        Ok(())
    }

    fn trigger(&mut self, event: &NoteEvent) {
        self.calls.push(Recorded::Note(event.clone()));
    }

    fn set_effect_parameter(&mut self, param: EffectParam, value: f64) {
        self.calls.push(Recorded::Effect { param, value });
    }

    fn set_tempo(&mut self, bpm: f64) {
        self.calls.push(Recorded::Tempo { bpm });
    }

    fn flush(&mut self, until: Beat) {
        self.flushed_to = Some(until);
    }

    fn silence(&mut self) {
        self.silenced += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Voice;

    #[test]
    fn records_in_order() {
        let mut sink = RecordingSink::new();
        sink.set_tempo(100.0);
        sink.trigger(&NoteEvent::new(Voice::Melody, vec![], Beat::ZERO, Beat::ZERO, 1.0));
        sink.set_effect_parameter(EffectParam::ReverbWet, 0.4);
        assert_eq!(sink.calls().len(), 3);
        assert_eq!(sink.notes().len(), 1);
        assert_eq!(sink.last_tempo(), Some(100.0));
        assert_eq!(sink.last_effect(EffectParam::ReverbWet), Some(0.4));
        assert_eq!(sink.last_effect(EffectParam::DelayWet), None);
    }

    #[test]
    fn failing_prepare() {
        let mut sink = RecordingSink::failing();
        assert!(sink.prepare().is_err());
        assert_eq!(sink.prepare_count(), 0);
    }
}
