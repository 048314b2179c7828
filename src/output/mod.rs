//! Instrument/effect output — the boundary between composition and sound.
//!
//! The engine never knows how notes become audible. It hands [`NoteEvent`]s and
//! effect updates to an [`InstrumentSink`]; sinks realize them over MIDI, OSC, a
//! log, or an in-memory recording.

pub mod log;
pub mod midi;
pub mod osc;
pub mod queue;
pub mod recording;

pub use log::LogSink;
pub use midi::{MidiSink, VoiceChannels};
pub use osc::OscSink;
pub use queue::ReleaseQueue;
pub use recording::{Recorded, RecordingSink};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sequencer::beat::Beat;
use crate::theory::Pitch;

/// Logically separate instrument voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Melody,
    Chord,
    Bass,
    Pad,
}

impl Voice {
    pub const ALL: [Voice; 4] = [Voice::Melody, Voice::Chord, Voice::Bass, Voice::Pad];

    pub fn name(self) -> &'static str {
        match self {
            Voice::Melody => "melody",
            Voice::Chord => "chord",
            Voice::Bass => "bass",
            Voice::Pad => "pad",
        }
    }
}

/// Effect-chain parameters forwarded without affecting generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectParam {
    ReverbWet,
    DelayWet,
    FilterCutoff,
}

impl EffectParam {
    pub fn name(self) -> &'static str {
        match self {
            EffectParam::ReverbWet => "reverbWet",
            EffectParam::DelayWet => "delayWet",
            EffectParam::FilterCutoff => "filterCutoff",
        }
    }
}

/// A note (or chord) to play on one voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteEvent {
    pub voice: Voice,
    pub pitches: Vec<Pitch>,
    /// Onset in musical time since `start()`.
    pub start: Beat,
    pub duration: Beat,
    /// 0.0–1.0.
    pub velocity: f64,
}

impl NoteEvent {
    pub fn new(voice: Voice, pitches: Vec<Pitch>, start: Beat, duration: Beat, velocity: f64) -> Self {
        Self {
            voice,
            pitches,
            start,
            duration,
            velocity: velocity.clamp(0.0, 1.0),
        }
    }

    /// When the note stops sounding.
    pub fn end(&self) -> Beat {
        self.start + self.duration
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.pitches.iter().map(|p| p.to_string()).collect();
        write!(
            f,
            "{:<6} @{:>8.3} [{}] len {:.3} vel {:.2}",
            self.voice.name(),
            self.start.as_beats_f64(),
            names.join(" "),
            self.duration.as_beats_f64(),
            self.velocity
        )
    }
}

/// Errors raised while opening or talking to an output.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to initialize MIDI output: {0}")]
    MidiInit(String),
    #[error("MIDI output port not found: {0}")]
    PortNotFound(String),
    #[error("no MIDI output ports available")]
    NoPorts,
    #[error("failed to connect to MIDI output: {0}")]
    Connect(String),
    #[error("MIDI send failed: {0}")]
    Send(String),
    #[error("OSC socket error: {0}")]
    Socket(#[from] std::io::Error),
    #[error("OSC encode error: {0}")]
    Encode(String),
}

/// The instrument/effect layer the engine drives.
///
/// Only `trigger`, `set_effect_parameter` and `set_tempo` are required. Playback-time
/// failures are the sink's own business: log and carry on, never stop the clock.
pub trait InstrumentSink {
    /// Make the sink ready to produce sound. Called once per `start()`.
    fn prepare(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn trigger(&mut self, event: &NoteEvent);

    fn set_effect_parameter(&mut self, param: EffectParam, value: f64);

    fn set_tempo(&mut self, bpm: f64);

    /// Release anything scheduled before `until`.
    fn flush(&mut self, _until: Beat) {}

    /// Stop everything that is sounding.
    fn silence(&mut self) {}
}

impl<S: InstrumentSink + ?Sized> InstrumentSink for Box<S> {
    fn prepare(&mut self) -> Result<(), SinkError> {
        (**self).prepare()
    }

    fn trigger(&mut self, event: &NoteEvent) {
        (**self).trigger(event)
    }

    fn set_effect_parameter(&mut self, param: EffectParam, value: f64) {
        (**self).set_effect_parameter(param, value)
    }

    fn set_tempo(&mut self, bpm: f64) {
        (**self).set_tempo(bpm)
    }

    fn flush(&mut self, until: Beat) {
        (**self).flush(until)
    }

    fn silence(&mut self) {
        (**self).silence()
    }
}
