//! Sequencer — musical time, the wall-clock transport and the step clock.
//!
//! [`SequencerClock`] is advanced once per 16th note. Each tick moves the
//! step/bar/section/phrase counters and then decides what the tick plays:
//! chords and bass at bar starts, a melody slot every step.

pub mod beat;
pub mod position;
pub mod transport;

pub use beat::{Beat, NoteValue, TICKS_PER_BEAT, TICKS_PER_STEP};
pub use position::{ClockPosition, Rollover, DEFAULT_PHRASES_PER_STAGE, STEPS_PER_BAR};
pub use transport::{PlayState, Transport};

use crate::evolution::{EvolutionStage, MelodySource};
use crate::generate::{Material, TensionCurve};
use crate::output::{NoteEvent, Voice};

/// Velocity of chord, bass and pad notes.
pub const ACCOMPANIMENT_VELOCITY: f64 = 1.0;
/// Pad voicing is the chord's triad.
const PAD_VOICES: usize = 3;
/// Swing delay in beats per unit of swing feel.
const SWING_BEATS: f64 = 0.1;

/// Everything a tick reads besides the clock itself.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackContext<'a> {
    pub material: &'a Material,
    pub curve: &'a TensionCurve,
    pub stage: EvolutionStage,
    pub bass_intensity: f64,
    pub rhythm_complexity: f64,
    pub swing: f64,
}

/// Step/bar/section/phrase counter that decides what each tick plays.
#[derive(Debug, Clone)]
pub struct SequencerClock {
    position: ClockPosition,
    ticks: u64,
    phrases_per_stage: u32,
}

impl SequencerClock {
    pub fn new(phrases_per_stage: u32) -> Self {
        Self {
            position: ClockPosition::default(),
            ticks: 0,
            phrases_per_stage: phrases_per_stage.max(1),
        }
    }

    pub fn position(&self) -> ClockPosition {
        self.position
    }

    /// Ticks run since the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn phrases_per_stage(&self) -> u32 {
        self.phrases_per_stage
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        self.position = ClockPosition::default();
        self.ticks = 0;
    }

    /// Move to the next tick. Returns the tick's start time and what rolled over.
    pub fn advance(&mut self, progression_len: usize) -> (Beat, Rollover) {
        let at = Beat::from_steps(self.ticks);
        self.ticks += 1;
        let roll = self.position.advance(progression_len, self.phrases_per_stage);
        (at, roll)
    }

    /// Note events for the tick at `at`, given the counters' current values.
    pub fn emissions(&self, at: Beat, roll: Rollover, ctx: &PlaybackContext<'_>) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        let pos = self.position;
        let material = ctx.material;
        let len = material.progression.len();
        let section = pos.section as usize;
        let tension = ctx.curve.sample(pos.cycle_fraction(len));

        if roll.section_started {
            if let Some(chord) = material.progression.get(section) {
                let duration = if tension > 0.5 {
                    NoteValue::Half
                } else {
                    NoteValue::Whole
                };
                events.push(NoteEvent::new(
                    Voice::Chord,
                    chord.clone(),
                    at,
                    duration.to_beat(),
                    ACCOMPANIMENT_VELOCITY,
                ));

                if ctx.stage.has_pad() {
                    let triad = chord[..chord.len().min(PAD_VOICES)].to_vec();
                    events.push(NoteEvent::new(
                        Voice::Pad,
                        triad,
                        at,
                        NoteValue::TwoMeasures.to_beat(),
                        ACCOMPANIMENT_VELOCITY,
                    ));
                }
            }
            if let Some(&fundamental) = material.bassline.get(section).and_then(|e| e.first()) {
                events.push(NoteEvent::new(
                    Voice::Bass,
                    vec![fundamental],
                    at,
                    NoteValue::Quarter.to_beat(),
                    ACCOMPANIMENT_VELOCITY,
                ));
            }
        } else if roll.bar_started && ctx.bass_intensity > 0.3 {
            if let Some(entry) = material.bassline.get(section).filter(|e| e.len() > 1) {
                let index = (pos.bar as usize).min(entry.len() - 1);
                let duration = if ctx.bass_intensity > 0.7 {
                    NoteValue::Eighth
                } else {
                    NoteValue::Quarter
                };
                events.push(NoteEvent::new(
                    Voice::Bass,
                    vec![entry[index]],
                    at,
                    duration.to_beat(),
                    ACCOMPANIMENT_VELOCITY,
                ));
            }
        }

        let pattern = match ctx.stage.melody_source(pos.bar) {
            MelodySource::Main => &material.pattern,
            MelodySource::Hook => &material.hook,
        };
        if !pattern.is_empty() {
            if let Some(pitch) = pattern[pos.step as usize % pattern.len()].pitch() {
                let start = if pos.step % 2 == 1 {
                    at + Beat::from_beats_f64(ctx.swing * SWING_BEATS)
                } else {
                    at
                };
                events.push(NoteEvent::new(
                    Voice::Melody,
                    vec![pitch],
                    start,
                    ctx.stage.melody_duration(ctx.rhythm_complexity).to_beat(),
                    0.5 + 0.5 * tension,
                ));
            }
        }

        events
    }
}

impl Default for SequencerClock {
    fn default() -> Self {
        Self::new(DEFAULT_PHRASES_PER_STAGE)
    }
}
