//! Musical time in integer ticks, and the note-length vocabulary used for durations.
//!
//! Uses 960 PPQN (pulses per quarter note) so that 16th notes, triplets and swing
//! offsets stay exact. Conversion to wall-clock time happens only at the transport
//! and sink boundaries.

use std::cmp::Ordering;
use std::ops::{Add, Sub};
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Ticks per quarter note (beat).
pub const TICKS_PER_BEAT: u64 = 960;

/// Four beats to the bar.
pub const BEATS_PER_BAR: u32 = 4;

/// Ticks in one sequencer step (a 16th note).
pub const TICKS_PER_STEP: u64 = TICKS_PER_BEAT / 4;

/// Musical time measured in integer ticks at [`TICKS_PER_BEAT`] resolution.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Beat {
    ticks: u64,
}

impl Beat {
    pub const ZERO: Beat = Beat { ticks: 0 };

    pub fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Whole beats (quarter notes).
    pub fn from_beats(beats: u32) -> Self {
        Self {
            ticks: beats as u64 * TICKS_PER_BEAT,
        }
    }

    /// Whole bars of [`BEATS_PER_BAR`] beats.
    pub fn from_bars(bars: u32) -> Self {
        Self {
            ticks: bars as u64 * BEATS_PER_BAR as u64 * TICKS_PER_BEAT,
        }
    }

    /// Sequencer steps (16th notes).
    pub fn from_steps(steps: u64) -> Self {
        Self {
            ticks: steps * TICKS_PER_STEP,
        }
    }

    /// Fractional beats (e.g. 0.05 for a small swing delay). Negative input clamps to zero.
    pub fn from_beats_f64(beats: f64) -> Self {
        Self {
            ticks: (beats.max(0.0) * TICKS_PER_BEAT as f64).round() as u64,
        }
    }

    pub fn ticks(self) -> u64 {
        self.ticks
    }

    pub fn as_beats_f64(self) -> f64 {
        self.ticks as f64 / TICKS_PER_BEAT as f64
    }

    /// Wall-clock length of this span at the given tempo.
    pub fn to_duration(self, bpm: f64) -> Duration {
        Duration::from_secs_f64(self.as_beats_f64() * 60.0 / bpm.max(1.0))
    }
}

/// Serialized as fractional beats, the unit every output speaks.
impl Serialize for Beat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_beats_f64())
    }
}

impl Ord for Beat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ticks.cmp(&other.ticks)
    }
}

impl PartialOrd for Beat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Beat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ticks: self.ticks + rhs.ticks,
        }
    }
}

impl Sub for Beat {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            ticks: self.ticks.saturating_sub(rhs.ticks),
        }
    }
}

/// Note lengths in the transport notation the sinks understand ("8n", "2m", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValue {
    TwoMeasures,
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
}

impl NoteValue {
    pub fn to_beat(self) -> Beat {
        match self {
            NoteValue::TwoMeasures => Beat::from_bars(2),
            NoteValue::Whole => Beat::from_beats(4),
            NoteValue::Half => Beat::from_beats(2),
            NoteValue::Quarter => Beat::from_beats(1),
            NoteValue::Eighth => Beat::from_ticks(TICKS_PER_BEAT / 2),
            NoteValue::Sixteenth => Beat::from_ticks(TICKS_PER_BEAT / 4),
            NoteValue::ThirtySecond => Beat::from_ticks(TICKS_PER_BEAT / 8),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NoteValue::TwoMeasures => "2m",
            NoteValue::Whole => "1n",
            NoteValue::Half => "2n",
            NoteValue::Quarter => "4n",
            NoteValue::Eighth => "8n",
            NoteValue::Sixteenth => "16n",
            NoteValue::ThirtySecond => "32n",
        }
    }
}
