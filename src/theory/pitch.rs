//! Pitch representation — pitch class + octave, note-name parsing and formatting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sharp-spelled names of the 12 pitch classes, indexed by class.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One of the 12 pitch classes (0 = C, 11 = B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Build a pitch class, wrapping any integer into `[0, 12)`.
    pub fn new(value: i32) -> Self {
        Self(value.rem_euclid(12) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Sharp-spelled name, e.g. "F#".
    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }
}

/// A concrete pitch: pitch class plus octave.
///
/// Octave numbering follows scientific pitch notation (C4 = middle C = MIDI 60).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub class: PitchClass,
    pub octave: i8,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: i8) -> Self {
        Self { class, octave }
    }

    /// Build from an absolute semitone count (`octave * 12 + class`).
    pub fn from_semitone(semitone: i32) -> Self {
        Self {
            class: PitchClass::new(semitone),
            octave: semitone.div_euclid(12) as i8,
        }
    }

    /// Absolute semitone count from C0: `octave * 12 + class`.
    pub fn semitone(self) -> i32 {
        self.octave as i32 * 12 + self.class.index() as i32
    }

    /// MIDI note number, clamped to 0–127.
    pub fn midi(self) -> u8 {
        (self.semitone() + 12).clamp(0, 127) as u8
    }

    /// Shift by whole octaves.
    pub fn transpose_octaves(self, octaves: i8) -> Self {
        Self {
            class: self.class,
            octave: self.octave + octaves,
        }
    }

    /// Shift by semitones, carrying into the octave.
    pub fn transpose(self, semitones: i32) -> Self {
        Self::from_semitone(self.semitone() + semitones)
    }

    /// Parse a note name such as "C4", "F#3" or "Eb2".
    ///
    /// Flats are accepted on input and normalized to the sharp-spelled class.
    pub fn parse(name: &str) -> Option<Self> {
        let chars: Vec<char> = name.chars().collect();
        if chars.is_empty() {
            return None;
        }

        let base = match chars[0] {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        let mut i = 1;
        let accidental: i32 = if i < chars.len() && chars[i] == '#' {
            i += 1;
            1
        } else if i < chars.len() && chars[i] == 'b' {
            i += 1;
            -1
        } else {
            0
        };

        let octave_str: String = chars[i..].iter().collect();
        let octave: i8 = octave_str.parse().ok()?;

        // Cb and B# can carry across the octave boundary
        let semitone = octave as i32 * 12 + base + accidental;
        let octave = i8::try_from(semitone.div_euclid(12)).ok()?;
        Some(Self::new(PitchClass::new(semitone), octave))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class.name(), self.octave)
    }
}
