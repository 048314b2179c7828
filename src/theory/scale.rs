//! Scale catalog — interval definitions and degree-to-pitch mapping.

use super::pitch::{Pitch, PitchClass};

/// The seven supported scale types, in parameter-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleKind {
    Major,
    Minor,
    Pentatonic,
    Blues,
    Dorian,
    Phrygian,
    Lydian,
}

/// All scales in index order (matches the `scale` parameter, 0–6).
pub const ALL_SCALES: [ScaleKind; 7] = [
    ScaleKind::Major,
    ScaleKind::Minor,
    ScaleKind::Pentatonic,
    ScaleKind::Blues,
    ScaleKind::Dorian,
    ScaleKind::Phrygian,
    ScaleKind::Lydian,
];

/// Degrees treated as harmonically strong: tonic, third, fifth.
pub const STRONG_DEGREES: [i32; 3] = [0, 2, 4];

impl ScaleKind {
    /// Look up a scale by parameter index. Out-of-range indices clamp to the last scale.
    pub fn from_index(index: usize) -> Self {
        ALL_SCALES[index.min(ALL_SCALES.len() - 1)]
    }

    /// Ascending semitone offsets from the root. First offset is always 0.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::Pentatonic => &[0, 2, 4, 7, 9],
            ScaleKind::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleKind::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleKind::Lydian => &[0, 2, 4, 6, 7, 9, 11],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleKind::Major => "Major",
            ScaleKind::Minor => "Minor",
            ScaleKind::Pentatonic => "Pentatonic",
            ScaleKind::Blues => "Blues",
            ScaleKind::Dorian => "Dorian",
            ScaleKind::Phrygian => "Phrygian",
            ScaleKind::Lydian => "Lydian",
        }
    }

    /// Number of degrees in one octave of the scale.
    pub fn degree_count(self) -> usize {
        self.intervals().len()
    }

    /// Pitch of a scale degree above `root` in the given octave.
    ///
    /// The degree wraps modulo the scale length and does not carry into the octave;
    /// only the root offset itself can push the pitch into the next octave.
    pub fn pitch(self, root: PitchClass, degree: i32, octave: i8) -> Pitch {
        let intervals = self.intervals();
        let normalized = degree.rem_euclid(intervals.len() as i32) as usize;
        let sum = root.index() as i32 + intervals[normalized];
        Pitch::new(PitchClass::new(sum), octave + (sum / 12) as i8)
    }
}
