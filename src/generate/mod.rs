//! Procedural material — seeded generators for harmony, bass, melody and tension.
//!
//! Every generator draws from a caller-owned [`SeededRandom`], so the caller decides
//! where the cursor is reset and the same seed + parameters always reproduce the same
//! material.

pub mod harmony;
pub mod melody;
pub mod rng;
pub mod tension;

pub use harmony::{build_bassline, build_progression, ProgressionStyle};
pub use melody::{build_hook, build_pattern, HOOK_LENGTH};
pub use rng::SeededRandom;
pub use tension::{TensionCurve, CURVE_LENGTH};

use crate::theory::Pitch;

/// One melodic slot: a rest or a pitched note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Rest,
    Note(Pitch),
}

impl Slot {
    pub fn pitch(self) -> Option<Pitch> {
        match self {
            Slot::Rest => None,
            Slot::Note(p) => Some(p),
        }
    }
}

/// A concrete chord: 3–5 pitches, root first.
pub type ChordVoicing = Vec<Pitch>;

/// The full set of generated material for one generation lifetime.
///
/// Replaced wholesale on regeneration; only `pattern` is ever swapped on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub progression: Vec<ChordVoicing>,
    pub bassline: Vec<Vec<Pitch>>,
    pub pattern: Vec<Slot>,
    pub hook: Vec<Slot>,
}

impl Material {
    /// Whether nothing has been generated yet.
    pub fn is_empty(&self) -> bool {
        self.progression.is_empty() && self.pattern.is_empty() && self.hook.is_empty()
    }
}
