//! Music theory primitives — pitches, pitch classes and the scale catalog.

pub mod pitch;
pub mod scale;

pub use pitch::{Pitch, PitchClass, NOTE_NAMES};
pub use scale::{ScaleKind, ALL_SCALES, STRONG_DEGREES};
