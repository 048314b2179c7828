//! Melody generator — the main rhythmic pattern and the four-slot hook.

use crate::theory::{PitchClass, ScaleKind, STRONG_DEGREES};

use super::rng::SeededRandom;
use super::tension::TensionCurve;
use super::Slot;

/// Slots in every hook.
pub const HOOK_LENGTH: usize = 4;

/// Shortest and longest main pattern.
const MIN_PATTERN_LENGTH: usize = 8;
const MAX_PATTERN_LENGTH: usize = 16;

/// Draw above which a template rest still gets a note.
const EXTRA_ONSET_THRESHOLD: f64 = 0.7;
/// Draw above which an optional hook slot is filled.
const HOOK_FILL_THRESHOLD: f64 = 0.3;

const SIMPLE_RHYTHM: [u8; 8] = [1, 0, 0, 1, 0, 1, 0, 0];
const MEDIUM_RHYTHM: [u8; 12] = [1, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 0];
const COMPLEX_RHYTHM: [u8; 16] = [1, 0, 1, 1, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 1];

/// Onset template for a rhythm complexity.
pub fn rhythm_template(rhythm_complexity: f64) -> &'static [u8] {
    if rhythm_complexity < 0.33 {
        &SIMPLE_RHYTHM
    } else if rhythm_complexity < 0.66 {
        &MEDIUM_RHYTHM
    } else {
        &COMPLEX_RHYTHM
    }
}

/// Pattern length for a rhythm complexity: 8 slots, up to 16 as complexity rises.
pub fn pattern_length(rhythm_complexity: f64) -> usize {
    let extra = (rhythm_complexity.max(0.0) * 8.0).floor() as usize;
    (MIN_PATTERN_LENGTH + extra).min(MAX_PATTERN_LENGTH)
}

/// Build the main melodic pattern.
///
/// Note choice follows the tension curve at each slot's relative position: low tension
/// stays on strong degrees, middle tension uses the whole scale, high tension reaches
/// into the octave above.
pub fn build_pattern(
    rng: &mut SeededRandom,
    scale: ScaleKind,
    root: PitchClass,
    octave: i8,
    rhythm_complexity: f64,
    curve: &TensionCurve,
) -> Vec<Slot> {
    let template = rhythm_template(rhythm_complexity);
    let length = pattern_length(rhythm_complexity);
    let degrees = scale.degree_count();

    (0..length)
        .map(|i| {
            let onset = template[i % template.len()] == 1 || rng.draw() > EXTRA_ONSET_THRESHOLD;
            if !onset {
                return Slot::Rest;
            }

            let tension = curve.sample(i as f64 / length as f64);
            let pitch = if tension < 0.3 {
                let degree = STRONG_DEGREES[rng.index(STRONG_DEGREES.len())];
                scale.pitch(root, degree, octave)
            } else if tension < 0.6 {
                scale.pitch(root, rng.index(degrees) as i32, octave)
            } else {
                let degree = rng.index(degrees * 2);
                let lift = (degree / degrees) as i8;
                scale.pitch(root, degree as i32, octave + lift)
            };
            Slot::Note(pitch)
        })
        .collect()
}

/// Build the hook: first and last slots always sound, the middle two are optional.
/// Every note is a strong degree, alternating between `octave` and the octave above.
pub fn build_hook(rng: &mut SeededRandom, scale: ScaleKind, root: PitchClass, octave: i8) -> Vec<Slot> {
    (0..HOOK_LENGTH)
        .map(|i| {
            let anchored = i == 0 || i == HOOK_LENGTH - 1;
            if !anchored && rng.draw() <= HOOK_FILL_THRESHOLD {
                return Slot::Rest;
            }
            let degree = STRONG_DEGREES[rng.index(STRONG_DEGREES.len())];
            Slot::Note(scale.pitch(root, degree, octave + (i % 2) as i8))
        })
        .collect()
}
