//! Harmony generator — chord progressions from degree templates, and basslines under them.

use crate::theory::{Pitch, PitchClass, ScaleKind};

use super::rng::SeededRandom;
use super::ChordVoicing;

/// Template pool selected by chord complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionStyle {
    /// Short four-chord loops.
    Pop,
    /// Longer loops with strategic repetition.
    Emotional,
    /// Wide, resolving movements.
    Epic,
}

impl ProgressionStyle {
    pub fn from_complexity(complexity: f64) -> Self {
        if complexity < 0.33 {
            ProgressionStyle::Pop
        } else if complexity < 0.66 {
            ProgressionStyle::Emotional
        } else {
            ProgressionStyle::Epic
        }
    }

    /// Scale-degree templates for this style.
    pub fn templates(self) -> &'static [&'static [i32]] {
        match self {
            ProgressionStyle::Pop => &[&[0, 5, 3, 4], &[0, 3, 4, 0], &[0, 3, 5, 4]],
            ProgressionStyle::Emotional => &[&[0, 5, 3, 4, 0, 5, 1, 4], &[0, 5, 3, 0, 5, 3, 4]],
            ProgressionStyle::Epic => &[&[0, 2, 4, 5], &[0, 5, 1, 4, 0]],
        }
    }
}

/// Harmonic tension above which chords gain a 7th.
const SEVENTH_THRESHOLD: f64 = 0.5;
/// Harmonic tension above which chords also gain a 9th.
const NINTH_THRESHOLD: f64 = 0.8;

/// Build a chord progression. Consumes exactly one draw (template choice).
pub fn build_progression(
    rng: &mut SeededRandom,
    scale: ScaleKind,
    root: PitchClass,
    octave: i8,
    complexity: f64,
    harmonic_tension: f64,
) -> Vec<ChordVoicing> {
    let templates = ProgressionStyle::from_complexity(complexity).templates();
    let template = templates[rng.index(templates.len())];

    template
        .iter()
        .map(|&degree| build_chord(scale, root, degree, octave, harmonic_tension))
        .collect()
}

/// Stack thirds on a scale degree: triad, then 7th and 9th by tension.
pub fn build_chord(
    scale: ScaleKind,
    root: PitchClass,
    degree: i32,
    octave: i8,
    harmonic_tension: f64,
) -> ChordVoicing {
    let mut chord = vec![
        scale.pitch(root, degree, octave),
        scale.pitch(root, degree + 2, octave),
        scale.pitch(root, degree + 4, octave),
    ];
    if harmonic_tension > SEVENTH_THRESHOLD {
        chord.push(scale.pitch(root, degree + 6, octave));
    }
    if harmonic_tension > NINTH_THRESHOLD {
        chord.push(scale.pitch(root, degree + 8, octave + 1));
    }
    chord
}

/// Build one bass entry per chord.
///
/// Draws from `rng` only to break walking-tone ties (current and next fundamentals equal).
pub fn build_bassline(
    rng: &mut SeededRandom,
    progression: &[ChordVoicing],
    bass_intensity: f64,
    rhythm_complexity: f64,
) -> Vec<Vec<Pitch>> {
    let fundamentals: Vec<Option<Pitch>> = progression
        .iter()
        .map(|chord| chord.first().map(|p| p.transpose_octaves(-1)))
        .collect();

    progression
        .iter()
        .enumerate()
        .filter_map(|(i, chord)| {
            let fundamental = fundamentals[i]?;
            let mut entry = vec![fundamental];

            if bass_intensity > 0.3 {
                let fifth = chord.get(2).copied().unwrap_or(fundamental.transpose(19));
                entry.push(fifth.transpose_octaves(-1));
            }

            if bass_intensity > 0.6 {
                let next = fundamentals[(i + 1) % fundamentals.len()].unwrap_or(fundamental);
                entry.push(walking_tone(rng, fundamental, next));
            }

            if bass_intensity > 0.8 && rhythm_complexity > 0.5 {
                entry.push(fundamental.transpose_octaves(1));
            }

            Some(entry)
        })
        .collect()
}

/// One semitone from `current` toward `next`; a seeded coin flip on a tie.
pub fn walking_tone(rng: &mut SeededRandom, current: Pitch, next: Pitch) -> Pitch {
    let step = match current.semitone().cmp(&next.semitone()) {
        std::cmp::Ordering::Less => 1,
        std::cmp::Ordering::Greater => -1,
        std::cmp::Ordering::Equal => {
            if rng.draw() > 0.5 {
                1
            } else {
                -1
            }
        }
    };
    current.transpose(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: PitchClass = PitchClass::C;

    fn names(chord: &[Pitch]) -> Vec<String> {
        chord.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn style_buckets() {
        assert_eq!(ProgressionStyle::from_complexity(0.0), ProgressionStyle::Pop);
        assert_eq!(ProgressionStyle::from_complexity(0.32), ProgressionStyle::Pop);
        assert_eq!(ProgressionStyle::from_complexity(0.33), ProgressionStyle::Emotional);
        assert_eq!(ProgressionStyle::from_complexity(0.66), ProgressionStyle::Epic);
        assert_eq!(ProgressionStyle::from_complexity(1.0), ProgressionStyle::Epic);
    }

    #[test]
    fn template_lengths_match_styles() {
        assert!(ProgressionStyle::Pop.templates().iter().all(|t| t.len() == 4));
        assert!(ProgressionStyle::Emotional
            .templates()
            .iter()
            .all(|t| (6..=8).contains(&t.len())));
        assert!(ProgressionStyle::Epic
            .templates()
            .iter()
            .all(|t| (4..=5).contains(&t.len())));
    }

    #[test]
    fn c_major_triad_on_tonic() {
        let chord = build_chord(ScaleKind::Major, C, 0, 4, 0.0);
        assert_eq!(names(&chord), ["C4", "E4", "G4"]);
    }

    #[test]
    fn seventh_and_ninth_by_tension() {
        assert_eq!(build_chord(ScaleKind::Major, C, 0, 4, 0.5).len(), 3);
        let seventh = build_chord(ScaleKind::Major, C, 0, 4, 0.6);
        assert_eq!(names(&seventh), ["C4", "E4", "G4", "B4"]);
        let ninth = build_chord(ScaleKind::Major, C, 0, 4, 0.9);
        assert_eq!(names(&ninth), ["C4", "E4", "G4", "B4", "D5"]);
    }

    #[test]
    fn progression_consumes_one_draw() {
        let mut rng = SeededRandom::new(42);
        build_progression(&mut rng, ScaleKind::Major, C, 4, 0.2, 0.0);
        assert_eq!(rng.cursor(), 43);
    }

    #[test]
    fn walking_tone_moves_toward_next() {
        let mut rng = SeededRandom::new(1);
        let c3 = Pitch::parse("C3").unwrap();
        let g3 = Pitch::parse("G3").unwrap();
        assert_eq!(walking_tone(&mut rng, c3, g3).to_string(), "C#3");
        assert_eq!(walking_tone(&mut rng, g3, c3).to_string(), "F#3");
        // no draw consumed for a strict comparison
        assert_eq!(rng.cursor(), 1);
    }

    #[test]
    fn walking_tone_tie_is_seeded() {
        let c3 = Pitch::parse("C3").unwrap();
        let mut a = SeededRandom::new(5);
        let mut b = SeededRandom::new(5);
        let ta = walking_tone(&mut a, c3, c3);
        let tb = walking_tone(&mut b, c3, c3);
        assert_eq!(ta, tb);
        assert_eq!((ta.semitone() - c3.semitone()).abs(), 1);
        assert_eq!(a.cursor(), 6);
    }

    #[test]
    fn bassline_grows_with_intensity() {
        let progression: Vec<ChordVoicing> = [0, 5, 3, 4]
            .iter()
            .map(|&d| build_chord(ScaleKind::Major, C, d, 4, 0.0))
            .collect();
        let cases = [(0.2, 0.9, 1), (0.4, 0.9, 2), (0.7, 0.9, 3), (0.9, 0.4, 3), (0.9, 0.9, 4)];
        for (intensity, rhythm, expected) in cases {
            let mut rng = SeededRandom::new(42);
            let bass = build_bassline(&mut rng, &progression, intensity, rhythm);
            assert_eq!(bass.len(), progression.len());
            for entry in &bass {
                assert_eq!(entry.len(), expected, "intensity {intensity} rhythm {rhythm}");
            }
        }
    }

    #[test]
    fn bass_entry_layout() {
        let progression = vec![
            build_chord(ScaleKind::Major, C, 0, 4, 0.0),
            build_chord(ScaleKind::Major, C, 4, 4, 0.0),
        ];
        let mut rng = SeededRandom::new(0);
        let bass = build_bassline(&mut rng, &progression, 0.9, 0.9);
        // C3 fundamental, G3 fifth, C#3 walking up toward G3, C4 doubling
        assert_eq!(names(&bass[0]), ["C3", "G3", "C#3", "C4"]);
        // G3 fundamental walks down toward C3
        assert_eq!(bass[1][2].to_string(), "F#3");
    }

    #[test]
    fn empty_progression_gives_empty_bassline() {
        let mut rng = SeededRandom::new(0);
        assert!(build_bassline(&mut rng, &[], 1.0, 1.0).is_empty());
    }
}
