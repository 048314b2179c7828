//! Composition pipeline integration tests — seed + parameters → progression, bass, melody, hook.
//!
//! These exercise the engine through its public contract only, with a recording
//! sink standing in for the instrument layer.

use seedwave::engine::{CompositionEngine, EngineOptions, GenerationParams};
use seedwave::generate::{ProgressionStyle, TensionCurve, CURVE_LENGTH, HOOK_LENGTH};
use seedwave::output::RecordingSink;
use seedwave::theory::{ScaleKind, STRONG_DEGREES};

/// Helper: engine with fixed variation draws and the given parameters.
fn engine_with(seed: u32, params: GenerationParams) -> CompositionEngine<RecordingSink> {
    let options = EngineOptions {
        variation_seed: Some(0),
        ..EngineOptions::default()
    };
    CompositionEngine::new(RecordingSink::new(), seed, params, options)
}

/// Helper: scale degree of each chord root in C major.
fn chord_root_degrees(engine: &CompositionEngine<RecordingSink>) -> Vec<i32> {
    let intervals = ScaleKind::Major.intervals();
    engine
        .material()
        .progression
        .iter()
        .map(|chord| {
            let class = chord[0].class.index() as i32;
            intervals.iter().position(|&o| o == class).unwrap() as i32
        })
        .collect()
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn same_seed_and_params_give_identical_material() {
    for seed in [0, 1, 42, 65_535, 999_999] {
        let params = GenerationParams {
            chord_complexity: 0.7,
            harmonic_tension: 0.85,
            bass_intensity: 0.95,
            rhythm_complexity: 0.9,
            ..GenerationParams::default()
        };
        let a = engine_with(seed, params.clone());
        let b = engine_with(seed, params);
        assert_eq!(a.material(), b.material(), "seed {seed}");
        assert_eq!(a.tension_curve(), b.tension_curve(), "seed {seed}");
    }
}

#[test]
fn regenerating_after_param_round_trip_restores_material() {
    let mut engine = engine_with(314, GenerationParams::default());
    let original = engine.material().clone();
    engine.update_param("chordComplexity", 0.9);
    assert_ne!(engine.material().progression.len(), 0);
    engine.update_param("chordComplexity", 0.3);
    assert_eq!(engine.material(), &original);
}

#[test]
fn tension_curve_is_bounded_for_many_seeds() {
    for seed in (0..100_000).step_by(997) {
        let curve = TensionCurve::generate(seed);
        assert_eq!(curve.samples().len(), CURVE_LENGTH);
        assert!(curve.samples().iter().all(|v| (0.0..1.0).contains(v)));
    }
}

// =============================================================================
// Harmony
// =============================================================================

#[test]
fn seed_42_low_complexity_uses_pop_template() {
    let params = GenerationParams {
        scale: 0,
        root: 0,
        octave: 4,
        chord_complexity: 0.2,
        ..GenerationParams::default()
    };
    let engine = engine_with(42, params);
    let degrees = chord_root_degrees(&engine);
    assert_eq!(degrees.len(), 4);
    assert!(
        ProgressionStyle::Pop
            .templates()
            .iter()
            .any(|t| t == &degrees.as_slice()),
        "{degrees:?} is not a pop template"
    );
}

#[test]
fn chord_sizes_follow_harmonic_tension() {
    for (tension, size) in [(0.0, 3), (0.5, 3), (0.51, 4), (0.8, 4), (0.81, 5), (1.0, 5)] {
        let params = GenerationParams {
            harmonic_tension: tension,
            ..GenerationParams::default()
        };
        let engine = engine_with(7, params);
        for chord in &engine.material().progression {
            assert_eq!(chord.len(), size, "tension {tension}");
        }
    }
}

#[test]
fn progression_lengths_by_complexity() {
    for seed in 0..30 {
        for (complexity, range) in [(0.1, 4..=4), (0.5, 7..=8), (0.9, 4..=5)] {
            let params = GenerationParams {
                chord_complexity: complexity,
                ..GenerationParams::default()
            };
            let len = engine_with(seed, params).material().progression.len();
            assert!(range.contains(&len), "seed {seed} complexity {complexity}: {len}");
        }
    }
}

#[test]
fn full_bass_at_high_intensity_and_rhythm() {
    let params = GenerationParams {
        bass_intensity: 0.9,
        rhythm_complexity: 0.9,
        ..GenerationParams::default()
    };
    for seed in [1, 42, 500] {
        let engine = engine_with(seed, params.clone());
        let material = engine.material();
        assert_eq!(material.bassline.len(), material.progression.len());
        for entry in &material.bassline {
            assert_eq!(entry.len(), 4);
            // octave doubling sits exactly 12 semitones above the fundamental
            assert_eq!(entry[3].semitone() - entry[0].semitone(), 12);
            // walking tone is one semitone from the fundamental
            assert_eq!((entry[2].semitone() - entry[0].semitone()).abs(), 1);
        }
    }
}

#[test]
fn bass_feature_growth() {
    for (intensity, rhythm, min_len) in [(0.1, 0.9, 1), (0.31, 0.9, 2), (0.61, 0.9, 3), (0.81, 0.9, 4)] {
        let params = GenerationParams {
            bass_intensity: intensity,
            rhythm_complexity: rhythm,
            ..GenerationParams::default()
        };
        let engine = engine_with(9, params);
        assert!(engine
            .material()
            .bassline
            .iter()
            .all(|entry| entry.len() >= min_len && entry.len() <= 4));
    }
}

// =============================================================================
// Melody and hook
// =============================================================================

#[test]
fn pattern_length_tracks_rhythm_complexity() {
    for (rhythm, len) in [(0.0, 8), (0.25, 10), (0.5, 12), (1.0, 16)] {
        let params = GenerationParams {
            rhythm_complexity: rhythm,
            ..GenerationParams::default()
        };
        assert_eq!(engine_with(3, params).material().pattern.len(), len);
    }
}

#[test]
fn hook_is_stable_across_harmony_changes() {
    let mut engine = engine_with(2024, GenerationParams::default());
    let hook = engine.material().hook.clone();
    assert_eq!(hook.len(), HOOK_LENGTH);

    engine.update_param("harmonicTension", 0.9);
    engine.update_param("bassIntensity", 0.1);
    engine.update_param("chordComplexity", 0.8);
    assert_eq!(engine.material().hook, hook);
}

#[test]
fn hook_uses_strong_degrees_only() {
    let params = GenerationParams {
        scale: 1,
        root: 5,
        ..GenerationParams::default()
    };
    let engine = engine_with(88, params);
    let scale = ScaleKind::Minor;
    let root = seedwave::theory::PitchClass::new(5);
    let strong: Vec<_> = STRONG_DEGREES
        .iter()
        .map(|&d| scale.pitch(root, d, 4).class)
        .collect();
    for pitch in engine.material().hook.iter().filter_map(|s| s.pitch()) {
        assert!(strong.contains(&pitch.class), "{pitch}");
    }
}

#[test]
fn change_seed_changes_material() {
    let mut engine = engine_with(1, GenerationParams::default());
    let before = engine.material().clone();
    engine.change_seed(Some(2));
    assert_ne!(engine.material(), &before);
    engine.change_seed(Some(1));
    assert_eq!(engine.material(), &before);
}
