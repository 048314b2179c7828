//! Tension curve — a 32-sample rise/fall/rise arc derived from the seed.
//!
//! Six control points sit at fixed x-positions (start, 30%, 50%, 70%, 90%, end) with
//! seeded heights around a fixed shape: low intro, early peak, valley, main peak,
//! descent, low ending. Samples are linear interpolations between them.

use super::rng::SeededRandom;

/// Number of samples in every curve.
pub const CURVE_LENGTH: usize = 32;

/// (x fraction, base height, seeded spread) per control point.
/// The last point sits on the final sample index rather than at 100%.
const CONTROL_SHAPE: [(f64, f64, f64); 6] = [
    (0.0, 0.2, 0.2),
    (0.3, 0.4, 0.3),
    (0.5, 0.3, 0.2),
    (0.7, 0.6, 0.4),
    (0.9, 0.4, 0.3),
    (1.0, 0.2, 0.2),
];

/// Largest value a sample may take; keeps the curve inside `[0, 1)`.
const MAX_TENSION: f64 = 1.0 - f64::EPSILON;

/// Precomputed tension arc.
#[derive(Debug, Clone, PartialEq)]
pub struct TensionCurve {
    samples: Vec<f64>,
}

impl TensionCurve {
    /// Build the curve for a seed. Uses its own generator, so the caller's cursor is untouched.
    pub fn generate(seed: u32) -> Self {
        let mut rng = SeededRandom::new(seed);
        let last = (CURVE_LENGTH - 1) as f64;

        let points: Vec<(f64, f64)> = CONTROL_SHAPE
            .iter()
            .map(|&(fraction, base, spread)| {
                let x = if fraction >= 1.0 {
                    last
                } else {
                    CURVE_LENGTH as f64 * fraction
                };
                (x, base + rng.draw() * spread)
            })
            .collect();

        let samples = (0..CURVE_LENGTH)
            .map(|i| {
                let i = i as f64;
                let (p1, p2) = points
                    .windows(2)
                    .find(|w| i >= w[0].0 && i <= w[1].0)
                    .map(|w| (w[0], w[1]))
                    .unwrap_or((points[0], points[points.len() - 1]));
                let t = (i - p1.0) / (p2.0 - p1.0);
                (p1.1 + t * (p2.1 - p1.1)).clamp(0.0, MAX_TENSION)
            })
            .collect();

        Self { samples }
    }

    /// Tension at a relative position in `[0, 1]`; out-of-range positions clamp.
    pub fn sample(&self, position: f64) -> f64 {
        let index = (position.max(0.0) * CURVE_LENGTH as f64) as usize;
        self.samples[index.min(CURVE_LENGTH - 1)]
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sample by direct index, wrapping around the curve.
    pub fn at(&self, index: usize) -> f64 {
        self.samples[index % CURVE_LENGTH]
    }
}
