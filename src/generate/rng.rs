//! Seeded draw sequence used by every composition generator.
//!
//! A cheap sine-hash generator: `fract(sin(cursor) * 10000)`, advancing the integer
//! cursor by one per draw. It is not statistically strong and not meant to be; it only
//! has to reproduce the same sequence for the same seed on every platform that
//! implements IEEE `sin` the same way.

/// Deterministic draw sequence driven by an integer cursor.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    cursor: i64,
}

impl SeededRandom {
    pub fn new(seed: u32) -> Self {
        Self {
            cursor: seed as i64,
        }
    }

    /// Move the cursor back to `seed`. The only way to make draws repeat.
    pub fn reset(&mut self, seed: u32) {
        self.cursor = seed as i64;
    }

    /// Next value in `[0, 1)`.
    pub fn draw(&mut self) -> f64 {
        let x = (self.cursor as f64).sin() * 10000.0;
        self.cursor += 1;
        let fract = x - x.floor();
        // fract can round up to exactly 1.0 for tiny negative x
        if fract >= 1.0 {
            0.0
        } else {
            fract
        }
    }

    /// Draw an index in `[0, len)`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        ((self.draw() * len as f64) as usize).min(len - 1)
    }

    /// Current cursor position.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }
}
