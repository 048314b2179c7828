//! Hierarchical clock counters: step → bar → section → phrase.

use serde::Serialize;

/// Steps (16th notes) per bar.
pub const STEPS_PER_BAR: u32 = 16;
/// Bars per section; one section plays one chord of the progression.
pub const BARS_PER_SECTION: u32 = 4;
/// Completed phrases per evolution stage unless configured otherwise.
pub const DEFAULT_PHRASES_PER_STAGE: u32 = 4;

/// Current place in the piece. Each counter owns the roll-over of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClockPosition {
    pub step: u32,
    pub bar: u32,
    pub section: u32,
    pub phrase: u32,
}

/// Which counters wrapped during one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rollover {
    /// A new bar began.
    pub bar_started: bool,
    /// A new section began (the bar counter wrapped).
    pub section_started: bool,
    /// The progression cycle completed (the section counter wrapped).
    pub cycle_completed: bool,
    /// The phrase counter wrapped; the evolution stage should advance.
    pub phrase_wrapped: bool,
}

impl ClockPosition {
    /// Advance one step. `progression_len` of zero pins the section at 0.
    pub fn advance(&mut self, progression_len: usize, phrases_per_stage: u32) -> Rollover {
        let mut roll = Rollover::default();

        self.step = (self.step + 1) % STEPS_PER_BAR;
        if self.step != 0 {
            return roll;
        }
        roll.bar_started = true;

        self.bar = (self.bar + 1) % BARS_PER_SECTION;
        if self.bar != 0 {
            return roll;
        }
        roll.section_started = true;

        if progression_len == 0 {
            self.section = 0;
            return roll;
        }
        self.section = (self.section + 1) % progression_len as u32;
        if self.section != 0 {
            return roll;
        }
        roll.cycle_completed = true;

        self.phrase = (self.phrase + 1) % phrases_per_stage.max(1);
        roll.phrase_wrapped = self.phrase == 0;
        roll
    }

    /// Steps elapsed since the start of the progression cycle.
    pub fn cycle_steps(&self) -> u32 {
        (self.section * BARS_PER_SECTION + self.bar) * STEPS_PER_BAR + self.step
    }

    /// Fraction of the progression cycle elapsed, in `[0, 1)`.
    pub fn cycle_fraction(&self, progression_len: usize) -> f64 {
        if progression_len == 0 {
            return 0.0;
        }
        let cycle = progression_len as f64 * (BARS_PER_SECTION * STEPS_PER_BAR) as f64;
        self.cycle_steps() as f64 / cycle
    }

    /// Whether this is the very first step of a progression cycle.
    pub fn at_cycle_start(&self) -> bool {
        self.step == 0 && self.bar == 0 && self.section == 0
    }
}
