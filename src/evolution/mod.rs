//! Evolution controller — the four-stage long-form arc.
//!
//! The piece cycles Intro → Development → Climax → Resolution → Intro, one stage
//! per completed phrase cycle. Each stage biases playback: which melody is read,
//! how long melody notes ring, and whether a pad sounds under the chords.

use serde::Serialize;

use crate::sequencer::beat::NoteValue;

/// A long-form structural phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EvolutionStage {
    #[default]
    Intro,
    Development,
    Climax,
    Resolution,
}

/// Which generated melody a tick reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MelodySource {
    Main,
    Hook,
}

impl EvolutionStage {
    /// The stage that follows this one; Resolution wraps to Intro.
    pub fn next(self) -> Self {
        match self {
            EvolutionStage::Intro => EvolutionStage::Development,
            EvolutionStage::Development => EvolutionStage::Climax,
            EvolutionStage::Climax => EvolutionStage::Resolution,
            EvolutionStage::Resolution => EvolutionStage::Intro,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EvolutionStage::Intro => "Intro",
            EvolutionStage::Development => "Development",
            EvolutionStage::Climax => "Climax",
            EvolutionStage::Resolution => "Resolution",
        }
    }

    /// Whether entering this stage rebuilds the main melody.
    pub fn refreshes_melody(self) -> bool {
        matches!(self, EvolutionStage::Development | EvolutionStage::Climax)
    }

    /// Melody source for a bar within the current section.
    pub fn melody_source(self, bar: u32) -> MelodySource {
        match self {
            EvolutionStage::Intro => MelodySource::Main,
            EvolutionStage::Development if bar % 2 == 1 => MelodySource::Hook,
            EvolutionStage::Development => MelodySource::Main,
            EvolutionStage::Climax if bar == 0 => MelodySource::Hook,
            EvolutionStage::Climax => MelodySource::Main,
            EvolutionStage::Resolution => MelodySource::Hook,
        }
    }

    /// Melody note length; the first value applies to simple rhythms, the second to busy ones.
    pub fn melody_duration(self, rhythm_complexity: f64) -> NoteValue {
        let (simple, busy) = match self {
            EvolutionStage::Climax => (NoteValue::Sixteenth, NoteValue::ThirtySecond),
            EvolutionStage::Resolution => (NoteValue::Eighth, NoteValue::Sixteenth),
            EvolutionStage::Intro | EvolutionStage::Development => {
                (NoteValue::Sixteenth, NoteValue::Eighth)
            }
        };
        if rhythm_complexity < 0.5 {
            simple
        } else {
            busy
        }
    }

    /// Whether a sustained pad doubles the chord at each section start.
    pub fn has_pad(self) -> bool {
        self == EvolutionStage::Climax
    }
}

/// Tracks the current stage and reports transitions.
#[derive(Debug, Clone, Default)]
pub struct EvolutionStateMachine {
    stage: EvolutionStage,
}

impl EvolutionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> EvolutionStage {
        self.stage
    }

    pub fn label(&self) -> &'static str {
        self.stage.label()
    }

    /// Move to the next stage. Returns `true` when the caller should rebuild the melody.
    pub fn advance(&mut self) -> bool {
        self.stage = self.stage.next();
        self.stage.refreshes_melody()
    }

    /// Back to Intro.
    pub fn reset(&mut self) {
        self.stage = EvolutionStage::Intro;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_all_stages() {
        let mut evo = EvolutionStateMachine::new();
        assert_eq!(evo.label(), "Intro");
        let mut labels = Vec::new();
        for _ in 0..4 {
            evo.advance();
            labels.push(evo.label());
        }
        assert_eq!(labels, ["Development", "Climax", "Resolution", "Intro"]);
    }

    #[test]
    fn melody_refresh_on_development_and_climax_only() {
        let mut evo = EvolutionStateMachine::new();
        assert!(evo.advance());
        assert!(evo.advance());
        assert!(!evo.advance());
        assert!(!evo.advance());
    }

    #[test]
    fn reset_returns_to_intro() {
        let mut evo = EvolutionStateMachine::new();
        evo.advance();
        evo.advance();
        evo.reset();
        assert_eq!(evo.stage(), EvolutionStage::Intro);
    }

    #[test]
    fn melody_sources_by_stage() {
        use MelodySource::*;
        let sources = |stage: EvolutionStage| -> Vec<MelodySource> {
            (0..4).map(|bar| stage.melody_source(bar)).collect()
        };
        assert_eq!(sources(EvolutionStage::Intro), [Main, Main, Main, Main]);
        assert_eq!(sources(EvolutionStage::Development), [Main, Hook, Main, Hook]);
        assert_eq!(sources(EvolutionStage::Climax), [Hook, Main, Main, Main]);
        assert_eq!(sources(EvolutionStage::Resolution), [Hook, Hook, Hook, Hook]);
    }

    #[test]
    fn durations_by_stage() {
        assert_eq!(EvolutionStage::Climax.melody_duration(0.2).label(), "16n");
        assert_eq!(EvolutionStage::Climax.melody_duration(0.8).label(), "32n");
        assert_eq!(EvolutionStage::Resolution.melody_duration(0.2).label(), "8n");
        assert_eq!(EvolutionStage::Resolution.melody_duration(0.5).label(), "16n");
        assert_eq!(EvolutionStage::Intro.melody_duration(0.49).label(), "16n");
        assert_eq!(EvolutionStage::Development.melody_duration(0.9).label(), "8n");
    }

    #[test]
    fn pad_only_in_climax() {
        assert!(EvolutionStage::Climax.has_pad());
        assert!(!EvolutionStage::Intro.has_pad());
        assert!(!EvolutionStage::Resolution.has_pad());
    }
}
