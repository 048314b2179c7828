//! Generation parameters — the twelve controls, their ranges and what changing each one does.

use serde::{Deserialize, Serialize};

use crate::output::EffectParam;

/// One of the twelve recognized controls, in knob order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    Scale,
    Root,
    Octave,
    ChordComplexity,
    BassIntensity,
    HarmonicTension,
    Tempo,
    RhythmComplexity,
    SwingFeel,
    ReverbAmount,
    DelayAmount,
    FilterCutoff,
}

/// What happens after a parameter changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamEffect {
    /// Rebuild all generated material.
    Regenerate,
    /// Tell the sink the new tempo.
    Tempo,
    /// Forward to the sink's effect chain.
    Effect(EffectParam),
    /// Keep the value; it is read at playback time or not at all.
    Store,
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub id: ParamId,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub min: f64,
    pub max: f64,
    pub integer: bool,
    pub effect: ParamEffect,
}

impl ParamSpec {
    /// Bring a raw value into range, rounding integer parameters.
    /// Non-finite values are rejected.
    pub fn clamp(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let value = if self.integer { value.round() } else { value };
        Some(value.clamp(self.min, self.max))
    }

    /// Map a 0.0–1.0 control position onto this parameter's range.
    pub fn from_unit(&self, unit: f64) -> f64 {
        let value = self.min + unit.clamp(0.0, 1.0) * (self.max - self.min);
        if self.integer {
            value.round()
        } else {
            value
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

/// Every parameter, in [`ParamId`] order.
pub static PARAM_TABLE: [ParamSpec; 12] = [
    ParamSpec {
        id: ParamId::Scale,
        name: "scale",
        aliases: &[],
        min: 0.0,
        max: 6.0,
        integer: true,
        effect: ParamEffect::Regenerate,
    },
    ParamSpec {
        id: ParamId::Root,
        name: "root",
        aliases: &[],
        min: 0.0,
        max: 11.0,
        integer: true,
        effect: ParamEffect::Regenerate,
    },
    ParamSpec {
        id: ParamId::Octave,
        name: "octave",
        aliases: &[],
        min: 2.0,
        max: 6.0,
        integer: true,
        effect: ParamEffect::Store,
    },
    ParamSpec {
        id: ParamId::ChordComplexity,
        name: "chordComplexity",
        aliases: &["chord_complexity"],
        min: 0.0,
        max: 1.0,
        integer: false,
        effect: ParamEffect::Regenerate,
    },
    ParamSpec {
        id: ParamId::BassIntensity,
        name: "bassIntensity",
        aliases: &["bass_intensity"],
        min: 0.0,
        max: 1.0,
        integer: false,
        effect: ParamEffect::Regenerate,
    },
    ParamSpec {
        id: ParamId::HarmonicTension,
        name: "harmonicTension",
        aliases: &["harmonic_tension"],
        min: 0.0,
        max: 1.0,
        integer: false,
        effect: ParamEffect::Regenerate,
    },
    ParamSpec {
        id: ParamId::Tempo,
        name: "tempo",
        aliases: &["bpm"],
        min: 60.0,
        max: 180.0,
        integer: false,
        effect: ParamEffect::Tempo,
    },
    ParamSpec {
        id: ParamId::RhythmComplexity,
        name: "rhythmComplexity",
        aliases: &["rhythm_complexity"],
        min: 0.0,
        max: 1.0,
        integer: false,
        effect: ParamEffect::Regenerate,
    },
    ParamSpec {
        id: ParamId::SwingFeel,
        name: "swingFeel",
        aliases: &["swing_feel", "swing"],
        min: 0.0,
        max: 0.5,
        integer: false,
        effect: ParamEffect::Store,
    },
    ParamSpec {
        id: ParamId::ReverbAmount,
        name: "reverbAmount",
        aliases: &["reverb_amount", "reverb"],
        min: 0.0,
        max: 1.0,
        integer: false,
        effect: ParamEffect::Effect(EffectParam::ReverbWet),
    },
    ParamSpec {
        id: ParamId::DelayAmount,
        name: "delayAmount",
        aliases: &["delay_amount", "delay"],
        min: 0.0,
        max: 1.0,
        integer: false,
        effect: ParamEffect::Effect(EffectParam::DelayWet),
    },
    ParamSpec {
        id: ParamId::FilterCutoff,
        name: "filterCutoff",
        aliases: &["filter_cutoff", "filter"],
        min: 100.0,
        max: 10_000.0,
        integer: false,
        effect: ParamEffect::Effect(EffectParam::FilterCutoff),
    },
];

impl ParamId {
    pub const ALL: [ParamId; 12] = [
        ParamId::Scale,
        ParamId::Root,
        ParamId::Octave,
        ParamId::ChordComplexity,
        ParamId::BassIntensity,
        ParamId::HarmonicTension,
        ParamId::Tempo,
        ParamId::RhythmComplexity,
        ParamId::SwingFeel,
        ParamId::ReverbAmount,
        ParamId::DelayAmount,
        ParamId::FilterCutoff,
    ];

    pub fn spec(self) -> &'static ParamSpec {
        &PARAM_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look up by canonical name or alias.
    pub fn from_name(name: &str) -> Option<Self> {
        PARAM_TABLE.iter().find(|s| s.matches(name)).map(|s| s.id)
    }
}

/// Current value of every control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationParams {
    pub scale: u8,
    pub root: u8,
    pub octave: i8,
    #[serde(alias = "chord_complexity")]
    pub chord_complexity: f64,
    #[serde(alias = "bass_intensity")]
    pub bass_intensity: f64,
    #[serde(alias = "harmonic_tension")]
    pub harmonic_tension: f64,
    pub tempo: f64,
    #[serde(alias = "rhythm_complexity")]
    pub rhythm_complexity: f64,
    #[serde(alias = "swing_feel")]
    pub swing_feel: f64,
    #[serde(alias = "reverb_amount")]
    pub reverb_amount: f64,
    #[serde(alias = "delay_amount")]
    pub delay_amount: f64,
    #[serde(alias = "filter_cutoff")]
    pub filter_cutoff: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            scale: 0,
            root: 0,
            octave: 4,
            chord_complexity: 0.3,
            bass_intensity: 0.5,
            harmonic_tension: 0.2,
            tempo: 120.0,
            rhythm_complexity: 0.4,
            swing_feel: 0.1,
            reverb_amount: 0.3,
            delay_amount: 0.2,
            filter_cutoff: 2000.0,
        }
    }
}

impl GenerationParams {
    pub fn get(&self, id: ParamId) -> f64 {
        match id {
            ParamId::Scale => self.scale as f64,
            ParamId::Root => self.root as f64,
            ParamId::Octave => self.octave as f64,
            ParamId::ChordComplexity => self.chord_complexity,
            ParamId::BassIntensity => self.bass_intensity,
            ParamId::HarmonicTension => self.harmonic_tension,
            ParamId::Tempo => self.tempo,
            ParamId::RhythmComplexity => self.rhythm_complexity,
            ParamId::SwingFeel => self.swing_feel,
            ParamId::ReverbAmount => self.reverb_amount,
            ParamId::DelayAmount => self.delay_amount,
            ParamId::FilterCutoff => self.filter_cutoff,
        }
    }

    /// Store a value, clamped to the parameter's range. Returns the stored value,
    /// or `None` if the value was rejected.
    pub fn set(&mut self, id: ParamId, value: f64) -> Option<f64> {
        let value = id.spec().clamp(value)?;
        match id {
            ParamId::Scale => self.scale = value as u8,
            ParamId::Root => self.root = value as u8,
            ParamId::Octave => self.octave = value as i8,
            ParamId::ChordComplexity => self.chord_complexity = value,
            ParamId::BassIntensity => self.bass_intensity = value,
            ParamId::HarmonicTension => self.harmonic_tension = value,
            ParamId::Tempo => self.tempo = value,
            ParamId::RhythmComplexity => self.rhythm_complexity = value,
            ParamId::SwingFeel => self.swing_feel = value,
            ParamId::ReverbAmount => self.reverb_amount = value,
            ParamId::DelayAmount => self.delay_amount = value,
            ParamId::FilterCutoff => self.filter_cutoff = value,
        }
        Some(value)
    }

    /// Copy with every value forced into range; non-finite values fall back to defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut out = defaults.clone();
        for id in ParamId::ALL {
            if out.set(id, self.get(id)).is_none() {
                out.set(id, defaults.get(id));
            }
        }
        out
    }
}
