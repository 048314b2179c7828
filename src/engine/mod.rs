//! Composition engine — owns parameters, seed, generated material and the clock.
//!
//! The engine is passive: a host calls [`CompositionEngine::tick`] once per 16th
//! note while started, and feeds parameter changes in between ticks. All output
//! goes through the [`InstrumentSink`] it owns.

pub mod params;
pub mod snapshot;

pub use params::{GenerationParams, ParamEffect, ParamId, ParamSpec, PARAM_TABLE};
pub use snapshot::DisplaySnapshot;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::evolution::{EvolutionStage, EvolutionStateMachine};
use crate::generate::{
    build_bassline, build_hook, build_pattern, build_progression, Material, SeededRandom,
    TensionCurve,
};
use crate::output::{EffectParam, InstrumentSink, SinkError};
use crate::sequencer::{PlaybackContext, SequencerClock, DEFAULT_PHRASES_PER_STAGE};
use crate::theory::{PitchClass, ScaleKind, NOTE_NAMES};

/// Upper bound (exclusive) for randomly chosen seeds.
pub const RANDOM_SEED_RANGE: u32 = 1_000_000;
/// Chance of a full regeneration at the top of each progression cycle.
pub const DEFAULT_VARIATION_PROBABILITY: f64 = 0.3;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("instrument sink not ready: {0}")]
    Sink(#[from] SinkError),
}

/// Structural settings fixed for the engine's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Completed phrases per evolution stage.
    pub phrases_per_stage: u32,
    /// Chance of a full regeneration at each cycle start.
    pub variation_probability: f64,
    /// Seed for the variation draws. `None` seeds from OS entropy.
    pub variation_seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            phrases_per_stage: DEFAULT_PHRASES_PER_STAGE,
            variation_probability: DEFAULT_VARIATION_PROBABILITY,
            variation_seed: None,
        }
    }
}

pub struct CompositionEngine<S: InstrumentSink> {
    sink: S,
    params: GenerationParams,
    seed: u32,
    rng: SeededRandom,
    curve: TensionCurve,
    material: Material,
    evolution: EvolutionStateMachine,
    clock: SequencerClock,
    started: bool,
    variation_rng: ChaCha8Rng,
    variation_probability: f64,
}

impl<S: InstrumentSink> CompositionEngine<S> {
    /// Build an engine and generate its first material.
    pub fn new(sink: S, seed: u32, params: GenerationParams, options: EngineOptions) -> Self {
        let variation_rng = match options.variation_seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut engine = Self {
            sink,
            params: params.sanitized(),
            seed,
            rng: SeededRandom::new(seed),
            curve: TensionCurve::generate(seed),
            material: Material::default(),
            evolution: EvolutionStateMachine::new(),
            clock: SequencerClock::new(options.phrases_per_stage),
            started: false,
            variation_rng,
            variation_probability: options.variation_probability.clamp(0.0, 1.0),
        };
        engine.regenerate();
        engine
    }

    /// Engine with default parameters and options.
    pub fn with_seed(sink: S, seed: u32) -> Self {
        Self::new(sink, seed, GenerationParams::default(), EngineOptions::default())
    }

    /// Prepare the sink and begin ticking from zero. No-op while already started.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.started {
            return Ok(());
        }
        self.sink.prepare()?;
        self.clock.reset();
        self.forward_all();
        self.started = true;
        info!(seed = self.seed, stage = self.evolution.label(), "engine started");
        Ok(())
    }

    /// Stop, silence the sink and zero the clock. Safe to call at any time.
    pub fn stop(&mut self) {
        if self.started {
            self.sink.silence();
            info!(ticks = self.clock.ticks(), "engine stopped");
        }
        self.started = false;
        self.clock.reset();
        self.evolution.reset();
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Run one 16th-note subdivision. Returns the number of note events triggered.
    pub fn tick(&mut self) -> usize {
        if !self.started {
            return 0;
        }

        let (at, roll) = self.clock.advance(self.material.progression.len());

        if roll.phrase_wrapped {
            let refresh = self.evolution.advance();
            info!(stage = self.evolution.label(), "evolution stage");
            if refresh {
                self.regenerate_melody();
            }
        }

        let events = {
            let ctx = PlaybackContext {
                material: &self.material,
                curve: &self.curve,
                stage: self.evolution.stage(),
                bass_intensity: self.params.bass_intensity,
                rhythm_complexity: self.params.rhythm_complexity,
                swing: self.params.swing_feel,
            };
            self.clock.emissions(at, roll, &ctx)
        };
        for event in &events {
            self.sink.trigger(event);
        }

        if self.clock.position().at_cycle_start()
            && self.variation_rng.gen::<f64>() < self.variation_probability
        {
            debug!("cycle variation");
            self.regenerate();
        }

        events.len()
    }

    /// Set a parameter by name. Unknown names and non-finite values are ignored.
    /// Returns the parameter that changed.
    pub fn update_param(&mut self, name: &str, value: f64) -> Option<ParamId> {
        let Some(id) = ParamId::from_name(name) else {
            debug!(name, "unknown parameter ignored");
            return None;
        };
        self.set_param(id, value).map(|_| id)
    }

    /// Set a parameter and apply its effect. Returns the stored (clamped) value.
    pub fn set_param(&mut self, id: ParamId, value: f64) -> Option<f64> {
        let Some(stored) = self.params.set(id, value) else {
            debug!(param = id.name(), value, "rejected non-finite value");
            return None;
        };
        debug!(param = id.name(), value = stored, "parameter");
        match id.spec().effect {
            ParamEffect::Regenerate => self.regenerate(),
            ParamEffect::Tempo => self.sink.set_tempo(stored),
            ParamEffect::Effect(fx) => self.sink.set_effect_parameter(fx, stored),
            ParamEffect::Store => {}
        }
        Some(stored)
    }

    /// Draw every parameter from the seeded sequence, then regenerate.
    pub fn randomize_all_knobs(&mut self) {
        self.rng.reset(self.seed);
        let rng = &mut self.rng;
        let params = GenerationParams {
            scale: (rng.draw() * 7.0).floor() as u8,
            root: (rng.draw() * 12.0).floor() as u8,
            octave: (rng.draw() * 3.0).floor() as i8 + 3,
            chord_complexity: rng.draw(),
            bass_intensity: rng.draw(),
            harmonic_tension: rng.draw(),
            tempo: 80.0 + (rng.draw() * 100.0).floor(),
            rhythm_complexity: rng.draw(),
            swing_feel: rng.draw() * 0.5,
            reverb_amount: rng.draw(),
            delay_amount: rng.draw(),
            filter_cutoff: 500.0 + rng.draw() * 9500.0,
        };
        self.params = params.sanitized();
        info!(seed = self.seed, "randomized all parameters");
        self.regenerate();
        self.forward_all();
    }

    /// Switch to a new seed (random when `None`): new tension curve, back to Intro,
    /// all material rebuilt.
    pub fn change_seed(&mut self, seed: Option<u32>) {
        let seed = seed.unwrap_or_else(|| self.variation_rng.gen_range(0..RANDOM_SEED_RANGE));
        self.seed = seed;
        self.curve = TensionCurve::generate(seed);
        self.evolution.reset();
        self.regenerate();
        info!(seed, "seed changed");
    }

    pub fn display_snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            seed: self.seed,
            scale_name: self.scale().name(),
            root_name: NOTE_NAMES[self.params.root as usize % 12],
            bpm: self.params.tempo,
            evolution_phase: self.evolution.label(),
            playing: self.started,
            position: self.clock.position(),
        }
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn tension_curve(&self) -> &TensionCurve {
        &self.curve
    }

    pub fn stage(&self) -> EvolutionStage {
        self.evolution.stage()
    }

    pub fn clock(&self) -> &SequencerClock {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn scale(&self) -> ScaleKind {
        ScaleKind::from_index(self.params.scale as usize)
    }

    fn root(&self) -> PitchClass {
        PitchClass::new(self.params.root as i32)
    }

    /// Rebuild progression, bassline, pattern and hook from the seed.
    fn regenerate(&mut self) {
        let (scale, root, p) = (self.scale(), self.root(), &self.params);
        let rng = &mut self.rng;

        rng.reset(self.seed);
        let progression = build_progression(
            rng,
            scale,
            root,
            p.octave,
            p.chord_complexity,
            p.harmonic_tension,
        );
        let bassline = build_bassline(rng, &progression, p.bass_intensity, p.rhythm_complexity);
        let pattern = build_pattern(rng, scale, root, p.octave, p.rhythm_complexity, &self.curve);

        rng.reset(self.seed);
        let hook = build_hook(rng, scale, root, p.octave);

        self.material = Material {
            progression,
            bassline,
            pattern,
            hook,
        };
        debug!(
            chords = self.material.progression.len(),
            slots = self.material.pattern.len(),
            "material regenerated"
        );
    }

    /// Rebuild only the main pattern, continuing the seeded sequence.
    fn regenerate_melody(&mut self) {
        let (scale, root) = (self.scale(), self.root());
        self.material.pattern = build_pattern(
            &mut self.rng,
            scale,
            root,
            self.params.octave,
            self.params.rhythm_complexity,
            &self.curve,
        );
    }

    /// Push tempo and every effect value to the sink.
    fn forward_all(&mut self) {
        self.sink.set_tempo(self.params.tempo);
        self.sink
            .set_effect_parameter(EffectParam::ReverbWet, self.params.reverb_amount);
        self.sink
            .set_effect_parameter(EffectParam::DelayWet, self.params.delay_amount);
        self.sink
            .set_effect_parameter(EffectParam::FilterCutoff, self.params.filter_cutoff);
    }
}
