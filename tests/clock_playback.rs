//! Clock and playback integration tests — counters, evolution arc, and what reaches the sinks.

use std::collections::HashMap;

use seedwave::control::{control_channel, ControlCommand};
use seedwave::engine::{CompositionEngine, EngineOptions, GenerationParams};
use seedwave::evolution::EvolutionStage;
use seedwave::output::midi::MidiPort;
use seedwave::output::{
    MidiSink, NoteEvent, Recorded, RecordingSink, SinkError, Voice, VoiceChannels,
};
use seedwave::runtime::{render_offline, Session};
use seedwave::sequencer::{Beat, ClockPosition};

/// Helper: four-chord progression, default four phrases per stage, no random variation.
fn pop_engine(seed: u32) -> CompositionEngine<RecordingSink> {
    let params = GenerationParams {
        chord_complexity: 0.2,
        ..GenerationParams::default()
    };
    let options = EngineOptions {
        variation_probability: 0.0,
        variation_seed: Some(0),
        ..EngineOptions::default()
    };
    CompositionEngine::new(RecordingSink::new(), seed, params, options)
}

fn run_ticks<S: seedwave::output::InstrumentSink>(engine: &mut CompositionEngine<S>, n: u64) {
    for _ in 0..n {
        engine.tick();
    }
}

/// MIDI port that keeps every message.
#[derive(Default)]
struct CapturePort {
    messages: Vec<[u8; 3]>,
}

impl MidiPort for CapturePort {
    fn send(&mut self, message: &[u8]) -> Result<(), SinkError> {
        self.messages.push([message[0], message[1], message[2]]);
        Ok(())
    }
}

// =============================================================================
// Counter roll-over
// =============================================================================

#[test]
fn counters_roll_over_through_the_hierarchy() {
    let mut engine = pop_engine(42);
    assert_eq!(engine.material().progression.len(), 4);
    engine.start().unwrap();

    run_ticks(&mut engine, 16);
    assert_eq!(
        engine.clock().position(),
        ClockPosition {
            step: 0,
            bar: 1,
            section: 0,
            phrase: 0
        }
    );

    run_ticks(&mut engine, 48);
    let pos = engine.clock().position();
    assert_eq!((pos.bar, pos.section), (0, 1));

    run_ticks(&mut engine, 192);
    let pos = engine.clock().position();
    assert_eq!((pos.section, pos.phrase), (0, 1));
    assert_eq!(engine.stage(), EvolutionStage::Intro);

    run_ticks(&mut engine, 768);
    assert_eq!(engine.clock().ticks(), 1024);
    assert_eq!(engine.clock().position(), ClockPosition::default());
    assert_eq!(engine.stage(), EvolutionStage::Development);
}

#[test]
fn evolution_cycles_back_to_intro() {
    let mut engine = pop_engine(7);
    engine.start().unwrap();
    let expected = [
        EvolutionStage::Development,
        EvolutionStage::Climax,
        EvolutionStage::Resolution,
        EvolutionStage::Intro,
    ];
    for stage in expected {
        run_ticks(&mut engine, 1024);
        assert_eq!(engine.stage(), stage);
    }
}

#[test]
fn stop_then_start_begins_from_zero() {
    let mut engine = pop_engine(42);
    engine.start().unwrap();
    run_ticks(&mut engine, 1100);
    assert_eq!(engine.stage(), EvolutionStage::Development);

    engine.stop();
    engine.start().unwrap();
    assert_eq!(engine.clock().ticks(), 0);
    assert_eq!(engine.clock().position(), ClockPosition::default());
    assert_eq!(engine.stage(), EvolutionStage::Intro);
    assert_eq!(engine.display_snapshot().evolution_phase, "Intro");
    assert_eq!(engine.sink().silence_count(), 1);
}

#[test]
fn entering_development_rebuilds_melody_deterministically() {
    let mut a = pop_engine(99);
    let mut b = pop_engine(99);
    let progression = a.material().progression.clone();
    let hook = a.material().hook.clone();
    a.start().unwrap();
    b.start().unwrap();
    run_ticks(&mut a, 1024);
    run_ticks(&mut b, 1024);

    assert_eq!(a.material().pattern, b.material().pattern);
    // only the melody is refreshed
    assert_eq!(a.material().progression, progression);
    assert_eq!(a.material().hook, hook);
}

// =============================================================================
// Playback content
// =============================================================================

#[test]
fn climax_plays_pad_and_intro_does_not() {
    let mut engine = pop_engine(5);
    engine.start().unwrap();
    run_ticks(&mut engine, 1024);
    assert!(engine.sink().notes().iter().all(|n| n.voice != Voice::Pad));

    run_ticks(&mut engine, 1024);
    assert_eq!(engine.stage(), EvolutionStage::Climax);
    engine.sink_mut().clear();
    run_ticks(&mut engine, 256);
    let pads: Vec<&NoteEvent> = engine
        .sink()
        .notes()
        .into_iter()
        .filter(|n| n.voice == Voice::Pad)
        .collect();
    // one pad per section start
    assert_eq!(pads.len(), 4);
    assert!(pads.iter().all(|p| p.pitches.len() == 3));
}

#[test]
fn note_starts_never_go_backwards_per_voice() {
    let mut engine = pop_engine(2);
    render_offline(&mut engine, 32).unwrap();
    let mut last: HashMap<Voice, Beat> = HashMap::new();
    for note in engine.sink().notes() {
        let prev = last.insert(note.voice, note.start);
        if let Some(prev) = prev {
            assert!(prev <= note.start, "{note}");
        }
    }
}

#[test]
fn offline_render_is_reproducible() {
    let render = |seed: u32| {
        let options = EngineOptions {
            variation_seed: Some(seed as u64),
            ..EngineOptions::default()
        };
        let mut engine =
            CompositionEngine::new(RecordingSink::new(), seed, GenerationParams::default(), options);
        render_offline(&mut engine, 64).unwrap();
        engine.into_sink().into_calls()
    };
    let first = render(1234);
    assert_eq!(first, render(1234));
    assert!(first.iter().any(|c| matches!(c, Recorded::Tempo { .. })));
    assert_ne!(first, render(4321));
}

#[test]
fn control_commands_drive_a_session() {
    let engine = pop_engine(42);
    let (tx, rx) = control_channel();
    let mut session = Session::new(engine, rx);

    tx.send(ControlCommand::Start).unwrap();
    tx.send(ControlCommand::SetParam {
        name: "reverb".to_string(),
        value: 0.75,
    })
    .unwrap();
    session.step(std::time::Duration::ZERO);
    assert!(session.engine().is_started());
    assert_eq!(
        session
            .engine()
            .sink()
            .last_effect(seedwave::output::EffectParam::ReverbWet),
        Some(0.75)
    );

    // two seconds at 120 BPM is four beats, sixteen steps
    assert_eq!(session.step(std::time::Duration::from_secs(2)), 16);
    assert_eq!(session.engine().clock().position().bar, 1);

    tx.send(ControlCommand::Stop).unwrap();
    session.step(std::time::Duration::ZERO);
    assert_eq!(session.engine().clock().ticks(), 0);
}

// =============================================================================
// MIDI output
// =============================================================================

#[test]
fn midi_sink_balances_note_on_and_off() {
    let sink = MidiSink::new(CapturePort::default(), VoiceChannels::default());
    let options = EngineOptions {
        variation_seed: Some(3),
        ..EngineOptions::default()
    };
    let mut engine = CompositionEngine::new(sink, 3, GenerationParams::default(), options);
    render_offline(&mut engine, 16).unwrap();

    let sink = engine.into_sink();
    assert_eq!(sink.pending(), 0);

    let mut balance: HashMap<(u8, u8), i32> = HashMap::new();
    for msg in &sink.port().messages {
        let key = (msg[0] & 0x0F, msg[1]);
        match msg[0] & 0xF0 {
            0x90 => *balance.entry(key).or_insert(0) += 1,
            0x80 => {
                let count = balance.entry(key).or_insert(0);
                *count -= 1;
                assert!(*count >= 0, "note-off before note-on for {key:?}");
            }
            _ => {}
        }
    }
    assert!(balance.values().all(|&v| v == 0));
}

#[test]
fn midi_voices_use_their_channels() {
    let channels = VoiceChannels::default();
    let sink = MidiSink::new(CapturePort::default(), channels);
    let mut engine = CompositionEngine::with_seed(sink, 11);
    render_offline(&mut engine, 8).unwrap();

    let sink = engine.into_sink();
    let note_on_channels: Vec<u8> = sink
        .port()
        .messages
        .iter()
        .filter(|m| m[0] & 0xF0 == 0x90)
        .map(|m| m[0] & 0x0F)
        .collect();
    assert!(note_on_channels.contains(&channels.channel(Voice::Chord)));
    assert!(note_on_channels.contains(&channels.channel(Voice::Bass)));
    assert!(note_on_channels.contains(&channels.channel(Voice::Melody)));
    // no pad outside Climax
    assert!(!note_on_channels.contains(&channels.channel(Voice::Pad)));
}
