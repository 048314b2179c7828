//! MIDI output — one channel per voice, effects as control changes.
//!
//! Note-ons that start in the future (swing) and every note-off wait in a
//! [`ReleaseQueue`] until the runtime flushes past their time.

use std::collections::HashMap;

use midir::{MidiOutput, MidiOutputConnection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::queue::ReleaseQueue;
use super::{EffectParam, InstrumentSink, NoteEvent, SinkError, Voice};
use crate::sequencer::beat::Beat;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;

/// CC 91: reverb send (GM effects 1 depth).
pub const CC_REVERB: u8 = 91;
/// CC 94: delay send (effects 4 depth).
pub const CC_DELAY: u8 = 94;
/// CC 74: brightness / filter cutoff.
pub const CC_CUTOFF: u8 = 74;
/// CC 123: all notes off.
const CC_ALL_NOTES_OFF: u8 = 123;

const CUTOFF_MIN_HZ: f64 = 100.0;
const CUTOFF_MAX_HZ: f64 = 10_000.0;

/// MIDI channel (0–15) for each voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceChannels {
    #[serde(default = "VoiceChannels::default_melody")]
    pub melody: u8,
    #[serde(default = "VoiceChannels::default_chord")]
    pub chord: u8,
    #[serde(default = "VoiceChannels::default_bass")]
    pub bass: u8,
    #[serde(default = "VoiceChannels::default_pad")]
    pub pad: u8,
}

impl VoiceChannels {
    fn default_melody() -> u8 {
        0
    }
    fn default_chord() -> u8 {
        1
    }
    fn default_bass() -> u8 {
        2
    }
    fn default_pad() -> u8 {
        3
    }

    pub fn channel(&self, voice: Voice) -> u8 {
        let ch = match voice {
            Voice::Melody => self.melody,
            Voice::Chord => self.chord,
            Voice::Bass => self.bass,
            Voice::Pad => self.pad,
        };
        ch & 0x0F
    }

    /// Distinct channels in voice order.
    pub fn distinct(&self) -> Vec<u8> {
        let mut channels = Vec::with_capacity(4);
        for voice in Voice::ALL {
            let ch = self.channel(voice);
            if !channels.contains(&ch) {
                channels.push(ch);
            }
        }
        channels
    }
}

impl Default for VoiceChannels {
    fn default() -> Self {
        Self {
            melody: Self::default_melody(),
            chord: Self::default_chord(),
            bass: Self::default_bass(),
            pad: Self::default_pad(),
        }
    }
}

pub fn note_on(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

pub fn note_off(channel: u8, note: u8) -> [u8; 3] {
    [NOTE_OFF | (channel & 0x0F), note & 0x7F, 0]
}

pub fn control_change(channel: u8, cc: u8, value: u8) -> [u8; 3] {
    [CONTROL_CHANGE | (channel & 0x0F), cc & 0x7F, value & 0x7F]
}

/// 0.0–1.0 velocity to a 1–127 MIDI velocity. A note-on with velocity 0 is a note-off,
/// so audible notes never go below 1.
pub fn midi_velocity(velocity: f64) -> u8 {
    ((velocity.clamp(0.0, 1.0) * 127.0).round() as u8).max(1)
}

/// Map a cutoff frequency onto 0–127 on a logarithmic scale.
pub fn cutoff_to_cc(hz: f64) -> u8 {
    let hz = hz.clamp(CUTOFF_MIN_HZ, CUTOFF_MAX_HZ);
    let norm = (hz / CUTOFF_MIN_HZ).ln() / (CUTOFF_MAX_HZ / CUTOFF_MIN_HZ).ln();
    (norm * 127.0).round() as u8
}

/// Control change number and value for an effect update.
pub fn effect_cc(param: EffectParam, value: f64) -> (u8, u8) {
    match param {
        EffectParam::ReverbWet => (CC_REVERB, (value.clamp(0.0, 1.0) * 127.0).round() as u8),
        EffectParam::DelayWet => (CC_DELAY, (value.clamp(0.0, 1.0) * 127.0).round() as u8),
        EffectParam::FilterCutoff => (CC_CUTOFF, cutoff_to_cc(value)),
    }
}

/// Where raw MIDI bytes go.
pub trait MidiPort {
    /// Open the underlying device. Called from the sink's `prepare()`.
    fn open(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn send(&mut self, message: &[u8]) -> Result<(), SinkError>;
}

/// A hardware or virtual output port through midir, opened lazily.
pub struct MidirPort {
    device_name: Option<String>,
    connection: Option<MidiOutputConnection>,
    port_name: Option<String>,
}

impl MidirPort {
    /// `device_name` is a substring match; `None` picks the first port.
    pub fn new(device_name: Option<String>) -> Self {
        Self {
            device_name,
            connection: None,
            port_name: None,
        }
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// List all available MIDI output port names.
    pub fn list_ports() -> Vec<String> {
        let Ok(midi_out) = MidiOutput::new("seedwave-list") else {
            return Vec::new();
        };
        midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect()
    }
}

impl MidiPort for MidirPort {
    fn open(&mut self) -> Result<(), SinkError> {
        if self.connection.is_some() {
            return Ok(());
        }

        let midi_out =
            MidiOutput::new("seedwave").map_err(|e| SinkError::MidiInit(e.to_string()))?;
        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(SinkError::NoPorts);
        }

        let (port, name) = match self.device_name {
            Some(ref filter) => ports
                .iter()
                .find_map(|p| {
                    let name = midi_out.port_name(p).unwrap_or_default();
                    name.contains(filter.as_str()).then(|| (p.clone(), name))
                })
                .ok_or_else(|| SinkError::PortNotFound(filter.clone()))?,
            None => {
                let p = ports[0].clone();
                let name = midi_out
                    .port_name(&p)
                    .unwrap_or_else(|_| "unknown".to_string());
                (p, name)
            }
        };

        let connection = midi_out
            .connect(&port, "seedwave-out")
            .map_err(|e| SinkError::Connect(e.to_string()))?;
        info!(port = %name, "MIDI output connected");
        self.connection = Some(connection);
        self.port_name = Some(name);
        Ok(())
    }

    fn send(&mut self, message: &[u8]) -> Result<(), SinkError> {
        match self.connection {
            Some(ref mut conn) => conn.send(message).map_err(|e| SinkError::Send(e.to_string())),
            None => Err(SinkError::Send("port not open".to_string())),
        }
    }
}

/// A message waiting in the release queue.
#[derive(Debug, Clone, Copy)]
enum Pending {
    On { channel: u8, note: u8, velocity: u8, id: u64 },
    /// Only sent while note `id` is still the one sounding on its key.
    Off { channel: u8, note: u8, id: u64 },
}

/// Drives a [`MidiPort`] from note events and effect updates.
///
/// At most one note sounds per (channel, note) key. A repeated pitch ends the
/// earlier note before it starts, and the earlier note's pending note-off is dropped.
pub struct MidiSink<P: MidiPort = MidirPort> {
    port: P,
    channels: VoiceChannels,
    queue: ReleaseQueue<Pending>,
    position: Beat,
    /// Id of the note currently sounding per (channel, note).
    sounding: HashMap<(u8, u8), u64>,
    next_id: u64,
}

impl MidiSink<MidirPort> {
    /// Sink for a midir output port, connected on `prepare()`.
    pub fn midir(device_name: Option<String>, channels: VoiceChannels) -> Self {
        Self::new(MidirPort::new(device_name), channels)
    }
}

impl<P: MidiPort> MidiSink<P> {
    pub fn new(port: P, channels: VoiceChannels) -> Self {
        Self {
            port,
            channels,
            queue: ReleaseQueue::new(),
            position: Beat::ZERO,
            sounding: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Messages still waiting for their time.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn start_note(&mut self, channel: u8, note: u8, velocity: u8, id: u64) {
        if self.sounding.insert((channel, note), id).is_some() {
            self.send(note_off(channel, note));
        }
        self.send(note_on(channel, note, velocity));
    }

    fn end_note(&mut self, channel: u8, note: u8, id: u64) {
        if self.sounding.get(&(channel, note)) == Some(&id) {
            self.sounding.remove(&(channel, note));
            self.send(note_off(channel, note));
        }
    }

    fn release(&mut self, pending: Pending) {
        match pending {
            Pending::On {
                channel,
                note,
                velocity,
                id,
            } => self.start_note(channel, note, velocity, id),
            Pending::Off { channel, note, id } => self.end_note(channel, note, id),
        }
    }

    fn send(&mut self, message: [u8; 3]) {
        if let Err(e) = self.port.send(&message) {
            warn!("MIDI send failed: {e}");
        }
    }
}

impl<P: MidiPort> InstrumentSink for MidiSink<P> {
    fn prepare(&mut self) -> Result<(), SinkError> {
        self.port.open()?;
        self.position = Beat::ZERO;
        self.queue.clear();
        Ok(())
    }

    fn trigger(&mut self, event: &NoteEvent) {
        let channel = self.channels.channel(event.voice);
        let velocity = midi_velocity(event.velocity);
        for pitch in &event.pitches {
            let note = pitch.midi();
            let id = self.next_id;
            self.next_id += 1;
            if event.start <= self.position {
                self.start_note(channel, note, velocity, id);
            } else {
                self.queue.push(
                    event.start,
                    Pending::On {
                        channel,
                        note,
                        velocity,
                        id,
                    },
                );
            }
            self.queue.push(event.end(), Pending::Off { channel, note, id });
        }
    }

    fn set_effect_parameter(&mut self, param: EffectParam, value: f64) {
        let (cc, cc_value) = effect_cc(param, value);
        for channel in self.channels.distinct() {
            self.send(control_change(channel, cc, cc_value));
        }
    }

    fn set_tempo(&mut self, bpm: f64) {
        debug!(bpm, "tempo change (no MIDI message)");
    }

    fn flush(&mut self, until: Beat) {
        for pending in self.queue.drain_until(until) {
            self.release(pending);
        }
        self.position = self.position.max(until);
    }

    fn silence(&mut self) {
        self.queue.clear();
        let sounding: Vec<(u8, u8)> = self.sounding.drain().map(|(key, _)| key).collect();
        for (channel, note) in sounding {
            self.send(note_off(channel, note));
        }
        for channel in self.channels.distinct() {
            self.send(control_change(channel, CC_ALL_NOTES_OFF, 0));
        }
        self.position = Beat::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::Pitch;

    #[derive(Default)]
    struct CapturePort {
        sent: Vec<Vec<u8>>,
        opened: bool,
    }

    impl MidiPort for CapturePort {
        fn open(&mut self) -> Result<(), SinkError> {
            self.opened = true;
            Ok(())
        }

        fn send(&mut self, message: &[u8]) -> Result<(), SinkError> {
            self.sent.push(message.to_vec());
            Ok(())
        }
    }

    fn sink() -> MidiSink<CapturePort> {
        let mut sink = MidiSink::new(CapturePort::default(), VoiceChannels::default());
        sink.prepare().unwrap();
        sink
    }

    fn c4_chord(start: Beat) -> NoteEvent {
        NoteEvent::new(
            Voice::Chord,
            vec![Pitch::parse("C4").unwrap(), Pitch::parse("E4").unwrap()],
            start,
            Beat::from_beats(1),
            1.0,
        )
    }

    #[test]
    fn prepare_opens_port() {
        assert!(sink().port().opened);
    }

    #[test]
    fn immediate_note_on_and_queued_off() {
        let mut sink = sink();
        sink.trigger(&c4_chord(Beat::ZERO));
        assert_eq!(sink.port().sent, vec![vec![0x91, 60, 127], vec![0x91, 64, 127]]);
        assert_eq!(sink.pending(), 2);

        sink.flush(Beat::from_beats(1));
        assert_eq!(sink.pending(), 2);
        sink.flush(Beat::from_ticks(961));
        assert_eq!(sink.port().sent.len(), 4);
        assert_eq!(sink.port().sent[2], vec![0x81, 60, 0]);
    }

    #[test]
    fn future_note_on_waits_for_flush() {
        let mut sink = sink();
        let mut event = c4_chord(Beat::from_ticks(24));
        event.voice = Voice::Melody;
        event.pitches.truncate(1);
        sink.trigger(&event);
        assert!(sink.port().sent.is_empty());
        sink.flush(Beat::from_ticks(25));
        assert_eq!(sink.port().sent, vec![vec![0x90, 60, 127]]);
    }

    fn c5_melody(start: u64, length: u64) -> NoteEvent {
        NoteEvent::new(
            Voice::Melody,
            vec![Pitch::parse("C5").unwrap()],
            Beat::from_ticks(start),
            Beat::from_ticks(length),
            1.0,
        )
    }

    const C5_ON: [u8; 3] = [0x90, 72, 127];
    const C5_OFF: [u8; 3] = [0x80, 72, 0];

    #[test]
    fn repeated_pitch_back_to_back_keeps_second_note() {
        let mut sink = sink();
        sink.trigger(&c5_melody(0, 240));
        sink.flush(Beat::from_ticks(240));
        sink.trigger(&c5_melody(240, 240));
        sink.flush(Beat::from_ticks(480));
        // the first note's own note-off at 240 is dropped
        assert_eq!(sink.port().sent, vec![C5_ON.to_vec(), C5_OFF.to_vec(), C5_ON.to_vec()]);

        sink.flush(Beat::from_ticks(481));
        assert_eq!(sink.port().sent.len(), 4);
        assert_eq!(sink.port().sent[3], C5_OFF.to_vec());
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn overlapping_repeat_ends_earlier_note_first() {
        let mut sink = sink();
        sink.trigger(&c5_melody(0, 480));
        sink.flush(Beat::from_ticks(240));
        sink.trigger(&c5_melody(240, 480));
        sink.flush(Beat::from_ticks(700));
        assert_eq!(sink.port().sent.len(), 3);

        sink.flush(Beat::from_ticks(721));
        assert_eq!(
            sink.port().sent,
            vec![C5_ON.to_vec(), C5_OFF.to_vec(), C5_ON.to_vec(), C5_OFF.to_vec()]
        );
        // nothing left sounding, so silence only sends all-notes-off
        sink.silence();
        assert!(sink.port().sent[4..].iter().all(|m| m[1] == CC_ALL_NOTES_OFF));
    }

    #[test]
    fn queued_repeat_also_ends_earlier_note() {
        let mut sink = sink();
        sink.trigger(&c5_melody(0, 480));
        sink.trigger(&c5_melody(24, 480));
        sink.flush(Beat::from_ticks(25));
        assert_eq!(sink.port().sent, vec![C5_ON.to_vec(), C5_OFF.to_vec(), C5_ON.to_vec()]);
        sink.flush(Beat::from_ticks(600));
        assert_eq!(sink.port().sent.last(), Some(&C5_OFF.to_vec()));
        assert_eq!(sink.port().sent.len(), 4);
    }

    #[test]
    fn effect_goes_to_every_voice_channel() {
        let mut sink = sink();
        sink.set_effect_parameter(EffectParam::ReverbWet, 0.5);
        assert_eq!(sink.port().sent.len(), 4);
        for (i, msg) in sink.port().sent.iter().enumerate() {
            assert_eq!(msg, &vec![0xB0 | i as u8, CC_REVERB, 64]);
        }
    }

    #[test]
    fn shared_channels_deduplicated() {
        let channels = VoiceChannels {
            melody: 5,
            chord: 5,
            bass: 6,
            pad: 5,
        };
        assert_eq!(channels.distinct(), vec![5, 6]);
    }

    #[test]
    fn silence_releases_sounding_notes() {
        let mut sink = sink();
        sink.trigger(&c4_chord(Beat::ZERO));
        sink.silence();
        assert_eq!(sink.pending(), 0);
        let sent = &sink.port().sent;
        assert!(sent.contains(&vec![0x81, 60, 0]));
        assert!(sent.contains(&vec![0x81, 64, 0]));
        assert!(sent.contains(&vec![0xB1, CC_ALL_NOTES_OFF, 0]));
    }

    #[test]
    fn cutoff_log_scale() {
        assert_eq!(cutoff_to_cc(100.0), 0);
        assert_eq!(cutoff_to_cc(1000.0), 64);
        assert_eq!(cutoff_to_cc(10_000.0), 127);
        assert_eq!(cutoff_to_cc(50.0), 0);
    }

    #[test]
    fn velocity_scaling() {
        assert_eq!(midi_velocity(1.0), 127);
        assert_eq!(midi_velocity(0.5), 64);
        assert_eq!(midi_velocity(0.0), 1);
    }

    #[test]
    fn list_ports_does_not_panic() {
        let _ = MidirPort::list_ports();
    }
}
