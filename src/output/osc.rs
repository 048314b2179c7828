//! OSC output — one UDP message per note, effect update and tempo change.
//!
//! Address layout:
//! - `/seedwave/<voice> [start_beats f, duration_beats f, velocity f, notes i...]`
//! - `/seedwave/fx/<param> [value f]`
//! - `/seedwave/tempo [bpm f]`

use std::net::{SocketAddr, UdpSocket};

use rosc::{encoder, OscMessage, OscPacket, OscType};
use tracing::{info, warn};

use super::{EffectParam, InstrumentSink, NoteEvent, SinkError};

const PREFIX: &str = "/seedwave";

pub fn note_message(event: &NoteEvent) -> OscMessage {
    let mut args = vec![
        OscType::Float(event.start.as_beats_f64() as f32),
        OscType::Float(event.duration.as_beats_f64() as f32),
        OscType::Float(event.velocity as f32),
    ];
    args.extend(event.pitches.iter().map(|p| OscType::Int(p.midi() as i32)));
    OscMessage {
        addr: format!("{PREFIX}/{}", event.voice.name()),
        args,
    }
}

pub fn effect_message(param: EffectParam, value: f64) -> OscMessage {
    OscMessage {
        addr: format!("{PREFIX}/fx/{}", param.name()),
        args: vec![OscType::Float(value as f32)],
    }
}

pub fn tempo_message(bpm: f64) -> OscMessage {
    OscMessage {
        addr: format!("{PREFIX}/tempo"),
        args: vec![OscType::Float(bpm as f32)],
    }
}

/// Sends to a fixed UDP target. The socket is bound on `prepare()`.
pub struct OscSink {
    target: SocketAddr,
    socket: Option<UdpSocket>,
}

impl OscSink {
    pub fn new(target: SocketAddr) -> Self {
        Self {
            target,
            socket: None,
        }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    fn send(&mut self, msg: OscMessage) {
        let Some(ref socket) = self.socket else {
            return;
        };
        let result = encoder::encode(&OscPacket::Message(msg))
            .map_err(|e| SinkError::Encode(e.to_string()))
            .and_then(|bytes| socket.send_to(&bytes, self.target).map_err(SinkError::from));
        if let Err(e) = result {
            warn!("OSC send failed: {e}");
        }
    }
}

impl InstrumentSink for OscSink {
    fn prepare(&mut self) -> Result<(), SinkError> {
        if self.socket.is_none() {
            let bind = if self.target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
            self.socket = Some(UdpSocket::bind(bind)?);
            info!(target = %self.target, "OSC output ready");
        }
        Ok(())
    }

    fn trigger(&mut self, event: &NoteEvent) {
        self.send(note_message(event));
    }

    fn set_effect_parameter(&mut self, param: EffectParam, value: f64) {
        self.send(effect_message(param, value));
    }

    fn set_tempo(&mut self, bpm: f64) {
        self.send(tempo_message(bpm));
    }
}
