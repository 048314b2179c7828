//! MIDI control input — CC knobs onto parameters, program change onto seeds.

use midir::{MidiInput as MidirInput, MidiInputConnection};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ControlCommand, ControlError, ControlSender};
use crate::engine::ParamId;

/// Mapping rule from a MIDI message to a control command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MidiMapping {
    /// CC value 0–127 scaled onto the parameter's range.
    CcToParam { cc: u8, param: ParamId },
    /// Program change number becomes the new seed.
    ProgramToSeed,
    /// A note-on of this note randomizes every parameter.
    NoteToRandomize { note: u8 },
}

/// CC 1–12 onto the twelve parameters in table order, program change to seed,
/// note 0 to randomize.
pub fn default_mappings() -> Vec<MidiMapping> {
    let mut mappings: Vec<MidiMapping> = ParamId::ALL
        .iter()
        .enumerate()
        .map(|(i, &param)| MidiMapping::CcToParam {
            cc: i as u8 + 1,
            param,
        })
        .collect();
    mappings.push(MidiMapping::ProgramToSeed);
    mappings.push(MidiMapping::NoteToRandomize { note: 0 });
    mappings
}

/// Parse a raw MIDI message and apply mappings.
///
/// - CC:       `[0xB0 | channel, cc_number, value]`
/// - Program:  `[0xC0 | channel, program]`
/// - Note On:  `[0x90 | channel, note, velocity]` (velocity 0 is a note-off and ignored)
pub fn apply_midi_message(
    msg: &[u8],
    mappings: &[MidiMapping],
    channel_filter: Option<u8>,
) -> Option<ControlCommand> {
    let status = msg.first()? & 0xF0;
    let channel = msg[0] & 0x0F;

    if channel_filter.is_some_and(|filter| filter != channel) {
        return None;
    }

    match status {
        0xB0 if msg.len() >= 3 => {
            let (number, value) = (msg[1], msg[2]);
            mappings.iter().find_map(|m| match m {
                MidiMapping::CcToParam { cc, param } if *cc == number => {
                    Some(ControlCommand::SetParam {
                        name: param.name().to_string(),
                        value: param.spec().from_unit(value as f64 / 127.0),
                    })
                }
                _ => None,
            })
        }
        0xC0 if msg.len() >= 2 => mappings
            .iter()
            .any(|m| *m == MidiMapping::ProgramToSeed)
            .then(|| ControlCommand::ChangeSeed(Some(msg[1] as u32))),
        0x90 if msg.len() >= 3 && msg[2] > 0 => {
            let played = msg[1];
            mappings
                .iter()
                .any(|m| matches!(m, MidiMapping::NoteToRandomize { note } if *note == played))
                .then_some(ControlCommand::Randomize)
        }
        _ => None,
    }
}

/// Active MIDI input connection. Dropping it disconnects.
pub struct MidiInput {
    _connection: MidiInputConnection<()>,
    port_name: String,
}

impl MidiInput {
    /// Connect to the first port whose name contains `device_name` (or the first port)
    /// and send mapped commands through `sender`.
    pub fn start(
        device_name: Option<&str>,
        mappings: Vec<MidiMapping>,
        channel_filter: Option<u8>,
        sender: ControlSender,
    ) -> Result<Self, ControlError> {
        let midi_in =
            MidirInput::new("seedwave").map_err(|e| ControlError::MidiInit(e.to_string()))?;

        let ports = midi_in.ports();
        if ports.is_empty() {
            return Err(ControlError::NoPorts);
        }

        let (port, port_name) = match device_name {
            Some(filter) => ports
                .iter()
                .find_map(|p| {
                    let name = midi_in.port_name(p).unwrap_or_default();
                    name.contains(filter).then(|| (p.clone(), name))
                })
                .ok_or_else(|| ControlError::DeviceNotFound(filter.to_string()))?,
            None => {
                let p = ports[0].clone();
                let name = midi_in
                    .port_name(&p)
                    .unwrap_or_else(|_| "unknown".to_string());
                (p, name)
            }
        };

        let connection = midi_in
            .connect(
                &port,
                "seedwave-input",
                move |_timestamp, msg, _| {
                    if let Some(cmd) = apply_midi_message(msg, &mappings, channel_filter) {
                        let _ = sender.send(cmd);
                    }
                },
                (),
            )
            .map_err(|e| ControlError::Connect(e.to_string()))?;

        info!(port = %port_name, "MIDI input connected");
        Ok(Self {
            _connection: connection,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// List all available MIDI input device names.
    pub fn list_devices() -> Vec<String> {
        let Ok(midi_in) = MidirInput::new("seedwave-list") else {
            return Vec::new();
        };
        midi_in
            .ports()
            .iter()
            .filter_map(|p| midi_in.port_name(p).ok())
            .collect()
    }
}
