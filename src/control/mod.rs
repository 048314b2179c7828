//! Control input — an mpsc bridge from MIDI and OSC threads to the engine thread.
//!
//! Input callbacks never touch the engine. They translate what they receive into
//! [`ControlCommand`]s and send them here; the runtime drains the channel between
//! ticks.

pub mod midi;
pub mod osc;

pub use midi::{apply_midi_message, MidiInput, MidiMapping};
pub use osc::{apply_osc_message, OscListener};

use std::sync::mpsc;

/// A request to change the engine, from any input.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Set a parameter by name (canonical or alias).
    SetParam { name: String, value: f64 },
    /// Switch seed; `None` picks a random one.
    ChangeSeed(Option<u32>),
    Randomize,
    Start,
    Stop,
}

/// Errors opening a control input.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("failed to initialize MIDI input: {0}")]
    MidiInit(String),
    #[error("no MIDI input ports available")]
    NoPorts,
    #[error("MIDI input device matching '{0}' not found")]
    DeviceNotFound(String),
    #[error("failed to connect to MIDI input: {0}")]
    Connect(String),
    #[error("failed to bind OSC listener: {0}")]
    Bind(#[from] std::io::Error),
}

/// Sender half, cloned into each input thread.
pub type ControlSender = mpsc::Sender<ControlCommand>;

/// Receiver half, held by the runtime loop.
pub struct ControlReceiver {
    rx: mpsc::Receiver<ControlCommand>,
}

impl ControlReceiver {
    /// Non-blocking poll for the next command.
    pub fn poll(&self) -> Option<ControlCommand> {
        self.rx.try_recv().ok()
    }

    /// Take every pending command.
    pub fn drain(&self) -> Vec<ControlCommand> {
        let mut commands = Vec::new();
        while let Ok(cmd) = self.rx.try_recv() {
            commands.push(cmd);
        }
        commands
    }
}

pub fn control_channel() -> (ControlSender, ControlReceiver) {
    let (tx, rx) = mpsc::channel();
    (tx, ControlReceiver { rx })
}
