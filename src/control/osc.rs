//! OSC control input — a UDP listener thread translating addresses into commands.
//!
//! Addresses:
//! - `/param/<name> f` sets a parameter by canonical name or alias
//! - `/seed [i]` changes seed (random when no argument)
//! - `/randomize`, `/start`, `/stop`

use std::io;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rosc::{decoder, OscMessage, OscPacket, OscType};
use tracing::{debug, info};

use super::{ControlCommand, ControlError, ControlSender};
use crate::engine::ParamId;

/// Translate one OSC message. Unknown addresses and parameter names yield `None`.
pub fn apply_osc_message(msg: &OscMessage) -> Option<ControlCommand> {
    if let Some(name) = msg.addr.strip_prefix("/param/") {
        let id = ParamId::from_name(name)?;
        let value = extract_float(&msg.args, 0)?;
        return Some(ControlCommand::SetParam {
            name: id.name().to_string(),
            value,
        });
    }

    match msg.addr.as_str() {
        "/seed" => {
            let seed = extract_float(&msg.args, 0).map(|v| v.max(0.0) as u32);
            Some(ControlCommand::ChangeSeed(seed))
        }
        "/randomize" => Some(ControlCommand::Randomize),
        "/start" => Some(ControlCommand::Start),
        "/stop" => Some(ControlCommand::Stop),
        _ => None,
    }
}

/// Numeric OSC argument at `index`, widened to f64.
fn extract_float(args: &[OscType], index: usize) -> Option<f64> {
    args.get(index).and_then(|arg| match arg {
        OscType::Float(f) => Some(*f as f64),
        OscType::Double(d) => Some(*d),
        OscType::Int(i) => Some(*i as f64),
        OscType::Long(l) => Some(*l as f64),
        _ => None,
    })
}

/// Messages in a packet, bundles flattened.
fn messages(packet: OscPacket) -> Vec<OscMessage> {
    match packet {
        OscPacket::Message(msg) => vec![msg],
        OscPacket::Bundle(bundle) => bundle.content.into_iter().flat_map(messages).collect(),
    }
}

/// Active OSC listener running on a background thread.
pub struct OscListener {
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    port: u16,
}

impl OscListener {
    /// Listen on `127.0.0.1:port`. Port 0 picks a free port.
    pub fn start(port: u16, sender: ControlSender) -> Result<Self, ControlError> {
        let socket = UdpSocket::bind(("127.0.0.1", port))?;
        // short timeout so the stop flag is checked periodically
        socket.set_read_timeout(Some(Duration::from_millis(100)))?;
        let port = socket.local_addr()?.port();

        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();

        let thread = thread::spawn(move || {
            let mut buf = [0u8; 4096];
            while !stop_clone.load(Ordering::Relaxed) {
                match socket.recv_from(&mut buf) {
                    Ok((size, _addr)) => {
                        let Ok((_, packet)) = decoder::decode_udp(&buf[..size]) else {
                            debug!("undecodable OSC packet");
                            continue;
                        };
                        for msg in messages(packet) {
                            match apply_osc_message(&msg) {
                                Some(cmd) => {
                                    if sender.send(cmd).is_err() {
                                        return;
                                    }
                                }
                                None => debug!(addr = %msg.addr, "unmapped OSC message"),
                            }
                        }
                    }
                    Err(ref e)
                        if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                    {
                        continue;
                    }
                    Err(_) => break,
                }
            }
        });

        info!(port, "OSC listener started");
        Ok(Self {
            stop_flag,
            thread: Some(thread),
            port,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Signal the listener to stop and wait for the thread.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for OscListener {
    fn drop(&mut self) {
        self.stop();
    }
}
