//! Real-time session — drives the engine from wall-clock time on a single thread.
//!
//! Each iteration drains pending control commands, advances the transport by the
//! elapsed time, runs one engine tick per 16th-note boundary crossed, and lets the
//! sink release everything due before the new position.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::control::{ControlCommand, ControlReceiver};
use crate::engine::{CompositionEngine, EngineError};
use crate::output::InstrumentSink;
use crate::sequencer::position::STEPS_PER_BAR;
use crate::sequencer::{Beat, Transport};

/// How often the loop wakes up.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

pub struct Session<S: InstrumentSink> {
    engine: CompositionEngine<S>,
    transport: Transport,
    commands: ControlReceiver,
    stop_flag: Arc<AtomicBool>,
}

impl<S: InstrumentSink> Session<S> {
    pub fn new(engine: CompositionEngine<S>, commands: ControlReceiver) -> Self {
        let transport = Transport::new(engine.params().tempo);
        Self {
            engine,
            transport,
            commands,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends [`Session::run`] when set (e.g. from a Ctrl-C handler).
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn engine(&self) -> &CompositionEngine<S> {
        &self.engine
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn into_engine(self) -> CompositionEngine<S> {
        self.engine
    }

    /// Start engine and transport together.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.engine.is_started() {
            return Ok(());
        }
        self.engine.start()?;
        self.transport.reset();
        self.transport.set_bpm(self.engine.params().tempo);
        self.transport.play();
        Ok(())
    }

    pub fn stop(&mut self) {
        self.engine.stop();
        self.transport.stop();
        self.transport.reset();
    }

    /// Apply one control command.
    pub fn apply(&mut self, cmd: ControlCommand) {
        match cmd {
            ControlCommand::SetParam { name, value } => {
                self.engine.update_param(&name, value);
            }
            ControlCommand::ChangeSeed(seed) => self.engine.change_seed(seed),
            ControlCommand::Randomize => self.engine.randomize_all_knobs(),
            ControlCommand::Start => {
                if let Err(e) = self.start() {
                    warn!("start failed: {e}");
                }
            }
            ControlCommand::Stop => self.stop(),
        }
        self.transport.set_bpm(self.engine.params().tempo);
    }

    /// One loop iteration. Returns the number of ticks run.
    pub fn step(&mut self, elapsed: Duration) -> u64 {
        for cmd in self.commands.drain() {
            self.apply(cmd);
        }

        let Some((from, to)) = self.transport.advance_by(elapsed) else {
            return 0;
        };
        let ticks = Transport::steps_in(from, to);
        for _ in 0..ticks {
            self.engine.tick();
        }
        self.engine.sink_mut().flush(to);
        ticks
    }

    /// Start, then loop until the stop flag is set. Stops the engine on the way out.
    pub fn run(&mut self, poll: Duration) -> Result<(), EngineError> {
        self.start()?;
        info!(bpm = self.transport.bpm(), "session running");

        let mut last = Instant::now();
        while !self.stop_flag.load(Ordering::Relaxed) {
            thread::sleep(poll);
            let now = Instant::now();
            self.step(now - last);
            last = now;
        }

        self.stop();
        info!("session ended");
        Ok(())
    }
}

/// Tick `bars` bars as fast as possible, flushing as musical time passes.
/// Returns the number of ticks run.
pub fn render_offline<S: InstrumentSink>(
    engine: &mut CompositionEngine<S>,
    bars: u32,
) -> Result<u64, EngineError> {
    engine.start()?;
    let ticks = bars as u64 * STEPS_PER_BAR as u64;
    for i in 0..ticks {
        engine.tick();
        engine.sink_mut().flush(Beat::from_steps(i + 1));
    }
    // let the last notes ring out
    engine.sink_mut().flush(Beat::from_steps(ticks) + Beat::from_bars(2));
    Ok(ticks)
}
