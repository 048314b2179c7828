//! seedwave — generative music from a seed and twelve knobs.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng;
use tracing::{info, warn};

use seedwave::config::AppConfig;
use seedwave::control::{control_channel, MidiInput, OscListener};
use seedwave::engine::{CompositionEngine, EngineOptions, RANDOM_SEED_RANGE};
use seedwave::output::midi::MidirPort;
use seedwave::output::{InstrumentSink, LogSink, MidiSink, OscSink, Recorded, RecordingSink};
use seedwave::runtime::{render_offline, Session, DEFAULT_POLL_INTERVAL};

#[derive(Parser)]
#[command(name = "seedwave")]
#[command(about = "Seed-reproducible generative music over MIDI and OSC")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.seedwave/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play in real time until Ctrl-C
    Play {
        /// Seed (overrides config; random when neither is set)
        #[arg(short, long)]
        seed: Option<u32>,

        /// Where notes go
        #[arg(long, value_enum, default_value_t = SinkKind::Log)]
        sink: SinkKind,

        /// MIDI output device (substring match, overrides config)
        #[arg(long)]
        midi_out: Option<String>,

        /// OSC target host:port (overrides config)
        #[arg(long)]
        osc_target: Option<String>,

        /// Do not open MIDI or OSC control inputs
        #[arg(long)]
        no_input: bool,
    },

    /// Generate offline and print the events
    Render {
        /// Number of bars to render
        #[arg(short, long, default_value_t = 16)]
        bars: u32,

        #[arg(short, long)]
        seed: Option<u32>,

        #[arg(short, long, value_enum, default_value_t = RenderFormat::Log)]
        format: RenderFormat,
    },

    /// Print the display snapshot for a seed as YAML
    Snapshot {
        #[arg(short, long)]
        seed: Option<u32>,
    },

    /// List MIDI input and output ports
    Ports,
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkKind {
    Log,
    Midi,
    Osc,
}

#[derive(Clone, Copy, ValueEnum)]
enum RenderFormat {
    Yaml,
    Log,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("loading config")?;

    match cli.command {
        Commands::Play {
            seed,
            sink,
            midi_out,
            osc_target,
            no_input,
        } => play(&config, seed, sink, midi_out, osc_target, no_input),
        Commands::Render {
            bars,
            seed,
            format,
        } => render(&config, seed, bars, format),
        Commands::Snapshot { seed } => {
            let engine = CompositionEngine::new(
                LogSink::new(),
                resolve_seed(seed, &config),
                config.params.clone(),
                config.engine_options(),
            );
            print!("{}", serde_yaml::to_string(&engine.display_snapshot())?);
            Ok(())
        }
        Commands::Ports => {
            println!("MIDI inputs:");
            for name in MidiInput::list_devices() {
                println!("  {name}");
            }
            println!("MIDI outputs:");
            for name in MidirPort::list_ports() {
                println!("  {name}");
            }
            Ok(())
        }
    }
}

/// CLI seed, then config seed, then a random one.
fn resolve_seed(cli_seed: Option<u32>, config: &AppConfig) -> u32 {
    cli_seed
        .or(config.seed)
        .unwrap_or_else(|| rand::thread_rng().gen_range(0..RANDOM_SEED_RANGE))
}

fn play(
    config: &AppConfig,
    seed: Option<u32>,
    sink_kind: SinkKind,
    midi_out: Option<String>,
    osc_target: Option<String>,
    no_input: bool,
) -> Result<()> {
    let sink: Box<dyn InstrumentSink> = match sink_kind {
        SinkKind::Log => Box::new(LogSink::new()),
        SinkKind::Midi => Box::new(MidiSink::midir(
            midi_out.or_else(|| config.midi.output_device.clone()),
            config.midi.voice_channels,
        )),
        SinkKind::Osc => {
            let target = osc_target.unwrap_or_else(|| config.osc.target.clone());
            Box::new(OscSink::new(resolve_addr(&target)?))
        }
    };

    let seed = resolve_seed(seed, config);
    let engine = CompositionEngine::new(sink, seed, config.params.clone(), config.engine_options());
    info!("{}", engine.display_snapshot().summary());

    let (tx, rx) = control_channel();
    let mut session = Session::new(engine, rx);

    let _midi_input = if no_input {
        None
    } else {
        MidiInput::start(
            config.midi.input_device.as_deref(),
            config.midi.cc_mappings.clone(),
            config.midi.channel_filter,
            tx.clone(),
        )
        .map_err(|e| warn!("MIDI input unavailable: {e}"))
        .ok()
    };
    let _osc_listener = if no_input {
        None
    } else {
        OscListener::start(config.osc.listen_port, tx)
            .map_err(|e| warn!("OSC input unavailable: {e}"))
            .ok()
    };

    let stop = session.stop_flag();
    ctrlc::set_handler(move || stop.store(true, std::sync::atomic::Ordering::Relaxed))
        .context("installing Ctrl-C handler")?;

    session.run(DEFAULT_POLL_INTERVAL)?;
    Ok(())
}

fn render(config: &AppConfig, seed: Option<u32>, bars: u32, format: RenderFormat) -> Result<()> {
    let seed = resolve_seed(seed, config);
    let options = EngineOptions {
        variation_seed: Some(seed as u64),
        ..config.engine_options()
    };
    let mut engine = CompositionEngine::new(RecordingSink::new(), seed, config.params.clone(), options);
    let ticks = render_offline(&mut engine, bars)?;
    info!(ticks, "{}", engine.display_snapshot().summary());

    let calls = engine.into_sink().into_calls();
    match format {
        RenderFormat::Yaml => print!("{}", serde_yaml::to_string(&calls)?),
        RenderFormat::Log => {
            for call in &calls {
                if let Recorded::Note(note) = call {
                    println!("{note}");
                }
            }
        }
    }
    Ok(())
}

fn resolve_addr(target: &str) -> Result<SocketAddr> {
    target
        .to_socket_addrs()
        .with_context(|| format!("resolving OSC target {target}"))?
        .next()
        .with_context(|| format!("no address for OSC target {target}"))
}
