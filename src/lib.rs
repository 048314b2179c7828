//! Seedwave — a seed-reproducible procedural music engine.
//!
//! A handful of numeric controls and a seed drive a pipeline that builds chord
//! progressions, bass lines, melodies and a long-form evolution arc, then plays
//! them tick by tick into an instrument sink over MIDI, OSC or a log.

pub mod config;
pub mod control;
pub mod engine;
pub mod evolution;
pub mod generate;
pub mod output;
pub mod runtime;
pub mod sequencer;
pub mod theory;
