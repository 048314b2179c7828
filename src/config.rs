//! Application configuration — loads optional ~/.seedwave/config.yaml.
//!
//! Every field has a default, so a missing file, an empty file and a partial file
//! all work. Only a file that exists but cannot be read or parsed is an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::control::midi::{default_mappings, MidiMapping};
use crate::engine::{EngineOptions, GenerationParams, DEFAULT_VARIATION_PROBABILITY};
use crate::output::VoiceChannels;
use crate::sequencer::DEFAULT_PHRASES_PER_STAGE;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write config: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// MIDI device selection and control mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiSettings {
    /// Input device name (substring match). None = first available.
    pub input_device: Option<String>,
    /// Output device name (substring match). None = first available.
    pub output_device: Option<String>,
    /// Only accept input on this channel (0-15). None = all channels.
    pub channel_filter: Option<u8>,
    pub voice_channels: VoiceChannels,
    pub cc_mappings: Vec<MidiMapping>,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            input_device: None,
            output_device: None,
            channel_filter: None,
            voice_channels: VoiceChannels::default(),
            cc_mappings: default_mappings(),
        }
    }
}

/// OSC listen port and output target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscSettings {
    pub listen_port: u16,
    /// `host:port` for the OSC sink.
    pub target: String,
}

impl Default for OscSettings {
    fn default() -> Self {
        Self {
            listen_port: 9000,
            target: "127.0.0.1:57120".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Starting seed. None = random.
    pub seed: Option<u32>,
    pub phrases_per_stage: u32,
    pub variation_probability: f64,
    pub params: GenerationParams,
    pub midi: MidiSettings,
    pub osc: OscSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: None,
            phrases_per_stage: DEFAULT_PHRASES_PER_STAGE,
            variation_probability: DEFAULT_VARIATION_PROBABILITY,
            params: GenerationParams::default(),
            midi: MidiSettings::default(),
            osc: OscSettings::default(),
        }
    }
}

impl AppConfig {
    /// Standard location, `~/.seedwave/config.yaml`.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".seedwave");
        path.push("config.yaml");
        path
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the standard location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Write as YAML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            phrases_per_stage: self.phrases_per_stage.max(1),
            variation_probability: self.variation_probability,
            variation_seed: None,
        }
    }
}
