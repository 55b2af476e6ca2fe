//! Configuration system for the hydra frontend

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HydraError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub general: GeneralConfig,
    pub video: VideoConfig,
    pub audio: AudioConfig,
    pub input: InputConfig,
    pub debug: DebugConfig,
}

/// General frontend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory searched for core libraries
    pub cores_dir: PathBuf,
    /// Directory searched for content
    pub content_dir: PathBuf,
    /// Create cores in the paused run state instead of running
    pub start_paused: bool,
}

/// Video output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    /// Upper bound applied to the frame rate a core asks for
    pub max_frame_rate: u32,
}

/// Audio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enable: bool,
    pub sample_rate: u32,
    pub channels: u32,
    /// Queue capacity in sample frames. Pushes beyond it report an overrun.
    pub buffer_samples: usize,
}

/// Input settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Number of controller ports exposed to cores
    pub ports: u32,
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    /// Log every structure chain the host receives
    pub trace_chains: bool,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hydra");

        Self {
            cores_dir: base.join("cores"),
            content_dir: base.join("content"),
            start_paused: false,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            max_frame_rate: 60,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enable: true,
            sample_rate: 48000,
            channels: 2,
            buffer_samples: 8192,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { ports: 4 }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            trace_chains: false,
        }
    }
}

impl std::str::FromStr for Config {
    type Err = HydraError;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| HydraError::Config(e.to_string()))
    }
}

impl Config {
    /// Load configuration from the default location, or create it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, writing the defaults there if the file is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            content.parse()
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| HydraError::Config(e.to_string()))
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hydra")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.general.start_paused);
        assert_eq!(config.video.max_frame_rate, 60);
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.audio.channels, 2);
        assert_eq!(config.input.ports, 4);
        assert_eq!(config.debug.log_level, LogLevel::Info);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = config.to_toml().unwrap();
        let parsed: Config = toml_str.parse().unwrap();
        assert_eq!(parsed.audio.buffer_samples, config.audio.buffer_samples);
        assert_eq!(parsed.video.width, config.video.width);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = "[audio]\nsample_rate = 44100\n".parse().unwrap();
        assert_eq!(parsed.audio.sample_rate, 44100);
        assert!(parsed.audio.enable);
        assert_eq!(parsed.video.height, 480);
    }

    #[test]
    fn test_invalid_config() {
        let err = "[audio]\nsample_rate = \"fast\"\n".parse::<Config>().unwrap_err();
        assert!(matches!(err, HydraError::Config(_)));
    }

    #[test]
    fn test_load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.audio.sample_rate, 48000);

        std::fs::write(&path, "[debug]\nlog_level = \"Trace\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.debug.log_level, LogLevel::Trace);
    }
}
