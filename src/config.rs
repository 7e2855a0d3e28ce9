//! Configuration management for SquareCam
//!
//! Provides loading, saving and validation of the recording and storage
//! settings used to build a [`RecordingController`](crate::recording::RecordingController).

use crate::errors::{RecorderError, Result};
use crate::pump::DEFAULT_PUMP_CAPACITY;
use crate::recording::{EncoderPreset, EncoderSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquareCamConfig {
    pub recording: RecordingConfig,
    pub storage: StorageConfig,
}

/// Output video parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Side of the square output video in pixels
    pub output_side: u32,
    /// Frames per second
    pub fps: f64,
    /// Target bitrate in bits per second
    pub bitrate: u32,
    /// Encoder preset ("realtime" or "quality")
    pub preset: EncoderPreset,
    /// Write the moov box first for progressive playback
    pub fast_start: bool,
    /// Optional title metadata
    pub title: Option<String>,
}

/// Where recordings go and how frames are queued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory recordings are written to
    pub video_directory: String,
    /// Frames the capture queue holds before dropping
    pub pump_capacity: usize,
}

impl Default for SquareCamConfig {
    fn default() -> Self {
        let encoder = EncoderSettings::default();
        Self {
            recording: RecordingConfig {
                output_side: encoder.output_side,
                fps: encoder.fps,
                bitrate: encoder.bitrate,
                preset: encoder.preset,
                fast_start: encoder.fast_start,
                title: None,
            },
            storage: StorageConfig {
                video_directory: "./videos".to_string(),
                pump_capacity: DEFAULT_PUMP_CAPACITY,
            },
        }
    }
}

impl SquareCamConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| RecorderError::Config(format!("Failed to read config file: {}", e)))?;

        let config: SquareCamConfig = toml::from_str(&contents)
            .map_err(|e| RecorderError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RecorderError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| RecorderError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| RecorderError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("squarecam.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Encoder settings described by the `[recording]` section
    pub fn encoder_settings(&self) -> EncoderSettings {
        let r = &self.recording;
        EncoderSettings {
            output_side: r.output_side,
            fps: r.fps,
            bitrate: r.bitrate,
            preset: r.preset,
            fast_start: r.fast_start,
            title: r.title.clone(),
        }
    }

    pub fn video_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.video_directory)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.encoder_settings()
            .validate()
            .map_err(|e| RecorderError::Config(e.to_string()))?;

        if self.storage.video_directory.trim().is_empty() {
            return Err(RecorderError::Config(
                "Video directory must not be empty".to_string(),
            ));
        }
        if self.storage.pump_capacity == 0 || self.storage.pump_capacity > 256 {
            return Err(RecorderError::Config(
                "Pump capacity must be between 1 and 256".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SquareCamConfig::default();
        assert_eq!(config.recording.output_side, 120);
        assert_eq!(config.recording.fps, 30.0);
        assert_eq!(config.recording.bitrate, 168_000);
        assert_eq!(config.storage.pump_capacity, DEFAULT_PUMP_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad = SquareCamConfig::default();
        bad.recording.output_side = 121;
        assert!(matches!(bad.validate(), Err(RecorderError::Config(_))));

        let mut bad = SquareCamConfig::default();
        bad.storage.pump_capacity = 0;
        assert!(bad.validate().is_err());

        let mut bad = SquareCamConfig::default();
        bad.storage.video_directory = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("conf").join("squarecam.toml");

        let mut config = SquareCamConfig::default();
        config.recording.title = Some("Clips".to_string());
        config.recording.preset = EncoderPreset::Quality;
        config.save_to_file(&config_path).unwrap();

        let loaded = SquareCamConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.encoder_settings().title.as_deref(), Some("Clips"));
    }

    #[test]
    fn test_config_toml_format() {
        let config = SquareCamConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[recording]"));
        assert!(toml_string.contains("[storage]"));
        assert!(toml_string.contains("output_side = 120"));
        assert!(toml_string.contains("preset = \"realtime\""));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[recording]\noutput_side = \"big\"\n").unwrap();
        assert!(matches!(
            SquareCamConfig::load_from_file(&path),
            Err(RecorderError::Config(_))
        ));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SquareCamConfig::load_from_file("nonexistent_squarecam.toml");
        assert_eq!(result.unwrap().recording.fps, 30.0);
    }
}
