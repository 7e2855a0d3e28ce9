//! Encoder settings and recording statistics

use serde::{Deserialize, Serialize};

use crate::errors::{RecorderError, Result};

/// Encoder speed/quality trade-off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPreset {
    /// Lowest latency, tuned for live camera capture
    #[default]
    Realtime,
    /// Spend more time per frame for better quality at the same bitrate
    Quality,
}

/// Fixed output parameters for one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// Side of the square output video in pixels
    pub output_side: u32,
    /// Frames per second
    pub fps: f64,
    /// Target bitrate in bits per second
    pub bitrate: u32,
    pub preset: EncoderPreset,
    /// Enable fast-start for web playback (moov before mdat)
    pub fast_start: bool,
    /// Optional title metadata
    pub title: Option<String>,
}

impl EncoderSettings {
    pub const DEFAULT_OUTPUT_SIDE: u32 = 120;
    pub const DEFAULT_FPS: f64 = 30.0;
    pub const DEFAULT_BITRATE: u32 = 168_000;

    pub fn new(output_side: u32) -> Self {
        Self {
            output_side,
            ..Self::default()
        }
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn with_preset(mut self, preset: EncoderPreset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_fast_start(mut self, enabled: bool) -> Self {
        self.fast_start = enabled;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_side == 0 || self.output_side % 2 != 0 {
            return Err(RecorderError::InvalidGeometry(format!(
                "output side must be a positive even number, got {}",
                self.output_side
            )));
        }
        if !(self.fps > 0.0 && self.fps <= 240.0) {
            return Err(RecorderError::InvalidGeometry(format!(
                "fps must be within (0, 240], got {}",
                self.fps
            )));
        }
        if self.bitrate == 0 {
            return Err(RecorderError::InvalidGeometry(
                "bitrate must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            output_side: Self::DEFAULT_OUTPUT_SIDE,
            fps: Self::DEFAULT_FPS,
            bitrate: Self::DEFAULT_BITRATE,
            preset: EncoderPreset::Realtime,
            fast_start: true,
            title: None,
        }
    }
}

/// Statistics returned after finishing a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingStats {
    /// Total number of video frames written
    pub video_frames: u64,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Total bytes written to file
    pub bytes_written: u64,
    /// Frames skipped by the encoder or the pipeline
    pub dropped_frames: u64,
    /// Output file path
    pub output_path: String,
}

impl RecordingStats {
    /// Calculate the average bitrate achieved
    pub fn avg_bitrate(&self) -> f64 {
        if self.duration_secs > 0.0 {
            (self.bytes_written as f64 * 8.0) / self.duration_secs
        } else {
            0.0
        }
    }
}
