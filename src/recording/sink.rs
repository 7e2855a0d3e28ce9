//! Destination for processed frames
//!
//! The session only talks to these traits, so the H.264/MP4 backend can be
//! swapped (or compiled out) without touching the frame pipeline.

use std::path::Path;

use super::config::{EncoderSettings, RecordingStats};
use crate::errors::Result;

/// An open encoder bound to one output file
pub trait VideoSink: Send {
    /// Encode and store one `side x side` frame at `pts_us` microseconds
    fn write_frame(&mut self, pixels: &[u32], side: u32, pts_us: u64) -> Result<()>;

    /// Flush pending frames and close the container
    fn finish(self: Box<Self>) -> Result<RecordingStats>;
}

/// Opens a [`VideoSink`] for a new recording
pub trait SinkFactory: Send + Sync {
    fn open(&self, path: &Path, settings: &EncoderSettings) -> Result<Box<dyn VideoSink>>;
}
