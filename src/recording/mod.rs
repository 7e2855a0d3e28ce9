//! Square video recording
//!
//! This module ties the pipeline together:
//! - [`RecordingSession`] owns buffers, encoder sink and timestamp sequencer
//! - [`RecordingController`] creates one session per recording
//! - openh264 for H.264 encoding and muxide for MP4 muxing (`recording` feature)
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use squarecam::recording::{EncoderSettings, Mp4SinkFactory, RecordingController};
//! use squarecam::timing::SystemClock;
//! use squarecam::{Geometry, Orientation};
//!
//! let geometry = Geometry::new(640, 480, Orientation::Deg90);
//! let controller = RecordingController::new(
//!     geometry,
//!     "videos",
//!     EncoderSettings::default(),
//!     Arc::new(Mp4SinkFactory),
//!     Arc::new(SystemClock::new()),
//! )?;
//!
//! let path = controller.start_recording()?;
//! // In the camera preview callback:
//! controller.on_frame(&frame);
//! // When done:
//! let stats = controller.stop_recording();
//! ```

mod config;
mod controller;
#[cfg(feature = "recording")]
mod encoder;
#[cfg(feature = "recording")]
mod mp4;
mod session;
mod sink;

pub use config::{EncoderPreset, EncoderSettings, RecordingStats};
pub use controller::RecordingController;
#[cfg(feature = "recording")]
pub use encoder::{EncodedFrame, H264Encoder};
#[cfg(feature = "recording")]
pub use mp4::{Mp4Sink, Mp4SinkFactory};
pub use session::{FrameBuffers, RecordingSession, SessionState};
pub use sink::{SinkFactory, VideoSink};
