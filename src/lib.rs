//! SquareCam: real-time square video recording from camera preview frames
//!
//! This crate turns a stream of NV21 preview frames into a square H.264/MP4
//! clip. Each frame is converted to packed 32-bit pixels, center-cropped to a
//! square, rotated to match the display orientation, scaled to the output
//! size and handed to the encoder with a strictly increasing timestamp.
//!
//! # Features
//! - NV21 to packed BGR conversion with fixed-point arithmetic
//! - Center crop with transpose/flip orientation handling
//! - Monotonic presentation timestamps driven by wall-clock arrival
//! - Thread-safe start/stop/feed on a single session lock
//! - Non-blocking frame pump for camera callbacks
//! - TOML configuration and a listing of recorded videos
//!
//! # Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! squarecam = { version = "0.1", features = ["recording"] }
//! ```
//!
//! Then wire the controller into your capture callback:
//! ```rust,ignore
//! use std::sync::Arc;
//! use squarecam::recording::{Mp4SinkFactory, RecordingController};
//! use squarecam::timing::SystemClock;
//! use squarecam::{Geometry, Orientation, SquareCamConfig};
//!
//! squarecam::init_logging();
//! let config = SquareCamConfig::load_or_default();
//! let controller = RecordingController::new(
//!     Geometry::new(640, 480, Orientation::Deg90),
//!     config.video_dir(),
//!     config.encoder_settings(),
//!     Arc::new(Mp4SinkFactory),
//!     Arc::new(SystemClock::new()),
//! )?;
//! controller.toggle()?;
//! ```
pub mod color;
pub mod config;
pub mod errors;
pub mod library;
pub mod pump;
pub mod recording;
pub mod timing;
pub mod transform;
pub mod types;

// Testing utilities - synthetic frames and doubles for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::SquareCamConfig;
pub use errors::{RecorderError, Result};
pub use library::{VideoEntry, VideoLibrary};
pub use pump::FramePump;
pub use recording::{EncoderSettings, RecordingController, RecordingSession, RecordingStats};
pub use timing::{Clock, SystemClock, TimestampSequencer};
pub use types::{CameraFacing, Frame, Geometry, Orientation, OwnedFrame};

/// Initialize logging for the recorder
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "squarecam=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        encoding_enabled: cfg!(feature = "recording"),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Whether the H.264/MP4 backend was compiled in
    pub encoding_enabled: bool,
}
