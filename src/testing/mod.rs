//! Testing utilities for SquareCam
//!
//! Synthetic NV21 frames, a manually driven clock and an in-memory sink,
//! enabling pipeline tests without a camera or an encoder.

pub mod doubles;
pub mod synthetic_data;

pub use doubles::{ManualClock, MemorySinkFactory};
pub use synthetic_data::{solid_nv21_frame, synthetic_nv21_frame, PhonePreviewCharacteristics};
