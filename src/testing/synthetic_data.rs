//! Synthetic NV21 frames for offline testing
//!
//! Frames carry a moving luma gradient plus a chroma pattern that differs
//! per 2x2 block, so every pipeline stage sees non-uniform content.

use crate::types::{nv21_len, OwnedFrame};

/// Create a synthetic NV21 frame whose content changes with `frame_number`
pub fn synthetic_nv21_frame(frame_number: u64, width: u32, height: u32) -> OwnedFrame {
    let w = width as usize;
    let h = height as usize;
    let mut data = vec![0u8; nv21_len(width, height)];
    let base = (frame_number % 256) as u8;

    let (y_plane, vu_plane) = data.split_at_mut(w * h);
    for y in 0..h {
        for x in 0..w {
            y_plane[y * w + x] = base.wrapping_add(((x + y) % 256) as u8);
        }
    }

    for (i, pair) in vu_plane.chunks_exact_mut(2).enumerate() {
        pair[0] = 128u8.wrapping_add((i % 64) as u8); // V
        pair[1] = 128u8.wrapping_sub(((i + frame_number as usize) % 64) as u8); // U
    }

    OwnedFrame::new(data, width, height)
}

/// A frame of uniform colour given as Y, U and V samples
pub fn solid_nv21_frame(width: u32, height: u32, y: u8, u: u8, v: u8) -> OwnedFrame {
    let frame_size = width as usize * height as usize;
    let mut data = vec![y; frame_size];
    data.resize(nv21_len(width, height), 0);
    for pair in data[frame_size..].chunks_exact_mut(2) {
        pair[0] = v;
        pair[1] = u;
    }
    OwnedFrame::new(data, width, height)
}

/// Preview characteristics of a common phone camera, handy for realistic tests
pub struct PhonePreviewCharacteristics {
    /// Negotiated preview resolution (landscape sensor order)
    pub preview_resolution: (u32, u32),
    /// Sensor mounting angle of the back camera
    pub back_sensor_orientation: u32,
    /// Sensor mounting angle of the front camera
    pub front_sensor_orientation: u32,
    /// Preview callback rate
    pub frame_rate: f64,
}

impl Default for PhonePreviewCharacteristics {
    fn default() -> Self {
        Self {
            preview_resolution: (640, 480),
            back_sensor_orientation: 90,
            front_sensor_orientation: 270,
            frame_rate: 30.0,
        }
    }
}
