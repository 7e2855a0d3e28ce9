//! H.264 encoder wrapper using openh264

use openh264::encoder::{
    BitRate, Encoder, EncoderConfig, FrameRate, FrameType, RateControlMode, UsageType,
};
use openh264::formats::YUVBuffer;
use openh264::OpenH264API;

use super::config::{EncoderPreset, EncoderSettings};
use crate::color::unpack;
use crate::errors::{RecorderError, Result};

/// H.264 encoder for square packed-pixel frames
pub struct H264Encoder {
    encoder: Encoder,
    side: u32,
    frame_count: u64,
    last_frame_was_keyframe: bool,
}

impl H264Encoder {
    /// Create an encoder producing `side x side` frames with fixed rate control
    pub fn new(settings: &EncoderSettings) -> Result<Self> {
        settings.validate()?;

        let usage = match settings.preset {
            EncoderPreset::Realtime => UsageType::CameraVideoRealTime,
            EncoderPreset::Quality => UsageType::CameraVideoNonRealTime,
        };

        let config = EncoderConfig::new()
            .bitrate(BitRate::from_bps(settings.bitrate))
            .max_frame_rate(FrameRate::from_hz(settings.fps as f32))
            .rate_control_mode(RateControlMode::Bitrate)
            .usage_type(usage);

        let encoder = Encoder::with_api_config(OpenH264API::from_source(), config)
            .map_err(|e| RecorderError::Encoding(format!("Failed to create encoder: {}", e)))?;

        Ok(Self {
            encoder,
            side: settings.output_side,
            frame_count: 0,
            last_frame_was_keyframe: false,
        })
    }

    /// Encode one packed-pixel frame. Returns Annex B NAL units.
    pub fn encode_bgr(&mut self, pixels: &[u32]) -> Result<EncodedFrame> {
        let expected = self.side as usize * self.side as usize;
        if pixels.len() != expected {
            return Err(RecorderError::Encoding(format!(
                "Invalid frame size: expected {} pixels, got {}",
                expected,
                pixels.len()
            )));
        }

        let yuv = bgr_to_i420(pixels, self.side, self.side);
        self.encode_yuv(yuv)
    }

    fn encode_yuv(&mut self, yuv: Vec<u8>) -> Result<EncodedFrame> {
        let yuv_buffer = YUVBuffer::from_vec(yuv, self.side as usize, self.side as usize);

        let bitstream = self
            .encoder
            .encode(&yuv_buffer)
            .map_err(|e| RecorderError::Encoding(format!("Encoding failed: {}", e)))?;

        self.frame_count += 1;

        let is_keyframe = matches!(bitstream.frame_type(), FrameType::IDR | FrameType::I);
        self.last_frame_was_keyframe = is_keyframe;

        Ok(EncodedFrame {
            data: bitstream.to_vec(),
            is_keyframe,
        })
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn last_was_keyframe(&self) -> bool {
        self.last_frame_was_keyframe
    }

    /// Force the next frame to be a keyframe
    pub fn force_keyframe(&mut self) {
        self.encoder.force_intra_frame();
    }
}

/// Result of encoding a single frame
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// Encoded H.264 data in Annex B format (with start codes)
    pub data: Vec<u8>,
    /// Whether this frame is a keyframe (IDR/I frame)
    pub is_keyframe: bool,
}

/// Convert packed pixels to planar I420 (BT.601, limited range)
pub(crate) fn bgr_to_i420(pixels: &[u32], width: u32, height: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;

    let y_size = w * h;
    let uv_size = (w / 2) * (h / 2);
    let mut yuv = vec![0u8; y_size + uv_size * 2];

    let (y_plane, uv_planes) = yuv.split_at_mut(y_size);
    let (u_plane, v_plane) = uv_planes.split_at_mut(uv_size);

    for y in 0..h {
        for x in 0..w {
            let (r, g, b) = unpack(pixels[y * w + x]);
            let (r, g, b) = (r as i32, g as i32, b as i32);

            let y_val = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
            y_plane[y * w + x] = y_val.clamp(0, 255) as u8;

            // Subsample U and V (2x2 blocks)
            if y % 2 == 0 && x % 2 == 0 && x / 2 < w / 2 && y / 2 < h / 2 {
                let uv_idx = (y / 2) * (w / 2) + (x / 2);
                let u_val = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
                let v_val = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
                u_plane[uv_idx] = u_val.clamp(0, 255) as u8;
                v_plane[uv_idx] = v_val.clamp(0, 255) as u8;
            }
        }
    }

    yuv
}
