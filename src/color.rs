//! NV21 to packed 32-bit BGR conversion
//!
//! Fixed-point BT.601 (limited range). Every output pixel is laid out as
//! `0xFF000000 | b << 16 | g << 8 | r`, alpha always opaque.

use crate::errors::{RecorderError, Result};
use crate::types::nv21_len;

const OPAQUE: u32 = 0xFF00_0000;
const NEUTRAL_CHROMA: u8 = 128;

#[inline]
fn clamp8(value: i32) -> u32 {
    value.clamp(0, 255) as u32
}

/// Pack one pixel from its RGB components
#[inline]
pub fn pack(r: u8, g: u8, b: u8) -> u32 {
    OPAQUE | (b as u32) << 16 | (g as u32) << 8 | r as u32
}

/// Split a packed pixel back into `(r, g, b)`
#[inline]
pub fn unpack(pixel: u32) -> (u8, u8, u8) {
    (
        (pixel & 0xFF) as u8,
        ((pixel >> 8) & 0xFF) as u8,
        ((pixel >> 16) & 0xFF) as u8,
    )
}

/// Convert a single YUV sample triple to a packed pixel
#[inline]
pub fn yuv_to_pixel(y: u8, u: u8, v: u8) -> u32 {
    let y = (y as i32).max(16);
    let u = u as i32 - 128;
    let v = v as i32 - 128;

    let a0 = 1192 * (y - 16);
    let a1 = 1634 * v;
    let a2 = 832 * v;
    let a3 = 400 * u;
    let a4 = 2066 * u;

    let r = clamp8((a0 + a1) >> 10);
    let g = clamp8((a0 - a2 - a3) >> 10);
    let b = clamp8((a0 + a4) >> 10);

    OPAQUE | (b << 16) | (g << 8) | r
}

/// Convert an NV21 frame into `out`, which must hold at least `width * height` pixels.
///
/// Chroma for pixel `(i, j)` is read at row `i >> 1`, column `j & !1` of the
/// VU plane, V first.
pub fn nv21_to_bgr(nv21: &[u8], width: u32, height: u32, out: &mut [u32]) -> Result<()> {
    let w = width as usize;
    let h = height as usize;
    let frame_size = w * h;

    let required = nv21_len(width, height);
    if nv21.len() < required {
        return Err(RecorderError::InvalidFrame(format!(
            "NV21 buffer too short for {}x{}: expected {} bytes, got {}",
            width,
            height,
            required,
            nv21.len()
        )));
    }
    if out.len() < frame_size {
        return Err(RecorderError::InvalidFrame(format!(
            "BGR buffer too small for {}x{}: expected {} pixels, got {}",
            width,
            height,
            frame_size,
            out.len()
        )));
    }

    let (y_plane, vu_plane) = nv21.split_at(frame_size);

    for (i, row) in out[..frame_size].chunks_exact_mut(w).enumerate() {
        let luma = &y_plane[i * w..(i + 1) * w];
        let chroma_row = (i >> 1) * w;
        for (j, pixel) in row.iter_mut().enumerate() {
            let c = chroma_row + (j & !1);
            // Odd dimensions leave the last VU row or pair short; missing chroma is neutral
            let v = vu_plane.get(c).copied().unwrap_or(NEUTRAL_CHROMA);
            let u = vu_plane.get(c + 1).copied().unwrap_or(NEUTRAL_CHROMA);
            *pixel = yuv_to_pixel(luma[j], u, v);
        }
    }

    Ok(())
}

/// Allocating variant of [`nv21_to_bgr`]
pub fn nv21_to_bgr_vec(nv21: &[u8], width: u32, height: u32) -> Result<Vec<u32>> {
    let mut out = vec![0u32; width as usize * height as usize];
    nv21_to_bgr(nv21, width, height, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_nv21(width: u32, height: u32, y: u8, u: u8, v: u8) -> Vec<u8> {
        let frame_size = (width * height) as usize;
        let mut data = vec![y; frame_size];
        for _ in 0..frame_size / 4 {
            data.push(v);
            data.push(u);
        }
        data
    }

    #[test]
    fn test_mid_gray_is_neutral() {
        let nv21 = uniform_nv21(8, 4, 128, 128, 128);
        let bgr = nv21_to_bgr_vec(&nv21, 8, 4).unwrap();

        for px in bgr {
            assert_eq!(px >> 24, 0xFF, "alpha must be opaque");
            let (r, g, b) = unpack(px);
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "not gray: {r} {g} {b}");
            // 1192 * 112 >> 10 = 130
            assert_eq!(r, 130);
        }
    }

    #[test]
    fn test_black_and_white_levels() {
        assert_eq!(yuv_to_pixel(16, 128, 128), 0xFF00_0000);
        assert_eq!(yuv_to_pixel(0, 128, 128), 0xFF00_0000, "luma below 16 clamps to black");
        assert_eq!(yuv_to_pixel(235, 128, 128), pack(254, 254, 254));
        assert_eq!(yuv_to_pixel(255, 128, 128), pack(255, 255, 255));
    }

    #[test]
    fn test_chroma_order_is_v_then_u() {
        // Strong V (red-difference), neutral U: red must dominate blue
        let nv21 = uniform_nv21(2, 2, 128, 128, 240);
        let bgr = nv21_to_bgr_vec(&nv21, 2, 2).unwrap();
        let (r, _g, b) = unpack(bgr[0]);
        assert!(r > b, "expected red > blue, got r={r} b={b}");

        // Swap: strong U (blue-difference), neutral V
        let nv21 = uniform_nv21(2, 2, 128, 240, 128);
        let bgr = nv21_to_bgr_vec(&nv21, 2, 2).unwrap();
        let (r, _g, b) = unpack(bgr[0]);
        assert!(b > r, "expected blue > red, got r={r} b={b}");
    }

    #[test]
    fn test_chroma_shared_by_2x2_block() {
        // 4x2 frame: two chroma pairs in one row
        let mut nv21 = vec![128u8; 8];
        nv21.extend_from_slice(&[200, 60, 60, 200]);
        let bgr = nv21_to_bgr_vec(&nv21, 4, 2).unwrap();

        assert_eq!(bgr[0], bgr[1]);
        assert_eq!(bgr[0], bgr[4]);
        assert_eq!(bgr[0], bgr[5]);
        assert_eq!(bgr[2], bgr[7]);
        assert_ne!(bgr[0], bgr[2]);
    }

    #[test]
    fn test_deterministic() {
        let nv21: Vec<u8> = (0..(16 * 8 * 3 / 2)).map(|i| (i * 37 % 256) as u8).collect();
        let a = nv21_to_bgr_vec(&nv21, 16, 8).unwrap();
        let b = nv21_to_bgr_vec(&nv21, 16, 8).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_input_is_rejected() {
        let nv21 = vec![0u8; 16 * 8];
        let mut out = vec![0u32; 16 * 8];
        let err = nv21_to_bgr(&nv21, 16, 8, &mut out).unwrap_err();
        assert!(matches!(err, RecorderError::InvalidFrame(_)));
    }

    #[test]
    fn test_small_output_is_rejected() {
        let nv21 = uniform_nv21(4, 4, 100, 128, 128);
        let mut out = vec![0u32; 4];
        assert!(nv21_to_bgr(&nv21, 4, 4, &mut out).is_err());
    }

    #[test]
    fn test_odd_height_does_not_read_past_chroma() {
        // 4x3: the VU plane holds 6 bytes, but row 2 maps to chroma row 1
        let nv21 = vec![128u8; nv21_len(4, 3)];
        let bgr = nv21_to_bgr_vec(&nv21, 4, 3).unwrap();
        assert_eq!(bgr.len(), 12);
        assert!(bgr.iter().all(|&px| px == yuv_to_pixel(128, 128, 128)));
    }

    #[test]
    fn test_odd_dimensions_convert_without_panicking() {
        for (w, h) in [(3u32, 3u32), (5, 2), (1, 1), (7, 5)] {
            let nv21: Vec<u8> = (0..nv21_len(w, h)).map(|i| (i * 13 % 256) as u8).collect();
            let bgr = nv21_to_bgr_vec(&nv21, w, h).unwrap();
            assert_eq!(bgr.len(), (w * h) as usize);
        }
    }

    #[test]
    fn test_pack_unpack() {
        let px = pack(1, 2, 3);
        assert_eq!(px, 0xFF03_0201);
        assert_eq!(unpack(px), (1, 2, 3));
    }
}
