//! Square crop, orientation correction and scaling of packed pixel rasters
//!
//! All functions write into caller-supplied buffers so the session can reuse
//! the same memory for every frame.

use crate::errors::{RecorderError, Result};
use crate::types::Orientation;

/// The largest centered square inside a `width x height` raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

impl CropRect {
    pub fn centered(width: u32, height: u32) -> Self {
        let side = width.min(height);
        Self {
            x: (width - side) / 2,
            y: (height - side) / 2,
            side,
        }
    }
}

fn check_len(name: &str, buf_len: usize, required: usize) -> Result<()> {
    if buf_len < required {
        return Err(RecorderError::InvalidFrame(format!(
            "{} buffer too small: expected {} pixels, got {}",
            name, required, buf_len
        )));
    }
    Ok(())
}

/// Copy the centered square of `src` into `dst`
pub fn crop_into(src: &[u32], width: u32, height: u32, dst: &mut [u32]) -> Result<CropRect> {
    let rect = CropRect::centered(width, height);
    let w = width as usize;
    let side = rect.side as usize;

    check_len("source", src.len(), w * height as usize)?;
    check_len("crop", dst.len(), side * side)?;

    for (row, out) in dst[..side * side].chunks_exact_mut(side).enumerate() {
        let start = (rect.y as usize + row) * w + rect.x as usize;
        out.copy_from_slice(&src[start..start + side]);
    }

    Ok(rect)
}

/// Swap rows and columns of a square raster
pub fn transpose_into(src: &[u32], side: u32, dst: &mut [u32]) -> Result<()> {
    let n = side as usize;
    check_len("source", src.len(), n * n)?;
    check_len("transpose", dst.len(), n * n)?;

    for row in 0..n {
        for col in 0..n {
            dst[col * n + row] = src[row * n + col];
        }
    }
    Ok(())
}

/// Mirror a square raster about its vertical axis, in place
pub fn flip_horizontal(buf: &mut [u32], side: u32) -> Result<()> {
    let n = side as usize;
    check_len("flip", buf.len(), n * n)?;

    for row in buf[..n * n].chunks_exact_mut(n) {
        row.reverse();
    }
    Ok(())
}

/// Crop `src` to a centered square and apply the orientation correction.
///
/// 90 and 270 transpose; 90 additionally mirrors. 0 and 180 leave the crop
/// untouched. Returns whichever of `square` / `transposed` holds the result.
pub fn transform<'a>(
    src: &[u32],
    width: u32,
    height: u32,
    square: &'a mut [u32],
    transposed: &'a mut [u32],
    orientation: Orientation,
) -> Result<&'a [u32]> {
    let rect = crop_into(src, width, height, square)?;
    let side = rect.side;
    let n = side as usize * side as usize;

    match orientation {
        Orientation::Deg90 => {
            transpose_into(square, side, transposed)?;
            flip_horizontal(transposed, side)?;
            Ok(&transposed[..n])
        }
        Orientation::Deg270 => {
            transpose_into(square, side, transposed)?;
            Ok(&transposed[..n])
        }
        // TODO: 180 should probably rotate for upside-down mounting; left as a no-op until verified on a device
        Orientation::Deg0 | Orientation::Deg180 => Ok(&square[..n]),
    }
}

/// Nearest-neighbour resample of a square raster to a different side length
pub fn scale_into(src: &[u32], src_side: u32, dst: &mut [u32], dst_side: u32) -> Result<()> {
    let s = src_side as usize;
    let d = dst_side as usize;
    check_len("source", src.len(), s * s)?;
    check_len("scale", dst.len(), d * d)?;

    if s == d {
        dst[..d * d].copy_from_slice(&src[..s * s]);
        return Ok(());
    }
    if s == 0 {
        return Err(RecorderError::InvalidFrame("cannot scale an empty raster".to_string()));
    }

    for (row, out) in dst[..d * d].chunks_exact_mut(d).enumerate() {
        let src_row = row * s / d;
        let line = &src[src_row * s..(src_row + 1) * s];
        for (col, pixel) in out.iter_mut().enumerate() {
            *pixel = line[col * s / d];
        }
    }
    Ok(())
}
