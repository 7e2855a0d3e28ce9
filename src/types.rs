//! Core frame and geometry types shared across the pipeline

use serde::{Deserialize, Serialize};

use crate::errors::{RecorderError, Result};

/// Number of bytes an NV21 buffer must hold for the given dimensions
/// (full Y plane followed by the interleaved, 2x2 subsampled VU plane).
pub fn nv21_len(width: u32, height: u32) -> usize {
    let frame_size = width as usize * height as usize;
    frame_size + frame_size / 2
}

/// A borrowed NV21 frame, valid for a single `feed` call
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
}

impl<'a> Frame<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Self {
        Self { data, width, height }
    }

    /// Check that the buffer is large enough for the advertised dimensions
    pub fn validate(&self) -> Result<()> {
        let required = nv21_len(self.width, self.height);
        if self.data.len() < required {
            return Err(RecorderError::InvalidFrame(format!(
                "NV21 buffer too short for {}x{}: expected at least {} bytes, got {}",
                self.width,
                self.height,
                required,
                self.data.len()
            )));
        }
        Ok(())
    }
}

/// An owned NV21 frame, used where a frame has to outlive the capture callback
#[derive(Debug, Clone)]
pub struct OwnedFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl OwnedFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self { data, width, height }
    }

    pub fn as_frame(&self) -> Frame<'_> {
        Frame::new(&self.data, self.width, self.height)
    }
}

/// Which way the camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraFacing {
    Front,
    Back,
}

/// Orientation correction applied to every frame of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    pub fn degrees(&self) -> u32 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }

    /// Whether rows and columns are swapped by the correction
    pub fn is_transposed(&self) -> bool {
        matches!(self, Orientation::Deg90 | Orientation::Deg270)
    }

    /// Resolve the correction from the sensor mounting angle, the current
    /// display rotation and the camera facing.
    ///
    /// Front cameras are mirrored, so the combined angle is negated. The
    /// flip applied at 90 degrees in `transform` depends on this convention.
    pub fn resolve(
        sensor_orientation: u32,
        display_rotation: u32,
        facing: CameraFacing,
    ) -> Result<Self> {
        let sensor = Self::try_from(sensor_orientation)?.degrees();
        let display = Self::try_from(display_rotation)?.degrees();

        let result = match facing {
            CameraFacing::Front => {
                let combined = (sensor + display) % 360;
                (360 - combined) % 360
            }
            CameraFacing::Back => (sensor + 360 - display) % 360,
        };

        Self::try_from(result)
    }
}

impl TryFrom<u32> for Orientation {
    type Error = RecorderError;

    fn try_from(degrees: u32) -> Result<Self> {
        match degrees {
            0 => Ok(Orientation::Deg0),
            90 => Ok(Orientation::Deg90),
            180 => Ok(Orientation::Deg180),
            270 => Ok(Orientation::Deg270),
            other => Err(RecorderError::InvalidGeometry(format!(
                "unsupported orientation: {} degrees",
                other
            ))),
        }
    }
}

/// Preview dimensions and orientation, fixed for a session's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
}

impl Geometry {
    pub fn new(width: u32, height: u32, orientation: Orientation) -> Self {
        Self {
            width,
            height,
            orientation,
        }
    }

    /// Side of the largest centered square inside the preview
    pub fn square_side(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Preview size as it appears on screen after rotation
    pub fn display_preview_size(&self) -> (u32, u32) {
        if self.orientation.is_transposed() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RecorderError::InvalidGeometry(format!(
                "preview dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        // NV21 chroma is 2x2 subsampled
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(RecorderError::InvalidGeometry(format!(
                "NV21 preview dimensions must be even, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nv21_len() {
        assert_eq!(nv21_len(640, 480), 640 * 480 * 3 / 2);
        assert_eq!(nv21_len(2, 2), 6);
    }

    #[test]
    fn test_frame_validate_rejects_short_buffer() {
        let data = vec![0u8; 10];
        let frame = Frame::new(&data, 4, 4);
        assert!(matches!(frame.validate(), Err(RecorderError::InvalidFrame(_))));

        let data = vec![0u8; nv21_len(4, 4)];
        assert!(Frame::new(&data, 4, 4).validate().is_ok());
    }

    #[test]
    fn test_orientation_try_from() {
        assert_eq!(Orientation::try_from(90).unwrap(), Orientation::Deg90);
        assert_eq!(Orientation::try_from(270).unwrap().degrees(), 270);
        assert!(Orientation::try_from(45).is_err());
        assert!(Orientation::try_from(360).is_err());
    }

    #[test]
    fn test_resolve_back_camera_portrait() {
        // Typical back sensor mounted at 90, device held upright
        let o = Orientation::resolve(90, 0, CameraFacing::Back).unwrap();
        assert_eq!(o, Orientation::Deg90);

        let o = Orientation::resolve(90, 90, CameraFacing::Back).unwrap();
        assert_eq!(o, Orientation::Deg0);

        let o = Orientation::resolve(90, 270, CameraFacing::Back).unwrap();
        assert_eq!(o, Orientation::Deg180);
    }

    #[test]
    fn test_resolve_front_camera_compensates_mirror() {
        // Typical front sensor mounted at 270, device held upright
        let o = Orientation::resolve(270, 0, CameraFacing::Front).unwrap();
        assert_eq!(o, Orientation::Deg90);

        let o = Orientation::resolve(270, 90, CameraFacing::Front).unwrap();
        assert_eq!(o, Orientation::Deg0);
    }

    #[test]
    fn test_geometry_square_side_and_display_size() {
        let g = Geometry::new(640, 480, Orientation::Deg90);
        assert_eq!(g.square_side(), 480);
        assert_eq!(g.display_preview_size(), (480, 640));

        let g = Geometry::new(640, 480, Orientation::Deg180);
        assert_eq!(g.display_preview_size(), (640, 480));
    }

    #[test]
    fn test_geometry_validate() {
        assert!(Geometry::new(640, 480, Orientation::Deg0).validate().is_ok());
        assert!(Geometry::new(0, 480, Orientation::Deg0).validate().is_err());
        assert!(Geometry::new(641, 480, Orientation::Deg0).validate().is_err());
    }
}
