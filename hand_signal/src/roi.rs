//! Region-of-interest ("safe box") mapping from frame to screen space.
//!
//! Only the interior `[m, 1−m]²` of the camera frame is mapped onto the
//! screen.  The hand can then reach every screen edge without leaving the
//! field of view, and the jittery border zone is clamped away.

use crate::error::ConfigError;

/// Pixel rectangle of the safe box inside a camera frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoiMapper {
    margin:   f64,
    screen_w: f64,
    screen_h: f64,
}

impl RoiMapper {
    /// Fails if the margin leaves a zero-width (or inverted) box.
    pub fn new(margin: f64, screen_w: f64, screen_h: f64) -> Result<Self, ConfigError> {
        if !(0.0..0.5).contains(&margin) {
            return Err(ConfigError::DegenerateRoi { margin });
        }
        Ok(RoiMapper { margin, screen_w, screen_h })
    }

    pub fn margin(&self) -> f64 { self.margin }

    /// Fraction of travel across the safe box, clamped to `[0, 1]` per axis.
    ///
    /// Measured from the box centre so the frame centre maps to exactly 0.5.
    pub fn normalize(&self, x: f64, y: f64) -> (f64, f64) {
        let span = 1.0 - 2.0 * self.margin;
        let nx = (0.5 + (x - 0.5) / span).clamp(0.0, 1.0);
        let ny = (0.5 + (y - 0.5) / span).clamp(0.0, 1.0);
        (nx, ny)
    }

    /// Map a normalized landmark position to screen coordinates.
    pub fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let (nx, ny) = self.normalize(x, y);
        (nx * self.screen_w, ny * self.screen_h)
    }

    /// The safe box in pixels of a `frame_w × frame_h` frame.
    pub fn safe_box_px(&self, frame_w: f64, frame_h: f64) -> PixelRect {
        PixelRect {
            x0: frame_w * self.margin,
            y0: frame_h * self.margin,
            x1: frame_w * (1.0 - self.margin),
            y1: frame_h * (1.0 - self.margin),
        }
    }
}
