//! Distance and normalization helpers shared by every classifier.

use crate::landmark::Landmark;

/// Euclidean distance in the image plane (normalized units).
#[inline]
pub fn planar_distance(a: Landmark, b: Landmark) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Euclidean distance including relative depth.
#[inline]
pub fn spatial_distance(a: Landmark, b: Landmark) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Planar distance measured in pixels of a `frame_w × frame_h` image.
///
/// Normalized coordinates are anisotropic on non-square frames, so each axis
/// is scaled before taking the norm.
#[inline]
pub fn pixel_distance(a: Landmark, b: Landmark, frame_w: f64, frame_h: f64) -> f64 {
    ((a.x - b.x) * frame_w).hypot((a.y - b.y) * frame_h)
}

/// Fraction of the way `v` lies from `lo` to `hi`, clamped to `[0, 1]`.
///
/// Callers guarantee `hi > lo`; that ordering is validated once at startup.
#[inline]
pub fn unit_fraction(v: f64, lo: f64, hi: f64) -> f64 {
    ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 5.0);
        let b = Landmark::new(0.3, 0.4, -5.0);
        assert!((planar_distance(a, b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn spatial_includes_depth() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.0, 0.3, 0.4);
        assert!((spatial_distance(a, b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn pixel_distance_scales_axes_independently() {
        let a = Landmark::flat(0.0, 0.0);
        let b = Landmark::flat(0.1, 0.1);
        // 64 px across, 48 px down
        assert!((pixel_distance(a, b, 640.0, 480.0) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn unit_fraction_clamps_both_ends() {
        assert_eq!(unit_fraction(0.0, 0.02, 0.18), 0.0);
        assert_eq!(unit_fraction(0.5, 0.02, 0.18), 1.0);
        assert!((unit_fraction(0.10, 0.02, 0.18) - 0.5).abs() < 1e-12);
    }
}
