//! Per-frame landmark snapshot.
//!
//! A [`HandObservation`] is produced fresh every frame by the external
//! detector and is only ever read by the pipeline.  A frame without a hand
//! is represented as `None`, never as a zeroed observation.

use serde::{Deserialize, Serialize};

/// Number of landmarks in one hand.
pub const LANDMARK_COUNT: usize = 21;

/// Anatomical landmark indices.
pub mod idx {
    pub const WRIST:      usize = 0;
    pub const THUMB_CMC:  usize = 1;
    pub const THUMB_MCP:  usize = 2;
    pub const THUMB_IP:   usize = 3;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_MCP:  usize = 5;
    pub const INDEX_PIP:  usize = 6;
    pub const INDEX_DIP:  usize = 7;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP:   usize = 13;
    pub const RING_PIP:   usize = 14;
    pub const RING_DIP:   usize = 15;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_MCP:  usize = 17;
    pub const PINKY_PIP:  usize = 18;
    pub const PINKY_DIP:  usize = 19;
    pub const PINKY_TIP:  usize = 20;
}

/// Bones of the hand skeleton as landmark index pairs, used for drawing.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
    (0, 17),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One keypoint in normalized image coordinates.
///
/// `x` and `y` are in `[0, 1]` for points inside the frame (the detector may
/// report slightly outside values); `z` is relative depth with no fixed range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Landmark { x, y, z }
    }

    pub const fn flat(x: f64, y: f64) -> Self {
        Landmark { x, y, z: 0.0 }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

/// Handedness label as reported by the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn opposite(self) -> Self {
        match self {
            Handedness::Left  => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Handedness::Left  => "Left",
            Handedness::Right => "Right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// A detected hand: handedness plus exactly [`LANDMARK_COUNT`] landmarks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub handedness: Handedness,
    pub landmarks:  [Landmark; LANDMARK_COUNT],
}

impl HandObservation {
    pub fn new(handedness: Handedness, landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        HandObservation { handedness, landmarks }
    }

    /// Build from a slice; `None` unless it holds exactly 21 points.
    pub fn from_slice(handedness: Handedness, points: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(HandObservation { handedness, landmarks })
    }

    /// False if any coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.landmarks.iter().all(Landmark::is_finite)
    }

    #[inline]
    pub fn point(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    /// The same hand seen in a horizontally flipped frame.
    ///
    /// Detectors label handedness from the image they are given, so the
    /// label flips along with the x axis.
    pub fn mirrored(&self) -> Self {
        let mut landmarks = self.landmarks;
        for lm in landmarks.iter_mut() {
            lm.x = 1.0 - lm.x;
        }
        HandObservation {
            handedness: self.handedness.opposite(),
            landmarks,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
