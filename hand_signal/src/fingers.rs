//! Finger extension classifier.
//!
//! Each finger is judged from two landmarks: its tip and a reference joint
//! closer to the palm.  The four long fingers point "up" when extended, so a
//! y comparison suffices.  The thumb extends sideways and needs an x
//! comparison whose sign depends on which way the thumb points.
//!
//! # Thumb rule
//!
//! The outward direction is re-derived every frame from the wrist→thumb-tip
//! polarity.  Only when that polarity is too small to trust (the tip sits
//! almost directly above the wrist) does the handedness label decide:
//! [`RightHandThumbRule`] points +x and [`LeftHandThumbRule`] points −x, the
//! convention for a mirrored (selfie) frame.  The thumb is extended when its
//! tip lies further out than its IP joint.
//!
//! Because the label only breaks ties, a detector that flips handedness from
//! one frame to the next cannot flip the thumb state of an unambiguous pose.

use serde::{Deserialize, Serialize};

use crate::landmark::{idx, HandObservation, Handedness, Landmark};

// ════════════════════════════════════════════════════════════════════════════
// Fingers
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb  => "Thumb",
            Finger::Index  => "Index",
            Finger::Middle => "Middle",
            Finger::Ring   => "Ring",
            Finger::Pinky  => "Pinky",
        }
    }
}

/// `(tip, reference)` landmark index pair for one finger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkPair {
    pub tip:       usize,
    pub reference: usize,
}

/// Pairs in thumb..pinky order: thumb tip vs IP, fingertips vs PIP.
pub const DEFAULT_PAIRS: [LandmarkPair; 5] = [
    LandmarkPair { tip: idx::THUMB_TIP,  reference: idx::THUMB_IP   },
    LandmarkPair { tip: idx::INDEX_TIP,  reference: idx::INDEX_PIP  },
    LandmarkPair { tip: idx::MIDDLE_TIP, reference: idx::MIDDLE_PIP },
    LandmarkPair { tip: idx::RING_TIP,   reference: idx::RING_PIP   },
    LandmarkPair { tip: idx::PINKY_TIP,  reference: idx::PINKY_PIP  },
];

// ════════════════════════════════════════════════════════════════════════════
// Thumb strategies
// ════════════════════════════════════════════════════════════════════════════

/// Handedness-specific thumb extension rule.
pub trait ThumbRule {
    /// Outward x direction (+1 or −1) used when the wrist polarity is
    /// inconclusive.
    fn nominal_outward(&self) -> f64;

    fn name(&self) -> &'static str;

    fn is_extended(&self, wrist: Landmark, reference: Landmark, tip: Landmark, epsilon: f64) -> bool {
        let polarity = tip.x - wrist.x;
        let outward = if polarity.abs() >= epsilon {
            polarity.signum()
        } else {
            self.nominal_outward()
        };
        (tip.x - reference.x) * outward > 0.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LeftHandThumbRule;

#[derive(Clone, Copy, Debug, Default)]
pub struct RightHandThumbRule;

impl ThumbRule for LeftHandThumbRule {
    fn nominal_outward(&self) -> f64 { -1.0 }
    fn name(&self) -> &'static str { "left-hand" }
}

impl ThumbRule for RightHandThumbRule {
    fn nominal_outward(&self) -> f64 { 1.0 }
    fn name(&self) -> &'static str { "right-hand" }
}

/// Resolve the thumb strategy once per observation.
pub fn thumb_rule_for(handedness: Handedness) -> &'static dyn ThumbRule {
    match handedness {
        Handedness::Left  => &LeftHandThumbRule,
        Handedness::Right => &RightHandThumbRule,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerStates
// ════════════════════════════════════════════════════════════════════════════

/// Extended/curled state of all five fingers, thumb first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&up| up).count()
    }

    /// Every finger extended.
    pub fn is_open(&self) -> bool {
        self.0.iter().all(|&up| up)
    }

    /// Every finger curled.  A partial pose is neither open nor closed.
    pub fn is_closed(&self) -> bool {
        self.0.iter().all(|&up| !up)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct FingerClassifier {
    pairs:   [LandmarkPair; 5],
    epsilon: f64,
}

impl FingerClassifier {
    /// `epsilon` is the smallest wrist→tip x offset trusted as a polarity.
    pub fn new(pairs: [LandmarkPair; 5], epsilon: f64) -> Self {
        FingerClassifier { pairs, epsilon }
    }

    pub fn classify(&self, hand: &HandObservation) -> FingerStates {
        let rule = thumb_rule_for(hand.handedness);
        let mut states = [false; 5];

        let thumb = self.pairs[0];
        states[0] = rule.is_extended(
            hand.point(idx::WRIST),
            hand.point(thumb.reference),
            hand.point(thumb.tip),
            self.epsilon,
        );

        for (slot, pair) in states.iter_mut().zip(self.pairs.iter()).skip(1) {
            *slot = hand.point(pair.tip).y < hand.point(pair.reference).y;
        }

        FingerStates(states)
    }
}

impl Default for FingerClassifier {
    fn default() -> Self {
        FingerClassifier::new(DEFAULT_PAIRS, 0.01)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
