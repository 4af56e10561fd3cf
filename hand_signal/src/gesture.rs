//! Gesture event state machines: pinch-click and open/closed volume mode.
//!
//! The two machines are orthogonal and share the frame loop.  Each is a thin
//! wrapper around a [`HysteresisLatch`] that names its transitions.

use tracing::debug;

use crate::fingers::FingerStates;
use crate::latch::{HysteresisLatch, LatchState, Transition};

/// Discrete output of the gesture machines for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEvent {
    ClickFired,
    ModeEntered,
    ModeExited,
    NoEvent,
}

impl GestureEvent {
    pub fn is_event(self) -> bool {
        self != GestureEvent::NoEvent
    }

    pub fn label(self) -> &'static str {
        match self {
            GestureEvent::ClickFired  => "CLICK",
            GestureEvent::ModeEntered => "VOLUME ON",
            GestureEvent::ModeExited  => "VOLUME OFF",
            GestureEvent::NoEvent     => "",
        }
    }
}

/// Phase of the pinch machine after a frame, for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinchPhase {
    Idle,
    Pinching,
}

// ════════════════════════════════════════════════════════════════════════════
// PinchDetector
// ════════════════════════════════════════════════════════════════════════════

/// Fires [`GestureEvent::ClickFired`] on the frame a pinch starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchDetector {
    threshold: f64,
    release:   f64,
    latch:     HysteresisLatch,
}

impl PinchDetector {
    /// `release ≥ threshold`; equal values give a single-threshold machine.
    pub fn new(threshold: f64, release: f64, cooldown_s: f64) -> Self {
        PinchDetector {
            threshold,
            release,
            latch: HysteresisLatch::new(cooldown_s),
        }
    }

    pub fn update(&self, state: &mut LatchState, distance: f64, now: f64) -> GestureEvent {
        let engage  = distance < self.threshold;
        let release = distance >= self.release;
        match self.latch.update(state, engage, release, now) {
            Transition::Engaged => {
                debug!(distance, now, "pinch engaged, click fired");
                GestureEvent::ClickFired
            }
            Transition::Released => {
                debug!(distance, now, "pinch released");
                GestureEvent::NoEvent
            }
            Transition::Hold => GestureEvent::NoEvent,
        }
    }

    pub fn phase(state: &LatchState) -> PinchPhase {
        if state.engaged { PinchPhase::Pinching } else { PinchPhase::Idle }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ModeDetector
// ════════════════════════════════════════════════════════════════════════════

/// Open hand turns the mode on, closed fist turns it off, anything in
/// between keeps the current mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeDetector {
    latch: HysteresisLatch,
}

impl Default for ModeDetector {
    fn default() -> Self {
        ModeDetector { latch: HysteresisLatch::without_cooldown() }
    }
}

impl ModeDetector {
    pub fn update(&self, state: &mut LatchState, fingers: FingerStates, now: f64) -> GestureEvent {
        match self.latch.update(state, fingers.is_open(), fingers.is_closed(), now) {
            Transition::Engaged => {
                debug!(now, "open hand, mode entered");
                GestureEvent::ModeEntered
            }
            Transition::Released => {
                debug!(now, "closed fist, mode exited");
                GestureEvent::ModeExited
            }
            Transition::Hold => GestureEvent::NoEvent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_pinch(distances: &[f64], spacing: f64, cooldown: f64) -> Vec<(GestureEvent, PinchPhase)> {
        let det = PinchDetector::new(35.0, 35.0, cooldown);
        let mut s = LatchState::default();
        distances
            .iter()
            .enumerate()
            .map(|(k, &d)| {
                let ev = det.update(&mut s, d, 10.0 + k as f64 * spacing);
                (ev, PinchDetector::phase(&s))
            })
            .collect()
    }

    #[test]
    fn reference_scenario() {
        use GestureEvent::*;
        use PinchPhase::*;
        let out = run_pinch(&[50.0, 30.0, 20.0, 40.0, 20.0], 0.05, 0.45);
        assert_eq!(out, vec![
            (NoEvent,    Idle),
            (ClickFired, Pinching),
            (NoEvent,    Pinching),
            (NoEvent,    Idle),
            (NoEvent,    Idle),
        ]);
    }

    #[test]
    fn held_pinch_fires_exactly_once() {
        let mut d = vec![50.0];
        d.extend(std::iter::repeat(10.0).take(40));
        let clicks = run_pinch(&d, 0.05, 0.45)
            .into_iter()
            .filter(|(e, _)| *e == GestureEvent::ClickFired)
            .count();
        assert_eq!(clicks, 1);
    }

    #[test]
    fn dips_inside_cooldown_click_once_outside_twice() {
        let count = |gap_frames: usize| {
            let mut d = vec![50.0, 20.0];
            d.extend(std::iter::repeat(50.0).take(gap_frames));
            d.push(20.0);
            d.push(50.0);
            run_pinch(&d, 0.05, 0.45)
                .into_iter()
                .filter(|(e, _)| *e == GestureEvent::ClickFired)
                .count()
        };
        // second dip 0.25 s after the first
        assert_eq!(count(4), 1);
        // second dip 0.55 s after the first
        assert_eq!(count(11), 2);
    }

    #[test]
    fn release_band_adds_hysteresis() {
        let det = PinchDetector::new(30.0, 40.0, 0.0);
        let mut s = LatchState::default();
        assert_eq!(det.update(&mut s, 25.0, 0.0), GestureEvent::ClickFired);
        // between the thresholds: still pinching
        det.update(&mut s, 35.0, 0.1);
        assert_eq!(PinchDetector::phase(&s), PinchPhase::Pinching);
        det.update(&mut s, 41.0, 0.2);
        assert_eq!(PinchDetector::phase(&s), PinchPhase::Idle);
    }

    #[test]
    fn mode_open_partial_open_never_exits() {
        let det = ModeDetector::default();
        let mut s = LatchState::default();
        let open    = FingerStates([true; 5]);
        let partial = FingerStates([false, true, true, false, false]);
        assert_eq!(det.update(&mut s, open, 0.0), GestureEvent::ModeEntered);
        assert_eq!(det.update(&mut s, partial, 0.1), GestureEvent::NoEvent);
        assert_eq!(det.update(&mut s, open, 0.2), GestureEvent::NoEvent);
        assert!(s.engaged);
    }

    #[test]
    fn mode_open_then_closed_exits_immediately() {
        let det = ModeDetector::default();
        let mut s = LatchState::default();
        det.update(&mut s, FingerStates([true; 5]), 0.0);
        assert_eq!(det.update(&mut s, FingerStates([false; 5]), 0.033), GestureEvent::ModeExited);
        assert!(!s.engaged);
    }

    #[test]
    fn closed_fist_when_already_off_is_silent() {
        let det = ModeDetector::default();
        let mut s = LatchState::default();
        assert_eq!(det.update(&mut s, FingerStates([false; 5]), 0.0), GestureEvent::NoEvent);
    }
}
