//! Edge-triggered latch with hysteresis and an engage cooldown.
//!
//! Both discrete gesture detectors are instances of this one primitive:
//!
//! | Detector | engage when | release when | cooldown |
//! |---|---|---|---|
//! | pinch click | `d < threshold` | `d ≥ release` | `click_cooldown_s` |
//! | volume mode | all fingers extended | all fingers curled | none |
//!
//! The latch reports a transition only on the frame the state changes.  A
//! condition that keeps holding produces [`Transition::Hold`] every frame
//! after the first, so a held pinch clicks once.

use serde::{Deserialize, Serialize};

/// Result of one latch update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Engaged,
    Released,
    Hold,
}

/// The persistent part of a latch, stored in `FilterState`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatchState {
    pub engaged:         bool,
    /// Time of the last engage, in seconds.
    pub last_engaged_at: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HysteresisLatch {
    cooldown_s: f64,
}

impl HysteresisLatch {
    pub fn new(cooldown_s: f64) -> Self {
        HysteresisLatch { cooldown_s }
    }

    pub fn without_cooldown() -> Self {
        HysteresisLatch { cooldown_s: 0.0 }
    }

    /// Whether the cooldown since the last engage has run out at `now`.
    pub fn cooled_down(&self, state: &LatchState, now: f64) -> bool {
        match state.last_engaged_at {
            Some(t) => self.cooldown_s <= 0.0 || now - t > self.cooldown_s,
            None    => true,
        }
    }

    /// Advance the latch by one frame.
    ///
    /// An engage request that arrives during the cooldown is ignored; the
    /// latch stays released and may engage on a later frame once the cooldown
    /// has passed and the condition still holds.
    pub fn update(&self, state: &mut LatchState, engage: bool, release: bool, now: f64) -> Transition {
        if state.engaged {
            if release {
                state.engaged = false;
                return Transition::Released;
            }
            return Transition::Hold;
        }

        if engage && self.cooled_down(state, now) {
            state.engaged = true;
            state.last_engaged_at = Some(now);
            return Transition::Engaged;
        }
        Transition::Hold
    }
}
