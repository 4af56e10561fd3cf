//! The per-frame pipeline.
//!
//! [`Pipeline::process`] is a pure function of
//! `(FilterState, Option<HandObservation>, timestamp)`: it advances the state
//! in place and returns the frame's gesture events plus the actuator commands
//! to issue.  It performs no I/O.
//!
//! ```text
//!                      ┌─▶ ROI mapper ─▶ smoother ─────────▶ MoveTo
//! HandObservation ─────┼─▶ pinch distance ─▶ pinch latch ──▶ Click
//!                      ├─▶ finger classifier ─▶ mode latch
//!                      └─▶ thumb–index distance ─▶ conditioner ─▶ SetVolume
//! ```

use tracing::debug;

use crate::conditioner::{VolumeConditioner, VolumeState};
use crate::config::PipelineConfig;
use crate::error::ConfigError;
use crate::fingers::{FingerClassifier, FingerStates};
use crate::geometry::{pixel_distance, spatial_distance};
use crate::gesture::{GestureEvent, ModeDetector, PinchDetector, PinchPhase};
use crate::landmark::{idx, HandObservation};
use crate::latch::LatchState;
use crate::roi::RoiMapper;
use crate::smoothing::ExponentialSmoother;

// ════════════════════════════════════════════════════════════════════════════
// FilterState
// ════════════════════════════════════════════════════════════════════════════

/// Everything carried from one frame to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterState {
    pub cursor_x: f64,
    pub cursor_y: f64,
    pub volume:   VolumeState,
    /// Pinch latch; engaged while a pinch that already clicked is held.
    pub pinch:    LatchState,
    /// Open/closed volume mode latch.
    pub mode:     LatchState,
}

impl FilterState {
    /// Neutral start: cursor at screen centre, volume mid-scale, latches off.
    pub fn new(cfg: &PipelineConfig) -> Self {
        FilterState {
            cursor_x: cfg.screen_width as f64 / 2.0,
            cursor_y: cfg.screen_height as f64 / 2.0,
            volume:   VolumeState::default(),
            pinch:    LatchState::default(),
            mode:     LatchState::default(),
        }
    }

    pub fn pinch_active(&self) -> bool { self.pinch.engaged }
    pub fn mode_active(&self)  -> bool { self.mode.engaged }

    pub fn last_click_at(&self) -> Option<f64> { self.pinch.last_engaged_at }

    /// Record a volume change the actuator confirmed.
    pub fn confirm_volume(&mut self, percent: u8, now: f64) {
        VolumeConditioner::confirm(&mut self.volume, percent, now);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Output
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActuatorCommand {
    MoveTo { x: f64, y: f64 },
    Click,
    SetVolume(u8),
}

/// Measurements taken from the frame's hand, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Readings {
    pub pinch_px:     f64,
    pub pinch_phase:  PinchPhase,
    pub fingers:      FingerStates,
    /// Unsmoothed volume level implied by this frame, in `[0, 1]`.
    pub volume_level: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    pub pinch:    GestureEvent,
    pub mode:     GestureEvent,
    pub commands: Vec<ActuatorCommand>,
    /// `None` when the frame had no hand.
    pub readings: Option<Readings>,
}

impl FrameOutput {
    fn absent() -> Self {
        FrameOutput {
            pinch:    GestureEvent::NoEvent,
            mode:     GestureEvent::NoEvent,
            commands: Vec::new(),
            readings: None,
        }
    }

    /// The frame's single most important event: click, then mode change.
    pub fn event(&self) -> GestureEvent {
        if self.pinch.is_event() { self.pinch } else { self.mode }
    }

    pub fn events(&self) -> impl Iterator<Item = GestureEvent> + '_ {
        [self.pinch, self.mode].into_iter().filter(|e| e.is_event())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pipeline
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Pipeline {
    cfg:     PipelineConfig,
    roi:     RoiMapper,
    pointer: ExponentialSmoother,
    fingers: FingerClassifier,
    pinch:   PinchDetector,
    mode:    ModeDetector,
    volume:  VolumeConditioner,
}

impl Pipeline {
    /// Validate `cfg` and build every stage.
    pub fn new(cfg: PipelineConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let roi = RoiMapper::new(
            cfg.roi_margin,
            cfg.screen_width as f64,
            cfg.screen_height as f64,
        )?;
        let pointer = ExponentialSmoother::new("smoothing_alpha_pointer", cfg.smoothing_alpha_pointer)?;
        let volume_smoother = ExponentialSmoother::new("smoothing_alpha_volume", cfg.smoothing_alpha_volume)?;

        Ok(Pipeline {
            roi,
            pointer,
            fingers: FingerClassifier::new(cfg.open_closed_landmark_pairs, cfg.thumb_polarity_epsilon),
            pinch:   PinchDetector::new(cfg.pinch_threshold_px, cfg.pinch_release_px, cfg.click_cooldown_s),
            mode:    ModeDetector::default(),
            volume:  VolumeConditioner::new(
                cfg.volume_distance_min,
                cfg.volume_distance_max,
                volume_smoother,
                cfg.volume_rate_limit_s,
                cfg.volume_dead_band,
            ),
            cfg,
        })
    }

    pub fn config(&self) -> &PipelineConfig { &self.cfg }
    pub fn roi(&self) -> &RoiMapper { &self.roi }

    /// Run one frame.
    ///
    /// With no hand the state is left exactly as it was and nothing is
    /// issued.  A hand with any non-finite landmark counts as no hand.
    pub fn process(&self, state: &mut FilterState, hand: Option<&HandObservation>, now: f64) -> FrameOutput {
        let Some(hand) = hand else {
            return FrameOutput::absent();
        };
        if !hand.is_finite() {
            debug!(t = now, "discarding hand with non-finite landmarks");
            return FrameOutput::absent();
        }
        let mut commands = Vec::with_capacity(3);

        // ── pointer ───────────────────────────────────────────────────────
        let tip = hand.point(idx::INDEX_TIP);
        let (tx, ty) = self.roi.map(tip.x, tip.y);
        let w = self.cfg.screen_width as f64;
        let h = self.cfg.screen_height as f64;
        state.cursor_x = self.pointer.step(state.cursor_x, tx).clamp(0.0, w);
        state.cursor_y = self.pointer.step(state.cursor_y, ty).clamp(0.0, h);
        commands.push(ActuatorCommand::MoveTo { x: state.cursor_x, y: state.cursor_y });

        // ── pinch click ───────────────────────────────────────────────────
        let thumb = hand.point(idx::THUMB_TIP);
        let pinch_px = pixel_distance(
            thumb,
            tip,
            self.cfg.frame_width as f64,
            self.cfg.frame_height as f64,
        );
        let pinch = self.pinch.update(&mut state.pinch, pinch_px, now);
        if pinch == GestureEvent::ClickFired {
            commands.push(ActuatorCommand::Click);
        }

        // ── volume mode ───────────────────────────────────────────────────
        let fingers = self.fingers.classify(hand);
        let mode = self.mode.update(&mut state.mode, fingers, now);

        // ── volume level ──────────────────────────────────────────────────
        let spread = spatial_distance(thumb, tip);
        if !self.cfg.volume_requires_mode || state.mode.engaged {
            if let Some(percent) = self.volume.update(&mut state.volume, spread, now) {
                commands.push(ActuatorCommand::SetVolume(percent));
            }
        }

        FrameOutput {
            pinch,
            mode,
            commands,
            readings: Some(Readings {
                pinch_px,
                pinch_phase: PinchDetector::phase(&state.pinch),
                fingers,
                volume_level: self.volume.level(spread),
            }),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
