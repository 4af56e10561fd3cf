//! # hand_signal
//!
//! Signal-processing core for a hand-gesture pointer controller.  Each frame
//! an external tracker delivers (or fails to deliver) 21 normalized hand
//! landmarks; this crate turns that stream into
//!
//! * a jitter-free pointer trajectory,
//! * debounced discrete gesture events (click, volume mode on/off),
//! * a smoothed, rate-limited continuous volume value.
//!
//! Nothing here touches a camera, a window or the operating system.  Those
//! collaborators are described by the traits in [`driver`] and implemented
//! by the sibling crates.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |---|---|---|
//! | Landmark frame | [`landmark`] | `Option<HandObservation>` |
//! | Geometry | [`geometry`] | distances |
//! | ROI mapping | [`roi`] | screen target |
//! | Smoothing | [`smoothing`] | pointer / volume state |
//! | Finger classifier | [`fingers`] | `FingerStates` |
//! | Gesture machines | [`latch`], [`gesture`] | `GestureEvent` |
//! | Volume conditioning | [`conditioner`] | `SetVolume` request |
//!
//! [`pipeline::Pipeline::process`] runs all stages for one frame against an
//! explicit [`pipeline::FilterState`].
//!
//! ## Quick start
//!
//! ```rust
//! use hand_signal::{Pipeline, PipelineConfig, FilterState};
//!
//! let cfg = PipelineConfig::default();
//! let pipeline = Pipeline::new(cfg).unwrap();
//! let mut state = FilterState::new(pipeline.config());
//!
//! // No hand this frame: nothing is issued, state is untouched.
//! let out = pipeline.process(&mut state, None, 0.0);
//! assert!(out.commands.is_empty());
//! ```

pub mod landmark;
pub mod geometry;
pub mod roi;
pub mod smoothing;
pub mod fingers;
pub mod latch;
pub mod gesture;
pub mod conditioner;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod driver;
pub mod trace;

pub use config::PipelineConfig;
pub use error::{ActuatorError, ConfigError, RunError, SourceError, TraceError};
pub use gesture::GestureEvent;
pub use landmark::{HandObservation, Handedness, Landmark};
pub use pipeline::{ActuatorCommand, FilterState, FrameOutput, Pipeline};
