//! Error taxonomy.
//!
//! | Kind | Type | Effect on the loop |
//! |---|---|---|
//! | Configuration | [`ConfigError`] | refuse to start |
//! | Acquisition | [`SourceError`] | stop cleanly |
//! | Actuator call | [`ActuatorError`] | log and keep going |
//! | Trace file | [`TraceError`] | replay/record only |
//!
//! A frame with no hand is not an error and has no type here.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("roi margin {margin} leaves no safe box (must be in [0, 0.5))")]
    DegenerateRoi { margin: f64 },

    #[error("{name} = {value} must be in (0, 1]")]
    SmoothingAlpha { name: &'static str, value: f64 },

    #[error("volume distance range is empty: min {min} >= max {max}")]
    DistanceRange { min: f64, max: f64 },

    #[error("{name} = {value} must be a finite, non-negative number")]
    NonNegative { name: &'static str, value: f64 },

    #[error("pinch release {release} must not be below pinch threshold {threshold}")]
    PinchOrdering { threshold: f64, release: f64 },

    #[error("{name} extent {width}x{height} must be non-zero")]
    Extent { name: &'static str, width: u32, height: u32 },

    #[error("landmark index {index} is out of range (hand has 21 landmarks)")]
    LandmarkIndex { index: usize },

    #[error("volume dead-band {0} exceeds the 0–100 scale")]
    DeadBand(u8),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("frame source unavailable: {0}")]
    Unavailable(String),

    #[error("frame read failed: {0}")]
    Read(String),
}

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("actuator rejected command: {0}")]
    Rejected(String),

    #[error("failed to spawn actuator process: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("actuator process exited with status {0}")]
    Status(i32),

    #[error("actuator unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trace line {line}: {source}")]
    Parse {
        line:   usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("trace encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("acquisition failed: {0}")]
    Acquisition(#[from] SourceError),
}
