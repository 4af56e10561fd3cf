//! # hand_actuate
//!
//! Implementations of the [`hand_signal::driver`] actuator traits.
//!
//! | Actuator | Backend | Module |
//! |---|---|---|
//! | Volume | MIDI channel volume (CC 7) via `midir` | [`midi`] |
//! | Volume | macOS `osascript` | [`osascript`] |
//! | Volume / pointer | `tracing` log only | [`echo`] |
//! | Pointer | system mouse via `enigo` (feature `desktop`) | `desktop` |
//!
//! [`backend`] picks one from a configuration string and falls back to the
//! logging actuator when the requested device cannot be opened.
//!
//! ## Feature flags
//!
//! * (default): no system pointer control; the application shows the
//!   cursor in its own window.
//! * `desktop`: move and click the real pointer through `enigo`.

pub mod backend;
pub mod echo;
pub mod midi;
pub mod osascript;

#[cfg(feature = "desktop")]
pub mod desktop;

pub use backend::{open_volume, PointerBackend, UnknownBackend, VolumeBackend};
