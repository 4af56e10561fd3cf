//! # hand_pointer
//!
//! Hand-gesture pointer controller with a diagnostic overlay window.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Move the index fingertip inside the safe box | Move the pointer across the whole screen |
//! | Pinch thumb and index together | One click per pinch (cooldown 0.45 s) |
//! | Open hand (all five fingers up) | Volume mode on |
//! | Closed fist | Volume mode off |
//! | Thumb–index spread while in volume mode | System volume 0–100 % |
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: the mouse and keyboard drive a virtual hand.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC.
//! * `desktop`: move and click the system pointer.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse over the camera view | Index fingertip position |
//! | `P` (hold) | Pinch |
//! | `O` (hold) | Open hand |
//! | `C` (hold) | Closed fist |
//! | `[` / `]` | Narrow / widen the open-hand spread |
//! | `H` (hold) | Hide the hand |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod config;
pub mod logging;
pub mod source;
pub mod visualizer;
