//! Backend selection from configuration strings.

use std::fmt;
use std::str::FromStr;

use hand_signal::driver::VolumeActuator;
use thiserror::Error;
use tracing::{info, warn};

use crate::echo::EchoVolume;
use crate::midi::{open_midi_output, MidiVolume};
use crate::osascript::OsascriptVolume;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} backend '{value}' (expected one of: {expected})")]
pub struct UnknownBackend {
    pub kind:     &'static str,
    pub value:    String,
    pub expected: &'static str,
}

// ════════════════════════════════════════════════════════════════════════════
// Volume
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeBackend {
    /// CC 7 on the given MIDI channel.
    Midi { channel: u8 },
    Osascript,
    Log,
}

impl FromStr for VolumeBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "midi"      => Ok(VolumeBackend::Midi { channel: 0 }),
            "osascript" => Ok(VolumeBackend::Osascript),
            "log"       => Ok(VolumeBackend::Log),
            _ => Err(UnknownBackend {
                kind:     "volume",
                value:    s.to_string(),
                expected: "midi, osascript, log",
            }),
        }
    }
}

impl fmt::Display for VolumeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeBackend::Midi { channel } => write!(f, "midi (channel {})", u16::from(*channel) + 1),
            VolumeBackend::Osascript        => write!(f, "osascript"),
            VolumeBackend::Log              => write!(f, "log"),
        }
    }
}

/// Open the requested volume actuator, or the logging one if the device
/// cannot be opened.
pub fn open_volume(backend: VolumeBackend) -> Box<dyn VolumeActuator> {
    match backend {
        VolumeBackend::Midi { channel } => match open_midi_output("hand_pointer_volume") {
            Ok(sink) => Box::new(MidiVolume::new(sink, channel)),
            Err(e) => {
                warn!(error = %e, "MIDI volume unavailable, logging volume changes instead");
                Box::new(EchoVolume::default())
            }
        },
        VolumeBackend::Osascript => {
            if !cfg!(target_os = "macos") {
                warn!("osascript volume requested on a non-macOS system; calls will likely fail");
            }
            Box::new(OsascriptVolume::default())
        }
        VolumeBackend::Log => {
            info!("volume changes are logged only");
            Box::new(EchoVolume::default())
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pointer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerBackend {
    /// Cursor drawn in the application window only.
    Sim,
    /// The system pointer (requires the `desktop` feature).
    Desktop,
}

impl FromStr for PointerBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sim"     => Ok(PointerBackend::Sim),
            "desktop" => Ok(PointerBackend::Desktop),
            _ => Err(UnknownBackend {
                kind:     "pointer",
                value:    s.to_string(),
                expected: "sim, desktop",
            }),
        }
    }
}

impl fmt::Display for PointerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PointerBackend::Sim     => "sim",
            PointerBackend::Desktop => "desktop",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_volume_backends() {
        assert_eq!("midi".parse::<VolumeBackend>(), Ok(VolumeBackend::Midi { channel: 0 }));
        assert_eq!(" OsaScript ".parse::<VolumeBackend>(), Ok(VolumeBackend::Osascript));
        assert_eq!("log".parse::<VolumeBackend>(), Ok(VolumeBackend::Log));
        let err = "alsa".parse::<VolumeBackend>().unwrap_err();
        assert_eq!(err.value, "alsa");
        assert!(err.to_string().contains("midi, osascript, log"));
    }

    #[test]
    fn parses_pointer_backends() {
        assert_eq!("desktop".parse::<PointerBackend>(), Ok(PointerBackend::Desktop));
        assert_eq!("SIM".parse::<PointerBackend>(), Ok(PointerBackend::Sim));
        assert!("wayland".parse::<PointerBackend>().is_err());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(VolumeBackend::Midi { channel: 0 }.to_string(), "midi (channel 1)");
        assert_eq!(PointerBackend::Desktop.to_string(), "desktop");
    }

    #[test]
    fn log_backend_always_opens() {
        let mut v = open_volume(VolumeBackend::Log);
        assert!(v.set_volume_percent(55).is_ok());
    }
}
