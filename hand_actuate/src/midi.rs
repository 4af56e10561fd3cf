//! Volume over MIDI: channel volume controller (CC 7).
//!
//! Useful with a softsynth, or with a MIDI-to-system-volume bridge on
//! platforms without `osascript`.

use hand_signal::driver::VolumeActuator;
use hand_signal::ActuatorError;
use tracing::{info, warn};

const CONTROL_CHANGE:   u8 = 0xB0;
const CHANNEL_VOLUME:   u8 = 7;

// ════════════════════════════════════════════════════════════════════════════
// MidiSink: abstraction over midir / test capture
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiSink: Send {
    fn send(&mut self, message: &[u8]) -> Result<(), ActuatorError>;
}

pub struct MidirSink {
    conn: midir::MidiOutputConnection,
}

impl MidiSink for MidirSink {
    fn send(&mut self, message: &[u8]) -> Result<(), ActuatorError> {
        self.conn
            .send(message)
            .map_err(|e| ActuatorError::Rejected(e.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output: enumerate ports and pick one
// ════════════════════════════════════════════════════════════════════════════

/// Open a MIDI output port, preferring a softsynth when one is visible.
pub fn open_midi_output(client_name: &str) -> Result<MidirSink, ActuatorError> {
    let midi_out = midir::MidiOutput::new(client_name)
        .map_err(|e| ActuatorError::Unavailable(format!("MIDI init: {e}")))?;

    let ports = midi_out.ports();
    if ports.is_empty() {
        return Err(ActuatorError::Unavailable("no MIDI output ports".into()));
    }

    let port_idx = ports
        .iter()
        .position(|p| {
            midi_out
                .port_name(p)
                .map(|n| is_softsynth(&n))
                .unwrap_or(false)
        })
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out
        .port_name(port)
        .unwrap_or_else(|_| "Unknown".to_string());
    info!(port = %name, "opening MIDI port");

    midi_out
        .connect(port, "hand-volume")
        .map(|conn| MidirSink { conn })
        .map_err(|e| ActuatorError::Unavailable(format!("MIDI connect: {e}")))
}

fn is_softsynth(port_name: &str) -> bool {
    let n = port_name.to_lowercase();
    ["fluid", "timidity", "microsoft", "gm", "synth"]
        .iter()
        .any(|s| n.contains(s))
}

// ════════════════════════════════════════════════════════════════════════════
// MidiVolume
// ════════════════════════════════════════════════════════════════════════════

/// Percent → 7-bit controller value.
pub fn cc_value(percent: u8) -> u8 {
    (u16::from(percent.min(100)) * 127 / 100) as u8
}

pub struct MidiVolume<S: MidiSink> {
    sink:    S,
    channel: u8,
}

impl<S: MidiSink> MidiVolume<S> {
    pub fn new(sink: S, channel: u8) -> Self {
        if channel > 15 {
            warn!(channel, "MIDI channel out of range, masking to 0-15");
        }
        MidiVolume { sink, channel: channel & 0x0F }
    }
}

impl<S: MidiSink> VolumeActuator for MidiVolume<S> {
    fn set_volume_percent(&mut self, percent: u8) -> Result<(), ActuatorError> {
        self.sink
            .send(&[CONTROL_CHANGE | self.channel, CHANNEL_VOLUME, cc_value(percent)])
    }
}
