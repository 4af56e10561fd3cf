//! System output volume through `osascript` (macOS).
//!
//! Each call spawns a short-lived process, which is why the volume channel
//! is rate-limited and dead-banded upstream.

use std::process::Command;

use hand_signal::driver::VolumeActuator;
use hand_signal::ActuatorError;
use tracing::debug;

pub struct OsascriptVolume {
    program: String,
}

impl Default for OsascriptVolume {
    fn default() -> Self {
        OsascriptVolume { program: "osascript".to_string() }
    }
}

impl OsascriptVolume {
    /// Use a different executable, e.g. a wrapper script.
    pub fn with_program(program: impl Into<String>) -> Self {
        OsascriptVolume { program: program.into() }
    }

    pub fn script(percent: u8) -> String {
        format!("set volume output volume {}", percent.min(100))
    }

    fn command(&self, percent: u8) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-e").arg(Self::script(percent));
        cmd
    }
}

impl VolumeActuator for OsascriptVolume {
    fn set_volume_percent(&mut self, percent: u8) -> Result<(), ActuatorError> {
        let status = self.command(percent).status()?;
        if !status.success() {
            return Err(ActuatorError::Status(status.code().unwrap_or(-1)));
        }
        debug!(percent, "system volume set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_text() {
        assert_eq!(OsascriptVolume::script(42), "set volume output volume 42");
        assert_eq!(OsascriptVolume::script(180), "set volume output volume 100");
    }

    #[test]
    fn command_line() {
        let cmd = OsascriptVolume::default().command(7);
        assert_eq!(cmd.get_program(), "osascript");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-e", "set volume output volume 7"]);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let mut vol = OsascriptVolume::with_program("/nonexistent/osascript-for-tests");
        assert!(matches!(vol.set_volume_percent(10), Err(ActuatorError::Spawn(_))));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_reported() {
        let mut ok = OsascriptVolume::with_program("true");
        assert!(ok.set_volume_percent(10).is_ok());
        let mut bad = OsascriptVolume::with_program("false");
        assert!(matches!(bad.set_volume_percent(10), Err(ActuatorError::Status(1))));
    }
}
