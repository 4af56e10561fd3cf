//! Actuators that only log.  Used as the fallback when no device opens, and
//! by the simulator, which draws its own cursor.

use hand_signal::driver::{PointerActuator, VolumeActuator};
use hand_signal::ActuatorError;
use tracing::info;

/// Remembers where the pointer was sent and how often it clicked.
#[derive(Debug, Default)]
pub struct EchoPointer {
    pub position: Option<(f64, f64)>,
    pub clicks:   u64,
}

impl PointerActuator for EchoPointer {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), ActuatorError> {
        self.position = Some((x, y));
        Ok(())
    }

    fn click(&mut self) -> Result<(), ActuatorError> {
        self.clicks += 1;
        info!(position = ?self.position, "click (not forwarded)");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EchoVolume {
    pub level: Option<u8>,
}

impl VolumeActuator for EchoVolume {
    fn set_volume_percent(&mut self, percent: u8) -> Result<(), ActuatorError> {
        self.level = Some(percent);
        info!(percent, "volume (not forwarded)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_tracks_last_position_and_clicks() {
        let mut p = EchoPointer::default();
        p.move_to(10.0, 20.0).unwrap();
        p.click().unwrap();
        p.move_to(11.0, 21.0).unwrap();
        assert_eq!(p.position, Some((11.0, 21.0)));
        assert_eq!(p.clicks, 1);
    }

    #[test]
    fn volume_tracks_last_level() {
        let mut v = EchoVolume::default();
        v.set_volume_percent(30).unwrap();
        v.set_volume_percent(70).unwrap();
        assert_eq!(v.level, Some(70));
    }
}
