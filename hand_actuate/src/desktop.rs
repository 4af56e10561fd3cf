//! The real system pointer, through `enigo`.

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use hand_signal::driver::PointerActuator;
use hand_signal::ActuatorError;

pub struct DesktopPointer {
    enigo: Enigo,
}

impl DesktopPointer {
    pub fn new() -> Result<Self, ActuatorError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| ActuatorError::Unavailable(format!("enigo init: {e:?}")))?;
        Ok(DesktopPointer { enigo })
    }
}

impl PointerActuator for DesktopPointer {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), ActuatorError> {
        self.enigo
            .move_mouse(x.round() as i32, y.round() as i32, Coordinate::Abs)
            .map_err(|e| ActuatorError::Rejected(format!("{e:?}")))
    }

    fn click(&mut self) -> Result<(), ActuatorError> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| ActuatorError::Rejected(format!("{e:?}")))
    }
}
