//! Shifter position from the double-solenoid's two sense lines.

use embedded_hal::digital::InputPin;

use super::{GearState, Shifter};

/// Reads the gear from a forward (high gear) and a reverse (low gear) input.
///
/// Exactly one line high selects that gear; neither or both means the valve is
/// off or in transit and is reported as [`GearState::Neutral`].
pub struct PinShifter<F, R> {
    forward: F,
    reverse: R,
}

impl<F, R> PinShifter<F, R>
where
    F: InputPin,
    R: InputPin,
{
    pub fn new(
        forward: F,
        reverse: R,
    ) -> Self {
        Self { forward, reverse }
    }

    /// Release the pins.
    pub fn release(self) -> (F, R) {
        (self.forward, self.reverse)
    }
}

impl<F, R> Shifter for PinShifter<F, R>
where
    F: InputPin,
    R: InputPin,
{
    fn gear(&mut self) -> GearState {
        let forward = self.forward.is_high();
        let reverse = self.reverse.is_high();
        match (forward, reverse) {
            (Ok(true), Ok(false)) => GearState::High,
            (Ok(false), Ok(true)) => GearState::Low,
            (Ok(_), Ok(_)) => GearState::Neutral,
            (Err(e), _) => {
                tracing::warn!("Shifter forward sense read failed: {:?}", e);
                GearState::Neutral
            }
            (_, Err(e)) => {
                tracing::warn!("Shifter reverse sense read failed: {:?}", e);
                GearState::Neutral
            }
        }
    }
}
