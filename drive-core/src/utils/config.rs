//! Drivetrain calibration.
//!
//! Output intercepts are measured in volts (the voltage at which each side
//! starts to move) and converted to fractional motor output against
//! `nominal_voltage`. Every field has a default, so a JSON document only needs
//! the values it wants to override:
//!
//! ```rust
//! use drive_core::utils::DriveConfig;
//! let cfg = DriveConfig::from_json(br#"{ "joystick_deadband": 0.1 }"#).unwrap();
//! assert_eq!(cfg.sensitivity_power, 2.0);
//! ```

use serde::{Deserialize, Serialize};

use super::controllers::GearState;

/// Errors raised while loading or validating a [`DriveConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    DeadbandOutOfRange(f32),
    InvalidPower(f32),
    InvalidVoltage(f32),
    InterceptOutOfRange {
        gear: GearState,
        side: Side,
        volts: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Per-side intercepts for one gear, in volts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearIntercepts {
    pub left: f32,
    pub right: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Axis deadband applied to both sticks before mixing.
    pub joystick_deadband: f32,
    /// Power used for the sensitivity curve when throttle is present.
    pub sensitivity_power: f32,
    /// Battery voltage the intercepts are measured against.
    pub nominal_voltage: f32,
    pub high_gear: GearIntercepts,
    pub low_gear: GearIntercepts,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            joystick_deadband: 0.05,
            sensitivity_power: 2.0,
            nominal_voltage: 12.0,
            // Measured at 1.3677 V / 1.3309 V, currently zeroed.
            high_gear: GearIntercepts {
                left: 0.0,
                right: 0.0,
            },
            low_gear: GearIntercepts {
                left: 0.968,
                right: 1.058,
            },
        }
    }
}

impl DriveConfig {
    /// Parse a JSON document and validate the result.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every constant keeps the shaping functions well defined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let deadband = self.joystick_deadband;
        if !(deadband.is_finite() && (0.0..1.0).contains(&deadband)) {
            return Err(ConfigError::DeadbandOutOfRange(deadband));
        }
        if !(self.sensitivity_power.is_finite() && self.sensitivity_power > 0.0) {
            return Err(ConfigError::InvalidPower(self.sensitivity_power));
        }
        if !(self.nominal_voltage.is_finite() && self.nominal_voltage > 0.0) {
            return Err(ConfigError::InvalidVoltage(self.nominal_voltage));
        }

        for (gear, intercepts) in [
            (GearState::High, self.high_gear),
            (GearState::Low, self.low_gear),
        ] {
            for (side, volts) in [(Side::Left, intercepts.left), (Side::Right, intercepts.right)] {
                if !(volts.is_finite() && volts >= 0.0 && volts < self.nominal_voltage) {
                    return Err(ConfigError::InterceptOutOfRange { gear, side, volts });
                }
            }
        }
        Ok(())
    }

    /// Fractional `(left, right)` intercepts for `gear`, or `None` when the
    /// output should not be offset.
    pub fn intercepts(
        &self,
        gear: GearState,
    ) -> Option<(f32, f32)> {
        let volts = match gear {
            GearState::High => self.high_gear,
            GearState::Low => self.low_gear,
            GearState::Neutral => return None,
        };
        Some((
            volts.left / self.nominal_voltage,
            volts.right / self.nominal_voltage,
        ))
    }
}
