//! Curvature/quick-turn drive for a two-stick, two-speed drivetrain.
//!
//! `CurvatureDrive` turns raw throttle and turn axes plus the current gear into
//! a left/right command pair. The calibration lives in a [`DriveConfig`] that is
//! handed in at construction, so several drives with different tuning can
//! coexist.
//!
//! # Example
//! ```rust
//! use drive_core::utils::{CurvatureDrive, DriveConfig, GearState};
//! let drive = CurvatureDrive::new(DriveConfig::default());
//! let out = drive.compute(0.0, 0.5, GearState::Neutral);
//! assert!(out.left > 0.0 && out.right < 0.0);
//! ```
use super::shaping::{curvature_mix, deadband_rescale, output_offset};
use crate::utils::{config::DriveConfig, controllers::GearState};

/// Left/right drivetrain command, nominally in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveSignal {
    pub left: f32,
    pub right: f32,
}

impl DriveSignal {
    pub const STOP: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    pub fn new(
        left: f32,
        right: f32,
    ) -> Self {
        Self { left, right }
    }
}

impl From<DriveSignal> for (f32, f32) {
    fn from(signal: DriveSignal) -> Self {
        (signal.left, signal.right)
    }
}

/// Stateless shaping pipeline: deadband, mix, then per-gear output offset.
#[derive(Debug, Clone, Default)]
pub struct CurvatureDrive {
    config: DriveConfig,
}

impl CurvatureDrive {
    pub fn new(config: DriveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    /// Swap in new calibration. Takes effect on the next `compute`.
    pub fn set_config(
        &mut self,
        config: DriveConfig,
    ) {
        self.config = config;
    }

    /// Map raw `throttle` and `turn` axes in `[-1, 1]` to a motor command for
    /// the given gear.
    pub fn compute(
        &self,
        throttle: f32,
        turn: f32,
        gear: GearState,
    ) -> DriveSignal {
        let throttle = deadband_rescale(throttle, self.config.joystick_deadband);
        let turn = deadband_rescale(turn, self.config.joystick_deadband);

        let mixed = curvature_mix(throttle, turn, self.config.sensitivity_power);
        self.apply_gear_offset(mixed, gear)
    }

    /// Apply the output-side offset for `gear`. Neutral passes through.
    pub fn apply_gear_offset(
        &self,
        signal: DriveSignal,
        gear: GearState,
    ) -> DriveSignal {
        match self.config.intercepts(gear) {
            Some((left, right)) => DriveSignal::new(
                output_offset(signal.left, left),
                output_offset(signal.right, right),
            ),
            None => signal,
        }
    }
}
