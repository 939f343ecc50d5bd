//! Collaborator seams for the drivetrain.
//!
//! The shaping logic only talks to hardware through the traits here:
//!
//! - `OperatorInput`: the two driver sticks
//! - `MotorOutput`, `Shifter`, `Gyro`, `Encoders`: drivetrain hardware
//! - `Telemetry`: dashboard sink for diagnostic scalars
//!
//! Concrete bindings live in `i2c` (PCA9685 motors, ICM-42670 gyro) and `pins`
//! (shifter position sensor). Lifecycle commands arrive on `ROBOT_CHANNEL`.

pub mod i2c;
pub mod pins;

use core::fmt::Debug;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::{Deserialize, Serialize};

use crate::utils::{config::DriveConfig, robot::TelemetryFrame};

/// Channel used to receive lifecycle commands (`RobotCommand` messages).
pub static ROBOT_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    RobotCommand,
    16,
> = embassy_sync::channel::Channel::new();

/// Lifecycle command variants sent by the driver station.
///
/// Serialized as JSON with tag `"rc"`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "rc", rename_all = "snake_case")]
pub enum RobotCommand {
    Disable,
    Teleop,
    Autonomous,
    Test,
    /// Replace the drive calibration.
    Configure(DriveConfig),
}

/// Mechanical transmission position reported by the shifter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearState {
    High,
    Low,
    /// Shifter off or position unknown.
    #[default]
    Neutral,
}

/// Driver sticks, sampled once per cycle.
pub trait OperatorInput {
    /// Forward/backward axis in `[-1, 1]`.
    fn throttle(&mut self) -> f32;
    /// Turn axis in `[-1, 1]`, positive turns right.
    fn turn(&mut self) -> f32;
}

pub trait MotorOutput {
    type Error: Debug;

    /// Command both drivetrain sides with normalized values.
    fn drive(
        &mut self,
        left: f32,
        right: f32,
    ) -> Result<(), Self::Error>;

    /// Last applied `(left, right)` output as a fraction of full scale.
    fn output_percent(&self) -> (f32, f32);

    fn set_brake_mode(&mut self) {}
}

pub trait Shifter {
    fn gear(&mut self) -> GearState;

    /// Stop the pneumatics compressor feeding the shifter.
    fn stop_compressor(&mut self) {}
}

pub trait Gyro {
    type Error: Debug;

    /// Heading in degrees since the last reset.
    fn heading(&self) -> f32;

    fn reset(&mut self);

    /// Advance the heading estimate by one cycle of `dt` seconds.
    fn sample(
        &mut self,
        _dt: f32,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub trait Encoders {
    /// Raw `(left, right)` encoder positions in ticks.
    fn positions(&self) -> (i32, i32);

    fn reset(&mut self);
}

/// Dashboard publication of named diagnostic values.
pub trait Telemetry {
    fn put_number(
        &mut self,
        key: &'static str,
        value: f64,
    );

    /// Publish a whole frame. Defaults to one `put_number` per field.
    fn put_frame(
        &mut self,
        frame: &TelemetryFrame,
    ) where
        Self: Sized,
    {
        frame.publish(self);
    }
}

/// Everything the lifecycle needs from a drivetrain.
pub trait DriveBase: MotorOutput + Shifter + Gyro + Encoders {}

impl<T> DriveBase for T where T: MotorOutput + Shifter + Gyro + Encoders {}

/// Bundles four separate hardware parts into one [`DriveBase`].
pub struct Drivetrain<M, S, G, E> {
    pub motors: M,
    pub shifter: S,
    pub gyro: G,
    pub encoders: E,
}

impl<M, S, G, E> Drivetrain<M, S, G, E> {
    pub fn new(
        motors: M,
        shifter: S,
        gyro: G,
        encoders: E,
    ) -> Self {
        Self {
            motors,
            shifter,
            gyro,
            encoders,
        }
    }
}

impl<M: MotorOutput, S, G, E> MotorOutput for Drivetrain<M, S, G, E> {
    type Error = M::Error;

    fn drive(
        &mut self,
        left: f32,
        right: f32,
    ) -> Result<(), Self::Error> {
        self.motors.drive(left, right)
    }

    fn output_percent(&self) -> (f32, f32) {
        self.motors.output_percent()
    }

    fn set_brake_mode(&mut self) {
        self.motors.set_brake_mode()
    }
}

impl<M, S: Shifter, G, E> Shifter for Drivetrain<M, S, G, E> {
    fn gear(&mut self) -> GearState {
        self.shifter.gear()
    }

    fn stop_compressor(&mut self) {
        self.shifter.stop_compressor()
    }
}

impl<M, S, G: Gyro, E> Gyro for Drivetrain<M, S, G, E> {
    type Error = G::Error;

    fn heading(&self) -> f32 {
        self.gyro.heading()
    }

    fn reset(&mut self) {
        self.gyro.reset()
    }

    fn sample(
        &mut self,
        dt: f32,
    ) -> Result<(), Self::Error> {
        self.gyro.sample(dt)
    }
}

impl<M, S, G, E: Encoders> Encoders for Drivetrain<M, S, G, E> {
    fn positions(&self) -> (i32, i32) {
        self.encoders.positions()
    }

    fn reset(&mut self) {
        self.encoders.reset()
    }
}

/// Encoders for drivetrains without any; always reads zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEncoders;

impl Encoders for NoEncoders {
    fn positions(&self) -> (i32, i32) {
        (0, 0)
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robot_command_json() {
        let cmd: RobotCommand = serde_json::from_str(r#"{"rc":"teleop"}"#).unwrap();
        assert_eq!(cmd, RobotCommand::Teleop);

        let cmd: RobotCommand =
            serde_json::from_str(r#"{"rc":"configure","joystick_deadband":0.1}"#).unwrap();
        match cmd {
            RobotCommand::Configure(cfg) => {
                assert_eq!(cfg.joystick_deadband, 0.1);
                assert_eq!(cfg.sensitivity_power, 2.0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_gear_state_json() {
        let gear: GearState = serde_json::from_str(r#""low""#).unwrap();
        assert_eq!(gear, GearState::Low);
        assert_eq!(GearState::default(), GearState::Neutral);
    }
}
