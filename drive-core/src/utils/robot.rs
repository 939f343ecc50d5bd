//! Periodic robot lifecycle.
//!
//! `Robot` owns the operator sticks, the drivetrain and a telemetry sink, and
//! calls into [`CurvatureDrive`] once per cycle while teleoperated. Mode
//! changes arrive as [`RobotCommand`]s, either directly through
//! [`Robot::handle_command`] or over `ROBOT_CHANNEL` when driven by
//! [`Robot::run`].

use embassy_time::{Duration, Ticker};
use serde::Serialize;

use crate::utils::{
    config::DriveConfig,
    controllers::{DriveBase, Encoders, Gyro, OperatorInput, RobotCommand, Telemetry, ROBOT_CHANNEL},
    math::drive::{CurvatureDrive, DriveSignal},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RobotMode {
    #[default]
    Disabled,
    Teleop,
    Autonomous,
    Test,
}

/// Raw diagnostic values published every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TelemetryFrame {
    pub left_output: f32,
    pub right_output: f32,
    pub heading: f32,
    pub left_encoder: i32,
    pub right_encoder: i32,
}

impl TelemetryFrame {
    pub const LEFT_OUTPUT: &'static str = "Left Motor Output";
    pub const RIGHT_OUTPUT: &'static str = "Right Motor Output";
    pub const HEADING: &'static str = "Raw Gyro Heading";
    pub const RIGHT_ENCODER: &'static str = "Right Encoder";
    pub const LEFT_ENCODER: &'static str = "Left Encoder";

    pub fn capture<D: DriveBase>(drive: &D) -> Self {
        let (left_output, right_output) = drive.output_percent();
        let (left_encoder, right_encoder) = drive.positions();
        Self {
            left_output,
            right_output,
            heading: drive.heading(),
            left_encoder,
            right_encoder,
        }
    }

    pub fn publish<T: Telemetry>(
        &self,
        telemetry: &mut T,
    ) {
        telemetry.put_number(Self::LEFT_OUTPUT, self.left_output as f64);
        telemetry.put_number(Self::RIGHT_OUTPUT, self.right_output as f64);
        telemetry.put_number(Self::HEADING, self.heading as f64);
        telemetry.put_number(Self::RIGHT_ENCODER, self.right_encoder as f64);
        telemetry.put_number(Self::LEFT_ENCODER, self.left_encoder as f64);
    }
}

pub struct Robot<I, D, T> {
    input: I,
    drive: D,
    telemetry: T,
    shaper: CurvatureDrive,
    mode: RobotMode,
}

impl<I, D, T> Robot<I, D, T>
where
    I: OperatorInput,
    D: DriveBase,
    T: Telemetry,
{
    /// Robot init. Starts disabled.
    pub fn new(
        input: I,
        drive: D,
        telemetry: T,
        config: DriveConfig,
    ) -> Self {
        tracing::info!(?config, "Robot initialized");
        Self {
            input,
            drive,
            telemetry,
            shaper: CurvatureDrive::new(config),
            mode: RobotMode::Disabled,
        }
    }

    pub fn mode(&self) -> RobotMode {
        self.mode
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    pub fn drive_mut(&mut self) -> &mut D {
        &mut self.drive
    }

    /// Tear down the robot, handing back the drivetrain.
    pub fn into_drive(self) -> D {
        self.drive
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    pub fn shaper(&self) -> &CurvatureDrive {
        &self.shaper
    }

    /// Switch modes, running the new mode's init hook. Re-entering the
    /// current mode does nothing.
    pub fn set_mode(
        &mut self,
        mode: RobotMode,
    ) {
        if mode == self.mode {
            return;
        }
        tracing::info!(from = ?self.mode, to = ?mode, "Mode change");
        self.mode = mode;
        match mode {
            RobotMode::Disabled => self.disabled_init(),
            RobotMode::Teleop => self.teleop_init(),
            RobotMode::Autonomous => self.autonomous_init(),
            RobotMode::Test => {}
        }
    }

    pub fn handle_command(
        &mut self,
        command: RobotCommand,
    ) {
        match command {
            RobotCommand::Disable => self.set_mode(RobotMode::Disabled),
            RobotCommand::Teleop => self.set_mode(RobotMode::Teleop),
            RobotCommand::Autonomous => self.set_mode(RobotMode::Autonomous),
            RobotCommand::Test => self.set_mode(RobotMode::Test),
            RobotCommand::Configure(config) => match config.validate() {
                Ok(()) => {
                    tracing::info!(?config, "Drive calibration updated");
                    self.shaper.set_config(config);
                }
                Err(e) => tracing::error!("Rejected drive calibration: {:?}", e),
            },
        }
    }

    /// One control cycle of `dt` seconds: the mode hook, then robot periodic.
    pub fn step(
        &mut self,
        dt: f32,
    ) {
        match self.mode {
            RobotMode::Teleop => self.teleop_periodic(),
            RobotMode::Test => {
                self.run_drive();
            }
            RobotMode::Autonomous | RobotMode::Disabled => {}
        }
        self.robot_periodic(dt);
    }

    /// Fixed-rate loop. Drains `ROBOT_CHANNEL` before every cycle.
    pub async fn run(
        &mut self,
        period: Duration,
    ) -> ! {
        let dt = period.as_micros() as f32 / 1_000_000.0;
        let mut ticker = Ticker::every(period);
        loop {
            while let Ok(command) = ROBOT_CHANNEL.try_receive() {
                tracing::info!("Received Robot Command: {:?}", command);
                self.handle_command(command);
            }
            self.step(dt);
            ticker.next().await;
        }
    }

    /// Read the sticks and gear, shape, and drive. Returns what was sent.
    pub fn run_drive(&mut self) -> DriveSignal {
        let throttle = self.input.throttle();
        let turn = self.input.turn();
        let gear = self.drive.gear();

        let signal = self.shaper.compute(throttle, turn, gear);
        tracing::trace!(throttle, turn, ?gear, ?signal, "Drive cycle");
        self.send(signal);
        signal
    }

    fn send(
        &mut self,
        signal: DriveSignal,
    ) {
        if let Err(e) = self.drive.drive(signal.left, signal.right) {
            tracing::error!("Motor output failed: {:?}", e);
        }
    }

    fn robot_periodic(
        &mut self,
        dt: f32,
    ) {
        if let Err(e) = self.drive.sample(dt) {
            tracing::warn!("Gyro sample failed: {:?}", e);
        }
        self.telemetry
            .put_frame(&TelemetryFrame::capture(&self.drive));
    }

    fn disabled_init(&mut self) {
        self.send(DriveSignal::STOP);
        Encoders::reset(&mut self.drive);
        Gyro::reset(&mut self.drive);
    }

    fn teleop_init(&mut self) {
        self.drive.set_brake_mode();
    }

    fn autonomous_init(&mut self) {
        tracing::info!("No autonomous routine configured, holding drivetrain");
        self.send(DriveSignal::STOP);
    }

    fn teleop_periodic(&mut self) {
        self.run_drive();
        self.drive.stop_compressor();
    }
}
