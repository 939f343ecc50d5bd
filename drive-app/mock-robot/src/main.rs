use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use drive_core::utils::controllers::{
    Encoders, GearState, Gyro, MotorOutput, OperatorInput, RobotCommand, Shifter, Telemetry,
};
use drive_core::utils::robot::TelemetryFrame;
use drive_core::utils::{DriveConfig, Robot, ROBOT_CHANNEL};
use embassy_executor::{Executor, Spawner};
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;
use tracing::{debug, error, info, trace};

/// Encoder ticks per cycle at full output.
const TICKS_PER_CYCLE: f32 = 40.0;
/// Spin rate in deg/s when the sides run fully opposed.
const MAX_TURN_RATE: f32 = 360.0;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Gear {
    High,
    Low,
    Neutral,
}

impl From<Gear> for GearState {
    fn from(gear: Gear) -> Self {
        match gear {
            Gear::High => GearState::High,
            Gear::Low => GearState::Low,
            Gear::Neutral => GearState::Neutral,
        }
    }
}

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// control loop period in milliseconds
    #[clap(long, default_value_t = 20)]
    period_ms: u64,
    /// JSON drive calibration file
    #[clap(long)]
    config: Option<PathBuf>,
    /// throttle stick position [-1, 1]
    #[clap(long, default_value_t = 0.5, allow_hyphen_values = true)]
    throttle: f32,
    /// turn stick position [-1, 1]
    #[clap(long, default_value_t = 0.2, allow_hyphen_values = true)]
    turn: f32,
    /// shifter position
    #[clap(long, value_enum, default_value_t = Gear::Low)]
    gear: Gear,
    /// seconds to stay teleoperated before disabling
    #[clap(long, default_value_t = 2)]
    teleop_secs: u64,
    /// print every telemetry frame as a JSON line
    #[clap(long)]
    json: bool,
}

/// Gamepad holding fixed stick positions.
struct FixedSticks {
    throttle: f32,
    turn: f32,
}

impl OperatorInput for FixedSticks {
    fn throttle(&mut self) -> f32 {
        self.throttle
    }

    fn turn(&mut self) -> f32 {
        self.turn
    }
}

/// Drivetrain that dead-reckons encoders and heading from its own output.
struct SimDrivetrain {
    gear: GearState,
    output: (f32, f32),
    ticks: (f32, f32),
    heading: f32,
}

impl SimDrivetrain {
    fn new(gear: GearState) -> Self {
        Self {
            gear,
            output: (0.0, 0.0),
            ticks: (0.0, 0.0),
            heading: 0.0,
        }
    }
}

impl MotorOutput for SimDrivetrain {
    type Error = std::convert::Infallible;

    fn drive(
        &mut self,
        left: f32,
        right: f32,
    ) -> Result<(), Self::Error> {
        self.output = (left.clamp(-1.0, 1.0), right.clamp(-1.0, 1.0));
        self.ticks.0 += self.output.0 * TICKS_PER_CYCLE;
        self.ticks.1 += self.output.1 * TICKS_PER_CYCLE;
        Ok(())
    }

    fn output_percent(&self) -> (f32, f32) {
        self.output
    }

    fn set_brake_mode(&mut self) {
        debug!("brake mode set");
    }
}

impl Shifter for SimDrivetrain {
    fn gear(&mut self) -> GearState {
        self.gear
    }

    fn stop_compressor(&mut self) {}
}

impl Gyro for SimDrivetrain {
    type Error = std::convert::Infallible;

    fn heading(&self) -> f32 {
        self.heading
    }

    fn reset(&mut self) {
        self.heading = 0.0;
    }

    fn sample(
        &mut self,
        dt: f32,
    ) -> Result<(), Self::Error> {
        let (left, right) = self.output;
        self.heading = (self.heading + (left - right) / 2.0 * MAX_TURN_RATE * dt) % 360.0;
        Ok(())
    }
}

impl Encoders for SimDrivetrain {
    fn positions(&self) -> (i32, i32) {
        (self.ticks.0 as i32, self.ticks.1 as i32)
    }

    fn reset(&mut self) {
        self.ticks = (0.0, 0.0);
    }
}

/// Dashboard that logs each frame, or prints it as a JSON line.
struct LogDashboard {
    json: bool,
}

impl Telemetry for LogDashboard {
    fn put_number(
        &mut self,
        key: &'static str,
        value: f64,
    ) {
        trace!(key, value, "telemetry value");
    }

    fn put_frame(
        &mut self,
        frame: &TelemetryFrame,
    ) {
        if !self.json {
            debug!(?frame, "telemetry");
            return;
        }
        match serde_json::to_string(frame) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("Failed to encode telemetry: {:?}", e),
        }
    }
}

type SimRobot = Robot<FixedSticks, SimDrivetrain, LogDashboard>;

#[embassy_executor::task]
async fn robot_task(
    robot: &'static mut SimRobot,
    period: Duration,
) -> ! {
    robot.run(period).await
}

#[embassy_executor::task]
async fn driver_station_task(teleop: Duration) {
    Timer::after(Duration::from_millis(500)).await;
    ROBOT_CHANNEL.send(RobotCommand::Teleop).await;
    Timer::after(teleop).await;
    ROBOT_CHANNEL.send(RobotCommand::Disable).await;
    Timer::after(Duration::from_millis(100)).await;
    info!("Match over");
    std::process::exit(0);
}

fn load_config(path: Option<&PathBuf>) -> DriveConfig {
    let Some(path) = path else {
        return DriveConfig::default();
    };
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Cannot read {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    match DriveConfig::from_json(&bytes) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid drive calibration in {}: {:?}", path.display(), e);
            std::process::exit(1);
        }
    }
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();
    let config = load_config(opts.config.as_ref());

    let sticks = FixedSticks {
        throttle: opts.throttle.clamp(-1.0, 1.0),
        turn: opts.turn.clamp(-1.0, 1.0),
    };
    let dashboard = LogDashboard { json: opts.json };

    static ROBOT: StaticCell<SimRobot> = StaticCell::new();
    let robot = ROBOT.init(Robot::new(
        sticks,
        SimDrivetrain::new(opts.gear.into()),
        dashboard,
        config,
    ));

    let period = Duration::from_millis(opts.period_ms.max(1));
    info!("Starting control loop every {} ms", period.as_millis());
    spawner.spawn(robot_task(robot, period)).unwrap();
    spawner
        .spawn(driver_station_task(Duration::from_secs(opts.teleop_secs)))
        .unwrap();
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
