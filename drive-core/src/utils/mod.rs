//! Utility re-exports for the drivetrain controller.
//!
//! - `math`: joystick shaping and the curvature/quick-turn mixer
//! - `config`: calibration constants, loadable from JSON
//! - `controllers`: collaborator traits and I2C/GPIO hardware bindings
//! - `robot`: periodic lifecycle that wires input shaping to the motors

pub mod config;
pub mod controllers;
pub mod math;
pub mod robot;

pub use config::DriveConfig;
pub use controllers::{Drivetrain, GearState, ROBOT_CHANNEL};
pub use math::drive::{CurvatureDrive, DriveSignal};
pub use robot::{Robot, RobotMode};
