//! Curvature/quick-turn drivetrain control for a two-stick competition robot on
//! no-std platforms.
//!
//! For a host-side simulation, see the `mock-robot` binary in `drive-app/`.
#![no_std]

pub mod utils;
