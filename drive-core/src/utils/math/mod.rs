//! Math utilities for the drivetrain.
//!
//! `shaping` holds the scalar deadband and sensitivity functions, `drive`
//! combines them into the per-cycle curvature/quick-turn computation.

pub mod drive;
pub mod shaping;
