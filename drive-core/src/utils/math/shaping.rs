//! Scalar shaping functions for joystick axes and motor commands.
//!
//! Every function here is total over finite `f32` input and allocation free,
//! so they can run inside the control loop without any error handling.
//!
//! # Example
//! ```rust
//! use drive_core::utils::math::shaping::{curvature_mix, deadband_rescale};
//! let throttle = deadband_rescale(0.03, 0.05);
//! assert_eq!(throttle, 0.0);
//! let out = curvature_mix(throttle, 0.4, 2.0);
//! assert_eq!((out.left, out.right), (0.4, -0.4));
//! ```
use libm;

use super::drive::DriveSignal;

/// Zero the axis inside `deadband` and rescale the rest so the output still
/// spans `[-1, 1]`.
///
/// Maps the line from `(±deadband, 0)` to `(±1, ±1)`. An input of exactly
/// `±1` is returned unchanged.
pub fn deadband_rescale(
    input: f32,
    deadband: f32,
) -> f32 {
    let magnitude = libm::fabsf(input);
    if magnitude <= deadband {
        0.0
    } else if magnitude == 1.0 {
        input
    } else {
        (input - libm::copysignf(deadband, input)) / (1.0 - deadband)
    }
}

/// Raise the magnitude of `input` to `power`, keeping the sign of `input`.
/// Zero stays zero for every `power`.
///
/// With `power > 1` small inputs shrink more than large ones, which gives the
/// driver finer control near the center of the stick.
pub fn exponentiate(
    input: f32,
    power: f32,
) -> f32 {
    if input == 0.0 {
        return 0.0;
    }
    libm::copysignf(libm::powf(libm::fabsf(input), power), input)
}

/// Lift a nonzero motor command so its smallest magnitude is `intercept`.
///
/// This is the output-side counterpart of [`deadband_rescale`]: `0` stays `0`,
/// `±1` stays `±1`, and everything between is mapped onto
/// `[intercept, 1]` with the sign preserved.
pub fn output_offset(
    input: f32,
    intercept: f32,
) -> f32 {
    let magnitude = libm::fabsf(input);
    if magnitude == 0.0 {
        0.0
    } else if magnitude == 1.0 {
        input
    } else {
        input * (1.0 - intercept) + libm::copysignf(intercept, input)
    }
}

/// Mix already-deadbanded throttle and turn into left/right commands.
///
/// With no throttle the robot turns in place (`left = turn`, `right = -turn`).
/// Otherwise turn scales the throttle per side and both sides go through
/// [`exponentiate`] with `power`.
pub fn curvature_mix(
    throttle: f32,
    turn: f32,
    power: f32,
) -> DriveSignal {
    if throttle == 0.0 {
        return DriveSignal::new(turn, -turn);
    }

    let left = throttle + throttle * turn;
    let right = throttle - throttle * turn;
    DriveSignal::new(exponentiate(left, power), exponentiate(right, power))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_deadband_zeroes_inside_threshold() {
        for &d in &[0.0, 0.05, 0.2, 0.5, 0.99] {
            for &x in &[0.0, d, -d, d * 0.5, -d * 0.5] {
                assert_eq!(deadband_rescale(x, d), 0.0, "x={} d={}", x, d);
            }
        }
    }

    #[test]
    fn test_deadband_keeps_full_scale() {
        for &d in &[0.0, 0.05, 0.3, 0.9] {
            assert_eq!(deadband_rescale(1.0, d), 1.0);
            assert_eq!(deadband_rescale(-1.0, d), -1.0);
        }
    }

    #[test]
    fn test_deadband_rescales_linearly() {
        // Halfway between the threshold and full scale lands on 0.5.
        let d = 0.2;
        assert!((deadband_rescale(0.6, d) - 0.5).abs() < EPS);
        assert!((deadband_rescale(-0.6, d) + 0.5).abs() < EPS);
        // Just outside the threshold is close to zero, not a jump.
        assert!(deadband_rescale(0.2001, d) < 1e-3);
    }

    #[test]
    fn test_deadband_zero_threshold_is_identity() {
        assert!((deadband_rescale(0.37, 0.0) - 0.37).abs() < EPS);
        assert!((deadband_rescale(-0.81, 0.0) + 0.81).abs() < EPS);
    }

    #[test]
    fn test_exponentiate_preserves_sign() {
        for &p in &[0.5, 1.0, 2.0, 3.0, 2.5] {
            for &x in &[0.1, 0.5, 0.9, 1.0, 1.5] {
                assert!(exponentiate(x, p) > 0.0);
                assert!(exponentiate(-x, p) < 0.0);
            }
            assert_eq!(exponentiate(0.0, p), 0.0);
        }
    }

    #[test]
    fn test_exponentiate_zero_for_any_power() {
        for &p in &[0.0, -1.0, -2.5] {
            assert_eq!(exponentiate(0.0, p), 0.0);
            assert_eq!(exponentiate(-0.0, p), 0.0);
        }
    }

    #[test]
    fn test_exponentiate_squares() {
        assert!((exponentiate(0.5, 2.0) - 0.25).abs() < EPS);
        assert!((exponentiate(-0.5, 2.0) + 0.25).abs() < EPS);
        // Fractional powers of negative inputs stay finite.
        assert!(exponentiate(-0.25, 0.5).is_finite());
        assert!((exponentiate(-0.25, 0.5) + 0.5).abs() < EPS);
    }

    #[test]
    fn test_output_offset_endpoints() {
        for &c in &[0.0, 0.08, 0.5, 0.9] {
            assert_eq!(output_offset(0.0, c), 0.0);
            assert_eq!(output_offset(1.0, c), 1.0);
            assert_eq!(output_offset(-1.0, c), -1.0);
        }
    }

    #[test]
    fn test_output_offset_lifts_small_commands() {
        let c = 0.1;
        assert!((output_offset(0.5, c) - 0.55).abs() < EPS);
        assert!((output_offset(-0.5, c) + 0.55).abs() < EPS);
        // Tiny commands start at the intercept.
        assert!((output_offset(1e-6, c) - c).abs() < 1e-4);
    }

    #[test]
    fn test_quick_turn_without_throttle() {
        let out = curvature_mix(0.0, 0.7, 2.0);
        assert_eq!(out.left, 0.7);
        assert_eq!(out.right, -0.7);

        let out = curvature_mix(0.0, -0.3, 2.0);
        assert_eq!(out.left, -0.3);
        assert_eq!(out.right, 0.3);
    }

    #[test]
    fn test_curvature_mix_example() {
        let out = curvature_mix(0.5, 0.2, 2.0);
        assert!((out.left - 0.36).abs() < EPS);
        assert!((out.right - 0.16).abs() < EPS);
    }

    #[test]
    fn test_curvature_mix_reverse_keeps_sign() {
        let out = curvature_mix(-0.5, 0.2, 2.0);
        assert!((out.left + 0.36).abs() < EPS);
        assert!((out.right + 0.16).abs() < EPS);
    }
}
