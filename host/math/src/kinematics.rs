//! Conversions between wheel kinematics and step timing.
//!
//! Every conversion here is built on [`STEPS_PER_REVOLUTION`]: the speeds compared by the ramp
//! and the step counts produced for a distance only agree as long as they share it.

use core::f64::consts::PI;

use crate::measurements::{Angle, AngularVelocity, Length};

/// Full steps per motor shaft revolution.
pub const STEPS_PER_REVOLUTION: u32 = 200;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Step period in microseconds for the given shaft speed.
///
/// Returns 0 when the speed is not strictly positive, or when the period does not fit a
/// timer reload (too fast or not a number). Callers treat 0 as "do not move".
pub fn speed_to_period(speed: AngularVelocity) -> u32 {
    let radians_per_second = speed.as_radians_per_second();
    if radians_per_second.is_nan() || radians_per_second <= 0.0 {
        return 0;
    }
    let revolutions_per_second = radians_per_second / (2.0 * PI);
    let steps_per_second = revolutions_per_second * f64::from(STEPS_PER_REVOLUTION);
    let period = MICROS_PER_SECOND / steps_per_second;
    if !period.is_finite() {
        return 0;
    }
    // truncates, and saturates for absurdly slow speeds
    period as u32
}

/// Number of full steps a wheel of `wheel_radius` needs to roll `distance` along its rim.
///
/// The fractional revolution is truncated. Negative distances and non-positive radii
/// give 0.
pub fn distance_to_steps(distance: Length, wheel_radius: Length) -> u32 {
    let radius = wheel_radius.as_meters();
    if radius.is_nan() || radius <= 0.0 {
        return 0;
    }
    let circumference = 2.0 * PI * radius;
    let revolutions = distance.as_meters() / circumference;
    let steps = revolutions * f64::from(STEPS_PER_REVOLUTION);
    if steps.is_nan() || steps <= 0.0 {
        return 0;
    }
    steps as u32
}

/// Arc each wheel of a differential drive travels while the robot spins in place by `angle`.
///
/// The sign follows the angle.
pub fn rotation_arc(wheel_base: Length, angle: Angle) -> Length {
    Length::from_meters(wheel_base.as_meters() * 0.5 * angle.as_radians())
}
