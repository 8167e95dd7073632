use math::measurements::{AngularVelocity, Length};

/// Shape of the acceleration ramp shared by every axis of a controller.
#[derive(Clone, Copy, Debug)]
pub struct RampConfig {
    // the ramp never spans more steps than this, shorter moves ramp over all their steps
    pub max_accel_steps: u32,
    pub start_speed: AngularVelocity,
    // ON time of a step pulse, in timer ticks
    pub pulse_width_us: u32,
    // reload programmed when a motion is armed, so that the first tick comes right away
    pub arm_reload_us: u32,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            max_accel_steps: 30,
            start_speed: AngularVelocity::from_radians_per_second(0.1),
            pulse_width_us: 20,
            arm_reload_us: 1,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AxisOptions {
    pub cruise_speed: AngularVelocity,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            cruise_speed: AngularVelocity::from_radians_per_second(2.0 * core::f64::consts::PI),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RobotConfig {
    pub wheel_radius: Length,
    // distance between the two wheel contact points
    pub wheel_base: Length,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            wheel_radius: Length::from_centimeters(3.2),
            wheel_base: Length::from_centimeters(20.0),
        }
    }
}
