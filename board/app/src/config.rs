use embassy_stm32::peripherals::{PA6, PB0, PB1, PE0, PE1, TIM2, TIM3};
use embassy_stm32::Peripherals;
use math::measurements::{AngularVelocity, Length};
use servo::ServoOptions;
use stepper::config::{AxisOptions, RampConfig, RobotConfig};

pub struct AxisConfig<S, D> {
    pub step_pin: S,
    pub dir_pin: D,
    pub options: AxisOptions,
}

pub struct ServoConfig<T, P> {
    pub timer: T,
    pub pin: P,
    pub options: ServoOptions,
}

pub struct DriveConfig<LS, LD, RS, RD, ST, PT, PP> {
    pub left: AxisConfig<LS, LD>,
    pub right: AxisConfig<RS, RD>,
    pub step_timer: ST,
    pub robot: RobotConfig,
    pub ramp: RampConfig,
    pub servo: ServoConfig<PT, PP>,
}

pub type BoardDriveConfig = DriveConfig<PB0, PB1, PE0, PE1, TIM2, TIM3, PA6>;

pub fn drive_config(p: Peripherals) -> BoardDriveConfig {
    let wheel = AxisOptions {
        cruise_speed: AngularVelocity::from_rpm(60.0),
    };
    DriveConfig {
        left: AxisConfig {
            step_pin: p.PB0,
            dir_pin: p.PB1,
            options: wheel,
        },
        right: AxisConfig {
            step_pin: p.PE0,
            dir_pin: p.PE1,
            options: wheel,
        },
        step_timer: p.TIM2,
        robot: RobotConfig {
            wheel_radius: Length::from_centimeters(3.2),
            wheel_base: Length::from_centimeters(20.0),
        },
        ramp: RampConfig::default(),
        servo: ServoConfig {
            timer: p.TIM3,
            pin: p.PA6,
            options: ServoOptions::default(),
        },
    }
}
