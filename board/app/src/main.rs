#![no_std]
#![no_main]

use core::cell::RefCell;

use app::config::{drive_config, ServoConfig};
use app::{init_axis, DelayTimer, Drive, SimplePwmWrapper, StepTimer};
use critical_section::Mutex;
use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, OutputType, Speed as PinSpeed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::peripherals;
use embassy_stm32::time::hz;
use embassy_stm32::timer::low_level::{self, CountingMode};
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::timer::Channel as TimerChannel;
use embassy_stm32::Config;
use embassy_time::{Duration, Timer};
use math::common::RotationDirection;
use math::measurements::{Angle, Length};
use servo::ServoDrive;
use stepper::controller::MotionController;
use stepper::robot::Robot;

use {defmt_rtt as _, panic_probe as _};

const MOTION_POLL: Duration = Duration::from_millis(10);

static DRIVE: Mutex<RefCell<Option<Drive<'static, peripherals::TIM2>>>> = Mutex::new(RefCell::new(None));

#[interrupt]
unsafe fn TIM2() {
    critical_section::with(|cs| {
        if let Some(ref mut drive) = *DRIVE.borrow(cs).borrow_mut() {
            drive.on_interrupt();
        }
    });
}

fn with_drive<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Drive<'static, peripherals::TIM2>) -> R,
{
    critical_section::with(|cs| DRIVE.borrow(cs).borrow_mut().as_mut().map(f))
}

async fn wait_for_motion() {
    while with_drive(|d| d.robot.is_moving()).unwrap_or(false) {
        Timer::after(MOTION_POLL).await;
    }
}

#[embassy_executor::task]
async fn servo_handler(config: ServoConfig<peripherals::TIM3, peripherals::PA6>) {
    let pwm = SimplePwm::new(
        config.timer,
        Some(PwmPin::new_ch1(config.pin, OutputType::PushPull)),
        None,
        None,
        None,
        hz(50),
        CountingMode::EdgeAlignedUp,
    );
    let mut pwm = SimplePwmWrapper::new(pwm);
    let mut servo = ServoDrive::new(TimerChannel::Ch1, config.options);
    servo.enable(&mut pwm);
    servo.stop(&mut pwm);

    loop {
        let elapsed = servo
            .drive::<_, DelayTimer>(
                &mut pwm,
                Length::from_centimeters(10.0),
                core::time::Duration::from_secs(2),
            )
            .await;
        info!("[SERVO] motion took {} ms", elapsed.as_millis() as u64);
        Timer::after(Duration::from_secs(3)).await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        config.rcc.hsi = Some(HSIPrescaler::DIV1);
        config.rcc.csi = true;
        config.rcc.pll1 = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL50,
            divp: Some(PllDiv::DIV2),
            divq: None,
            divr: None,
        });
        config.rcc.sys = Sysclk::PLL1_P; // 400 Mhz
        config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 Mhz
        config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 Mhz
        config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 Mhz
        config.rcc.apb3_pre = APBPrescaler::DIV2; // 100 Mhz
        config.rcc.apb4_pre = APBPrescaler::DIV2; // 100 Mhz
        config.rcc.voltage_scale = VoltageScale::Scale1;
    }
    let p = embassy_stm32::init(config);

    let drive_config = drive_config(p);

    let left = init_axis!(0, drive_config.left);
    let right = init_axis!(1, drive_config.right);
    let drive = Drive {
        robot: Robot::new(drive_config.robot, left, right),
        controller: MotionController::new(drive_config.ramp),
        timer: StepTimer::new(low_level::Timer::new(drive_config.step_timer)),
    };
    critical_section::with(|cs| {
        DRIVE.borrow(cs).replace(Some(drive));
    });

    interrupt::TIM2.set_priority(Priority::P1);
    unsafe { interrupt::TIM2.enable() };

    spawner.spawn(servo_handler(drive_config.servo)).unwrap();

    let routine = [
        (Angle::from_degrees(90.0), RotationDirection::Clockwise),
        (Angle::from_degrees(90.0), RotationDirection::CounterClockwise),
        (Angle::from_degrees(-180.0), RotationDirection::Clockwise),
        (Angle::from_degrees(180.0), RotationDirection::Clockwise),
    ];

    loop {
        for (angle, direction) in routine {
            let res = with_drive(|d| {
                d.robot
                    .rotate_in_place(&mut d.controller, &mut d.timer, angle, direction)
            });
            match res {
                Some(Ok(steps)) => info!("[MAIN LOOP] rotating, {} steps per wheel", steps),
                Some(Err(e)) => error!("[MAIN LOOP] rotation rejected: {}", e),
                None => error!("[MAIN LOOP] drive not initialized"),
            }
            wait_for_motion().await;
            Timer::after(Duration::from_millis(500)).await;
        }
    }
}
