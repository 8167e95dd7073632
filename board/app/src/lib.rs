#![no_std]
#![no_main]

use common::{auto_reload_for, OutputPinBase, PwmBase, StepTimerBase, TimerBase};
use embassy_stm32::{
    gpio::Output,
    timer::{low_level, simple_pwm::SimplePwm, Channel, GeneralInstance32bit4Channel, GeneralInstance4Channel},
};
use embassy_time::Timer;
use stepper::controller::MotionController;
use stepper::robot::Robot;

pub mod config;

pub struct OutputPinWrapper<'a> {
    pin: Output<'a>,
}

impl<'a> OutputPinWrapper<'a> {
    pub fn new(pin: Output<'a>) -> Self {
        Self { pin }
    }
}

impl OutputPinBase for OutputPinWrapper<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// 32-bit general purpose timer counting at 1 MHz, so one reload tick is one microsecond.
pub struct StepTimer<'a, T: GeneralInstance32bit4Channel> {
    inner: low_level::Timer<'a, T>,
}

impl<'a, T: GeneralInstance32bit4Channel> StepTimer<'a, T> {
    const TICK_HZ: u32 = 1_000_000;

    pub fn new(inner: low_level::Timer<'a, T>) -> Self {
        inner.stop();
        let clock = inner.get_clock_frequency().0;
        let prescaler = (clock / Self::TICK_HZ).saturating_sub(1);
        let regs = inner.regs_gp32();
        regs.psc().write_value(prescaler as u16);
        // latch the prescaler, the update flag it raises is cleared below
        regs.egr().write(|w| w.set_ug(true));
        inner.clear_update_interrupt();
        Self { inner }
    }

    /// Acknowledge the update interrupt. Returns whether it was pending.
    pub fn acknowledge(&mut self) -> bool {
        self.inner.clear_update_interrupt()
    }
}

impl<T: GeneralInstance32bit4Channel> StepTimerBase for StepTimer<'_, T> {
    fn enable_interrupt(&mut self) {
        self.inner.clear_update_interrupt();
        self.inner.enable_update_interrupt(true);
        self.inner.start();
    }

    fn disable_interrupt(&mut self) {
        self.inner.enable_update_interrupt(false);
        self.inner.stop();
    }

    fn set_reload(&mut self, ticks: u32) {
        // ARR = 0 blocks the counter, the arming reload of 1 tick would never fire
        self.inner.regs_gp32().arr().write_value(auto_reload_for(ticks));
    }

    fn reset_counter(&mut self) {
        self.inner.regs_gp32().cnt().write_value(0);
    }
}

pub struct DelayTimer {}

impl TimerBase for DelayTimer {
    async fn after(duration: core::time::Duration) {
        let duration = embassy_time::Duration::from_micros(duration.as_micros() as u64);
        Timer::after(duration).await
    }
}

pub struct SimplePwmWrapper<'a, T: GeneralInstance4Channel> {
    inner: SimplePwm<'a, T>,
}

impl<'a, T: GeneralInstance4Channel> SimplePwmWrapper<'a, T> {
    pub fn new(p: SimplePwm<'a, T>) -> Self {
        Self { inner: p }
    }
}

impl<T: GeneralInstance4Channel> PwmBase for SimplePwmWrapper<'_, T> {
    type Channel = Channel;

    fn enable(&mut self, channel: Self::Channel) {
        self.inner.enable(channel);
    }

    fn disable(&mut self, channel: Self::Channel) {
        self.inner.disable(channel);
    }

    fn get_max_duty(&self) -> u64 {
        u64::from(self.inner.get_max_duty())
    }

    fn set_duty(&mut self, channel: Self::Channel, duty_cycle: u64) {
        self.inner.set_duty(channel, duty_cycle as u32);
    }
}

/// Everything the step interrupt touches.
pub struct Drive<'a, T: GeneralInstance32bit4Channel> {
    pub robot: Robot<OutputPinWrapper<'a>>,
    pub controller: MotionController,
    pub timer: StepTimer<'a, T>,
}

impl<T: GeneralInstance32bit4Channel> Drive<'_, T> {
    /// Body of the step timer interrupt.
    pub fn on_interrupt(&mut self) {
        if self.timer.acknowledge() {
            self.robot.step_tick(&mut self.controller, &mut self.timer);
        }
    }
}

#[macro_export]
macro_rules! init_output_pin {
    ($config: expr) => {
        app::OutputPinWrapper::new(Output::new($config, Level::Low, PinSpeed::VeryHigh))
    };
}

#[macro_export]
macro_rules! init_axis {
    ($id: expr, $config: expr) => {
        stepper::axis::Axis::new(
            stepper::axis::AxisId($id),
            app::init_output_pin!($config.step_pin),
            app::init_output_pin!($config.dir_pin),
            $config.options,
        )
    };
}
