#![cfg_attr(not(test), no_std)]

use core::{future::Future, time::Duration};

pub trait OutputPinBase {
    fn set_high(&mut self);
    fn set_low(&mut self);
    fn is_high(&self) -> bool;
}

/// Hardware timer that paces the step generators.
///
/// One timer tick is expected to last one microsecond, so reload values are microseconds.
pub trait StepTimerBase {
    /// Start firing the periodic interrupt.
    fn enable_interrupt(&mut self);
    /// Stop firing the periodic interrupt.
    fn disable_interrupt(&mut self);
    /// Number of ticks until the next interrupt.
    fn set_reload(&mut self, ticks: u32);
    fn reset_counter(&mut self);
}

pub trait PwmBase {
    type Channel: Copy;

    fn enable(&mut self, channel: Self::Channel);
    fn disable(&mut self, channel: Self::Channel);
    fn get_max_duty(&self) -> u64;
    fn set_duty(&mut self, channel: Self::Channel, duty_cycle: u64);
}

pub trait TimerBase {
    fn after(duration: Duration) -> impl Future<Output = ()>;
}

/// Auto-reload register value for an interrupt every `ticks` timer ticks.
///
/// The counter runs from 0 to ARR, so the period is ARR + 1 ticks. A timer with ARR = 0 does
/// not count at all, so ARR never goes below 1 and the shortest period is two ticks.
pub fn auto_reload_for(ticks: u32) -> u32 {
    ticks.saturating_sub(1).max(1)
}
