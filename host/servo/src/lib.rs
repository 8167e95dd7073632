#![cfg_attr(not(test), no_std)]

//! Continuous-rotation servo driven by pulse width.
//!
//! A pulse of `stop_pulse_us` holds the wheel still, shorter pulses spin it one way and longer
//! pulses the other way, reaching full speed at the pulse limits.

use core::f64::consts::PI;
use core::time::Duration;

use common::{PwmBase, TimerBase};
use math::common::{abs, clamp};
use math::measurements::{AngularVelocity, Length};

#[derive(Clone, Copy, Debug)]
pub struct ServoOptions {
    // PWM period, 50 Hz
    pub period_us: f64,
    pub stop_pulse_us: f64,
    pub min_pulse_us: f64,
    pub max_pulse_us: f64,
    // wheel speed reached at the pulse limits
    pub max_speed: AngularVelocity,
    pub wheel_radius: Length,
    // share of the remaining pulse difference covered by each frame
    pub approach_factor: f64,
    // closer than this, the pulse snaps to its target
    pub settle_band_us: f64,
    pub frame: Duration,
    // a motion runs this many times its travel time before the stop pulse
    pub time_margin: f64,
}

impl Default for ServoOptions {
    fn default() -> Self {
        Self {
            period_us: 20_000.0,
            stop_pulse_us: 1500.0,
            min_pulse_us: 500.0,
            max_pulse_us: 2500.0,
            max_speed: AngularVelocity::from_rpm(60.0),
            wheel_radius: Length::from_centimeters(3.2),
            approach_factor: 0.05,
            settle_band_us: 5.0,
            frame: Duration::from_millis(20),
            time_margin: 1.1,
        }
    }
}

impl ServoOptions {
    fn clamp_pulse(&self, pulse_us: f64) -> f64 {
        clamp(pulse_us, self.min_pulse_us, self.max_pulse_us)
    }

    /// Pulse width that rolls the wheel by `distance` in `travel_time`.
    ///
    /// The sign of `distance` picks the side of the stop pulse. A zero travel time gives the
    /// stop pulse.
    pub fn pulse_for_motion(&self, distance: Length, travel_time: Duration) -> f64 {
        let seconds = travel_time.as_secs_f64();
        if seconds <= 0.0 {
            return self.stop_pulse_us;
        }
        let circumference = 2.0 * PI * self.wheel_radius.as_meters();
        let rotations = distance.as_meters() / circumference;
        let rpm = rotations / seconds * 60.0;
        let half_range = self.max_pulse_us - self.stop_pulse_us;
        self.clamp_pulse(self.stop_pulse_us + rpm / self.max_speed.as_rpm() * half_range)
    }

    /// Move `current` a fraction of the way to `target`, never past it.
    pub fn approach(&self, target_us: f64, current_us: f64) -> f64 {
        let diff = target_us - current_us;
        let mut next = current_us + diff * self.approach_factor;
        if (diff > 0.0 && next > target_us) || (diff < 0.0 && next < target_us) {
            next = target_us;
        }
        self.clamp_pulse(next)
    }
}

pub struct ServoDrive<C: Copy> {
    channel: C,
    options: ServoOptions,
    pulse_us: f64,
}

impl<C: Copy> ServoDrive<C> {
    pub fn new(channel: C, options: ServoOptions) -> Self {
        Self {
            channel,
            pulse_us: options.stop_pulse_us,
            options,
        }
    }

    pub fn options(&self) -> ServoOptions {
        self.options
    }

    /// Last pulse width written.
    pub fn pulse_us(&self) -> f64 {
        self.pulse_us
    }

    pub fn enable<P: PwmBase<Channel = C>>(&self, pwm: &mut P) {
        pwm.enable(self.channel);
    }

    pub fn disable<P: PwmBase<Channel = C>>(&self, pwm: &mut P) {
        pwm.disable(self.channel);
    }

    fn write_pulse<P: PwmBase<Channel = C>>(&mut self, pwm: &mut P, pulse_us: f64) {
        self.pulse_us = pulse_us;
        let duty = pulse_us * pwm.get_max_duty() as f64 / self.options.period_us;
        pwm.set_duty(self.channel, duty as u64);
    }

    pub fn stop<P: PwmBase<Channel = C>>(&mut self, pwm: &mut P) {
        self.write_pulse(pwm, self.options.stop_pulse_us);
    }

    /// Ramp from standstill towards `target_us`, hold it, then stop.
    ///
    /// One pulse is written per frame for `travel_time` stretched by the time margin, followed
    /// by the stop pulse. Returns the time spent in frames.
    pub async fn run<P: PwmBase<Channel = C>, T: TimerBase>(
        &mut self,
        pwm: &mut P,
        target_us: f64,
        travel_time: Duration,
    ) -> Duration {
        let target_us = self.options.clamp_pulse(target_us);
        let budget_us = (travel_time.as_micros() as f64 * self.options.time_margin) as u128;
        let frame_us = self.options.frame.as_micros();
        #[cfg(feature = "defmt-log")]
        defmt::debug!(
            "[SERVO] target {} us for {} ms",
            target_us,
            travel_time.as_millis() as u64
        );

        let mut pulse_us = self.options.stop_pulse_us;
        let mut elapsed_us: u128 = 0;
        while elapsed_us < budget_us {
            if abs(pulse_us - target_us) > self.options.settle_band_us {
                pulse_us = self.options.approach(target_us, pulse_us);
            } else {
                pulse_us = target_us;
            }
            self.write_pulse(pwm, pulse_us);
            T::after(self.options.frame).await;
            elapsed_us += frame_us;
        }

        self.stop(pwm);
        #[cfg(feature = "defmt-log")]
        defmt::debug!("[SERVO] stopped after {} ms", (elapsed_us / 1000) as u64);
        Duration::from_micros(elapsed_us as u64)
    }

    /// Roll the wheel by `distance` in about `travel_time`.
    pub async fn drive<P: PwmBase<Channel = C>, T: TimerBase>(
        &mut self,
        pwm: &mut P,
        distance: Length,
        travel_time: Duration,
    ) -> Duration {
        let target_us = self.options.pulse_for_motion(distance, travel_time);
        self.run::<P, T>(pwm, target_us, travel_time).await
    }
}
