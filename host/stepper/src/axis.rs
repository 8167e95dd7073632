use common::OutputPinBase;
use math::common::RotationDirection;
use math::measurements::AngularVelocity;

use crate::config::AxisOptions;
use crate::ramp::{accel_steps_for, ramp_delay};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub struct AxisId(pub u8);

/// What the next tick does to the step pin.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum PulsePhase {
    // raise the step pin and hold it for the pulse width
    HighPending,
    // drop the step pin and wait out the ramp period
    LowPending,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum MotionState {
    Idle,
    Ramping,
    Cruising,
    Finished,
}

/// One stepper motor: its direction and step outputs plus the state of its current motion.
///
/// The motion fields are written by the controller when a motion is armed and afterwards only
/// by the step generators.
pub struct Axis<P: OutputPinBase> {
    id: AxisId,
    step: P,
    dir: P,
    options: AxisOptions,
    direction: RotationDirection,
    remaining_steps: u32,
    initial_steps: u32,
    accel_steps: u32,
    start_delay_us: u32,
    target_delay_us: u32,
    current_delay_us: u32,
    phase: PulsePhase,
    // microseconds until this axis' next edge, only used when it shares a timer
    pub(crate) countdown_us: u32,
}

impl<P: OutputPinBase> Axis<P> {
    pub fn new(id: AxisId, step: P, dir: P, options: AxisOptions) -> Self {
        Self {
            id,
            step,
            dir,
            options,
            direction: RotationDirection::Clockwise,
            remaining_steps: 0,
            initial_steps: 0,
            accel_steps: 0,
            start_delay_us: 0,
            target_delay_us: 0,
            current_delay_us: 0,
            phase: PulsePhase::HighPending,
            countdown_us: 0,
        }
    }

    pub fn id(&self) -> AxisId {
        self.id
    }

    pub fn options(&self) -> AxisOptions {
        self.options
    }

    /// Takes effect on the next armed motion.
    pub fn set_cruise_speed(&mut self, speed: AngularVelocity) {
        self.options.cruise_speed = speed;
    }

    pub fn cruise_speed(&self) -> AngularVelocity {
        self.options.cruise_speed
    }

    pub fn direction(&self) -> RotationDirection {
        self.direction
    }

    pub fn remaining_steps(&self) -> u32 {
        self.remaining_steps
    }

    pub fn initial_steps(&self) -> u32 {
        self.initial_steps
    }

    pub fn accel_steps(&self) -> u32 {
        self.accel_steps
    }

    pub fn start_delay_us(&self) -> u32 {
        self.start_delay_us
    }

    pub fn target_delay_us(&self) -> u32 {
        self.target_delay_us
    }

    pub fn current_delay_us(&self) -> u32 {
        self.current_delay_us
    }

    pub fn phase(&self) -> PulsePhase {
        self.phase
    }

    pub fn steps_done(&self) -> u32 {
        self.initial_steps - self.remaining_steps
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_steps == 0
    }

    pub fn state(&self) -> MotionState {
        if self.initial_steps == 0 {
            MotionState::Idle
        } else if self.remaining_steps == 0 {
            MotionState::Finished
        } else if self.steps_done() < self.accel_steps {
            MotionState::Ramping
        } else {
            MotionState::Cruising
        }
    }

    pub fn step_pin(&self) -> &P {
        &self.step
    }

    pub fn dir_pin(&self) -> &P {
        &self.dir
    }

    /// Load a fresh motion. The direction output is written right away and stays put until the
    /// motion is over.
    pub(crate) fn arm(
        &mut self,
        steps: u32,
        direction: RotationDirection,
        start_delay_us: u32,
        target_delay_us: u32,
        max_accel_steps: u32,
    ) {
        self.direction = direction;
        match direction {
            RotationDirection::Clockwise => self.dir.set_high(),
            RotationDirection::CounterClockwise => self.dir.set_low(),
        };
        self.initial_steps = steps;
        self.remaining_steps = steps;
        self.accel_steps = accel_steps_for(steps, max_accel_steps);
        self.start_delay_us = start_delay_us;
        self.target_delay_us = target_delay_us;
        self.current_delay_us = start_delay_us;
        self.phase = PulsePhase::HighPending;
        self.countdown_us = 0;
    }

    /// Drop the steps left in the current motion. The step pin is left low.
    pub(crate) fn cancel(&mut self) {
        self.step.set_low();
        self.remaining_steps = 0;
        self.phase = PulsePhase::HighPending;
        self.countdown_us = 0;
    }

    /// Run one phase of the step pulse and return the ticks until the next phase is due.
    ///
    /// Must not be called on a finished axis.
    pub(crate) fn advance(&mut self, pulse_width_us: u32) -> u32 {
        match self.phase {
            PulsePhase::HighPending => {
                self.step.set_high();
                self.phase = PulsePhase::LowPending;
                pulse_width_us
            }
            PulsePhase::LowPending => {
                self.step.set_low();
                self.current_delay_us = ramp_delay(
                    self.start_delay_us,
                    self.target_delay_us,
                    self.steps_done(),
                    self.accel_steps,
                );
                #[cfg(feature = "defmt-log")]
                defmt::trace!("[STEPPER] axis {} period {} us", self.id, self.current_delay_us);
                self.remaining_steps -= 1;
                self.phase = PulsePhase::HighPending;
                self.current_delay_us
            }
        }
    }
}
