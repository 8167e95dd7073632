//! Motion dispatcher and interrupt-driven step generators.
//!
//! A [`MotionController`] arms axes on the main context and is then ticked from the timer
//! interrupt, once per interrupt, until every armed axis has run out of steps. It also owns the
//! active-axis registry, which holds at most [`MAX_ACTIVE_AXES`] axes.

use core::fmt::Display;

use common::{OutputPinBase, StepTimerBase};
use heapless::Vec;
use math::common::RotationDirection;
use math::kinematics::speed_to_period;

use crate::axis::{Axis, AxisId};
use crate::config::RampConfig;

pub const MAX_ACTIVE_AXES: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum MotionError {
    ZeroSteps,
    InvalidSpeed,
    RegistryFull,
}

impl Display for MotionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MotionError::ZeroSteps => core::write!(f, "motion has no steps"),
            MotionError::InvalidSpeed => core::write!(f, "cruise speed gives no step period"),
            MotionError::RegistryFull => {
                core::write!(f, "more than {} axes armed", MAX_ACTIVE_AXES)
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum TickOutcome {
    // the timer was reprogrammed for another tick
    Running,
    // every axis was done, the timer interrupt is now disabled
    Stopped,
}

pub struct MotionController {
    config: RampConfig,
    active: Vec<AxisId, MAX_ACTIVE_AXES>,
    // reload programmed by the last dual tick, i.e. the time elapsed when the next one runs
    shared_reload_us: u32,
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new(RampConfig::default())
    }
}

impl MotionController {
    pub fn new(config: RampConfig) -> Self {
        Self {
            config,
            active: Vec::new(),
            shared_reload_us: config.arm_reload_us,
        }
    }

    pub fn config(&self) -> RampConfig {
        self.config
    }

    pub fn active_axes(&self) -> &[AxisId] {
        &self.active
    }

    pub fn is_active(&self, id: AxisId) -> bool {
        self.active.contains(&id)
    }

    fn start_delay_us(&self) -> u32 {
        speed_to_period(self.config.start_speed)
    }

    fn target_delay_us<P: OutputPinBase>(&self, axis: &Axis<P>) -> Result<u32, MotionError> {
        match speed_to_period(axis.cruise_speed()) {
            0 => Err(MotionError::InvalidSpeed),
            delay => Ok(delay),
        }
    }

    fn check_room(&self, ids: &[AxisId]) -> Result<(), MotionError> {
        let mut missing: Vec<AxisId, MAX_ACTIVE_AXES> = Vec::new();
        for id in ids {
            if !self.is_active(*id) && !missing.contains(id) {
                missing.push(*id).map_err(|_| MotionError::RegistryFull)?;
            }
        }
        if self.active.len() + missing.len() > MAX_ACTIVE_AXES {
            return Err(MotionError::RegistryFull);
        }
        Ok(())
    }

    fn register(&mut self, id: AxisId) {
        if !self.is_active(id) {
            // room was checked before arming
            let _ = self.active.push(id);
        }
    }

    fn release(&mut self, id: AxisId) {
        self.active.retain(|a| *a != id);
    }

    fn load<P: OutputPinBase>(
        &mut self,
        axis: &mut Axis<P>,
        steps: u32,
        direction: RotationDirection,
        target_delay_us: u32,
    ) {
        let start_delay_us = self.start_delay_us();
        axis.arm(
            steps,
            direction,
            start_delay_us,
            target_delay_us,
            self.config.max_accel_steps,
        );
        self.register(axis.id());
        #[cfg(feature = "defmt-log")]
        defmt::debug!(
            "[STEPPER] axis {} armed: {} steps {}, {} us -> {} us",
            axis.id(),
            steps,
            direction,
            start_delay_us,
            target_delay_us
        );
    }

    fn start_timer<T: StepTimerBase>(&mut self, timer: &mut T) {
        self.shared_reload_us = self.config.arm_reload_us;
        timer.reset_counter();
        timer.set_reload(self.config.arm_reload_us);
        timer.enable_interrupt();
    }

    /// Arm `axis` for `steps` steps and start its timer.
    ///
    /// Nothing is touched when the motion is rejected.
    pub fn arm_motion<P: OutputPinBase, T: StepTimerBase>(
        &mut self,
        axis: &mut Axis<P>,
        timer: &mut T,
        steps: u32,
        direction: RotationDirection,
    ) -> Result<(), MotionError> {
        if steps == 0 {
            return Err(MotionError::ZeroSteps);
        }
        let target_delay_us = self.target_delay_us(axis)?;
        self.check_room(&[axis.id()])?;

        self.load(axis, steps, direction, target_delay_us);
        self.start_timer(timer);
        Ok(())
    }

    /// Arm two axes sharing `timer` with the same step count and direction.
    ///
    /// Only [`MotionController::step_tick_dual`] keeps the two axes advancing together.
    pub fn arm_dual_motion<P: OutputPinBase, T: StepTimerBase>(
        &mut self,
        a: &mut Axis<P>,
        b: &mut Axis<P>,
        timer: &mut T,
        steps: u32,
        direction: RotationDirection,
    ) -> Result<(), MotionError> {
        self.arm_paired_motion(a, direction, b, direction, timer, steps)
    }

    /// Arm two axes sharing `timer` with the same step count, each in its own direction.
    ///
    /// Both axes are validated before either is touched, and the timer is started once both
    /// are loaded.
    pub fn arm_paired_motion<P: OutputPinBase, T: StepTimerBase>(
        &mut self,
        a: &mut Axis<P>,
        a_direction: RotationDirection,
        b: &mut Axis<P>,
        b_direction: RotationDirection,
        timer: &mut T,
        steps: u32,
    ) -> Result<(), MotionError> {
        if steps == 0 {
            return Err(MotionError::ZeroSteps);
        }
        let a_target = self.target_delay_us(a)?;
        let b_target = self.target_delay_us(b)?;
        self.check_room(&[a.id(), b.id()])?;

        self.load(a, steps, a_direction, a_target);
        self.load(b, steps, b_direction, b_target);
        self.start_timer(timer);
        Ok(())
    }

    /// Stop `axis` before it runs out of steps.
    ///
    /// The timer interrupt is disabled and the axis leaves the registry, so its slot is free
    /// for other axes. An axis sharing the timer with another one must be aborted together
    /// with it.
    pub fn abort<P: OutputPinBase, T: StepTimerBase>(
        &mut self,
        axis: &mut Axis<P>,
        timer: &mut T,
    ) {
        timer.disable_interrupt();
        axis.cancel();
        self.release(axis.id());
        #[cfg(feature = "defmt-log")]
        defmt::info!("[STEPPER] axis {} aborted", axis.id());
    }

    /// Single-axis step generator. Call once per interrupt of the axis' own timer.
    pub fn step_tick<P: OutputPinBase, T: StepTimerBase>(
        &mut self,
        axis: &mut Axis<P>,
        timer: &mut T,
    ) -> TickOutcome {
        if axis.is_finished() {
            timer.disable_interrupt();
            self.release(axis.id());
            #[cfg(feature = "defmt-log")]
            defmt::info!("[STEPPER] axis {} done", axis.id());
            return TickOutcome::Stopped;
        }

        let reload = axis.advance(self.config.pulse_width_us);
        timer.set_reload(reload);
        timer.reset_counter();
        TickOutcome::Running
    }

    /// Dual-axis step generator for two axes sharing one timer. Call once per interrupt.
    ///
    /// Each axis keeps its own countdown to its next edge. A tick advances every axis whose
    /// countdown ran out and programs the timer for the nearest pending edge, so axes with
    /// different periods keep their own cadence. A finished axis is skipped; the interrupt is
    /// disabled only once both are finished.
    pub fn step_tick_dual<P: OutputPinBase, T: StepTimerBase>(
        &mut self,
        a: &mut Axis<P>,
        b: &mut Axis<P>,
        timer: &mut T,
    ) -> TickOutcome {
        let elapsed = self.shared_reload_us;
        let mut next_edge: Option<u32> = None;

        for axis in [&mut *a, &mut *b] {
            if axis.is_finished() {
                continue;
            }
            let mut wait = axis.countdown_us.saturating_sub(elapsed);
            if wait == 0 {
                wait = axis.advance(self.config.pulse_width_us);
            }
            axis.countdown_us = wait;
            next_edge = Some(next_edge.map_or(wait, |n| n.min(wait)));
        }

        let Some(reload) = next_edge else {
            timer.disable_interrupt();
            self.release(a.id());
            self.release(b.id());
            #[cfg(feature = "defmt-log")]
            defmt::info!("[STEPPER] axes {} and {} done", a.id(), b.id());
            return TickOutcome::Stopped;
        };

        let reload = reload.max(1);
        self.shared_reload_us = reload;
        timer.set_reload(reload);
        timer.reset_counter();
        TickOutcome::Running
    }
}
