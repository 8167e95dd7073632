//! Differential-drive robot built on two wheel axes sharing one step timer.

use common::{OutputPinBase, StepTimerBase};
use math::common::{abs, RotationDirection};
use math::kinematics::{distance_to_steps, rotation_arc};
use math::measurements::{Angle, Length};

use crate::axis::Axis;
use crate::config::RobotConfig;
use crate::controller::{MotionController, MotionError, TickOutcome};

pub struct Robot<P: OutputPinBase> {
    config: RobotConfig,
    left: Axis<P>,
    right: Axis<P>,
}

impl<P: OutputPinBase> Robot<P> {
    pub fn new(config: RobotConfig, left: Axis<P>, right: Axis<P>) -> Self {
        Self {
            config,
            left,
            right,
        }
    }

    pub fn config(&self) -> RobotConfig {
        self.config
    }

    pub fn left(&self) -> &Axis<P> {
        &self.left
    }

    pub fn left_mut(&mut self) -> &mut Axis<P> {
        &mut self.left
    }

    pub fn right(&self) -> &Axis<P> {
        &self.right
    }

    pub fn right_mut(&mut self) -> &mut Axis<P> {
        &mut self.right
    }

    /// Steps each wheel takes to spin the robot in place by `angle`. The sign is ignored.
    pub fn steps_for_rotation(&self, angle: Angle) -> u32 {
        let arc = rotation_arc(self.config.wheel_base, angle);
        let arc = Length::from_meters(abs(arc.as_meters()));
        distance_to_steps(arc, self.config.wheel_radius)
    }

    pub fn steps_for_distance(&self, distance: Length) -> u32 {
        distance_to_steps(distance, self.config.wheel_radius)
    }

    /// Spin in place by `angle`, wheels turning in opposite directions.
    ///
    /// Clockwise drives the left wheel clockwise and the right wheel counter-clockwise. A
    /// negative angle rotates the other way round. Returns the steps armed on each wheel.
    pub fn rotate_in_place<T: StepTimerBase>(
        &mut self,
        controller: &mut MotionController,
        timer: &mut T,
        angle: Angle,
        direction: RotationDirection,
    ) -> Result<u32, MotionError> {
        let direction = if angle.as_radians() < 0.0 {
            direction.opposite()
        } else {
            direction
        };
        let steps = self.steps_for_rotation(angle);
        if steps == 0 {
            return Err(MotionError::ZeroSteps);
        }

        controller.arm_paired_motion(
            &mut self.left,
            direction,
            &mut self.right,
            direction.opposite(),
            timer,
            steps,
        )?;
        #[cfg(feature = "defmt-log")]
        defmt::info!(
            "[ROBOT] rotating {} deg {}: {} steps per wheel",
            angle.as_degrees(),
            direction,
            steps
        );
        Ok(steps)
    }

    /// Roll both wheels by `distance` in the same direction.
    pub fn translate<T: StepTimerBase>(
        &mut self,
        controller: &mut MotionController,
        timer: &mut T,
        distance: Length,
        direction: RotationDirection,
    ) -> Result<u32, MotionError> {
        let steps = self.steps_for_distance(distance);
        controller.arm_dual_motion(&mut self.left, &mut self.right, timer, steps, direction)?;
        #[cfg(feature = "defmt-log")]
        defmt::info!(
            "[ROBOT] moving {} cm {}: {} steps",
            distance.as_centimeters(),
            direction,
            steps
        );
        Ok(steps)
    }

    /// Call once per interrupt of the shared wheel timer.
    pub fn step_tick<T: StepTimerBase>(
        &mut self,
        controller: &mut MotionController,
        timer: &mut T,
    ) -> TickOutcome {
        controller.step_tick_dual(&mut self.left, &mut self.right, timer)
    }

    /// Stop both wheels where they are.
    pub fn stop<T: StepTimerBase>(&mut self, controller: &mut MotionController, timer: &mut T) {
        controller.abort(&mut self.left, timer);
        controller.abort(&mut self.right, timer);
    }

    pub fn is_moving(&self) -> bool {
        !self.left.is_finished() || !self.right.is_finished()
    }
}
