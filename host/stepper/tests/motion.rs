mod support;

use common::OutputPinBase;
use math::common::RotationDirection;
use math::measurements::{Angle, AngularVelocity};
use stepper::axis::{Axis, AxisId, MotionState};
use stepper::config::{AxisOptions, RobotConfig};
use stepper::controller::{MotionController, MotionError, TickOutcome};
use stepper::robot::Robot;

use crate::support::{Pin, Timer};

fn axis(id: u8, rad_s: f64) -> Axis<Pin> {
    Axis::new(
        AxisId(id),
        Pin::default(),
        Pin::default(),
        AxisOptions {
            cruise_speed: AngularVelocity::from_radians_per_second(rad_s),
        },
    )
}

fn one_rev_per_second(id: u8) -> Axis<Pin> {
    axis(id, 2.0 * core::f64::consts::PI)
}

#[test]
fn single_axis_runs_every_step_then_stops() {
    let mut controller = MotionController::default();
    let mut a = one_rev_per_second(0);
    let mut timer = Timer::default();

    controller
        .arm_motion(&mut a, &mut timer, 100, RotationDirection::Clockwise)
        .unwrap();
    assert!(timer.enabled);

    let mut ticks = 0;
    let mut periods = Vec::new();
    while timer.enabled {
        timer.elapse();
        let outcome = controller.step_tick(&mut a, &mut timer);
        ticks += 1;
        if outcome == TickOutcome::Running && !a.step_pin().is_high() {
            periods.push(timer.reload);
        }
    }

    assert_eq!(ticks, 201);
    assert_eq!(a.step_pin().rising_edges, 100);
    assert_eq!(a.state(), MotionState::Finished);
    assert_eq!(timer.disables, 1);
    assert_eq!(periods.len(), 100);
    assert_eq!(periods[0], 314159);
    assert!(periods[..30].windows(2).all(|w| w[1] < w[0]));
    assert!(periods[30..].iter().all(|p| *p == 5000));
}

#[test]
fn short_motion_ramps_over_all_its_steps() {
    let mut controller = MotionController::default();
    let mut a = one_rev_per_second(0);
    let mut timer = Timer::default();

    controller
        .arm_motion(&mut a, &mut timer, 10, RotationDirection::Clockwise)
        .unwrap();
    assert_eq!(a.accel_steps(), 10);

    let mut periods = Vec::new();
    while controller.step_tick(&mut a, &mut timer) == TickOutcome::Running {
        if !a.step_pin().is_high() {
            periods.push(timer.reload);
        }
    }
    assert_eq!(periods.len(), 10);
    assert!(periods.windows(2).all(|w| w[1] < w[0]));
    assert!(periods.iter().all(|p| *p > 5000));
}

#[test]
fn slow_cruise_ramps_upwards() {
    let mut controller = MotionController::default();
    // 0.05 rad/s is slower than the start speed
    let mut a = axis(0, 0.05);
    let mut timer = Timer::default();

    controller
        .arm_motion(&mut a, &mut timer, 40, RotationDirection::Clockwise)
        .unwrap();
    let start = a.start_delay_us();
    let target = a.target_delay_us();
    assert!(target > start);

    while controller.step_tick(&mut a, &mut timer) == TickOutcome::Running {
        assert!(a.current_delay_us() >= start);
        assert!(a.current_delay_us() <= target);
    }
    assert_eq!(a.current_delay_us(), target);
}

#[test]
fn dual_axes_with_same_speed_step_together() {
    let mut controller = MotionController::default();
    let mut a = one_rev_per_second(0);
    let mut b = one_rev_per_second(1);
    let mut timer = Timer::default();

    controller
        .arm_dual_motion(&mut a, &mut b, &mut timer, 5, RotationDirection::Clockwise)
        .unwrap();

    for _ in 0..10 {
        assert_eq!(
            controller.step_tick_dual(&mut a, &mut b, &mut timer),
            TickOutcome::Running
        );
    }
    assert_eq!(a.remaining_steps(), 0);
    assert_eq!(b.remaining_steps(), 0);
    assert!(timer.enabled);

    assert_eq!(
        controller.step_tick_dual(&mut a, &mut b, &mut timer),
        TickOutcome::Stopped
    );
    assert!(!timer.enabled);
    assert_eq!(timer.disables, 1);
    assert!(controller.active_axes().is_empty());
}

#[test]
fn dual_axes_keep_their_own_cadence() {
    let mut controller = MotionController::default();
    let mut fast = one_rev_per_second(0);
    let mut slow = axis(1, core::f64::consts::PI);
    let mut timer = Timer::default();

    controller
        .arm_dual_motion(&mut fast, &mut slow, &mut timer, 200, RotationDirection::Clockwise)
        .unwrap();
    assert_eq!(fast.target_delay_us(), 5000);
    assert_eq!(slow.target_delay_us(), 10000);

    let mut fast_done_at = None;
    let mut slow_done_at = None;
    while timer.enabled {
        timer.elapse();
        controller.step_tick_dual(&mut fast, &mut slow, &mut timer);
        if fast.is_finished() && fast_done_at.is_none() {
            fast_done_at = Some(timer.now_us);
        }
        if slow.is_finished() && slow_done_at.is_none() {
            slow_done_at = Some(timer.now_us);
        }
    }

    assert_eq!(fast.step_pin().rising_edges, 200);
    assert_eq!(slow.step_pin().rising_edges, 200);
    let fast_done_at = fast_done_at.unwrap();
    let slow_done_at = slow_done_at.unwrap();
    // the slow axis spends 5000 us more on each of its 170 cruise steps
    assert!(slow_done_at > fast_done_at + 170 * 4000);
}

#[test]
fn registry_holds_two_axes() {
    let mut controller = MotionController::default();
    let mut a = one_rev_per_second(0);
    let mut b = one_rev_per_second(1);
    let mut c = one_rev_per_second(2);
    let mut timer = Timer::default();

    controller
        .arm_motion(&mut a, &mut timer, 3, RotationDirection::Clockwise)
        .unwrap();
    controller
        .arm_motion(&mut a, &mut timer, 3, RotationDirection::Clockwise)
        .unwrap();
    controller
        .arm_motion(&mut b, &mut timer, 3, RotationDirection::Clockwise)
        .unwrap();
    assert_eq!(
        controller.arm_motion(&mut c, &mut timer, 3, RotationDirection::Clockwise),
        Err(MotionError::RegistryFull)
    );

    while controller.step_tick(&mut a, &mut timer) == TickOutcome::Running {}
    assert_eq!(controller.active_axes(), &[AxisId(1)]);
    controller
        .arm_motion(&mut c, &mut timer, 3, RotationDirection::Clockwise)
        .unwrap();
    assert_eq!(controller.active_axes(), &[AxisId(1), AxisId(2)]);
}

#[test]
fn quarter_turn_rotation() {
    let mut controller = MotionController::default();
    let mut robot = Robot::new(
        RobotConfig::default(),
        one_rev_per_second(0),
        one_rev_per_second(1),
    );
    let mut timer = Timer::default();

    let steps = robot
        .rotate_in_place(
            &mut controller,
            &mut timer,
            Angle::from_degrees(90.0),
            RotationDirection::Clockwise,
        )
        .unwrap();
    assert_eq!(steps, 156);

    while timer.enabled {
        timer.elapse();
        robot.step_tick(&mut controller, &mut timer);
    }
    assert_eq!(robot.left().step_pin().rising_edges, 156);
    assert_eq!(robot.right().step_pin().rising_edges, 156);
    assert!(robot.left().dir_pin().is_high());
    assert!(!robot.right().dir_pin().is_high());
}

#[test]
fn zero_rotation_arms_nothing() {
    let mut controller = MotionController::default();
    let mut robot = Robot::new(
        RobotConfig::default(),
        one_rev_per_second(0),
        one_rev_per_second(1),
    );
    let mut timer = Timer::default();

    assert_eq!(
        robot.rotate_in_place(
            &mut controller,
            &mut timer,
            Angle::from_degrees(0.0),
            RotationDirection::Clockwise,
        ),
        Err(MotionError::ZeroSteps)
    );
    assert!(!timer.enabled);
    assert!(controller.active_axes().is_empty());
}
