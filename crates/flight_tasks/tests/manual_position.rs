//! End-to-end ticks through the manual position task.

use core::f32::consts::FRAC_PI_2;

use flight_tasks::{
    CombinedSetpoint, ConfigLimits, HorizontalEstimate, ManualPositionTask, ParamStore, StickInput,
    Vector2, VerticalYawProvider, VerticalYawSetpoint,
};

/// Base task stand-in holding a fixed heading.
struct HeadingBase {
    yaw: f32,
}

impl VerticalYawProvider for HeadingBase {
    fn update(&mut self, _limits: &ConfigLimits) -> VerticalYawSetpoint {
        VerticalYawSetpoint {
            yaw: self.yaw,
            yawspeed: 0.0,
            climb_rate: 0.0,
            altitude: Some(20.0),
        }
    }
}

fn limits(vel_max: f32, hold_thr: f32) -> ConfigLimits {
    ConfigLimits {
        vel_manual_max: vel_max,
        acc_xy_max: 5.0,
        hold_max_xy: hold_thr,
    }
}

fn estimate(position: (f32, f32), speed_north: f32) -> HorizontalEstimate {
    HorizontalEstimate {
        position: Vector2::new(position.0, position.1),
        velocity: Vector2::new(speed_north, 0.0),
    }
}

fn tick(
    task: &mut ManualPositionTask,
    stick: StickInput,
    est: &HorizontalEstimate,
    limits: &ConfigLimits,
) -> CombinedSetpoint {
    task.update(&mut HeadingBase { yaw: 0.0 }, stick, est, limits)
}

#[test]
fn test_lock_once_then_hold_for_ten_ticks() {
    let mut task = ManualPositionTask::new();
    let lim = limits(5.0, 0.1);

    let first = tick(&mut task, StickInput::CENTERED, &estimate((10.0, 5.0), 0.05), &lim);
    assert_eq!(first.position_xy, Some(Vector2::new(10.0, 5.0)));

    for i in 0..10 {
        // estimator keeps reporting small drift, the lock must not follow it
        let est = estimate((10.0 + 0.01 * i as f32, 5.0), 0.05);
        let sp = tick(&mut task, StickInput::CENTERED, &est, &lim);
        assert_eq!(sp.position_xy, Some(Vector2::new(10.0, 5.0)));
        assert_eq!(sp.velocity_xy, Vector2::ZERO);
    }
}

#[test]
fn test_unlock_on_stick_input() {
    let mut task = ManualPositionTask::new();
    let lim = limits(5.0, 0.1);
    let est = estimate((10.0, 5.0), 0.0);

    tick(&mut task, StickInput::CENTERED, &est, &lim);
    assert!(task.is_position_locked());

    let sp = tick(&mut task, StickInput::new(0.5, 0.0), &est, &lim);
    assert_eq!(sp.position_xy, None);
    assert!((sp.velocity_xy.x - 2.5).abs() < 1e-5);
    assert!(!task.is_position_locked());
}

#[test]
fn test_threshold_disabled_locks_at_speed() {
    let mut task = ManualPositionTask::new();
    let sp = tick(&mut task, StickInput::CENTERED, &estimate((1.0, 2.0), 5.0), &limits(5.0, 0.0));
    assert_eq!(sp.position_xy, Some(Vector2::new(1.0, 2.0)));
}

#[test]
fn test_no_lock_while_moving() {
    let mut task = ManualPositionTask::new();
    let lim = limits(5.0, 0.1);
    let sp = tick(&mut task, StickInput::CENTERED, &estimate((0.0, 0.0), 2.0), &lim);
    assert_eq!(sp.position_xy, None);
    assert_eq!(sp.velocity_xy, Vector2::ZERO);
}

#[test]
fn test_brake_then_lock_where_vehicle_stops() {
    let mut task = ManualPositionTask::new();
    let lim = limits(5.0, 0.1);

    // fly north, release, decelerate over a few ticks
    tick(&mut task, StickInput::new(1.0, 0.0), &estimate((0.0, 0.0), 5.0), &lim);
    let decel = [(2.0, 3.0), (3.0, 1.5), (3.4, 0.4), (3.5, 0.08)];
    let mut locked_at = None;
    for &(north, speed) in &decel {
        let sp = tick(&mut task, StickInput::CENTERED, &estimate((north, 0.0), speed), &lim);
        if locked_at.is_none() {
            locked_at = sp.position_xy;
        }
    }
    assert_eq!(locked_at, Some(Vector2::new(3.5, 0.0)));
}

#[test]
fn test_rotation_by_heading() {
    let mut task = ManualPositionTask::new();
    let mut base = HeadingBase { yaw: FRAC_PI_2 };
    let sp = task.update(
        &mut base,
        StickInput::new(1.0, 0.0),
        &estimate((0.0, 0.0), 0.0),
        &limits(5.0, 0.1),
    );
    assert!(sp.velocity_xy.x.abs() < 1e-5);
    assert!((sp.velocity_xy.y - 5.0).abs() < 1e-5);
    assert_eq!(sp.yaw, FRAC_PI_2);
    assert_eq!(sp.altitude, Some(20.0));
}

#[test]
fn test_velocity_magnitude_bounded_by_param() {
    let mut store = ParamStore::new();
    store.set("MPC_VEL_MANUAL", 8.0).unwrap();
    let lim = store.limits();

    let mut task = ManualPositionTask::new();
    for &(x, y) in &[(1.0, 1.0), (1.1, -0.2), (-0.3, 0.4), (0.0, -1.0)] {
        let sp = tick(&mut task, StickInput::new(x, y), &estimate((0.0, 0.0), 0.0), &lim);
        assert!(sp.velocity_xy.length() <= 8.0 + 1e-4);
    }
}

#[test]
fn test_identical_inputs_give_identical_outputs() {
    let lim = limits(7.0, 0.3);
    let sticks = [
        StickInput::new(0.2, 0.9),
        StickInput::CENTERED,
        StickInput::CENTERED,
        StickInput::new(-0.6, 0.1),
    ];
    let run = || {
        let mut task = ManualPositionTask::new();
        let mut base = HeadingBase { yaw: 0.77 };
        let mut out = [CombinedSetpoint::default(); 4];
        for (i, stick) in sticks.iter().enumerate() {
            let est = estimate((i as f32, -(i as f32)), 0.1);
            out[i] = task.update(&mut base, *stick, &est, &lim);
        }
        out
    };

    let a = run();
    let b = run();
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.velocity_xy.x.to_bits(), y.velocity_xy.x.to_bits());
        assert_eq!(x.velocity_xy.y.to_bits(), y.velocity_xy.y.to_bits());
        assert_eq!(x.position_xy, y.position_xy);
    }
}
