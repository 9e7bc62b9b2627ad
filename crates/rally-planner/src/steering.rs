//! Low-level steering helpers shared by the steps.

use std::f64::consts::PI;

use rally_core::{
    settings::TurnSettings, Angle, ControlOutput, VehicleState, Vector2, Vector3,
};

/// Drive toward a point on the floor at full throttle, sliding when the error is
/// large.
pub fn steer_toward_ground_position(
    car: &VehicleState,
    target: &Vector2,
    settings: &TurnSettings,
) -> ControlOutput {
    let correction = Angle::correction(&car.flat_nose(), &(target - car.flat_position()));
    ControlOutput::new()
        .with_steer(-correction.radians() * settings.steer_gain)
        .with_throttle(1.0)
        .with_slide(correction.abs() > settings.slide_angle)
}

/// Steer toward a point in the plane the car is driving on, such as a wall.
pub fn steer_toward_wall_position(
    car: &VehicleState,
    target: &Vector3,
    settings: &TurnSettings,
) -> ControlOutput {
    let local = car.orientation.to_local(&(target - car.position));
    let error = local.y.atan2(local.x);
    ControlOutput::new()
        .with_steer(error * settings.steer_gain)
        .with_throttle(1.0)
        .with_slide(error.abs() > settings.slide_angle)
}

/// Drive toward `target` so as to arrive at `arrival_time`, boosting when late and
/// coasting or braking when early.
pub fn get_there_on_time(
    car: &VehicleState,
    target: &Vector2,
    arrival_time: f64,
    settings: &TurnSettings,
) -> ControlOutput {
    let output = steer_toward_ground_position(car, target, settings);
    let to_target = target - car.flat_position();
    let aligned = Angle::correction(&car.flat_nose(), &to_target).abs() < PI / 12.0;
    let can_boost = aligned && car.boost > 0.0 && car.has_wheel_contact;

    let seconds = arrival_time - car.time;
    if seconds <= 0.0 {
        return output.with_boost(can_boost);
    }

    let needed = to_target.norm() / seconds;
    let speed = car.forward_speed();
    if speed > needed * 1.5 {
        output.with_throttle(-1.0)
    } else if speed > needed * 1.1 {
        output.with_throttle(0.0)
    } else {
        output.with_boost(can_boost && needed > speed + 5.0)
    }
}

/// Desired world-frame attitude of the car.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationTarget {
    pub nose: Vector3,
    pub roof: Vector3,
}

impl OrientationTarget {
    pub fn new(nose: Vector3, roof: Vector3) -> Self {
        Self { nose, roof }
    }

    /// Wheels down, nose along the given flat heading.
    pub fn upright(heading: &Vector2) -> Self {
        Self::new(Vector3::new(heading.x, heading.y, 0.0), Vector3::z())
    }
}

/// Proportional pitch/yaw/roll toward the target attitude.
pub fn orientation_output(car: &VehicleState, target: &OrientationTarget, gain: f64) -> ControlOutput {
    let nose = car.orientation.to_local(&target.nose);
    let roof = car.orientation.to_local(&target.roof);
    let pitch_error = nose.z.atan2(nose.x);
    let yaw_error = nose.y.atan2(nose.x);
    let roll_error = roof.y.atan2(roof.z);
    ControlOutput::new()
        .with_pitch(pitch_error * gain)
        .with_yaw(yaw_error * gain)
        .with_roll(roll_error * gain)
}

/// Largest angle between the car's axes and the target axes.
pub fn orientation_error(car: &VehicleState, target: &OrientationTarget) -> f64 {
    let angle = |a: &Vector3, b: &Vector3| match (a.try_normalize(1e-9), b.try_normalize(1e-9)) {
        (Some(a), Some(b)) => a.dot(&b).clamp(-1.0, 1.0).acos(),
        _ => 0.0,
    };
    angle(&car.orientation.nose, &target.nose).max(angle(&car.orientation.roof, &target.roof))
}
