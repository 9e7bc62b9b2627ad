use std::f64::consts::FRAC_PI_2;

use rally_core::{math::flatten, PlannerSettings, VehicleState, Vector3};
use rally_physics::BallPath;

use super::SpaceTime;

/// Displacement under `accel` applied for the first `active` seconds of `t`.
fn partial_displacement(accel: f64, t: f64, active: f64) -> f64 {
    let active = active.clamp(0.0, t);
    0.5 * accel * active * active + accel * active * (t - active)
}

/// Seconds of boost left in the tank.
fn boost_seconds(car: &VehicleState, settings: &PlannerSettings) -> f64 {
    if settings.acceleration.boost_per_second > 0.0 {
        car.boost / settings.acceleration.boost_per_second
    } else {
        f64::INFINITY
    }
}

/// Height above `target_z` the car ends at after `t` seconds of boosting with the
/// nose pitched at `pitch` radians above the horizon.
///
/// `seconds_in_air` is how long the car has already been airborne and limits the
/// remaining jump assist. A grounded car also gets the jump impulse.
pub fn aerial_height_error(
    car: &VehicleState,
    target_z: f64,
    t: f64,
    pitch: f64,
    seconds_in_air: f64,
    settings: &PlannerSettings,
) -> f64 {
    let aerial = &settings.aerial;
    let initial_velocity = car.velocity.z
        + if car.has_wheel_contact {
            settings.strike.jump_velocity
        } else {
            0.0
        };
    let assist_left = aerial.jump_assist_seconds - seconds_in_air;

    car.position.z + initial_velocity * t - 0.5 * settings.arena.gravity * t * t
        + partial_displacement(aerial.boost_accel * pitch.sin(), t, boost_seconds(car, settings))
        + partial_displacement(aerial.jump_assist_accel, t, assist_left)
        - target_z
}

/// Nose pitch that puts the car at `target_z` after `t` seconds, found by bisection.
///
/// `None` if even pointing straight up falls short, or pointing straight down still
/// overshoots.
pub fn nose_pitch_for_height(
    car: &VehicleState,
    target_z: f64,
    t: f64,
    seconds_in_air: f64,
    settings: &PlannerSettings,
) -> Option<f64> {
    let error = |pitch| aerial_height_error(car, target_z, t, pitch, seconds_in_air, settings);
    let (mut low, mut high) = (-FRAC_PI_2, FRAC_PI_2);
    if error(high) < 0.0 || error(low) > 0.0 {
        return None;
    }
    for _ in 0..40 {
        let mid = 0.5 * (low + high);
        if error(mid) < 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }
    Some(0.5 * (low + high))
}

/// Whether the car can be at `target` after `t` seconds.
fn is_reachable(
    car: &VehicleState,
    target: &Vector3,
    t: f64,
    seconds_in_air: f64,
    settings: &PlannerSettings,
) -> bool {
    if t <= 0.0 {
        return false;
    }
    let Some(pitch) = nose_pitch_for_height(car, target.z, t, seconds_in_air, settings) else {
        return false;
    };

    let to_target = flatten(&(target - car.position));
    let distance = to_target.norm();
    let closing_speed = to_target
        .try_normalize(1e-9)
        .map(|dir| car.flat_velocity().dot(&dir))
        .unwrap_or(0.0);
    let horizontal_accel = settings.aerial.boost_accel * pitch.cos();
    let reach = closing_speed * t
        + partial_displacement(horizontal_accel, t, boost_seconds(car, settings));
    reach >= distance
}

/// Earliest point `offset` away from the predicted ball, within the search window,
/// that the car can reach in the air.
///
/// A grounded car needs enough boost to take off and ignores contacts a jump can
/// reach.
pub fn aerial_intercept(
    car: &VehicleState,
    ball_path: &BallPath,
    offset: &Vector3,
    seconds_in_air: f64,
    settings: &PlannerSettings,
) -> Option<SpaceTime> {
    let aerial = &settings.aerial;
    if car.has_wheel_contact && car.boost < aerial.boost_needed {
        return None;
    }

    ball_path
        .samples_after(car.time)
        .take_while(|sample| sample.time - car.time <= aerial.search_window)
        .map(|sample| SpaceTime::new(sample.position + offset, sample.time))
        .filter(|candidate| candidate.position.z <= aerial.max_aerial_height)
        .filter(|candidate| {
            !car.has_wheel_contact || candidate.position.z > settings.strike.max_jump_hit_height
        })
        .find(|candidate| {
            is_reachable(
                car,
                &candidate.position,
                candidate.time - car.time,
                seconds_in_air,
                settings,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rally_core::{Team, Vector2};
    use rally_physics::TrajectorySample;

    fn hovering_ball(position: Vector3) -> BallPath {
        let samples = (0..=50)
            .map(|i| TrajectorySample::new(i as f64 * 0.1, position, Vector3::zeros()))
            .collect();
        BallPath::from_samples(samples).unwrap()
    }

    fn grounded_car() -> VehicleState {
        VehicleState::at_rest(Vector3::new(0.0, 0.0, 0.34), Vector2::y(), Team::Blue)
    }

    #[test]
    fn test_unreachable_height_returns_none() {
        let settings = PlannerSettings::default();
        let path = hovering_ball(Vector3::new(0.0, 20.0, 38.0));
        assert!(aerial_intercept(&grounded_car(), &path, &Vector3::zeros(), 0.0, &settings).is_none());
    }

    #[test]
    fn test_hovering_ball_is_reachable() {
        let settings = PlannerSettings::default();
        let path = hovering_ball(Vector3::new(0.0, 20.0, 15.0));
        let intercept = aerial_intercept(&grounded_car(), &path, &Vector3::zeros(), 0.0, &settings)
            .expect("ball at 15 should be reachable");
        assert!(intercept.time > 1.0);
        assert!(intercept.time < 3.0);
        assert_abs_diff_eq!(intercept.position.z, 15.0);
    }

    #[test]
    fn test_needs_boost_to_launch() {
        let settings = PlannerSettings::default();
        let mut car = grounded_car();
        car.boost = 5.0;
        let path = hovering_ball(Vector3::new(0.0, 20.0, 15.0));
        assert!(aerial_intercept(&car, &path, &Vector3::zeros(), 0.0, &settings).is_none());
    }

    #[test]
    fn test_nose_pitch_solves_height() {
        let settings = PlannerSettings::default();
        let car = grounded_car();
        let pitch = nose_pitch_for_height(&car, 15.0, 2.0, 0.0, &settings).unwrap();
        assert_abs_diff_eq!(
            aerial_height_error(&car, 15.0, 2.0, pitch, 0.0, &settings),
            0.0,
            epsilon = 1e-6
        );
        assert!(pitch > 0.0);
        assert!(nose_pitch_for_height(&car, 80.0, 2.0, 0.0, &settings).is_none());
    }
}
