//! Turning-circle approach: drive to a tangent point, then follow a circle that
//! ends at the strike point with the requested facing.

use std::f64::consts::PI;

use rally_core::{
    math::{find_intersection, orthogonal, Circle},
    settings::TurnSettings,
    Angle, ControlOutput, PlannerSettings, VehicleState, Vector2,
};

use super::StrikePoint;
use crate::{
    acceleration::DistancePlot,
    steering::{get_there_on_time, steer_toward_ground_position},
};

/// The circle part of a turn plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnArc {
    pub circle: Circle,
    pub clockwise: bool,
    /// Where the straight approach meets the circle.
    pub tangent_point: Vector2,
    /// Radians travelled along the circle from the tangent point to the target.
    pub sweep: f64,
}

/// Output of the turn planner for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnPlan {
    /// `None` when the target is driven to in a straight line.
    pub arc: Option<TurnArc>,
    pub output: ControlOutput,
    pub waypoint: Vector2,
    pub strike_point: StrikePoint,
}

/// Turning radius at the given speed.
pub fn turn_radius(speed: f64, settings: &TurnSettings) -> f64 {
    let v = speed.abs();
    settings.radius_a * v * v + settings.radius_b * v + settings.radius_c
}

/// Inverse of [`turn_radius`]; `None` for radii tighter than the car can turn.
pub fn speed_for_radius(radius: f64, settings: &TurnSettings) -> Option<f64> {
    let (a, b, c) = (settings.radius_a, settings.radius_b, settings.radius_c);
    if (radius - c).abs() < 1e-9 {
        return Some(0.0);
    }
    if radius < c {
        return None;
    }
    if a.abs() < 1e-12 {
        return (b > 0.0).then(|| (radius - c) / b);
    }
    Some((-b + (b * b - 4.0 * a * (c - radius)).sqrt()) / (2.0 * a))
}

/// Fastest sensible speed for entering the circle, lower when the car must turn a
/// lot to reach the target facing.
pub fn ideal_circle_speed(car: &VehicleState, facing: &Vector2, settings: &PlannerSettings) -> f64 {
    let misalignment = Angle::correction(&car.flat_nose(), facing).abs();
    let penalty = settings.turn.misalignment_penalty * (misalignment - PI / 6.0).max(0.0);
    (settings.acceleration.supersonic_speed - penalty).max(settings.turn.min_circle_speed)
}

/// Plan the approach to `strike_point`.
pub fn plan_for_circle_turn(
    car: &VehicleState,
    plot: &DistancePlot,
    strike_point: &StrikePoint,
    settings: &PlannerSettings,
) -> TurnPlan {
    let to_target = strike_point.position - car.flat_position();
    let correction = Angle::correction(&to_target, &strike_point.facing);
    if to_target.norm() < 1e-6
        || strike_point.facing.norm() < 1e-9
        || correction.abs() < settings.turn.straight_tolerance
    {
        return straight_plan(car, strike_point, settings);
    }

    let clockwise = correction.radians() < 0.0;
    let ideal = ideal_circle_speed(car, &strike_point.facing, settings);
    let reachable = plot
        .motion_after_distance(to_target.norm())
        .map(|m| m.speed)
        .unwrap_or(ideal);
    circle_waypoint(car, strike_point, ideal.min(reachable), clockwise, settings, true)
}

fn straight_plan(car: &VehicleState, strike_point: &StrikePoint, settings: &PlannerSettings) -> TurnPlan {
    TurnPlan {
        arc: None,
        output: get_there_on_time(car, &strike_point.position, strike_point.time, &settings.turn),
        waypoint: strike_point.position,
        strike_point: *strike_point,
    }
}

/// Center of the circle ending at the strike point.
fn circle_for(strike_point: &StrikePoint, radius: f64, clockwise: bool) -> Circle {
    let left = orthogonal(&strike_point.facing);
    let side = if clockwise { -left } else { left };
    Circle::new(strike_point.position + side * radius, radius)
}

fn circle_waypoint(
    car: &VehicleState,
    strike_point: &StrikePoint,
    expected_speed: f64,
    clockwise: bool,
    settings: &PlannerSettings,
    may_replan: bool,
) -> TurnPlan {
    let position = car.flat_position();
    let current_speed = car.flat_velocity().norm();
    let circle = circle_for(strike_point, turn_radius(expected_speed, &settings.turn), clockwise);

    if circle.contains(&position) {
        if may_replan && current_speed < expected_speed {
            return circle_waypoint(car, strike_point, current_speed, clockwise, settings, false);
        }
        return plan_within_circle(car, strike_point, clockwise, settings);
    }

    let Some(tangent_point) = tangent_point(&circle, &position, clockwise) else {
        return plan_within_circle(car, strike_point, clockwise, settings);
    };
    let sweep = sweep_between(&circle, &tangent_point, &strike_point.position, clockwise);
    let correction_seconds = circle.radius * sweep / expected_speed.max(1.0);
    let mut output = get_there_on_time(
        car,
        &tangent_point,
        strike_point.time - correction_seconds,
        &settings.turn,
    );
    if current_speed > expected_speed
        && (tangent_point - position).norm() < settings.turn.brake_distance
    {
        output = output.with_throttle(-1.0).with_boost(false);
    }

    TurnPlan {
        arc: Some(TurnArc {
            circle,
            clockwise,
            tangent_point,
            sweep,
        }),
        output,
        waypoint: tangent_point,
        strike_point: *strike_point,
    }
}

/// Track a circle through the car that is tangent to the facing at the target,
/// modulating speed to hold its radius.
fn plan_within_circle(
    car: &VehicleState,
    strike_point: &StrikePoint,
    clockwise: bool,
    settings: &PlannerSettings,
) -> TurnPlan {
    let turn = &settings.turn;
    let position = car.flat_position();
    let Some(tracked) = circle_through(&position, strike_point, clockwise) else {
        return straight_plan(car, strike_point, settings);
    };

    let lookahead = if clockwise {
        -turn.lookahead_radians
    } else {
        turn.lookahead_radians
    };
    let waypoint = tracked.center + Angle::from_radians(lookahead) * (position - tracked.center);

    let ideal_speed = speed_for_radius(tracked.radius, turn).unwrap_or(turn.fallback_circle_speed);
    let current_speed = car.flat_velocity().norm();
    let ratio = current_speed / ideal_speed.max(1e-3);
    let medium = settings.acceleration.medium_speed;
    let boost = (current_speed >= medium && ratio < 0.8) || ratio < 0.7;
    let slide_period = if ratio > 2.0 {
        Some(3)
    } else if ratio > 1.5 {
        Some(6)
    } else if ratio > 1.2 {
        Some(9)
    } else if ratio > 1.0 {
        Some(12)
    } else {
        None
    };
    let slide = slide_period.is_some_and(|n| car.frame % n == 0);

    let output = steer_toward_ground_position(car, &waypoint, turn)
        .with_boost(boost && car.boost > 0.0)
        .with_slide(slide)
        .with_throttle(if ratio > 2.0 { 0.0 } else { 1.0 });

    let sweep = sweep_between(&tracked, &position, &strike_point.position, clockwise);
    TurnPlan {
        arc: Some(TurnArc {
            circle: tracked,
            clockwise,
            tangent_point: position,
            sweep,
        }),
        output,
        waypoint,
        strike_point: *strike_point,
    }
}

/// Circle through `point` that touches the strike point along its facing.
fn circle_through(point: &Vector2, strike_point: &StrikePoint, clockwise: bool) -> Option<Circle> {
    let left = orthogonal(&strike_point.facing);
    let normal = if clockwise { -left } else { left };
    let midpoint = (point + strike_point.position) / 2.0;
    let chord = point - strike_point.position;
    let center = find_intersection(strike_point.position, normal, midpoint, orthogonal(&chord))?;
    Some(Circle::new(center, (center - strike_point.position).norm()))
}

/// Tangent point on `circle` seen from an outside point, entering the circle in its
/// direction of travel.
pub fn tangent_point(circle: &Circle, from: &Vector2, clockwise: bool) -> Option<Vector2> {
    let to_from = from - circle.center;
    let distance = to_from.norm();
    if distance <= circle.radius {
        return None;
    }
    let alpha = (circle.radius / distance).acos();
    let base = to_from * (circle.radius / distance);
    [alpha, -alpha].into_iter().find_map(|angle| {
        let candidate = circle.center + Angle::from_radians(angle) * base;
        let radial = candidate - circle.center;
        let travel = candidate - from;
        let counter_clockwise = radial.x * travel.y - radial.y * travel.x > 0.0;
        (counter_clockwise != clockwise).then_some(candidate)
    })
}

/// Angle travelled along a circle from `a` to `b` in the given direction, in [0, 2pi).
fn sweep_between(circle: &Circle, a: &Vector2, b: &Vector2, clockwise: bool) -> f64 {
    let angle = Angle::correction(&(a - circle.center), &(b - circle.center)).radians();
    let signed = if clockwise { -angle } else { angle };
    if signed < 0.0 {
        signed + 2.0 * PI
    } else {
        signed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceleration::AccelerationModel;
    use approx::assert_relative_eq;
    use rally_core::{Team, Vector3};

    fn plot_for(car: &VehicleState, settings: &PlannerSettings) -> DistancePlot {
        AccelerationModel::new(&settings.acceleration).for_car(car, 5.0)
    }

    #[test]
    fn test_speed_for_radius_inverts_turn_radius() {
        let settings = TurnSettings::default();
        for speed in [0.0, 5.0, 23.0, 46.0] {
            let radius = turn_radius(speed, &settings);
            assert_relative_eq!(
                speed_for_radius(radius, &settings).unwrap(),
                speed,
                epsilon = 1e-6
            );
        }
        assert!(speed_for_radius(settings.radius_c - 0.5, &settings).is_none());
        assert_eq!(speed_for_radius(settings.radius_c, &settings), Some(0.0));
    }

    #[test]
    fn test_ideal_speed_penalizes_misalignment() {
        let settings = PlannerSettings::default();
        let car = VehicleState::at_rest(Vector3::zeros(), Vector2::new(1.0, 0.0), Team::Blue);
        assert_relative_eq!(
            ideal_circle_speed(&car, &Vector2::new(1.0, 0.0), &settings),
            46.0
        );
        assert_relative_eq!(
            ideal_circle_speed(&car, &Vector2::new(-1.0, 0.0), &settings),
            15.0
        );
    }

    #[test]
    fn test_straight_line_uses_straight_path() {
        let settings = PlannerSettings::default();
        let car = VehicleState::at_rest(Vector3::zeros(), Vector2::new(1.0, 0.0), Team::Blue);
        let strike = StrikePoint::new(Vector2::new(100.0, 0.0), Vector2::new(1.0, 0.0), 4.0);
        let plan = plan_for_circle_turn(&car, &plot_for(&car, &settings), &strike, &settings);
        assert!(plan.arc.is_none());
        assert_eq!(plan.waypoint, strike.position);
        assert_eq!(plan.output.steer, 0.0);
    }

    #[test]
    fn test_tangent_point_geometry() {
        let settings = PlannerSettings::default();
        let car = VehicleState::at_rest(Vector3::zeros(), Vector2::new(1.0, 0.0), Team::Blue);
        let strike = StrikePoint::new(Vector2::new(60.0, 40.0), Vector2::new(0.0, -1.0), 4.0);
        let plan = plan_for_circle_turn(&car, &plot_for(&car, &settings), &strike, &settings);
        let arc = plan.arc.expect("expected a circular approach");

        assert_relative_eq!(
            (arc.tangent_point - arc.circle.center).norm(),
            arc.circle.radius,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            (strike.position - arc.circle.center).norm(),
            arc.circle.radius,
            epsilon = 1e-6
        );
        // the facing is tangent to the circle at the target
        assert_relative_eq!(
            (strike.position - arc.circle.center).dot(&strike.facing),
            0.0,
            epsilon = 1e-6
        );
        // the straight leg touches the circle rather than cutting through it
        assert_relative_eq!(
            (arc.tangent_point - arc.circle.center).dot(&(arc.tangent_point - car.flat_position())),
            0.0,
            epsilon = 1e-6
        );
        assert!(arc.clockwise);
        assert_eq!(plan.waypoint, arc.tangent_point);
    }

    #[test]
    fn test_tangent_point_direction_of_travel() {
        let circle = Circle::new(Vector2::new(0.0, 10.0), 5.0);
        let from = Vector2::zeros();
        let ccw = tangent_point(&circle, &from, false).unwrap();
        let cw = tangent_point(&circle, &from, true).unwrap();
        // counter-clockwise travel enters the circle on its right-hand side
        assert!(ccw.x > 0.0);
        assert!(cw.x < 0.0);
        assert!(tangent_point(&circle, &Vector2::new(0.0, 12.0), false).is_none());
    }

    #[test]
    fn test_inside_circle_tracks_circle() {
        let settings = PlannerSettings::default();
        let mut car = VehicleState::at_rest(
            Vector3::new(10.0, -10.0, 0.0),
            Vector2::new(0.0, 1.0),
            Team::Blue,
        );
        car.velocity = Vector3::new(0.0, 40.0, 0.0);
        car.boost = 0.0;
        let strike = StrikePoint::new(Vector2::new(0.0, 0.0), Vector2::new(-1.0, 0.0), 1.0);
        let plan = plan_for_circle_turn(&car, &plot_for(&car, &settings), &strike, &settings);
        let arc = plan.arc.expect("expected circle tracking");
        assert_eq!(arc.tangent_point, car.flat_position());
        // turning left toward the target
        assert!(plan.output.steer < 0.0);
        assert_relative_eq!(
            (car.flat_position() - arc.circle.center).norm(),
            arc.circle.radius,
            epsilon = 1e-6
        );
    }

    /// A car on the counter-clockwise circle of radius `turn_radius(ideal)` that
    /// ends at the origin facing -x, driving at `ratio` times the ideal speed.
    fn tracking(ideal: f64, ratio: f64, frame: u64) -> (VehicleState, StrikePoint, TurnPlan) {
        let settings = PlannerSettings::default();
        let radius = turn_radius(ideal, &settings.turn);
        let mut car = VehicleState::at_rest(
            Vector3::new(radius, -radius, 0.0),
            Vector2::new(0.0, 1.0),
            Team::Blue,
        );
        car.velocity = Vector3::new(0.0, ratio * ideal, 0.0);
        car.frame = frame;
        let strike = StrikePoint::new(Vector2::zeros(), Vector2::new(-1.0, 0.0), 1.0);
        let plan = plan_within_circle(&car, &strike, false, &settings);
        (car, strike, plan)
    }

    #[test]
    fn test_tracked_circle_matches_ideal_speed() {
        let (car, _, plan) = tracking(12.0, 1.0, 0);
        let arc = plan.arc.unwrap();
        assert_relative_eq!(arc.circle.center.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(arc.circle.center.y, -arc.circle.radius, epsilon = 1e-9);
        assert_relative_eq!(
            speed_for_radius(arc.circle.radius, &TurnSettings::default()).unwrap(),
            12.0,
            epsilon = 1e-6
        );
        assert_eq!(arc.tangent_point, car.flat_position());
        assert!(!arc.clockwise);
    }

    #[test]
    fn test_in_circle_boost_bands() {
        // (ideal speed, speed ratio, boost expected)
        let cases = [
            (12.0, 0.65, true),
            (12.0, 0.75, false),
            (12.0, 0.95, false),
            (40.0, 0.65, true),
            // 30 is above medium speed, so the 0.8 band applies
            (40.0, 0.75, true),
            (40.0, 0.85, false),
            (40.0, 1.3, false),
        ];
        for (ideal, ratio, boost) in cases {
            let (_, _, plan) = tracking(ideal, ratio, 1);
            assert_eq!(plan.output.boost, boost, "ideal {ideal} ratio {ratio}");
            assert_eq!(plan.output.throttle, 1.0, "ideal {ideal} ratio {ratio}");
        }
    }

    #[test]
    fn test_in_circle_boost_needs_fuel() {
        let settings = PlannerSettings::default();
        let (mut car, strike, _) = tracking(12.0, 0.5, 1);
        car.boost = 0.0;
        let plan = plan_within_circle(&car, &strike, false, &settings);
        assert!(!plan.output.boost);
    }

    #[test]
    fn test_in_circle_slide_pulses() {
        // (speed ratio, ticks between slide pulses, throttle)
        let cases = [
            (0.9, None, 1.0),
            (1.1, Some(12), 1.0),
            (1.3, Some(9), 1.0),
            (1.7, Some(6), 1.0),
            (1.95, Some(6), 1.0),
            (2.5, Some(3), 0.0),
        ];
        for (ratio, period, throttle) in cases {
            for frame in 0..40u64 {
                let (_, _, plan) = tracking(12.0, ratio, frame);
                let expected = period.is_some_and(|n: u64| frame % n == 0);
                assert_eq!(plan.output.slide, expected, "ratio {ratio} frame {frame}");
                assert_eq!(plan.output.throttle, throttle, "ratio {ratio} frame {frame}");
                assert!(!plan.output.boost);
            }
        }
    }
}
