use rally_core::{math::flatten, GameSnapshot, PlannerSettings, VehicleState};
use rally_physics::{BallPath, TrajectorySample};
use serde::Serialize;

use super::KickStrategy;
use crate::{
    acceleration::{DistancePlot, DistanceTimeSpeed},
    routing::StrikePoint,
    strike::StrikeProfile,
};

/// The earliest ball contact reachable by driving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundIntercept {
    /// The ball at the moment of contact.
    pub ball: TrajectorySample,
    /// Where the car should be, facing the kick direction, when the strike starts.
    pub strike_point: StrikePoint,
    pub profile: StrikeProfile,
    /// Car travel when it reaches the strike point.
    pub arrival: DistanceTimeSpeed,
}

/// Search the ball path for the earliest moment the car can meet the ball on the
/// ground with a usable approach, then refine the time by bisection.
pub fn ground_intercept(
    car: &VehicleState,
    ball_path: &BallPath,
    plot: &DistancePlot,
    strategy: &dyn KickStrategy,
    input: &GameSnapshot,
    settings: &PlannerSettings,
) -> Option<GroundIntercept> {
    let evaluate = |sample: &TrajectorySample| {
        evaluate_sample(car, sample, plot, strategy, input, settings)
    };

    let mut infeasible_time = car.time;
    for sample in ball_path.samples_after(car.time) {
        let Some(mut best) = evaluate(sample) else {
            infeasible_time = sample.time;
            continue;
        };

        let mut feasible_time = sample.time;
        for _ in 0..settings.intercept.refine_iterations {
            let mid = 0.5 * (infeasible_time + feasible_time);
            let candidate = ball_path.motion_at(mid).ok().and_then(|s| evaluate(&s));
            match candidate {
                Some(found) => {
                    best = found;
                    feasible_time = mid;
                }
                None => infeasible_time = mid,
            }
        }
        log::debug!(
            "Ground intercept at t={:.2} ({:?})",
            best.ball.time,
            best.profile.style
        );
        return Some(best);
    }
    None
}

fn evaluate_sample(
    car: &VehicleState,
    sample: &TrajectorySample,
    plot: &DistancePlot,
    strategy: &dyn KickStrategy,
    input: &GameSnapshot,
    settings: &PlannerSettings,
) -> Option<GroundIntercept> {
    let profile = StrikeProfile::for_ground_height(
        sample.position.z,
        &settings.strike,
        settings.arena.gravity,
    )?;
    if !strategy.looks_viable(car, &sample.position) {
        return None;
    }

    let easy_kick = sample.position - car.position;
    let kick = strategy.kick_direction(input, &sample.position, Some(&easy_kick));
    let facing = flatten(&kick).try_normalize(1e-9)?;
    let position = flatten(&sample.position) - facing * settings.strike.reach;

    let available = sample.time - car.time - profile.strike_duration - settings.intercept.spare_time;
    let arrival = plot.motion_at(available)?;
    let distance = (position - car.flat_position()).norm();
    if arrival.distance < distance {
        return None;
    }

    Some(GroundIntercept {
        ball: *sample,
        strike_point: StrikePoint::new(position, facing, sample.time - profile.strike_duration),
        profile,
        arrival,
    })
}
