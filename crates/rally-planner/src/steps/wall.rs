use rally_core::{math::flatten, Vector3};

use crate::{
    plan::{Step, StepCtx, StepProgress},
    steering::{steer_toward_ground_position, steer_toward_wall_position},
};

/// How close to a wall the ball must be for wall play.
const BALL_ON_WALL_DISTANCE: f64 = 10.0;

/// Whether the ball is hugging a wall above jump height.
pub(crate) fn ball_is_on_wall(ctx: &StepCtx<'_>) -> bool {
    let ball = &ctx.input.ball.position;
    ctx.arena.distance_from_wall(ball) < BALL_ON_WALL_DISTANCE
        && ball.z > ctx.settings.strike.max_jump_hit_height
}

/// Drive up the wall the ball is on.
#[derive(Debug, Clone, Default)]
pub struct MountWallStep;

impl Step for MountWallStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        let car = ctx.car;
        if ctx.arena.is_car_on_wall(car) {
            return StepProgress::Done;
        }
        if !ball_is_on_wall(ctx) {
            ctx.log.println("Ball left the wall before we got there");
            return StepProgress::Done;
        }

        let ball = ctx.input.ball.position;
        let wall = ctx.arena.nearest_wall(&ball);
        let mut base = wall.project(&ball);
        base.z = 0.0;
        // aim past the wall line so the car keeps driving into the curve
        let target = flatten(&(base - wall.normal * 5.0));
        let output = steer_toward_ground_position(car, &target, &ctx.settings.turn);
        StepProgress::Continue(output.with_boost(output.steer.abs() < 0.2 && car.boost > 0.0))
    }

    fn situation(&self) -> String {
        "Mounting the wall".to_string()
    }
}

/// Chase the ball while driving on a wall.
#[derive(Debug, Clone, Default)]
pub struct WallTraverseStep;

impl Step for WallTraverseStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        if !ctx.arena.is_car_on_wall(ctx.car) || !ball_is_on_wall(ctx) {
            return StepProgress::Done;
        }
        let ball = ctx.input.ball.position;
        StepProgress::Continue(steer_toward_wall_position(ctx.car, &ball, &ctx.settings.turn))
    }

    fn situation(&self) -> String {
        "Driving on the wall".to_string()
    }
}

/// Drive straight down to the floor.
#[derive(Debug, Clone, Default)]
pub struct DescendFromWallStep;

impl Step for DescendFromWallStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        let car = ctx.car;
        if !ctx.arena.is_car_on_wall(car) {
            return StepProgress::Done;
        }
        let wall = ctx.arena.nearest_wall(&car.position);
        let below = wall.project(&car.position);
        let target = Vector3::new(below.x, below.y, 0.0) + wall.normal * 20.0;
        StepProgress::Continue(steer_toward_wall_position(car, &target, &ctx.settings.turn))
    }

    fn can_interrupt(&self) -> bool {
        false
    }

    fn situation(&self) -> String {
        "Descending wall".to_string()
    }
}
