use rally_core::{math::flatten, Angle, ControlOutput, Goal, Vector3};

use super::{set_pieces, TapStep};
use crate::{
    intercept::{aerial_height_error, aerial_intercept, nose_pitch_for_height, KickStrategy, SpaceTime},
    plan::{Plan, Posture, Step, StepCtx, StepProgress},
    steering::{orientation_output, OrientationTarget},
};

/// Distance to the enemy goal beyond which the ball is hit from slightly below.
const LONG_SHOT_DISTANCE: f64 = 110.0;

/// Fly to the ball with boost and hit it toward the kick direction.
///
/// The intercept is searched again every tick from the current car state. Too many
/// consecutive failed searches end in a recovery front flip.
pub struct AerialStrikeStep {
    strategy: Box<dyn KickStrategy>,
    time_in_air_at_start: f64,
    launch_time: Option<f64>,
    last_moment_for_dodge: Option<f64>,
    intercept: Option<SpaceTime>,
    confusion: u32,
    nested: Option<Plan>,
}

impl AerialStrikeStep {
    /// `time_in_air_at_start` is how long the car has already been flying; zero when
    /// taking off from the ground.
    pub fn new(strategy: Box<dyn KickStrategy>, time_in_air_at_start: f64) -> Self {
        Self {
            strategy,
            time_in_air_at_start,
            launch_time: None,
            last_moment_for_dodge: None,
            intercept: None,
            confusion: 0,
            nested: None,
        }
    }

    /// Where to touch the ball relative to its center.
    fn offset(&self, ctx: &StepCtx<'_>) -> Vector3 {
        let magnitude = ctx.settings.aerial.offset_magnitude;
        let ball = self
            .intercept
            .map(|i| i.position)
            .unwrap_or(ctx.input.ball.position);
        let kick = self.strategy.kick_direction(ctx.input, &ball, None);
        let Some(kick) = kick.try_normalize(1e-9) else {
            return Vector3::new(0.0, 0.0, -magnitude);
        };
        let mut offset = -kick * magnitude;
        let goal = Goal::enemy(ctx.input.team, &ctx.settings.arena);
        if (goal.center - ball).norm() > LONG_SHOT_DISTANCE {
            offset.z = -0.2;
        }
        offset
    }

    fn start_nested(&mut self, ctx: &StepCtx<'_>, mut plan: Plan) -> StepProgress {
        plan.begin();
        let progress = match plan.get_output(ctx) {
            Some(output) => StepProgress::Continue(output),
            None => StepProgress::Done,
        };
        self.nested = Some(plan);
        progress
    }
}

/// Point the nose along the contact offset in the last moments, but only when the
/// car is on course to pass above the contact point and that point is on the upper
/// half of the ball.
fn points_nose_at_contact(finesse: bool, height_error: f64, offset: &Vector3) -> bool {
    finesse && height_error > 0.0 && offset.z > 0.0
}

impl Step for AerialStrikeStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        if let Some(plan) = self.nested.as_mut() {
            return match plan.get_output(ctx) {
                Some(output) => StepProgress::Continue(output),
                None => StepProgress::Done,
            };
        }

        let aerial = &ctx.settings.aerial;
        let car = ctx.car;
        let now = ctx.input.time;
        let launch = *self
            .launch_time
            .get_or_insert(now - self.time_in_air_at_start);
        let seconds_so_far = now - launch;
        let last_dodge = *self
            .last_moment_for_dodge
            .get_or_insert(launch + aerial.max_time_for_dodge);

        if car.has_wheel_contact && seconds_so_far > 0.3 {
            ctx.log.println("Aerial ended on the ground");
            return StepProgress::Done;
        }

        let offset = self.offset(ctx);
        let Some(intercept) = aerial_intercept(car, ctx.ball_path, &offset, seconds_so_far, ctx.settings)
        else {
            self.confusion += 1;
            if self.confusion > aerial.confusion_limit {
                ctx.log.println("Aerial search exhausted, recovering with a front flip");
                let recovery = Plan::new(Posture::Neutral)
                    .with_label("Recovery flip")
                    .with_step(TapStep::new(2, ControlOutput::new().with_pitch(-1.0).with_jump(true)))
                    .unstoppable();
                return self.start_nested(ctx, recovery);
            }
            return StepProgress::Continue(
                ControlOutput::new()
                    .with_boost(true)
                    .with_jump(seconds_so_far < aerial.jump_assist_seconds),
            );
        };
        self.confusion = 0;
        self.intercept = Some(intercept);

        let to_intercept = intercept.position - car.position;
        let seconds_till = intercept.time - now;

        if now < last_dodge && to_intercept.norm() < aerial.dodge_distance {
            let correction = Angle::correction(&car.flat_nose(), &flatten(&to_intercept));
            let direction = if correction.abs() <= aerial.side_dodge_threshold {
                ControlOutput::new().with_pitch(-1.0)
            } else {
                // positive correction means the ball is to the left
                ControlOutput::new().with_yaw(-correction.signum())
            };
            ctx.log.println("Dodging into the ball");
            return self.start_nested(ctx, set_pieces::air_dodge(Posture::Offensive, direction));
        }

        let alignment = match (to_intercept.try_normalize(1e-6), car.velocity.try_normalize(1e-6)) {
            (Some(a), Some(b)) => a.dot(&b),
            _ => 1.0,
        };
        if (seconds_till > aerial.dodge_time
            && seconds_so_far > 2.0
            && alignment < aerial.min_approach_alignment)
            || alignment < 0.0
        {
            ctx.log.println("Failed aerial on bad angle");
            return StepProgress::Done;
        }

        let height_error = aerial_height_error(
            car,
            intercept.position.z,
            seconds_till,
            car.orientation.nose.z.clamp(-1.0, 1.0).asin(),
            seconds_so_far,
            ctx.settings,
        );
        let finesse = seconds_till < aerial.nose_finesse_seconds && intercept.time > last_dodge;
        let desired_nose = if points_nose_at_contact(finesse, height_error, &offset) {
            -offset.normalize()
        } else {
            let flat = flatten(&to_intercept);
            let flat_velocity = car.flat_velocity();
            let overcorrect = Angle::correction(&flat_velocity, &flat) * aerial.yaw_overcorrect;
            let heading = (overcorrect * flat).try_normalize(1e-6).unwrap_or_else(|| car.flat_nose());
            let pitch = nose_pitch_for_height(
                car,
                intercept.position.z,
                seconds_till,
                seconds_so_far,
                ctx.settings,
            )
            .unwrap_or(if to_intercept.z > 0.0 { 1.2 } else { 0.0 });
            Vector3::new(heading.x * pitch.cos(), heading.y * pitch.cos(), pitch.sin())
        };

        let target = OrientationTarget::new(desired_nose, Vector3::z());
        StepProgress::Continue(
            orientation_output(car, &target, aerial.orientation_gain)
                .with_boost(true)
                .with_jump(seconds_so_far < aerial.jump_assist_seconds),
        )
    }

    fn can_interrupt(&self) -> bool {
        false
    }

    fn situation(&self) -> String {
        match (&self.nested, &self.intercept) {
            (Some(plan), _) => plan.situation(),
            (None, Some(intercept)) => format!("Aerial to t={:.2}", intercept.time),
            (None, None) => "Aerial searching".to_string(),
        }
    }
}
