use rally_core::Angle;
use rally_physics::DisruptionMeter;

use super::set_pieces;
use crate::{
    acceleration::AccelerationModel,
    intercept::{ground_intercept, GroundIntercept, KickStrategy},
    plan::{Plan, Posture, Step, StepCtx, StepProgress},
    routing::circle_turn::plan_for_circle_turn,
    strike::StrikeStyle,
};

/// Distance to the ball under which the strike winds down.
const CONTACT_DISTANCE: f64 = 4.5;
/// Time the step keeps driving after reaching the ball.
const FOLLOW_THROUGH_SECONDS: f64 = 0.2;
/// Largest nose error at which a dodge is launched.
const LAUNCH_ALIGNMENT: f64 = 0.3;

/// Hit the ball from the ground in the direction chosen by a kick strategy.
///
/// Every tick the intercept is searched again and the car follows a turning
/// circle to the strike point. When the strike needs a dodge, the step launches a
/// nested flip plan and finishes with it.
pub struct GroundStrikeStep {
    strategy: Box<dyn KickStrategy>,
    flip: Option<Plan>,
    done_moment: Option<f64>,
    disruption: Option<DisruptionMeter>,
    intercept: Option<GroundIntercept>,
}

impl GroundStrikeStep {
    pub fn new(strategy: Box<dyn KickStrategy>) -> Self {
        Self {
            strategy,
            flip: None,
            done_moment: None,
            disruption: None,
            intercept: None,
        }
    }

    fn launch(&mut self, ctx: &StepCtx<'_>, intercept: &GroundIntercept) -> StepProgress {
        let mut flip = match intercept.profile.style {
            StrikeStyle::JumpHit => set_pieces::jump_hit(
                Posture::Offensive,
                (intercept.profile.strike_duration - 0.1).clamp(0.05, 0.2),
            ),
            _ => set_pieces::front_flip(Posture::Offensive),
        };
        ctx.log.println(format!(
            "Launching {:?} at t={:.2}",
            intercept.profile.style, intercept.ball.time
        ));
        flip.begin();
        let progress = match flip.get_output(ctx) {
            Some(output) => StepProgress::Continue(output),
            None => StepProgress::Done,
        };
        self.flip = Some(flip);
        progress
    }
}

impl Step for GroundStrikeStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        if let Some(flip) = self.flip.as_mut() {
            return match flip.get_output(ctx) {
                Some(output) => StepProgress::Continue(output),
                None => StepProgress::Done,
            };
        }

        let car = ctx.car;
        let now = ctx.input.time;
        if self.done_moment.is_some_and(|done| now > done) {
            return StepProgress::Done;
        }
        if ctx.arena.is_car_on_wall(car) {
            ctx.log.println("Failed ground strike because we are on the wall");
            return StepProgress::Done;
        }
        if !car.has_wheel_contact {
            return StepProgress::Done;
        }

        let threshold = ctx.settings.intercept.disruption_threshold;
        let meter = self
            .disruption
            .get_or_insert_with(|| DisruptionMeter::new(threshold));
        if meter.is_disrupted(ctx.ball_path) {
            ctx.log.println("Ball path disrupted, abandoning strike");
            return StepProgress::Done;
        }

        if self.done_moment.is_none()
            && (car.position - ctx.input.ball.position).norm() < CONTACT_DISTANCE
        {
            self.done_moment = Some(now + FOLLOW_THROUGH_SECONDS);
        }

        let plot = AccelerationModel::new(&ctx.settings.acceleration)
            .for_car(car, ctx.settings.arena.horizon);
        let Some(intercept) = ground_intercept(
            car,
            ctx.ball_path,
            &plot,
            self.strategy.as_ref(),
            ctx.input,
            ctx.settings,
        ) else {
            ctx.log.println(format!("No ground intercept for {}", self.strategy.name()));
            return StepProgress::Done;
        };
        self.intercept = Some(intercept);

        let seconds_till_strike = intercept.strike_point.time - now;
        let nose_error = Angle::correction(&car.flat_nose(), &intercept.strike_point.facing).abs();
        let distance = (intercept.strike_point.position - car.flat_position()).norm();
        if intercept.profile.style != StrikeStyle::Chip
            && seconds_till_strike <= 0.05
            && nose_error < LAUNCH_ALIGNMENT
            && distance < CONTACT_DISTANCE
        {
            return self.launch(ctx, &intercept);
        }

        let turn = plan_for_circle_turn(car, &plot, &intercept.strike_point, ctx.settings);
        StepProgress::Continue(turn.output)
    }

    fn can_interrupt(&self) -> bool {
        self.flip.is_none()
    }

    fn situation(&self) -> String {
        match (&self.flip, &self.intercept) {
            (Some(flip), _) => flip.situation(),
            (None, Some(intercept)) => format!(
                "Striking ({}) at t={:.2}",
                self.strategy.name(),
                intercept.ball.time
            ),
            (None, None) => format!("Striking ({})", self.strategy.name()),
        }
    }
}
