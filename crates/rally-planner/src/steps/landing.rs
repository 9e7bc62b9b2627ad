use rally_core::{math::flatten, ControlOutput, Vector2};

use crate::{
    plan::{Step, StepCtx, StepProgress},
    steering::{orientation_error, orientation_output, OrientationTarget},
};

/// Heading to land with: along the car's flat velocity, else its flat nose.
fn landing_heading(ctx: &StepCtx<'_>) -> Vector2 {
    let car = ctx.car;
    car.flat_velocity()
        .try_normalize(1.0)
        .or_else(|| car.flat_nose().try_normalize(1e-6))
        .unwrap_or_else(Vector2::y)
}

/// Turn the wheels down while airborne so the car lands cleanly.
#[derive(Debug, Clone, Default)]
pub struct LandGracefullyStep {
    facing: Option<Vector2>,
}

impl LandGracefullyStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Land facing a particular direction instead of along the velocity.
    pub fn facing(facing: Vector2) -> Self {
        Self {
            facing: Some(facing),
        }
    }
}

impl Step for LandGracefullyStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        if ctx.car.has_wheel_contact {
            return StepProgress::Done;
        }
        let heading = self.facing.unwrap_or_else(|| landing_heading(ctx));
        let target = OrientationTarget::upright(&heading);
        StepProgress::Continue(
            orientation_output(ctx.car, &target, ctx.settings.aerial.orientation_gain)
                .with_throttle(1.0),
        )
    }

    fn can_interrupt(&self) -> bool {
        false
    }

    fn situation(&self) -> String {
        "Landing gracefully".to_string()
    }
}

/// Hold throttle and wait until the car is back on a surface.
#[derive(Debug, Clone, Default)]
pub struct LandMindlesslyStep;

impl Step for LandMindlesslyStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        let car = ctx.car;
        if (car.has_wheel_contact && car.position.z < 0.4) || ctx.arena.is_car_on_wall(car) {
            return StepProgress::Done;
        }
        StepProgress::Continue(ControlOutput::new().with_throttle(1.0))
    }

    fn situation(&self) -> String {
        "Waiting to land".to_string()
    }
}

/// Rotate in the air until the nose points at the ball, wheels down.
#[derive(Debug, Clone)]
pub struct OrientationStep {
    tolerance: f64,
    timeout: f64,
    until: Option<f64>,
}

impl OrientationStep {
    pub fn new(tolerance: f64, timeout: f64) -> Self {
        Self {
            tolerance,
            timeout,
            until: None,
        }
    }
}

impl Step for OrientationStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        let car = ctx.car;
        let until = *self.until.get_or_insert(ctx.input.time + self.timeout);
        if car.has_wheel_contact || ctx.input.time > until {
            return StepProgress::Done;
        }

        let to_ball = flatten(&(ctx.input.ball.position - car.position));
        let heading = to_ball.try_normalize(1e-6).unwrap_or_else(|| landing_heading(ctx));
        let target = OrientationTarget::upright(&heading);
        if orientation_error(car, &target) < self.tolerance {
            return StepProgress::Done;
        }
        StepProgress::Continue(orientation_output(
            car,
            &target,
            ctx.settings.aerial.orientation_gain,
        ))
    }

    fn can_interrupt(&self) -> bool {
        false
    }

    fn situation(&self) -> String {
        "Orienting toward the ball".to_string()
    }
}
