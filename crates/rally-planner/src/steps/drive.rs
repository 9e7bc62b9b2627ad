use rally_core::Vector2;

use crate::{
    acceleration::AccelerationModel,
    plan::{Step, StepCtx, StepProgress},
    routing::{
        circle_turn::{plan_for_circle_turn, TurnPlan},
        StrikePoint,
    },
    steering::{get_there_on_time, steer_toward_ground_position},
};

/// Drive to a point on the floor.
#[derive(Debug, Clone)]
pub struct SteerToPointStep {
    target: Vector2,
    tolerance: f64,
    arrival_time: Option<f64>,
}

impl SteerToPointStep {
    pub fn new(target: Vector2) -> Self {
        Self {
            target,
            tolerance: 3.0,
            arrival_time: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Pace the drive to arrive at the given game time.
    pub fn arriving_at(mut self, time: f64) -> Self {
        self.arrival_time = Some(time);
        self
    }
}

impl Step for SteerToPointStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        let car = ctx.car;
        if (self.target - car.flat_position()).norm() < self.tolerance {
            return StepProgress::Done;
        }
        let output = match self.arrival_time {
            Some(time) => get_there_on_time(car, &self.target, time, &ctx.settings.turn),
            None => steer_toward_ground_position(car, &self.target, &ctx.settings.turn),
        };
        StepProgress::Continue(output)
    }

    fn situation(&self) -> String {
        format!("Driving to ({:.0}, {:.0})", self.target.x, self.target.y)
    }
}

/// Approach a strike point along a turning circle so the car arrives facing the
/// right way.
#[derive(Debug, Clone)]
pub struct CircleTurnStep {
    strike_point: StrikePoint,
    tolerance: f64,
    last_plan: Option<TurnPlan>,
}

impl CircleTurnStep {
    pub fn new(strike_point: StrikePoint) -> Self {
        Self {
            strike_point,
            tolerance: 2.0,
            last_plan: None,
        }
    }

    pub fn last_plan(&self) -> Option<&TurnPlan> {
        self.last_plan.as_ref()
    }
}

impl Step for CircleTurnStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        let car = ctx.car;
        if (self.strike_point.position - car.flat_position()).norm() < self.tolerance {
            return StepProgress::Done;
        }
        if ctx.input.time > self.strike_point.time + 0.5 {
            ctx.log.println("Circle turn ran out of time");
            return StepProgress::Done;
        }
        if !car.has_wheel_contact {
            return StepProgress::Done;
        }

        let plot = AccelerationModel::new(&ctx.settings.acceleration)
            .for_car(car, ctx.settings.arena.horizon);
        let plan = plan_for_circle_turn(car, &plot, &self.strike_point, ctx.settings);
        self.last_plan = Some(plan);
        StepProgress::Continue(plan.output)
    }

    fn situation(&self) -> String {
        match self.last_plan.as_ref().and_then(|p| p.arc) {
            Some(arc) => format!(
                "Circle turn, {:.0} deg {}",
                arc.sweep.to_degrees(),
                if arc.clockwise { "cw" } else { "ccw" }
            ),
            None => "Straight approach".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::tests::Fixture;
    use rally_core::{BallState, Team, VehicleState, Vector3};

    #[test]
    fn test_steer_to_point_finishes_at_target() {
        let fixture = Fixture::default_scene();
        let mut step = SteerToPointStep::new(Vector2::new(0.0, -29.0));
        assert!(matches!(step.update(&fixture.ctx()), StepProgress::Done));

        let mut far = SteerToPointStep::new(Vector2::new(20.0, 0.0));
        match far.update(&fixture.ctx()) {
            StepProgress::Continue(output) => assert!(output.steer > 0.0),
            StepProgress::Done => panic!("target is far away"),
        }
    }

    #[test]
    fn test_circle_turn_reports_arc() {
        let fixture = Fixture::new(
            VehicleState::at_rest(Vector3::new(0.0, 0.0, 0.34), Vector2::new(1.0, 0.0), Team::Blue),
            BallState::new(Vector3::new(0.0, 50.0, 1.8555), Vector3::zeros(), 0.0),
        );
        let mut step = CircleTurnStep::new(StrikePoint::new(
            Vector2::new(60.0, 40.0),
            Vector2::new(0.0, -1.0),
            4.0,
        ));
        assert!(matches!(step.update(&fixture.ctx()), StepProgress::Continue(_)));
        assert!(step.last_plan().and_then(|p| p.arc).is_some());
        assert!(step.situation().ends_with(" cw"));
    }

    #[test]
    fn test_circle_turn_gives_up_when_late() {
        let mut fixture = Fixture::default_scene();
        let mut step = CircleTurnStep::new(StrikePoint::new(
            Vector2::new(30.0, 30.0),
            Vector2::new(0.0, 1.0),
            0.2,
        ));
        fixture.advance(1.0);
        assert!(matches!(step.update(&fixture.ctx()), StepProgress::Done));
    }
}
