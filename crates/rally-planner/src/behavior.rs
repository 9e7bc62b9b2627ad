use rally_core::Vector3;

use crate::{
    intercept::{aerial_intercept, KickAtEnemyGoal, KickAwayFromOwnGoal, KickStrategy},
    plan::{Plan, Posture, StepCtx},
    steps::{
        ball_is_on_wall, AerialStrikeStep, DescendFromWallStep, GroundStrikeStep,
        LandGracefullyStep, MountWallStep, OrientationStep, WallTraverseStep,
    },
};

const AERIAL_LABEL: &str = "Aerial strike";
/// Height above which the car reorients toward the ball before landing.
const REORIENT_HEIGHT: f64 = 10.0;

/// Decides which plan the bot should be running.
pub trait Behavior: Send {
    /// Propose a plan for this tick, given the one currently held by the bot.
    ///
    /// The bot only accepts the proposal if the current plan yields to its posture.
    fn choose_plan(&mut self, ctx: &StepCtx<'_>, current: Option<&Plan>) -> Option<Plan>;
}

/// Chase the ball: strike it toward the enemy goal, clear it from our half, take to
/// the air or the walls when that is where the ball is.
#[derive(Debug, Clone, Default)]
pub struct ChaseBehavior;

impl ChaseBehavior {
    pub fn new() -> Self {
        Self
    }
}

/// Whether proposing a plan with `posture` is worth it.
fn wants(current: Option<&Plan>, posture: Posture) -> bool {
    match current {
        None => true,
        Some(plan) => plan.is_complete() || posture > plan.posture(),
    }
}

impl Behavior for ChaseBehavior {
    fn choose_plan(&mut self, ctx: &StepCtx<'_>, current: Option<&Plan>) -> Option<Plan> {
        let car = ctx.car;
        let on_wall = ctx.arena.is_car_on_wall(car);

        if !car.has_wheel_contact && !on_wall {
            if !wants(current, Posture::Landing) {
                return None;
            }
            let mut plan = Plan::new(Posture::Landing).with_label("Landing");
            if car.position.z > REORIENT_HEIGHT {
                plan = plan.with_step(OrientationStep::new(0.3, 1.0));
            }
            return Some(plan.with_step(LandGracefullyStep::new()));
        }

        let ball_on_wall = ball_is_on_wall(ctx);
        if on_wall && !ball_on_wall {
            return wants(current, Posture::Neutral).then(|| {
                Plan::new(Posture::Neutral)
                    .with_label("Leaving the wall")
                    .with_step(DescendFromWallStep)
            });
        }

        let enemy_goal_kick = KickAtEnemyGoal::new(ctx.settings);
        if wants(current, Posture::Offensive) {
            let ball = ctx.input.ball.position;
            let kick = enemy_goal_kick.kick_direction(ctx.input, &ball, None);
            let offset = kick
                .try_normalize(1e-9)
                .map(|dir| -dir * ctx.settings.aerial.offset_magnitude)
                .unwrap_or_else(Vector3::zeros);
            if let Some(intercept) = aerial_intercept(car, ctx.ball_path, &offset, 0.0, ctx.settings) {
                ctx.log.println(format!(
                    "Aerial looks possible at t={:.2} z={:.1}",
                    intercept.time, intercept.position.z
                ));
                return Some(
                    Plan::new(Posture::Offensive)
                        .with_label(AERIAL_LABEL)
                        .with_step(AerialStrikeStep::new(Box::new(enemy_goal_kick), 0.0)),
                );
            }
        }

        if ball_on_wall {
            return wants(current, Posture::Neutral).then(|| {
                Plan::new(Posture::Neutral)
                    .with_label("Wall play")
                    .with_step(MountWallStep)
                    .with_step(WallTraverseStep)
                    .with_step(DescendFromWallStep)
            });
        }

        let ball_on_our_half = ctx.input.ball.position.y * ctx.input.team.attack_sign() < 0.0;
        if ball_on_our_half {
            return wants(current, Posture::Defensive).then(|| {
                Plan::new(Posture::Defensive)
                    .with_label("Clearing")
                    .with_step(GroundStrikeStep::new(Box::new(KickAwayFromOwnGoal::new(
                        ctx.settings,
                    ))))
            });
        }

        wants(current, Posture::Offensive).then(|| {
            Plan::new(Posture::Offensive)
                .with_label("Shooting")
                .with_step(GroundStrikeStep::new(Box::new(enemy_goal_kick)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::tests::{CountdownStep, Fixture};
    use rally_core::{BallState, CarOrientation, Team, Vector2, VehicleState};

    fn choose(fixture: &Fixture, current: Option<&Plan>) -> Option<Plan> {
        ChaseBehavior::new().choose_plan(&fixture.ctx(), current)
    }

    #[test]
    fn test_shoots_from_kickoff_position() {
        let fixture = Fixture::default_scene();
        let plan = choose(&fixture, None).unwrap();
        assert_eq!(plan.posture(), Posture::Offensive);
        assert_eq!(plan.label(), Some("Shooting"));
    }

    #[test]
    fn test_clears_ball_on_own_half() {
        let fixture = Fixture::new(
            VehicleState::at_rest(Vector3::new(0.0, -60.0, 0.34), Vector2::y(), Team::Blue),
            BallState::new(Vector3::new(10.0, -30.0, 1.8555), Vector3::zeros(), 0.0),
        );
        let plan = choose(&fixture, None).unwrap();
        assert_eq!(plan.posture(), Posture::Defensive);
    }

    #[test]
    fn test_lands_when_airborne() {
        let mut car = VehicleState::at_rest(Vector3::new(0.0, -30.0, 15.0), Vector2::y(), Team::Blue);
        car.has_wheel_contact = false;
        let fixture = Fixture::new(car, BallState::new(Vector3::new(0.0, 0.0, 1.8555), Vector3::zeros(), 0.0));
        let plan = choose(&fixture, None).unwrap();
        assert_eq!(plan.posture(), Posture::Landing);
        assert_eq!(plan.situation(), "Landing: Orienting toward the ball");
    }

    #[test]
    fn test_descends_from_wall() {
        let mut car = VehicleState::at_rest(Vector3::new(73.6, 0.0, 10.0), Vector2::y(), Team::Blue);
        car.orientation =
            CarOrientation::from_nose_and_roof(Vector3::new(0.0, 0.0, 1.0), Vector3::new(-1.0, 0.0, 0.0));
        let fixture = Fixture::new(car, BallState::new(Vector3::new(0.0, 0.0, 1.8555), Vector3::zeros(), 0.0));
        let plan = choose(&fixture, None).unwrap();
        assert_eq!(plan.label(), Some("Leaving the wall"));
    }

    #[test]
    fn test_keeps_quiet_while_equal_plan_runs() {
        let fixture = Fixture::default_scene();
        let running = Plan::new(Posture::Offensive).with_step(CountdownStep {
            ticks: 10,
            interruptible: true,
        });
        assert!(choose(&fixture, Some(&running)).is_none());

        let lower = Plan::new(Posture::Neutral).with_step(CountdownStep {
            ticks: 10,
            interruptible: true,
        });
        assert!(choose(&fixture, Some(&lower)).is_some());
    }

    fn high_ball_scene() -> Fixture {
        Fixture::new(
            VehicleState::at_rest(Vector3::new(0.0, -10.0, 0.34), Vector2::y(), Team::Blue),
            BallState::new(Vector3::new(0.0, 10.0, 20.0), Vector3::new(0.0, 0.0, 8.0), 0.0),
        )
    }

    #[test]
    fn test_goes_up_for_high_ball() {
        let fixture = high_ball_scene();
        let plan = choose(&fixture, None).unwrap();
        assert_eq!(plan.label(), Some(AERIAL_LABEL));
        assert_eq!(plan.posture(), Posture::Offensive);
        assert!(fixture.log.take()[0].starts_with("Aerial looks possible"));
    }

    #[test]
    fn test_aerial_stays_quiet_behind_stronger_plan() {
        let fixture = high_ball_scene();
        for posture in [Posture::Offensive, Posture::Defensive] {
            let running = Plan::new(posture).with_step(CountdownStep {
                ticks: 10,
                interruptible: true,
            });
            assert!(choose(&fixture, Some(&running)).is_none());
            assert!(fixture.log.take().is_empty());
        }
    }
}
