use std::f64::consts::PI;

use rally_core::{
    math::flatten, settings::ArenaSettings, Angle, GameSnapshot, Goal, PlannerSettings,
    VehicleState, Vector3,
};

/// Decides which way the ball should leave the car.
pub trait KickStrategy: Send {
    /// Desired ball direction after contact at `ball_position`.
    ///
    /// `easy_kick` is the direction the ball would take if the car drove straight
    /// through it; strategies return it when it already serves them.
    fn kick_direction(
        &self,
        input: &GameSnapshot,
        ball_position: &Vector3,
        easy_kick: Option<&Vector3>,
    ) -> Vector3;

    /// Whether the car can usefully touch the ball at `ball_position` at all.
    fn looks_viable(&self, car: &VehicleState, ball_position: &Vector3) -> bool;

    fn name(&self) -> &'static str;
}

/// Always kick in the same direction.
#[derive(Debug, Clone)]
pub struct FixedDirection {
    direction: Vector3,
}

impl FixedDirection {
    pub fn new(direction: Vector3) -> Self {
        Self { direction }
    }
}

impl KickStrategy for FixedDirection {
    fn kick_direction(&self, _: &GameSnapshot, _: &Vector3, _: Option<&Vector3>) -> Vector3 {
        self.direction
    }

    fn looks_viable(&self, _: &VehicleState, _: &Vector3) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "fixed direction"
    }
}

/// Aim between the posts of the goal we attack.
#[derive(Debug, Clone)]
pub struct KickAtEnemyGoal {
    arena: ArenaSettings,
    padding: f64,
}

impl KickAtEnemyGoal {
    pub fn new(settings: &PlannerSettings) -> Self {
        Self {
            arena: settings.arena.clone(),
            padding: settings.intercept.goal_padding,
        }
    }
}

impl KickStrategy for KickAtEnemyGoal {
    fn kick_direction(
        &self,
        input: &GameSnapshot,
        ball_position: &Vector3,
        easy_kick: Option<&Vector3>,
    ) -> Vector3 {
        let goal = Goal::enemy(input.team, &self.arena);
        if let Some(easy) = easy_kick {
            if goal.is_in_frame(ball_position, &flatten(easy)) {
                return *easy;
            }
        }
        let target = goal.nearest_entrance(ball_position, self.padding);
        let direction = target - ball_position;
        Vector3::new(direction.x, direction.y, 0.0)
    }

    fn looks_viable(&self, car: &VehicleState, ball_position: &Vector3) -> bool {
        let goal = Goal::enemy(car.team, &self.arena);
        let approach = flatten(&(ball_position - car.position));
        let kick = goal.flat_center() - flatten(ball_position);
        Angle::correction(&approach, &kick).abs() < 2.0 * PI / 3.0
    }

    fn name(&self) -> &'static str {
        "kick at enemy goal"
    }
}

/// Send the ball anywhere away from our own goal.
#[derive(Debug, Clone)]
pub struct KickAwayFromOwnGoal {
    arena: ArenaSettings,
}

impl KickAwayFromOwnGoal {
    pub fn new(settings: &PlannerSettings) -> Self {
        Self {
            arena: settings.arena.clone(),
        }
    }
}

impl KickStrategy for KickAwayFromOwnGoal {
    fn kick_direction(
        &self,
        input: &GameSnapshot,
        ball_position: &Vector3,
        easy_kick: Option<&Vector3>,
    ) -> Vector3 {
        let goal = Goal::own(input.team, &self.arena);
        let away = flatten(ball_position) - goal.flat_center();
        if let Some(easy) = easy_kick {
            if flatten(easy).dot(&away) > 0.0 {
                return *easy;
            }
        }
        Vector3::new(away.x, away.y, 0.0)
    }

    fn looks_viable(&self, _: &VehicleState, _: &Vector3) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "kick away from own goal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rally_core::{BallState, Team, Vector2};

    fn snapshot(car: VehicleState, ball: Vector3) -> GameSnapshot {
        GameSnapshot {
            time: 0.0,
            frame: 0,
            team: Team::Blue,
            player_index: 0,
            cars: vec![car],
            ball: BallState::new(ball, Vector3::zeros(), 0.0),
        }
    }

    #[test]
    fn test_enemy_goal_prefers_easy_kick_in_frame() {
        let settings = PlannerSettings::default();
        let strategy = KickAtEnemyGoal::new(&settings);
        let ball = Vector3::new(0.0, 50.0, 1.86);
        let car = VehicleState::at_rest(Vector3::new(0.0, 40.0, 0.34), Vector2::y(), Team::Blue);
        let input = snapshot(car, ball);

        let easy = Vector3::new(0.1, 1.0, 0.0);
        assert_eq!(strategy.kick_direction(&input, &ball, Some(&easy)), easy);

        let wide = Vector3::new(1.0, 0.2, 0.0);
        let aimed = strategy.kick_direction(&input, &ball, Some(&wide));
        assert!(aimed.y > 0.0);
        assert!(aimed.x.abs() < aimed.y);
    }

    #[test]
    fn test_enemy_goal_viability() {
        let strategy = KickAtEnemyGoal::new(&PlannerSettings::default());
        let ball = Vector3::new(0.0, 0.0, 1.86);
        let behind = VehicleState::at_rest(Vector3::new(0.0, -20.0, 0.34), Vector2::y(), Team::Blue);
        let in_front = VehicleState::at_rest(Vector3::new(0.0, 20.0, 0.34), -Vector2::y(), Team::Blue);
        assert!(strategy.looks_viable(&behind, &ball));
        assert!(!strategy.looks_viable(&in_front, &ball));
    }

    #[test]
    fn test_clearance_rejects_own_goal_direction() {
        let settings = PlannerSettings::default();
        let strategy = KickAwayFromOwnGoal::new(&settings);
        let ball = Vector3::new(10.0, -60.0, 1.86);
        let car = VehicleState::at_rest(Vector3::new(10.0, -40.0, 0.34), -Vector2::y(), Team::Blue);
        let input = snapshot(car, ball);

        let toward_own_goal = Vector3::new(0.0, -1.0, 0.0);
        let kick = strategy.kick_direction(&input, &ball, Some(&toward_own_goal));
        assert!(kick.y > 0.0);

        let sideways_out = Vector3::new(1.0, 0.5, 0.0);
        assert_eq!(strategy.kick_direction(&input, &ball, Some(&sideways_out)), sideways_out);
    }
}
