use crate::{settings::ArenaSettings, Team, Vector2, Vector3};

/// Half width of a goal mouth.
pub const GOAL_HALF_WIDTH: f64 = 17.8;
/// Height of the crossbar.
pub const GOAL_HEIGHT: f64 = 12.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub center: Vector3,
    pub half_width: f64,
}

impl Goal {
    /// The goal `team` defends.
    pub fn own(team: Team, arena: &ArenaSettings) -> Self {
        Self::on_side(-team.attack_sign(), arena)
    }

    /// The goal `team` attacks.
    pub fn enemy(team: Team, arena: &ArenaSettings) -> Self {
        Self::on_side(team.attack_sign(), arena)
    }

    fn on_side(sign: f64, arena: &ArenaSettings) -> Self {
        Self {
            center: Vector3::new(0.0, sign * arena.back_wall, GOAL_HEIGHT / 2.0),
            half_width: GOAL_HALF_WIDTH,
        }
    }

    /// The point on the goal line closest to `point`, kept `padding` away from the posts.
    pub fn nearest_entrance(&self, point: &Vector3, padding: f64) -> Vector3 {
        let limit = (self.half_width - padding).max(0.0);
        Vector3::new(point.x.clamp(-limit, limit), self.center.y, self.center.z)
    }

    pub fn flat_center(&self) -> Vector2 {
        Vector2::new(self.center.x, self.center.y)
    }

    /// Whether a flat direction from `from` would pass between the posts.
    pub fn is_in_frame(&self, from: &Vector3, direction: &Vector2) -> bool {
        if direction.y.abs() < 1e-9 || (self.center.y - from.y).signum() != direction.y.signum() {
            return false;
        }
        let t = (self.center.y - from.y) / direction.y;
        (from.x + direction.x * t).abs() < self.half_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_goal_sides() {
        let arena = ArenaSettings::default();
        assert!(Goal::own(Team::Blue, &arena).center.y < 0.0);
        assert!(Goal::enemy(Team::Blue, &arena).center.y > 0.0);
        assert!(Goal::own(Team::Orange, &arena).center.y > 0.0);
    }

    #[test]
    fn test_nearest_entrance_respects_padding() {
        let goal = Goal::enemy(Team::Blue, &ArenaSettings::default());
        let entrance = goal.nearest_entrance(&Vector3::new(60.0, 0.0, 0.0), 3.0);
        assert_relative_eq!(entrance.x, GOAL_HALF_WIDTH - 3.0);
        assert_relative_eq!(entrance.y, 100.0);
    }

    #[test]
    fn test_in_frame() {
        let goal = Goal::enemy(Team::Blue, &ArenaSettings::default());
        let from = Vector3::new(0.0, 50.0, 0.0);
        assert!(goal.is_in_frame(&from, &Vector2::new(0.1, 1.0)));
        assert!(!goal.is_in_frame(&from, &Vector2::new(1.0, 1.0)));
        assert!(!goal.is_in_frame(&from, &Vector2::new(0.0, -1.0)));
    }
}
