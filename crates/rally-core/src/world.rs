use serde::{Deserialize, Serialize};

use crate::{math::flatten, Vector2, Vector3};

/// Team affiliation. Blue defends the goal on the negative y side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Blue,
    Orange,
}

impl Team {
    /// Sign of the y coordinate of the goal this team attacks.
    pub fn attack_sign(&self) -> f64 {
        match self {
            Team::Blue => 1.0,
            Team::Orange => -1.0,
        }
    }

    pub fn opponent(&self) -> Team {
        match self {
            Team::Blue => Team::Orange,
            Team::Orange => Team::Blue,
        }
    }
}

/// Orientation of a car as three orthonormal world-frame axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarOrientation {
    pub nose: Vector3,
    pub roof: Vector3,
    pub right: Vector3,
}

impl CarOrientation {
    /// Build an orientation from nose and roof, deriving `right`.
    pub fn from_nose_and_roof(nose: Vector3, roof: Vector3) -> Self {
        let nose = nose.normalize();
        let right = nose.cross(&roof).normalize();
        let roof = right.cross(&nose).normalize();
        Self { nose, roof, right }
    }

    /// Upright orientation with the nose pointing along the given flat heading.
    pub fn flat(heading: Vector2) -> Self {
        Self::from_nose_and_roof(Vector3::new(heading.x, heading.y, 0.0), Vector3::z())
    }

    /// Express a world-frame vector in car coordinates (nose, right, roof).
    pub fn to_local(&self, v: &Vector3) -> Vector3 {
        Vector3::new(v.dot(&self.nose), v.dot(&self.right), v.dot(&self.roof))
    }
}

impl Default for CarOrientation {
    fn default() -> Self {
        Self::flat(Vector2::new(0.0, 1.0))
    }
}

/// A snapshot of one car, valid for a single tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub orientation: CarOrientation,
    /// Boost amount in [0, 100].
    pub boost: f64,
    /// Whether any wheel touches a surface (floor or wall).
    pub has_wheel_contact: bool,
    pub team: Team,
    /// Game time of the snapshot, in seconds.
    pub time: f64,
    /// Tick counter, used for periodic pulses.
    pub frame: u64,
}

impl VehicleState {
    /// A grounded car at rest, mainly useful for tests and tools.
    pub fn at_rest(position: Vector3, heading: Vector2, team: Team) -> Self {
        Self {
            position,
            velocity: Vector3::zeros(),
            orientation: CarOrientation::flat(heading),
            boost: 100.0,
            has_wheel_contact: true,
            team,
            time: 0.0,
            frame: 0,
        }
    }

    pub fn flat_position(&self) -> Vector2 {
        flatten(&self.position)
    }

    pub fn flat_velocity(&self) -> Vector2 {
        flatten(&self.velocity)
    }

    pub fn flat_nose(&self) -> Vector2 {
        flatten(&self.orientation.nose)
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Speed along the nose, negative when driving backwards.
    pub fn forward_speed(&self) -> f64 {
        self.velocity.dot(&self.orientation.nose)
    }
}

/// Position and velocity of the ball at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub time: f64,
}

impl BallState {
    pub fn new(position: Vector3, velocity: Vector3, time: f64) -> Self {
        Self {
            position,
            velocity,
            time,
        }
    }
}

/// Everything the planner sees in one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub time: f64,
    pub frame: u64,
    pub team: Team,
    /// Index of our car in `cars`.
    pub player_index: usize,
    pub cars: Vec<VehicleState>,
    pub ball: BallState,
}

impl GameSnapshot {
    /// Our own car, or `None` if the index is stale.
    pub fn my_car(&self) -> Option<&VehicleState> {
        self.cars.get(self.player_index)
    }

    pub fn opponents(&self) -> impl Iterator<Item = &VehicleState> {
        let team = self.team;
        self.cars.iter().filter(move |car| car.team != team)
    }
}
