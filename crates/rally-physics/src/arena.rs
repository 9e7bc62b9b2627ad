use rally_core::{settings::ArenaSettings, BallState, VehicleState, Vector3};
use serde::{Deserialize, Serialize};

use crate::{BallPath, ConfigError, TrajectorySample};

/// Which part of the arena a wall belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    Floor,
    Ceiling,
    SideWall,
    BackWall,
}

/// A static half-space. Points with `normal · p >= offset` are inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub normal: Vector3,
    pub offset: f64,
    pub surface: Surface,
}

impl Wall {
    fn new(normal: Vector3, offset: f64, surface: Surface) -> Self {
        Self {
            normal,
            offset,
            surface,
        }
    }

    /// Signed distance of a point from the plane, positive inside the arena.
    pub fn distance(&self, point: &Vector3) -> f64 {
        self.normal.dot(point) - self.offset
    }

    /// Projection of a point onto the plane.
    pub fn project(&self, point: &Vector3) -> Vector3 {
        point - self.normal * self.distance(point)
    }
}

/// The ball simulator.
///
/// Every call to [`ArenaModel::simulate_ball`] starts from the given state with no
/// memory of previous calls, so identical inputs always produce identical paths.
#[derive(Debug, Clone)]
pub struct ArenaModel {
    settings: ArenaSettings,
    walls: Vec<Wall>,
}

impl ArenaModel {
    /// Build a model, rejecting configurations that cannot be simulated.
    pub fn new(settings: ArenaSettings) -> Result<Self, ConfigError> {
        validate(&settings)?;
        let walls = vec![
            Wall::new(Vector3::z(), 0.0, Surface::Floor),
            Wall::new(-Vector3::z(), -settings.ceiling, Surface::Ceiling),
            Wall::new(-Vector3::x(), -settings.side_wall, Surface::SideWall),
            Wall::new(Vector3::x(), -settings.side_wall, Surface::SideWall),
            Wall::new(-Vector3::y(), -settings.back_wall, Surface::BackWall),
            Wall::new(Vector3::y(), -settings.back_wall, Surface::BackWall),
        ];
        log::debug!(
            "Arena model ready: {} samples/s, {} substeps",
            settings.samples_per_second,
            settings.substeps
        );
        Ok(Self { settings, walls })
    }

    pub fn settings(&self) -> &ArenaSettings {
        &self.settings
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Predict the ball over the configured horizon.
    pub fn predict(&self, ball: &BallState) -> BallPath {
        self.simulate_ball(ball, self.settings.horizon)
    }

    /// Integrate the ball forward for `duration` seconds.
    ///
    /// The first sample is the input state. The last sample lies within one sample
    /// interval after `ball.time + duration`.
    pub fn simulate_ball(&self, ball: &BallState, duration: f64) -> BallPath {
        let interval = 1.0 / self.settings.samples_per_second;
        let dt = interval / self.settings.substeps as f64;
        let steps = (duration.max(0.0) * self.settings.samples_per_second - 1e-9)
            .ceil()
            .max(0.0) as usize;

        let mut position = ball.position;
        let mut velocity = ball.velocity;
        let mut samples = Vec::with_capacity(steps + 1);
        let mut contacts = Vec::with_capacity(steps + 1);
        samples.push(TrajectorySample::new(ball.time, position, velocity));
        contacts.push(0);
        for i in 1..=steps {
            let mut touched = 0;
            for _ in 0..self.settings.substeps {
                touched |= self.integrate(&mut position, &mut velocity, dt);
            }
            samples.push(TrajectorySample::new(
                ball.time + i as f64 * interval,
                position,
                velocity,
            ));
            contacts.push(touched);
        }

        BallPath::from_parts(samples, self.walls.clone(), contacts)
    }

    /// Advance one substep. Returns the walls the ball touched as a bit set indexed
    /// like [`ArenaModel::walls`].
    fn integrate(&self, position: &mut Vector3, velocity: &mut Vector3, dt: f64) -> u8 {
        let radius = self.settings.ball_radius;
        let contact_gap = self.settings.bounce_epsilon;
        let restitution = self.settings.restitution;
        let mut accel = Vector3::new(0.0, 0.0, -self.settings.gravity);
        let mut touched = 0u8;

        // A ball lying against a wall that gravity presses it into, too slow to
        // leave within the substep, rests there instead of bouncing.
        for (i, wall) in self.walls.iter().enumerate() {
            let gap = wall.distance(position) - radius;
            let into_wall = wall.normal.dot(&accel);
            let normal_speed = wall.normal.dot(velocity);
            if gap <= RESTING_GAP && into_wall < 0.0 && normal_speed.abs() <= -into_wall * dt {
                *velocity -= wall.normal * normal_speed;
                *position -= wall.normal * gap;
                accel -= wall.normal * into_wall;
                touched |= 1 << i;
            }
        }

        let mut remaining = dt;
        for _ in 0..MAX_IMPACTS_PER_SUBSTEP {
            let impact = self
                .walls
                .iter()
                .enumerate()
                .filter_map(|(i, wall)| {
                    let gap = wall.distance(position) - radius;
                    time_to_contact(gap, wall.normal.dot(velocity), wall.normal.dot(&accel), remaining)
                        .map(|t| (t, i))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0));
            let Some((t, i)) = impact else {
                advance(position, velocity, &accel, remaining);
                remaining = 0.0;
                break;
            };

            advance(position, velocity, &accel, t);
            remaining -= t;
            let wall = &self.walls[i];
            let normal_speed = wall.normal.dot(velocity);
            if normal_speed < 0.0 {
                *velocity -= wall.normal * ((1.0 + restitution) * normal_speed);
            }
            *position -= wall.normal * (wall.distance(position) - radius).min(0.0);
            touched |= 1 << i;
        }
        if remaining > 0.0 {
            advance(position, velocity, &accel, remaining);
        }

        for (i, wall) in self.walls.iter().enumerate() {
            let gap = wall.distance(position) - radius;
            if gap < 0.0 {
                *position -= wall.normal * gap;
                *velocity -= wall.normal * wall.normal.dot(velocity).min(0.0);
            }
            if gap <= contact_gap {
                touched |= 1 << i;
            }
        }

        if self.settings.linear_damping > 0.0 {
            *velocity *= (1.0 - self.settings.linear_damping).powf(dt);
        }
        touched
    }

    /// Distance from a point to the closest side or back wall.
    pub fn distance_from_wall(&self, point: &Vector3) -> f64 {
        self.walls
            .iter()
            .filter(|wall| matches!(wall.surface, Surface::SideWall | Surface::BackWall))
            .map(|wall| wall.distance(point))
            .fold(f64::INFINITY, f64::min)
    }

    /// The side or back wall closest to a point.
    pub fn nearest_wall(&self, point: &Vector3) -> Wall {
        let mut nearest = self.walls[2];
        for wall in &self.walls[2..] {
            if wall.distance(point) < nearest.distance(point) {
                nearest = *wall;
            }
        }
        nearest
    }

    /// A car driving on a side or back wall rather than the floor.
    pub fn is_car_on_wall(&self, car: &VehicleState) -> bool {
        car.has_wheel_contact && car.orientation.roof.z < 0.7 && car.position.z > 1.0
    }

    /// A grounded car close to where the floor curves into a wall.
    pub fn is_near_floor_edge(&self, car: &VehicleState) -> bool {
        car.position.z < 5.0 && self.distance_from_wall(&car.position) < 8.0
    }
}

/// Gap below which a slow ball counts as lying on a wall.
const RESTING_GAP: f64 = 1e-3;
/// Corners can need several reflections in one substep.
const MAX_IMPACTS_PER_SUBSTEP: usize = 6;

/// Exact constant-acceleration motion.
fn advance(position: &mut Vector3, velocity: &mut Vector3, accel: &Vector3, t: f64) {
    *position += *velocity * t + accel * (0.5 * t * t);
    *velocity += accel * t;
}

/// Time within `horizon` at which a ball `gap` away from a wall, moving and
/// accelerating along its normal, reaches it while still approaching.
fn time_to_contact(gap: f64, speed: f64, accel: f64, horizon: f64) -> Option<f64> {
    if gap <= 0.0 {
        return (speed < 0.0).then_some(0.0);
    }
    let candidates = if accel.abs() < 1e-12 {
        if speed >= 0.0 {
            return None;
        }
        [-gap / speed, f64::NAN]
    } else {
        let discriminant = speed * speed - 2.0 * accel * gap;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        [(-speed - root) / accel, (-speed + root) / accel]
    };
    candidates
        .into_iter()
        .filter(|t| t.is_finite() && (0.0..=horizon).contains(t) && speed + accel * t < 0.0)
        .min_by(f64::total_cmp)
}

fn validate(settings: &ArenaSettings) -> Result<(), ConfigError> {
    let positive = [
        ("ball_radius", settings.ball_radius),
        ("side_wall", settings.side_wall),
        ("back_wall", settings.back_wall),
        ("ceiling", settings.ceiling),
        ("samples_per_second", settings.samples_per_second),
    ];
    for (name, value) in positive {
        if !(value > 0.0) {
            return Err(ConfigError::NonPositive { name, value });
        }
    }
    if settings.gravity < 0.0 {
        return Err(ConfigError::NonPositive {
            name: "gravity",
            value: settings.gravity,
        });
    }
    for extent in [
        2.0 * settings.side_wall,
        2.0 * settings.back_wall,
        settings.ceiling,
    ] {
        if extent <= 2.0 * settings.ball_radius {
            return Err(ConfigError::BallDoesNotFit {
                radius: settings.ball_radius,
                extent,
            });
        }
    }
    if !(0.0..=1.0).contains(&settings.restitution) {
        return Err(ConfigError::Restitution(settings.restitution));
    }
    if !(0.0..1.0).contains(&settings.linear_damping) {
        return Err(ConfigError::Damping(settings.linear_damping));
    }
    if settings.substeps == 0 {
        return Err(ConfigError::NoSubsteps);
    }
    Ok(())
}
