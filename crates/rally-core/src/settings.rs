use std::{f64::consts::PI, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Geometry and integration parameters of the ball model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    /// Distance from the center line to each side wall.
    pub side_wall: f64,
    /// Distance from the center line to each back wall.
    pub back_wall: f64,
    /// Height of the ceiling.
    pub ceiling: f64,
    pub ball_radius: f64,
    /// Magnitude of gravity, applied along -z.
    pub gravity: f64,
    /// Fraction of velocity lost per second.
    pub linear_damping: f64,
    /// Restitution of every wall, 1.0 is perfectly elastic.
    pub restitution: f64,
    /// Number of recorded trajectory samples per simulated second.
    pub samples_per_second: f64,
    /// Integration iterations between two recorded samples.
    pub substeps: u32,
    /// Default prediction horizon in seconds.
    pub horizon: f64,
    /// Gap between the ball surface and a wall, checked at every substep, within
    /// which the ball counts as touching it. A velocity flip only counts as a bounce
    /// off a wall the ball touched.
    pub bounce_epsilon: f64,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            side_wall: 74.0,
            back_wall: 100.0,
            ceiling: 40.0,
            ball_radius: 1.8555,
            gravity: 10.0,
            linear_damping: 0.07,
            restitution: 1.0,
            samples_per_second: 10.0,
            substeps: 10,
            horizon: 5.0,
            bounce_epsilon: 0.1,
        }
    }
}

/// Piecewise-constant acceleration bands of a car driving straight.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationSettings {
    /// Upper edge of the low speed band.
    pub low_band_top: f64,
    /// Throttle acceleration below `low_band_top`.
    pub low_band_accel: f64,
    /// Throttle acceleration between `low_band_top` and `medium_speed`.
    pub medium_band_accel: f64,
    /// Speed above which throttle alone no longer accelerates.
    pub medium_speed: f64,
    pub supersonic_speed: f64,
    /// Extra acceleration while boosting.
    pub boost_accel: f64,
    /// Boost units consumed per second of boosting.
    pub boost_per_second: f64,
}

impl Default for AccelerationSettings {
    fn default() -> Self {
        Self {
            low_band_top: 14.0,
            low_band_accel: 26.0,
            medium_band_accel: 12.0,
            medium_speed: crate::MEDIUM_SPEED,
            supersonic_speed: crate::SUPERSONIC_SPEED,
            boost_accel: 19.8,
            boost_per_second: 33.3,
        }
    }
}

/// Ground steering and turning-circle parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnSettings {
    /// Quadratic coefficient of the turning radius `a*v^2 + b*v + c`.
    pub radius_a: f64,
    pub radius_b: f64,
    /// Turning radius at standstill, the tightest turn possible.
    pub radius_c: f64,
    /// Lowest ideal speed for entering a circle.
    pub min_circle_speed: f64,
    /// Ideal speed lost per radian of misalignment beyond pi/6.
    pub misalignment_penalty: f64,
    /// Correction angles below this are driven straight.
    pub straight_tolerance: f64,
    /// Angle ahead on the circle used as steering waypoint while inside it.
    pub lookahead_radians: f64,
    /// Circle speed used when the radius is tighter than any speed allows.
    pub fallback_circle_speed: f64,
    /// Distance to the tangent point under which over-speed triggers braking.
    pub brake_distance: f64,
    /// Steer output per radian of heading error.
    pub steer_gain: f64,
    /// Heading error above which the car slides.
    pub slide_angle: f64,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            radius_a: 0.0153,
            radius_b: 0.16,
            radius_c: 7.0,
            min_circle_speed: 15.0,
            misalignment_penalty: 20.0,
            straight_tolerance: 0.05,
            lookahead_radians: PI / 20.0,
            fallback_circle_speed: 10.0,
            brake_distance: 20.0,
            steer_gain: 3.0,
            slide_angle: 1.6,
        }
    }
}

/// Strike profile thresholds and jump model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeSettings {
    /// Balls centered below this height are hit without leaving the ground.
    pub max_chip_height: f64,
    /// Balls above the chip height and below this one are hit with a front flip.
    pub needs_jump_hit_threshold: f64,
    /// Highest ball center reachable with a jump.
    pub max_jump_hit_height: f64,
    /// Time from the first jump press to flip contact.
    pub flip_hit_duration: f64,
    /// Vertical speed gained on the first jump frame.
    pub jump_velocity: f64,
    /// Upward acceleration while the jump button is held.
    pub jump_hold_accel: f64,
    /// Maximum time the jump can be held.
    pub jump_hold_seconds: f64,
    /// Height of the car's center while resting on the floor.
    pub car_rest_height: f64,
    /// Distance between the car center and the ball center at contact.
    pub reach: f64,
}

impl Default for StrikeSettings {
    fn default() -> Self {
        Self {
            max_chip_height: 2.0,
            needs_jump_hit_threshold: 3.2,
            max_jump_hit_height: 7.0,
            flip_hit_duration: 0.3,
            jump_velocity: 5.8,
            jump_hold_accel: 29.2,
            jump_hold_seconds: 0.2,
            car_rest_height: 0.34,
            reach: 3.2,
        }
    }
}

/// Ground intercept search parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptSettings {
    /// Bisection iterations used to refine the earliest feasible time.
    pub refine_iterations: u32,
    /// Extra seconds of slack required before an intercept is considered reachable.
    pub spare_time: f64,
    /// Deviation between predicted and observed ball position that counts as a
    /// disrupted path.
    pub disruption_threshold: f64,
    /// Padding from the posts when aiming at a goal.
    pub goal_padding: f64,
}

impl Default for InterceptSettings {
    fn default() -> Self {
        Self {
            refine_iterations: 8,
            spare_time: 0.0,
            disruption_threshold: 1.5,
            goal_padding: 3.0,
        }
    }
}

/// Parameters of the aerial reachability model and the aerial strike maneuver.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AerialSettings {
    /// Effective acceleration of boosting along the nose in the air.
    pub boost_accel: f64,
    /// Extra upward acceleration while the jump is held after takeoff.
    pub jump_assist_accel: f64,
    pub jump_assist_seconds: f64,
    /// Boost needed before an aerial is attempted.
    pub boost_needed: f64,
    /// How far into the future the aerial search looks.
    pub search_window: f64,
    /// Highest reachable ball center.
    pub max_aerial_height: f64,
    /// Distance from the ball center at which the car aims.
    pub offset_magnitude: f64,
    /// Consecutive empty searches tolerated before recovering with a front flip.
    pub confusion_limit: u32,
    /// Latest time in the air at which a dodge is still available.
    pub max_time_for_dodge: f64,
    /// Distance to the intercept at which the car dodges into the ball.
    pub dodge_distance: f64,
    /// Time a dodge takes to reach the ball.
    pub dodge_time: f64,
    /// Corrections larger than this use a side flip.
    pub side_dodge_threshold: f64,
    /// Window before contact in which the nose is pointed at the ball.
    pub nose_finesse_seconds: f64,
    /// Fraction of the yaw error added on top to settle faster.
    pub yaw_overcorrect: f64,
    /// Minimum alignment between velocity and the direction to the intercept.
    pub min_approach_alignment: f64,
    /// Gain of the attitude controller.
    pub orientation_gain: f64,
}

impl Default for AerialSettings {
    fn default() -> Self {
        Self {
            boost_accel: 18.0,
            jump_assist_accel: 10.0,
            jump_assist_seconds: 1.0,
            boost_needed: 20.0,
            search_window: 4.0,
            max_aerial_height: 36.0,
            offset_magnitude: 2.5,
            confusion_limit: 3,
            max_time_for_dodge: 1.4,
            dodge_distance: 6.0,
            dodge_time: 0.4,
            side_dodge_threshold: PI / 4.0,
            nose_finesse_seconds: 0.7,
            yaw_overcorrect: 0.1,
            min_approach_alignment: 0.6,
            orientation_gain: 4.0,
        }
    }
}

/// All tunables of the planner.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub arena: ArenaSettings,
    pub acceleration: AccelerationSettings,
    pub turn: TurnSettings,
    pub strike: StrikeSettings,
    pub intercept: InterceptSettings,
    pub aerial: AerialSettings,
}

impl PlannerSettings {
    /// Load the settings from a file, or store the default settings if the file does
    /// not exist. A file that cannot be parsed is logged and replaced by defaults in
    /// memory only.
    pub fn load_or_insert(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => Ok(settings),
                Err(err) => {
                    log::warn!("Failed to parse planner settings: {}", err);
                    Ok(Self::default())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.store(path)?;
                log::info!("Wrote default planner settings to {}", path.display());
                Ok(settings)
            }
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read settings {}", path.display()))
            }
        }
    }

    /// Store the settings in the given file.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings {}", path.display()))
    }
}
