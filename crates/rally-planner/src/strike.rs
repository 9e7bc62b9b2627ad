use rally_core::settings::StrikeSettings;
use serde::{Deserialize, Serialize};

/// How the car makes contact with the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrikeStyle {
    /// Drive through the ball without leaving the ground.
    Chip,
    /// Front flip into a ball at bumper height.
    FlipHit,
    /// Jump, then flip into a ball above the car.
    JumpHit,
    Aerial,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeProfile {
    pub style: StrikeStyle,
    /// Seconds between starting the strike maneuver and contact.
    pub strike_duration: f64,
}

impl StrikeProfile {
    pub fn new(style: StrikeStyle, strike_duration: f64) -> Self {
        Self {
            style,
            strike_duration,
        }
    }

    /// Profile for hitting a ball whose center is at `height` from the ground, or
    /// `None` if it is out of reach without an aerial.
    pub fn for_ground_height(height: f64, settings: &StrikeSettings, gravity: f64) -> Option<Self> {
        if height <= settings.max_chip_height {
            Some(Self::new(StrikeStyle::Chip, 0.0))
        } else if height <= settings.needs_jump_hit_threshold {
            Some(Self::new(StrikeStyle::FlipHit, settings.flip_hit_duration))
        } else if height <= settings.max_jump_hit_height {
            let rise = (height - settings.car_rest_height - settings.reach / 2.0).max(0.0);
            seconds_for_mash_jump_height(rise, settings, gravity)
                .map(|seconds| Self::new(StrikeStyle::JumpHit, seconds))
        } else {
            None
        }
    }
}

/// Time for a held jump to lift the car by `height`, or `None` if it never gets
/// that high.
pub fn seconds_for_mash_jump_height(height: f64, settings: &StrikeSettings, gravity: f64) -> Option<f64> {
    if height <= 0.0 {
        return Some(0.0);
    }
    let v0 = settings.jump_velocity;
    let hold_accel = settings.jump_hold_accel - gravity;
    let hold = settings.jump_hold_seconds;

    let held_height = v0 * hold + 0.5 * hold_accel * hold * hold;
    if height <= held_height {
        if hold_accel.abs() < 1e-12 {
            return Some(height / v0);
        }
        let discriminant = v0 * v0 + 2.0 * hold_accel * height;
        return Some((-v0 + discriminant.sqrt()) / hold_accel);
    }

    let v_release = v0 + hold_accel * hold;
    let remaining = height - held_height;
    if gravity.abs() < 1e-12 {
        return (v_release > 0.0).then(|| hold + remaining / v_release);
    }
    let discriminant = v_release * v_release - 2.0 * gravity * remaining;
    (discriminant >= 0.0).then(|| hold + (v_release - discriminant.sqrt()) / gravity)
}
