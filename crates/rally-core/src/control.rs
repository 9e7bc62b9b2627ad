use serde::{Deserialize, Serialize};

use crate::math::clamp_unit;

/// The control surface of one vehicle for a single tick.
///
/// Analog values are clamped to [-1, 1] by the builder methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlOutput {
    /// Steering, `+` turns right.
    pub steer: f64,
    /// Throttle, `-` brakes or reverses.
    pub throttle: f64,
    /// Pitch, `+` lifts the nose.
    pub pitch: f64,
    /// Yaw, `+` turns the nose right.
    pub yaw: f64,
    /// Roll, `+` rolls right.
    pub roll: f64,
    pub jump: bool,
    pub boost: bool,
    pub slide: bool,
}

impl ControlOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steer(mut self, steer: f64) -> Self {
        self.steer = clamp_unit(steer);
        self
    }

    pub fn with_throttle(mut self, throttle: f64) -> Self {
        self.throttle = clamp_unit(throttle);
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = clamp_unit(pitch);
        self
    }

    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = clamp_unit(yaw);
        self
    }

    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = clamp_unit(roll);
        self
    }

    pub fn with_jump(mut self, jump: bool) -> Self {
        self.jump = jump;
        self
    }

    pub fn with_boost(mut self, boost: bool) -> Self {
        self.boost = boost;
        self
    }

    pub fn with_slide(mut self, slide: bool) -> Self {
        self.slide = slide;
        self
    }
}

/// Compact single-line rendering used in bot logs.
impl std::fmt::Display for ControlOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "steer={:.2} thr={:.2} p={:.2} y={:.2} r={:.2} ",
            self.steer, self.throttle, self.pitch, self.yaw, self.roll
        )?;
        for (set, flag) in [(self.jump, 'J'), (self.boost, 'B'), (self.slide, 'S')] {
            if set {
                write!(f, "{}", flag)?;
            }
        }
        Ok(())
    }
}
