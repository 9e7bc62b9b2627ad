use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::Vector2;

/// An angle in radians, always in (-pi, pi].
///
/// Positive angles are counter-clockwise when looking down on the field from above.
///
/// ```
/// # use rally_core::Angle;
/// let a = Angle::from_degrees(90.0);
/// let b = Angle::from_degrees(135.0);
/// assert!(((a + b).degrees() + 135.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(f64);

impl Angle {
    pub const PI_2: Angle = Angle(PI / 2.0);
    pub const ZERO: Angle = Angle(0.0);

    /// Create a new angle from radians.
    pub fn from_radians(radians: f64) -> Self {
        Angle(wrap_angle(radians))
    }

    /// Create a new angle from degrees.
    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// Heading of a flat vector, measured from the +x axis.
    pub fn of_vector(v: &Vector2) -> Self {
        Self::from_radians(v.y.atan2(v.x))
    }

    /// The signed angle that rotates `from` onto `to`.
    ///
    /// Zero vectors produce a zero angle rather than NaN.
    pub fn correction(from: &Vector2, to: &Vector2) -> Self {
        if from.norm_squared() < 1e-12 || to.norm_squared() < 1e-12 {
            return Angle::ZERO;
        }
        Self::of_vector(to) - Self::of_vector(from)
    }

    /// Get the angle in radians.
    pub fn radians(&self) -> f64 {
        self.0
    }

    /// Get the angle in degrees.
    pub fn degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    /// Rotate a vector by this angle.
    pub fn rotate_vector(&self, v: &Vector2) -> Vector2 {
        let rot = nalgebra::Rotation2::new(self.0);
        rot * v
    }

    /// Get the absolute value of the angle
    pub fn abs(&self) -> f64 {
        self.0.abs()
    }

    /// Get the sign of the angle
    pub fn signum(&self) -> f64 {
        self.0.signum()
    }
}

impl std::ops::Add for Angle {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Angle::from_radians(self.0 + other.0)
    }
}

impl std::ops::Sub for Angle {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Angle::from_radians(self.0 - other.0)
    }
}

impl std::ops::Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self {
        Angle::from_radians(-self.0)
    }
}

impl std::ops::Mul<Vector2> for Angle {
    type Output = Vector2;

    fn mul(self, v: Vector2) -> Vector2 {
        self.rotate_vector(&v)
    }
}

impl std::ops::Mul<f64> for Angle {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Angle::from_radians(self.0 * scalar)
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.3} rad", self.0)
    }
}

impl Default for Angle {
    fn default() -> Self {
        Angle::ZERO
    }
}

/// Wrap an angle to the range (-pi, pi].
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}
