use crate::{Vector2, Vector3};

/// Finds the intersection point of two lines.
///
/// Each line is defined by a point and a direction vector. Returns None if the lines
/// are parallel.
pub fn find_intersection(
    point1: Vector2,
    direction1: Vector2,
    point2: Vector2,
    direction2: Vector2,
) -> Option<Vector2> {
    let det = direction1.x * direction2.y - direction1.y * direction2.x;
    if det.abs() < 1e-10 {
        return None;
    }

    let dp = point2 - point1;
    let t = (dp.x * direction2.y - dp.y * direction2.x) / det;
    Some(point1 + t * direction1)
}

/// A circle on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vector2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Vector2, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: &Vector2) -> bool {
        (point - self.center).norm() < self.radius
    }
}

/// Counter-clockwise perpendicular of a flat vector.
pub fn orthogonal(v: &Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Drop the z component.
pub fn flatten(v: &Vector3) -> Vector2 {
    Vector2::new(v.x, v.y)
}

/// Rescale a vector to the given length. Zero vectors stay zero.
pub fn scaled_to_magnitude(v: &Vector2, magnitude: f64) -> Vector2 {
    let norm = v.norm();
    if norm < 1e-12 {
        return Vector2::zeros();
    }
    v * (magnitude / norm)
}

/// Clamp a control value to [-1, 1].
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_intersecting_lines() {
        let intersection = find_intersection(
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(-1.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(intersection.x, 1.0, epsilon = 1e-10);
        assert_relative_eq!(intersection.y, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_parallel_lines() {
        let intersection = find_intersection(
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 2.0),
        );
        assert!(intersection.is_none());
    }

    #[test]
    fn test_circle_contains() {
        let circle = Circle::new(Vector2::new(1.0, 1.0), 2.0);
        assert!(circle.contains(&Vector2::new(2.0, 2.0)));
        assert!(!circle.contains(&Vector2::new(4.0, 1.0)));
    }

    #[test]
    fn test_scaled_to_magnitude() {
        let v = scaled_to_magnitude(&Vector2::new(3.0, 4.0), 10.0);
        assert_relative_eq!(v.x, 6.0);
        assert_relative_eq!(v.y, 8.0);
        assert_eq!(scaled_to_magnitude(&Vector2::zeros(), 1.0), Vector2::zeros());
    }
}
