pub mod circle_turn;

use rally_core::Vector2;
use serde::Serialize;

/// Where and when the car wants to be, and which way it should face there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrikePoint {
    pub position: Vector2,
    /// Unit vector.
    pub facing: Vector2,
    pub time: f64,
}

impl StrikePoint {
    pub fn new(position: Vector2, facing: Vector2, time: f64) -> Self {
        Self {
            position,
            facing: facing.try_normalize(1e-9).unwrap_or_else(Vector2::zeros),
            time,
        }
    }
}
