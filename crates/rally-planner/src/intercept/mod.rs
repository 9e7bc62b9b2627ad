mod aerial;
mod ground;
mod kick_strategy;

pub use aerial::*;
pub use ground::*;
pub use kick_strategy::*;

use rally_core::Vector3;
use serde::Serialize;

/// A point in space the car should occupy at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpaceTime {
    pub position: Vector3,
    pub time: f64,
}

impl SpaceTime {
    pub fn new(position: Vector3, time: f64) -> Self {
        Self { position, time }
    }
}
