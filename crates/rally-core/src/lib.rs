mod angle;
mod control;
mod goal;
pub mod math;
pub mod settings;
mod world;

pub use angle::*;
pub use control::*;
pub use goal::*;
pub use settings::PlannerSettings;
pub use world::*;

pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;

/// Maximum car speed in field units per second. One field unit is 50 game units.
pub const SUPERSONIC_SPEED: f64 = 46.0;
/// Top speed reachable on throttle alone.
pub const MEDIUM_SPEED: f64 = 28.0;
