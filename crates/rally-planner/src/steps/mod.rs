mod aerial_strike;
mod blind;
mod drive;
mod ground_strike;
mod landing;
pub mod set_pieces;
mod wall;

pub use aerial_strike::AerialStrikeStep;
pub use blind::{BlindStep, TapStep};
pub use drive::{CircleTurnStep, SteerToPointStep};
pub use ground_strike::GroundStrikeStep;
pub use landing::{LandGracefullyStep, LandMindlesslyStep, OrientationStep};
pub use wall::{DescendFromWallStep, MountWallStep, WallTraverseStep};

pub(crate) use wall::ball_is_on_wall;
