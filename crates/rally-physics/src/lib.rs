//! Forward model of the ball inside the arena.
//!
//! [`ArenaModel`] integrates a single sphere against six static planes and records
//! the result as a [`BallPath`], which answers time-indexed queries for the
//! planner.

mod arena;
mod ball_path;
mod error;

pub use arena::*;
pub use ball_path::*;
pub use error::*;
