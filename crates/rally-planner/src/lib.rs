//! Planning for a car-soccer agent: reachability models, intercept search,
//! turning-circle routing and the step/plan machinery that turns them into
//! per-tick controls.

pub mod acceleration;
pub mod behavior;
pub mod bot;
pub mod intercept;
pub mod plan;
pub mod routing;
pub mod steering;
pub mod steps;
pub mod strike;

pub use behavior::{Behavior, ChaseBehavior};
pub use bot::{Bot, Telemetry};
pub use plan::{Plan, Posture, Step, StepCtx, StepProgress, TickLog};
