use thiserror::Error;

/// Invalid arena configuration, detected once when the model is built.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("ball of radius {radius} does not fit between walls {extent} apart")]
    BallDoesNotFit { radius: f64, extent: f64 },
    #[error("restitution must lie in [0, 1], got {0}")]
    Restitution(f64),
    #[error("linear damping must lie in [0, 1), got {0}")]
    Damping(f64),
    #[error("at least one integration substep is required")]
    NoSubsteps,
}

/// Failed trajectory query or construction.
#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("time {time:.3} is outside the predicted range [{start:.3}, {end:.3}]")]
    OutOfRange { time: f64, start: f64, end: f64 },
    #[error("a ball path needs at least one sample")]
    Empty,
    #[error("sample times must be strictly increasing")]
    NotIncreasing,
}
