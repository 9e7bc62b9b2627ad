use anyhow::{Context, Result};
use rally_core::{BallState, PlannerSettings, Vector3};
use rally_physics::ArenaModel;

pub fn predict(
    settings: &PlannerSettings,
    ball: Vector3,
    velocity: Vector3,
    duration: Option<f64>,
) -> Result<()> {
    let arena = ArenaModel::new(settings.arena.clone()).context("Invalid arena settings")?;
    let state = BallState::new(ball, velocity, 0.0);
    let path = match duration {
        Some(duration) => arena.simulate_ball(&state, duration.max(0.0)),
        None => arena.predict(&state),
    };
    tracing::info!(
        "Predicted {} samples up to t={:.2}",
        path.samples().len(),
        path.end().time
    );
    if let Some(bounce) = path.first_bounce_after(0.0) {
        tracing::info!("First bounce at t={:.2} {:?}", bounce.time, bounce.position);
    }
    if let Some(bounce) = path.first_wall_bounce_after(0.0) {
        tracing::info!("First wall bounce at t={:.2} {:?}", bounce.time, bounce.position);
    }

    let json = serde_json::to_string_pretty(path.samples()).context("Failed to serialize path")?;
    println!("{}", json);
    Ok(())
}
