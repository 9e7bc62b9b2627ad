use anyhow::{Context, Result};
use rally_core::{
    BallState, GameSnapshot, PlannerSettings, Team, Vector2, Vector3, VehicleState,
};
use rally_physics::ArenaModel;
use rally_planner::{
    acceleration::AccelerationModel,
    intercept::{aerial_intercept, ground_intercept, KickAtEnemyGoal, KickStrategy},
    routing::circle_turn::plan_for_circle_turn,
};

pub fn intercept(
    settings: &PlannerSettings,
    car: Vector3,
    heading: Vector2,
    speed: f64,
    boost: f64,
    ball: Vector3,
    velocity: Vector3,
) -> Result<()> {
    let arena = ArenaModel::new(settings.arena.clone()).context("Invalid arena settings")?;
    let heading = heading
        .try_normalize(1e-9)
        .context("Heading must not be a zero vector")?;

    let mut vehicle = VehicleState::at_rest(car, heading, Team::Blue);
    vehicle.velocity = Vector3::new(heading.x, heading.y, 0.0) * speed;
    vehicle.boost = boost;
    vehicle.has_wheel_contact = car.z < 1.0;

    let snapshot = GameSnapshot {
        time: 0.0,
        frame: 0,
        team: Team::Blue,
        player_index: 0,
        cars: vec![vehicle.clone()],
        ball: BallState::new(ball, velocity, 0.0),
    };
    let path = arena.predict(&snapshot.ball);
    let plot = AccelerationModel::new(&settings.acceleration).for_car(&vehicle, settings.arena.horizon);
    let strategy = KickAtEnemyGoal::new(settings);

    let ground = ground_intercept(&vehicle, &path, &plot, &strategy, &snapshot, settings);
    let turn = ground.map(|g| plan_for_circle_turn(&vehicle, &plot, &g.strike_point, settings));
    match &ground {
        Some(g) => tracing::info!(
            "Ground intercept at t={:.2} with {:?}",
            g.ball.time,
            g.profile.style
        ),
        None => tracing::info!("No ground intercept"),
    }

    let kick = strategy.kick_direction(&snapshot, &ball, None);
    let offset = kick
        .try_normalize(1e-9)
        .map(|dir| -dir * settings.aerial.offset_magnitude)
        .unwrap_or_else(Vector3::zeros);
    let aerial = aerial_intercept(&vehicle, &path, &offset, 0.0, settings);

    let report = serde_json::json!({
        "ground": ground,
        "first_control": turn.map(|t| t.output),
        "aerial": aerial,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize intercepts")?
    );
    Ok(())
}
