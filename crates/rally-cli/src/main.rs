use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use rally_core::PlannerSettings;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::{Cli, Command};

/// Resolve `--log-file`, where `auto` means a timestamped file in the local data dir.
fn log_file_path(arg: &str) -> Result<PathBuf> {
    if arg != "auto" {
        return Ok(PathBuf::from(arg));
    }
    let time = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let filename = format!("rally-{time}.log");
    let path = dirs::data_local_dir()
        .map(|p| p.join("rally").join(&filename))
        .unwrap_or_else(|| PathBuf::from(&filename));
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }
    Ok(path)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = tracing::Level::from_str(&args.log_level)
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", args.log_level))?;
    // stdout carries the command output, logs go to stderr
    let stderr_layer = fmt::Layer::default()
        .without_time()
        .with_writer(std::io::stderr);
    let filter = tracing_subscriber::filter::LevelFilter::from_level(log_level);

    let mut _guard = None;
    match args.log_file.as_deref() {
        Some(arg) => {
            let path = log_file_path(arg)?;
            let dir = path.parent().map(PathBuf::from).unwrap_or_default();
            let file_name = path
                .file_name()
                .context("Log file path has no file name")?
                .to_owned();
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            _guard = Some(guard);
            let file_layer = fmt::Layer::default()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .context("Unable to set global tracing subscriber")?;
            tracing::info!("Saving logs to {}", path.display());
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .context("Unable to set global tracing subscriber")?;
        }
    }

    let settings = match &args.settings {
        Some(path) => PlannerSettings::load_or_insert(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => PlannerSettings::default(),
    };

    match args.command {
        Command::Predict {
            ball,
            velocity,
            duration,
        } => commands::predict(&settings, ball, velocity, duration),
        Command::Intercept {
            car,
            heading,
            speed,
            boost,
            ball,
            velocity,
        } => commands::intercept(&settings, car, heading, speed, boost, ball, velocity),
        Command::Settings { output } => commands::write_settings(&settings, &output),
    }
}
