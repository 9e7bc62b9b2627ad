use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rally_core::{Vector2, Vector3};

/// Parse `x,y,z` into a vector.
fn parse_vector3(s: &str) -> Result<Vector3, String> {
    let parts = parse_components(s)?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected 3 comma separated numbers, got '{}'", s)),
    }
}

/// Parse `x,y` into a vector.
fn parse_vector2(s: &str) -> Result<Vector2, String> {
    let parts = parse_components(s)?;
    match parts.as_slice() {
        [x, y] => Ok(Vector2::new(*x, *y)),
        _ => Err(format!("expected 2 comma separated numbers, got '{}'", s)),
    }
}

fn parse_components(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|err| format!("invalid number '{}': {}", part, err))
        })
        .collect()
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the predicted ball trajectory as JSON.
    #[clap(name = "predict")]
    Predict {
        #[clap(long, value_parser = parse_vector3, allow_hyphen_values = true)]
        ball: Vector3,
        #[clap(long, value_parser = parse_vector3, allow_hyphen_values = true, default_value = "0,0,0")]
        velocity: Vector3,
        /// Seconds to simulate. Defaults to the configured horizon.
        #[clap(long)]
        duration: Option<f64>,
    },

    /// Print the ground and aerial intercepts for a car and a ball as JSON.
    #[clap(name = "intercept")]
    Intercept {
        #[clap(long, value_parser = parse_vector3, allow_hyphen_values = true)]
        car: Vector3,
        #[clap(long, value_parser = parse_vector2, allow_hyphen_values = true, default_value = "0,1")]
        heading: Vector2,
        #[clap(long, default_value = "0")]
        speed: f64,
        #[clap(long, default_value = "100")]
        boost: f64,
        #[clap(long, value_parser = parse_vector3, allow_hyphen_values = true)]
        ball: Vector3,
        #[clap(long, value_parser = parse_vector3, allow_hyphen_values = true, default_value = "0,0,0")]
        velocity: Vector3,
    },

    /// Write the default settings to a file.
    #[clap(name = "settings")]
    Settings {
        #[clap(short, long, default_value = "rally-settings.json")]
        output: PathBuf,
    },
}

#[derive(Debug, Parser)]
#[command(name = "rally-cli")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    /// Settings file. Created with defaults if missing.
    #[clap(long, short = 'f')]
    pub settings: Option<PathBuf>,

    #[clap(long, default_value = "info")]
    pub log_level: String,

    /// Write JSON logs to a file as well. `auto` picks a file in the local data dir.
    #[clap(long)]
    pub log_file: Option<String>,
}
