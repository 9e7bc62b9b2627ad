use std::path::Path;

use anyhow::Result;
use rally_core::PlannerSettings;

pub fn write_settings(settings: &PlannerSettings, output: &Path) -> Result<()> {
    settings.store(output)?;
    tracing::info!("Wrote settings to {}", output.display());
    Ok(())
}
