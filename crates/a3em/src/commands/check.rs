use anyhow::{Context, Result};
use tracing::info;

use a3em_config::{read_config, validate as validate_schedule, write_config};

use crate::settings::CliSettings;
use crate::DeviceArgs;

pub fn validate(args: &DeviceArgs, settings: &CliSettings) -> Result<()> {
    let dir = args.resolve(settings);
    let schedule = read_config(&dir)
        .with_context(|| format!("Failed to load configuration from '{}'", dir.display()))?;
    validate_schedule(&schedule).context("Configuration is invalid")?;
    info!(dir = %dir.display(), phases = schedule.phases().len(), "configuration is valid");
    println!("Configuration is valid.");
    Ok(())
}

pub fn normalize(args: &DeviceArgs, settings: &CliSettings) -> Result<()> {
    let dir = args.resolve(settings);
    let schedule = read_config(&dir)
        .with_context(|| format!("Failed to load configuration from '{}'", dir.display()))?;
    let path = write_config(&dir, &schedule).context("Failed to rewrite configuration")?;
    println!("Rewrote {}", path.display());
    Ok(())
}
