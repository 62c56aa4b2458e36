use anyhow::{bail, Context, Result};
use chrono::{Days, Utc};
use chrono_tz::Tz;
use clap::Args;

use a3em_config::time::parse_timezone;
use a3em_config::{config_path, write_config, DeploymentWindow, LocalDateTime, Schedule};

use crate::settings::CliSettings;
use crate::DeviceArgs;

#[derive(Args, Debug, Default)]
pub struct InitArgs {
    #[command(flatten)]
    device: DeviceArgs,

    /// IANA timezone of the deployment site (defaults to the settings file, then UTC)
    #[arg(long)]
    timezone: Option<String>,

    /// Device label, at most 15 characters
    #[arg(long)]
    label: Option<String>,

    /// Deployment start as "YYYY-MM-DD HH:MM" local time (defaults to today at midnight)
    #[arg(long)]
    start: Option<String>,

    /// Deployment end as "YYYY-MM-DD HH:MM" local time (defaults to one day after the start)
    #[arg(long)]
    end: Option<String>,

    /// Replace an existing configuration file
    #[arg(long)]
    force: bool,
}

pub fn run(args: &InitArgs, settings: &CliSettings) -> Result<()> {
    let dir = args.device.resolve(settings);
    if config_path(&dir).exists() && !args.force {
        bail!(
            "'{}' already exists; pass --force to replace it",
            config_path(&dir).display()
        );
    }

    let timezone_name = args
        .timezone
        .as_deref()
        .or(settings.default_timezone.as_deref())
        .unwrap_or("UTC");
    let timezone = parse_timezone(timezone_name)?;
    let today = Utc::now().with_timezone(&timezone).date_naive();

    let mut schedule = Schedule::new(timezone, today);
    if let Some(label) = &args.label {
        schedule.settings.label = label.clone();
    }

    let start = match &args.start {
        Some(value) => parse_local(value, timezone)?,
        None => LocalDateTime::midnight(today, timezone),
    };
    let end = match &args.end {
        Some(value) => parse_local(value, timezone)?,
        None => {
            let date = start
                .date
                .checked_add_days(Days::new(1))
                .context("deployment start is at the end of the calendar")?;
            LocalDateTime::new(date, start.time, timezone)
        }
    };
    schedule.set_deployment(DeploymentWindow::new(start, end));

    let path = write_config(&dir, &schedule).context("Failed to write configuration")?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn parse_local(value: &str, timezone: Tz) -> Result<LocalDateTime> {
    let (date, time) = value
        .trim()
        .split_once(' ')
        .with_context(|| format!("expected \"YYYY-MM-DD HH:MM\", got '{value}'"))?;
    Ok(LocalDateTime::parse(date, time, timezone.name())?)
}
