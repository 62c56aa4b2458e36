use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod settings;

use commands::init::InitArgs;
use commands::show::ShowArgs;
use settings::CliSettings;

/// Inspect, check and write A3EM device configuration files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML settings file (defaults to $A3EM_SETTINGS)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the configuration stored on a device
    Show(ShowArgs),
    /// Check a device configuration and report the first problem found
    Validate(DeviceArgs),
    /// Write a fresh default configuration
    Init(InitArgs),
    /// Rewrite a configuration in canonical form
    Normalize(DeviceArgs),
}

#[derive(Args, Debug, Default)]
pub struct DeviceArgs {
    /// Directory holding _a3em.cfg (defaults to the settings file, then $A3EM_DEVICE_DIR)
    #[arg(long)]
    dir: Option<PathBuf>,
}

impl DeviceArgs {
    pub fn resolve(&self, settings: &CliSettings) -> PathBuf {
        self.dir
            .clone()
            .or_else(|| settings.device_dir.clone())
            .or_else(|| std::env::var_os("A3EM_DEVICE_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = CliSettings::load(cli.settings.as_deref())?;
    init_tracing(cli.json_logs || settings.json_logs);

    match cli.command {
        Command::Show(args) => commands::show::run(&args, &settings),
        Command::Validate(args) => commands::check::validate(&args, &settings),
        Command::Init(args) => commands::init::run(&args, &settings),
        Command::Normalize(args) => commands::check::normalize(&args, &settings),
    }
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
