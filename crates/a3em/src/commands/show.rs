use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use a3em_config::{
    read_config, AudioMode, ImuMode, Phase, Schedule, TimeOfDayWindow, VhfPolicy, WireEnum,
};

use crate::settings::CliSettings;
use crate::DeviceArgs;

#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    #[command(flatten)]
    device: DeviceArgs,

    /// Print the decoded schedule as JSON instead of tables
    #[arg(long)]
    json: bool,
}

pub fn run(args: &ShowArgs, settings: &CliSettings) -> Result<()> {
    let dir = args.device.resolve(settings);
    let schedule = read_config(&dir)
        .with_context(|| format!("Failed to load configuration from '{}'", dir.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
        return Ok(());
    }

    println!("{}", device_table(&schedule));
    println!("{}", phase_table(&schedule)?);
    Ok(())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn on_off(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn device_table(schedule: &Schedule) -> Table {
    let settings = &schedule.settings;
    let deployment = schedule.deployment();
    let policy = schedule.vhf_policy();
    let vhf = match policy {
        VhfPolicy::Never => policy.kind().label().to_string(),
        _ => format!("{} ({})", policy.kind().label(), schedule.vhf_start()),
    };

    let mut table = new_table(vec!["Setting", "Value"]);
    table
        .add_row(vec!["Label".to_string(), settings.label.clone()])
        .add_row(vec!["Timezone".to_string(), schedule.timezone().name().to_string()])
        .add_row(vec!["Deployment start".to_string(), deployment.start.to_string()])
        .add_row(vec!["Deployment end".to_string(), deployment.end.to_string()])
        .add_row(vec!["VHF beacon".to_string(), vhf])
        .add_row(vec!["Phased".to_string(), on_off(schedule.is_split()).to_string()])
        .add_row(vec!["GPS".to_string(), on_off(settings.gps_available).to_string()])
        .add_row(vec![
            "LEDs".to_string(),
            format!(
                "{} for {} s",
                on_off(settings.leds_enabled),
                settings.leds_active_seconds
            ),
        ])
        .add_row(vec![
            "Mic amplification".to_string(),
            format!("{} dB", settings.mic_amplification_db),
        ])
        .add_row(vec![
            "Wake on magnet".to_string(),
            format!(
                "{} ({} ms validation)",
                on_off(settings.awake_on_magnet),
                settings.magnet_field_validation_ms
            ),
        ])
        .add_row(vec![
            "Set clock on magnet".to_string(),
            on_off(settings.set_rtc_at_magnet_detect).to_string(),
        ]);
    table
}

fn phase_table(schedule: &Schedule) -> Result<Table> {
    let mut table = new_table(vec!["Phase", "Window", "Audio", "IMU"]);
    for phase in schedule.phases_in_temporal_order()? {
        table.add_row(vec![
            phase.name.clone(),
            describe_window(phase),
            describe_audio(phase),
            describe_imu(phase),
        ]);
    }
    Ok(table)
}

fn describe_window(phase: &Phase) -> String {
    match &phase.window {
        Some(window) => format!("{} to {}", window.start, window.end),
        None => "whole deployment".to_string(),
    }
}

fn describe_audio(phase: &Phase) -> String {
    let audio = &phase.audio;
    let detail = match &audio.mode {
        AudioMode::ThresholdBased {
            trigger_level_db,
            max_clips,
            max_clips_time_scale,
        } => format!("above {trigger_level_db} dB, at most {max_clips} clips per {max_clips_time_scale}"),
        AudioMode::ScheduleBased { windows } => windows
            .iter()
            .map(TimeOfDayWindow::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        AudioMode::IntervalBased {
            interval_value,
            interval_time_scale,
        } => format!("every {interval_value} x {interval_time_scale}"),
        AudioMode::Continuous if audio.extend_clip_if_continuous => "clips extended".to_string(),
        AudioMode::Continuous => String::new(),
    };
    format!(
        "{}: {}\n{} Hz, {} s clips",
        audio.mode.kind().label(),
        detail,
        audio.sample_rate_hz,
        audio.clip_length_s
    )
}

fn describe_imu(phase: &Phase) -> String {
    let imu = &phase.imu;
    match imu.mode {
        ImuMode::None => imu.mode.kind().label().to_string(),
        ImuMode::MotionBased {
            trigger_threshold_mg,
        } => format!(
            "{} above {} mg\n{} Hz, {} DOF",
            imu.mode.kind().label(),
            trigger_threshold_mg,
            imu.sample_rate_hz,
            imu.degrees_of_freedom
        ),
        ImuMode::AudioSynced => format!(
            "{}\n{} Hz, {} DOF",
            imu.mode.kind().label(),
            imu.sample_rate_hz,
            imu.degrees_of_freedom
        ),
    }
}
