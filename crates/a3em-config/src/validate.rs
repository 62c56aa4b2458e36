use std::collections::HashSet;

use crate::errors::ValidationError;
use crate::model::{
    AudioMode, DeviceSettings, ImuMode, Phase, Schedule, TimeOfDayWindow, VhfPolicy,
    AUDIO_CLIP_LENGTH_S_RANGE, AUDIO_SAMPLE_RATE_HZ_RANGE, IMU_DEGREES_OF_FREEDOM,
    LEDS_ACTIVE_SECONDS_RANGE, MAGNET_FIELD_VALIDATION_MS_RANGE, MAX_AUDIO_TRIGGER_TIMES,
    MAX_DEVICE_LABEL_LEN, MIC_AMPLIFICATION_DB_RANGE, MIC_AMPLIFICATION_DB_STEP,
    VALID_IMU_SAMPLE_RATES_HZ,
};
use crate::time::{utc_seconds_of_day, TimeInstant};

/// Checks a schedule for temporal and logical consistency and returns the first violation.
///
/// Phases are visited in ascending order of their own start instant, never in declaration
/// order, and the encoder writes them in that same order. Checks run as:
///
/// 1. deployment start before end
/// 2. VHF activation not before the deployment start (skipped for `Never`)
/// 3. split schedules: at least one phase, names non-empty and unique; every live phase name
///    must be writable as a quoted value
/// 4. per phase: window presence, containment, start before end, no overlap with the
///    previous phase; interval and schedule-based audio consistency
/// 5. field ranges for the device settings, then for every phase
pub fn validate(schedule: &Schedule) -> Result<(), ValidationError> {
    let deployment = schedule.deployment();
    let deployment_start = deployment.start_instant()?;
    let deployment_end = deployment.end_instant()?;
    if deployment_start >= deployment_end {
        return Err(ValidationError::DeploymentWindowInverted);
    }

    if !matches!(schedule.vhf_policy(), VhfPolicy::Never)
        && schedule.vhf_start().to_instant()? < deployment_start
    {
        return Err(ValidationError::VhfBeforeDeploymentStart);
    }

    if schedule.is_split() {
        if schedule.phases().is_empty() {
            return Err(ValidationError::NoPhasesDefined);
        }
        check_phase_names(schedule.phases())?;
    }
    if let Some(phase) = schedule.phases().iter().find(|phase| !is_writable_text(&phase.name)) {
        return Err(ValidationError::UnwritablePhaseName {
            name: phase.name.clone(),
        });
    }

    let utc_offset = schedule.utc_offset_seconds()?;
    let ordered = schedule.phases_in_temporal_order()?;
    let mut previous: Option<(&str, TimeInstant)> = None;
    for phase in &ordered {
        if schedule.is_split() {
            let window = phase
                .window
                .as_ref()
                .ok_or_else(|| ValidationError::MissingPhaseWindow {
                    phase: phase.name.clone(),
                })?;
            let start = window.start_instant()?;
            let end = window.end_instant()?;
            if start < deployment_start || end > deployment_end {
                return Err(ValidationError::PhaseOutsideDeploymentWindow {
                    phase: phase.name.clone(),
                });
            }
            if start >= end {
                return Err(ValidationError::PhaseWindowInverted {
                    phase: phase.name.clone(),
                });
            }
            if let Some((previous_name, previous_end)) = previous {
                if start < previous_end {
                    return Err(ValidationError::OverlappingPhases {
                        previous: previous_name.to_string(),
                        phase: phase.name.clone(),
                    });
                }
            }
            previous = Some((phase.name.as_str(), end));
        }
        check_audio_timing(phase, utc_offset)?;
    }

    check_device_ranges(&schedule.settings)?;
    for phase in &ordered {
        check_phase_ranges(phase)?;
    }
    Ok(())
}

/// Daily audio windows shifted onto the UTC day as `(start, end)` seconds since UTC midnight,
/// sorted by corrected start. Ties keep declaration order.
pub fn utc_schedule_windows(windows: &[TimeOfDayWindow], utc_offset: i32) -> Vec<(i64, i64)> {
    let mut corrected: Vec<(i64, i64)> = windows
        .iter()
        .map(|window| {
            (
                utc_seconds_of_day(window.start, utc_offset),
                utc_seconds_of_day(window.end, utc_offset),
            )
        })
        .collect();
    corrected.sort_by_key(|(start, _)| *start);
    corrected
}

fn check_phase_names(phases: &[Phase]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(phases.len());
    for phase in phases {
        if phase.name.trim().is_empty() {
            return Err(ValidationError::EmptyPhaseName);
        }
        if !seen.insert(phase.name.as_str()) {
            return Err(ValidationError::DuplicatePhaseName {
                name: phase.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_audio_timing(phase: &Phase, utc_offset: i32) -> Result<(), ValidationError> {
    match &phase.audio.mode {
        AudioMode::IntervalBased {
            interval_value,
            interval_time_scale,
        } => {
            let interval_s = u64::from(*interval_value) * interval_time_scale.seconds();
            if u64::from(phase.audio.clip_length_s) > interval_s {
                return Err(ValidationError::ClipLongerThanInterval {
                    phase: phase.name.clone(),
                    clip_length_s: phase.audio.clip_length_s,
                    interval_s,
                });
            }
        }
        AudioMode::ScheduleBased { windows } => {
            if windows.is_empty() {
                return Err(ValidationError::EmptyAudioSchedule {
                    phase: phase.name.clone(),
                });
            }
            if windows.len() > MAX_AUDIO_TRIGGER_TIMES {
                return Err(ValidationError::TooManyScheduleWindows {
                    phase: phase.name.clone(),
                    max: MAX_AUDIO_TRIGGER_TIMES,
                });
            }
            let corrected = utc_schedule_windows(windows, utc_offset);
            if corrected.iter().any(|(start, end)| start >= end) {
                return Err(ValidationError::ScheduleWindowInverted {
                    phase: phase.name.clone(),
                });
            }
            let overlapping = corrected
                .windows(2)
                .any(|pair| pair[1].0 < pair[0].1);
            if overlapping {
                return Err(ValidationError::OverlappingScheduleWindows {
                    phase: phase.name.clone(),
                });
            }
        }
        AudioMode::ThresholdBased { .. } | AudioMode::Continuous => {}
    }
    Ok(())
}

fn check_device_ranges(settings: &DeviceSettings) -> Result<(), ValidationError> {
    if settings.label.chars().count() > MAX_DEVICE_LABEL_LEN || !is_writable_text(&settings.label)
    {
        return Err(ValidationError::out_of_range("DEVICE_LABEL", &settings.label));
    }
    if !LEDS_ACTIVE_SECONDS_RANGE.contains(&settings.leds_active_seconds) {
        return Err(ValidationError::out_of_range(
            "LEDS_ACTIVE_SECONDS",
            settings.leds_active_seconds,
        ));
    }
    let mic = settings.mic_amplification_db;
    if !MIC_AMPLIFICATION_DB_RANGE.contains(&mic) || (mic / MIC_AMPLIFICATION_DB_STEP).fract() != 0.0
    {
        return Err(ValidationError::out_of_range("MIC_AMPLIFICATION", mic));
    }
    if settings.awake_on_magnet
        && !MAGNET_FIELD_VALIDATION_MS_RANGE.contains(&settings.magnet_field_validation_ms)
    {
        return Err(ValidationError::out_of_range(
            "MAGNET_FIELD_VALIDATION_MS",
            settings.magnet_field_validation_ms,
        ));
    }
    Ok(())
}

fn check_phase_ranges(phase: &Phase) -> Result<(), ValidationError> {
    let name = phase.name.as_str();
    let audio = &phase.audio;
    if !AUDIO_SAMPLE_RATE_HZ_RANGE.contains(&audio.sample_rate_hz) {
        return Err(ValidationError::phase_out_of_range(
            name,
            "AUDIO_SAMPLING_RATE_HZ",
            audio.sample_rate_hz,
        ));
    }
    if !AUDIO_CLIP_LENGTH_S_RANGE.contains(&audio.clip_length_s) {
        return Err(ValidationError::phase_out_of_range(
            name,
            "AUDIO_CLIP_LENGTH_SECONDS",
            audio.clip_length_s,
        ));
    }
    match &audio.mode {
        AudioMode::ThresholdBased {
            trigger_level_db, ..
        } if !is_non_negative(*trigger_level_db) => {
            return Err(ValidationError::phase_out_of_range(
                name,
                "AUDIO_TRIGGER_THRESHOLD",
                trigger_level_db,
            ));
        }
        AudioMode::IntervalBased { interval_value, .. } if *interval_value == 0 => {
            return Err(ValidationError::phase_out_of_range(
                name,
                "AUDIO_TRIGGER_INTERVAL",
                interval_value,
            ));
        }
        _ => {}
    }

    let imu = &phase.imu;
    if imu.degrees_of_freedom != IMU_DEGREES_OF_FREEDOM {
        return Err(ValidationError::phase_out_of_range(
            name,
            "IMU_DEGREES_OF_FREEDOM",
            imu.degrees_of_freedom,
        ));
    }
    if !VALID_IMU_SAMPLE_RATES_HZ.contains(&imu.sample_rate_hz) {
        return Err(ValidationError::phase_out_of_range(
            name,
            "IMU_SAMPLING_RATE_HZ",
            imu.sample_rate_hz,
        ));
    }
    if let ImuMode::MotionBased {
        trigger_threshold_mg,
    } = imu.mode
    {
        if !is_non_negative(trigger_threshold_mg) {
            return Err(ValidationError::phase_out_of_range(
                name,
                "IMU_TRIGGER_THRESHOLD",
                trigger_threshold_mg,
            ));
        }
    }
    Ok(())
}

/// Free text is written between double quotes on a single line and read back with surrounding
/// whitespace and quotes stripped.
fn is_writable_text(value: &str) -> bool {
    value.trim() == value && !value.chars().any(|c| c == '"' || c.is_control())
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
