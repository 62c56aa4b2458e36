use std::fmt::Display;

use crate::errors::Result;
use crate::model::{
    AudioMode, ImuMode, Phase, Schedule, DEFAULT_MAX_CLIPS, DEFAULT_MAX_CLIPS_TIME_SCALE,
    DEFAULT_TRIGGER_INTERVAL, DEFAULT_TRIGGER_INTERVAL_TIME_SCALE, DEFAULT_TRIGGER_THRESHOLD,
};
use crate::time::TimeInstant;
use crate::tokens::WireEnum;
use crate::validate::{utc_schedule_windows, validate};

use super::keys::Key;
use super::PHASE_MARKER;

/// Serializes a schedule into the device configuration format.
///
/// The schedule is validated first; an invalid schedule is reported, never written. Phases are
/// emitted in temporal order and daily audio windows as UTC seconds-since-midnight pairs.
pub fn encode(schedule: &Schedule) -> Result<String> {
    validate(schedule)?;

    let utc_offset = schedule.utc_offset_seconds()?;
    let settings = &schedule.settings;
    let mut out = ConfigWriter::default();

    out.entry(Key::DeviceLabel, &settings.label);
    out.entry(Key::DeviceTimezone, schedule.timezone().name());
    out.entry(Key::DeviceUtcOffset, utc_offset);
    out.entry(Key::DeviceUtcOffsetHour, utc_offset.div_euclid(3_600));
    out.flag(Key::SetRtcAtMagnetDetect, settings.set_rtc_at_magnet_detect);
    out.entry(Key::DeploymentStartTime, schedule.deployment().start_instant()?);
    out.entry(Key::DeploymentEndTime, schedule.deployment().end_instant()?);
    out.flag(Key::GpsAvailable, settings.gps_available);
    out.flag(Key::AwakeOnMagnet, settings.awake_on_magnet);
    out.flag(Key::LedsEnabled, settings.leds_enabled);
    out.entry(Key::LedsActiveSeconds, settings.leds_active_seconds);
    out.decimal(Key::MicAmplification, settings.mic_amplification_db);
    out.entry(
        Key::MagnetFieldValidationMs,
        settings.magnet_field_validation_ms,
    );
    out.entry(Key::VhfMode, schedule.vhf_policy().kind().token());
    out.entry(Key::VhfRadioStartTime, vhf_instant(schedule)?);
    out.flag(Key::PhasedDeployment, schedule.is_split());

    for phase in schedule.phases_in_temporal_order()? {
        out.phase_marker();
        encode_phase(&mut out, phase, schedule.is_split(), utc_offset)?;
    }

    Ok(out.finish())
}

fn vhf_instant(schedule: &Schedule) -> Result<TimeInstant> {
    Ok(schedule.vhf_start().to_instant()?)
}

fn encode_phase(out: &mut ConfigWriter, phase: &Phase, split: bool, utc_offset: i32) -> Result<()> {
    out.entry(Key::PhaseName, &phase.name);
    if let (true, Some(window)) = (split, &phase.window) {
        out.entry(Key::PhaseStartTime, window.start_instant()?);
        out.entry(Key::PhaseEndTime, window.end_instant()?);
    }

    let audio = &phase.audio;
    let (trigger_level_db, max_clips, max_clips_time_scale) = match &audio.mode {
        AudioMode::ThresholdBased {
            trigger_level_db,
            max_clips,
            max_clips_time_scale,
        } => (*trigger_level_db, *max_clips, *max_clips_time_scale),
        _ => (
            DEFAULT_TRIGGER_THRESHOLD,
            DEFAULT_MAX_CLIPS,
            DEFAULT_MAX_CLIPS_TIME_SCALE,
        ),
    };
    let (interval_value, interval_time_scale) = match &audio.mode {
        AudioMode::IntervalBased {
            interval_value,
            interval_time_scale,
        } => (*interval_value, *interval_time_scale),
        _ => (DEFAULT_TRIGGER_INTERVAL, DEFAULT_TRIGGER_INTERVAL_TIME_SCALE),
    };

    out.entry(Key::AudioRecordingMode, audio.mode.kind().token());
    out.flag(Key::AudioExtendClip, audio.extend_clip_if_continuous);
    out.entry(Key::AudioMaxClipsNumber, max_clips);
    out.entry(Key::AudioMaxClipsTimeScale, max_clips_time_scale.token());
    out.decimal(Key::AudioTriggerThreshold, trigger_level_db);
    out.entry(Key::AudioTriggerInterval, interval_value);
    out.entry(
        Key::AudioTriggerIntervalTimeScale,
        interval_time_scale.token(),
    );
    if let AudioMode::ScheduleBased { windows } = &audio.mode {
        for (start, end) in utc_schedule_windows(windows, utc_offset) {
            out.entry(Key::AudioTriggerSchedule, format!("{start}-{end}"));
        }
    }
    out.entry(Key::AudioSamplingRateHz, audio.sample_rate_hz);
    out.entry(Key::AudioClipLengthSeconds, audio.clip_length_s);

    let imu = &phase.imu;
    let imu_threshold = match imu.mode {
        ImuMode::MotionBased {
            trigger_threshold_mg,
        } => trigger_threshold_mg,
        ImuMode::AudioSynced | ImuMode::None => DEFAULT_TRIGGER_THRESHOLD,
    };
    out.entry(Key::ImuRecordingMode, imu.mode.kind().token());
    out.entry(Key::ImuDegreesOfFreedom, imu.degrees_of_freedom);
    out.decimal(Key::ImuTriggerThreshold, imu_threshold);
    out.entry(Key::ImuSamplingRateHz, imu.sample_rate_hz);
    Ok(())
}

#[derive(Default)]
struct ConfigWriter {
    buffer: String,
}

impl ConfigWriter {
    fn entry(&mut self, key: Key, value: impl Display) {
        self.buffer
            .push_str(&format!("{} = \"{}\"\n", key.as_str(), value));
    }

    fn flag(&mut self, key: Key, value: bool) {
        self.entry(key, if value { "True" } else { "False" });
    }

    fn decimal(&mut self, key: Key, value: f64) {
        self.entry(key, format_decimal(value));
    }

    fn phase_marker(&mut self) {
        self.buffer.push('\n');
        self.buffer.push_str(PHASE_MARKER);
        self.buffer.push('\n');
    }

    fn finish(self) -> String {
        self.buffer
    }
}

/// Floats always carry a fractional part (`35.0`, `0.25`), which is what the firmware expects.
pub(crate) fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
