use std::str::FromStr;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::errors::{ParseError, TimeError};
use crate::model::{
    AudioMode, AudioModeKind, AudioPolicy, DeploymentWindow, DeviceSettings, ImuMode,
    ImuModeKind, ImuPolicy, Phase, Schedule, TimeOfDayWindow, TimeScale, VhfModeKind, VhfPolicy,
    DEFAULT_MAX_CLIPS, DEFAULT_MAX_CLIPS_TIME_SCALE, DEFAULT_TRIGGER_INTERVAL,
    DEFAULT_TRIGGER_INTERVAL_TIME_SCALE, DEFAULT_TRIGGER_THRESHOLD,
};
use crate::time::{
    from_instant, local_time_of_day, parse_timezone, utc_offset_seconds, LocalDateTime, TimeInstant,
};
use crate::tokens::WireEnum;

use super::keys::Key;
use super::PHASE_MARKER;

/// Parses the device configuration format into a schedule without validating it.
///
/// Timestamps are localized as soon as they are read, using the `DEVICE_TIMEZONE` seen so far
/// (UTC until then), so the timezone line has to precede every timestamp it applies to. Daily
/// audio windows are shifted back from the UTC day with the offset at the deployment start seen
/// so far. Unrecognized keys are skipped.
pub fn decode(text: &str) -> Result<Schedule, ParseError> {
    let mut decoder = Decoder::default();
    for (idx, raw) in text.lines().enumerate() {
        decoder.line(idx + 1, raw)?;
    }
    Ok(decoder.finish())
}

struct Decoder {
    timezone: Tz,
    settings: DeviceSettings,
    deployment_start: Option<LocalDateTime>,
    deployment_end: Option<LocalDateTime>,
    vhf_mode: VhfModeKind,
    vhf_start: Option<LocalDateTime>,
    split: bool,
    phases: Vec<PhaseDraft>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            settings: DeviceSettings::default(),
            deployment_start: None,
            deployment_end: None,
            vhf_mode: VhfModeKind::EndOfDeployment,
            vhf_start: None,
            split: false,
            phases: Vec::new(),
        }
    }
}

/// One `KEY = "VALUE"` statement with its position, for error reporting.
struct Entry<'a> {
    line: usize,
    key: &'a str,
    value: &'a str,
}

impl Decoder {
    fn line(&mut self, line: usize, raw: &str) -> Result<(), ParseError> {
        if let Some((key, value)) = raw.split_once('=') {
            let entry = Entry {
                line,
                key: key.trim(),
                value: value.trim_matches(|c: char| c.is_whitespace() || c == '"'),
            };
            return self.entry(&entry);
        }
        if raw.contains(PHASE_MARKER) {
            self.phases.push(PhaseDraft::default());
            return Ok(());
        }
        if raw.trim().is_empty() {
            return Ok(());
        }
        Err(ParseError::MalformedLine {
            line,
            content: raw.trim().to_string(),
        })
    }

    fn entry(&mut self, entry: &Entry<'_>) -> Result<(), ParseError> {
        let Some(key) = Key::lookup(entry.key) else {
            debug!(line = entry.line, key = entry.key, "ignoring unrecognized key");
            return Ok(());
        };

        if key == Key::AudioTriggerSchedule {
            self.current_phase(entry)?;
            let window = entry.schedule_window(self.schedule_offset(entry)?)?;
            self.current_phase(entry)?.windows.push(window);
            return Ok(());
        }
        if key.is_phase_key() {
            let timezone = self.timezone;
            return self.current_phase(entry)?.entry(key, entry, timezone);
        }

        let settings = &mut self.settings;
        match key {
            Key::DeviceLabel => settings.label = entry.value.to_string(),
            Key::DeviceTimezone => {
                self.timezone = parse_timezone(entry.value)
                    .map_err(|source| entry.time_error(source))?;
            }
            Key::DeviceUtcOffset | Key::DeviceUtcOffsetHour => {}
            Key::SetRtcAtMagnetDetect => settings.set_rtc_at_magnet_detect = entry.flag()?,
            Key::DeploymentStartTime => {
                self.deployment_start = Some(entry.timestamp(self.timezone)?);
            }
            Key::DeploymentEndTime => self.deployment_end = Some(entry.timestamp(self.timezone)?),
            Key::GpsAvailable => settings.gps_available = entry.flag()?,
            Key::AwakeOnMagnet => settings.awake_on_magnet = entry.flag()?,
            Key::LedsEnabled => settings.leds_enabled = entry.flag()?,
            Key::LedsActiveSeconds => settings.leds_active_seconds = entry.number()?,
            Key::MicAmplification => settings.mic_amplification_db = entry.number()?,
            Key::MagnetFieldValidationMs => settings.magnet_field_validation_ms = entry.number()?,
            Key::VhfMode => self.vhf_mode = entry.token()?,
            Key::VhfRadioStartTime => self.vhf_start = Some(entry.timestamp(self.timezone)?),
            Key::PhasedDeployment => self.split = entry.flag()?,
            _ => {}
        }
        Ok(())
    }

    fn current_phase(&mut self, entry: &Entry<'_>) -> Result<&mut PhaseDraft, ParseError> {
        self.phases
            .last_mut()
            .ok_or_else(|| ParseError::PhaseKeyOutsidePhase {
                line: entry.line,
                key: entry.key.to_string(),
            })
    }

    fn epoch_midnight(&self) -> LocalDateTime {
        LocalDateTime::midnight(NaiveDate::default(), self.timezone)
    }

    fn schedule_offset(&self, entry: &Entry<'_>) -> Result<i32, ParseError> {
        let start = self
            .deployment_start
            .unwrap_or_else(|| self.epoch_midnight());
        start
            .to_instant()
            .and_then(|instant| utc_offset_seconds(self.timezone, instant))
            .map_err(|source| entry.time_error(source))
    }

    fn finish(self) -> Schedule {
        let fallback = self.epoch_midnight();
        let mut schedule = Schedule::new(self.timezone, fallback.date);
        schedule.settings = self.settings;
        let deployment = DeploymentWindow::new(
            self.deployment_start.unwrap_or(fallback),
            self.deployment_end.unwrap_or(fallback),
        );
        schedule.set_deployment(deployment);
        schedule.set_vhf_policy(match self.vhf_mode {
            VhfModeKind::Never => VhfPolicy::Never,
            VhfModeKind::EndOfDeployment => VhfPolicy::EndOfDeployment,
            VhfModeKind::Scheduled => VhfPolicy::Scheduled(self.vhf_start.unwrap_or(deployment.end)),
        });
        schedule.set_split(self.split);

        let split = self.split;
        for (idx, draft) in self.phases.into_iter().enumerate() {
            let phase = draft.into_phase(split);
            debug!(phase = %phase.name, split, "decoded phase block");
            if split {
                schedule.add_phase(phase);
            } else if idx == 0 {
                schedule.set_default_phase(phase);
            } else {
                warn!(
                    phase = %phase.name,
                    "extra phase block in a non-phased configuration kept as an inactive custom phase"
                );
                schedule.add_phase(phase);
            }
        }
        schedule
    }
}

/// Raw fields of one `[PHASE]` block. Every key is optional, so fields start from the defaults
/// and the modes are assembled only once the block is complete.
struct PhaseDraft {
    name: String,
    start: Option<LocalDateTime>,
    end: Option<LocalDateTime>,
    audio_mode: AudioModeKind,
    extend_clip: bool,
    max_clips: u32,
    max_clips_time_scale: TimeScale,
    audio_threshold: f64,
    interval: u32,
    interval_time_scale: TimeScale,
    windows: Vec<TimeOfDayWindow>,
    audio_sample_rate_hz: u32,
    clip_length_s: u32,
    imu_mode: ImuModeKind,
    degrees_of_freedom: u8,
    imu_threshold: f64,
    imu_sample_rate_hz: u16,
}

impl Default for PhaseDraft {
    fn default() -> Self {
        let audio = AudioPolicy::default();
        let imu = ImuPolicy::default();
        Self {
            name: String::new(),
            start: None,
            end: None,
            audio_mode: audio.mode.kind(),
            extend_clip: audio.extend_clip_if_continuous,
            max_clips: DEFAULT_MAX_CLIPS,
            max_clips_time_scale: DEFAULT_MAX_CLIPS_TIME_SCALE,
            audio_threshold: DEFAULT_TRIGGER_THRESHOLD,
            interval: DEFAULT_TRIGGER_INTERVAL,
            interval_time_scale: DEFAULT_TRIGGER_INTERVAL_TIME_SCALE,
            windows: Vec::new(),
            audio_sample_rate_hz: audio.sample_rate_hz,
            clip_length_s: audio.clip_length_s,
            imu_mode: imu.mode.kind(),
            degrees_of_freedom: imu.degrees_of_freedom,
            imu_threshold: DEFAULT_TRIGGER_THRESHOLD,
            imu_sample_rate_hz: imu.sample_rate_hz,
        }
    }
}

impl PhaseDraft {
    fn entry(&mut self, key: Key, entry: &Entry<'_>, timezone: Tz) -> Result<(), ParseError> {
        match key {
            Key::PhaseName => self.name = entry.value.to_string(),
            Key::PhaseStartTime => self.start = Some(entry.timestamp(timezone)?),
            Key::PhaseEndTime => self.end = Some(entry.timestamp(timezone)?),
            Key::AudioRecordingMode => self.audio_mode = entry.token()?,
            Key::AudioExtendClip => self.extend_clip = entry.flag()?,
            Key::AudioMaxClipsNumber => self.max_clips = entry.number()?,
            Key::AudioMaxClipsTimeScale => self.max_clips_time_scale = entry.token()?,
            Key::AudioTriggerThreshold => self.audio_threshold = entry.number()?,
            Key::AudioTriggerInterval => self.interval = entry.number()?,
            Key::AudioTriggerIntervalTimeScale => self.interval_time_scale = entry.token()?,
            Key::AudioSamplingRateHz => self.audio_sample_rate_hz = entry.number()?,
            Key::AudioClipLengthSeconds => self.clip_length_s = entry.number()?,
            Key::ImuRecordingMode => self.imu_mode = entry.token()?,
            Key::ImuDegreesOfFreedom => self.degrees_of_freedom = entry.number()?,
            Key::ImuTriggerThreshold => self.imu_threshold = entry.number()?,
            Key::ImuSamplingRateHz => self.imu_sample_rate_hz = entry.number()?,
            _ => {}
        }
        Ok(())
    }

    fn into_phase(self, split: bool) -> Phase {
        let window = match (split, self.start, self.end) {
            (true, Some(start), Some(end)) => Some(DeploymentWindow::new(start, end)),
            _ => None,
        };
        let mode = match self.audio_mode {
            AudioModeKind::ThresholdBased => AudioMode::ThresholdBased {
                trigger_level_db: self.audio_threshold,
                max_clips: self.max_clips,
                max_clips_time_scale: self.max_clips_time_scale,
            },
            AudioModeKind::ScheduleBased => AudioMode::ScheduleBased {
                windows: self.windows,
            },
            AudioModeKind::IntervalBased => AudioMode::IntervalBased {
                interval_value: self.interval,
                interval_time_scale: self.interval_time_scale,
            },
            AudioModeKind::Continuous => AudioMode::Continuous,
        };
        let imu_mode = match self.imu_mode {
            ImuModeKind::MotionBased => ImuMode::MotionBased {
                trigger_threshold_mg: self.imu_threshold,
            },
            kind => ImuMode::with_defaults(kind),
        };
        Phase {
            name: self.name,
            window,
            audio: AudioPolicy {
                mode,
                sample_rate_hz: self.audio_sample_rate_hz,
                clip_length_s: self.clip_length_s,
                extend_clip_if_continuous: self.extend_clip,
            },
            imu: ImuPolicy {
                mode: imu_mode,
                degrees_of_freedom: self.degrees_of_freedom,
                sample_rate_hz: self.imu_sample_rate_hz,
            },
        }
    }
}

impl Entry<'_> {
    fn invalid(&self, message: impl Into<String>) -> ParseError {
        ParseError::InvalidValue {
            line: self.line,
            key: self.key.to_string(),
            value: self.value.to_string(),
            message: message.into(),
        }
    }

    fn time_error(&self, source: TimeError) -> ParseError {
        ParseError::Timezone {
            line: self.line,
            key: self.key.to_string(),
            source,
        }
    }

    fn flag(&self) -> Result<bool, ParseError> {
        match self.value {
            "True" => Ok(true),
            "False" => Ok(false),
            _ => Err(self.invalid("expected True or False")),
        }
    }

    fn number<T>(&self) -> Result<T, ParseError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.value
            .parse::<T>()
            .map_err(|err| self.invalid(err.to_string()))
    }

    fn token<E: WireEnum>(&self) -> Result<E, ParseError> {
        E::from_token(self.value).ok_or_else(|| ParseError::UnknownEnumToken {
            line: self.line,
            key: self.key.to_string(),
            token: self.value.to_string(),
        })
    }

    fn timestamp(&self, timezone: Tz) -> Result<LocalDateTime, ParseError> {
        let seconds = self
            .value
            .parse::<i64>()
            .map_err(|_| ParseError::MalformedTimestamp {
                line: self.line,
                key: self.key.to_string(),
                value: self.value.to_string(),
            })?;
        from_instant(TimeInstant(seconds), timezone).map_err(|source| self.time_error(source))
    }

    fn schedule_window(&self, utc_offset: i32) -> Result<TimeOfDayWindow, ParseError> {
        let (start, end) = self
            .value
            .split_once('-')
            .ok_or_else(|| self.invalid("expected <start_seconds>-<end_seconds>"))?;
        let start = self.seconds_of_day(start, utc_offset)?;
        let end = self.seconds_of_day(end, utc_offset)?;
        Ok(TimeOfDayWindow::new(start, end))
    }

    fn seconds_of_day(&self, value: &str, utc_offset: i32) -> Result<chrono::NaiveTime, ParseError> {
        let seconds = value
            .trim()
            .parse::<i64>()
            .map_err(|err| self.invalid(err.to_string()))?;
        local_time_of_day(seconds, utc_offset)
            .ok_or_else(|| self.invalid("seconds since midnight must be within one day"))
    }
}
