use std::fmt;
use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::TimeError;
use crate::time::{
    format_time_of_day, from_instant, parse_time_of_day, utc_offset_seconds, LocalDateTime,
    TimeInstant,
};
use crate::tokens::WireEnum;

pub const CONFIG_FILE_NAME: &str = "_a3em.cfg";
pub const DEFAULT_PHASE_NAME: &str = "Default";
pub const MAX_DEVICE_LABEL_LEN: usize = 15;
pub const MAX_AUDIO_TRIGGER_TIMES: usize = 12;

pub const LEDS_ACTIVE_SECONDS_RANGE: RangeInclusive<u32> = 0..=604_800;
pub const MIC_AMPLIFICATION_DB_RANGE: RangeInclusive<f64> = 0.0..=45.0;
pub const MIC_AMPLIFICATION_DB_STEP: f64 = 0.5;
pub const MAGNET_FIELD_VALIDATION_MS_RANGE: RangeInclusive<u32> = 1_000..=30_000;
pub const AUDIO_SAMPLE_RATE_HZ_RANGE: RangeInclusive<u32> = 8_000..=96_000;
pub const AUDIO_CLIP_LENGTH_S_RANGE: RangeInclusive<u32> = 1..=3_600;
pub const IMU_DEGREES_OF_FREEDOM: u8 = 3;
pub const VALID_IMU_SAMPLE_RATES_HZ: [u16; 9] = [3, 6, 12, 25, 50, 100, 200, 400, 800];

pub const DEFAULT_TRIGGER_THRESHOLD: f64 = 0.25;
pub const DEFAULT_MAX_CLIPS: u32 = 0;
pub const DEFAULT_MAX_CLIPS_TIME_SCALE: TimeScale = TimeScale::Hour;
pub const DEFAULT_TRIGGER_INTERVAL: u32 = 10;
pub const DEFAULT_TRIGGER_INTERVAL_TIME_SCALE: TimeScale = TimeScale::Minute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScale {
    Second,
    Minute,
    Hour,
    Day,
}

impl TimeScale {
    pub fn seconds(self) -> u64 {
        match self {
            TimeScale::Second => 1,
            TimeScale::Minute => 60,
            TimeScale::Hour => 3_600,
            TimeScale::Day => 86_400,
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub label: String,
    pub gps_available: bool,
    pub leds_enabled: bool,
    pub leds_active_seconds: u32,
    pub mic_amplification_db: f64,
    pub awake_on_magnet: bool,
    pub magnet_field_validation_ms: u32,
    pub set_rtc_at_magnet_detect: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            label: String::new(),
            gps_available: false,
            leds_enabled: true,
            leds_active_seconds: 3_600,
            mic_amplification_db: 35.0,
            awake_on_magnet: true,
            magnet_field_validation_ms: 5_000,
            set_rtc_at_magnet_detect: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentWindow {
    pub start: LocalDateTime,
    pub end: LocalDateTime,
}

impl DeploymentWindow {
    pub fn new(start: LocalDateTime, end: LocalDateTime) -> Self {
        Self { start, end }
    }

    pub fn start_instant(&self) -> Result<TimeInstant, TimeError> {
        self.start.to_instant()
    }

    pub fn end_instant(&self) -> Result<TimeInstant, TimeError> {
        self.end.to_instant()
    }

    fn with_timezone(self, timezone: Tz) -> Self {
        Self {
            start: self.start.with_timezone(timezone),
            end: self.end.with_timezone(timezone),
        }
    }
}

/// Daily recurring audio capture interval in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDayWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeOfDayWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, TimeError> {
        Ok(Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
    }
}

impl fmt::Display for TimeOfDayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            format_time_of_day(self.start),
            format_time_of_day(self.end)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioModeKind {
    ThresholdBased,
    ScheduleBased,
    IntervalBased,
    Continuous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AudioMode {
    ThresholdBased {
        trigger_level_db: f64,
        max_clips: u32,
        max_clips_time_scale: TimeScale,
    },
    ScheduleBased {
        windows: Vec<TimeOfDayWindow>,
    },
    IntervalBased {
        interval_value: u32,
        interval_time_scale: TimeScale,
    },
    Continuous,
}

impl AudioMode {
    pub fn kind(&self) -> AudioModeKind {
        match self {
            AudioMode::ThresholdBased { .. } => AudioModeKind::ThresholdBased,
            AudioMode::ScheduleBased { .. } => AudioModeKind::ScheduleBased,
            AudioMode::IntervalBased { .. } => AudioModeKind::IntervalBased,
            AudioMode::Continuous => AudioModeKind::Continuous,
        }
    }

    /// Mode with its default parameters.
    pub fn with_defaults(kind: AudioModeKind) -> Self {
        match kind {
            AudioModeKind::ThresholdBased => AudioMode::ThresholdBased {
                trigger_level_db: DEFAULT_TRIGGER_THRESHOLD,
                max_clips: DEFAULT_MAX_CLIPS,
                max_clips_time_scale: DEFAULT_MAX_CLIPS_TIME_SCALE,
            },
            AudioModeKind::ScheduleBased => AudioMode::ScheduleBased {
                windows: Vec::new(),
            },
            AudioModeKind::IntervalBased => AudioMode::IntervalBased {
                interval_value: DEFAULT_TRIGGER_INTERVAL,
                interval_time_scale: DEFAULT_TRIGGER_INTERVAL_TIME_SCALE,
            },
            AudioModeKind::Continuous => AudioMode::Continuous,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioPolicy {
    pub mode: AudioMode,
    pub sample_rate_hz: u32,
    pub clip_length_s: u32,
    pub extend_clip_if_continuous: bool,
}

impl Default for AudioPolicy {
    fn default() -> Self {
        Self {
            mode: AudioMode::with_defaults(AudioModeKind::ThresholdBased),
            sample_rate_hz: 20_000,
            clip_length_s: 10,
            extend_clip_if_continuous: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImuModeKind {
    MotionBased,
    AudioSynced,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ImuMode {
    MotionBased { trigger_threshold_mg: f64 },
    AudioSynced,
    None,
}

impl ImuMode {
    pub fn kind(&self) -> ImuModeKind {
        match self {
            ImuMode::MotionBased { .. } => ImuModeKind::MotionBased,
            ImuMode::AudioSynced => ImuModeKind::AudioSynced,
            ImuMode::None => ImuModeKind::None,
        }
    }

    pub fn with_defaults(kind: ImuModeKind) -> Self {
        match kind {
            ImuModeKind::MotionBased => ImuMode::MotionBased {
                trigger_threshold_mg: DEFAULT_TRIGGER_THRESHOLD,
            },
            ImuModeKind::AudioSynced => ImuMode::AudioSynced,
            ImuModeKind::None => ImuMode::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuPolicy {
    pub mode: ImuMode,
    pub degrees_of_freedom: u8,
    pub sample_rate_hz: u16,
}

impl Default for ImuPolicy {
    fn default() -> Self {
        Self {
            mode: ImuMode::AudioSynced,
            degrees_of_freedom: IMU_DEGREES_OF_FREEDOM,
            sample_rate_hz: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    /// Present only while the owning schedule is split.
    pub window: Option<DeploymentWindow>,
    pub audio: AudioPolicy,
    pub imu: ImuPolicy,
}

impl Phase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            window: None,
            audio: AudioPolicy::default(),
            imu: ImuPolicy::default(),
        }
    }

    pub fn with_window(name: impl Into<String>, window: DeploymentWindow) -> Self {
        Self {
            window: Some(window),
            ..Self::new(name)
        }
    }

    fn start_key(&self) -> Result<Option<TimeInstant>, TimeError> {
        self.window
            .as_ref()
            .map(DeploymentWindow::start_instant)
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VhfModeKind {
    Never,
    EndOfDeployment,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VhfPolicy {
    Never,
    EndOfDeployment,
    Scheduled(LocalDateTime),
}

impl VhfPolicy {
    pub fn kind(&self) -> VhfModeKind {
        match self {
            VhfPolicy::Never => VhfModeKind::Never,
            VhfPolicy::EndOfDeployment => VhfModeKind::EndOfDeployment,
            VhfPolicy::Scheduled(_) => VhfModeKind::Scheduled,
        }
    }
}

/// Root of a deployment configuration. Fields with derived state are private and change only
/// through the setters below, which recompute what depends on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub settings: DeviceSettings,
    timezone: Tz,
    deployment: DeploymentWindow,
    vhf_policy: VhfPolicy,
    vhf_start: LocalDateTime,
    is_split: bool,
    default_phase: Phase,
    custom_phases: Vec<Phase>,
}

impl Schedule {
    /// Fresh schedule starting and ending at midnight of `today`, with default settings.
    pub fn new(timezone: Tz, today: NaiveDate) -> Self {
        let midnight = LocalDateTime::midnight(today, timezone);
        Self {
            settings: DeviceSettings::default(),
            timezone,
            deployment: DeploymentWindow::new(midnight, midnight),
            vhf_policy: VhfPolicy::EndOfDeployment,
            vhf_start: midnight,
            is_split: false,
            default_phase: Phase::new(DEFAULT_PHASE_NAME),
            custom_phases: Vec::new(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Switches the device timezone. Every stored wall-clock reading keeps its text and is
    /// reinterpreted in the new zone.
    pub fn set_timezone(&mut self, timezone: Tz) {
        self.timezone = timezone;
        self.deployment = self.deployment.with_timezone(timezone);
        if let VhfPolicy::Scheduled(at) = self.vhf_policy {
            self.vhf_policy = VhfPolicy::Scheduled(at.with_timezone(timezone));
        }
        self.vhf_start = self.vhf_start.with_timezone(timezone);
        for phase in std::iter::once(&mut self.default_phase).chain(self.custom_phases.iter_mut()) {
            phase.window = phase.window.map(|window| window.with_timezone(timezone));
        }
        self.refresh_vhf_start();
    }

    pub fn deployment(&self) -> &DeploymentWindow {
        &self.deployment
    }

    /// Readings given in another zone keep their wall-clock text and are reinterpreted in the
    /// device timezone, as [`Schedule::set_timezone`] does.
    pub fn set_deployment(&mut self, window: DeploymentWindow) {
        self.deployment = window.with_timezone(self.timezone);
        self.refresh_vhf_start();
    }

    pub fn set_deployment_start(&mut self, start: LocalDateTime) {
        self.deployment.start = start.with_timezone(self.timezone);
    }

    pub fn set_deployment_end(&mut self, end: LocalDateTime) {
        self.deployment.end = end.with_timezone(self.timezone);
        self.refresh_vhf_start();
    }

    /// Offset of the device timezone at the deployment start. Daily audio windows are shifted
    /// onto the UTC day with this value, both when validating and when encoding.
    pub fn utc_offset_seconds(&self) -> Result<i32, TimeError> {
        utc_offset_seconds(self.timezone, self.deployment.start_instant()?)
    }

    pub fn vhf_policy(&self) -> &VhfPolicy {
        &self.vhf_policy
    }

    pub fn set_vhf_policy(&mut self, policy: VhfPolicy) {
        self.vhf_policy = match policy {
            VhfPolicy::Scheduled(at) => VhfPolicy::Scheduled(at.with_timezone(self.timezone)),
            other => other,
        };
        self.refresh_vhf_start();
    }

    /// Wall-clock reading at which the VHF beacon switches on.
    pub fn vhf_start(&self) -> &LocalDateTime {
        &self.vhf_start
    }

    fn refresh_vhf_start(&mut self) {
        self.vhf_start = match self.vhf_policy {
            VhfPolicy::Never => from_instant(TimeInstant::NEVER_SENTINEL, self.timezone)
                .unwrap_or(self.vhf_start),
            VhfPolicy::EndOfDeployment => self.deployment.end,
            VhfPolicy::Scheduled(at) => at,
        };
    }

    pub fn is_split(&self) -> bool {
        self.is_split
    }

    /// Turning the split on makes the custom phase list live. Turning it off reverts to the
    /// implicit phase and drops every custom phase window; the custom policies are kept.
    pub fn set_split(&mut self, split: bool) {
        if self.is_split && !split {
            for phase in &mut self.custom_phases {
                phase.window = None;
            }
        }
        self.is_split = split;
    }

    /// Live phase list: the custom phases when split, otherwise the single implicit phase.
    pub fn phases(&self) -> &[Phase] {
        if self.is_split {
            &self.custom_phases
        } else {
            std::slice::from_ref(&self.default_phase)
        }
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases().iter().find(|phase| phase.name == name)
    }

    pub fn phase_mut(&mut self, name: &str) -> Option<&mut Phase> {
        if self.is_split {
            self.custom_phases.iter_mut().find(|phase| phase.name == name)
        } else if self.default_phase.name == name {
            Some(&mut self.default_phase)
        } else {
            None
        }
    }

    pub fn default_phase(&self) -> &Phase {
        &self.default_phase
    }

    pub fn default_phase_mut(&mut self) -> &mut Phase {
        &mut self.default_phase
    }

    pub fn set_default_phase(&mut self, phase: Phase) {
        self.default_phase = Phase {
            window: None,
            ..phase
        };
    }

    pub fn custom_phases(&self) -> &[Phase] {
        &self.custom_phases
    }

    pub fn add_phase(&mut self, phase: Phase) {
        let timezone = self.timezone;
        self.custom_phases.push(Phase {
            window: phase.window.map(|window| window.with_timezone(timezone)),
            ..phase
        });
    }

    pub fn remove_phase(&mut self, name: &str) -> Option<Phase> {
        let idx = self.custom_phases.iter().position(|phase| phase.name == name)?;
        Some(self.custom_phases.remove(idx))
    }

    pub fn clear_custom_phases(&mut self) {
        self.custom_phases.clear();
    }

    /// Live phases sorted by their own start instant. Declaration order only breaks ties;
    /// phases without a window sort first.
    pub fn phases_in_temporal_order(&self) -> Result<Vec<&Phase>, TimeError> {
        let mut keyed = self
            .phases()
            .iter()
            .map(|phase| Ok((phase.start_key()?, phase)))
            .collect::<Result<Vec<_>, TimeError>>()?;
        keyed.sort_by_key(|(key, _)| *key);
        Ok(keyed.into_iter().map(|(_, phase)| phase).collect())
    }
}
