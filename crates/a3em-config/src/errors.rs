use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("unrecognized timezone '{0}'")]
    InvalidTimezone(String),

    #[error("invalid local time '{value}': {reason}")]
    InvalidLocalTime { value: String, reason: String },
}

impl TimeError {
    pub(crate) fn local_time(value: impl Into<String>, reason: impl Into<String>) -> Self {
        TimeError::InvalidLocalTime {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: malformed statement '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("line {line}: {key} appears before any [PHASE] block")]
    PhaseKeyOutsidePhase { line: usize, key: String },

    #[error("line {line}: unknown {key} token '{token}'")]
    UnknownEnumToken {
        line: usize,
        key: String,
        token: String,
    },

    #[error("line {line}: invalid {key} value '{value}': {message}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
        message: String,
    },

    #[error("line {line}: {key} is not a valid epoch timestamp: '{value}'")]
    MalformedTimestamp {
        line: usize,
        key: String,
        value: String,
    },

    #[error("line {line}: {key}: {source}")]
    Timezone {
        line: usize,
        key: String,
        #[source]
        source: TimeError,
    },
}

/// First violation found by [`crate::validate`]. The display text is the message shown to the
/// person editing the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Deployment start datetime must be before deployment end datetime")]
    DeploymentWindowInverted,

    #[error("VHF start datetime must be after deployment start datetime")]
    VhfBeforeDeploymentStart,

    #[error("At least one deployment phase must be defined")]
    NoPhasesDefined,

    #[error("Deployment phases must have a non-empty name")]
    EmptyPhaseName,

    #[error(
        "Deployment phase name {name:?} cannot contain quotes or control characters, or start \
         or end with whitespace"
    )]
    UnwritablePhaseName { name: String },

    #[error("Deployment phase name '{name}' is used more than once")]
    DuplicatePhaseName { name: String },

    #[error("Deployment phase '{phase}' has no start/end times")]
    MissingPhaseWindow { phase: String },

    #[error("Deployment phases must be within deployment start/end times (phase '{phase}')")]
    PhaseOutsideDeploymentWindow { phase: String },

    #[error("Deployment phase '{phase}' must start before it ends")]
    PhaseWindowInverted { phase: String },

    #[error("Deployment phases cannot overlap ('{previous}' and '{phase}')")]
    OverlappingPhases { previous: String, phase: String },

    #[error(
        "Audio-reading interval must be greater than or equal to the audio clip length \
         (phase '{phase}': {clip_length_s} s clip, {interval_s} s interval)"
    )]
    ClipLongerThanInterval {
        phase: String,
        clip_length_s: u32,
        interval_s: u64,
    },

    #[error("Schedule-based audio recording must have at least one start/end time pair (phase '{phase}')")]
    EmptyAudioSchedule { phase: String },

    #[error("Schedule-based audio recording allows at most {max} start/end time pairs (phase '{phase}')")]
    TooManyScheduleWindows { phase: String, max: usize },

    #[error("Schedule-based audio start times must be before their corresponding end times (phase '{phase}')")]
    ScheduleWindowInverted { phase: String },

    #[error("Schedule-based audio start/end times cannot overlap (phase '{phase}')")]
    OverlappingScheduleWindows { phase: String },

    #[error("{field} is out of range: {value}")]
    FieldOutOfRange { field: &'static str, value: String },

    #[error("{field} is out of range for phase '{phase}': {value}")]
    PhaseFieldOutOfRange {
        phase: String,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    Time(#[from] TimeError),
}

impl ValidationError {
    pub(crate) fn out_of_range(field: &'static str, value: impl ToString) -> Self {
        ValidationError::FieldOutOfRange {
            field,
            value: value.to_string(),
        }
    }

    pub(crate) fn phase_out_of_range(phase: &str, field: &'static str, value: impl ToString) -> Self {
        ValidationError::PhaseFieldOutOfRange {
            phase: phase.to_string(),
            field,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unable to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write configuration file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to replace configuration file {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file could not be parsed: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration is invalid: {0}")]
    Validation(#[from] ValidationError),

    #[error("Time conversion failed: {0}")]
    Time(#[from] TimeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
