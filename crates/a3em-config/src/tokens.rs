use crate::model::{AudioModeKind, ImuModeKind, TimeScale, VhfModeKind};

/// Fieldless enum with one static label/wire-token table shared by the encoder and decoder.
/// Labels are the names shown to people; tokens are what the device firmware reads.
pub trait WireEnum: Sized + Copy + PartialEq + 'static {
    const TABLE: &'static [(Self, &'static str, &'static str)];

    fn label(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(variant, _, _)| *variant == self)
            .map_or("", |(_, label, _)| *label)
    }

    fn token(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(variant, _, _)| *variant == self)
            .map_or("", |(_, _, token)| *token)
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, _, candidate)| *candidate == token)
            .map(|(variant, _, _)| *variant)
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, candidate, _)| candidate.eq_ignore_ascii_case(label.trim()))
            .map(|(variant, _, _)| *variant)
    }
}

impl WireEnum for AudioModeKind {
    const TABLE: &'static [(Self, &'static str, &'static str)] = &[
        (AudioModeKind::ThresholdBased, "Threshold-Based", "AMPLITUDE"),
        (AudioModeKind::ScheduleBased, "Schedule-Based", "SCHEDULED"),
        (AudioModeKind::IntervalBased, "Interval-Based", "INTERVAL"),
        (AudioModeKind::Continuous, "Continuous", "CONTINUOUS"),
    ];
}

impl WireEnum for ImuModeKind {
    const TABLE: &'static [(Self, &'static str, &'static str)] = &[
        (ImuModeKind::MotionBased, "Motion-Based", "ACTIVITY"),
        (ImuModeKind::AudioSynced, "Audio-Synced", "AUDIO"),
        (ImuModeKind::None, "None", "NONE"),
    ];
}

impl WireEnum for TimeScale {
    const TABLE: &'static [(Self, &'static str, &'static str)] = &[
        (TimeScale::Second, "Second", "SECONDS"),
        (TimeScale::Minute, "Minute", "MINUTES"),
        (TimeScale::Hour, "Hour", "HOURS"),
        (TimeScale::Day, "Day", "DAYS"),
    ];
}

impl WireEnum for VhfModeKind {
    const TABLE: &'static [(Self, &'static str, &'static str)] = &[
        (VhfModeKind::Never, "Never", "NEVER"),
        (VhfModeKind::EndOfDeployment, "End of Deployment", "END"),
        (VhfModeKind::Scheduled, "Scheduled", "SCHEDULED"),
    ];
}
