#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    DeviceLabel,
    DeviceTimezone,
    DeviceUtcOffset,
    DeviceUtcOffsetHour,
    SetRtcAtMagnetDetect,
    DeploymentStartTime,
    DeploymentEndTime,
    GpsAvailable,
    AwakeOnMagnet,
    LedsEnabled,
    LedsActiveSeconds,
    MicAmplification,
    MagnetFieldValidationMs,
    VhfMode,
    VhfRadioStartTime,
    PhasedDeployment,
    PhaseName,
    PhaseStartTime,
    PhaseEndTime,
    AudioRecordingMode,
    AudioExtendClip,
    AudioMaxClipsNumber,
    AudioMaxClipsTimeScale,
    AudioTriggerThreshold,
    AudioTriggerInterval,
    AudioTriggerIntervalTimeScale,
    AudioTriggerSchedule,
    AudioSamplingRateHz,
    AudioClipLengthSeconds,
    ImuRecordingMode,
    ImuDegreesOfFreedom,
    ImuTriggerThreshold,
    ImuSamplingRateHz,
}

impl Key {
    pub const ALL: [Key; 33] = [
        Key::DeviceLabel,
        Key::DeviceTimezone,
        Key::DeviceUtcOffset,
        Key::DeviceUtcOffsetHour,
        Key::SetRtcAtMagnetDetect,
        Key::DeploymentStartTime,
        Key::DeploymentEndTime,
        Key::GpsAvailable,
        Key::AwakeOnMagnet,
        Key::LedsEnabled,
        Key::LedsActiveSeconds,
        Key::MicAmplification,
        Key::MagnetFieldValidationMs,
        Key::VhfMode,
        Key::VhfRadioStartTime,
        Key::PhasedDeployment,
        Key::PhaseName,
        Key::PhaseStartTime,
        Key::PhaseEndTime,
        Key::AudioRecordingMode,
        Key::AudioExtendClip,
        Key::AudioMaxClipsNumber,
        Key::AudioMaxClipsTimeScale,
        Key::AudioTriggerThreshold,
        Key::AudioTriggerInterval,
        Key::AudioTriggerIntervalTimeScale,
        Key::AudioTriggerSchedule,
        Key::AudioSamplingRateHz,
        Key::AudioClipLengthSeconds,
        Key::ImuRecordingMode,
        Key::ImuDegreesOfFreedom,
        Key::ImuTriggerThreshold,
        Key::ImuSamplingRateHz,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Key::DeviceLabel => "DEVICE_LABEL",
            Key::DeviceTimezone => "DEVICE_TIMEZONE",
            Key::DeviceUtcOffset => "DEVICE_UTC_OFFSET",
            Key::DeviceUtcOffsetHour => "DEVICE_UTC_OFFSET_HOUR",
            Key::SetRtcAtMagnetDetect => "SET_RTC_AT_MAGNET_DETECT",
            Key::DeploymentStartTime => "DEPLOYMENT_START_TIME",
            Key::DeploymentEndTime => "DEPLOYMENT_END_TIME",
            Key::GpsAvailable => "GPS_AVAILABLE",
            Key::AwakeOnMagnet => "AWAKE_ON_MAGNET",
            Key::LedsEnabled => "LEDS_ENABLED",
            Key::LedsActiveSeconds => "LEDS_ACTIVE_SECONDS",
            Key::MicAmplification => "MIC_AMPLIFICATION",
            Key::MagnetFieldValidationMs => "MAGNET_FIELD_VALIDATION_MS",
            Key::VhfMode => "VHF_MODE",
            Key::VhfRadioStartTime => "VHF_RADIO_START_TIME",
            Key::PhasedDeployment => "PHASED_DEPLOYMENT",
            Key::PhaseName => "PHASE_NAME",
            Key::PhaseStartTime => "PHASE_START_TIME",
            Key::PhaseEndTime => "PHASE_END_TIME",
            Key::AudioRecordingMode => "AUDIO_RECORDING_MODE",
            Key::AudioExtendClip => "AUDIO_EXTEND_CLIP",
            Key::AudioMaxClipsNumber => "AUDIO_MAX_CLIPS_NUMBER",
            Key::AudioMaxClipsTimeScale => "AUDIO_MAX_CLIPS_TIME_SCALE",
            Key::AudioTriggerThreshold => "AUDIO_TRIGGER_THRESHOLD",
            Key::AudioTriggerInterval => "AUDIO_TRIGGER_INTERVAL",
            Key::AudioTriggerIntervalTimeScale => "AUDIO_TRIGGER_INTERVAL_TIME_SCALE",
            Key::AudioTriggerSchedule => "AUDIO_TRIGGER_SCHEDULE",
            Key::AudioSamplingRateHz => "AUDIO_SAMPLING_RATE_HZ",
            Key::AudioClipLengthSeconds => "AUDIO_CLIP_LENGTH_SECONDS",
            Key::ImuRecordingMode => "IMU_RECORDING_MODE",
            Key::ImuDegreesOfFreedom => "IMU_DEGREES_OF_FREEDOM",
            Key::ImuTriggerThreshold => "IMU_TRIGGER_THRESHOLD",
            Key::ImuSamplingRateHz => "IMU_SAMPLING_RATE_HZ",
        }
    }

    pub fn lookup(name: &str) -> Option<Key> {
        Key::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Keys that belong to the most recent `[PHASE]` block.
    pub fn is_phase_key(self) -> bool {
        matches!(
            self,
            Key::PhaseName
                | Key::PhaseStartTime
                | Key::PhaseEndTime
                | Key::AudioRecordingMode
                | Key::AudioExtendClip
                | Key::AudioMaxClipsNumber
                | Key::AudioMaxClipsTimeScale
                | Key::AudioTriggerThreshold
                | Key::AudioTriggerInterval
                | Key::AudioTriggerIntervalTimeScale
                | Key::AudioTriggerSchedule
                | Key::AudioSamplingRateHz
                | Key::AudioClipLengthSeconds
                | Key::ImuRecordingMode
                | Key::ImuDegreesOfFreedom
                | Key::ImuTriggerThreshold
                | Key::ImuSamplingRateHz
        )
    }
}
