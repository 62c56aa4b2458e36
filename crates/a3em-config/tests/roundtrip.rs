use a3em_config::time::{local_time_of_day, utc_offset_seconds};
use a3em_config::{
    decode, encode, validate, AudioMode, DeploymentWindow, DeviceSettings, ImuMode, LocalDateTime,
    Phase, Schedule, TimeOfDayWindow, TimeScale, VhfPolicy,
};
use chrono::{Days, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum AudioSpec {
    Threshold {
        level: f64,
        max_clips: u32,
        scale: TimeScale,
    },
    Schedule {
        slots: Vec<i64>,
    },
    Interval {
        value: u32,
        scale: TimeScale,
    },
    Continuous,
}

#[derive(Debug, Clone)]
struct PhaseSpec {
    audio: AudioSpec,
    sample_rate_hz: u32,
    clip_length_s: u32,
    extend_clip: bool,
    imu: ImuMode,
    imu_sample_rate_hz: u16,
}

#[derive(Debug, Clone)]
struct ScheduleSpec {
    timezone: Tz,
    start_day: u64,
    start_hour: u32,
    start_minute: u32,
    phase_days: u64,
    extra_days: u64,
    split: bool,
    phase_prefix: String,
    vhf: u8,
    settings: DeviceSettings,
    phases: Vec<PhaseSpec>,
}

fn arb_timezone() -> impl Strategy<Value = Tz> {
    prop::sample::select(vec![
        Tz::UTC,
        chrono_tz::America::New_York,
        chrono_tz::Europe::Berlin,
        chrono_tz::Asia::Kolkata,
        chrono_tz::Etc::GMTMinus2,
    ])
}

fn arb_time_scale() -> impl Strategy<Value = TimeScale> {
    prop::sample::select(vec![
        TimeScale::Second,
        TimeScale::Minute,
        TimeScale::Hour,
        TimeScale::Day,
    ])
}

fn arb_threshold() -> impl Strategy<Value = f64> {
    prop::sample::select(vec![0.0, 0.25, 1.5, 12.75, 40.0])
}

fn arb_audio() -> impl Strategy<Value = AudioSpec> {
    prop_oneof![
        (arb_threshold(), 0..20_u32, arb_time_scale()).prop_map(|(level, max_clips, scale)| {
            AudioSpec::Threshold {
                level,
                max_clips,
                scale,
            }
        }),
        prop::sample::subsequence((0..12_i64).collect::<Vec<_>>(), 1..=4)
            .prop_map(|slots| AudioSpec::Schedule { slots }),
        (
            1..60_u32,
            prop::sample::select(vec![TimeScale::Minute, TimeScale::Hour, TimeScale::Day])
        )
            .prop_map(|(value, scale)| AudioSpec::Interval { value, scale }),
        Just(AudioSpec::Continuous),
    ]
}

fn arb_imu() -> impl Strategy<Value = ImuMode> {
    prop_oneof![
        arb_threshold().prop_map(|trigger_threshold_mg| ImuMode::MotionBased {
            trigger_threshold_mg
        }),
        Just(ImuMode::AudioSynced),
        Just(ImuMode::None),
    ]
}

prop_compose! {
    fn arb_phase()(
        audio in arb_audio(),
        sample_rate_hz in 8_000..=96_000_u32,
        clip_length_s in 1..=60_u32,
        extend_clip in any::<bool>(),
        imu in arb_imu(),
        imu_sample_rate_hz in prop::sample::select(vec![3_u16, 6, 12, 25, 50, 100, 200, 400, 800]),
    ) -> PhaseSpec {
        PhaseSpec {
            audio,
            sample_rate_hz,
            clip_length_s,
            extend_clip,
            imu,
            imu_sample_rate_hz,
        }
    }
}

prop_compose! {
    fn arb_settings()(
        label in "([A-Za-z0-9._#=é-]([A-Za-z0-9 ._#=é-]{0,13}[A-Za-z0-9._#=é-])?)?",
        gps_available in any::<bool>(),
        leds_enabled in any::<bool>(),
        leds_active_seconds in 0..=604_800_u32,
        mic_steps in 0..=90_u32,
        awake_on_magnet in any::<bool>(),
        magnet_field_validation_ms in 1_000..=30_000_u32,
        set_rtc_at_magnet_detect in any::<bool>(),
    ) -> DeviceSettings {
        DeviceSettings {
            label,
            gps_available,
            leds_enabled,
            leds_active_seconds,
            mic_amplification_db: f64::from(mic_steps) * 0.5,
            awake_on_magnet,
            magnet_field_validation_ms,
            set_rtc_at_magnet_detect,
        }
    }
}

prop_compose! {
    // Wall-clock starts stay between 04:00 and 20:59 so no generated reading falls into a DST
    // transition.
    fn arb_schedule_spec()(
        timezone in arb_timezone(),
        start_day in 0..330_u64,
        start_hour in 4..=20_u32,
        start_minute in prop::sample::select(vec![0_u32, 15, 30, 45]),
        phase_days in 1..=5_u64,
        extra_days in 0..=2_u64,
        split in any::<bool>(),
        phase_prefix in "[A-Za-z][A-Za-z0-9 =#-]{0,8}[A-Za-z]",
        vhf in 0..3_u8,
        settings in arb_settings(),
        phases in prop::collection::vec(arb_phase(), 1..=4),
    ) -> ScheduleSpec {
        ScheduleSpec {
            timezone,
            start_day,
            start_hour,
            start_minute,
            phase_days,
            extra_days,
            split,
            phase_prefix,
            vhf,
            settings,
            phases,
        }
    }
}

fn shifted(base: LocalDateTime, days: u64) -> LocalDateTime {
    let date = base
        .date
        .checked_add_days(Days::new(days))
        .expect("date in range");
    LocalDateTime::new(date, base.time, base.timezone)
}

fn build_phase(name: String, spec: &PhaseSpec, utc_offset: i32) -> Phase {
    let mut phase = Phase::new(name);
    phase.audio.mode = match &spec.audio {
        AudioSpec::Threshold {
            level,
            max_clips,
            scale,
        } => AudioMode::ThresholdBased {
            trigger_level_db: *level,
            max_clips: *max_clips,
            max_clips_time_scale: *scale,
        },
        AudioSpec::Schedule { slots } => AudioMode::ScheduleBased {
            windows: slots
                .iter()
                .map(|slot| {
                    let start = local_time_of_day(slot * 7_200 + 600, utc_offset).expect("start");
                    let end = local_time_of_day(slot * 7_200 + 6_600, utc_offset).expect("end");
                    TimeOfDayWindow::new(start, end)
                })
                .collect(),
        },
        AudioSpec::Interval { value, scale } => AudioMode::IntervalBased {
            interval_value: *value,
            interval_time_scale: *scale,
        },
        AudioSpec::Continuous => AudioMode::Continuous,
    };
    phase.audio.sample_rate_hz = spec.sample_rate_hz;
    phase.audio.clip_length_s = spec.clip_length_s;
    phase.audio.extend_clip_if_continuous = spec.extend_clip;
    phase.imu.mode = spec.imu;
    phase.imu.sample_rate_hz = spec.imu_sample_rate_hz;
    phase
}

/// Builds a valid schedule already in canonical form: split phases declared in temporal order
/// and daily windows in UTC order.
fn build(spec: &ScheduleSpec) -> Schedule {
    let first_day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
    let time = NaiveTime::from_hms_opt(spec.start_hour, spec.start_minute, 0).expect("time");
    let start = shifted(LocalDateTime::new(first_day, time, spec.timezone), spec.start_day);
    let phase_count = spec.phases.len() as u64;
    let end = shifted(start, phase_count * spec.phase_days + spec.extra_days);

    let mut schedule = Schedule::new(spec.timezone, first_day);
    schedule.settings = spec.settings.clone();
    schedule.set_deployment(DeploymentWindow::new(start, end));
    schedule.set_vhf_policy(match spec.vhf {
        0 => VhfPolicy::Never,
        1 => VhfPolicy::EndOfDeployment,
        _ => VhfPolicy::Scheduled(shifted(start, spec.phase_days)),
    });

    let offset = schedule.utc_offset_seconds().expect("offset");
    if spec.split {
        schedule.set_split(true);
        for (idx, phase_spec) in spec.phases.iter().enumerate() {
            let idx = idx as u64;
            let mut phase = build_phase(format!("{}{idx}", spec.phase_prefix), phase_spec, offset);
            phase.window = Some(DeploymentWindow::new(
                shifted(start, idx * spec.phase_days),
                shifted(start, (idx + 1) * spec.phase_days),
            ));
            schedule.add_phase(phase);
        }
    } else {
        schedule.set_default_phase(build_phase(spec.phase_prefix.clone(), &spec.phases[0], offset));
    }
    schedule
}

proptest! {
    #[test]
    fn generated_schedules_are_valid(spec in arb_schedule_spec()) {
        let schedule = build(&spec);
        prop_assert_eq!(validate(&schedule), Ok(()));
    }

    #[test]
    fn decode_reverses_encode(spec in arb_schedule_spec()) {
        let schedule = build(&spec);
        let text = encode(&schedule).expect("encode");
        let decoded = decode(&text).expect("decode");
        prop_assert_eq!(decoded, schedule);
    }

    #[test]
    fn re_encoding_is_byte_identical(spec in arb_schedule_spec()) {
        let text = encode(&build(&spec)).expect("encode");
        let again = encode(&decode(&text).expect("decode")).expect("re-encode");
        prop_assert_eq!(again, text);
    }

    #[test]
    fn declaration_order_does_not_change_output(spec in arb_schedule_spec()) {
        let schedule = build(&spec);
        let mut reversed = schedule.clone();
        let phases: Vec<Phase> = reversed.custom_phases().iter().rev().cloned().collect();
        reversed.clear_custom_phases();
        for phase in phases {
            reversed.add_phase(phase);
        }
        prop_assert_eq!(encode(&reversed).expect("encode"), encode(&schedule).expect("encode"));
    }
}
