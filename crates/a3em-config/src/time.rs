use std::fmt;

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone as _, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::TimeError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Absolute point in time as UTC epoch seconds. This is the only time form written to the
/// configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeInstant(pub i64);

impl TimeInstant {
    /// 2000-01-01T00:00:00Z, recorded when the VHF beacon is never activated.
    pub const NEVER_SENTINEL: TimeInstant = TimeInstant(946_684_800);

    pub fn epoch_seconds(self) -> i64 {
        self.0
    }

    pub fn to_utc(self) -> Result<DateTime<Utc>, TimeError> {
        DateTime::<Utc>::from_timestamp(self.0, 0).ok_or_else(|| {
            TimeError::local_time(self.0.to_string(), "outside the representable calendar range")
        })
    }
}

impl fmt::Display for TimeInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DateTime<Utc>> for TimeInstant {
    fn from(value: DateTime<Utc>) -> Self {
        TimeInstant(value.timestamp())
    }
}

/// Wall-clock date and time in a named IANA timezone, as entered by the person configuring
/// the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalDateTime {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub timezone: Tz,
    /// Set only for a reading taken from the first pass through a repeated DST hour.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub first_occurrence: bool,
}

impl LocalDateTime {
    pub fn new(date: NaiveDate, time: NaiveTime, timezone: Tz) -> Self {
        Self {
            date,
            time,
            timezone,
            first_occurrence: false,
        }
    }

    /// Builds a wall-clock value from `YYYY-MM-DD`, `HH:MM` (or `HH:MM:SS`) and a timezone name.
    pub fn parse(date: &str, time: &str, timezone: &str) -> Result<Self, TimeError> {
        let timezone = parse_timezone(timezone)?;
        let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .map_err(|err| TimeError::local_time(date, err.to_string()))?;
        let time = parse_time_of_day(time)?;
        Ok(Self::new(date, time, timezone))
    }

    pub fn midnight(date: NaiveDate, timezone: Tz) -> Self {
        Self::new(date, NaiveTime::MIN, timezone)
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Same wall-clock reading, interpreted in another timezone.
    pub fn with_timezone(self, timezone: Tz) -> Self {
        if timezone == self.timezone {
            return self;
        }
        Self::new(self.date, self.time, timezone)
    }

    pub fn to_instant(&self) -> Result<TimeInstant, TimeError> {
        to_instant(self)
    }
}

impl fmt::Display for LocalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format(DATE_FORMAT),
            format_time_of_day(self.time),
            self.timezone.name()
        )
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, TimeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimeError::InvalidTimezone(name.to_string()))
}

pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, TimeError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, TIME_FORMAT))
        .map_err(|_| TimeError::local_time(value, "expected a 24-hour HH:MM time"))
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format(TIME_FORMAT).to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

/// Resolves a wall-clock reading through the timezone database. A reading repeated by a DST
/// fall-back resolves to the later (standard time) instant unless it is flagged as the first
/// occurrence; a reading skipped by a spring-forward gap is rejected.
pub fn to_instant(local: &LocalDateTime) -> Result<TimeInstant, TimeError> {
    let seconds = match local.timezone.from_local_datetime(&local.naive()) {
        LocalResult::Single(dt) => dt.timestamp(),
        LocalResult::Ambiguous(a, b) => {
            let (earlier, later) = ordered(a.timestamp(), b.timestamp());
            if local.first_occurrence {
                earlier
            } else {
                later
            }
        }
        LocalResult::None => {
            return Err(TimeError::local_time(
                local.to_string(),
                "does not exist in this timezone (skipped by a DST transition)",
            ));
        }
    };
    Ok(TimeInstant(seconds))
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Wall-clock reading of `instant` in `timezone`. Instants whose local reading falls outside
/// chrono's calendar are rejected rather than clamped.
pub fn from_instant(instant: TimeInstant, timezone: Tz) -> Result<LocalDateTime, TimeError> {
    let utc = instant.to_utc()?.naive_utc();
    let offset = timezone.offset_from_utc_datetime(&utc).fix();
    let naive = utc.checked_add_offset(offset).ok_or_else(|| {
        TimeError::local_time(
            instant.to_string(),
            "local reading is outside the representable calendar range",
        )
    })?;
    let first_occurrence = match timezone.from_local_datetime(&naive) {
        LocalResult::Ambiguous(a, b) => ordered(a.timestamp(), b.timestamp()).0 == instant.0,
        _ => false,
    };
    Ok(LocalDateTime {
        first_occurrence,
        ..LocalDateTime::new(naive.date(), naive.time(), timezone)
    })
}

/// `local - UTC` in seconds for `timezone` at the given instant.
pub fn utc_offset_seconds(timezone: Tz, at: TimeInstant) -> Result<i32, TimeError> {
    let utc = at.to_utc()?;
    Ok(timezone
        .offset_from_utc_datetime(&utc.naive_utc())
        .fix()
        .local_minus_utc())
}

/// Shifts a local time-of-day onto the UTC day: `(local - offset) mod 86400`.
pub fn utc_seconds_of_day(local: NaiveTime, utc_offset: i32) -> i64 {
    (i64::from(local.num_seconds_from_midnight()) - i64::from(utc_offset)).rem_euclid(SECONDS_PER_DAY)
}

/// Inverse of [`utc_seconds_of_day`].
pub fn local_time_of_day(utc_seconds: i64, utc_offset: i32) -> Option<NaiveTime> {
    if !(0..SECONDS_PER_DAY).contains(&utc_seconds) {
        return None;
    }
    let local = (utc_seconds + i64::from(utc_offset)).rem_euclid(SECONDS_PER_DAY);
    NaiveTime::from_num_seconds_from_midnight_opt(u32::try_from(local).ok()?, 0)
}
