//! Timezone-agnostic calendar values.
//!
//! A [`DateTime`] is a local calendar reading: a date and an optional
//! hour/minute. It never carries a zone. Conversion to an [`Instant`] maps the
//! calendar fields straight onto a naive timestamp, so two values that read
//! the same on a wall calendar always compare equal.
//!
//! On the wire the month is zero-based (`[2025, 0, 31]` is January 31st),
//! matching common calendar libraries on the application side.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Absolute point on the local timeline.
pub type Instant = NaiveDateTime;

/// Time of day used when a [`DateTime`] has no time component.
pub fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Reads the local wall clock.
///
/// Engine functions never call this; callers read the clock once and thread
/// the result through as `now`.
pub fn now_local() -> Instant {
    Local::now().naive_local()
}

/// Calendar date with an optional time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateTimeRecord", into = "DateTimeRecord")]
pub struct DateTime {
    date: NaiveDate,
    time: Option<NaiveTime>,
}

/// Wire shape: `{ "date": [year, month0, day], "time": [hour, minute] }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct DateTimeRecord {
    date: (i32, u32, u32),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time: Option<(u32, u32)>,
}

impl DateTime {
    /// Date-only value. `month` is zero-based.
    pub fn date(year: i32, month: u32, day: u32) -> Result<Self> {
        let date = month
            .checked_add(1)
            .and_then(|m| NaiveDate::from_ymd_opt(year, m, day))
            .ok_or(Error::InvalidDate { year, month, day })?;
        Ok(Self { date, time: None })
    }

    /// Date with a time of day. `month` is zero-based.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<Self> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or(Error::InvalidTime { hour, minute })?;
        Ok(Self {
            time: Some(time),
            ..Self::date(year, month, day)?
        })
    }

    pub(crate) fn from_parts(date: NaiveDate, time: Option<NaiveTime>) -> Self {
        Self { date, time }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Zero-based month.
    pub fn month(&self) -> u32 {
        self.date.month0()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// `(hour, minute)` when the value carries a time component.
    pub fn time(&self) -> Option<(u32, u32)> {
        self.time.map(|t| (t.hour(), t.minute()))
    }

    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    pub fn naive_date(&self) -> NaiveDate {
        self.date
    }

    pub(crate) fn naive_time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// Shorthand for [`to_instant`] with the noon default.
    pub fn instant(&self) -> Instant {
        to_instant(self, default_time())
    }
}

impl TryFrom<DateTimeRecord> for DateTime {
    type Error = Error;

    fn try_from(record: DateTimeRecord) -> Result<Self> {
        let (year, month, day) = record.date;
        match record.time {
            Some((hour, minute)) => DateTime::at(year, month, day, hour, minute),
            None => DateTime::date(year, month, day),
        }
    }
}

impl From<DateTime> for DateTimeRecord {
    fn from(dt: DateTime) -> Self {
        DateTimeRecord {
            date: (dt.year(), dt.month(), dt.day()),
            time: dt.time(),
        }
    }
}

impl std::fmt::Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.time {
            Some(t) => write!(f, "{} {}", self.date, t.format("%H:%M")),
            None => write!(f, "{}", self.date),
        }
    }
}

/// Builds an instant from the calendar fields, using `dt`'s own time when it
/// has one and `default_time` otherwise. No zone conversion happens.
pub fn to_instant(dt: &DateTime, default_time: NaiveTime) -> Instant {
    dt.date.and_time(dt.time.unwrap_or(default_time))
}

/// Inverse of [`to_instant`]. With `include_time = false` the result carries
/// no time component at all; seconds are always dropped.
pub fn from_instant(instant: Instant, include_time: bool) -> DateTime {
    let time = include_time.then(|| {
        let t = instant.time();
        t.with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(t)
    });
    DateTime {
        date: instant.date(),
        time,
    }
}
