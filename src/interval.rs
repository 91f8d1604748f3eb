//! Cadence arithmetic: shifting calendar values by "every N units" and
//! measuring how many such units lie between two instants.

use std::num::NonZeroU32;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::datetime::{DateTime, Instant};
use crate::error::{Error, Result};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Calendar unit, ordered finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Day,
    Week,
    Month,
    Year,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Day,
        Frequency::Week,
        Frequency::Month,
        Frequency::Year,
    ];

    /// Mean length of one unit in days (Gregorian averages for month/year).
    pub fn approx_days(self) -> f64 {
        match self {
            Frequency::Day => 1.0,
            Frequency::Week => 7.0,
            Frequency::Month => 30.436_875,
            Frequency::Year => 365.242_5,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Frequency::Day => "day",
            Frequency::Week => "week",
            Frequency::Month => "month",
            Frequency::Year => "year",
        }
    }
}

/// "Every `count` units of `frequency`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub frequency: Frequency,
    pub count: NonZeroU32,
}

impl Interval {
    /// Rejects `count == 0`.
    pub fn new(frequency: Frequency, count: u32) -> Result<Self> {
        let count = NonZeroU32::new(count).ok_or(Error::InvalidInterval { count })?;
        Ok(Self { frequency, count })
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.count.get() {
            1 => write!(f, "every {}", self.frequency.label()),
            n => write!(f, "every {n} {}s", self.frequency.label()),
        }
    }
}

/// Same cadence as [`Interval`], stored with the repeat count named
/// `interval` to match recurrence records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub interval: NonZeroU32,
}

impl Recurrence {
    pub fn new(frequency: Frequency, interval: u32) -> Result<Self> {
        let Interval { frequency, count } = Interval::new(frequency, interval)?;
        Ok(Self {
            frequency,
            interval: count,
        })
    }
}

impl From<Recurrence> for Interval {
    fn from(r: Recurrence) -> Self {
        Interval {
            frequency: r.frequency,
            count: r.interval,
        }
    }
}

/// Shifts `dt` forward by one interval. A date-only value stays date-only.
pub fn add_interval(interval: Interval, dt: &DateTime) -> Result<DateTime> {
    shift(interval, dt, true)
}

/// Shifts `dt` backward by one interval.
pub fn sub_interval(interval: Interval, dt: &DateTime) -> Result<DateTime> {
    shift(interval, dt, false)
}

fn shift(interval: Interval, dt: &DateTime, forward: bool) -> Result<DateTime> {
    let n = interval.count.get();
    let date = dt.naive_date();
    let shifted = match interval.frequency {
        Frequency::Day => shift_days(date, u64::from(n), forward),
        Frequency::Week => shift_days(date, u64::from(n) * 7, forward),
        Frequency::Month => shift_months(date, Some(n), forward),
        Frequency::Year => shift_months(date, n.checked_mul(12), forward),
    }
    .ok_or(Error::DateOutOfRange)?;
    Ok(DateTime::from_parts(shifted, dt.naive_time()))
}

fn shift_days(date: NaiveDate, days: u64, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    }
}

fn shift_months(date: NaiveDate, months: Option<u32>, forward: bool) -> Option<NaiveDate> {
    let months = Months::new(months?);
    if forward {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

/// Signed, fractional number of `interval`s from `start` to `end`.
///
/// Positive when `end` is after `start`. Month and year units follow real
/// month boundaries; the fraction of a partial month is measured against the
/// length of that particular month.
pub fn difference_in_intervals(interval: Interval, start: Instant, end: Instant) -> f64 {
    unit_difference(interval.frequency, start, end) / f64::from(interval.count.get())
}

/// Signed, fractional days from `start` to `end`.
pub fn days_between(start: Instant, end: Instant) -> f64 {
    (end - start).num_milliseconds() as f64 / MILLIS_PER_DAY
}

fn unit_difference(frequency: Frequency, start: Instant, end: Instant) -> f64 {
    match frequency {
        Frequency::Day => days_between(start, end),
        Frequency::Week => days_between(start, end) / 7.0,
        Frequency::Month => months_between(start, end),
        Frequency::Year => months_between(start, end) / 12.0,
    }
}

fn months_between(start: Instant, end: Instant) -> f64 {
    if end < start {
        return -months_between(end, start);
    }
    // Only fails at the edge of chrono's calendar.
    calendar_months(start, end)
        .unwrap_or_else(|| days_between(start, end) / Frequency::Month.approx_days())
}

fn calendar_months(start: Instant, end: Instant) -> Option<f64> {
    let mut whole =
        (end.year() - start.year()) * 12 + end.month0() as i32 - start.month0() as i32;
    let mut base = add_months(start, whole)?;
    if base > end {
        whole -= 1;
        base = add_months(start, whole)?;
    }
    let next = add_months(start, whole + 1)?;
    let span = (next - base).num_milliseconds() as f64;
    let part = (end - base).num_milliseconds() as f64;
    Some(f64::from(whole) + part / span)
}

fn add_months(start: Instant, months: i32) -> Option<Instant> {
    start.checked_add_months(Months::new(u32::try_from(months).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> Instant {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn partial_month_is_measured_against_its_own_length() {
        // February 2025 has 28 days.
        let months = months_between(at(2025, 2, 1), at(2025, 2, 15));
        assert!((months - 0.5).abs() < 1e-9);
        // March has 31.
        let months = months_between(at(2025, 3, 1), at(2025, 3, 16));
        assert!((months - 15.0 / 31.0).abs() < 1e-9);
    }

    #[test]
    fn month_difference_steps_back_when_day_not_reached() {
        let months = months_between(at(2025, 1, 20), at(2025, 3, 10));
        assert!(months > 1.0 && months < 2.0);
    }
}
