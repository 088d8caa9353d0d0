//! Points in time with calendar-field accessors.
//!
//! A [`Timestamp`] wraps a count of nanosecond ticks since the Unix epoch on a
//! naive (zone-less) calendar. Calendar fields are derived on access through
//! `chrono`; nothing but the tick count is stored.
//!
//! Text is parsed left to right, so a partial string resolves to the first
//! tick of the span it names:
//!
//! ```
//! use tsframe_core::Timestamp;
//!
//! let a: Timestamp = "2016".parse().unwrap();
//! let b: Timestamp = "2016-04".parse().unwrap();
//! let c: Timestamp = "2016-06-01T11:03".parse().unwrap();
//! assert!(a < b && b < c);
//! ```

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::duration::{
    Duration, NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MICRO, NANOS_PER_MILLI, NANOS_PER_MINUTE,
    NANOS_PER_SECOND, parse_fraction,
};
use crate::error::{Result, TimeError};
use crate::partial::Resolution;

/// Unit of an integer epoch count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Whole seconds.
    Seconds,
    /// Milliseconds.
    Milliseconds,
    /// Microseconds.
    Microseconds,
    /// Nanoseconds (the native tick).
    #[default]
    Nanoseconds,
}

impl TimeUnit {
    /// Number of ticks in one unit.
    #[must_use]
    pub const fn ticks(&self) -> i64 {
        match self {
            Self::Seconds => NANOS_PER_SECOND,
            Self::Milliseconds => NANOS_PER_MILLI,
            Self::Microseconds => NANOS_PER_MICRO,
            Self::Nanoseconds => 1,
        }
    }
}

/// An immutable point in time, in nanoseconds since 1970-01-01T00:00:00.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Creates a timestamp from a raw tick count.
    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Creates a timestamp from an epoch count in the given unit.
    ///
    /// # Errors
    /// Returns [`TimeError::Overflow`] if the value is outside the tick range.
    pub fn from_epoch(value: i64, unit: TimeUnit) -> Result<Self> {
        value
            .checked_mul(unit.ticks())
            .map(Self)
            .ok_or_else(|| TimeError::Overflow(format!("{value} {unit:?} since epoch")))
    }

    /// Creates a timestamp at midnight of a calendar date.
    ///
    /// # Errors
    /// Returns [`TimeError::Parse`] if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        Self::from_ymd_hms_nano(year, month, day, 0, 0, 0, 0)
    }

    /// Creates a timestamp from a full calendar-field tuple.
    ///
    /// # Errors
    /// Returns [`TimeError::Parse`] if any field is out of range, or
    /// [`TimeError::Overflow`] if the instant is not representable.
    pub fn from_ymd_hms_nano(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        nano: u32,
    ) -> Result<Self> {
        let dt = NaiveDate::from_ymd_opt(year, month, day)
            .filter(|_| nano < NANOS_PER_SECOND as u32)
            .and_then(|d| d.and_hms_nano_opt(hour, minute, second, nano))
            .ok_or_else(|| {
                TimeError::Parse(format!(
                    "invalid calendar fields {year:04}-{month:02}-{day:02} \
                     {hour:02}:{minute:02}:{second:02}.{nano:09}"
                ))
            })?;
        Self::from_naive(dt)
    }

    /// Converts a naive `chrono` date-time.
    ///
    /// # Errors
    /// Returns [`TimeError::Overflow`] outside the representable tick range.
    pub fn from_naive(dt: NaiveDateTime) -> Result<Self> {
        dt.and_utc()
            .timestamp_nanos_opt()
            .map(Self)
            .ok_or_else(|| TimeError::Overflow(format!("{dt} is outside the tick range")))
    }

    /// Returns the raw tick count.
    #[must_use]
    pub const fn ticks(&self) -> i64 {
        self.0
    }

    /// Returns the equivalent naive `chrono` date-time.
    #[must_use]
    pub fn to_datetime(&self) -> NaiveDateTime {
        DateTime::<Utc>::from_timestamp_nanos(self.0).naive_utc()
    }

    /// Calendar date of this timestamp.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.to_datetime().date()
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.to_datetime().year()
    }

    /// Month of the year, 1-12.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.to_datetime().month()
    }

    /// Day of the month, 1-31.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.to_datetime().day()
    }

    /// Hour of the day, 0-23.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.to_datetime().hour()
    }

    /// Minute of the hour, 0-59.
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.to_datetime().minute()
    }

    /// Second of the minute, 0-59.
    #[must_use]
    pub fn second(&self) -> u32 {
        self.to_datetime().second()
    }

    /// Sub-second nanoseconds.
    #[must_use]
    pub const fn nanosecond(&self) -> u32 {
        self.0.rem_euclid(NANOS_PER_SECOND) as u32
    }

    /// Day of the week.
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.to_datetime().weekday()
    }

    /// Day of the week with Monday = 0 and Sunday = 6.
    #[must_use]
    pub fn day_of_week(&self) -> u32 {
        self.weekday().num_days_from_monday()
    }

    /// English name of the weekday, e.g. `"Saturday"`.
    #[must_use]
    pub fn weekday_name(&self) -> &'static str {
        match self.weekday() {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    /// Day of the year, 1-366.
    #[must_use]
    pub fn day_of_year(&self) -> u32 {
        self.to_datetime().ordinal()
    }

    /// Quarter of the year, 1-4.
    #[must_use]
    pub fn quarter(&self) -> u32 {
        (self.month() - 1) / 3 + 1
    }

    /// Elapsed time since midnight of the same day.
    #[must_use]
    pub const fn time_of_day(&self) -> Duration {
        Duration::from_ticks(self.0.rem_euclid(NANOS_PER_DAY))
    }

    /// Midnight of the same day.
    ///
    /// # Panics
    /// Panics if that midnight precedes the first representable tick; see
    /// [`Timestamp::checked_normalize`].
    #[must_use]
    pub const fn normalize(&self) -> Self {
        match self.checked_normalize() {
            Some(day) => day,
            None => panic!("midnight of the first representable day is out of range"),
        }
    }

    /// Midnight of the same day, or `None` if it is not representable.
    #[must_use]
    pub const fn checked_normalize(&self) -> Option<Self> {
        self.checked_truncate(NANOS_PER_DAY)
    }

    /// Rounds down to a multiple of `unit` ticks, or `None` on underflow.
    pub(crate) const fn checked_truncate(&self, unit: i64) -> Option<Self> {
        match self.0.checked_sub(self.0.rem_euclid(unit)) {
            Some(ticks) => Some(Self(ticks)),
            None => None,
        }
    }

    /// Adds a duration, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, d: Duration) -> Option<Self> {
        match self.0.checked_add(d.ticks()) {
            Some(ticks) => Some(Self(ticks)),
            None => None,
        }
    }

    /// Subtracts a duration, returning `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, d: Duration) -> Option<Self> {
        match self.0.checked_sub(d.ticks()) {
            Some(ticks) => Some(Self(ticks)),
            None => None,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.to_datetime();
        if self.nanosecond() == 0 {
            write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
        } else {
            write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.9f"))
        }
    }
}

/// Reads a run of ASCII digits whose length lies within `min..=max`.
fn take_digits<'a>(rest: &mut &'a str, min: usize, max: usize) -> Option<&'a str> {
    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if len < min || len > max {
        return None;
    }
    let (digits, tail) = rest.split_at(len);
    *rest = tail;
    Some(digits)
}

/// Consumes one of `seps` if it is the next character.
fn take_sep(rest: &mut &str, seps: &[char]) -> bool {
    match rest.chars().next() {
        Some(c) if seps.contains(&c) => {
            *rest = &rest[c.len_utf8()..];
            true
        }
        _ => false,
    }
}

/// Splits a trailing `Z` or `±HH[:MM]` offset off a date-time string.
///
/// Offsets are only recognised after the time-of-day part so that the `-`
/// date separators are never mistaken for one.
fn split_offset(text: &str) -> Result<(&str, i64)> {
    let Some(time_start) = text.find(['T', ' ']) else {
        return Ok((text, 0));
    };
    if let Some(body) = text.strip_suffix('Z') {
        return Ok((body, 0));
    }
    let Some(pos) = text[time_start..].rfind(['+', '-']).map(|p| p + time_start) else {
        return Ok((text, 0));
    };
    let sign = if text[pos..].starts_with('-') { -1 } else { 1 };
    let offset = &text[pos + 1..];
    let (h, m) = match offset.split_once(':') {
        Some((h, m)) => (h, m),
        None if offset.len() == 4 => offset.split_at(2),
        None => (offset, "0"),
    };
    let err = || TimeError::Parse(format!("invalid UTC offset in {text:?}"));
    let hours: i64 = h.parse().map_err(|_| err())?;
    let minutes: i64 = m.parse().map_err(|_| err())?;
    if hours > 23 || minutes > 59 {
        return Err(err());
    }
    Ok((
        text[..pos].trim_end(),
        sign * (hours * NANOS_PER_HOUR + minutes * NANOS_PER_MINUTE),
    ))
}

/// Parses calendar text left to right, returning the first tick of the span
/// it names together with the finest field that was present.
pub(crate) fn parse_calendar(text: &str) -> Result<(Timestamp, Resolution)> {
    let trimmed = text.trim();
    let err = |what: &str| TimeError::Parse(format!("{what} in {text:?}"));
    if trimmed.is_empty() {
        return Err(err("empty timestamp"));
    }
    let (body, offset) = split_offset(trimmed)?;
    let mut rest = body;

    let num = |d: &str| d.parse::<u32>().map_err(|_| err("invalid number"));

    let year = take_digits(&mut rest, 4, 4).ok_or_else(|| err("expected a 4-digit year"))?;
    let year: i32 = year.parse().map_err(|_| err("invalid year"))?;
    let (mut month, mut day, mut hour, mut minute, mut second, mut nano) = (1, 1, 0, 0, 0, 0);
    let mut resolution = Resolution::Year;

    if take_sep(&mut rest, &['-', '/']) {
        month = num(take_digits(&mut rest, 1, 2).ok_or_else(|| err("expected a month"))?)?;
        resolution = Resolution::Month;
        if take_sep(&mut rest, &['-', '/']) {
            day = num(take_digits(&mut rest, 1, 2).ok_or_else(|| err("expected a day"))?)?;
            resolution = Resolution::Day;
            if take_sep(&mut rest, &['T', ' ']) {
                rest = rest.trim_start();
                hour = num(take_digits(&mut rest, 1, 2).ok_or_else(|| err("expected an hour"))?)?;
                resolution = Resolution::Hour;
                if take_sep(&mut rest, &[':']) {
                    minute = num(
                        take_digits(&mut rest, 2, 2).ok_or_else(|| err("expected minutes"))?,
                    )?;
                    resolution = Resolution::Minute;
                    if take_sep(&mut rest, &[':']) {
                        second = num(
                            take_digits(&mut rest, 2, 2).ok_or_else(|| err("expected seconds"))?,
                        )?;
                        resolution = Resolution::Second;
                        if take_sep(&mut rest, &['.', ',']) {
                            let digits = take_digits(&mut rest, 1, 9)
                                .ok_or_else(|| err("expected fractional seconds"))?;
                            nano = parse_fraction(digits)
                                .ok_or_else(|| err("invalid fractional seconds"))?
                                as u32;
                            resolution = Resolution::Exact;
                        }
                    }
                }
            }
        }
    }
    if !rest.is_empty() {
        return Err(err("unexpected trailing characters"));
    }

    let local = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_nano_opt(hour, minute, second, nano))
        .ok_or_else(|| err("invalid calendar date"))?;
    let local = Timestamp::from_naive(local)?;
    let utc = local
        .0
        .checked_sub(offset)
        .ok_or_else(|| TimeError::Overflow(text.to_string()))?;
    Ok((Timestamp(utc), resolution))
}

impl FromStr for Timestamp {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self> {
        parse_calendar(s).map(|(ts, _)| ts)
    }
}

impl TryFrom<NaiveDateTime> for Timestamp {
    type Error = TimeError;

    fn try_from(dt: NaiveDateTime) -> Result<Self> {
        Self::from_naive(dt)
    }
}

impl TryFrom<NaiveDate> for Timestamp {
    type Error = TimeError;

    fn try_from(date: NaiveDate) -> Result<Self> {
        Self::from_ymd(date.year(), date.month(), date.day())
    }
}

impl TryFrom<DateTime<Utc>> for Timestamp {
    type Error = TimeError;

    fn try_from(dt: DateTime<Utc>) -> Result<Self> {
        Self::from_naive(dt.naive_utc())
    }
}

impl From<Timestamp> for NaiveDateTime {
    fn from(ts: Timestamp) -> Self {
        ts.to_datetime()
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        match self.checked_add(rhs) {
            Some(ts) => ts,
            None => panic!("overflow when adding duration to timestamp"),
        }
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self {
        match self.checked_sub(rhs) {
            Some(ts) => ts,
            None => panic!("overflow when subtracting duration from timestamp"),
        }
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        match self.0.checked_sub(rhs.0) {
            Some(ticks) => Duration::from_ticks(ticks),
            None => panic!("overflow when subtracting timestamps"),
        }
    }
}

/// Conversion from "timestamp-like" values.
///
/// Implemented for calendar strings, `chrono` date-times, integer epoch
/// counts paired with a [`TimeUnit`], and [`Timestamp`] itself.
pub trait IntoTimestamp {
    /// Resolves the value to a [`Timestamp`].
    ///
    /// # Errors
    /// Returns [`TimeError::Parse`] or [`TimeError::Overflow`] when the value
    /// does not name a representable instant.
    fn into_timestamp(self) -> Result<Timestamp>;
}

impl IntoTimestamp for Timestamp {
    fn into_timestamp(self) -> Result<Timestamp> {
        Ok(self)
    }
}

impl IntoTimestamp for &str {
    fn into_timestamp(self) -> Result<Timestamp> {
        self.parse()
    }
}

impl IntoTimestamp for String {
    fn into_timestamp(self) -> Result<Timestamp> {
        self.parse()
    }
}

impl IntoTimestamp for &String {
    fn into_timestamp(self) -> Result<Timestamp> {
        self.parse()
    }
}

impl IntoTimestamp for NaiveDateTime {
    fn into_timestamp(self) -> Result<Timestamp> {
        Timestamp::from_naive(self)
    }
}

impl IntoTimestamp for NaiveDate {
    fn into_timestamp(self) -> Result<Timestamp> {
        Timestamp::from_ymd(self.year(), self.month(), self.day())
    }
}

impl IntoTimestamp for DateTime<Utc> {
    fn into_timestamp(self) -> Result<Timestamp> {
        Timestamp::from_naive(self.naive_utc())
    }
}

impl IntoTimestamp for (i64, TimeUnit) {
    fn into_timestamp(self) -> Result<Timestamp> {
        Timestamp::from_epoch(self.0, self.1)
    }
}
