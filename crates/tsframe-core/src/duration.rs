//! Fixed-length signed time spans.
//!
//! A [`Duration`] is a signed count of nanosecond ticks. It has no calendar
//! semantics: a day is always 86 400 seconds, and there is no month or year
//! unit. Durations combine with [`Timestamp`](crate::Timestamp) through the
//! usual `+`/`-` operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use crate::error::{Result, TimeError};

/// Nanoseconds in one microsecond.
pub const NANOS_PER_MICRO: i64 = 1_000;
/// Nanoseconds in one millisecond.
pub const NANOS_PER_MILLI: i64 = 1_000_000;
/// Nanoseconds in one second.
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
/// Nanoseconds in one minute.
pub const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
/// Nanoseconds in one hour.
pub const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
/// Nanoseconds in one day.
pub const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;
/// Nanoseconds in one week.
pub const NANOS_PER_WEEK: i64 = 7 * NANOS_PER_DAY;

/// A signed span of nanosecond ticks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Duration(i64);

/// Composite duration fields, summed into a single tick count by
/// [`Duration::from_parts`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationParts {
    /// Whole weeks.
    pub weeks: i64,
    /// Whole days.
    pub days: i64,
    /// Whole hours.
    pub hours: i64,
    /// Whole minutes.
    pub minutes: i64,
    /// Whole seconds.
    pub seconds: i64,
    /// Whole milliseconds.
    pub milliseconds: i64,
    /// Whole microseconds.
    pub microseconds: i64,
    /// Whole nanoseconds.
    pub nanoseconds: i64,
}

/// Breakdown of a duration's magnitude into clock fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationComponents {
    /// True when the duration is negative; the fields hold the magnitude.
    pub negative: bool,
    /// Whole days.
    pub days: u64,
    /// Hours within the day (0..24).
    pub hours: u64,
    /// Minutes within the hour (0..60).
    pub minutes: u64,
    /// Seconds within the minute (0..60).
    pub seconds: u64,
    /// Sub-second nanoseconds (0..1e9).
    pub nanoseconds: u64,
}

impl Duration {
    /// The zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from a raw tick count.
    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Creates a duration of `n` nanoseconds.
    #[must_use]
    pub const fn nanoseconds(n: i64) -> Self {
        Self(n)
    }

    /// Creates a duration of `n` microseconds.
    #[must_use]
    pub const fn microseconds(n: i64) -> Self {
        Self(n * NANOS_PER_MICRO)
    }

    /// Creates a duration of `n` milliseconds.
    #[must_use]
    pub const fn milliseconds(n: i64) -> Self {
        Self(n * NANOS_PER_MILLI)
    }

    /// Creates a duration of `n` seconds.
    #[must_use]
    pub const fn seconds(n: i64) -> Self {
        Self(n * NANOS_PER_SECOND)
    }

    /// Creates a duration of `n` minutes.
    #[must_use]
    pub const fn minutes(n: i64) -> Self {
        Self(n * NANOS_PER_MINUTE)
    }

    /// Creates a duration of `n` hours.
    #[must_use]
    pub const fn hours(n: i64) -> Self {
        Self(n * NANOS_PER_HOUR)
    }

    /// Creates a duration of `n` days of exactly 24 hours.
    #[must_use]
    pub const fn days(n: i64) -> Self {
        Self(n * NANOS_PER_DAY)
    }

    /// Creates a duration of `n` weeks of exactly 7 days.
    #[must_use]
    pub const fn weeks(n: i64) -> Self {
        Self(n * NANOS_PER_WEEK)
    }

    /// Sums composite fields into a single duration.
    ///
    /// # Errors
    /// Returns [`TimeError::Overflow`] if the total does not fit in `i64` ticks.
    pub fn from_parts(parts: DurationParts) -> Result<Self> {
        let terms = [
            (parts.weeks, NANOS_PER_WEEK),
            (parts.days, NANOS_PER_DAY),
            (parts.hours, NANOS_PER_HOUR),
            (parts.minutes, NANOS_PER_MINUTE),
            (parts.seconds, NANOS_PER_SECOND),
            (parts.milliseconds, NANOS_PER_MILLI),
            (parts.microseconds, NANOS_PER_MICRO),
            (parts.nanoseconds, 1),
        ];
        let mut total = 0i64;
        for (count, scale) in terms {
            total = count
                .checked_mul(scale)
                .and_then(|ticks| total.checked_add(ticks))
                .ok_or_else(|| TimeError::Overflow(format!("{parts:?}")))?;
        }
        Ok(Self(total))
    }

    /// Returns the raw tick count.
    #[must_use]
    pub const fn ticks(&self) -> i64 {
        self.0
    }

    /// Returns the length in seconds as a float.
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.0 as f64 / NANOS_PER_SECOND as f64
    }

    /// Returns true if the duration is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    ///
    /// # Panics
    /// Panics if the duration is `i64::MIN` ticks.
    #[must_use]
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Adds two durations, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(ticks) => Some(Self(ticks)),
            None => None,
        }
    }

    /// Subtracts two durations, returning `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(ticks) => Some(Self(ticks)),
            None => None,
        }
    }

    /// Multiplies by an integer factor, returning `None` on overflow.
    #[must_use]
    pub const fn checked_mul(self, factor: i64) -> Option<Self> {
        match self.0.checked_mul(factor) {
            Some(ticks) => Some(Self(ticks)),
            None => None,
        }
    }

    /// Splits the magnitude into days and clock fields.
    #[must_use]
    pub const fn components(&self) -> DurationComponents {
        let magnitude = self.0.unsigned_abs();
        let day = NANOS_PER_DAY as u64;
        let hour = NANOS_PER_HOUR as u64;
        let minute = NANOS_PER_MINUTE as u64;
        let second = NANOS_PER_SECOND as u64;
        DurationComponents {
            negative: self.0 < 0,
            days: magnitude / day,
            hours: (magnitude % day) / hour,
            minutes: (magnitude % hour) / minute,
            seconds: (magnitude % minute) / second,
            nanoseconds: magnitude % second,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.components();
        let sign = if c.negative { "-" } else { "" };
        write!(
            f,
            "{sign}{} days {:02}:{:02}:{:02}",
            c.days, c.hours, c.minutes, c.seconds
        )?;
        if c.nanoseconds > 0 {
            write!(f, ".{:09}", c.nanoseconds)?;
        }
        Ok(())
    }
}

/// Maps a unit token to its tick width.
fn unit_ticks(token: &str) -> Option<i64> {
    let ticks = match token {
        "W" | "w" | "week" | "weeks" => NANOS_PER_WEEK,
        "D" | "d" | "day" | "days" => NANOS_PER_DAY,
        "H" | "h" | "hr" | "hour" | "hours" => NANOS_PER_HOUR,
        "T" | "m" | "min" | "mins" | "minute" | "minutes" => NANOS_PER_MINUTE,
        "S" | "s" | "sec" | "secs" | "second" | "seconds" => NANOS_PER_SECOND,
        "L" | "ms" | "milli" | "millis" | "millisecond" | "milliseconds" => NANOS_PER_MILLI,
        "U" | "us" | "micro" | "micros" | "microsecond" | "microseconds" => NANOS_PER_MICRO,
        "N" | "ns" | "nano" | "nanos" | "nanosecond" | "nanoseconds" => 1,
        _ => return None,
    };
    Some(ticks)
}

/// Parses `HH:MM:SS[.fraction]` into ticks.
fn parse_clock(text: &str, original: &str) -> Result<i64> {
    let err = || TimeError::Parse(format!("invalid clock component in duration {original:?}"));
    let mut fields = text.split(':');
    let (Some(h), Some(m), Some(rest), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(err());
    };
    let (s, frac) = match rest.split_once('.') {
        Some((s, frac)) => (s, Some(frac)),
        None => (rest, None),
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(h) || !all_digits(m) || !all_digits(s) {
        return Err(err());
    }
    let hours: i64 = h.parse().map_err(|_| err())?;
    let minutes: i64 = m.parse().map_err(|_| err())?;
    let seconds: i64 = s.parse().map_err(|_| err())?;
    if minutes >= 60 || seconds >= 60 {
        return Err(err());
    }
    let nanos = match frac {
        Some(frac) => parse_fraction(frac).ok_or_else(err)?,
        None => 0,
    };
    hours
        .checked_mul(NANOS_PER_HOUR)
        .and_then(|t| t.checked_add(minutes * NANOS_PER_MINUTE + seconds * NANOS_PER_SECOND))
        .and_then(|t| t.checked_add(nanos))
        .ok_or_else(|| TimeError::Overflow(original.to_string()))
}

/// Parses up to nine fractional-second digits into nanoseconds.
pub(crate) fn parse_fraction(digits: &str) -> Option<i64> {
    if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(value * 10i64.pow(9 - digits.len() as u32))
}

impl FromStr for Duration {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self> {
        let original = s;
        let trimmed = s.trim();
        let (negative, mut rest) = match trimmed.strip_prefix('-') {
            Some(body) => (true, body.trim_start()),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed).trim_start()),
        };
        if rest.is_empty() {
            return Err(TimeError::Parse(format!("empty duration {original:?}")));
        }

        let mut total = 0i64;
        while !rest.is_empty() {
            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits_end == 0 {
                return Err(TimeError::Parse(format!(
                    "expected a number in duration {original:?}"
                )));
            }
            if rest[digits_end..].starts_with(':') {
                let clock_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                let ticks = parse_clock(&rest[..clock_end], original)?;
                total = total
                    .checked_add(ticks)
                    .ok_or_else(|| TimeError::Overflow(original.to_string()))?;
                rest = rest[clock_end..].trim_start();
                if !rest.is_empty() {
                    return Err(TimeError::Parse(format!(
                        "clock component must come last in duration {original:?}"
                    )));
                }
                break;
            }

            let count: i64 = rest[..digits_end]
                .parse()
                .map_err(|_| TimeError::Overflow(original.to_string()))?;
            rest = rest[digits_end..].trim_start();
            let unit_end = rest
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(rest.len());
            let token = &rest[..unit_end];
            let scale = unit_ticks(token).ok_or_else(|| {
                TimeError::Parse(format!("unknown unit {token:?} in duration {original:?}"))
            })?;
            total = count
                .checked_mul(scale)
                .and_then(|ticks| total.checked_add(ticks))
                .ok_or_else(|| TimeError::Overflow(original.to_string()))?;
            rest = rest[unit_end..].trim_start();
        }

        Ok(Self(if negative { -total } else { total }))
    }
}

impl From<Duration> for chrono::TimeDelta {
    fn from(d: Duration) -> Self {
        Self::nanoseconds(d.0)
    }
}

impl TryFrom<chrono::TimeDelta> for Duration {
    type Error = TimeError;

    fn try_from(delta: chrono::TimeDelta) -> Result<Self> {
        delta
            .num_nanoseconds()
            .map(Self)
            .ok_or_else(|| TimeError::Overflow(format!("{delta}")))
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match self.checked_add(rhs) {
            Some(d) => d,
            None => panic!("overflow when adding durations"),
        }
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        match self.checked_sub(rhs) {
            Some(d) => d,
            None => panic!("overflow when subtracting durations"),
        }
    }
}

impl Mul<i64> for Duration {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        match self.checked_mul(rhs) {
            Some(d) => d,
            None => panic!("overflow when multiplying duration"),
        }
    }
}

impl Neg for Duration {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_units() {
        assert_eq!("3D".parse::<Duration>().unwrap(), Duration::days(3));
        assert_eq!("90s".parse::<Duration>().unwrap(), Duration::seconds(90));
        assert_eq!("6h".parse::<Duration>().unwrap(), Duration::hours(6));
        assert_eq!("15min".parse::<Duration>().unwrap(), Duration::minutes(15));
        assert_eq!("250ms".parse::<Duration>().unwrap(), Duration::milliseconds(250));
    }

    #[test]
    fn test_parse_signed_words() {
        assert_eq!("-2 days".parse::<Duration>().unwrap(), Duration::days(-2));
        assert_eq!(
            "1 hour 30 minutes".parse::<Duration>().unwrap(),
            Duration::minutes(90)
        );
        assert_eq!("+1W".parse::<Duration>().unwrap(), Duration::weeks(1));
    }

    #[test]
    fn test_parse_clock_form() {
        let d: Duration = "1 days 02:30:00".parse().unwrap();
        assert_eq!(d, Duration::days(1) + Duration::hours(2) + Duration::minutes(30));

        let d: Duration = "00:00:01.5".parse().unwrap();
        assert_eq!(d, Duration::milliseconds(1500));
    }

    #[test]
    fn test_parse_rejects_unknown_unit() {
        let err = "3 fortnights".parse::<Duration>().unwrap_err();
        assert!(matches!(err, TimeError::Parse(_)));
        assert!("".parse::<Duration>().is_err());
        assert!("days".parse::<Duration>().is_err());
        assert!("1 month".parse::<Duration>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let d = -(Duration::days(1) + Duration::hours(2) + Duration::nanoseconds(5));
        let text = d.to_string();
        assert_eq!(text, "-1 days 02:00:00.000000005");
        assert_eq!(text.parse::<Duration>().unwrap(), d);
    }

    #[test]
    fn test_from_parts_sums_fields() {
        let d = Duration::from_parts(DurationParts {
            weeks: 1,
            days: 2,
            minutes: 3,
            seconds: 4,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            d,
            Duration::weeks(1) + Duration::days(2) + Duration::minutes(3) + Duration::seconds(4)
        );
    }

    #[test]
    fn test_from_parts_overflow() {
        let err = Duration::from_parts(DurationParts {
            weeks: i64::MAX,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, TimeError::Overflow(_)));
    }

    #[test]
    fn test_components() {
        let c = (Duration::days(2) + Duration::seconds(61)).components();
        assert_eq!((c.days, c.hours, c.minutes, c.seconds), (2, 0, 1, 1));
        assert!(!c.negative);
        assert_eq!(Duration::minutes(-1).total_seconds(), -60.0);
    }

    #[test]
    fn test_chrono_conversion() {
        let delta: chrono::TimeDelta = Duration::hours(5).into();
        assert_eq!(delta.num_hours(), 5);
        assert_eq!(Duration::try_from(delta).unwrap(), Duration::hours(5));
    }
}
