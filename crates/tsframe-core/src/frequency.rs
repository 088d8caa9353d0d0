//! Frequency definitions for range generation and resampling.
//!
//! This module defines [`Frequency`], a positive multiple of a
//! [`FrequencyUnit`]. Units form a closed set; text tokens are resolved
//! through a fixed alias table so that an unknown or ambiguous token is an
//! error rather than a silent misparse. Each unit maps to one alignment rule:
//!
//! | unit | aliases | rule |
//! |------|---------|------|
//! | nanosecond .. day | `N`/`ns`, `U`/`us`, `L`/`ms`, `S`/`s`, `T`/`min`, `H`/`h`, `D`/`d` | fixed tick width |
//! | week | `W` | Monday-start weeks, labelled by Sunday |
//! | business day | `B` | Monday to Friday |
//! | month | `MS` (start), `M`/`ME` (end) | calendar months |
//! | quarter | `QS` (start), `Q`/`QE` (end) | calendar quarters |
//! | year | `YS`/`AS` (start), `Y`/`A`/`YE` (end) | calendar years |

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::duration::{
    Duration, NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MICRO, NANOS_PER_MILLI, NANOS_PER_MINUTE,
    NANOS_PER_SECOND, NANOS_PER_WEEK,
};
use crate::error::{Result, TimeError};
use crate::partial::add_months;
use crate::timestamp::Timestamp;

/// Base unit of a [`Frequency`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyUnit {
    /// One nanosecond.
    Nanosecond,
    /// One microsecond.
    Microsecond,
    /// One millisecond.
    Millisecond,
    /// One second.
    Second,
    /// One minute.
    Minute,
    /// One hour.
    Hour,
    /// One 24-hour day.
    Day,
    /// Calendar week, Monday to Sunday, labelled by its Sunday.
    Week,
    /// Monday to Friday days.
    BusinessDay,
    /// Calendar month labelled by its first day.
    MonthStart,
    /// Calendar month labelled by its last day.
    MonthEnd,
    /// Calendar quarter labelled by its first day.
    QuarterStart,
    /// Calendar quarter labelled by its last day.
    QuarterEnd,
    /// Calendar year labelled by January 1.
    YearStart,
    /// Calendar year labelled by December 31.
    YearEnd,
}

/// Alias table, longest tokens first within each family.
const TOKENS: &[(&str, FrequencyUnit)] = &[
    ("N", FrequencyUnit::Nanosecond),
    ("ns", FrequencyUnit::Nanosecond),
    ("U", FrequencyUnit::Microsecond),
    ("us", FrequencyUnit::Microsecond),
    ("L", FrequencyUnit::Millisecond),
    ("ms", FrequencyUnit::Millisecond),
    ("S", FrequencyUnit::Second),
    ("s", FrequencyUnit::Second),
    ("T", FrequencyUnit::Minute),
    ("min", FrequencyUnit::Minute),
    ("H", FrequencyUnit::Hour),
    ("h", FrequencyUnit::Hour),
    ("D", FrequencyUnit::Day),
    ("d", FrequencyUnit::Day),
    ("W", FrequencyUnit::Week),
    ("B", FrequencyUnit::BusinessDay),
    ("MS", FrequencyUnit::MonthStart),
    ("M", FrequencyUnit::MonthEnd),
    ("ME", FrequencyUnit::MonthEnd),
    ("QS", FrequencyUnit::QuarterStart),
    ("Q", FrequencyUnit::QuarterEnd),
    ("QE", FrequencyUnit::QuarterEnd),
    ("YS", FrequencyUnit::YearStart),
    ("AS", FrequencyUnit::YearStart),
    ("Y", FrequencyUnit::YearEnd),
    ("A", FrequencyUnit::YearEnd),
    ("YE", FrequencyUnit::YearEnd),
];

/// How edges of a unit are laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rule {
    /// Fixed tick width, aligned relative to an origin.
    Fixed(i64),
    /// Monday-start weeks.
    Weekly,
    /// Weekdays only.
    BusinessDay,
    /// Whole calendar months.
    Calendar(i64),
}

impl FrequencyUnit {
    /// Canonical token used by `Display`.
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Nanosecond => "ns",
            Self::Microsecond => "us",
            Self::Millisecond => "ms",
            Self::Second => "s",
            Self::Minute => "min",
            Self::Hour => "h",
            Self::Day => "D",
            Self::Week => "W",
            Self::BusinessDay => "B",
            Self::MonthStart => "MS",
            Self::MonthEnd => "M",
            Self::QuarterStart => "QS",
            Self::QuarterEnd => "Q",
            Self::YearStart => "YS",
            Self::YearEnd => "Y",
        }
    }

    const fn rule(&self) -> Rule {
        match self {
            Self::Nanosecond => Rule::Fixed(1),
            Self::Microsecond => Rule::Fixed(NANOS_PER_MICRO),
            Self::Millisecond => Rule::Fixed(NANOS_PER_MILLI),
            Self::Second => Rule::Fixed(NANOS_PER_SECOND),
            Self::Minute => Rule::Fixed(NANOS_PER_MINUTE),
            Self::Hour => Rule::Fixed(NANOS_PER_HOUR),
            Self::Day => Rule::Fixed(NANOS_PER_DAY),
            Self::Week => Rule::Weekly,
            Self::BusinessDay => Rule::BusinessDay,
            Self::MonthStart | Self::MonthEnd => Rule::Calendar(1),
            Self::QuarterStart | Self::QuarterEnd => Rule::Calendar(3),
            Self::YearStart | Self::YearEnd => Rule::Calendar(12),
        }
    }
}

/// A positive multiple of a [`FrequencyUnit`], e.g. `"6h"` or `"2W"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency {
    multiple: u32,
    unit: FrequencyUnit,
}

/// Monday 1970-01-05, the reference point for multi-week alignment.
const REFERENCE_MONDAY: i64 = 4 * NANOS_PER_DAY;

impl Frequency {
    /// Creates a frequency of `multiple` units.
    ///
    /// # Errors
    /// Returns [`TimeError::InvalidFrequency`] if `multiple` is zero.
    pub fn new(multiple: u32, unit: FrequencyUnit) -> Result<Self> {
        if multiple == 0 {
            return Err(TimeError::InvalidFrequency(format!(
                "0{}: multiple must be positive",
                unit.token()
            )));
        }
        Ok(Self { multiple, unit })
    }

    /// A single unit.
    #[must_use]
    pub const fn of(unit: FrequencyUnit) -> Self {
        Self { multiple: 1, unit }
    }

    /// The multiple of the base unit.
    #[must_use]
    pub const fn multiple(&self) -> u32 {
        self.multiple
    }

    /// The base unit.
    #[must_use]
    pub const fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    /// Tick width of fixed-width frequencies; `None` for calendar-anchored ones.
    #[must_use]
    pub const fn tick_width(&self) -> Option<Duration> {
        match self.unit.rule() {
            Rule::Fixed(ticks) => match ticks.checked_mul(self.multiple as i64) {
                Some(width) => Some(Duration::from_ticks(width)),
                None => None,
            },
            _ => None,
        }
    }

    /// Returns true if edges sit on calendar boundaries rather than fixed widths.
    #[must_use]
    pub const fn is_anchored(&self) -> bool {
        !matches!(self.unit.rule(), Rule::Fixed(_))
    }

    /// Returns true if buckets are labelled by the last day of their period.
    #[must_use]
    pub const fn labels_period_end(&self) -> bool {
        matches!(
            self.unit,
            FrequencyUnit::Week
                | FrequencyUnit::MonthEnd
                | FrequencyUnit::QuarterEnd
                | FrequencyUnit::YearEnd
        )
    }

    /// Largest-unit fixed frequency equal to `width`, if one exists.
    #[must_use]
    pub fn from_duration(width: Duration) -> Option<Self> {
        let ticks = width.ticks();
        if ticks <= 0 {
            return None;
        }
        let units = [
            (NANOS_PER_DAY, FrequencyUnit::Day),
            (NANOS_PER_HOUR, FrequencyUnit::Hour),
            (NANOS_PER_MINUTE, FrequencyUnit::Minute),
            (NANOS_PER_SECOND, FrequencyUnit::Second),
            (NANOS_PER_MILLI, FrequencyUnit::Millisecond),
            (NANOS_PER_MICRO, FrequencyUnit::Microsecond),
            (1, FrequencyUnit::Nanosecond),
        ];
        units.into_iter().find_map(|(scale, unit)| {
            (ticks % scale == 0)
                .then(|| u32::try_from(ticks / scale).ok())
                .flatten()
                .map(|multiple| Self { multiple, unit })
        })
    }

    /// Start of the bucket containing `ts`.
    ///
    /// Fixed-width frequencies align to `origin`; anchored frequencies align
    /// to the calendar and ignore it.
    pub(crate) fn floor(&self, ts: Timestamp, origin: Timestamp) -> Result<Timestamp> {
        let multiple = i64::from(self.multiple);
        match self.unit.rule() {
            Rule::Fixed(ticks) => {
                let width = i128::from(ticks) * i128::from(multiple);
                let offset = i128::from(ts.ticks()) - i128::from(origin.ticks());
                let floored = i128::from(origin.ticks()) + offset.div_euclid(width) * width;
                i64::try_from(floored)
                    .map(Timestamp::from_ticks)
                    .map_err(|_| self.overflow(ts))
            }
            Rule::Weekly => {
                let day = ts.checked_normalize().ok_or_else(|| self.overflow(ts))?;
                let monday = i128::from(day.ticks())
                    - i128::from(day.weekday().num_days_from_monday()) * i128::from(NANOS_PER_DAY);
                let width = i128::from(NANOS_PER_WEEK) * i128::from(multiple);
                let reference = i128::from(REFERENCE_MONDAY);
                let floored = reference + (monday - reference).div_euclid(width) * width;
                i64::try_from(floored)
                    .map(Timestamp::from_ticks)
                    .map_err(|_| self.overflow(ts))
            }
            Rule::BusinessDay => {
                let day = ts.checked_normalize().ok_or_else(|| self.overflow(ts))?;
                let back = match day.weekday() {
                    Weekday::Sat => 1,
                    Weekday::Sun => 2,
                    _ => 0,
                };
                day.ticks()
                    .checked_sub(back * NANOS_PER_DAY)
                    .map(Timestamp::from_ticks)
                    .ok_or_else(|| self.overflow(ts))
            }
            Rule::Calendar(months) => {
                let step = months * multiple;
                let date = ts.date();
                let index = i64::from(date.year()) * 12 + i64::from(date.month0());
                let aligned = index.div_euclid(step) * step;
                let year = i32::try_from(aligned.div_euclid(12)).map_err(|_| self.overflow(ts))?;
                Timestamp::from_ymd(year, aligned.rem_euclid(12) as u32 + 1, 1)
            }
        }
    }

    /// Moves a bucket edge by `steps` buckets (negative steps move back).
    pub(crate) fn advance(&self, edge: Timestamp, steps: i64) -> Result<Timestamp> {
        let multiple = i64::from(self.multiple);
        let fixed = |width: i64| {
            width
                .checked_mul(multiple)
                .and_then(|w| w.checked_mul(steps))
                .and_then(|d| edge.checked_add(Duration::from_ticks(d)))
                .ok_or_else(|| self.overflow(edge))
        };
        match self.unit.rule() {
            Rule::Fixed(ticks) => fixed(ticks),
            Rule::Weekly => fixed(NANOS_PER_WEEK),
            Rule::BusinessDay => {
                let days = steps
                    .checked_mul(multiple)
                    .ok_or_else(|| self.overflow(edge))?;
                add_business_days(edge, days).ok_or_else(|| self.overflow(edge))
            }
            Rule::Calendar(months) => {
                let date = add_months(edge.date(), months * multiple * steps)?;
                Timestamp::from_ymd(date.year(), date.month(), 1)
            }
        }
    }

    /// Label of the bucket `[start, end)` under the left-label convention.
    ///
    /// Period-end frequencies report the last day of the period instead of
    /// its first instant.
    pub(crate) fn left_label(&self, start: Timestamp, end: Timestamp) -> Timestamp {
        if self.labels_period_end() {
            Timestamp::from_ticks(end.ticks() - NANOS_PER_DAY)
        } else {
            start
        }
    }

    fn overflow(&self, ts: Timestamp) -> TimeError {
        TimeError::Overflow(format!("stepping {ts} by {self}"))
    }
}

/// Moves `days` business days from a business day, skipping weekends.
fn add_business_days(start: Timestamp, days: i64) -> Option<Timestamp> {
    let mut weekday = i64::from(start.weekday().num_days_from_monday());
    let weeks = days.div_euclid(5);
    let mut remainder = days.rem_euclid(5);
    let mut calendar_days = weeks.checked_mul(7)?;
    while remainder > 0 {
        calendar_days += 1;
        weekday = (weekday + 1) % 7;
        if weekday < 5 {
            remainder -= 1;
        }
    }
    start.checked_add(Duration::from_ticks(calendar_days.checked_mul(NANOS_PER_DAY)?))
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiple == 1 {
            write!(f, "{}", self.unit.token())
        } else {
            write!(f, "{}{}", self.multiple, self.unit.token())
        }
    }
}

impl FromStr for Frequency {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, token) = trimmed.split_at(split);
        let multiple = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| TimeError::InvalidFrequency(s.to_string()))?
        };
        let unit = TOKENS
            .iter()
            .find(|(alias, _)| *alias == token)
            .map(|(_, unit)| *unit)
            .ok_or_else(|| TimeError::InvalidFrequency(s.to_string()))?;
        Self::new(multiple, unit)
    }
}

impl TryFrom<String> for Frequency {
    type Error = TimeError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl TryFrom<&str> for Frequency {
    type Error = TimeError;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl From<Frequency> for String {
    fn from(freq: Frequency) -> Self {
        freq.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn freq(s: &str) -> Frequency {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(freq("D"), Frequency::of(FrequencyUnit::Day));
        assert_eq!(freq("6h"), Frequency::new(6, FrequencyUnit::Hour).unwrap());
        assert_eq!(freq("15T"), Frequency::new(15, FrequencyUnit::Minute).unwrap());
        assert_eq!(freq("MS").unit(), FrequencyUnit::MonthStart);
        assert_eq!(freq("M").unit(), FrequencyUnit::MonthEnd);
        assert_eq!(freq("A").unit(), FrequencyUnit::YearEnd);
        assert_eq!(freq("2W").multiple(), 2);
    }

    #[test]
    fn test_parse_rejects_unknown_and_ambiguous() {
        for bad in ["", "m", "5m", "0D", "D2", "fortnight", "7 days"] {
            let err = bad.parse::<Frequency>().unwrap_err();
            assert!(matches!(err, TimeError::InvalidFrequency(_)), "{bad}");
        }
    }

    #[test]
    fn test_display_round_trips() {
        for token in ["ns", "7D", "6h", "min", "W", "B", "MS", "M", "QS", "Q", "YS", "Y"] {
            assert_eq!(freq(token).to_string(), token);
        }
        assert_eq!(freq("T").to_string(), "min");
    }

    #[test]
    fn test_tick_width() {
        assert_eq!(freq("6h").tick_width(), Some(Duration::hours(6)));
        assert_eq!(freq("M").tick_width(), None);
        assert!(freq("W").is_anchored());
        assert!(!freq("7D").is_anchored());
    }

    #[test]
    fn test_from_duration_prefers_largest_unit() {
        assert_eq!(Frequency::from_duration(Duration::days(7)), Some(freq("7D")));
        assert_eq!(Frequency::from_duration(Duration::minutes(90)), Some(freq("90min")));
        assert_eq!(Frequency::from_duration(Duration::ZERO), None);
    }

    #[test]
    fn test_floor_fixed_relative_to_origin() {
        let origin = ts("2017-01-01");
        let f = freq("7D");
        assert_eq!(f.floor(ts("2017-01-09 12:00"), origin).unwrap(), ts("2017-01-08"));
        assert_eq!(f.floor(ts("2017-01-01"), origin).unwrap(), origin);
    }

    #[test]
    fn test_floor_anchored() {
        let epoch = Timestamp::EPOCH;
        assert_eq!(freq("W").floor(ts("2015-07-04 10:00"), epoch).unwrap(), ts("2015-06-29"));
        assert_eq!(freq("B").floor(ts("2015-07-05"), epoch).unwrap(), ts("2015-07-03"));
        assert_eq!(freq("M").floor(ts("2015-07-04"), epoch).unwrap(), ts("2015-07-01"));
        assert_eq!(freq("Q").floor(ts("2015-08-04"), epoch).unwrap(), ts("2015-07-01"));
        assert_eq!(freq("Y").floor(ts("2015-08-04"), epoch).unwrap(), ts("2015-01-01"));
    }

    #[test]
    fn test_advance() {
        assert_eq!(freq("M").advance(ts("2015-11-01"), 3).unwrap(), ts("2016-02-01"));
        assert_eq!(freq("B").advance(ts("2015-07-03"), 1).unwrap(), ts("2015-07-06"));
        assert_eq!(freq("B").advance(ts("2015-07-06"), -1).unwrap(), ts("2015-07-03"));
        assert_eq!(freq("B").advance(ts("2015-07-01"), 7).unwrap(), ts("2015-07-10"));
        assert_eq!(freq("6h").advance(ts("2015-07-01"), -1).unwrap(), ts("2015-06-30 18:00"));
    }

    #[test]
    fn test_serde_uses_token() {
        let json = serde_json::to_string(&freq("6h")).unwrap();
        assert_eq!(json, "\"6h\"");
        let back: Frequency = serde_json::from_str("\"QS\"").unwrap();
        assert_eq!(back.unit(), FrequencyUnit::QuarterStart);
        assert!(serde_json::from_str::<Frequency>("\"5m\"").is_err());
    }

    #[test]
    fn test_floor_out_of_tick_range_overflows() {
        let origin = Timestamp::EPOCH;
        let weeks: Frequency = "20000W".parse().unwrap();
        assert!(matches!(
            weeks.floor(ts("1969-06-01"), origin),
            Err(TimeError::Overflow(_))
        ));
        let min = Timestamp::from_ticks(i64::MIN);
        for token in ["W", "B"] {
            let f: Frequency = token.parse().unwrap();
            assert!(matches!(f.floor(min, origin), Err(TimeError::Overflow(_))), "{token}");
        }
        assert_eq!(
            freq("W").floor(ts("1969-06-04 10:00"), origin).unwrap(),
            ts("1969-06-02")
        );
    }
}
