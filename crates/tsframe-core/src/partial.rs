//! Calendar-partial timestamp specifications.
//!
//! A [`PartialSpec`] names a calendar span at some [`Resolution`]: `"2017"`
//! is all of 2017, `"2017-03"` all of March 2017, and so on down to a single
//! exact tick. Index lookups expand the spec to the full span it implies.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::duration::{Duration, NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MINUTE, NANOS_PER_SECOND};
use crate::error::{Result, TimeError};
use crate::timestamp::{Timestamp, parse_calendar};

/// The finest calendar field present in a partial specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// A whole calendar year.
    Year,
    /// A whole calendar month.
    Month,
    /// A whole day.
    Day,
    /// A whole hour.
    Hour,
    /// A whole minute.
    Minute,
    /// A whole second.
    Second,
    /// A single tick.
    Exact,
}

/// A calendar span: its first tick plus the resolution it was written at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartialSpec {
    start: Timestamp,
    resolution: Resolution,
}

/// First day of the month `months` after the month containing `date`.
pub(crate) fn add_months(date: NaiveDate, months: i64) -> Result<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(index.div_euclid(12))
        .map_err(|_| TimeError::Overflow(format!("{date} + {months} months")))?;
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TimeError::Overflow(format!("{date} + {months} months")))
}

impl PartialSpec {
    /// Creates a spec covering the span of `resolution` that contains `ts`.
    ///
    /// The start is truncated to the resolution, so `new(2017-03-15 10:00,
    /// Month)` covers all of March 2017.
    ///
    /// # Errors
    /// Returns [`TimeError::Overflow`] if the truncated start is not representable.
    pub fn new(ts: Timestamp, resolution: Resolution) -> Result<Self> {
        let date = ts.date();
        let start = match resolution {
            Resolution::Year => Timestamp::from_ymd(date.year(), 1, 1)?,
            Resolution::Month => Timestamp::from_ymd(date.year(), date.month(), 1)?,
            Resolution::Day => truncate(ts, NANOS_PER_DAY)?,
            Resolution::Hour => truncate(ts, NANOS_PER_HOUR)?,
            Resolution::Minute => truncate(ts, NANOS_PER_MINUTE)?,
            Resolution::Second => truncate(ts, NANOS_PER_SECOND)?,
            Resolution::Exact => ts,
        };
        Ok(Self { start, resolution })
    }

    /// A spec matching exactly one tick.
    #[must_use]
    pub const fn exact(ts: Timestamp) -> Self {
        Self {
            start: ts,
            resolution: Resolution::Exact,
        }
    }

    /// First tick of the span.
    #[must_use]
    pub const fn start(&self) -> Timestamp {
        self.start
    }

    /// Resolution the spec was written at.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Exclusive upper bound of the span.
    ///
    /// # Errors
    /// Returns [`TimeError::Overflow`] if the bound is not representable.
    pub fn end(&self) -> Result<Timestamp> {
        let overflow = || TimeError::Overflow(format!("end of span starting {}", self.start));
        let step = |ticks: i64| {
            self.start
                .checked_add(Duration::from_ticks(ticks))
                .ok_or_else(overflow)
        };
        match self.resolution {
            Resolution::Year => {
                Timestamp::from_ymd(self.start.year().checked_add(1).ok_or_else(overflow)?, 1, 1)
            }
            Resolution::Month => {
                let next = add_months(self.start.date(), 1)?;
                Timestamp::from_ymd(next.year(), next.month(), 1)
            }
            Resolution::Day => step(NANOS_PER_DAY),
            Resolution::Hour => step(NANOS_PER_HOUR),
            Resolution::Minute => step(NANOS_PER_MINUTE),
            Resolution::Second => step(NANOS_PER_SECOND),
            Resolution::Exact => step(1),
        }
    }

    /// Returns true if `ts` lies inside the span.
    #[must_use]
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && !matches!(self.end(), Ok(end) if ts >= end)
    }
}

fn truncate(ts: Timestamp, unit: i64) -> Result<Timestamp> {
    ts.checked_truncate(unit)
        .ok_or_else(|| TimeError::Overflow(format!("start of span at tick {}", ts.ticks())))
}

impl FromStr for PartialSpec {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, resolution) = parse_calendar(s)?;
        Ok(Self { start, resolution })
    }
}

impl From<Timestamp> for PartialSpec {
    fn from(ts: Timestamp) -> Self {
        Self::exact(ts)
    }
}

impl fmt::Display for PartialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.start.to_datetime();
        let pattern = match self.resolution {
            Resolution::Year => "%Y",
            Resolution::Month => "%Y-%m",
            Resolution::Day => "%Y-%m-%d",
            Resolution::Hour => "%Y-%m-%d %H",
            Resolution::Minute => "%Y-%m-%d %H:%M",
            Resolution::Second => "%Y-%m-%d %H:%M:%S",
            Resolution::Exact => "%Y-%m-%d %H:%M:%S%.9f",
        };
        write!(f, "{}", dt.format(pattern))
    }
}
