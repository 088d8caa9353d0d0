//! Rolling windows and calendar grouping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::duration::NANOS_PER_SECOND;
use crate::error::{Result, TimeError};
use crate::reduce::{MissingPolicy, Reduction};
use crate::series::TimeSeries;
use crate::timestamp::Timestamp;

/// A count-based window sliding over a series.
///
/// Each position sees the `window` rows ending at it, or centred on it when
/// [`Rolling::with_center`] is set. Positions whose window holds fewer than
/// `min_periods` present values are missing.
#[derive(Clone, Debug)]
pub struct Rolling<'a> {
    series: &'a TimeSeries,
    window: usize,
    center: bool,
    min_periods: usize,
}

impl<'a> Rolling<'a> {
    /// Creates a trailing window of `window` rows.
    ///
    /// # Errors
    /// Returns [`TimeError::InvalidParameter`] if `window` is zero.
    pub fn new(series: &'a TimeSeries, window: usize) -> Result<Self> {
        if window == 0 {
            return Err(TimeError::InvalidParameter(
                "rolling window must hold at least one row".to_string(),
            ));
        }
        Ok(Self {
            series,
            window,
            center: false,
            min_periods: window,
        })
    }

    /// Centres the window on each position.
    #[must_use]
    pub const fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    /// Minimum present values per window, capped at the window size.
    #[must_use]
    pub fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = min_periods.min(self.window);
        self
    }

    /// Window length in rows.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Reduces each window with `reduction`, ignoring missing values.
    #[must_use]
    pub fn apply(&self, reduction: Reduction) -> TimeSeries {
        let values = self.series.values();
        let len = values.len();
        let lead = if self.center { (self.window - 1) / 2 } else { 0 };
        let out = (0..len)
            .map(|i| {
                let end = (i + lead + 1).min(len);
                let start = (i + lead + 1).saturating_sub(self.window);
                let window = &values[start..end];
                let present = window.iter().filter(|v| v.is_some()).count();
                if present < self.min_periods {
                    None
                } else {
                    reduction.apply(window.iter().copied(), MissingPolicy::Skip)
                }
            })
            .collect();
        self.series.with_values(out)
    }

    /// Rolling sum.
    #[must_use]
    pub fn sum(&self) -> TimeSeries {
        self.apply(Reduction::Sum)
    }

    /// Rolling mean.
    #[must_use]
    pub fn mean(&self) -> TimeSeries {
        self.apply(Reduction::Mean)
    }

    /// Rolling minimum.
    #[must_use]
    pub fn min(&self) -> TimeSeries {
        self.apply(Reduction::Min)
    }

    /// Rolling maximum.
    #[must_use]
    pub fn max(&self) -> TimeSeries {
        self.apply(Reduction::Max)
    }

    /// Rolling sample standard deviation.
    #[must_use]
    pub fn std(&self) -> TimeSeries {
        self.apply(Reduction::Std)
    }
}

/// Calendar field used as a grouping key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarField {
    /// Calendar year.
    Year,
    /// Quarter, 1-4.
    Quarter,
    /// Month, 1-12.
    Month,
    /// Day of the month.
    Day,
    /// Hour, 0-23.
    Hour,
    /// Minute, 0-59.
    Minute,
    /// Day of the week, Monday = 0.
    Weekday,
    /// Day of the year, 1-366.
    DayOfYear,
    /// Whole seconds since midnight.
    TimeOfDay,
}

impl CalendarField {
    /// Key of `ts` for this field.
    #[must_use]
    pub fn key(&self, ts: Timestamp) -> i64 {
        match self {
            Self::Year => i64::from(ts.year()),
            Self::Quarter => i64::from(ts.quarter()),
            Self::Month => i64::from(ts.month()),
            Self::Day => i64::from(ts.day()),
            Self::Hour => i64::from(ts.hour()),
            Self::Minute => i64::from(ts.minute()),
            Self::Weekday => i64::from(ts.day_of_week()),
            Self::DayOfYear => i64::from(ts.day_of_year()),
            Self::TimeOfDay => ts.time_of_day().ticks() / NANOS_PER_SECOND,
        }
    }
}

/// Rows of a series grouped by a calendar field.
#[derive(Clone, Debug)]
pub struct GroupBy<'a> {
    series: &'a TimeSeries,
    field: CalendarField,
    missing: MissingPolicy,
}

impl<'a> GroupBy<'a> {
    /// Groups `series` by `field`; missing values are skipped by default.
    #[must_use]
    pub const fn new(series: &'a TimeSeries, field: CalendarField) -> Self {
        Self {
            series,
            field,
            missing: MissingPolicy::Skip,
        }
    }

    /// Sets the missing-value policy.
    #[must_use]
    pub const fn with_missing(mut self, missing: MissingPolicy) -> Self {
        self.missing = missing;
        self
    }

    /// Values per key, keys ascending, rows in index order within a group.
    #[must_use]
    pub fn groups(&self) -> BTreeMap<i64, Vec<Option<f64>>> {
        let mut groups: BTreeMap<i64, Vec<Option<f64>>> = BTreeMap::new();
        for (ts, value) in self.series.points() {
            groups.entry(self.field.key(ts)).or_default().push(value);
        }
        groups
    }

    /// One reduced value per key, keys ascending.
    #[must_use]
    pub fn reduce(&self, reduction: Reduction) -> Vec<(i64, Option<f64>)> {
        self.groups()
            .into_iter()
            .map(|(key, values)| (key, reduction.apply(values, self.missing)))
            .collect()
    }
}
