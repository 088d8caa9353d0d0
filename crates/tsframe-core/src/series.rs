//! Value series aligned to a [`TimeIndex`].
//!
//! A [`TimeSeries`] pairs one `Option<f64>` per index position; `None` is a
//! missing value. Derived series (shift, scalar arithmetic, fills) share the
//! source index allocation. Time-aware selection goes through [`Selector`],
//! and time arithmetic on the index (`&series + Duration`) is distinct from
//! scalar arithmetic on the values (`&series + 1.0`).

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Range, Sub};

use crate::duration::Duration;
use crate::error::{Result, TimeError};
use crate::frequency::Frequency;
use crate::index::TimeIndex;
use crate::partial::PartialSpec;
use crate::reduce::{MissingPolicy, Reduction};
use crate::resample::{ResampleOptions, Resampler};
use crate::timestamp::{IntoTimestamp, Timestamp};
use crate::window::{CalendarField, GroupBy, Rolling};

/// Comparison operator for elementwise comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CmpOp {
    /// Evaluates `a <op> b`.
    #[must_use]
    pub fn apply<T: PartialOrd>(&self, a: &T, b: &T) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Lt => a < b,
            Self::Le => a <= b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
        }
    }
}

/// Row selection for [`TimeSeries::slice`] and frame row access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Every row inside a calendar span.
    Partial(PartialSpec),
    /// From the start of the first span through the end of the second.
    Between(PartialSpec, PartialSpec),
    /// Rows stamped exactly at a timestamp.
    Exact(Timestamp),
    /// A positional window.
    Positions(Range<usize>),
}

impl Selector {
    /// Resolves the selector against `index` to a contiguous position range.
    ///
    /// # Errors
    /// Returns the lookup error of the underlying index operation.
    pub fn resolve(&self, index: &TimeIndex) -> Result<Range<usize>> {
        match self {
            Self::Partial(spec) => index.partial_lookup(spec),
            Self::Between(from, to) => index.between(from, to),
            Self::Exact(ts) => {
                if index.is_sorted() {
                    index.partial_lookup(&PartialSpec::exact(*ts))
                } else {
                    index.exact_lookup(*ts).map(|pos| pos..pos + 1)
                }
            }
            Self::Positions(range) => {
                if range.start > range.end || range.end > index.len() {
                    return Err(TimeError::IndexOutOfRange {
                        index: range.end as i64,
                        len: index.len(),
                    });
                }
                Ok(range.clone())
            }
        }
    }
}

/// One rendered row of a series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Row timestamp, serialized as nanosecond ticks.
    pub timestamp: Timestamp,
    /// Row value; `None` when missing.
    pub value: Option<f64>,
}

/// A sequence of optional values aligned to a [`TimeIndex`].
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    index: TimeIndex,
    values: Vec<Option<f64>>,
    name: Option<String>,
}

impl TimeSeries {
    /// Creates a series from an index and one value per position.
    ///
    /// # Errors
    /// Returns [`TimeError::LengthMismatch`] if the lengths differ.
    pub fn new(index: TimeIndex, values: Vec<Option<f64>>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(TimeError::LengthMismatch {
                expected: index.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            index,
            values,
            name: None,
        })
    }

    /// Creates a series with no missing values.
    ///
    /// # Errors
    /// Returns [`TimeError::LengthMismatch`] if the lengths differ.
    pub fn from_values(index: TimeIndex, values: Vec<f64>) -> Result<Self> {
        Self::new(index, values.into_iter().map(Some).collect())
    }

    /// Builds a series from `(timestamp-like, value)` pairs.
    ///
    /// # Errors
    /// Propagates the conversion error of the first bad timestamp.
    pub fn from_points<I, T>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, Option<f64>)>,
        T: IntoTimestamp,
    {
        let (stamps, values): (Vec<_>, Vec<_>) = points
            .into_iter()
            .map(|(t, v)| t.into_timestamp().map(|ts| (ts, v)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();
        Self::new(TimeIndex::new(stamps), values)
    }

    /// Sets the series name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Series name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the series has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The time axis.
    #[must_use]
    pub const fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// The values in index order.
    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Number of missing values.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Value stamped exactly at `ts` (the first row if duplicated).
    ///
    /// # Errors
    /// Returns [`TimeError::NotFound`] if `ts` is not in the index.
    pub fn get(&self, ts: Timestamp) -> Result<Option<f64>> {
        self.index.exact_lookup(ts).map(|pos| self.values[pos])
    }

    /// Row at a position; negative offsets count from the end.
    ///
    /// # Errors
    /// Returns [`TimeError::IndexOutOfRange`] outside `-len..len`.
    pub fn at(&self, offset: isize) -> Result<(Timestamp, Option<f64>)> {
        let pos = self.index.resolve_position(offset)?;
        Ok((self.index.as_slice()[pos], self.values[pos]))
    }

    /// Iterates over `(timestamp, value)` rows in index order.
    pub fn points(&self) -> impl Iterator<Item = (Timestamp, Option<f64>)> + '_ {
        self.index.iter().zip(self.values.iter().copied())
    }

    /// Rows as serializable records.
    #[must_use]
    pub fn to_records(&self) -> Vec<Point> {
        self.points()
            .map(|(timestamp, value)| Point { timestamp, value })
            .collect()
    }

    /// Assembles a series whose parts are already known to agree in length.
    pub(crate) const fn from_parts(
        index: TimeIndex,
        values: Vec<Option<f64>>,
        name: Option<String>,
    ) -> Self {
        Self {
            index,
            values,
            name,
        }
    }

    pub(crate) fn with_values(&self, values: Vec<Option<f64>>) -> Self {
        Self {
            index: self.index.clone(),
            values,
            name: self.name.clone(),
        }
    }

    /// Moves values `n` positions along the index; positive moves later.
    ///
    /// Vacated positions are missing and the index is shared.
    #[must_use]
    pub fn shift(&self, n: i64) -> Self {
        let len = self.values.len() as i64;
        let values = (0..len)
            .map(|i| {
                let src = i.saturating_sub(n);
                if (0..len).contains(&src) {
                    self.values[src as usize]
                } else {
                    None
                }
            })
            .collect();
        self.with_values(values)
    }

    /// Moves the index by `delta`, keeping values in place.
    ///
    /// # Errors
    /// Returns [`TimeError::Overflow`] if a timestamp leaves the tick range.
    pub fn tshift(&self, delta: Duration) -> Result<Self> {
        Ok(Self {
            index: self.index.shift_by(delta)?,
            values: self.values.clone(),
            name: self.name.clone(),
        })
    }

    /// Rows chosen by `selector`, as a new series.
    ///
    /// # Errors
    /// Returns the lookup error of the selector.
    pub fn slice(&self, selector: &Selector) -> Result<Self> {
        let range = selector.resolve(&self.index)?;
        Ok(self.window(range))
    }

    pub(crate) fn window(&self, range: Range<usize>) -> Self {
        Self {
            index: self.index.window(range.clone()),
            values: self.values[range].to_vec(),
            name: self.name.clone(),
        }
    }

    /// Binds a resampler at the frequency named by `frequency`.
    ///
    /// # Errors
    /// Returns [`TimeError::InvalidFrequency`] for an unrecognized token.
    pub fn resample(&self, frequency: &str) -> Result<Resampler<'_>> {
        Ok(Resampler::new(self, frequency.parse()?, ResampleOptions::default()))
    }

    /// Binds a resampler with explicit options.
    #[must_use]
    pub fn resample_with(&self, frequency: Frequency, options: ResampleOptions) -> Resampler<'_> {
        Resampler::new(self, frequency, options)
    }

    /// Count-based rolling window of `window` rows.
    ///
    /// # Errors
    /// Returns [`TimeError::InvalidParameter`] if `window` is zero.
    pub fn rolling(&self, window: usize) -> Result<Rolling<'_>> {
        Rolling::new(self, window)
    }

    /// Groups rows by a calendar field of their timestamps.
    #[must_use]
    pub fn group_by(&self, field: CalendarField) -> GroupBy<'_> {
        GroupBy::new(self, field)
    }

    /// Applies `f` to every present value.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        self.with_values(self.values.iter().map(|v| v.map(&f)).collect())
    }

    /// Combines two series position by position.
    ///
    /// Missing on either side gives missing. The receiver's index is kept.
    ///
    /// # Errors
    /// Returns [`TimeError::LengthMismatch`] if the lengths differ.
    pub fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if self.len() != other.len() {
            return Err(TimeError::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| Some(f((*a)?, (*b)?)))
            .collect();
        Ok(self.with_values(values))
    }

    /// Compares every value against `rhs`; missing values compare as `None`.
    #[must_use]
    pub fn compare(&self, op: CmpOp, rhs: f64) -> Vec<Option<bool>> {
        self.values
            .iter()
            .map(|v| v.map(|x| op.apply(&x, &rhs)))
            .collect()
    }

    /// Difference from the value `n` positions earlier.
    #[must_use]
    pub fn diff(&self, n: i64) -> Self {
        let prior = self.shift(n);
        let values = self
            .values
            .iter()
            .zip(prior.values)
            .map(|(a, b)| Some((*a)? - b?))
            .collect();
        self.with_values(values)
    }

    /// Fractional change from the value `n` positions earlier.
    #[must_use]
    pub fn pct_change(&self, n: i64) -> Self {
        let prior = self.shift(n);
        let values = self
            .values
            .iter()
            .zip(prior.values)
            .map(|(a, b)| Some((*a)? / b? - 1.0))
            .collect();
        self.with_values(values)
    }

    /// Replaces missing values with `value`.
    #[must_use]
    pub fn fill_missing(&self, value: f64) -> Self {
        self.with_values(self.values.iter().map(|v| v.or(Some(value))).collect())
    }

    /// Replaces each missing value with the last preceding present one.
    #[must_use]
    pub fn forward_fill(&self) -> Self {
        let mut last = None;
        let values = self
            .values
            .iter()
            .map(|v| {
                if v.is_some() {
                    last = *v;
                }
                last
            })
            .collect();
        self.with_values(values)
    }

    /// Replaces each missing value with the next following present one.
    #[must_use]
    pub fn backward_fill(&self) -> Self {
        let mut next = None;
        let mut values: Vec<Option<f64>> = self
            .values
            .iter()
            .rev()
            .map(|v| {
                if v.is_some() {
                    next = *v;
                }
                next
            })
            .collect();
        values.reverse();
        self.with_values(values)
    }

    /// Rows whose value is present.
    #[must_use]
    pub fn drop_missing(&self) -> Self {
        let keep: Vec<usize> = (0..self.len()).filter(|&i| self.values[i].is_some()).collect();
        self.take(&keep)
    }

    /// Rows reordered by timestamp; ties keep their relative order.
    #[must_use]
    pub fn sort_index(&self) -> Self {
        if self.index.is_sorted() {
            return self.clone();
        }
        self.take(&self.index.argsort())
    }

    pub(crate) fn take(&self, positions: &[usize]) -> Self {
        Self {
            index: self.index.take(positions),
            values: positions.iter().map(|&i| self.values[i]).collect(),
            name: self.name.clone(),
        }
    }

    /// Reduces every value to one.
    #[must_use]
    pub fn reduce(&self, reduction: Reduction, missing: MissingPolicy) -> Option<f64> {
        reduction.apply(self.values.iter().copied(), missing)
    }
}

macro_rules! scalar_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<f64> for &TimeSeries {
            type Output = TimeSeries;

            fn $method(self, rhs: f64) -> TimeSeries {
                self.map(|v| v $op rhs)
            }
        }

        impl $trait<f64> for TimeSeries {
            type Output = TimeSeries;

            fn $method(self, rhs: f64) -> TimeSeries {
                (&self).$method(rhs)
            }
        }
    };
}

scalar_op!(Add, add, +);
scalar_op!(Sub, sub, -);
scalar_op!(Mul, mul, *);
scalar_op!(Div, div, /);

impl Neg for &TimeSeries {
    type Output = TimeSeries;

    fn neg(self) -> TimeSeries {
        self.map(|v| -v)
    }
}

impl Neg for TimeSeries {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

impl Add<Duration> for &TimeSeries {
    type Output = TimeSeries;

    fn add(self, rhs: Duration) -> TimeSeries {
        match self.tshift(rhs) {
            Ok(series) => series,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Sub<Duration> for &TimeSeries {
    type Output = TimeSeries;

    fn sub(self, rhs: Duration) -> TimeSeries {
        match rhs.ticks().checked_neg().map(Duration::from_ticks) {
            Some(back) => self + back,
            None => panic!("overflow when negating {rhs}"),
        }
    }
}
