//! Ordered time axes.
//!
//! A [`TimeIndex`] is an immutable sequence of [`Timestamp`]s shared through
//! an `Arc`, so series derived from one another (shift, arithmetic) reuse the
//! same allocation. Sorted indices are looked up by binary search; unsorted
//! ones are accepted, flagged, and scanned linearly.
//!
//! Exact lookup ([`TimeIndex::exact_lookup`]) and positional lookup
//! ([`TimeIndex::position_lookup`]) are separate entry points and never share
//! an accessor.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::duration::Duration;
use crate::error::{Result, TimeError};
use crate::frequency::Frequency;
use crate::partial::PartialSpec;
use crate::series::CmpOp;
use crate::timestamp::{IntoTimestamp, TimeUnit, Timestamp};

/// Largest up-front reservation for a `Periods` range.
const RESERVE_LIMIT: usize = 4096;

/// Upper bound for [`TimeIndex::range`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeEnd {
    /// Stop after the last point at or before this timestamp.
    Until(Timestamp),
    /// Stop after this many points.
    Periods(usize),
}

/// An ordered sequence of timestamps backing one or more series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeIndex {
    stamps: Arc<[Timestamp]>,
    sorted: bool,
    frequency: Option<Frequency>,
    name: Option<String>,
}

impl Default for TimeIndex {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn is_non_decreasing(stamps: &[Timestamp]) -> bool {
    stamps.windows(2).all(|w| w[0] <= w[1])
}

impl TimeIndex {
    /// Creates an index, recording whether the input is sorted.
    #[must_use]
    pub fn new(stamps: Vec<Timestamp>) -> Self {
        let sorted = is_non_decreasing(&stamps);
        Self {
            stamps: stamps.into(),
            sorted,
            frequency: None,
            name: None,
        }
    }

    /// Builds an index from timestamp-like values.
    ///
    /// Construction is all-or-nothing: the first value that fails to convert
    /// aborts the whole build.
    ///
    /// # Errors
    /// Propagates the conversion error of the first bad value.
    pub fn try_from_iter<I, T>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoTimestamp,
    {
        let stamps = values
            .into_iter()
            .map(IntoTimestamp::into_timestamp)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(stamps))
    }

    /// Builds an index from integer epoch counts.
    ///
    /// # Errors
    /// Returns [`TimeError::Overflow`] if any value leaves the tick range.
    pub fn from_epoch(values: &[i64], unit: TimeUnit) -> Result<Self> {
        let stamps = values
            .iter()
            .map(|&v| Timestamp::from_epoch(v, unit))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(stamps))
    }

    /// Generates a sorted index spaced by `frequency`.
    ///
    /// Fixed-width frequencies start exactly at `start`. Anchored frequencies
    /// start at the first on-offset point at or after `start`'s day and keep
    /// its time of day, so `range("2015-07-03", Periods(3), "M")` yields the
    /// last days of July, August and September.
    ///
    /// # Errors
    /// Returns [`TimeError::Overflow`] if the range runs past the tick range.
    #[instrument(skip_all, fields(start = %start, freq = %frequency))]
    pub fn range(start: Timestamp, end: RangeEnd, frequency: Frequency) -> Result<Self> {
        let within = |point: Timestamp, produced: usize| match end {
            RangeEnd::Until(end) => point <= end,
            RangeEnd::Periods(n) => produced < n,
        };
        let mut stamps = Vec::new();
        if let RangeEnd::Periods(n) = end {
            stamps.reserve(n.min(RESERVE_LIMIT));
        }

        if frequency.is_anchored() {
            let time_of_day = start.time_of_day();
            let day = start
                .checked_normalize()
                .ok_or_else(|| TimeError::Overflow(format!("midnight before {start}")))?;
            let mut bucket = frequency.floor(day, Timestamp::EPOCH)?;
            loop {
                let next = frequency.advance(bucket, 1)?;
                let label = frequency.left_label(bucket, next);
                if label >= day {
                    break;
                }
                bucket = next;
            }
            loop {
                let next = frequency.advance(bucket, 1)?;
                let point = frequency
                    .left_label(bucket, next)
                    .checked_add(time_of_day)
                    .ok_or_else(|| TimeError::Overflow(format!("range from {start}")))?;
                if !within(point, stamps.len()) {
                    break;
                }
                stamps.push(point);
                bucket = next;
            }
        } else {
            let mut point = start;
            while within(point, stamps.len()) {
                stamps.push(point);
                let wanted = match end {
                    RangeEnd::Until(end) => point < end,
                    RangeEnd::Periods(n) => stamps.len() < n,
                };
                if !wanted {
                    break;
                }
                point = match (frequency.advance(point, 1), end) {
                    (Ok(next), _) => next,
                    // Past the last tick is past any `Until` bound.
                    (Err(_), RangeEnd::Until(_)) => break,
                    (Err(e), RangeEnd::Periods(_)) => return Err(e),
                };
            }
        }

        debug!(points = stamps.len(), "Generated time range");
        Ok(Self::new(stamps).with_frequency(frequency))
    }

    /// Like [`TimeIndex::range`], with the frequency given as a token.
    ///
    /// # Errors
    /// Returns [`TimeError::InvalidFrequency`] for an unrecognized token.
    pub fn range_str(start: Timestamp, end: RangeEnd, frequency: &str) -> Result<Self> {
        Self::range(start, end, frequency.parse()?)
    }

    /// Sets the declared frequency.
    #[must_use]
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Sets the index name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declared frequency, if any.
    #[must_use]
    pub const fn frequency(&self) -> Option<Frequency> {
        self.frequency
    }

    /// Index name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of timestamps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Returns true if the index holds no timestamps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Returns true if timestamps are non-decreasing.
    #[must_use]
    pub const fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// The timestamps as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Timestamp] {
        &self.stamps
    }

    /// Iterates over the timestamps in index order.
    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.stamps.iter().copied()
    }

    /// First timestamp.
    #[must_use]
    pub fn first(&self) -> Option<Timestamp> {
        self.stamps.first().copied()
    }

    /// Last timestamp.
    #[must_use]
    pub fn last(&self) -> Option<Timestamp> {
        self.stamps.last().copied()
    }

    /// Position of `ts`; the first one when it occurs more than once.
    ///
    /// # Errors
    /// Returns [`TimeError::NotFound`] if `ts` is absent.
    pub fn exact_lookup(&self, ts: Timestamp) -> Result<usize> {
        let found = if self.sorted {
            let pos = self.stamps.partition_point(|&t| t < ts);
            (self.stamps.get(pos) == Some(&ts)).then_some(pos)
        } else {
            self.stamps.iter().position(|&t| t == ts)
        };
        found.ok_or_else(|| TimeError::NotFound(ts.to_string()))
    }

    /// Positions of every timestamp inside the calendar span of `spec`.
    ///
    /// The returned range is maximal and contiguous. Only defined on sorted
    /// indices.
    ///
    /// # Errors
    /// Returns [`TimeError::UnsortedIndex`] on an unsorted index and
    /// [`TimeError::NotFound`] if nothing falls inside the span.
    pub fn partial_lookup(&self, spec: &PartialSpec) -> Result<Range<usize>> {
        let range = self.span_range(spec.start(), spec.end()?)?;
        if range.is_empty() {
            return Err(TimeError::NotFound(spec.to_string()));
        }
        Ok(range)
    }

    /// Positions from the start of `from`'s span through the end of `to`'s
    /// span, inclusive at both ends. May be empty.
    ///
    /// # Errors
    /// Returns [`TimeError::UnsortedIndex`] on an unsorted index.
    pub fn between(&self, from: &PartialSpec, to: &PartialSpec) -> Result<Range<usize>> {
        self.span_range(from.start(), to.end()?)
    }

    fn span_range(&self, start: Timestamp, end: Timestamp) -> Result<Range<usize>> {
        if !self.sorted {
            return Err(TimeError::UnsortedIndex);
        }
        let lo = self.stamps.partition_point(|&t| t < start);
        let hi = self.stamps.partition_point(|&t| t < end).max(lo);
        Ok(lo..hi)
    }

    /// Resolves a possibly negative offset to a position.
    pub(crate) fn resolve_position(&self, offset: isize) -> Result<usize> {
        let len = self.stamps.len();
        let pos = if offset < 0 {
            len.checked_sub(offset.unsigned_abs())
        } else {
            Some(offset.unsigned_abs()).filter(|&p| p < len)
        };
        pos.ok_or(TimeError::IndexOutOfRange {
            index: offset as i64,
            len,
        })
    }

    /// Timestamp at a position; negative offsets count from the end.
    ///
    /// # Errors
    /// Returns [`TimeError::IndexOutOfRange`] outside `-len..len`.
    pub fn position_lookup(&self, offset: isize) -> Result<Timestamp> {
        self.resolve_position(offset).map(|pos| self.stamps[pos])
    }

    /// Every timestamp moved by `delta`; sortedness and frequency are kept.
    ///
    /// # Errors
    /// Returns [`TimeError::Overflow`] if any timestamp leaves the tick range.
    pub fn shift_by(&self, delta: Duration) -> Result<Self> {
        let stamps = self
            .stamps
            .iter()
            .map(|t| {
                t.checked_add(delta)
                    .ok_or_else(|| TimeError::Overflow(format!("{t} + {delta}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            stamps: stamps.into(),
            sorted: self.sorted,
            frequency: self.frequency,
            name: self.name.clone(),
        })
    }

    /// Fixed-width frequency matching every gap, if the gaps are all equal
    /// and positive.
    #[must_use]
    pub fn infer_frequency(&self) -> Option<Frequency> {
        let mut gaps = self.stamps.windows(2).map(|w| w[1] - w[0]);
        let first = gaps.next()?;
        if gaps.all(|gap| gap == first) {
            Frequency::from_duration(first)
        } else {
            None
        }
    }

    /// Compares every timestamp against `ts`.
    #[must_use]
    pub fn compare(&self, op: CmpOp, ts: Timestamp) -> Vec<bool> {
        self.stamps.iter().map(|t| op.apply(t, &ts)).collect()
    }

    /// Positions that would sort the index (stable).
    #[must_use]
    pub fn argsort(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.stamps.len()).collect();
        if !self.sorted {
            order.sort_by_key(|&i| self.stamps[i]);
        }
        order
    }

    /// A new index holding the timestamps at `positions`, in that order.
    pub(crate) fn take(&self, positions: &[usize]) -> Self {
        let stamps: Vec<Timestamp> = positions.iter().map(|&i| self.stamps[i]).collect();
        let mut taken = Self::new(stamps);
        taken.name = self.name.clone();
        taken
    }

    /// A new index over a contiguous window, keeping the declared frequency.
    pub(crate) fn window(&self, range: Range<usize>) -> Self {
        let stamps = &self.stamps[range];
        Self {
            stamps: stamps.into(),
            sorted: self.sorted || is_non_decreasing(stamps),
            frequency: self.frequency,
            name: self.name.clone(),
        }
    }

    /// Returns true if both indices share one allocation or hold equal stamps.
    pub(crate) fn same_axis(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.stamps, &other.stamps) || self.stamps == other.stamps
    }
}

impl FromIterator<Timestamp> for TimeIndex {
    fn from_iter<I: IntoIterator<Item = Timestamp>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TimeIndex {
    type Item = Timestamp;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Timestamp>>;

    fn into_iter(self) -> Self::IntoIter {
        self.stamps.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn daily(start: &str, n: usize) -> TimeIndex {
        TimeIndex::range_str(ts(start), RangeEnd::Periods(n), "D").unwrap()
    }

    #[test]
    fn test_range_fixed_with_end() {
        let idx = TimeIndex::range_str(ts("2015-07-03"), RangeEnd::Until(ts("2015-07-10")), "D")
            .unwrap();
        assert_eq!(idx.len(), 8);
        assert_eq!(idx.first(), Some(ts("2015-07-03")));
        assert_eq!(idx.last(), Some(ts("2015-07-10")));
        assert_eq!(idx.frequency(), Some("D".parse().unwrap()));
    }

    #[test]
    fn test_range_hourly_periods() {
        let idx = TimeIndex::range_str(ts("2015-07-03"), RangeEnd::Periods(8), "h").unwrap();
        assert_eq!(idx.len(), 8);
        assert_eq!(idx.last(), Some(ts("2015-07-03 07:00")));
    }

    #[test]
    fn test_range_month_end_rolls_forward() {
        let idx = TimeIndex::range_str(ts("2015-07-03"), RangeEnd::Periods(3), "M").unwrap();
        let expected: Vec<Timestamp> = ["2015-07-31", "2015-08-31", "2015-09-30"]
            .iter()
            .map(|s| ts(s))
            .collect();
        assert_eq!(idx.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_range_month_start_and_business_days() {
        let idx = TimeIndex::range_str(ts("2015-07-03"), RangeEnd::Periods(2), "MS").unwrap();
        assert_eq!(idx.as_slice(), &[ts("2015-08-01"), ts("2015-09-01")]);

        let idx = TimeIndex::range_str(ts("2015-07-04"), RangeEnd::Periods(3), "B").unwrap();
        assert_eq!(idx.as_slice(), &[ts("2015-07-06"), ts("2015-07-07"), ts("2015-07-08")]);
    }

    #[test]
    fn test_range_weekly_keeps_time_of_day() {
        let idx =
            TimeIndex::range_str(ts("2015-07-03 09:30"), RangeEnd::Periods(2), "W").unwrap();
        assert_eq!(idx.as_slice(), &[ts("2015-07-05 09:30"), ts("2015-07-12 09:30")]);
    }

    #[test]
    fn test_range_rejects_bad_frequency() {
        let err = TimeIndex::range_str(ts("2015-07-03"), RangeEnd::Periods(3), "5m").unwrap_err();
        assert!(matches!(err, TimeError::InvalidFrequency(_)));
    }

    #[test]
    fn test_range_empty_bounds() {
        assert!(daily("2015-07-03", 0).is_empty());
        let idx = TimeIndex::range_str(ts("2015-07-03"), RangeEnd::Until(ts("2015-07-01")), "D")
            .unwrap();
        assert!(idx.is_empty());
    }

    #[test]
    fn test_exact_lookup_sorted_and_unsorted() {
        let idx = daily("2015-07-01", 10);
        assert_eq!(idx.exact_lookup(ts("2015-07-04")).unwrap(), 3);
        assert!(matches!(
            idx.exact_lookup(ts("2015-07-04 01:00")),
            Err(TimeError::NotFound(_))
        ));

        let unsorted = TimeIndex::try_from_iter(["2015-07-03", "2015-07-01", "2015-07-02"]).unwrap();
        assert!(!unsorted.is_sorted());
        assert_eq!(unsorted.exact_lookup(ts("2015-07-02")).unwrap(), 2);
    }

    #[test]
    fn test_exact_lookup_returns_first_duplicate() {
        let idx = TimeIndex::try_from_iter(["2015-07-01", "2015-07-02", "2015-07-02"]).unwrap();
        assert_eq!(idx.exact_lookup(ts("2015-07-02")).unwrap(), 1);
    }

    #[test]
    fn test_partial_lookup_expands_to_span() {
        let idx = TimeIndex::range_str(ts("2016-12-30"), RangeEnd::Periods(5), "D").unwrap();
        let range = idx.partial_lookup(&"2017".parse().unwrap()).unwrap();
        assert_eq!(range, 2..5);
        let range = idx.partial_lookup(&"2016-12".parse().unwrap()).unwrap();
        assert_eq!(range, 0..2);
        assert!(matches!(
            idx.partial_lookup(&"2018".parse().unwrap()),
            Err(TimeError::NotFound(_))
        ));
    }

    #[test]
    fn test_partial_lookup_refuses_unsorted() {
        let idx = TimeIndex::try_from_iter(["2017-01-02", "2017-01-01"]).unwrap();
        assert_eq!(
            idx.partial_lookup(&"2017".parse().unwrap()),
            Err(TimeError::UnsortedIndex)
        );
    }

    #[test]
    fn test_between_is_inclusive_of_end_span() {
        let idx = daily("2015-01-30", 40);
        let range = idx
            .between(&"2015-02".parse().unwrap(), &"2015-02".parse().unwrap())
            .unwrap();
        assert_eq!(idx.position_lookup(range.start as isize).unwrap(), ts("2015-02-01"));
        assert_eq!(range.len(), 28);
    }

    #[test]
    fn test_position_lookup() {
        let idx = daily("2015-07-01", 3);
        assert_eq!(idx.position_lookup(0).unwrap(), ts("2015-07-01"));
        assert_eq!(idx.position_lookup(-1).unwrap(), ts("2015-07-03"));
        assert_eq!(
            idx.position_lookup(3),
            Err(TimeError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert!(idx.position_lookup(-4).is_err());
    }

    #[test]
    fn test_construction_is_all_or_nothing() {
        let err = TimeIndex::try_from_iter(["2016-01-01", "not-a-date"]).unwrap_err();
        assert!(matches!(err, TimeError::Parse(_)));
    }

    #[test]
    fn test_shift_by_and_infer_frequency() {
        let idx = daily("2015-07-01", 4);
        let shifted = idx.shift_by(Duration::hours(12)).unwrap();
        assert_eq!(shifted.first(), Some(ts("2015-07-01 12:00")));
        assert!(shifted.is_sorted());
        assert_eq!(shifted.infer_frequency(), Some("D".parse().unwrap()));

        let irregular = TimeIndex::try_from_iter(["2015-07-01", "2015-07-02", "2015-07-04"]).unwrap();
        assert_eq!(irregular.infer_frequency(), None);
    }

    #[test]
    fn test_from_epoch_and_compare() {
        let idx = TimeIndex::from_epoch(&[0, 86_400], TimeUnit::Seconds).unwrap();
        assert_eq!(idx.last(), Some(ts("1970-01-02")));
        assert_eq!(idx.compare(CmpOp::Ge, ts("1970-01-02")), vec![false, true]);
    }

    #[test]
    fn test_argsort_is_stable() {
        let idx = TimeIndex::try_from_iter(["2015-07-02", "2015-07-01", "2015-07-02"]).unwrap();
        assert_eq!(idx.argsort(), vec![1, 0, 2]);
    }

    #[test]
    fn test_range_past_tick_range_overflows() {
        let err = TimeIndex::range_str(ts("2017-01-01"), RangeEnd::Periods(usize::MAX), "D")
            .unwrap_err();
        assert!(matches!(err, TimeError::Overflow(_)));
    }

    #[test]
    fn test_range_ends_on_last_tick() {
        let last = Timestamp::from_ticks(i64::MAX);
        let start = Timestamp::from_ticks(i64::MAX - 1);
        let idx = TimeIndex::range_str(start, RangeEnd::Periods(2), "ns").unwrap();
        assert_eq!(idx.as_slice(), &[start, last]);
        let idx = TimeIndex::range_str(start, RangeEnd::Until(last), "ns").unwrap();
        assert_eq!(idx.len(), 2);
        let idx = TimeIndex::range_str(start, RangeEnd::Until(last), "h").unwrap();
        assert_eq!(idx.as_slice(), &[start]);
    }
}
