//! Frequency conversion of a series.
//!
//! A [`Resampler`] lays a grid of bucket edges over the source timeline at
//! the target [`Frequency`], assigns each row to exactly one bucket, and then
//! either reduces each bucket to one value (downsampling) or fills buckets
//! that received no observation (upsampling).
//!
//! ```
//! use tsframe_core::{RangeEnd, TimeIndex, TimeSeries};
//!
//! let index = TimeIndex::range_str("2017-01-01".parse()?, RangeEnd::Periods(10), "D")?;
//! let series = TimeSeries::from_values(index, vec![1.0; 10])?;
//! let weekly = series.resample("7D")?.sum()?;
//! assert_eq!(weekly.values(), &[Some(7.0), Some(3.0)]);
//! # Ok::<(), tsframe_core::TimeError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Range;
use tracing::{debug, instrument};

use crate::error::{Result, TimeError};
use crate::frequency::Frequency;
use crate::index::TimeIndex;
use crate::reduce::{MissingPolicy, Reduction};
use crate::series::TimeSeries;
use crate::timestamp::Timestamp;

/// Which side of a bucket is inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketClosed {
    /// Buckets are `[start, end)`.
    #[default]
    Left,
    /// Buckets are `(start, end]`.
    Right,
}

/// Which edge names a bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketLabel {
    /// The start edge (the last period day for period-end frequencies).
    #[default]
    Left,
    /// The end edge.
    Right,
}

/// Alignment point for fixed-width bucket grids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleOrigin {
    /// Midnight of the first source timestamp's day.
    #[default]
    StartDay,
    /// 1970-01-01T00:00:00.
    Epoch,
}

/// What a reduction reports for a bucket with no observations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBuckets {
    /// The bucket is missing.
    #[default]
    Missing,
    /// The reduction's identity (`sum` gives 0); missing if it has none.
    Identity,
}

/// Resampling configuration.
///
/// ```
/// use tsframe_core::{BucketClosed, ResampleOptions};
///
/// let options: ResampleOptions = serde_json::from_str(r#"{"closed": "right"}"#).unwrap();
/// assert_eq!(options, ResampleOptions::default().with_closed(BucketClosed::Right));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleOptions {
    /// Inclusive bucket side.
    pub closed: BucketClosed,
    /// Labelling edge.
    pub label: BucketLabel,
    /// Grid origin for fixed-width frequencies.
    pub origin: ResampleOrigin,
    /// Empty-bucket policy for reductions.
    pub empty_buckets: EmptyBuckets,
    /// Treatment of missing values inside a bucket.
    pub missing: MissingPolicy,
}

impl ResampleOptions {
    /// Sets the inclusive bucket side.
    #[must_use]
    pub const fn with_closed(mut self, closed: BucketClosed) -> Self {
        self.closed = closed;
        self
    }

    /// Sets the labelling edge.
    #[must_use]
    pub const fn with_label(mut self, label: BucketLabel) -> Self {
        self.label = label;
        self
    }

    /// Sets the grid origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: ResampleOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the empty-bucket policy.
    #[must_use]
    pub const fn with_empty_buckets(mut self, empty_buckets: EmptyBuckets) -> Self {
        self.empty_buckets = empty_buckets;
        self
    }

    /// Sets the missing-value policy.
    #[must_use]
    pub const fn with_missing(mut self, missing: MissingPolicy) -> Self {
        self.missing = missing;
        self
    }
}

/// A per-bucket computation, for applying one method across many series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleMethod {
    /// Reduce each bucket.
    Reduce(Reduction),
    /// Carry the last known bucket forward.
    ForwardFill,
    /// Carry the next known bucket backward.
    BackwardFill,
    /// Linear interpolation between known buckets.
    Interpolate,
    /// Fill empty buckets with a constant.
    Constant(f64),
    /// Known bucket values only.
    AsFreq,
}

/// Bucket grid over a sorted view of the source.
struct Grid<'a> {
    sorted: Cow<'a, TimeSeries>,
    labels: Vec<Timestamp>,
    rows: Vec<Range<usize>>,
}

impl Grid<'_> {
    fn bucket_values(&self, bucket: usize) -> &[Option<f64>] {
        &self.sorted.values()[self.rows[bucket].clone()]
    }

    /// Last present value in each bucket.
    fn known(&self) -> Vec<Option<f64>> {
        (0..self.rows.len())
            .map(|b| self.bucket_values(b).iter().rev().find_map(|v| *v))
            .collect()
    }
}

/// A series bound to a target frequency; terminal methods compute results.
#[derive(Clone, Debug)]
pub struct Resampler<'a> {
    source: &'a TimeSeries,
    frequency: Frequency,
    options: ResampleOptions,
}

impl<'a> Resampler<'a> {
    /// Binds `source` to `frequency`.
    #[must_use]
    pub const fn new(source: &'a TimeSeries, frequency: Frequency, options: ResampleOptions) -> Self {
        Self {
            source,
            frequency,
            options,
        }
    }

    /// Replaces the options.
    #[must_use]
    pub const fn with_options(mut self, options: ResampleOptions) -> Self {
        self.options = options;
        self
    }

    /// Target frequency.
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Current options.
    #[must_use]
    pub const fn options(&self) -> &ResampleOptions {
        &self.options
    }

    /// Start edge of the bucket holding `ts`.
    fn bucket_start(&self, ts: Timestamp, origin: Timestamp) -> Result<Timestamp> {
        let floor = self.frequency.floor(ts, origin)?;
        match self.options.closed {
            BucketClosed::Left => Ok(floor),
            BucketClosed::Right if floor == ts => self.frequency.advance(floor, -1),
            BucketClosed::Right => Ok(floor),
        }
    }

    fn in_bucket(&self, ts: Timestamp, end: Timestamp) -> bool {
        match self.options.closed {
            BucketClosed::Left => ts < end,
            BucketClosed::Right => ts <= end,
        }
    }

    fn grid(&self) -> Result<Grid<'a>> {
        let sorted = if self.source.index().is_sorted() {
            Cow::Borrowed(self.source)
        } else {
            Cow::Owned(self.source.sort_index())
        };
        let stamps = sorted.index().as_slice();
        let (Some(&first), Some(&last)) = (stamps.first(), stamps.last()) else {
            return Err(TimeError::EmptySeries);
        };
        let origin = match self.options.origin {
            ResampleOrigin::StartDay => first.checked_normalize().ok_or_else(|| {
                TimeError::Overflow(format!("midnight before tick {}", first.ticks()))
            })?,
            ResampleOrigin::Epoch => Timestamp::EPOCH,
        };

        let mut labels = Vec::new();
        let mut rows = Vec::new();
        let mut start = self.bucket_start(first, origin)?;
        let mut row = 0;
        loop {
            let end = self.frequency.advance(start, 1)?;
            let begin = row;
            while row < stamps.len() && self.in_bucket(stamps[row], end) {
                row += 1;
            }
            labels.push(match self.options.label {
                BucketLabel::Left => self.frequency.left_label(start, end),
                BucketLabel::Right => end,
            });
            rows.push(begin..row);
            if !self.in_bucket(last, end) {
                start = end;
                continue;
            }
            break;
        }

        Ok(Grid {
            sorted,
            labels,
            rows,
        })
    }

    fn finish(&self, labels: Vec<Timestamp>, values: Vec<Option<f64>>) -> Result<TimeSeries> {
        let buckets = labels.len();
        let mut index = TimeIndex::new(labels).with_frequency(self.frequency);
        if let Some(name) = self.source.index().name() {
            index = index.with_name(name);
        }
        let series = TimeSeries::new(index, values)?;
        debug!(buckets, freq = %self.frequency, "Resampled series");
        Ok(match self.source.name() {
            Some(name) => series.with_name(name),
            None => series,
        })
    }

    /// Reduces every bucket with `reduction`.
    ///
    /// `Count` is never missing. Other reductions report empty buckets per
    /// [`ResampleOptions::empty_buckets`]; under [`MissingPolicy::Skip`] a
    /// bucket of only missing values counts as empty.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    #[instrument(skip(self), fields(freq = %self.frequency, rows = self.source.len()))]
    pub fn aggregate(&self, reduction: Reduction) -> Result<TimeSeries> {
        let grid = self.grid()?;
        let values = (0..grid.rows.len())
            .map(|b| {
                let bucket = grid.bucket_values(b);
                let empty = match self.options.missing {
                    MissingPolicy::Propagate => bucket.is_empty(),
                    MissingPolicy::Skip => bucket.iter().all(Option::is_none),
                };
                if empty && reduction != Reduction::Count {
                    match self.options.empty_buckets {
                        EmptyBuckets::Missing => None,
                        EmptyBuckets::Identity => reduction.identity(),
                    }
                } else {
                    reduction.apply(bucket.iter().copied(), self.options.missing)
                }
            })
            .collect();
        self.finish(grid.labels, values)
    }

    /// Bucket sums.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn sum(&self) -> Result<TimeSeries> {
        self.aggregate(Reduction::Sum)
    }

    /// Bucket means.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn mean(&self) -> Result<TimeSeries> {
        self.aggregate(Reduction::Mean)
    }

    /// Bucket minima.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn min(&self) -> Result<TimeSeries> {
        self.aggregate(Reduction::Min)
    }

    /// Bucket maxima.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn max(&self) -> Result<TimeSeries> {
        self.aggregate(Reduction::Max)
    }

    /// Number of present values per bucket.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn count(&self) -> Result<TimeSeries> {
        self.aggregate(Reduction::Count)
    }

    /// First value per bucket.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn first(&self) -> Result<TimeSeries> {
        self.aggregate(Reduction::First)
    }

    /// Last value per bucket.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn last(&self) -> Result<TimeSeries> {
        self.aggregate(Reduction::Last)
    }

    /// Bucket medians.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn median(&self) -> Result<TimeSeries> {
        self.aggregate(Reduction::Median)
    }

    /// Bucket sample standard deviations.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn std(&self) -> Result<TimeSeries> {
        self.aggregate(Reduction::Std)
    }

    /// Last present value of each bucket, unfilled.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    #[instrument(skip(self), fields(freq = %self.frequency, rows = self.source.len()))]
    pub fn asfreq(&self) -> Result<TimeSeries> {
        let grid = self.grid()?;
        let known = grid.known();
        self.finish(grid.labels, known)
    }

    /// Fills each unknown bucket from the nearest preceding known one.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn forward_fill(&self) -> Result<TimeSeries> {
        self.fill_forward(usize::MAX)
    }

    /// Like [`Resampler::forward_fill`], filling at most `limit` consecutive
    /// buckets after each known one.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn forward_fill_limit(&self, limit: usize) -> Result<TimeSeries> {
        self.fill_forward(limit)
    }

    #[instrument(skip(self), fields(freq = %self.frequency, rows = self.source.len()))]
    fn fill_forward(&self, limit: usize) -> Result<TimeSeries> {
        let grid = self.grid()?;
        let values = carry(grid.known().into_iter(), limit);
        self.finish(grid.labels, values)
    }

    /// Fills each unknown bucket from the nearest following known one.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn backward_fill(&self) -> Result<TimeSeries> {
        self.fill_backward(usize::MAX)
    }

    /// Like [`Resampler::backward_fill`], filling at most `limit`
    /// consecutive buckets before each known one.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn backward_fill_limit(&self, limit: usize) -> Result<TimeSeries> {
        self.fill_backward(limit)
    }

    #[instrument(skip(self), fields(freq = %self.frequency, rows = self.source.len()))]
    fn fill_backward(&self, limit: usize) -> Result<TimeSeries> {
        let grid = self.grid()?;
        let mut values = carry(grid.known().into_iter().rev(), limit);
        values.reverse();
        self.finish(grid.labels, values)
    }

    /// Linearly interpolates unknown buckets between known neighbours, by
    /// tick distance between labels. Gaps without a neighbour on both sides
    /// stay missing.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    #[instrument(skip(self), fields(freq = %self.frequency, rows = self.source.len()))]
    pub fn interpolate(&self) -> Result<TimeSeries> {
        let grid = self.grid()?;
        let mut values = grid.known();
        let anchors: Vec<usize> = (0..values.len()).filter(|&b| values[b].is_some()).collect();
        for pair in anchors.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let (Some(v0), Some(v1)) = (values[lo], values[hi]) else {
                continue;
            };
            let t0 = grid.labels[lo].ticks() as f64;
            let span = grid.labels[hi].ticks() as f64 - t0;
            for b in lo + 1..hi {
                let frac = (grid.labels[b].ticks() as f64 - t0) / span;
                values[b] = Some(v0 + (v1 - v0) * frac);
            }
        }
        self.finish(grid.labels, values)
    }

    /// Fills unknown buckets with `value`.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    #[instrument(skip(self), fields(freq = %self.frequency, rows = self.source.len()))]
    pub fn fill_constant(&self, value: f64) -> Result<TimeSeries> {
        let grid = self.grid()?;
        let values = grid.known().into_iter().map(|v| v.or(Some(value))).collect();
        self.finish(grid.labels, values)
    }

    /// Runs `method`.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] if the source has no rows.
    pub fn apply(&self, method: ResampleMethod) -> Result<TimeSeries> {
        match method {
            ResampleMethod::Reduce(reduction) => self.aggregate(reduction),
            ResampleMethod::ForwardFill => self.forward_fill(),
            ResampleMethod::BackwardFill => self.backward_fill(),
            ResampleMethod::Interpolate => self.interpolate(),
            ResampleMethod::Constant(value) => self.fill_constant(value),
            ResampleMethod::AsFreq => self.asfreq(),
        }
    }
}

/// Carries known values over at most `limit` following unknown slots.
fn carry(known: impl Iterator<Item = Option<f64>>, limit: usize) -> Vec<Option<f64>> {
    let mut last = None;
    let mut run = 0usize;
    known
        .map(|v| match v {
            Some(_) => {
                last = v;
                run = 0;
                v
            }
            None => {
                run = run.saturating_add(1);
                if run <= limit { last } else { None }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RangeEnd;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn daily(start: &str, values: &[f64]) -> TimeSeries {
        let index = TimeIndex::range_str(ts(start), RangeEnd::Periods(values.len()), "D").unwrap();
        TimeSeries::from_values(index, values.to_vec()).unwrap()
    }

    fn labels(series: &TimeSeries) -> Vec<String> {
        series.index().iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_seven_day_sum_starts_at_first_day() {
        let s = daily("2017-01-01", &[1.0; 10]);
        let out = s.resample("7D").unwrap().sum().unwrap();
        assert_eq!(out.values(), &[Some(7.0), Some(3.0)]);
        assert_eq!(labels(&out), ["2017-01-01 00:00:00", "2017-01-08 00:00:00"]);
        assert_eq!(out.index().frequency(), Some("7D".parse().unwrap()));
    }

    #[test]
    fn test_epoch_origin_moves_edges() {
        let s = daily("2017-01-01", &[1.0; 10]);
        let options = ResampleOptions::default().with_origin(ResampleOrigin::Epoch);
        let out = s.resample_with("7D".parse().unwrap(), options).sum().unwrap();
        // Epoch-aligned 7D edges fall on Thursdays: 2016-12-29, 2017-01-05.
        assert_eq!(out.values(), &[Some(4.0), Some(6.0)]);
        assert_eq!(out.index().first(), Some(ts("2016-12-29")));
    }

    #[test]
    fn test_native_frequency_sum_is_identity() {
        let s = daily("2017-01-01", &[3.0, 1.0, 4.0, 1.0, 5.0]);
        let out = s.resample("D").unwrap().sum().unwrap();
        assert_eq!(out.values(), s.values());
        assert_eq!(out.index().as_slice(), s.index().as_slice());
    }

    #[test]
    fn test_interpolate_midpoint() {
        let s = daily("2017-01-01", &[10.0, 20.0]);
        let out = s.resample("12h").unwrap().interpolate().unwrap();
        assert_eq!(out.values(), &[Some(10.0), Some(15.0), Some(20.0)]);
        assert_eq!(out.index().as_slice()[1], ts("2017-01-01 12:00"));
    }

    #[test]
    fn test_upsample_fills() {
        let s = daily("2017-01-01", &[1.0, 3.0]);
        let r = s.resample("6h").unwrap();
        assert_eq!(r.asfreq().unwrap().missing_count(), 3);
        assert_eq!(
            r.forward_fill().unwrap().values(),
            &[Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(3.0)]
        );
        assert_eq!(
            r.backward_fill().unwrap().values(),
            &[Some(1.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0)]
        );
        assert_eq!(
            r.forward_fill_limit(1).unwrap().values(),
            &[Some(1.0), Some(1.0), None, None, Some(3.0)]
        );
        assert_eq!(
            r.backward_fill_limit(2).unwrap().values(),
            &[Some(1.0), None, Some(3.0), Some(3.0), Some(3.0)]
        );
        assert_eq!(r.fill_constant(0.0).unwrap().values()[2], Some(0.0));
    }

    #[test]
    fn test_empty_bucket_policy() {
        let s = TimeSeries::from_points([("2017-01-01", Some(1.0)), ("2017-01-04", Some(2.0))])
            .unwrap();
        let missing = s.resample("D").unwrap().sum().unwrap();
        assert_eq!(missing.values(), &[Some(1.0), None, None, Some(2.0)]);

        let options = ResampleOptions::default().with_empty_buckets(EmptyBuckets::Identity);
        let r = s.resample_with("D".parse().unwrap(), options);
        assert_eq!(r.sum().unwrap().values(), &[Some(1.0), Some(0.0), Some(0.0), Some(2.0)]);
        assert_eq!(r.mean().unwrap().values()[1], None);
        assert_eq!(
            s.resample("D").unwrap().count().unwrap().values(),
            &[Some(1.0), Some(0.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn test_missing_policy_inside_buckets() {
        let s = TimeSeries::from_points([
            ("2017-01-01 00:00", Some(1.0)),
            ("2017-01-01 12:00", None),
            ("2017-01-02 00:00", None),
        ])
        .unwrap();
        let propagate = s.resample("D").unwrap().sum().unwrap();
        assert_eq!(propagate.values(), &[None, None]);

        let options = ResampleOptions::default()
            .with_missing(MissingPolicy::Skip)
            .with_empty_buckets(EmptyBuckets::Identity);
        let skip = s.resample_with("D".parse().unwrap(), options).sum().unwrap();
        assert_eq!(skip.values(), &[Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_right_closed_right_labelled() {
        let index = TimeIndex::range_str(ts("2017-01-01"), RangeEnd::Periods(4), "h").unwrap();
        let s = TimeSeries::from_values(index, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let options = ResampleOptions::default()
            .with_closed(BucketClosed::Right)
            .with_label(BucketLabel::Right);
        let out = s.resample_with("2h".parse().unwrap(), options).sum().unwrap();
        assert_eq!(out.values(), &[Some(1.0), Some(5.0), Some(4.0)]);
        assert_eq!(
            labels(&out),
            ["2017-01-01 00:00:00", "2017-01-01 02:00:00", "2017-01-01 04:00:00"]
        );
    }

    #[test]
    fn test_month_end_labels() {
        let s = daily("2017-01-30", &[1.0; 4]);
        let out = s.resample("M").unwrap().sum().unwrap();
        assert_eq!(out.values(), &[Some(2.0), Some(2.0)]);
        assert_eq!(out.index().as_slice(), &[ts("2017-01-31"), ts("2017-02-28")]);

        let out = s.resample("MS").unwrap().sum().unwrap();
        assert_eq!(out.index().as_slice(), &[ts("2017-01-01"), ts("2017-02-01")]);
    }

    #[test]
    fn test_weekly_labels_sunday() {
        let s = daily("2015-07-01", &[1.0; 7]);
        let out = s.resample("W").unwrap().sum().unwrap();
        assert_eq!(out.values(), &[Some(5.0), Some(2.0)]);
        assert_eq!(out.index().as_slice(), &[ts("2015-07-05"), ts("2015-07-12")]);
    }

    #[test]
    fn test_unsorted_source_is_sorted_first() {
        let s = TimeSeries::from_points([
            ("2017-01-02", Some(2.0)),
            ("2017-01-01", Some(1.0)),
            ("2017-01-02 06:00", Some(4.0)),
        ])
        .unwrap();
        let out = s.resample("D").unwrap().last().unwrap();
        assert_eq!(out.values(), &[Some(1.0), Some(4.0)]);
        assert!(out.index().is_sorted());
    }

    #[test]
    fn test_downsampling_reductions() {
        let index = TimeIndex::range_str(ts("2017-01-01"), RangeEnd::Periods(4), "6h").unwrap();
        let s = TimeSeries::from_values(index, vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        let r = s.resample("D").unwrap();
        assert_eq!(r.mean().unwrap().values(), &[Some(2.5)]);
        assert_eq!(r.min().unwrap().values(), &[Some(1.0)]);
        assert_eq!(r.max().unwrap().values(), &[Some(4.0)]);
        assert_eq!(r.first().unwrap().values(), &[Some(4.0)]);
        assert_eq!(r.median().unwrap().values(), &[Some(2.5)]);
        assert!(r.std().unwrap().values()[0].is_some());
        assert_eq!(
            r.apply(ResampleMethod::Reduce(Reduction::Count)).unwrap().values(),
            &[Some(4.0)]
        );
    }

    #[test]
    fn test_empty_source_fails() {
        let s = TimeSeries::new(TimeIndex::default(), Vec::new()).unwrap();
        assert_eq!(s.resample("D").unwrap().sum().unwrap_err(), TimeError::EmptySeries);
        assert!(matches!(s.resample("5m"), Err(TimeError::InvalidFrequency(_))));
    }

    #[test]
    fn test_name_is_kept() {
        let s = daily("2017-01-01", &[1.0, 2.0]).with_name("close");
        assert_eq!(s.resample("D").unwrap().sum().unwrap().name(), Some("close"));
    }

    #[test]
    fn test_resample_out_of_tick_range_is_an_error() {
        let s = TimeSeries::from_points([("1969-06-01", Some(1.0)), ("1969-06-02", Some(2.0))])
            .unwrap();
        assert!(matches!(
            s.resample("20000W").unwrap().sum(),
            Err(TimeError::Overflow(_))
        ));

        let index = TimeIndex::new(vec![Timestamp::from_ticks(i64::MIN)]);
        let s = TimeSeries::from_values(index, vec![1.0]).unwrap();
        assert!(matches!(
            s.resample("D").unwrap().sum(),
            Err(TimeError::Overflow(_))
        ));
    }

    #[test]
    fn test_fills_without_a_neighbour_stay_missing() {
        let index = TimeIndex::range_str(ts("2017-01-01"), RangeEnd::Periods(4), "D").unwrap();
        let s = TimeSeries::new(index, vec![None, Some(10.0), Some(20.0), None]).unwrap();
        let r = s.resample("12h").unwrap();
        assert_eq!(
            r.interpolate().unwrap().values(),
            &[None, None, Some(10.0), Some(15.0), Some(20.0), None, None]
        );
        assert_eq!(
            r.forward_fill().unwrap().values(),
            &[None, None, Some(10.0), Some(10.0), Some(20.0), Some(20.0), Some(20.0)]
        );
        assert_eq!(
            r.backward_fill().unwrap().values(),
            &[Some(10.0), Some(10.0), Some(10.0), Some(20.0), Some(20.0), None, None]
        );
    }
}
