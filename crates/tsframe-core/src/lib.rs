#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tsframe/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for time-indexed data.
//!
//! This crate provides the building blocks for working with time series:
//!
//! - [`Timestamp`](timestamp::Timestamp) and [`Duration`](duration::Duration) - Nanosecond-tick time values
//! - [`Frequency`](frequency::Frequency) - Range and resampling frequencies
//! - [`TimeIndex`](index::TimeIndex) - Ordered time axes with exact, partial and positional lookup
//! - [`TimeSeries`](series::TimeSeries) - Values aligned to an index
//! - [`Resampler`](resample::Resampler) - Downsampling and upsampling
//! - [`TimeFrame`](frame::TimeFrame) - Named columns over one index

/// Durations and tick constants.
pub mod duration;
/// Error types for time-series operations.
pub mod error;
/// Named columns over a shared index.
pub mod frame;
/// Frequency tokens and bucket alignment.
pub mod frequency;
/// Time axes and lookups.
pub mod index;
/// Calendar-partial timestamp specifications.
pub mod partial;
/// Reductions and missing-value policies.
pub mod reduce;
/// Frequency conversion.
pub mod resample;
/// Value series and selectors.
pub mod series;
/// Points in time.
pub mod timestamp;
/// Rolling windows and calendar grouping.
pub mod window;

// Re-export commonly used items at crate root
pub use duration::{Duration, DurationComponents, DurationParts};
pub use error::{Result, TimeError};
pub use frame::{Record, TimeFrame};
pub use frequency::{Frequency, FrequencyUnit};
pub use index::{RangeEnd, TimeIndex};
pub use partial::{PartialSpec, Resolution};
pub use reduce::{MissingPolicy, Reduction};
pub use resample::{
    BucketClosed, BucketLabel, EmptyBuckets, ResampleMethod, ResampleOptions, ResampleOrigin,
    Resampler,
};
pub use series::{CmpOp, Point, Selector, TimeSeries};
pub use timestamp::{IntoTimestamp, TimeUnit, Timestamp};
pub use window::{CalendarField, GroupBy, Rolling};
