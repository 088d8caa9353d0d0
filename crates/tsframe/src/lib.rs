#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tsframe/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Calendar-aware time-indexed series.
//!
//! This crate re-exports the core types and, behind a feature, the polars
//! bridge.
//!
//! # Features
//!
//! - `polars` (default) - DataFrame conversion and CSV loading
//!
//! # Example
//!
//! ```rust
//! use tsframe::{RangeEnd, Selector, TimeIndex, TimeSeries};
//!
//! let index = TimeIndex::range_str("2016-12-29".parse()?, RangeEnd::Periods(10), "D")?;
//! let series = TimeSeries::from_values(index, (0..10).map(f64::from).collect())?;
//!
//! let weekly = series.resample("7D")?.sum()?;
//! assert_eq!(weekly.len(), 2);
//!
//! let january = series.slice(&Selector::Partial("2017-01".parse()?))?;
//! assert_eq!(january.values().first(), Some(&Some(3.0)));
//! # Ok::<(), tsframe::TimeError>(())
//! ```

// Core types
pub use tsframe_core::*;

// Polars bridge
#[cfg(feature = "polars")]
pub use tsframe_polars::{
    BridgeError, CsvSourceConfig, frame_from_polars, frame_to_polars, index_from_column,
    read_csv, series_from_polars, series_to_polars, values_from_column,
};
