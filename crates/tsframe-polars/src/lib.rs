#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tsframe/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Polars interoperability for tsframe.
//!
//! - [`series_from_polars`] and [`frame_from_polars`] read DataFrame columns
//! - [`series_to_polars`] and [`frame_to_polars`] render them back
//! - [`read_csv`] loads a delimited file described by a [`CsvSourceConfig`]

/// Source configuration.
pub mod config;
/// DataFrame conversion.
pub mod convert;
/// CSV loading.
pub mod csv;
/// Error types for the bridge.
pub mod error;

// Re-export commonly used items at crate root
pub use config::CsvSourceConfig;
pub use convert::{
    frame_from_polars, frame_to_polars, index_from_column, series_from_polars, series_to_polars,
    values_from_column,
};
pub use csv::read_csv;
pub use error::{BridgeError, Result};
