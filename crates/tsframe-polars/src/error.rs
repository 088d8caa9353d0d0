//! Error types for the polars bridge.
//!
//! This module defines [`BridgeError`] which wraps core time-series errors,
//! polars errors, and the schema problems found while mapping DataFrame
//! columns onto series.

use polars::prelude::PolarsError;
use thiserror::Error;
use tsframe_core::TimeError;

/// Errors that can occur while converting between DataFrames and series.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A time-series operation failed.
    #[error(transparent)]
    Time(#[from] TimeError),

    /// Polars error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// A required column is absent from the DataFrame.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A column's dtype cannot be mapped to timestamps or values.
    #[error("Unsupported dtype {dtype} for column {column}")]
    UnsupportedDtype {
        /// The offending column.
        column: String,
        /// Its polars dtype.
        dtype: String,
    },

    /// Invalid source configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;
