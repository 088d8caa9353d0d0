//! Error types for time-series operations.
//!
//! This module defines [`TimeError`] which covers every recoverable failure of
//! parsing, lookup, construction and resampling. All variants are local
//! conditions reported to the caller; nothing is retried or swallowed.

use thiserror::Error;

/// Errors that can occur while building or querying time-indexed data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Malformed timestamp, duration or partial-date text.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An exact or partial lookup matched nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A positional lookup fell outside the index.
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The requested position (negative offsets count from the end).
        index: i64,
        /// Length of the index that was queried.
        len: usize,
    },

    /// Unrecognized frequency token.
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    /// The operation needs at least one entry.
    #[error("Series is empty")]
    EmptySeries,

    /// Index and values (or two operands) disagree on length.
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length required by the receiving index.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Partial lookups are undefined on an index that is not sorted.
    #[error("Index is not sorted; sort it before partial lookup")]
    UnsortedIndex,

    /// The requested column does not exist in a frame.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Tick arithmetic left the representable range.
    #[error("Overflow: {0}")]
    Overflow(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias using [`TimeError`].
pub type Result<T> = std::result::Result<T, TimeError>;
