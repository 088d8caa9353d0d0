//! Named columns sharing one time axis.
//!
//! Column selection ([`TimeFrame::column`]) and row selection
//! ([`TimeFrame::rows`], [`TimeFrame::row_at`]) are separate accessors.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::error::{Result, TimeError};
use crate::frequency::Frequency;
use crate::index::TimeIndex;
use crate::resample::{ResampleMethod, ResampleOptions};
use crate::series::{Selector, TimeSeries};
use crate::timestamp::Timestamp;

/// Field holding the row timestamp in a [`Record`]; no column may take it.
const TIMESTAMP_FIELD: &str = "timestamp";

/// One rendered row of a frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    /// Row timestamp, serialized as nanosecond ticks.
    pub timestamp: Timestamp,
    /// Value per column name.
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

/// A table of `f64` columns over a shared [`TimeIndex`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeFrame {
    index: TimeIndex,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl TimeFrame {
    /// Creates a frame from named columns.
    ///
    /// # Errors
    /// Returns [`TimeError::LengthMismatch`] if a column's length differs from
    /// the index, or [`TimeError::InvalidParameter`] on a duplicate name.
    pub fn new(index: TimeIndex, columns: Vec<(String, Vec<Option<f64>>)>) -> Result<Self> {
        let mut frame = Self {
            index,
            columns: Vec::with_capacity(columns.len()),
        };
        for (name, values) in columns {
            if frame.position(&name).is_some() {
                return Err(TimeError::InvalidParameter(format!("duplicate column {name}")));
            }
            frame.insert_column(name, values)?;
        }
        Ok(frame)
    }

    /// Creates a frame from series sharing one axis.
    ///
    /// Columns take the series names; unnamed series are named by position.
    ///
    /// # Errors
    /// Returns [`TimeError::LengthMismatch`] or
    /// [`TimeError::InvalidParameter`] if the axes differ.
    pub fn from_series(series: &[TimeSeries]) -> Result<Self> {
        let Some(first) = series.first() else {
            return Ok(Self::default());
        };
        let mut columns = Vec::with_capacity(series.len());
        for (i, s) in series.iter().enumerate() {
            if s.len() != first.len() {
                return Err(TimeError::LengthMismatch {
                    expected: first.len(),
                    actual: s.len(),
                });
            }
            if !s.index().same_axis(first.index()) {
                return Err(TimeError::InvalidParameter(format!(
                    "series {i} is not on the same time axis"
                )));
            }
            let name = s.name().map_or_else(|| i.to_string(), str::to_string);
            columns.push((name, s.values().to_vec()));
        }
        Self::new(first.index().clone(), columns)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }

    /// Adds a column, replacing any column of the same name in place.
    ///
    /// # Errors
    /// Returns [`TimeError::LengthMismatch`] if `values` does not match the
    /// index, or [`TimeError::InvalidParameter`] for the reserved name
    /// `timestamp`.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if name == TIMESTAMP_FIELD {
            return Err(TimeError::InvalidParameter(format!(
                "column name {name} is reserved for the row timestamp"
            )));
        }
        if values.len() != self.index.len() {
            return Err(TimeError::LengthMismatch {
                expected: self.index.len(),
                actual: values.len(),
            });
        }
        match self.position(&name) {
            Some(pos) => self.columns[pos].1 = values,
            None => self.columns.push((name, values)),
        }
        Ok(())
    }

    /// The shared time axis.
    #[must_use]
    pub const fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// One column as a named series.
    ///
    /// # Errors
    /// Returns [`TimeError::ColumnNotFound`] for an unknown name.
    pub fn column(&self, name: &str) -> Result<TimeSeries> {
        let pos = self
            .position(name)
            .ok_or_else(|| TimeError::ColumnNotFound(name.to_string()))?;
        let (name, values) = &self.columns[pos];
        Ok(self.series(name, values))
    }

    fn series(&self, name: &str, values: &[Option<f64>]) -> TimeSeries {
        TimeSeries::from_parts(self.index.clone(), values.to_vec(), Some(name.to_string()))
    }

    /// Every column as a named series, in insertion order.
    pub fn iter_columns(&self) -> impl Iterator<Item = TimeSeries> + '_ {
        self.columns
            .iter()
            .map(|(name, values)| self.series(name, values))
    }

    /// Rows chosen by `selector`, as a new frame.
    ///
    /// # Errors
    /// Returns the lookup error of the selector.
    pub fn rows(&self, selector: &Selector) -> Result<Self> {
        let range = selector.resolve(&self.index)?;
        Ok(Self {
            index: self.index.window(range.clone()),
            columns: self
                .columns
                .iter()
                .map(|(n, v)| (n.clone(), v[range.clone()].to_vec()))
                .collect(),
        })
    }

    /// Timestamp and column values at a position; negative offsets count
    /// from the end.
    ///
    /// # Errors
    /// Returns [`TimeError::IndexOutOfRange`] outside `-len..len`.
    pub fn row_at(&self, offset: isize) -> Result<(Timestamp, Vec<Option<f64>>)> {
        let pos = self.index.resolve_position(offset)?;
        Ok((
            self.index.as_slice()[pos],
            self.columns.iter().map(|(_, v)| v[pos]).collect(),
        ))
    }

    /// Stores the row-wise sum of `sources` as column `name`.
    ///
    /// A missing value in any source makes that row missing.
    ///
    /// # Errors
    /// Returns [`TimeError::ColumnNotFound`] for an unknown source.
    pub fn sum_columns(&mut self, name: impl Into<String>, sources: &[&str]) -> Result<()> {
        let mut total: Vec<Option<f64>> = vec![Some(0.0); self.len()];
        for source in sources {
            let pos = self
                .position(source)
                .ok_or_else(|| TimeError::ColumnNotFound((*source).to_string()))?;
            for (acc, v) in total.iter_mut().zip(&self.columns[pos].1) {
                *acc = acc.zip(*v).map(|(a, b)| a + b);
            }
        }
        self.insert_column(name, total)
    }

    /// Resamples every column with `method` at the frequency named by
    /// `frequency`, using default options.
    ///
    /// # Errors
    /// Returns [`TimeError::InvalidFrequency`] for a bad token and
    /// [`TimeError::EmptySeries`] for a frame without rows.
    pub fn resample(&self, frequency: &str, method: ResampleMethod) -> Result<Self> {
        self.resample_with(frequency.parse()?, ResampleOptions::default(), method)
    }

    /// Resamples every column with `method`.
    ///
    /// # Errors
    /// Returns [`TimeError::EmptySeries`] for a frame without rows.
    #[instrument(skip(self, options), fields(freq = %frequency, rows = self.len(), width = self.width()))]
    pub fn resample_with(
        &self,
        frequency: Frequency,
        options: ResampleOptions,
        method: ResampleMethod,
    ) -> Result<Self> {
        let mut index = None;
        let mut columns = Vec::with_capacity(self.columns.len());
        for series in self.iter_columns() {
            let out = series.resample_with(frequency, options).apply(method)?;
            columns.push((out.name().unwrap_or_default().to_string(), out.values().to_vec()));
            index.get_or_insert_with(|| out.index().clone());
        }
        let index = match index {
            Some(index) => index,
            None => {
                let blank = TimeSeries::new(self.index.clone(), vec![None; self.len()])?;
                blank.resample_with(frequency, options).asfreq()?.index().clone()
            }
        };
        debug!(buckets = index.len(), "Resampled frame");
        Self::new(index, columns)
    }

    /// Rows as serializable records.
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.index
            .iter()
            .enumerate()
            .map(|(row, timestamp)| Record {
                timestamp,
                values: self
                    .columns
                    .iter()
                    .map(|(name, v)| (name.clone(), v[row]))
                    .collect(),
            })
            .collect()
    }
}
