//! Conversion between polars DataFrames and tsframe series.
//!
//! Time columns may be polars `Datetime` (any unit), `Date`, strings in the
//! calendar text format, or integer epoch counts in a caller-given unit.
//! Value columns may be any float or 32/64-bit integer dtype and are read as
//! `f64`, with nulls becoming missing values.

use polars::prelude::{Column, DataFrame, DataType, TimeUnit as PolarsTimeUnit};
use tracing::{debug, instrument};
use tsframe_core::duration::NANOS_PER_DAY;
use tsframe_core::{TimeError, TimeFrame, TimeIndex, TimeSeries, TimeUnit, Timestamp};

use crate::error::{BridgeError, Result};

const DEFAULT_TIME_COLUMN: &str = "timestamp";
const DEFAULT_VALUE_COLUMN: &str = "value";

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| BridgeError::MissingColumn(name.to_string()))
}

fn unsupported(column: &Column) -> BridgeError {
    BridgeError::UnsupportedDtype {
        column: column.name().to_string(),
        dtype: column.dtype().to_string(),
    }
}

fn null_time(column: &Column, row: usize) -> BridgeError {
    BridgeError::Time(TimeError::Parse(format!(
        "null timestamp at row {row} of column {}",
        column.name()
    )))
}

const fn unit_of(unit: PolarsTimeUnit) -> TimeUnit {
    match unit {
        PolarsTimeUnit::Nanoseconds => TimeUnit::Nanoseconds,
        PolarsTimeUnit::Microseconds => TimeUnit::Microseconds,
        PolarsTimeUnit::Milliseconds => TimeUnit::Milliseconds,
    }
}

/// Reads a time column into a [`TimeIndex`] named after the column.
///
/// # Errors
/// Returns [`BridgeError::UnsupportedDtype`] for a column that holds no
/// time-like values, and a [`TimeError`] for nulls or unparseable text.
pub fn index_from_column(column: &Column, epoch_unit: TimeUnit) -> Result<TimeIndex> {
    let epoch_counts = |unit: TimeUnit| -> Result<Vec<Timestamp>> {
        let physical = column.cast(&DataType::Int64)?;
        let stamps = physical
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                let v = v.ok_or_else(|| null_time(column, row))?;
                Ok(Timestamp::from_epoch(v, unit)?)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(stamps)
    };

    let stamps = match column.dtype() {
        DataType::Datetime(unit, _) => epoch_counts(unit_of(*unit))?,
        DataType::Date => {
            let physical = column.cast(&DataType::Int32)?;
            let counts = physical.i32()?;
            counts
                .into_iter()
                .enumerate()
                .map(|(row, days)| {
                    let days = days.ok_or_else(|| null_time(column, row))?;
                    i64::from(days)
                        .checked_mul(NANOS_PER_DAY)
                        .map(Timestamp::from_ticks)
                        .ok_or_else(|| {
                            BridgeError::from(TimeError::Overflow(format!(
                                "{days} days since epoch"
                            )))
                        })
                })
                .collect::<Result<Vec<_>>>()?
        }
        DataType::String => column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, text)| {
                let text = text.ok_or_else(|| null_time(column, row))?;
                Ok(text.parse::<Timestamp>()?)
            })
            .collect::<Result<Vec<_>>>()?,
        DataType::Int64 | DataType::Int32 | DataType::UInt32 | DataType::UInt64 => {
            epoch_counts(epoch_unit)?
        }
        _ => return Err(unsupported(column)),
    };
    Ok(TimeIndex::new(stamps).with_name(column.name().as_str()))
}

fn is_value_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
    )
}

/// Reads a numeric column as optional `f64` values.
///
/// # Errors
/// Returns [`BridgeError::UnsupportedDtype`] for a non-numeric column.
pub fn values_from_column(column: &Column) -> Result<Vec<Option<f64>>> {
    if !is_value_dtype(column.dtype()) {
        return Err(unsupported(column));
    }
    let floats = column.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Builds a named series from a time column and a value column.
///
/// # Errors
/// Returns [`BridgeError::MissingColumn`] if either column is absent, plus
/// the errors of [`index_from_column`] and [`values_from_column`].
#[instrument(skip(df), fields(rows = df.height()))]
pub fn series_from_polars(
    df: &DataFrame,
    time_column: &str,
    value_column: &str,
    epoch_unit: TimeUnit,
) -> Result<TimeSeries> {
    let index = index_from_column(column(df, time_column)?, epoch_unit)?;
    let values = values_from_column(column(df, value_column)?)?;
    Ok(TimeSeries::new(index, values)?.with_name(value_column))
}

/// Builds a frame from a time column and value columns.
///
/// An empty `value_columns` selects every numeric column other than the time
/// column, in DataFrame order.
///
/// # Errors
/// Returns [`BridgeError::MissingColumn`] for an absent column, plus the
/// errors of [`index_from_column`] and [`values_from_column`].
#[instrument(skip(df, value_columns), fields(rows = df.height(), width = value_columns.len()))]
pub fn frame_from_polars(
    df: &DataFrame,
    time_column: &str,
    value_columns: &[String],
    epoch_unit: TimeUnit,
) -> Result<TimeFrame> {
    let index = index_from_column(column(df, time_column)?, epoch_unit)?;
    let selected: Vec<&Column> = if value_columns.is_empty() {
        df.get_columns()
            .iter()
            .filter(|c| c.name().as_str() != time_column && is_value_dtype(c.dtype()))
            .collect()
    } else {
        value_columns
            .iter()
            .map(|name| column(df, name))
            .collect::<Result<_>>()?
    };
    let columns = selected
        .into_iter()
        .map(|c| Ok((c.name().to_string(), values_from_column(c)?)))
        .collect::<Result<Vec<_>>>()?;
    debug!(columns = columns.len(), "Converted DataFrame to frame");
    Ok(TimeFrame::new(index, columns)?)
}

fn time_column_of(index: &TimeIndex) -> Result<Column> {
    let ticks: Vec<i64> = index.iter().map(|t| t.ticks()).collect();
    let name = index.name().unwrap_or(DEFAULT_TIME_COLUMN);
    Ok(Column::new(name.into(), ticks)
        .cast(&DataType::Datetime(PolarsTimeUnit::Nanoseconds, None))?)
}

/// Renders a series as a two-column DataFrame: a nanosecond `Datetime`
/// column named after the index (default `timestamp`) and a `Float64` column
/// named after the series (default `value`).
///
/// # Errors
/// Returns [`BridgeError::Polars`] if the DataFrame cannot be assembled.
pub fn series_to_polars(series: &TimeSeries) -> Result<DataFrame> {
    let time = time_column_of(series.index())?;
    let name = series.name().unwrap_or(DEFAULT_VALUE_COLUMN);
    let values = Column::new(name.into(), series.values().to_vec());
    Ok(DataFrame::new(vec![time, values])?)
}

/// Renders a frame as a DataFrame with the time column first.
///
/// # Errors
/// Returns [`BridgeError::Polars`] if the DataFrame cannot be assembled.
#[instrument(skip(frame), fields(rows = frame.len(), width = frame.width()))]
pub fn frame_to_polars(frame: &TimeFrame) -> Result<DataFrame> {
    let mut columns = vec![time_column_of(frame.index())?];
    for series in frame.iter_columns() {
        let name = series.name().unwrap_or(DEFAULT_VALUE_COLUMN);
        columns.push(Column::new(name.into(), series.values().to_vec()));
    }
    Ok(DataFrame::new(columns)?)
}
