//! Delimited file loading.

use std::path::Path;

use polars::prelude::{CsvParseOptions, CsvReadOptions, SerReader};
use tracing::{debug, instrument};
use tsframe_core::TimeFrame;

use crate::config::CsvSourceConfig;
use crate::convert::frame_from_polars;
use crate::error::Result;

/// Reads a delimited file into a frame.
///
/// Columns are typed by polars inference, so time columns arrive as text and
/// are parsed with the calendar text format, or as integers read in
/// `config.epoch_unit`. Empty fields in value columns become missing values.
///
/// # Errors
/// Returns [`crate::BridgeError::Config`] for a non-ASCII separator,
/// [`crate::BridgeError::Polars`] if the file cannot be read, plus the
/// conversion errors of [`frame_from_polars`].
#[instrument(skip(config), fields(path = %path.as_ref().display(), time_column = %config.time_column))]
pub fn read_csv(path: impl AsRef<Path>, config: &CsvSourceConfig) -> Result<TimeFrame> {
    let separator = config.separator_byte()?;
    let df = CsvReadOptions::default()
        .with_has_header(config.has_header)
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    debug!(rows = df.height(), columns = df.width(), "Read CSV");

    frame_from_polars(
        &df,
        &config.time_column,
        &config.value_columns,
        config.epoch_unit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tsframe_core::{Reduction, Selector, TimeUnit, Timestamp};

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_read_csv_all_numeric_columns() {
        let file = write_csv(&[
            "date,open,close,ticker",
            "2016-12-30,1.0,1.5,X",
            "2017-01-02,2.0,,X",
            "2017-01-03,3.0,3.5,X",
        ]);
        let frame = read_csv(file.path(), &CsvSourceConfig::new("date")).unwrap();

        assert_eq!(frame.len(), 3);
        assert_eq!(frame.column_names(), ["open", "close"]);
        let close = frame.column("close").unwrap();
        assert_eq!(close.values(), &[Some(1.5), None, Some(3.5)]);

        let year = close.slice(&Selector::Partial("2017".parse().unwrap())).unwrap();
        assert_eq!(year.len(), 2);
        let counts = year.resample("Y").unwrap().aggregate(Reduction::Count).unwrap();
        assert_eq!(counts.values(), &[Some(1.0)]);
    }

    #[test]
    fn test_read_csv_selected_columns_and_separator() {
        let file = write_csv(&["t;a;b", "0;1;10", "60;2;20"]);
        let config = CsvSourceConfig::new("t")
            .with_separator(';')
            .with_value_columns(["b"])
            .with_epoch_unit(TimeUnit::Seconds);
        let frame = read_csv(file.path(), &config).unwrap();

        assert_eq!(frame.column_names(), ["b"]);
        assert_eq!(
            frame.index().last(),
            Some("1970-01-01 00:01".parse::<Timestamp>().unwrap())
        );
    }

    #[test]
    fn test_read_csv_errors() {
        let file = write_csv(&["date,x", "2017-01-01,1"]);
        let config = CsvSourceConfig::new("when");
        assert!(matches!(
            read_csv(file.path(), &config),
            Err(BridgeError::MissingColumn(name)) if name == "when"
        ));

        let config = CsvSourceConfig::new("date").with_separator('é');
        assert!(matches!(
            read_csv(file.path(), &config),
            Err(BridgeError::Config(_))
        ));

        let config = CsvSourceConfig::new("date");
        assert!(read_csv("/nonexistent/prices.csv", &config).is_err());
    }
}
