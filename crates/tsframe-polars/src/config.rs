//! Source configuration for CSV loading.

use serde::{Deserialize, Serialize};
use tsframe_core::TimeUnit;

use crate::error::{BridgeError, Result};

/// How to map a delimited file onto a [`tsframe_core::TimeFrame`].
///
/// ```
/// use tsframe_polars::CsvSourceConfig;
///
/// let config = CsvSourceConfig::from_json(r#"{"time_column": "date", "separator": ";"}"#)?;
/// assert_eq!(config.time_column, "date");
/// assert!(config.has_header);
/// # Ok::<(), tsframe_polars::BridgeError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSourceConfig {
    /// Column holding the timestamps.
    pub time_column: String,
    /// Value columns to load; empty loads every numeric column.
    pub value_columns: Vec<String>,
    /// Field separator, a single ASCII character.
    pub separator: char,
    /// Whether the first line names the columns.
    pub has_header: bool,
    /// Unit of integer epoch time columns.
    pub epoch_unit: TimeUnit,
}

impl Default for CsvSourceConfig {
    fn default() -> Self {
        Self {
            time_column: "timestamp".to_string(),
            value_columns: Vec::new(),
            separator: ',',
            has_header: true,
            epoch_unit: TimeUnit::default(),
        }
    }
}

impl CsvSourceConfig {
    /// Creates a configuration reading timestamps from `time_column`.
    #[must_use]
    pub fn new(time_column: impl Into<String>) -> Self {
        Self {
            time_column: time_column.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON; absent fields take their defaults.
    ///
    /// # Errors
    /// Returns [`BridgeError::Config`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Sets the value columns to load.
    #[must_use]
    pub fn with_value_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the field separator.
    #[must_use]
    pub const fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Sets whether the file has a header line.
    #[must_use]
    pub const fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Sets the unit of integer epoch time columns.
    #[must_use]
    pub const fn with_epoch_unit(mut self, epoch_unit: TimeUnit) -> Self {
        self.epoch_unit = epoch_unit;
        self
    }

    /// The separator as a byte.
    ///
    /// # Errors
    /// Returns [`BridgeError::Config`] if the separator is not ASCII.
    pub fn separator_byte(&self) -> Result<u8> {
        u8::try_from(self.separator)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                BridgeError::Config(format!("separator {:?} is not ASCII", self.separator))
            })
    }
}
