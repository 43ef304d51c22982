//! Data module - spreadsheet loading and COT preparation

mod cell;
mod loader;
mod processor;
mod table;

pub use loader::DataLoader;
pub use processor::DataProcessor;
pub use table::ObservationTable;

#[cfg(test)]
pub(crate) use loader::observation_frame;

use crate::config::SourceLayout;
use chrono::{Datelike, NaiveDate};
use polars::prelude::PolarsError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Internal column names of the extracted frame.
pub const DATE_COL: &str = "Date";
pub const OSCILLATOR_COL: &str = "oscillator";
pub const LONG_COL: &str = "commercial_long";
pub const SHORT_COL: &str = "commercial_short";

/// Multiplier turning the stochastic index into a percentage.
pub const OSCILLATOR_SCALE: f64 = 100.0;

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("Failed to load {}: {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl PrepareError {
    pub(crate) fn load(path: &Path, reason: impl ToString) -> Self {
        PrepareError::DataLoad {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Day number of 1970-01-01 counted from 0001-01-01 (Polars `Date` is days since the Unix epoch).
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Load, clean, sort and scale the source file into an `ObservationTable`.
pub fn prepare(source: &Path, layout: &SourceLayout) -> Result<ObservationTable, PrepareError> {
    let frame = DataLoader::new(layout.clone()).load(source)?;
    DataProcessor::prepare(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polars_day_numbers_count_from_unix_epoch() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        assert_eq!(date_to_days(epoch), 0);
        assert_eq!(days_to_date(date_to_days(d)), Some(d));
        assert_eq!(days_to_date(i32::MAX), None);
    }
}
