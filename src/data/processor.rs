//! Data Processor Module
//! Cleans the extracted frame: drop incomplete rows, stable date sort,
//! percentage scaling of the oscillator.

use super::table::{Observation, ObservationTable};
use super::{
    days_to_date, PrepareError, DATE_COL, LONG_COL, OSCILLATOR_COL, OSCILLATOR_SCALE, SHORT_COL,
};
use log::{info, warn};
use polars::prelude::*;

/// Handles COT cleaning and conversion into an `ObservationTable`.
pub struct DataProcessor;

impl DataProcessor {
    /// Clean `df` and convert it into the immutable observation table.
    pub fn prepare(df: DataFrame) -> Result<ObservationTable, PrepareError> {
        let loaded = df.height();
        let cleaned = Self::clean(df)?;
        let table = Self::to_table(&cleaned, loaded - cleaned.height())?;

        if table.dropped_rows() > 0 {
            warn!(
                "Dropped {} of {loaded} rows with a missing date or value",
                table.dropped_rows()
            );
        }
        match (table.rows().first(), table.rows().last()) {
            (Some(first), Some(last)) => info!(
                "Prepared {} observations from {} to {}",
                table.len(),
                first.date,
                last.date
            ),
            _ => warn!("No complete rows left after cleaning"),
        }
        Ok(table)
    }

    /// Remove incomplete rows, sort ascending by date (ties keep input order),
    /// then scale the oscillator by 100. Scaling runs last and exactly once.
    pub fn clean(df: DataFrame) -> Result<DataFrame, PrepareError> {
        let complete = col(DATE_COL)
            .is_not_null()
            .and(col(OSCILLATOR_COL).is_not_null())
            .and(col(LONG_COL).is_not_null())
            .and(col(SHORT_COL).is_not_null());

        let cleaned = df
            .lazy()
            .filter(complete)
            .sort(
                [DATE_COL],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .with_column(col(OSCILLATOR_COL) * lit(OSCILLATOR_SCALE))
            .collect()?;
        Ok(cleaned)
    }

    fn to_table(df: &DataFrame, dropped: usize) -> Result<ObservationTable, PrepareError> {
        let dates = df.column(DATE_COL)?.cast(&DataType::Int32)?;
        let dates = dates.i32()?;
        let oscillator = df.column(OSCILLATOR_COL)?.cast(&DataType::Float64)?;
        let oscillator = oscillator.f64()?;
        let long = df.column(LONG_COL)?.cast(&DataType::Float64)?;
        let long = long.f64()?;
        let short = df.column(SHORT_COL)?.cast(&DataType::Float64)?;
        let short = short.f64()?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let (Some(days), Some(oscillator_pct), Some(commercial_long), Some(commercial_short)) =
                (dates.get(i), oscillator.get(i), long.get(i), short.get(i))
            else {
                return Err(PrepareError::Schema(format!("row {i} is incomplete after cleaning")));
            };
            let date = days_to_date(days)
                .ok_or_else(|| PrepareError::Schema(format!("row {i} has an out-of-range date")))?;

            rows.push(Observation {
                date,
                oscillator_pct,
                commercial_long,
                commercial_short,
            });
        }

        Ok(ObservationTable::new(rows, dropped))
    }
}
