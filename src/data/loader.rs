//! Spreadsheet Loader Module
//! Opens the COT source file and extracts the date column plus the three
//! positional value columns into a Polars DataFrame.

use super::cell::{coerce_date, coerce_value, RawCell};
use super::{date_to_days, PrepareError, DATE_COL, LONG_COL, OSCILLATOR_COL, SHORT_COL};
use crate::config::SourceLayout;
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDate;
use log::{debug, info};
use polars::prelude::*;
use std::path::Path;

/// A loaded table that can hand out header names and whole columns of cells.
trait TabularSource {
    fn headers(&self) -> Vec<String>;
    fn cells(&self, index: usize) -> Result<Vec<RawCell>, PrepareError>;
}

/// First worksheet of a workbook; row 1 holds the headers.
struct WorkbookSheet {
    range: Range<Data>,
    /// Leading empty columns that calamine trims from the used range.
    col_offset: usize,
}

impl WorkbookSheet {
    fn new(range: Range<Data>) -> Self {
        let col_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
        Self { range, col_offset }
    }
}

impl TabularSource for WorkbookSheet {
    fn headers(&self) -> Vec<String> {
        let Some(first) = self.range.rows().next() else {
            return Vec::new();
        };

        std::iter::repeat(String::new())
            .take(self.col_offset)
            .chain(first.iter().map(|cell| cell.to_string().trim().to_string()))
            .collect()
    }

    fn cells(&self, index: usize) -> Result<Vec<RawCell>, PrepareError> {
        Ok(self
            .range
            .rows()
            .skip(1)
            .map(|row| {
                index
                    .checked_sub(self.col_offset)
                    .and_then(|i| row.get(i))
                    .map(RawCell::from)
                    .unwrap_or(RawCell::Empty)
            })
            .collect())
    }
}

/// CSV read by Polars with every column kept as text.
struct CsvTable(DataFrame);

impl TabularSource for CsvTable {
    fn headers(&self) -> Vec<String> {
        self.0
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn cells(&self, index: usize) -> Result<Vec<RawCell>, PrepareError> {
        let column = self.0.get_columns()[index].cast(&DataType::String)?;
        let text = column.as_materialized_series().str()?;
        Ok(text.into_iter().map(RawCell::from).collect())
    }
}

/// Positions of the tracked columns in the source header row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnSelection {
    date: usize,
    values: [usize; 3],
}

/// Handles source file loading and column extraction.
pub struct DataLoader {
    layout: SourceLayout,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(SourceLayout::default())
    }
}

impl DataLoader {
    pub fn new(layout: SourceLayout) -> Self {
        Self { layout }
    }

    /// Load `path` into a frame with columns [Date, oscillator, commercial_long, commercial_short].
    ///
    /// Unparseable cells are null; no rows are dropped here.
    pub fn load(&self, path: &Path) -> Result<DataFrame, PrepareError> {
        if !path.is_file() {
            return Err(PrepareError::load(path, "file not found"));
        }

        let source: Box<dyn TabularSource> = if Self::is_csv(path) {
            Box::new(Self::read_csv(path)?)
        } else {
            Box::new(Self::read_workbook(path)?)
        };

        let headers = source.headers();
        let selection = self.select_columns(&headers)?;
        debug!(
            "Selected columns: date={:?}, values={:?}",
            headers[selection.date],
            selection.values.map(|i| headers[i].as_str())
        );

        let dates = source
            .cells(selection.date)?
            .iter()
            .map(coerce_date)
            .collect::<Vec<_>>();
        let [oscillator, long, short] = selection.values;
        let frame = observation_frame(
            dates,
            Self::value_column(source.as_ref(), oscillator)?,
            Self::value_column(source.as_ref(), long)?,
            Self::value_column(source.as_ref(), short)?,
        )?;

        info!(
            "Loaded {} rows, {} columns from {}",
            frame.height(),
            headers.len(),
            path.display()
        );
        Ok(frame)
    }

    fn is_csv(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }

    fn read_workbook(path: &Path) -> Result<WorkbookSheet, PrepareError> {
        let mut workbook = open_workbook_auto(path).map_err(|e| PrepareError::load(path, e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| PrepareError::load(path, "workbook has no worksheets"))?
            .map_err(|e| PrepareError::load(path, e))?;
        Ok(WorkbookSheet::new(range))
    }

    fn read_csv(path: &Path) -> Result<CsvTable, PrepareError> {
        let path_str = path.to_string_lossy().to_string();

        // Schema length 0 keeps every column as text; coercion happens per cell.
        let df = LazyCsvReader::new(path_str.as_str())
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| PrepareError::load(path, e))?;
        Ok(CsvTable(df))
    }

    fn value_column(
        source: &dyn TabularSource,
        index: usize,
    ) -> Result<Vec<Option<f64>>, PrepareError> {
        Ok(source.cells(index)?.iter().map(coerce_value).collect())
    }

    /// Resolve the date column by name and the value columns by position.
    fn select_columns(&self, headers: &[String]) -> Result<ColumnSelection, PrepareError> {
        let layout = &self.layout;

        if headers.len() < layout.min_columns() {
            return Err(PrepareError::Schema(format!(
                "expected at least {} columns, found {}",
                layout.min_columns(),
                headers.len()
            )));
        }

        let date = headers
            .iter()
            .position(|h| h == &layout.date_column)
            .ok_or_else(|| {
                PrepareError::Schema(format!("missing `{}` column", layout.date_column))
            })?;

        if let Some(expected) = &layout.expected_headers {
            for (&pos, want) in layout.value_positions.iter().zip(expected) {
                if &headers[pos] != want {
                    return Err(PrepareError::Schema(format!(
                        "column {pos} is `{}`, expected `{want}`",
                        headers[pos]
                    )));
                }
            }
        }

        Ok(ColumnSelection {
            date,
            values: layout.value_positions,
        })
    }
}

/// Build the four-column extraction frame from coerced cells.
pub(crate) fn observation_frame(
    dates: Vec<Option<NaiveDate>>,
    oscillator: Vec<Option<f64>>,
    long: Vec<Option<f64>>,
    short: Vec<Option<f64>>,
) -> Result<DataFrame, PrepareError> {
    let days: Vec<Option<i32>> = dates.iter().map(|d| d.map(date_to_days)).collect();

    let df = DataFrame::new(vec![
        Column::new(DATE_COL.into(), days).cast(&DataType::Date)?,
        Column::new(OSCILLATOR_COL.into(), oscillator),
        Column::new(LONG_COL.into(), long),
        Column::new(SHORT_COL.into(), short),
    ])?;
    Ok(df)
}
