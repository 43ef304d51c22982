//! Configuration Module
//! Source file layout and dashboard defaults.

use std::path::PathBuf;

/// Spreadsheet read when no `--source` is given.
pub const DEFAULT_SOURCE: &str = "gold_cot_data.xlsx";
/// HTML file written by the `render` command.
pub const DEFAULT_OUTPUT: &str = "cot_dashboard.html";
/// Port used by the `serve` command.
pub const DEFAULT_PORT: u16 = 8050;

/// Header of the date column.
pub const DATE_COLUMN: &str = "Date";
/// Zero-based positions of the oscillator, commercial long and commercial short columns.
pub const VALUE_POSITIONS: [usize; 3] = [16, 17, 18];

/// Where the tracked columns live in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub date_column: String,
    pub value_positions: [usize; 3],
    /// Header names that must sit at `value_positions`, checked when present.
    pub expected_headers: Option<[String; 3]>,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            date_column: DATE_COLUMN.to_string(),
            value_positions: VALUE_POSITIONS,
            expected_headers: None,
        }
    }
}

impl SourceLayout {
    /// Minimum number of columns the source must have.
    pub fn min_columns(&self) -> usize {
        self.value_positions.iter().copied().max().unwrap_or(0) + 1
    }

    pub fn with_expected_headers(mut self, headers: [String; 3]) -> Self {
        self.expected_headers = Some(headers);
        self
    }
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub source: PathBuf,
    pub layout: SourceLayout,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            layout: SourceLayout::default(),
        }
    }
}
