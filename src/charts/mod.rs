//! Charts module - Plotly time-series figures

mod figure;

pub use figure::{build_chart, ChartSpec, Figure, TickFormat};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("Cannot chart an empty series")]
    EmptySeries,
    #[error("Series length mismatch: {dates} dates vs {values} values")]
    LengthMismatch { dates: usize, values: usize },
}
