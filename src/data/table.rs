//! Observation Table Module
//! The cleaned, date-sorted COT dataset shared read-only by every chart.

use chrono::NaiveDate;

/// One weekly COT observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    /// Stochastic index expressed as a percentage (source value × 100).
    pub oscillator_pct: f64,
    pub commercial_long: f64,
    pub commercial_short: f64,
}

/// Immutable table of observations, sorted non-decreasing by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    rows: Vec<Observation>,
    dropped_rows: usize,
}

impl ObservationTable {
    /// Rows must already be clean and date-sorted; `DataProcessor` is the only producer.
    pub(crate) fn new(rows: Vec<Observation>, dropped_rows: usize) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
        Self { rows, dropped_rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Source rows removed for a missing date or value.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn oscillator_pct(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.oscillator_pct).collect()
    }

    pub fn commercial_long(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.commercial_long).collect()
    }

    pub fn commercial_short(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.commercial_short).collect()
    }
}
