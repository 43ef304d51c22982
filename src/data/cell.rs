//! Cell Coercion Module
//! Turns raw spreadsheet/CSV cells into dates and numbers, or "missing".

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

/// Text layouts accepted for the date column.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y", "%b %d, %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

/// Largest Excel serial date (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// A single source cell, independent of the file format it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
}

impl From<&calamine::Data> for RawCell {
    fn from(cell: &calamine::Data) -> Self {
        use calamine::Data;

        match cell {
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Float(f) => RawCell::Number(*f),
            Data::Bool(b) => RawCell::Bool(*b),
            Data::String(s) | Data::DateTimeIso(s) => RawCell::Text(s.clone()),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(RawCell::DateTime)
                .unwrap_or(RawCell::Empty),
            Data::DurationIso(_) | Data::Error(_) | Data::Empty => RawCell::Empty,
        }
    }
}

impl From<Option<&str>> for RawCell {
    fn from(cell: Option<&str>) -> Self {
        match cell {
            Some(s) if !s.trim().is_empty() => RawCell::Text(s.to_string()),
            _ => RawCell::Empty,
        }
    }
}

/// Coerce a cell of the date column. Unparseable cells become `None`.
pub fn coerce_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::DateTime(dt) => Some(dt.date()),
        // Numbers are Excel serial days, not epoch nanoseconds as pandas would read them.
        RawCell::Number(serial) => excel_serial_to_date(*serial),
        RawCell::Text(text) => parse_date_text(text),
        RawCell::Empty | RawCell::Bool(_) => None,
    }
}

/// Coerce a cell of a value column. Non-numeric cells and NaN become `None`.
pub fn coerce_value(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Number(v) => *v,
        RawCell::Bool(b) => f64::from(u8::from(*b)),
        RawCell::Text(text) => text.trim().replace(',', "").parse::<f64>().ok()?,
        RawCell::Empty | RawCell::DateTime(_) => return None,
    };

    (!value.is_nan()).then_some(value)
}

/// Excel counts days from 1899-12-30 (which absorbs the 1900 leap-year bug).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}
