//! Chart Figure Module
//! Builds line-plus-marker time-series charts and serializes them as
//! Plotly figure documents.

use super::ChartError;
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Points shown before the user widens the range slider.
pub const DEFAULT_WINDOW_POINTS: usize = 31;

const LINE_COLOR: &str = "royalblue";
const MARKER_SIZE: u32 = 6;
const CHART_HEIGHT: u32 = 600;
const X_TICK_FORMAT: &str = "%b %d\n%Y";
const X_TICK_ANGLE: i32 = 45;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Y-axis tick precision, rendered as a d3 format such as `.1f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickFormat {
    pub decimals: u8,
}

impl TickFormat {
    pub const fn decimals(decimals: u8) -> Self {
        Self { decimals }
    }

    pub fn d3(&self) -> String {
        format!(".{}f", self.decimals)
    }
}

/// Initially visible x-range. The full series stays reachable via the range slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Index of `end` in the series.
    pub end_index: usize,
}

impl DateWindow {
    /// Window over the first `DEFAULT_WINDOW_POINTS` dates (or all of them).
    pub fn default_for(dates: &[NaiveDate]) -> Option<Self> {
        let start = *dates.first()?;
        let end_index = (DEFAULT_WINDOW_POINTS - 1).min(dates.len() - 1);
        Some(Self {
            start,
            end: dates[end_index],
            end_index,
        })
    }

    /// Axis range to hand the renderer, always ascending. A single-day window
    /// is padded by a day on each side so the axis never has zero width.
    pub fn axis_range(&self) -> [NaiveDate; 2] {
        let (lo, hi) = (self.start.min(self.end), self.start.max(self.end));
        if lo != hi {
            return [lo, hi];
        }
        let before = lo.checked_sub_days(Days::new(1)).unwrap_or(lo);
        let after = hi.checked_add_days(Days::new(1)).unwrap_or(hi);
        [before, after]
    }
}

/// Everything needed to render one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    pub label: String,
    pub title: String,
    pub tick_format: TickFormat,
    /// Fixed y gridline spacing; `None` lets Plotly choose.
    pub tick_spacing: Option<f64>,
    pub window: DateWindow,
}

/// Build a chart from aligned date/value series.
pub fn build_chart(
    dates: &[NaiveDate],
    values: &[f64],
    label: &str,
    title: &str,
    tick_format: TickFormat,
    tick_spacing: Option<f64>,
) -> Result<ChartSpec, ChartError> {
    if dates.is_empty() || values.is_empty() {
        return Err(ChartError::EmptySeries);
    }
    if dates.len() != values.len() {
        return Err(ChartError::LengthMismatch {
            dates: dates.len(),
            values: values.len(),
        });
    }
    let window = DateWindow::default_for(dates).ok_or(ChartError::EmptySeries)?;

    Ok(ChartSpec {
        dates: dates.to_vec(),
        values: values.to_vec(),
        label: label.to_string(),
        title: title.to_string(),
        tick_format,
        tick_spacing,
        window,
    })
}

impl ChartSpec {
    /// Plotly `{data, layout}` document for this chart.
    pub fn to_figure(&self) -> Figure {
        let [range_start, range_end] = self.window.axis_range();

        Figure {
            data: vec![Trace {
                x: self.dates.iter().map(|d| d.format(DATE_FORMAT).to_string()).collect(),
                y: self.values.clone(),
                kind: "scatter",
                mode: "lines+markers",
                name: self.label.clone(),
                line: Line { color: LINE_COLOR },
                marker: Marker { size: MARKER_SIZE },
            }],
            layout: Layout {
                xaxis: XAxis {
                    title: Text::new("Date"),
                    kind: "date",
                    range: [
                        range_start.format(DATE_FORMAT).to_string(),
                        range_end.format(DATE_FORMAT).to_string(),
                    ],
                    rangeslider: RangeSlider { visible: true },
                    tickangle: X_TICK_ANGLE,
                    tickformat: X_TICK_FORMAT,
                    ticklabelmode: "period",
                },
                yaxis: YAxis {
                    title: Text::new(&self.label),
                    tickformat: self.tick_format.d3(),
                    dtick: self.tick_spacing,
                },
                title: Text::new(&self.title),
                hovermode: "x unified",
                height: CHART_HEIGHT,
                margin: Margin {
                    l: 40,
                    r: 40,
                    t: 60,
                    b: 100,
                },
            },
        }
    }
}

// Plotly figure document

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub line: Line,
    pub marker: Marker,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Text {
    pub text: String,
}

impl Text {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub xaxis: XAxis,
    pub yaxis: YAxis,
    pub title: Text,
    pub hovermode: &'static str,
    pub height: u32,
    pub margin: Margin,
}

#[derive(Debug, Clone, Serialize)]
pub struct XAxis {
    pub title: Text,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub range: [String; 2],
    pub rangeslider: RangeSlider,
    pub tickangle: i32,
    pub tickformat: &'static str,
    pub ticklabelmode: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct YAxis {
    pub title: Text,
    pub tickformat: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn weekly(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 7).unwrap();
        (0..n)
            .map(|i| start.checked_add_days(Days::new(7 * i as u64)).unwrap())
            .collect()
    }

    fn chart(n: usize) -> ChartSpec {
        let dates = weekly(n);
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        build_chart(
            &dates,
            &values,
            "Commercial Long",
            "Commercial Long Over Time",
            TickFormat::decimals(0),
            Some(25000.0),
        )
        .unwrap()
    }

    #[test]
    fn short_series_window_covers_everything() {
        let spec = chart(5);
        assert_eq!(spec.window.end_index, 4);
        assert_eq!(spec.window.start, spec.dates[0]);
        assert_eq!(spec.window.end, spec.dates[4]);
    }

    #[test]
    fn long_series_window_covers_first_31_points() {
        let spec = chart(100);
        assert_eq!(spec.window.end_index, 30);
        assert_eq!(spec.window.end, spec.dates[30]);
        assert_eq!(spec.dates.len(), 100);
    }

    #[test]
    fn single_point_window_is_padded() {
        let spec = chart(1);
        assert_eq!(spec.window.end_index, 0);
        assert_eq!(spec.window.start, spec.window.end);

        let [lo, hi] = spec.window.axis_range();
        assert_eq!(lo, NaiveDate::from_ymd_opt(2020, 1, 6).unwrap());
        assert_eq!(hi, NaiveDate::from_ymd_opt(2020, 1, 8).unwrap());
    }

    #[test]
    fn axis_range_is_ascending_for_unsorted_dates() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let spec =
            build_chart(&[feb, jan], &[1.0, 2.0], "l", "t", TickFormat::decimals(0), None).unwrap();

        assert_eq!(spec.window.start, feb);
        assert_eq!(spec.window.axis_range(), [jan, feb]);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let err = build_chart(&[], &[], "l", "t", TickFormat::decimals(1), None).unwrap_err();
        assert_eq!(err, ChartError::EmptySeries);

        let err =
            build_chart(&weekly(2), &[], "l", "t", TickFormat::decimals(1), None).unwrap_err();
        assert_eq!(err, ChartError::EmptySeries);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let err =
            build_chart(&weekly(3), &values, "l", "t", TickFormat::decimals(1), None).unwrap_err();
        assert_eq!(err, ChartError::LengthMismatch { dates: 3, values: 4 });
    }

    #[test]
    fn figure_matches_visual_contract() {
        let figure = serde_json::to_value(chart(40).to_figure()).unwrap();

        let trace = &figure["data"][0];
        assert_eq!(trace["type"], "scatter");
        assert_eq!(trace["mode"], "lines+markers");
        assert_eq!(trace["line"]["color"], "royalblue");
        assert_eq!(trace["marker"]["size"], 6);
        assert_eq!(trace["x"][0], "2020-01-07");
        assert_eq!(trace["x"].as_array().unwrap().len(), 40);

        let layout = &figure["layout"];
        assert_eq!(layout["hovermode"], "x unified");
        assert_eq!(layout["height"], 600);
        assert_eq!(layout["margin"], json!({"l": 40, "r": 40, "t": 60, "b": 100}));
        assert_eq!(layout["title"]["text"], "Commercial Long Over Time");

        let xaxis = &layout["xaxis"];
        assert_eq!(xaxis["type"], "date");
        assert_eq!(xaxis["rangeslider"]["visible"], true);
        assert_eq!(xaxis["tickangle"], 45);
        assert_eq!(xaxis["tickformat"], "%b %d\n%Y");
        assert_eq!(xaxis["ticklabelmode"], "period");
        assert_eq!(xaxis["range"], json!(["2020-01-07", "2020-08-04"]));

        let yaxis = &layout["yaxis"];
        assert_eq!(yaxis["title"]["text"], "Commercial Long");
        assert_eq!(yaxis["tickformat"], ".0f");
        assert_eq!(yaxis["dtick"], 25000.0);
    }

    #[test]
    fn automatic_spacing_omits_dtick() {
        let dates = weekly(3);
        let values = [1.0, 2.0, 3.0];
        let spec =
            build_chart(&dates, &values, "OI", "OI Over Time", TickFormat::decimals(1), None).unwrap();
        let figure = serde_json::to_value(spec.to_figure()).unwrap();

        assert!(figure["layout"]["yaxis"].get("dtick").is_none());
        assert_eq!(figure["layout"]["yaxis"]["tickformat"], ".1f");
    }

    proptest! {
        #[test]
        fn window_end_is_min_30_len_minus_1(n in 1usize..200) {
            let spec = chart(n);
            prop_assert_eq!(spec.window.end_index, 30.min(n - 1));
            prop_assert_eq!(spec.window.end, spec.dates[30.min(n - 1)]);
            let [lo, hi] = spec.window.axis_range();
            prop_assert!(lo < hi);
        }
    }
}
