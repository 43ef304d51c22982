//! Dashboard Composer
//! Binds the observation table to the three fixed chart tabs.

use crate::charts::{build_chart, ChartError, ChartSpec, TickFormat};
use crate::data::ObservationTable;
use log::debug;

pub const PAGE_TITLE: &str = "Open Interest Dashboard";
pub const HEADING: &str = "COT Report Visualization Dashboard";
pub const INTRO: &str =
    "Select a tab below to view different time series graphs from the Commitments of Trade Report.";
pub const FOOTER: &str = "Data Source: Commitments of Trade Report Excel File";

/// Static description of one tab.
pub struct SectionSpec {
    pub icon: &'static str,
    pub tab: &'static str,
    pub subheading: &'static str,
    pub label: &'static str,
    pub tick_format: TickFormat,
    pub tick_spacing: Option<f64>,
    pub series: fn(&ObservationTable) -> Vec<f64>,
}

/// Tabs in display order.
pub const SECTIONS: [SectionSpec; 3] = [
    SectionSpec {
        icon: "📈",
        tab: "OI %",
        subheading: "Open Interest Stochastic Index as Percentage",
        label: "Open Interest Stochastic Index as Percentage",
        tick_format: TickFormat::decimals(1),
        tick_spacing: Some(5.0),
        series: ObservationTable::oscillator_pct,
    },
    SectionSpec {
        icon: "🟩",
        tab: "William Long",
        subheading: "Commercial Long (Column B)",
        label: "Commercial Long",
        tick_format: TickFormat::decimals(0),
        tick_spacing: Some(25_000.0),
        series: ObservationTable::commercial_long,
    },
    SectionSpec {
        icon: "🟥",
        tab: "William Short",
        subheading: "Commercial Short (Column C)",
        label: "Commercial Short",
        tick_format: TickFormat::decimals(0),
        tick_spacing: Some(25_000.0),
        series: ObservationTable::commercial_short,
    },
];

/// One rendered tab.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub icon: &'static str,
    pub tab: &'static str,
    pub subheading: &'static str,
    pub chart: ChartSpec,
}

/// The whole page: title, tabs and footer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub page_title: &'static str,
    pub heading: &'static str,
    pub intro: &'static str,
    pub sections: Vec<Section>,
    pub footer: &'static str,
}

impl Dashboard {
    /// Build every section from the same table. Any chart error aborts the whole page.
    pub fn compose(table: &ObservationTable) -> Result<Self, ChartError> {
        let dates = table.dates();

        let sections = SECTIONS
            .iter()
            .map(|spec| {
                let values = (spec.series)(table);
                let title = format!("{} Over Time", spec.label);
                let chart = build_chart(
                    &dates,
                    &values,
                    spec.label,
                    &title,
                    spec.tick_format,
                    spec.tick_spacing,
                )?;
                debug!(
                    "Tab {:?}: {} points, window {} to {} (index {})",
                    spec.tab,
                    chart.dates.len(),
                    chart.window.start,
                    chart.window.end,
                    chart.window.end_index
                );
                Ok(Section {
                    icon: spec.icon,
                    tab: spec.tab,
                    subheading: spec.subheading,
                    chart,
                })
            })
            .collect::<Result<Vec<_>, ChartError>>()?;

        Ok(Self {
            page_title: PAGE_TITLE,
            heading: HEADING,
            intro: INTRO,
            sections,
            footer: FOOTER,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataProcessor;
    use chrono::NaiveDate;

    fn table(n: usize) -> ObservationTable {
        let start = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
        let dates = (0..n)
            .map(|i| start.checked_add_days(chrono::Days::new(7 * i as u64)))
            .collect();
        let df = crate::data::observation_frame(
            dates,
            (0..n).map(|i| Some(i as f64 / 100.0)).collect(),
            (0..n).map(|i| Some(200_000.0 + i as f64)).collect(),
            (0..n).map(|i| Some(150_000.0 - i as f64)).collect(),
        )
        .unwrap();
        DataProcessor::prepare(df).unwrap()
    }

    #[test]
    fn three_tabs_in_fixed_order() {
        let dashboard = Dashboard::compose(&table(40)).unwrap();

        let tabs: Vec<_> = dashboard.sections.iter().map(|s| s.tab).collect();
        assert_eq!(tabs, ["OI %", "William Long", "William Short"]);

        let subheadings: Vec<_> = dashboard.sections.iter().map(|s| s.subheading).collect();
        assert_eq!(
            subheadings,
            [
                "Open Interest Stochastic Index as Percentage",
                "Commercial Long (Column B)",
                "Commercial Short (Column C)",
            ]
        );
        assert_eq!(dashboard.footer, FOOTER);
    }

    #[test]
    fn sections_share_dates_but_not_values() {
        let table = table(40);
        let dashboard = Dashboard::compose(&table).unwrap();
        let [oi, long, short] = &dashboard.sections[..] else {
            panic!("expected three sections");
        };

        assert_eq!(oi.chart.dates, long.chart.dates);
        assert_eq!(long.chart.dates, short.chart.dates);
        assert_eq!(oi.chart.values, table.oscillator_pct());
        assert_eq!(long.chart.values, table.commercial_long());
        assert_eq!(short.chart.values, table.commercial_short());
    }

    #[test]
    fn formats_follow_each_tab() {
        let dashboard = Dashboard::compose(&table(3)).unwrap();
        let oi = &dashboard.sections[0].chart;
        let long = &dashboard.sections[1].chart;

        assert_eq!(oi.title, "Open Interest Stochastic Index as Percentage Over Time");
        assert_eq!(oi.tick_format.d3(), ".1f");
        assert_eq!(oi.tick_spacing, Some(5.0));
        assert_eq!(long.title, "Commercial Long Over Time");
        assert_eq!(long.tick_format.d3(), ".0f");
        assert_eq!(long.tick_spacing, Some(25_000.0));
        assert_eq!(long.window.end_index, 2);
    }

    #[test]
    fn empty_table_cannot_be_composed() {
        let err = Dashboard::compose(&ObservationTable::default()).unwrap_err();
        assert_eq!(err, ChartError::EmptySeries);
    }
}
