//! Dashboard Page Renderer
//! Renders a composed dashboard as one self-contained HTML page driven by Plotly.js.
//!
//! Layout:
//! 1. Heading and intro line
//! 2. Tab bar, one button per section
//! 3. One panel per section (subheading + chart), only the active one visible
//! 4. Footer attribution
//!
//! Tab switching is client-side only; figures are embedded once as JSON.

use super::composer::Dashboard;
use crate::charts::Figure;
use std::fmt::Write;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

const STYLE: &str = r#"
        * { box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 0;
            padding: 20px 40px;
            background: #f5f5f5;
            color: #333;
        }
        main { width: 100%; }
        h1 { margin-bottom: 8px; }
        .intro { color: #555; margin-bottom: 20px; }
        .tabs { display: flex; gap: 4px; border-bottom: 1px solid #ddd; }
        .tab {
            padding: 10px 18px;
            border: none;
            background: transparent;
            cursor: pointer;
            font-size: 15px;
            border-bottom: 3px solid transparent;
        }
        .tab.active { border-bottom-color: #ff4b4b; color: #ff4b4b; }
        .panel { display: none; padding-top: 10px; }
        .panel.active { display: block; }
        .chart {
            background: white;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        footer { color: #666; font-size: 14px; }
"#;

const SCRIPT: &str = r#"
        const figures = JSON.parse(document.getElementById('figures').textContent);
        const config = { responsive: true, displayModeBar: true, scrollZoom: true };
        figures.forEach((fig, i) => Plotly.newPlot('chart-' + i, fig.data, fig.layout, config));

        document.querySelectorAll('.tab').forEach(tab => {
            tab.addEventListener('click', () => {
                const id = 'panel-' + tab.dataset.tab;
                document.querySelectorAll('.tab').forEach(t => t.classList.toggle('active', t === tab));
                document.querySelectorAll('.panel').forEach(p => p.classList.toggle('active', p.id === id));
                Plotly.Plots.resize('chart-' + tab.dataset.tab);
            });
        });
"#;

/// Plotly figures of every section, in tab order.
pub fn figures(dashboard: &Dashboard) -> Vec<Figure> {
    dashboard
        .sections
        .iter()
        .map(|section| section.chart.to_figure())
        .collect()
}

/// Render the full HTML document.
pub fn render_html(dashboard: &Dashboard) -> Result<String, serde_json::Error> {
    // `</` inside the JSON block would close the script element early.
    let figures_json = serde_json::to_string(&figures(dashboard))?.replace("</", "<\\/");

    let mut tabs = String::new();
    let mut panels = String::new();
    for (i, section) in dashboard.sections.iter().enumerate() {
        let active = if i == 0 { " active" } else { "" };
        // Writing into a String cannot fail.
        let _ = writeln!(
            tabs,
            r#"        <button class="tab{active}" data-tab="{i}" role="tab">{} {}</button>"#,
            section.icon,
            escape_html(section.tab)
        );
        let _ = writeln!(
            panels,
            r#"    <section class="panel{active}" id="panel-{i}" role="tabpanel">
        <h2>{}</h2>
        <div class="chart" id="chart-{i}"></div>
    </section>"#,
            escape_html(section.subheading)
        );
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{PLOTLY_CDN}"></script>
    <style>{STYLE}    </style>
</head>
<body>
<main>
    <h1>📊 {heading}</h1>
    <p class="intro">{intro}</p>
    <nav class="tabs" role="tablist">
{tabs}    </nav>
{panels}    <hr>
    <footer>📁 {footer}</footer>
</main>
<script id="figures" type="application/json">{figures_json}</script>
<script>{SCRIPT}</script>
</body>
</html>
"#,
        title = escape_html(dashboard.page_title),
        heading = escape_html(dashboard.heading),
        intro = escape_html(dashboard.intro),
        footer = escape_html(dashboard.footer),
    ))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{build_chart, TickFormat};
    use crate::dashboard::composer::{Section, FOOTER};
    use chrono::NaiveDate;

    fn dashboard(label: &str) -> Dashboard {
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        ];
        let section = |icon, tab| Section {
            icon,
            tab,
            subheading: "Commercial Long",
            chart: build_chart(&dates, &[1.0, 2.0], label, "Title", TickFormat::decimals(0), None)
                .unwrap(),
        };

        Dashboard {
            page_title: "Open Interest Dashboard",
            heading: "COT Report Visualization Dashboard",
            intro: "Pick a tab",
            sections: vec![
                section("📈", "OI %"),
                section("🟩", "William Long"),
                section("🟥", "William Short"),
            ],
            footer: FOOTER,
        }
    }

    #[test]
    fn page_has_tabs_panels_and_footer() {
        let html = render_html(&dashboard("Commercial Long")).unwrap();

        assert!(html.contains("<title>Open Interest Dashboard</title>"));
        assert!(html.contains(PLOTLY_CDN));
        let oi = html.find("OI %</button>").unwrap();
        let long = html.find("William Long</button>").unwrap();
        let short = html.find("William Short</button>").unwrap();
        assert!(oi < long && long < short);
        assert_eq!(html.matches(r#"class="chart""#).count(), 3);
        assert!(html.contains(r#"<section class="panel active" id="panel-0""#));
        assert!(html.contains(r#"<section class="panel" id="panel-1""#));
        assert!(html.contains("Data Source: Commitments of Trade Report Excel File"));
    }

    #[test]
    fn embedded_json_cannot_close_the_script() {
        let html = render_html(&dashboard("</script><b>x")).unwrap();

        assert_eq!(html.matches("</script>").count(), 3);
        assert!(html.contains(r#"<\/script><b>x"#));
    }

    #[test]
    fn figures_follow_tab_order() {
        let figs = figures(&dashboard("Commercial Long"));
        assert_eq!(figs.len(), 3);
        assert_eq!(figs[0].layout.yaxis.title.text, "Commercial Long");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape_html("OI %"), "OI %");
    }
}
