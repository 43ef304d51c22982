//! COT Dashboard - Commitments of Trade Report Visualization
//!
//! Reads the weekly COT spreadsheet and renders the open-interest oscillator and
//! commercial long/short positions as interactive, tabbed Plotly charts.

mod charts;
mod config;
mod dashboard;
mod data;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{DashboardConfig, SourceLayout, DEFAULT_OUTPUT, DEFAULT_PORT, DEFAULT_SOURCE};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "cot-dashboard")]
#[command(about = "Interactive Commitments of Trade report dashboard")]
struct Cli {
    /// Source spreadsheet (.xlsx, .xls, .ods or .csv)
    #[arg(short, long, global = true, default_value = DEFAULT_SOURCE)]
    source: PathBuf,

    /// Header names required at columns 16, 17 and 18, comma separated
    #[arg(long, global = true, value_delimiter = ',')]
    expect_headers: Option<Vec<String>>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the dashboard to an HTML file and open it
    Render {
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Don't open browser automatically
        #[arg(long)]
        no_browser: bool,
    },
    /// Serve the dashboard, rebuilding it on every page load
    Serve {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_browser: bool,
    },
}

impl Cli {
    fn dashboard_config(&self) -> Result<DashboardConfig> {
        let mut layout = SourceLayout::default();
        if let Some(headers) = &self.expect_headers {
            let headers: [String; 3] = headers
                .clone()
                .try_into()
                .map_err(|_| anyhow::anyhow!("--expect-headers takes exactly three names"))?;
            layout = layout.with_expected_headers(headers);
        }

        Ok(DashboardConfig {
            source: self.source.clone(),
            layout,
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.dashboard_config()?;

    match cli.command {
        None => render(&config, Path::new(DEFAULT_OUTPUT), true),
        Some(Command::Render { output, no_browser }) => render(&config, &output, !no_browser),
        Some(Command::Serve { port, no_browser }) => tokio::runtime::Runtime::new()
            .context("Failed to start async runtime")?
            .block_on(dashboard::serve(config, port, !no_browser)),
    }
}

fn render(config: &DashboardConfig, output: &Path, open_browser: bool) -> Result<()> {
    info!("Reading {}", config.source.display());

    let html = dashboard::build_page(config)
        .with_context(|| format!("Failed to build dashboard from {}", config.source.display()))?;
    fs::write(output, html).with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Dashboard written to {}", output.display());

    if open_browser {
        open::that(output).with_context(|| format!("Failed to open {}", output.display()))?;
    }
    Ok(())
}
