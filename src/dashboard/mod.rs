//! Dashboard module - tab composition, HTML page and served mode

mod composer;
mod page;
mod server;

pub use composer::Dashboard;
pub use page::{figures, render_html};
pub use server::serve;

use crate::charts::ChartError;
use crate::config::DashboardConfig;
use crate::data::{self, PrepareError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Prepare(#[from] PrepareError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Failed to serialize figures: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Prepare the source and compose every tab. Nothing is built if preparation fails.
pub fn build_dashboard(config: &DashboardConfig) -> Result<Dashboard, DashboardError> {
    let table = data::prepare(&config.source, &config.layout)?;
    Ok(Dashboard::compose(&table)?)
}

/// Full pipeline: prepare, compose, render.
pub fn build_page(config: &DashboardConfig) -> Result<String, DashboardError> {
    let dashboard = build_dashboard(config)?;
    Ok(render_html(&dashboard)?)
}
