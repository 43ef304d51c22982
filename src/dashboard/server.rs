//! Dashboard Server
//! Serves the dashboard over HTTP, rebuilding it from the source file on every page load.

use super::{build_dashboard, build_page, figures, DashboardError};
use crate::config::DashboardConfig;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;

pub fn router(config: Arc<DashboardConfig>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/figures", get(api_figures))
        .with_state(config)
}

/// Bind to `port` on localhost and serve until the process is stopped.
pub async fn serve(config: DashboardConfig, port: u16, open_browser: bool) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let app = router(Arc::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let url = format!("http://{addr}");
    info!("Dashboard running at {url}");

    if open_browser {
        if let Err(e) = open::that(&url) {
            warn!("Could not open browser: {e}");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(config): State<Arc<DashboardConfig>>) -> Response {
    match run_blocking(move || build_page(&config)).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn api_figures(State(config): State<Arc<DashboardConfig>>) -> Response {
    match run_blocking(move || build_dashboard(&config).map(|d| figures(&d))).await {
        Ok(figs) => Json(figs).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Failure while building a page; surfaced to the browser as raw text.
#[derive(Debug)]
enum ServeError {
    Build(DashboardError),
    Join(tokio::task::JoinError),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let message = match self {
            ServeError::Build(e) => e.to_string(),
            ServeError::Join(e) => e.to_string(),
        };
        error!("Dashboard build failed: {message}");
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

/// Preparation reads the file synchronously, so keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ServeError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DashboardError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(ServeError::Join)?
        .map_err(ServeError::Build)
}
