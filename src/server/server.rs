use anyhow::{Context, Result};
use std::future::IntoFuture;
use std::time::Duration;

use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::metrics::metrics_handler;
use super::resource::{make_authority_routes, make_entity_routes};
use super::{log_requests, state::*};
use crate::domain::{Employee, Job, JobHistory};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerInfo {
    pub uptime: String,
    pub hash: String,
    pub profile: String,
    pub app_name: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn management_info(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerInfo {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        profile: env!("BUILD_PROFILE").to_string(),
        app_name: state.config.app_name.clone(),
    })
}

pub fn make_app(state: ServerState) -> Router {
    let api_routes: Router<ServerState> = Router::new()
        .merge(make_entity_routes::<Employee>())
        .merge(make_entity_routes::<Job>())
        .merge(make_entity_routes::<JobHistory>())
        .merge(make_authority_routes())
        .route("/management/info", get(management_info));

    let mut app: Router = api_routes.with_state(state.clone());

    if let Some(frontend_path) = &state.config.frontend_dir_path {
        let static_files_service =
            ServeDir::new(frontend_path).append_index_html_on_directories(true);
        app = app.fallback_service(static_files_service);
    }

    app.layer(middleware::from_fn_with_state(
        state.config.clone(),
        log_requests,
    ))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves the API on `config.port` and Prometheus metrics on
/// `config.metrics_port` until either listener stops.
pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let metrics_port = state.config.metrics_port;
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind API port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            info!("HTTP server stopped: {:?}", result);
            Ok(result?)
        }
        result = axum::serve(metrics_listener, make_metrics_app()).into_future() => {
            info!("Metrics server stopped: {:?}", result);
            Ok(result?)
        }
    }
}
