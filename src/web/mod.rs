// Web server — Axum backend for the QRuSafe scanner UI.
//
// The browser client decodes QR codes camera-side and only sends the
// decoded string here, so the whole surface is one JSON route plus a
// health check. CORS is wide open because the scanner SPA is served
// from a different origin.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::intel::aggregate::Aggregator;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: &Config, aggregator: Arc<Aggregator>) -> Result<()> {
    let state = AppState { aggregator };
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind, config.port);
    info!("QRuSafe API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Assemble the router. Public so integration tests can drive it with
/// fake providers and no listener.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/check-url", post(handlers::check::check_url))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Deployment health check — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
