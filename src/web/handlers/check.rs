// POST /api/check-url — aggregate a safety verdict for one URL.
//
// Returns 400 when the body is malformed or the url is missing — no
// provider call happens in that case. Provider failures are already
// absorbed by the aggregator; a 500 here means every provider was
// unreachable (or a bug), and the caller gets a generic message while
// the real diagnostics go to the log.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    url: String,
}

/// POST /api/check-url — check a decoded QR string against all providers.
pub async fn check_url(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Response {
    let url = match payload {
        Ok(Json(body)) => body.url,
        Err(_) => return api_error(StatusCode::BAD_REQUEST, "URL is required"),
    };

    if url.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "URL is required");
    }

    info!(url = %url, "Received URL check request");

    match state.aggregator.check(&url).await {
        Ok(verdict) => (StatusCode::OK, Json(verdict)).into_response(),
        Err(error) => {
            error!(url = %url, error = %error, "URL check failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
