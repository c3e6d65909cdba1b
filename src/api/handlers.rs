// src/api/handlers.rs

use crate::api::{auth, error_response, types::ErrorResponse, ApiState};
use crate::core::metrics::MetricsSnapshot;
use crate::core::types::{RunRequest, RunResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;

/// POST /agent/run — Run the step sequence for one request.
pub async fn run_agent(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResult>, (StatusCode, Json<ErrorResponse>)> {
    auth::check_auth(&state, &headers)?;

    let Json(request) = body.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                format!("Invalid request: {}", rejection.body_text()),
                "validation_error",
            )),
        )
    })?;

    state
        .orchestrator
        .run(&request)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// GET /metrics — JSON counters.
pub async fn get_metrics(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<MetricsSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    auth::check_auth(&state, &headers)?;
    Ok(Json(state.metrics.snapshot()))
}

/// GET /metrics/prometheus — Text exposition of the same counters.
pub async fn get_metrics_prometheus(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<([(header::HeaderName, &'static str); 1], String), (StatusCode, Json<ErrorResponse>)>
{
    auth::check_auth(&state, &headers)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.snapshot().render_prometheus(),
    ))
}

/// GET /health — Simple health check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
