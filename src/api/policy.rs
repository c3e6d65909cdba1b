// src/api/policy.rs — Policy engine service

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::api::handlers::health;
use crate::api::types::ErrorResponse;
use crate::core::policy;
use crate::provider::wire::{PolicyRequest, PolicyResponse};

pub fn build_router() -> Router {
    Router::new()
        .route("/policy/evaluate", post(evaluate_policy))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

/// POST /policy/evaluate — Decide the tier for one step.
pub async fn evaluate_policy(
    body: Result<Json<PolicyRequest>, JsonRejection>,
) -> Result<Json<PolicyResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!("Rejected policy request: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "invalid request body",
                "validation_error",
            )),
        )
    })?;

    let ctx = request.to_context();
    let rule = policy::matching_rule(&ctx);
    tracing::debug!(
        agent_id = %request.agent_id,
        step = %ctx.step,
        rule = rule.name,
        "Policy evaluated",
    );
    Ok(Json(PolicyResponse::from(rule.outcome)))
}
