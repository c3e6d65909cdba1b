// src/api/mod.rs — HTTP surfaces for the executor and the policy engine

pub mod auth;
pub mod handlers;
pub mod policy;
pub mod types;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::metrics::MetricsAggregator;
use crate::core::orchestrator::Orchestrator;
use crate::infra::errors::GateError;
use types::ErrorResponse;

/// Shared state for executor handlers.
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
    pub metrics: Arc<MetricsAggregator>,
    pub token: Option<String>,
}

impl ApiState {
    pub fn new(orchestrator: Orchestrator, token: Option<String>) -> Self {
        let metrics = Arc::clone(orchestrator.metrics());
        Self {
            orchestrator: Arc::new(orchestrator),
            metrics,
            token,
        }
    }
}

/// Executor routes: run a request, read metrics, health.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/agent/run", post(handlers::run_agent))
        .route("/metrics", get(handlers::get_metrics))
        .route("/metrics/prometheus", get(handlers::get_metrics_prometheus))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Map a core error onto an HTTP status and JSON body.
pub fn error_response(err: &GateError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        GateError::Validation(_) => StatusCode::BAD_REQUEST,
        GateError::Provider { .. } | GateError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        GateError::BudgetExceeded { .. } => StatusCode::PAYMENT_REQUIRED,
        GateError::Config(_) | GateError::Io(_) | GateError::Other(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            kind: err.kind().into(),
        }),
    )
}

/// Bind `addr` and serve `router` until Ctrl-C.
pub async fn serve(name: &str, addr: &str, router: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("{name} listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}
