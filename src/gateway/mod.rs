// src/gateway/mod.rs — PII-screening proxy for chat completions

pub mod audit;
pub mod scanner;
pub mod types;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::infra::config::GatewayConfig;
use crate::infra::errors::GateError;
use audit::AuditRecord;
use scanner::PiiScanner;
use types::{ChatRequest, ChatResponse};

#[derive(Clone)]
pub struct GatewayState {
    scanner: Arc<PiiScanner>,
    client: reqwest::Client,
    upstream_url: String,
    api_key: String,
    block_on_pii: bool,
}

impl GatewayState {
    pub fn new(
        upstream_url: impl Into<String>,
        api_key: impl Into<String>,
        block_on_pii: bool,
        timeout: Duration,
    ) -> Result<Self, GateError> {
        let scanner = PiiScanner::new()
            .map_err(|e| GateError::Config(format!("invalid PII pattern: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::Config(format!("failed to build upstream client: {e}")))?;
        Ok(Self {
            scanner: Arc::new(scanner),
            client,
            upstream_url: upstream_url.into(),
            api_key: api_key.into(),
            block_on_pii,
        })
    }

    /// Read the API key from the configured environment variable.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GateError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                GateError::Config(format!(
                    "{} environment variable required",
                    config.api_key_env
                ))
            })?;
        Self::new(
            config.upstream_url.clone(),
            api_key,
            config.block_on_pii,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn block_on_pii(&self) -> bool {
        self.block_on_pii
    }

    async fn forward(&self, req: &ChatRequest) -> Result<ChatResponse, GateError> {
        let upstream_err = |message: String| GateError::Upstream {
            upstream: self.upstream_url.clone(),
            message,
        };

        let resp = self
            .client
            .post(&self.upstream_url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .map_err(|e| upstream_err(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(upstream_err(format!("returned {status}: {}", text.trim())));
        }

        resp.json()
            .await
            .map_err(|e| upstream_err(format!("malformed response: {e}")))
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(handle_chat))
        .route("/health", get(crate::api::handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// OpenAI-style error envelope.
fn error_body(status: StatusCode, message: String, kind: &str, code: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": {
                "message": message,
                "type": kind,
                "code": code,
            }
        })),
    )
        .into_response()
}

/// POST /v1/chat/completions — Screen every message, then forward upstream.
pub async fn handle_chat(
    State(state): State<GatewayState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(mut req) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_body(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
                "invalid_request_error",
                "invalid_body",
            );
        }
    };
    let user = req.user();

    let mut detected: Vec<String> = Vec::new();
    for msg in req.messages.iter_mut() {
        let scan = state.scanner.scan(&msg.content);
        if !scan.has_pii {
            continue;
        }

        if state.block_on_pii {
            tracing::warn!(model = %req.model, pii = ?scan.pii_types, "PII detected, blocking request");
            audit::log_request(&AuditRecord::blocked(&req.model, &scan).with_user(user));
            return error_body(
                StatusCode::FORBIDDEN,
                format!("PII detected: {}. Request blocked.", scan.pii_types.join(", ")),
                "pii_violation",
                "pii_detected",
            );
        }

        tracing::debug!(pii = ?scan.pii_types, "Redacting message");
        detected.extend(scan.pii_types);
        msg.content = scan.redacted_text;
    }

    let resp = match state.forward(&req).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Upstream completion failed: {e}");
            return error_body(
                StatusCode::BAD_GATEWAY,
                e.to_string(),
                "upstream_error",
                "upstream_failed",
            );
        }
    };

    audit::log_request(
        &AuditRecord::completed(&req.model, req.last_prompt(), resp.first_content(), detected)
            .with_user(user),
    );

    Json(resp).into_response()
}

/// Bind and serve the gateway until Ctrl-C.
pub async fn serve(addr: &str, state: GatewayState) -> anyhow::Result<()> {
    tracing::info!("Block on PII: {}", state.block_on_pii());
    crate::api::serve("Gateway", addr, build_router(state)).await
}
