// src/provider/http.rs — Remote policy engine client

use async_trait::async_trait;
use std::time::Duration;

use super::wire::{PolicyRequest, PolicyResponse};
use super::DecisionProvider;
use crate::core::types::{Decision, EvaluationContext};
use crate::infra::errors::GateError;

/// Calls `POST {base_url}/policy/evaluate`. The timeout covers the whole request.
pub struct HttpPolicyClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPolicyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::Config(format!("failed to build policy client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/policy/evaluate", self.base_url)
    }

    fn error(&self, message: impl Into<String>) -> GateError {
        GateError::provider(self.id(), message)
    }
}

#[async_trait]
impl DecisionProvider for HttpPolicyClient {
    fn id(&self) -> &str {
        "http"
    }

    async fn evaluate(&self, ctx: &EvaluationContext) -> Result<Decision, GateError> {
        let body = PolicyRequest::from(ctx);

        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.error(format!("request to {} timed out", self.endpoint()))
                } else {
                    self.error(format!("request to {} failed: {e}", self.endpoint()))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(self.error(format!("policy engine returned {status}: {}", text.trim())));
        }

        let parsed: PolicyResponse = resp
            .json()
            .await
            .map_err(|e| self.error(format!("malformed policy response: {e}")))?;

        parsed
            .into_decision()
            .map_err(|msg| self.error(format!("malformed policy response: {msg}")))
    }
}
