// src/provider/mod.rs — Decision provider layer

pub mod http;
pub mod local;
pub mod wire;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::core::types::{Decision, EvaluationContext};
use crate::infra::config::{PolicyClientConfig, PolicyMode};
use crate::infra::errors::GateError;

pub use http::HttpPolicyClient;
pub use local::LocalPolicy;

/// Source of per-step tier decisions.
///
/// Implementations own their own timeouts. Callers never retry.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn evaluate(&self, ctx: &EvaluationContext) -> Result<Decision, GateError>;
}

/// Build the provider selected by `[policy] mode`.
pub fn from_config(config: &PolicyClientConfig) -> Result<Arc<dyn DecisionProvider>, GateError> {
    match config.mode {
        PolicyMode::Local => Ok(Arc::new(LocalPolicy)),
        PolicyMode::Remote => {
            let client = HttpPolicyClient::new(
                config.url.clone(),
                Duration::from_millis(config.timeout_ms),
            )?;
            Ok(Arc::new(client))
        }
    }
}
