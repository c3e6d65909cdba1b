// src/infra/errors.rs — Error types for tiergate

use thiserror::Error;

use crate::core::budget::Amount;
use crate::core::types::{StepName, Tier};

#[derive(Error, Debug)]
pub enum GateError {
    // Caller errors, raised before any step runs
    #[error("Invalid run request: {0}")]
    Validation(String),

    // Decision provider failures (unreachable, timeout, malformed response)
    #[error("Decision provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    // Run aborted; distinct from a hard stop, which is a successful result
    #[error("Budget exceeded at step '{step}': {tier} tier costs {cost}, {remaining} remaining")]
    BudgetExceeded {
        step: StepName,
        tier: Tier,
        cost: Amount,
        remaining: Amount,
    },

    // Completion gateway
    #[error("Upstream '{upstream}' error: {message}")]
    Upstream { upstream: String, message: String },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GateError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        GateError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable tag for API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::Validation(_) => "validation_error",
            GateError::Provider { .. } => "provider_error",
            GateError::BudgetExceeded { .. } => "budget_exceeded",
            GateError::Upstream { .. } => "upstream_error",
            GateError::Config(_) => "config_error",
            GateError::Io(_) | GateError::Other(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_exceeded_message() {
        let e = GateError::BudgetExceeded {
            step: StepName::Plan,
            tier: Tier::Premium,
            cost: Amount::from_micros(30_000),
            remaining: Amount::from_micros(20_000),
        };
        assert_eq!(
            e.to_string(),
            "Budget exceeded at step 'plan': premium tier costs 0.03, 0.02 remaining"
        );
        assert_eq!(e.kind(), "budget_exceeded");
    }

    #[test]
    fn test_provider_helper() {
        let e = GateError::provider("http", "timed out");
        assert_eq!(e.to_string(), "Decision provider 'http' error: timed out");
        assert_eq!(e.kind(), "provider_error");
    }
}
