// src/provider/local.rs — In-process policy evaluation

use async_trait::async_trait;

use super::DecisionProvider;
use crate::core::policy::PolicyEvaluator;
use crate::core::types::{Decision, EvaluationContext};
use crate::infra::errors::GateError;

/// Runs the rule ladder in the caller's process. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPolicy;

#[async_trait]
impl DecisionProvider for LocalPolicy {
    fn id(&self) -> &str {
        "local"
    }

    async fn evaluate(&self, ctx: &EvaluationContext) -> Result<Decision, GateError> {
        Ok(PolicyEvaluator.evaluate(ctx))
    }
}
