// src/provider/wire.rs — JSON bodies for POST /policy/evaluate

use serde::{Deserialize, Serialize};

use crate::core::budget::Amount;
use crate::core::catalog::POLICY_VERSION;
use crate::core::types::{Decision, EvaluationContext, Reason, StepName, Tier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRequest {
    #[serde(default)]
    pub agent_id: String,
    pub step: StepInfo,
    pub budget: BudgetInfo,
    #[serde(default)]
    pub request: RequestInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepInfo {
    pub name: StepName,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub total_steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInfo {
    pub total: Amount,
    pub remaining: Amount,
    #[serde(default)]
    pub spent_so_far: Amount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestInfo {
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub latency_sla_ms: u32,
}

impl From<&EvaluationContext> for PolicyRequest {
    fn from(ctx: &EvaluationContext) -> Self {
        Self {
            agent_id: ctx.run_id.clone(),
            step: StepInfo {
                name: ctx.step,
                index: ctx.step.index(),
                total_steps: StepName::ALL.len(),
            },
            budget: BudgetInfo {
                total: ctx.budget_total,
                remaining: ctx.budget_remaining,
                spent_so_far: ctx.budget_total - ctx.budget_remaining,
            },
            request: RequestInfo {
                priority: ctx.priority.clone(),
                latency_sla_ms: ctx.latency_sla_ms,
            },
        }
    }
}

impl PolicyRequest {
    pub fn to_context(&self) -> EvaluationContext {
        EvaluationContext::new(
            self.step.name,
            self.budget.total,
            self.budget.remaining,
            self.request.latency_sla_ms,
        )
        .with_priority(self.request.priority.clone())
        .with_run_id(self.agent_id.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResponse {
    pub decision: DecisionBody,
    pub reason: Reason,
    #[serde(default)]
    pub policy_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionBody {
    pub allowed: bool,
    #[serde(default)]
    pub selected_model_tier: Option<Tier>,
    pub hard_stop: bool,
}

impl From<Decision> for PolicyResponse {
    fn from(d: Decision) -> Self {
        Self {
            decision: DecisionBody {
                allowed: d.allowed,
                selected_model_tier: d.tier,
                hard_stop: d.hard_stop,
            },
            reason: d.reason,
            policy_version: POLICY_VERSION.into(),
        }
    }
}

impl PolicyResponse {
    /// Convert back to a `Decision`, rejecting bodies that break its invariants.
    pub fn into_decision(self) -> Result<Decision, String> {
        let decision = Decision {
            allowed: self.decision.allowed,
            tier: self.decision.selected_model_tier,
            hard_stop: self.decision.hard_stop,
            reason: self.reason,
        };
        if decision.is_consistent() {
            Ok(decision)
        } else {
            Err(format!(
                "inconsistent decision: allowed={}, tier={:?}, hard_stop={}",
                decision.allowed, decision.tier, decision.hard_stop
            ))
        }
    }
}
