// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::budget::Amount;
use crate::infra::errors::GateError;

/// Execution tier. Ordered by cost and latency: cheap < standard < premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Cheap,
    Standard,
    Premium,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Cheap, Tier::Standard, Tier::Premium];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Cheap => "cheap",
            Tier::Standard => "standard",
            Tier::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cheap" => Ok(Tier::Cheap),
            "standard" => Ok(Tier::Standard),
            "premium" => Ok(Tier::Premium),
            other => Err(format!("unknown tier '{other}'")),
        }
    }
}

/// One of the fixed steps of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepName {
    Plan,
    Execute,
    Summarize,
}

impl StepName {
    pub const ALL: [StepName; 3] = [StepName::Plan, StepName::Execute, StepName::Summarize];

    pub fn as_str(self) -> &'static str {
        match self {
            StepName::Plan => "plan",
            StepName::Execute => "execute",
            StepName::Summarize => "summarize",
        }
    }

    /// Zero-based position in the run.
    pub fn index(self) -> usize {
        match self {
            StepName::Plan => 0,
            StepName::Execute => 1,
            StepName::Summarize => 2,
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plan" => Ok(StepName::Plan),
            "execute" => Ok(StepName::Execute),
            "summarize" => Ok(StepName::Summarize),
            other => Err(format!("unknown step '{other}' (expected plan, execute or summarize)")),
        }
    }
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    BudgetExhausted,
    SummarizeForcedCheap,
    PlanningPremiumAllowed,
    PlanningStandardSlaConstrained,
    ExecutionStandard,
    ExecutionCheapSlaConstrained,
    BudgetProtectionStandard,
    BudgetProtectionCheap,
    LatencySlaUnachievable,
    DefaultAllow,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::BudgetExhausted => "budget_exhausted",
            Reason::SummarizeForcedCheap => "summarize_forced_cheap",
            Reason::PlanningPremiumAllowed => "planning_premium_allowed",
            Reason::PlanningStandardSlaConstrained => "planning_standard_sla_constrained",
            Reason::ExecutionStandard => "execution_standard",
            Reason::ExecutionCheapSlaConstrained => "execution_cheap_sla_constrained",
            Reason::BudgetProtectionStandard => "budget_protection_standard",
            Reason::BudgetProtectionCheap => "budget_protection_cheap",
            Reason::LatencySlaUnachievable => "latency_sla_unachievable",
            Reason::DefaultAllow => "default_allow",
        }
    }

    /// The latency SLA, not the budget, picked the tier.
    pub fn is_sla_driven(self) -> bool {
        self.as_str().contains("sla")
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one step.
///
/// A well-formed decision is either a hard stop (`allowed == false`, no tier)
/// or an allowance with exactly one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub tier: Option<Tier>,
    pub hard_stop: bool,
    pub reason: Reason,
}

impl Decision {
    pub const fn allow(tier: Tier, reason: Reason) -> Self {
        Self {
            allowed: true,
            tier: Some(tier),
            hard_stop: false,
            reason,
        }
    }

    pub const fn hard_stop(reason: Reason) -> Self {
        Self {
            allowed: false,
            tier: None,
            hard_stop: true,
            reason,
        }
    }

    /// `hard_stop => !allowed && tier.is_none()` and `allowed <=> tier.is_some()`.
    pub fn is_consistent(&self) -> bool {
        if self.hard_stop && (self.allowed || self.tier.is_some()) {
            return false;
        }
        self.allowed == self.tier.is_some()
    }
}

/// Inputs for a single step decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationContext {
    pub step: StepName,
    pub budget_total: Amount,
    pub budget_remaining: Amount,
    pub latency_sla_ms: u32,
    /// Carried to remote providers; the local policy ignores it.
    pub priority: String,
    pub run_id: String,
}

impl EvaluationContext {
    pub fn new(step: StepName, total: Amount, remaining: Amount, latency_sla_ms: u32) -> Self {
        Self {
            step,
            budget_total: total,
            budget_remaining: remaining,
            latency_sla_ms,
            priority: String::new(),
            run_id: String::new(),
        }
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }
}

/// Request to run the fixed step sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub goal: String,
    pub budget: f64,
    #[serde(default)]
    pub priority: String,
    /// Maximum acceptable per-step latency. Required; `0` is a literal zero
    /// constraint that no tier can meet.
    pub latency_sla_ms: u32,
}

impl RunRequest {
    pub fn new(goal: impl Into<String>, budget: f64, latency_sla_ms: u32) -> Self {
        Self {
            goal: goal.into(),
            budget,
            priority: "normal".into(),
            latency_sla_ms,
        }
    }

    /// Check the request and return its budget as an exact amount.
    pub fn validate(&self) -> Result<Amount, GateError> {
        if !self.budget.is_finite() {
            return Err(GateError::Validation(format!(
                "budget must be a finite number, got {}",
                self.budget
            )));
        }
        if self.budget <= 0.0 {
            return Err(GateError::Validation(format!(
                "budget must be greater than zero, got {}",
                self.budget
            )));
        }
        match Amount::from_units(self.budget) {
            Some(amount) if amount.is_positive() => Ok(amount),
            _ => Err(GateError::Validation(format!(
                "budget {} is outside the supported range",
                self.budget
            ))),
        }
    }
}

/// One charged step in a run's trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: StepName,
    pub tier: Tier,
    pub cost: Amount,
    pub latency_ms: u64,
    pub reason: Reason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    HardStopped,
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::HardStopped => write!(f, "hard_stopped"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Final result of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,
    pub result: String,
    pub status: RunStatus,
    pub total_cost: Amount,
    /// Wall-clock milliseconds from run start to run end.
    pub total_latency_ms: u64,
    pub budget_remaining: Amount,
    pub policy_version: String,
    pub steps: Vec<StepOutcome>,
}

/// Lifecycle events emitted by the orchestrator while a run is in flight.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    RunStarted {
        run_id: String,
        budget: Amount,
    },
    StepDecided {
        step: StepName,
        decision: Decision,
    },
    StepCharged {
        outcome: StepOutcome,
        remaining: Amount,
    },
    Finished {
        status: RunStatus,
        total_cost: Amount,
        total_latency_ms: u64,
    },
}
