// src/cli/evaluate.rs — Print one policy decision

use crate::core::budget::Amount;
use crate::core::policy;
use crate::core::types::{EvaluationContext, StepName};

pub fn evaluate_step(step: StepName, total: f64, remaining: f64, sla: u32) -> anyhow::Result<()> {
    let ctx = build_context(step, total, remaining, sla)?;
    let rule = policy::matching_rule(&ctx);
    tracing::debug!("Matched rule '{}'", rule.name);
    println!("{}", serde_json::to_string_pretty(&rule.outcome)?);
    Ok(())
}

fn build_context(
    step: StepName,
    total: f64,
    remaining: f64,
    sla: u32,
) -> anyhow::Result<EvaluationContext> {
    let total = Amount::from_units(total)
        .ok_or_else(|| anyhow::anyhow!("invalid total budget: {total}"))?;
    let remaining = Amount::from_units(remaining)
        .ok_or_else(|| anyhow::anyhow!("invalid remaining budget: {remaining}"))?;
    Ok(EvaluationContext::new(step, total, remaining, sla))
}
