// src/core/policy.rs — Tier selection rule ladder

use super::budget::BudgetRatio;
use super::types::{Decision, EvaluationContext, Reason, StepName, Tier};

/// Below this ratio every step hard-stops.
pub const EXHAUSTED_BPS: u32 = 1_000;
/// Premium planning and standard execution need at least this much left.
/// Below it, fall-through steps enter budget protection.
pub const HEALTHY_BPS: u32 = 4_000;
pub const PLAN_STANDARD_BPS: u32 = 2_500;
pub const EXECUTE_CHEAP_BPS: u32 = 1_500;

/// What a rule looks at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput {
    pub step: StepName,
    pub ratio: BudgetRatio,
    pub sla_ms: u32,
}

impl RuleInput {
    pub fn from_context(ctx: &EvaluationContext) -> Self {
        Self {
            step: ctx.step,
            ratio: BudgetRatio::new(ctx.budget_remaining, ctx.budget_total),
            sla_ms: ctx.latency_sla_ms,
        }
    }

    /// The SLA leaves room for a call on `tier`.
    fn fits(&self, tier: Tier) -> bool {
        self.sla_ms >= tier.latency_ms()
    }
}

/// A named (predicate, outcome) pair.
pub struct Rule {
    pub name: &'static str,
    predicate: fn(&RuleInput) -> bool,
    pub outcome: Decision,
}

impl Rule {
    pub fn matches(&self, input: &RuleInput) -> bool {
        (self.predicate)(input)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("outcome", &self.outcome)
            .finish()
    }
}

fn exhausted(i: &RuleInput) -> bool {
    i.ratio.below(EXHAUSTED_BPS)
}

fn summarize(i: &RuleInput) -> bool {
    i.step == StepName::Summarize
}

fn plan_premium(i: &RuleInput) -> bool {
    i.step == StepName::Plan && i.fits(Tier::Premium) && i.ratio.at_least(HEALTHY_BPS)
}

fn plan_standard(i: &RuleInput) -> bool {
    i.step == StepName::Plan && i.fits(Tier::Standard) && i.ratio.at_least(PLAN_STANDARD_BPS)
}

fn execute_standard(i: &RuleInput) -> bool {
    i.step == StepName::Execute && i.fits(Tier::Standard) && i.ratio.at_least(HEALTHY_BPS)
}

fn execute_cheap(i: &RuleInput) -> bool {
    i.step == StepName::Execute && i.fits(Tier::Cheap) && i.ratio.at_least(EXECUTE_CHEAP_BPS)
}

fn protect_standard(i: &RuleInput) -> bool {
    i.ratio.below(HEALTHY_BPS) && i.fits(Tier::Standard)
}

fn protect_cheap(i: &RuleInput) -> bool {
    i.ratio.below(HEALTHY_BPS) && i.fits(Tier::Cheap)
}

fn protect_unachievable(i: &RuleInput) -> bool {
    i.ratio.below(HEALTHY_BPS)
}

fn always(_: &RuleInput) -> bool {
    true
}

/// The ladder, evaluated top to bottom; the first match wins.
/// `summarize` never reaches budget protection because its override always matches.
pub static RULES: [Rule; 10] = [
    Rule {
        name: "budget_exhausted",
        predicate: exhausted,
        outcome: Decision::hard_stop(Reason::BudgetExhausted),
    },
    Rule {
        name: "summarize_forced_cheap",
        predicate: summarize,
        outcome: Decision::allow(Tier::Cheap, Reason::SummarizeForcedCheap),
    },
    Rule {
        name: "plan_premium",
        predicate: plan_premium,
        outcome: Decision::allow(Tier::Premium, Reason::PlanningPremiumAllowed),
    },
    Rule {
        name: "plan_standard",
        predicate: plan_standard,
        outcome: Decision::allow(Tier::Standard, Reason::PlanningStandardSlaConstrained),
    },
    Rule {
        name: "execute_standard",
        predicate: execute_standard,
        outcome: Decision::allow(Tier::Standard, Reason::ExecutionStandard),
    },
    Rule {
        name: "execute_cheap",
        predicate: execute_cheap,
        outcome: Decision::allow(Tier::Cheap, Reason::ExecutionCheapSlaConstrained),
    },
    Rule {
        name: "protect_standard",
        predicate: protect_standard,
        outcome: Decision::allow(Tier::Standard, Reason::BudgetProtectionStandard),
    },
    Rule {
        name: "protect_cheap",
        predicate: protect_cheap,
        outcome: Decision::allow(Tier::Cheap, Reason::BudgetProtectionCheap),
    },
    Rule {
        name: "protect_unachievable",
        predicate: protect_unachievable,
        outcome: Decision::hard_stop(Reason::LatencySlaUnachievable),
    },
    Rule {
        name: "default_allow",
        predicate: always,
        outcome: Decision::allow(Tier::Standard, Reason::DefaultAllow),
    },
];

/// The first rule that matches `ctx`.
pub fn matching_rule(ctx: &EvaluationContext) -> &'static Rule {
    let input = RuleInput::from_context(ctx);
    RULES
        .iter()
        .find(|rule| rule.matches(&input))
        .unwrap_or(&RULES[RULES.len() - 1])
}

/// Pure tier decision for one step.
pub fn evaluate(ctx: &EvaluationContext) -> Decision {
    matching_rule(ctx).outcome
}

/// Stateless handle on the rule ladder, for call sites that want an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEvaluator;

impl PolicyEvaluator {
    pub fn evaluate(&self, ctx: &EvaluationContext) -> Decision {
        evaluate(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::budget::Amount;

    fn ctx(step: StepName, total: i64, remaining: i64, sla: u32) -> EvaluationContext {
        EvaluationContext::new(
            step,
            Amount::from_micros(total),
            Amount::from_micros(remaining),
            sla,
        )
    }

    /// Context with a total of 10 000 micro-units, so `remaining` reads as basis points.
    fn at(step: StepName, bps: i64, sla: u32) -> EvaluationContext {
        ctx(step, 10_000, bps, sla)
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "budget_exhausted",
                "summarize_forced_cheap",
                "plan_premium",
                "plan_standard",
                "execute_standard",
                "execute_cheap",
                "protect_standard",
                "protect_cheap",
                "protect_unachievable",
                "default_allow",
            ]
        );
    }

    #[test]
    fn test_every_outcome_is_consistent() {
        for rule in &RULES {
            assert!(rule.outcome.is_consistent(), "{} is malformed", rule.name);
        }
    }

    #[test]
    fn test_exhausted_wins_for_every_step_and_sla() {
        for step in StepName::ALL {
            for sla in [0, 79, 80, 200, 450, 10_000] {
                let d = evaluate(&at(step, 999, sla));
                assert_eq!(d, Decision::hard_stop(Reason::BudgetExhausted), "{step} sla={sla}");
            }
        }
    }

    #[test]
    fn test_exactly_ten_percent_is_not_exhausted() {
        let d = evaluate(&at(StepName::Summarize, 1_000, 500));
        assert_eq!(d, Decision::allow(Tier::Cheap, Reason::SummarizeForcedCheap));
    }

    #[test]
    fn test_zero_total_is_exhausted() {
        let d = evaluate(&ctx(StepName::Plan, 0, 0, 500));
        assert_eq!(d, Decision::hard_stop(Reason::BudgetExhausted));
        let d = evaluate(&ctx(StepName::Plan, -10, 50, 500));
        assert_eq!(d, Decision::hard_stop(Reason::BudgetExhausted));
    }

    #[test]
    fn test_summarize_always_cheap() {
        for bps in [1_000, 2_000, 4_000, 10_000] {
            for sla in [0, 50, 80, 200, 1_000] {
                let d = evaluate(&at(StepName::Summarize, bps, sla));
                assert_eq!(d.tier, Some(Tier::Cheap), "bps={bps} sla={sla}");
                assert_eq!(d.reason, Reason::SummarizeForcedCheap);
            }
        }
    }

    #[test]
    fn test_plan_ladder() {
        assert_eq!(
            evaluate(&at(StepName::Plan, 4_000, 450)),
            Decision::allow(Tier::Premium, Reason::PlanningPremiumAllowed)
        );
        // Premium SLA but not enough budget.
        assert_eq!(
            evaluate(&at(StepName::Plan, 3_999, 450)),
            Decision::allow(Tier::Standard, Reason::PlanningStandardSlaConstrained)
        );
        // Enough budget but SLA too tight for premium.
        assert_eq!(
            evaluate(&at(StepName::Plan, 10_000, 449)),
            Decision::allow(Tier::Standard, Reason::PlanningStandardSlaConstrained)
        );
        assert_eq!(
            evaluate(&at(StepName::Plan, 2_500, 200)),
            Decision::allow(Tier::Standard, Reason::PlanningStandardSlaConstrained)
        );
    }

    #[test]
    fn test_plan_falls_through() {
        // ratio < 0.25 with a standard-capable SLA lands in budget protection.
        assert_eq!(
            evaluate(&at(StepName::Plan, 2_499, 200)),
            Decision::allow(Tier::Standard, Reason::BudgetProtectionStandard)
        );
        assert_eq!(
            evaluate(&at(StepName::Plan, 2_000, 100)),
            Decision::allow(Tier::Cheap, Reason::BudgetProtectionCheap)
        );
        assert_eq!(
            evaluate(&at(StepName::Plan, 2_000, 79)),
            Decision::hard_stop(Reason::LatencySlaUnachievable)
        );
        // Healthy budget, SLA below standard: default.
        assert_eq!(
            evaluate(&at(StepName::Plan, 10_000, 100)),
            Decision::allow(Tier::Standard, Reason::DefaultAllow)
        );
    }

    #[test]
    fn test_execute_ladder() {
        assert_eq!(
            evaluate(&at(StepName::Execute, 4_000, 200)),
            Decision::allow(Tier::Standard, Reason::ExecutionStandard)
        );
        assert_eq!(
            evaluate(&at(StepName::Execute, 3_999, 200)),
            Decision::allow(Tier::Cheap, Reason::ExecutionCheapSlaConstrained)
        );
        assert_eq!(
            evaluate(&at(StepName::Execute, 1_500, 80)),
            Decision::allow(Tier::Cheap, Reason::ExecutionCheapSlaConstrained)
        );
        assert_eq!(
            evaluate(&at(StepName::Execute, 10_000, 100)),
            Decision::allow(Tier::Cheap, Reason::ExecutionCheapSlaConstrained)
        );
    }

    #[test]
    fn test_execute_falls_through() {
        assert_eq!(
            evaluate(&at(StepName::Execute, 1_499, 200)),
            Decision::allow(Tier::Standard, Reason::BudgetProtectionStandard)
        );
        assert_eq!(
            evaluate(&at(StepName::Execute, 1_499, 80)),
            Decision::allow(Tier::Cheap, Reason::BudgetProtectionCheap)
        );
        assert_eq!(
            evaluate(&at(StepName::Execute, 10_000, 79)),
            Decision::allow(Tier::Standard, Reason::DefaultAllow)
        );
    }

    #[test]
    fn test_zero_sla_is_literal() {
        assert_eq!(
            evaluate(&at(StepName::Execute, 3_000, 0)),
            Decision::hard_stop(Reason::LatencySlaUnachievable)
        );
        assert_eq!(
            evaluate(&at(StepName::Plan, 10_000, 0)),
            Decision::allow(Tier::Standard, Reason::DefaultAllow)
        );
    }

    #[test]
    fn test_matching_rule_names_branch() {
        assert_eq!(matching_rule(&at(StepName::Plan, 10_000, 500)).name, "plan_premium");
        assert_eq!(matching_rule(&at(StepName::Execute, 500, 500)).name, "budget_exhausted");
        assert_eq!(matching_rule(&at(StepName::Execute, 1_200, 500)).name, "protect_standard");
    }

    #[test]
    fn test_pure() {
        let c = at(StepName::Execute, 3_300, 150);
        let first = PolicyEvaluator.evaluate(&c);
        for _ in 0..100 {
            assert_eq!(PolicyEvaluator.evaluate(&c), first);
        }
    }

    #[test]
    fn test_ignores_priority_and_run_id() {
        let plain = at(StepName::Plan, 5_000, 300);
        let tagged = plain.clone().with_priority("urgent").with_run_id("run-1");
        assert_eq!(evaluate(&plain), evaluate(&tagged));
    }
}
