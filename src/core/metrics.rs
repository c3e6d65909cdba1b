// src/core/metrics.rs — Process-wide run counters

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::budget::Amount;
use super::types::{Reason, StepName, Tier};

#[derive(Debug, Default)]
struct Counters {
    runs: u64,
    steps: BTreeMap<StepName, BTreeMap<Tier, u64>>,
    downgrades: BTreeMap<Reason, u64>,
    hard_stops: u64,
    cost: Amount,
    cost_saved: Amount,
    sla_prevented: u64,
}

/// Counters shared by every run in the process.
///
/// Construct one and hand an `Arc` of it to each orchestrator. Each update
/// takes the lock once, so concurrent runs never lose an increment.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    inner: Mutex<Counters>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is ignored: every update is a single statement.
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn inc_run(&self) {
        self.lock().runs += 1;
    }

    pub fn inc_step(&self, step: StepName, tier: Tier) {
        *self
            .lock()
            .steps
            .entry(step)
            .or_default()
            .entry(tier)
            .or_default() += 1;
    }

    pub fn inc_downgrade(&self, reason: Reason) {
        *self.lock().downgrades.entry(reason).or_default() += 1;
    }

    pub fn inc_hard_stop(&self) {
        self.lock().hard_stops += 1;
    }

    pub fn add_cost(&self, cost: Amount) {
        self.lock().cost += cost;
    }

    pub fn add_cost_saved(&self, saved: Amount) {
        self.lock().cost_saved += saved;
    }

    pub fn inc_sla_prevented(&self) {
        self.lock().sla_prevented += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = self.lock();
        MetricsSnapshot {
            agent_runs_total: c.runs,
            agent_steps_total: c.steps.clone(),
            agent_downgrades_total: c.downgrades.clone(),
            agent_hard_stops_total: c.hard_stops,
            agent_cost_total: c.cost,
            agent_cost_saved: c.cost_saved,
            sla_violations_prevented: c.sla_prevented,
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub agent_runs_total: u64,
    pub agent_steps_total: BTreeMap<StepName, BTreeMap<Tier, u64>>,
    pub agent_downgrades_total: BTreeMap<Reason, u64>,
    pub agent_hard_stops_total: u64,
    pub agent_cost_total: Amount,
    pub agent_cost_saved: Amount,
    pub sla_violations_prevented: u64,
}

impl MetricsSnapshot {
    pub fn steps_for(&self, step: StepName, tier: Tier) -> u64 {
        self.agent_steps_total
            .get(&step)
            .and_then(|tiers| tiers.get(&tier))
            .copied()
            .unwrap_or(0)
    }

    pub fn downgrades_for(&self, reason: Reason) -> u64 {
        self.agent_downgrades_total.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_steps(&self) -> u64 {
        self.agent_steps_total
            .values()
            .flat_map(|tiers| tiers.values())
            .sum()
    }

    /// Prometheus text exposition of the snapshot.
    pub fn render_prometheus(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# TYPE agent_runs_total counter");
        let _ = writeln!(out, "agent_runs_total {}", self.agent_runs_total);

        let _ = writeln!(out, "# TYPE agent_steps_total counter");
        for (step, tiers) in &self.agent_steps_total {
            for (tier, count) in tiers {
                let _ = writeln!(
                    out,
                    "agent_steps_total{{step=\"{step}\",tier=\"{tier}\"}} {count}"
                );
            }
        }

        let _ = writeln!(out, "# TYPE agent_downgrades_total counter");
        for (reason, count) in &self.agent_downgrades_total {
            let _ = writeln!(out, "agent_downgrades_total{{reason=\"{reason}\"}} {count}");
        }

        let _ = writeln!(out, "# TYPE agent_hard_stops_total counter");
        let _ = writeln!(out, "agent_hard_stops_total {}", self.agent_hard_stops_total);
        let _ = writeln!(out, "# TYPE agent_cost_total counter");
        let _ = writeln!(out, "agent_cost_total {}", self.agent_cost_total);
        let _ = writeln!(out, "# TYPE agent_cost_saved counter");
        let _ = writeln!(out, "agent_cost_saved {}", self.agent_cost_saved);
        let _ = writeln!(out, "# TYPE sla_violations_prevented counter");
        let _ = writeln!(out, "sla_violations_prevented {}", self.sla_violations_prevented);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_is_empty() {
        let m = MetricsAggregator::new();
        let s = m.snapshot();
        assert_eq!(s, MetricsSnapshot::default());
        assert_eq!(s.total_steps(), 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let m = MetricsAggregator::new();
        m.inc_run();
        m.inc_run();
        m.inc_step(StepName::Plan, Tier::Premium);
        m.inc_step(StepName::Plan, Tier::Premium);
        m.inc_step(StepName::Execute, Tier::Cheap);
        m.inc_downgrade(Reason::ExecutionCheapSlaConstrained);
        m.inc_hard_stop();
        m.add_cost(Amount::from_micros(30_000));
        m.add_cost(Amount::from_micros(5_000));
        m.add_cost_saved(Amount::from_micros(10_000));
        m.inc_sla_prevented();

        let s = m.snapshot();
        assert_eq!(s.agent_runs_total, 2);
        assert_eq!(s.steps_for(StepName::Plan, Tier::Premium), 2);
        assert_eq!(s.steps_for(StepName::Execute, Tier::Cheap), 1);
        assert_eq!(s.steps_for(StepName::Summarize, Tier::Cheap), 0);
        assert_eq!(s.total_steps(), 3);
        assert_eq!(s.downgrades_for(Reason::ExecutionCheapSlaConstrained), 1);
        assert_eq!(s.agent_hard_stops_total, 1);
        assert_eq!(s.agent_cost_total, Amount::from_micros(35_000));
        assert_eq!(s.agent_cost_saved, Amount::from_micros(10_000));
        assert_eq!(s.sla_violations_prevented, 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let m = MetricsAggregator::new();
        let before = m.snapshot();
        m.inc_run();
        assert_eq!(before.agent_runs_total, 0);
        assert_eq!(m.snapshot().agent_runs_total, 1);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let m = Arc::new(MetricsAggregator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&m);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        m.inc_run();
                        m.inc_step(StepName::Summarize, Tier::Cheap);
                        m.add_cost(Amount::from_micros(5_000));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let s = m.snapshot();
        assert_eq!(s.agent_runs_total, 8_000);
        assert_eq!(s.steps_for(StepName::Summarize, Tier::Cheap), 8_000);
        assert_eq!(s.agent_cost_total, Amount::from_micros(40_000_000));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let m = MetricsAggregator::new();
        m.inc_step(StepName::Execute, Tier::Standard);
        m.inc_downgrade(Reason::BudgetProtectionCheap);
        m.add_cost(Amount::from_micros(15_000));
        let json = serde_json::to_value(m.snapshot()).unwrap();
        assert_eq!(json["agent_steps_total"]["execute"]["standard"], 1);
        assert_eq!(json["agent_downgrades_total"]["budget_protection_cheap"], 1);
        assert_eq!(json["agent_cost_total"], 0.015);
        assert_eq!(json["agent_runs_total"], 0);
    }

    #[test]
    fn test_render_prometheus() {
        let m = MetricsAggregator::new();
        m.inc_run();
        m.inc_step(StepName::Plan, Tier::Standard);
        m.inc_downgrade(Reason::PlanningStandardSlaConstrained);
        m.add_cost_saved(Amount::from_micros(15_000));
        let text = m.snapshot().render_prometheus();
        assert!(text.contains("agent_runs_total 1\n"));
        assert!(text.contains("agent_steps_total{step=\"plan\",tier=\"standard\"} 1\n"));
        assert!(text.contains(
            "agent_downgrades_total{reason=\"planning_standard_sla_constrained\"} 1\n"
        ));
        assert!(text.contains("agent_cost_saved 0.015\n"));
    }
}
