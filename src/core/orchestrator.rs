// src/core/orchestrator.rs — Step loop controller

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::time::Instant;

use super::budget::{Amount, BudgetState};
use super::catalog::POLICY_VERSION;
use super::metrics::MetricsAggregator;
use super::types::*;
use crate::infra::errors::GateError;
use crate::provider::DecisionProvider;

/// Placeholder payload returned with every run.
pub const RESULT_MARKER: &str = "simulated agent result";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Wait out each tier's latency. When off, steps complete immediately but
    /// still report the tier latency in their trace entry.
    pub simulate_latency: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            simulate_latency: true,
        }
    }
}

/// Drives `plan → execute → summarize` for one request at a time.
///
/// Holds no per-run state, so a single instance can serve concurrent runs.
pub struct Orchestrator {
    provider: Arc<dyn DecisionProvider>,
    metrics: Arc<MetricsAggregator>,
    config: OrchestratorConfig,
    /// Optional callback for real-time progress events.
    on_progress: Option<Box<dyn Fn(ProgressEvent) + Send + Sync>>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn DecisionProvider>,
        metrics: Arc<MetricsAggregator>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            metrics,
            config,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, cb: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    /// Run all steps for `request`.
    pub async fn run(&self, request: &RunRequest) -> Result<RunResult, GateError> {
        self.run_until(request, std::future::pending::<()>()).await
    }

    /// Like [`run`](Self::run), but `cancel` resolving cuts the current latency
    /// wait short and ends the run with `RunStatus::Cancelled`.
    ///
    /// A cancelled step has already been charged, so it stays in the trace with
    /// the latency actually waited.
    pub async fn run_until<F>(&self, request: &RunRequest, cancel: F) -> Result<RunResult, GateError>
    where
        F: Future<Output = ()>,
    {
        let total = request.validate()?;
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        tokio::pin!(cancel);

        self.metrics.inc_run();
        tracing::info!(
            run_id = %run_id,
            budget = %total,
            latency_sla_ms = request.latency_sla_ms,
            provider = self.provider.id(),
            "Run started",
        );
        self.emit(ProgressEvent::RunStarted {
            run_id: run_id.clone(),
            budget: total,
        });

        let mut budget = BudgetState::new(total);
        let mut steps: Vec<StepOutcome> = Vec::with_capacity(StepName::ALL.len());
        let mut total_cost = Amount::ZERO;
        let mut status = RunStatus::Completed;

        for step in StepName::ALL {
            let ctx = EvaluationContext::new(
                step,
                budget.total(),
                budget.remaining(),
                request.latency_sla_ms,
            )
            .with_priority(request.priority.clone())
            .with_run_id(run_id.clone());

            let decision = self.provider.evaluate(&ctx).await.inspect_err(|e| {
                tracing::error!(run_id = %run_id, step = %step, "Decision provider failed: {e}");
            })?;
            tracing::debug!(
                run_id = %run_id,
                step = %step,
                ratio = budget.ratio().as_f64(),
                tier = ?decision.tier,
                reason = %decision.reason,
                "Step decided",
            );
            self.emit(ProgressEvent::StepDecided { step, decision });

            if decision.hard_stop {
                self.metrics.inc_hard_stop();
                tracing::info!(
                    run_id = %run_id,
                    step = %step,
                    reason = %decision.reason,
                    "Hard stop, ending run early",
                );
                status = RunStatus::HardStopped;
                break;
            }

            let tier = match decision.tier {
                Some(tier) if decision.allowed => tier,
                _ => {
                    return Err(GateError::provider(
                        self.provider.id(),
                        format!("decision for step '{step}' neither allows a tier nor hard-stops"),
                    ))
                }
            };

            let cost = tier.cost();
            let remaining = budget.charge(cost).map_err(|refused| {
                tracing::warn!(
                    run_id = %run_id,
                    step = %step,
                    tier = %tier,
                    cost = %refused.cost,
                    remaining = %refused.remaining,
                    "Tier cost exceeds remaining budget, aborting run",
                );
                GateError::BudgetExceeded {
                    step,
                    tier,
                    cost: refused.cost,
                    remaining: refused.remaining,
                }
            })?;
            total_cost += cost;

            let (latency_ms, cancelled) = self.simulate_latency(tier, cancel.as_mut()).await;

            let outcome = StepOutcome {
                step,
                tier,
                cost,
                latency_ms,
                reason: decision.reason,
            };
            self.record_step(&outcome);
            self.emit(ProgressEvent::StepCharged {
                outcome: outcome.clone(),
                remaining,
            });
            steps.push(outcome);

            if cancelled {
                tracing::info!(run_id = %run_id, step = %step, "Run cancelled during step");
                status = RunStatus::Cancelled;
                break;
            }
        }

        let total_latency_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            run_id = %run_id,
            status = %status,
            steps = steps.len(),
            total_cost = %total_cost,
            total_latency_ms,
            "Run finished",
        );
        self.emit(ProgressEvent::Finished {
            status,
            total_cost,
            total_latency_ms,
        });

        Ok(RunResult {
            run_id,
            result: RESULT_MARKER.into(),
            status,
            total_cost,
            total_latency_ms,
            budget_remaining: budget.remaining(),
            policy_version: POLICY_VERSION.into(),
            steps,
        })
    }

    /// Wait out `tier`'s latency unless `cancel` fires first.
    /// Returns the latency to record and whether the run was cancelled.
    async fn simulate_latency<F>(&self, tier: Tier, cancel: Pin<&mut F>) -> (u64, bool)
    where
        F: Future<Output = ()>,
    {
        let planned = u64::from(tier.latency_ms());
        if !self.config.simulate_latency {
            return (planned, false);
        }

        let wait_start = Instant::now();
        tokio::select! {
            biased;
            _ = cancel => (wait_start.elapsed().as_millis() as u64, true),
            _ = tokio::time::sleep(tier.latency()) => (planned, false),
        }
    }

    fn record_step(&self, outcome: &StepOutcome) {
        let m = &self.metrics;
        m.inc_step(outcome.step, outcome.tier);
        m.add_cost(outcome.cost);

        let baseline = outcome.step.baseline_tier();
        if outcome.tier != baseline {
            m.inc_downgrade(outcome.reason);
            if outcome.cost < baseline.cost() {
                m.add_cost_saved(baseline.cost() - outcome.cost);
            }
        }
        if outcome.reason.is_sla_driven() {
            m.inc_sla_prevented();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LocalPolicy;

    fn orchestrator(simulate_latency: bool) -> Orchestrator {
        Orchestrator::new(
            Arc::new(LocalPolicy),
            Arc::new(MetricsAggregator::new()),
            OrchestratorConfig { simulate_latency },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_latency_is_sum_of_tiers() {
        let o = orchestrator(true);
        let result = o.run(&RunRequest::new("goal", 1.0, 500)).await.unwrap();
        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.total_latency_ms, 450 + 200 + 80);
        assert_eq!(result.result, RESULT_MARKER);
        assert_eq!(result.policy_version, POLICY_VERSION);
    }

    #[tokio::test]
    async fn test_no_simulation_reports_tier_latency() {
        let o = orchestrator(false);
        let result = o.run(&RunRequest::new("goal", 1.0, 500)).await.unwrap();
        let latencies: Vec<u64> = result.steps.iter().map(|s| s.latency_ms).collect();
        assert_eq!(latencies, vec![450, 200, 80]);
    }

    #[tokio::test]
    async fn test_validation_happens_before_counting() {
        let o = orchestrator(false);
        let err = o.run(&RunRequest::new("goal", 0.0, 500)).await.unwrap_err();
        assert!(matches!(err, GateError::Validation(_)));
        assert_eq!(o.metrics().snapshot().agent_runs_total, 0);
    }

    #[tokio::test]
    async fn test_progress_events_in_order() {
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let o = orchestrator(false).with_progress(move |e| {
            let tag = match e {
                ProgressEvent::RunStarted { .. } => "start",
                ProgressEvent::StepDecided { .. } => "decided",
                ProgressEvent::StepCharged { .. } => "charged",
                ProgressEvent::Finished { .. } => "finished",
            };
            sink.lock().unwrap().push(tag);
        });
        o.run(&RunRequest::new("goal", 1.0, 500)).await.unwrap();
        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "start", "decided", "charged", "decided", "charged", "decided", "charged",
                "finished"
            ]
        );
    }
}
