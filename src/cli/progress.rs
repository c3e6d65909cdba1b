// src/cli/progress.rs — Terminal progress lines for `tiergate run`

use crate::core::types::ProgressEvent;

/// Build a progress callback that writes one line per event to stderr.
///
/// stdout stays reserved for the final JSON result.
pub fn terminal_progress() -> impl Fn(ProgressEvent) + Send + Sync + 'static {
    move |event| eprintln!("{}", format_event(&event))
}

pub fn format_event(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::RunStarted { run_id, budget } => {
            format!("[run] {} budget={}", run_id, budget)
        }
        ProgressEvent::StepDecided { step, decision } => match decision.tier {
            Some(tier) if decision.allowed => {
                format!("[{}] -> {:<8} ({})", step, tier.as_str(), decision.reason)
            }
            _ => format!("[{}] hard stop ({})", step, decision.reason),
        },
        ProgressEvent::StepCharged { outcome, remaining } => format!(
            "[{}]   cost={} latency={}ms remaining={}",
            outcome.step, outcome.cost, outcome.latency_ms, remaining,
        ),
        ProgressEvent::Finished {
            status,
            total_cost,
            total_latency_ms,
        } => format!(
            "[done] status={} cost={} latency={}ms",
            status, total_cost, total_latency_ms,
        ),
    }
}
