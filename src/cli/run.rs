// src/cli/run.rs — One in-process run

use std::sync::Arc;

use crate::cli::progress;
use crate::core::metrics::MetricsAggregator;
use crate::core::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::core::types::{RunRequest, RunResult};
use crate::infra::config::Config;
use crate::provider::{self, DecisionProvider, LocalPolicy};

pub struct RunArgs {
    pub goal: String,
    pub budget: f64,
    pub sla: u32,
    pub priority: String,
    pub local: bool,
    pub quiet: bool,
}

/// Execute one request and print the `RunResult` JSON to stdout.
///
/// Ctrl-C cancels the run; the partial result is still printed.
pub async fn run_once(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let provider: Arc<dyn DecisionProvider> = if args.local {
        Arc::new(LocalPolicy)
    } else {
        provider::from_config(&config.policy)?
    };
    tracing::debug!("Using decision provider '{}'", provider.id());

    let mut orchestrator = Orchestrator::new(
        provider,
        Arc::new(MetricsAggregator::new()),
        OrchestratorConfig {
            simulate_latency: config.executor.simulate_latency,
        },
    );
    if !args.quiet {
        orchestrator = orchestrator.with_progress(progress::terminal_progress());
    }

    let mut request = RunRequest::new(args.goal, args.budget, args.sla);
    request.priority = args.priority;

    let result = orchestrator
        .run_until(&request, async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No signal handler available; never cancel.
                std::future::pending::<()>().await;
            }
        })
        .await?;

    print_result(&result)
}

fn print_result(result: &RunResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
