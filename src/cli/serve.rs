// src/cli/serve.rs — Long-running HTTP services

use std::sync::Arc;

use crate::api::{self, ApiState};
use crate::core::metrics::MetricsAggregator;
use crate::core::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::gateway::{self, GatewayState};
use crate::infra::config::{self, Config};
use crate::provider;

/// `--port` beats `PORT`, which beats the config file.
pub fn resolve_port(flag: Option<u16>, env: Option<u16>, configured: u16) -> u16 {
    flag.or(env).unwrap_or(configured)
}

fn addr(bind: &str, port: u16) -> String {
    format!("{bind}:{port}")
}

/// Executor API backed by the configured decision provider.
pub async fn serve_executor(port: Option<u16>, config: &Config) -> anyhow::Result<()> {
    let port = resolve_port(port, config::env_port(), config.executor.port);
    let provider = provider::from_config(&config.policy)?;
    tracing::info!("Decision provider: {}", provider.id());

    let orchestrator = Orchestrator::new(
        provider,
        Arc::new(MetricsAggregator::new()),
        OrchestratorConfig {
            simulate_latency: config.executor.simulate_latency,
        },
    );
    let state = ApiState::new(orchestrator, config.api.token.clone());
    api::serve(
        "Agent executor",
        &addr(&config.executor.bind, port),
        api::build_router(state),
    )
    .await
}

pub async fn serve_policy(port: Option<u16>, config: &Config) -> anyhow::Result<()> {
    let port = resolve_port(port, config::env_port(), config.policy_server.port);
    api::serve(
        "Policy engine",
        &addr(&config.policy_server.bind, port),
        api::policy::build_router(),
    )
    .await
}

pub async fn serve_gateway(port: Option<u16>, config: &Config) -> anyhow::Result<()> {
    let port = resolve_port(port, config::env_port(), config.gateway.port);
    let state = GatewayState::from_config(&config.gateway)?;
    gateway::serve(&addr(&config.gateway.bind, port), state).await
}
