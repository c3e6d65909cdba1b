// src/main.rs — tiergate entry point

use clap::Parser;

use tiergate::cli::run::{run_once, RunArgs};
use tiergate::cli::{evaluate, serve, Cli, Commands};
use tiergate::infra::config::Config;
use tiergate::infra::logger;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG / TIERGATE_LOG)
    logger::init_logging("info");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };
    config.apply_env_overrides();

    match cli.command {
        Commands::Serve { port } => serve::serve_executor(port, &config).await,
        Commands::PolicyServer { port } => serve::serve_policy(port, &config).await,
        Commands::Gateway { port } => serve::serve_gateway(port, &config).await,
        Commands::Run {
            goal,
            budget,
            sla,
            priority,
            local,
            quiet,
        } => {
            let args = RunArgs {
                goal,
                budget,
                sla,
                priority,
                local,
                quiet,
            };
            run_once(args, &config).await
        }
        Commands::Evaluate {
            step,
            total,
            remaining,
            sla,
        } => evaluate::evaluate_step(step, total, remaining, sla),
    }
}
