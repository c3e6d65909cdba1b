// src/cli/mod.rs — CLI definition (clap derive)

pub mod evaluate;
pub mod progress;
pub mod run;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::core::types::StepName;

#[derive(Parser)]
#[command(
    name = "tiergate",
    about = "Budget-gated tier selection for multi-step agent runs",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the executor API (POST /agent/run, GET /metrics)
    Serve {
        /// Port to listen on (overrides PORT and config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Start the policy engine API (POST /policy/evaluate)
    PolicyServer {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Start the PII-screening completion gateway
    Gateway {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one request in-process and print the result as JSON
    Run {
        /// Free-form goal text
        #[arg(long)]
        goal: String,
        /// Total budget in currency units
        #[arg(long)]
        budget: f64,
        /// Per-step latency SLA in milliseconds
        #[arg(long, default_value = "500")]
        sla: u32,
        #[arg(long, default_value = "normal")]
        priority: String,
        /// Evaluate policy in-process instead of calling the policy engine
        #[arg(long)]
        local: bool,
        /// Suppress progress output (only emit final result)
        #[arg(long)]
        quiet: bool,
    },
    /// Evaluate the policy for a single step and print the decision
    Evaluate {
        /// plan, execute or summarize
        #[arg(long)]
        step: StepName,
        /// Total budget
        #[arg(long)]
        total: f64,
        /// Remaining budget
        #[arg(long)]
        remaining: f64,
        #[arg(long, default_value = "500")]
        sla: u32,
    },
}
