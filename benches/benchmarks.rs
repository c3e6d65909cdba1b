// benches/benchmarks.rs — Performance benchmarks (criterion)
//
//   1. Policy evaluation across the rule ladder
//   2. A full in-process run without latency simulation
//   3. PII scanning of chat messages

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tiergate::core::budget::Amount;
use tiergate::core::metrics::MetricsAggregator;
use tiergate::core::orchestrator::{Orchestrator, OrchestratorConfig};
use tiergate::core::policy;
use tiergate::core::types::{EvaluationContext, RunRequest, StepName};
use tiergate::gateway::scanner::PiiScanner;
use tiergate::provider::LocalPolicy;

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Contexts that land on every rung of the ladder.
fn contexts() -> Vec<EvaluationContext> {
    let total = Amount::from_micros(1_000_000);
    let mut out = Vec::new();
    for step in StepName::ALL {
        for remaining in [1_000_000, 350_000, 200_000, 50_000] {
            for sla in [0, 100, 250, 500] {
                out.push(EvaluationContext::new(
                    step,
                    total,
                    Amount::from_micros(remaining),
                    sla,
                ));
            }
        }
    }
    out
}

// ─── Benchmark: Policy ──────────────────────────────────────────────────────

fn bench_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy");
    let ctxs = contexts();

    group.bench_function("evaluate_single", |b| {
        let ctx = &ctxs[0];
        b.iter(|| policy::evaluate(black_box(ctx)))
    });

    group.bench_function("evaluate_ladder_sweep", |b| {
        b.iter(|| {
            for ctx in &ctxs {
                black_box(policy::evaluate(black_box(ctx)));
            }
        })
    });

    group.finish();
}

// ─── Benchmark: Run loop ────────────────────────────────────────────────────

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("build runtime");

    let orchestrator = Orchestrator::new(
        Arc::new(LocalPolicy),
        Arc::new(MetricsAggregator::new()),
        OrchestratorConfig {
            simulate_latency: false,
        },
    );

    group.bench_function("full_run_healthy", |b| {
        let request = RunRequest::new("bench", 1.0, 500);
        b.iter(|| {
            rt.block_on(orchestrator.run(black_box(&request)))
                .expect("run")
        })
    });

    group.bench_function("full_run_hard_stop", |b| {
        let request = RunRequest::new("bench", 0.033, 200);
        b.iter(|| {
            rt.block_on(orchestrator.run(black_box(&request)))
                .expect("run")
        })
    });

    group.finish();
}

// ─── Benchmark: PII scanning ────────────────────────────────────────────────

fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");
    let scanner = PiiScanner::new().expect("compile patterns");

    let clean = "Summarize the design review notes and list open action items for the team. "
        .repeat(20);
    let dirty = format!(
        "{clean} Reach me at jane.doe@example.com or 555-867-5309, SSN 123-45-6789."
    );

    group.bench_function("scan_clean", |b| b.iter(|| scanner.scan(black_box(&clean))));
    group.bench_function("scan_with_pii", |b| b.iter(|| scanner.scan(black_box(&dirty))));

    group.finish();
}

// ─── Main ───────────────────────────────────────────────────────────────────

criterion_group!(benches, bench_policy, bench_run, bench_scanner);
criterion_main!(benches);
