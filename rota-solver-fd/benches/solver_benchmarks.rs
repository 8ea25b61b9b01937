//! Criterion benchmarks for the finite-domain solver.
//!
//! Measures roster model construction and bounded solve runs across roster
//! sizes to track propagation cost and detect regressions.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package rota-solver-fd
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rota_core::{RosterModel, SolvePlan, solve_roster};
use rota_solver_fd::FdSolver;


use bench_support::{BENCHMARK_SEED, roster_config};

/// Staff counts to benchmark, each over four weeks.
const STAFF_SIZES: &[usize] = &[10, 20, 40];

/// Days in every benchmark roster.
const DAYS: usize = 28;

/// Failure budget per solve, keeping each sample bounded.
const FAILURE_LIMIT: u64 = 2_000;

/// Benchmark building the constraint model for each roster size.
fn bench_model_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_build");
    for &staff in STAFF_SIZES {
        let config = roster_config(staff, DAYS, BENCHMARK_SEED);
        group.throughput(Throughput::Elements(u64::try_from(staff).unwrap_or(u64::MAX)));
        group.bench_with_input(BenchmarkId::new("staff", staff), &config, |b, input| {
            b.iter(|| {
                #[expect(
                    clippy::let_underscore_must_use,
                    reason = "Benchmarking construction, result is intentionally discarded"
                )]
                let _ = RosterModel::build(input.clone());
            });
        });
    }
    group.finish();
}

/// Benchmark one bounded solve attempt per roster size.
///
/// Each run stops at the first proven answer or after [`FAILURE_LIMIT`]
/// failures, so the figure tracks propagation throughput rather than luck.
fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    let solver = FdSolver::new();
    let plan = SolvePlan::default()
        .with_seed(BENCHMARK_SEED)
        .with_failure_limit(Some(FAILURE_LIMIT));
    for &staff in STAFF_SIZES {
        let Ok(roster) = RosterModel::build(roster_config(staff, DAYS, BENCHMARK_SEED)) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("staff", staff), &roster, |b, input| {
            b.iter(|| {
                #[expect(
                    clippy::let_underscore_must_use,
                    reason = "Benchmarking solve performance, result is intentionally discarded"
                )]
                let _ = solve_roster(input, &solver, &plan);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_model_build, bench_solve);
criterion_main!(benches);
