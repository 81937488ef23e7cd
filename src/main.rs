//! Scheduling policy comparison driver
//!
//! Runs a trial batch of every policy on the default cluster and prints the
//! averaged results side by side. Optional arguments: `<seed> <trials>`.

use std::time::Instant;

use sentinel_sched::core::config::SimulationConfig;
use sentinel_sched::core::error::Result;
use sentinel_sched::sched::SchedulerKind;
use sentinel_sched::sim::environment::run_trials;
use sentinel_sched::sim::report::{SimulationReport, TrialSummary};

const DEFAULT_SEED: u64 = 42;
const DEFAULT_TRIALS: u64 = 30;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);
    let trials = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TRIALS);

    let config = SimulationConfig::default();

    println!("CPU Scheduling Strategy Simulator");
    println!("=================================");
    println!(
        "Cluster: {} cores, {} ticks per run",
        config.num_cores, config.duration
    );
    println!(
        "Workload: {:.1} arrivals / 1000 ticks, {:.0}% malicious",
        config.arrival_rate,
        config.threat_probability * 100.0
    );
    println!("Trials per policy: {} (seed {})", trials, seed);
    println!();

    let start = Instant::now();
    let mut all_reports: Vec<SimulationReport> = Vec::new();

    for kind in SchedulerKind::ALL {
        let reports = run_trials(&config, kind, seed, trials)?;
        if let Some(summary) = TrialSummary::from_reports(&reports) {
            println!("{}", summary.summary_line());
        }
        all_reports.extend(reports);
    }

    println!();
    println!("Total time: {:.2}s", start.elapsed().as_secs_f64());

    let json = serde_json::to_string_pretty(&all_reports)?;
    std::fs::write("simulation_report.json", json)?;
    println!("Full reports written to simulation_report.json");

    Ok(())
}
