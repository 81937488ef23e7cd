//! Run reports and serialization

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::Tick;
use crate::sched::SchedulerKind;
use crate::sim::metrics::{Metrics, MetricsSeries, SummaryStats};

/// Everything a finished run exports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub scheduler: SchedulerKind,
    pub seed: u64,
    /// RNG stream within the seed; trial batches give each run its own
    pub stream: u64,
    pub num_cores: usize,
    pub duration: Tick,
    pub runtime_ms: u64,
    pub summary: SummaryStats,
    pub series: MetricsSeries,
}

impl SimulationReport {
    pub fn new(
        scheduler: SchedulerKind,
        seed: u64,
        stream: u64,
        config: &SimulationConfig,
        metrics: Metrics,
        elapsed: Duration,
    ) -> Self {
        let summary = metrics.summary();
        Self {
            scheduler,
            seed,
            stream,
            num_cores: config.num_cores,
            duration: config.duration,
            runtime_ms: elapsed.as_millis() as u64,
            summary,
            series: metrics.into_series(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    /// One-line digest for console output
    pub fn summary_line(&self) -> String {
        let isolation = match self.summary.avg_isolation_latency {
            Some(avg) => format!("{:.2} ticks", avg),
            None => "n/a".to_string(),
        };
        format!(
            "{:<10}  util {:6.2}%  hotspots {:6}  isolation {:>12}  tasks {}/{}",
            self.scheduler.name(),
            self.summary.cpu_utilization_pct,
            self.summary.thermal_hotspots,
            isolation,
            self.summary.tasks_completed,
            self.summary.tasks_arrived,
        )
    }
}

/// Averages across a batch of trial reports for one policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSummary {
    pub scheduler: SchedulerKind,
    pub trials: u64,
    pub mean_cpu_utilization_pct: f64,
    pub mean_thermal_hotspots: f64,
    /// Mean of the per-trial isolation latencies, over trials that isolated
    /// anything; `None` when no trial did
    pub mean_isolation_latency: Option<f64>,
    pub total_isolation_events: u64,
}

impl TrialSummary {
    /// Collapse a trial batch; `None` for an empty batch
    pub fn from_reports(reports: &[SimulationReport]) -> Option<Self> {
        let first = reports.first()?;
        let n = reports.len() as f64;

        let mean_cpu_utilization_pct = reports
            .iter()
            .map(|r| r.summary.cpu_utilization_pct)
            .sum::<f64>()
            / n;
        let mean_thermal_hotspots = reports
            .iter()
            .map(|r| r.summary.thermal_hotspots as f64)
            .sum::<f64>()
            / n;

        let latencies: Vec<f64> = reports
            .iter()
            .filter_map(|r| r.summary.avg_isolation_latency)
            .collect();
        let mean_isolation_latency = if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
        };

        Some(Self {
            scheduler: first.scheduler,
            trials: reports.len() as u64,
            mean_cpu_utilization_pct,
            mean_thermal_hotspots,
            mean_isolation_latency,
            total_isolation_events: reports.iter().map(|r| r.summary.isolation_events).sum(),
        })
    }

    /// One-line digest for console output
    pub fn summary_line(&self) -> String {
        let isolation = match self.mean_isolation_latency {
            Some(avg) => format!("{:.2} ticks", avg),
            None => "n/a".to_string(),
        };
        format!(
            "{:<10}  util {:6.2}%  hotspots {:9.1}  isolation {:>12}  ({} trials)",
            self.scheduler.name(),
            self.mean_cpu_utilization_pct,
            self.mean_thermal_hotspots,
            isolation,
            self.trials,
        )
    }
}
