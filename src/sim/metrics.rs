//! Metrics collection and summary statistics

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::Tick;
use crate::sim::cluster::Core;
use crate::sim::task::Task;

/// Per-run metrics collector
///
/// Cumulative counters (busy core-ticks, hotspot core-ticks, arrivals,
/// completions) accrue every tick. The time series additionally samples the
/// cluster every `metrics_interval` ticks.
pub struct Metrics {
    num_cores: usize,
    duration: Tick,
    interval: Tick,
    hotspot_threshold: f64,

    total_busy_ticks: u64,
    interval_busy_ticks: u64,
    hotspot_core_ticks: u64,
    tasks_arrived: u64,
    tasks_completed: u64,
    isolation_latencies: Vec<u64>,

    series: MetricsSeries,
}

/// Sampled time series, one entry per metrics interval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSeries {
    pub ticks: Vec<Tick>,
    pub avg_temperature: Vec<f64>,
    /// Utilization within the interval just ended, in percent
    pub cpu_utilization_pct: Vec<f64>,
    /// Malicious tasks alive (running or queued), by ground truth
    pub active_threats: Vec<u32>,
}

/// End-of-run aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Busy core-ticks over `num_cores * duration`, in percent
    pub cpu_utilization_pct: f64,
    /// Core-ticks spent above the hotspot threshold
    pub thermal_hotspots: u64,
    /// Mean ticks from detection to completion; `None` when no detected
    /// task completed
    pub avg_isolation_latency: Option<f64>,
    pub isolation_events: u64,
    pub tasks_arrived: u64,
    pub tasks_completed: u64,
}

impl Metrics {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            num_cores: config.num_cores,
            duration: config.duration,
            interval: config.metrics_interval,
            hotspot_threshold: config.thermal.hotspot_threshold,
            total_busy_ticks: 0,
            interval_busy_ticks: 0,
            hotspot_core_ticks: 0,
            tasks_arrived: 0,
            tasks_completed: 0,
            isolation_latencies: Vec::new(),
            series: MetricsSeries::default(),
        }
    }

    /// Accrue this tick's counters; samples the series on interval
    /// boundaries (tick 0 included)
    pub fn on_tick(&mut self, cores: &[Core], queue: &[Task], tick: Tick) {
        let busy = cores.iter().filter(|c| !c.is_idle()).count() as u64;
        self.total_busy_ticks += busy;
        self.interval_busy_ticks += busy;
        self.hotspot_core_ticks += cores
            .iter()
            .filter(|c| c.temperature > self.hotspot_threshold)
            .count() as u64;

        if tick % self.interval == 0 {
            self.sample(cores, queue, tick);
        }
    }

    fn sample(&mut self, cores: &[Core], queue: &[Task], tick: Tick) {
        let avg_temperature =
            cores.iter().map(|c| c.temperature).sum::<f64>() / cores.len() as f64;
        let utilization = self.interval_busy_ticks as f64
            / (self.num_cores as f64 * self.interval as f64)
            * 100.0;
        self.interval_busy_ticks = 0;

        let running_threats = cores
            .iter()
            .filter(|c| c.current_task.as_ref().map(|t| t.malicious).unwrap_or(false))
            .count();
        let queued_threats = queue.iter().filter(|t| t.malicious).count();

        self.series.ticks.push(tick);
        self.series.avg_temperature.push(avg_temperature);
        self.series.cpu_utilization_pct.push(utilization);
        self.series
            .active_threats
            .push((running_threats + queued_threats) as u32);
    }

    pub fn record_arrival(&mut self) {
        self.tasks_arrived += 1;
    }

    /// Record a finished task; a task that carries a detection tick also
    /// contributes an isolation latency (completion minus detection)
    pub fn record_completion(&mut self, task: &Task, tick: Tick) {
        self.tasks_completed += 1;
        if let Some(detected_at) = task.detection_tick {
            self.isolation_latencies.push(tick - detected_at);
        }
    }

    pub fn tasks_arrived(&self) -> u64 {
        self.tasks_arrived
    }

    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed
    }

    pub fn series(&self) -> &MetricsSeries {
        &self.series
    }

    pub fn summary(&self) -> SummaryStats {
        let avg_isolation_latency = if self.isolation_latencies.is_empty() {
            None
        } else {
            let total: u64 = self.isolation_latencies.iter().sum();
            Some(total as f64 / self.isolation_latencies.len() as f64)
        };

        SummaryStats {
            cpu_utilization_pct: self.total_busy_ticks as f64
                / (self.num_cores as f64 * self.duration as f64)
                * 100.0,
            thermal_hotspots: self.hotspot_core_ticks,
            avg_isolation_latency,
            isolation_events: self.isolation_latencies.len() as u64,
            tasks_arrived: self.tasks_arrived,
            tasks_completed: self.tasks_completed,
        }
    }

    pub fn into_series(self) -> MetricsSeries {
        self.series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TaskId;
    use crate::sim::cluster::build_cluster;

    fn config(num_cores: usize, duration: Tick, interval: Tick) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.num_cores = num_cores;
        config.duration = duration;
        config.metrics_interval = interval;
        config
    }

    fn running_task(id: u64, malicious: bool) -> Task {
        Task::new(TaskId(id), 0, 100, 1, malicious)
    }

    #[test]
    fn utilization_counts_busy_core_ticks() {
        let mut metrics = Metrics::new(&config(2, 10, 200));
        let mut cores = build_cluster(2, 40.0);
        cores[0].assign(running_task(0, false));

        for tick in 1..=10 {
            metrics.on_tick(&cores, &[], tick);
        }

        // One of two cores busy for all 10 ticks: 50%.
        assert!((metrics.summary().cpu_utilization_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn hotspots_accrue_per_core_per_tick() {
        let mut metrics = Metrics::new(&config(3, 10, 200));
        let mut cores = build_cluster(3, 40.0);
        cores[0].temperature = 90.0;
        cores[2].temperature = 86.0;

        for tick in 1..=4 {
            metrics.on_tick(&cores, &[], tick);
        }

        assert_eq!(metrics.summary().thermal_hotspots, 8);
    }

    #[test]
    fn isolation_latency_spans_detection_to_completion() {
        let mut metrics = Metrics::new(&config(1, 100, 200));

        let mut detected = running_task(0, true);
        detected.detected_malicious = true;
        detected.detection_tick = Some(5);
        metrics.record_completion(&detected, 25);

        let clean = running_task(1, false);
        metrics.record_completion(&clean, 30);

        let summary = metrics.summary();
        assert_eq!(summary.isolation_events, 1);
        assert_eq!(summary.avg_isolation_latency, Some(20.0));
        assert_eq!(summary.tasks_completed, 2);
    }

    #[test]
    fn detection_at_tick_zero_still_counts() {
        let mut metrics = Metrics::new(&config(1, 100, 200));

        let mut detected = running_task(0, true);
        detected.detected_malicious = true;
        detected.detection_tick = Some(0);
        metrics.record_completion(&detected, 4);

        assert_eq!(metrics.summary().avg_isolation_latency, Some(4.0));
    }

    #[test]
    fn no_isolations_reports_none() {
        let metrics = Metrics::new(&config(1, 100, 200));
        let summary = metrics.summary();
        assert_eq!(summary.avg_isolation_latency, None);
        assert_eq!(summary.isolation_events, 0);
    }

    #[test]
    fn series_samples_on_interval_boundaries() {
        let mut metrics = Metrics::new(&config(1, 15, 5));
        let cores = build_cluster(1, 40.0);

        for tick in 0..15 {
            metrics.on_tick(&cores, &[], tick);
        }

        assert_eq!(metrics.series().ticks, vec![0, 5, 10]);
        assert_eq!(metrics.series().avg_temperature, vec![40.0; 3]);
    }

    #[test]
    fn interval_utilization_resets_between_samples() {
        let mut metrics = Metrics::new(&config(1, 20, 5));
        let mut cores = build_cluster(1, 40.0);

        // Busy for ticks 1..=5, idle afterwards.
        cores[0].assign(running_task(0, false));
        for tick in 0..=5 {
            metrics.on_tick(&cores, &[], tick);
        }
        let _ = cores[0].release();
        for tick in 6..=10 {
            metrics.on_tick(&cores, &[], tick);
        }

        // Sample at tick 5 covers ticks 1..=5 (all busy); at tick 10 covers
        // 6..=10 (all idle). The tick-0 sample only sees its own tick.
        assert_eq!(metrics.series().cpu_utilization_pct, vec![20.0, 100.0, 0.0]);
    }

    #[test]
    fn active_threats_counts_running_and_queued_ground_truth() {
        let mut metrics = Metrics::new(&config(2, 10, 1));
        let mut cores = build_cluster(2, 40.0);
        cores[0].assign(running_task(0, true));

        let queue = vec![running_task(1, true), running_task(2, false)];
        metrics.on_tick(&cores, &queue, 1);

        assert_eq!(metrics.series().active_threats, vec![2]);
    }
}
