//! The discrete-time simulation engine
//!
//! One [`Environment`] owns the cluster, the task queue, the scheduler and
//! the collaborating models, and advances them in a fixed per-tick order:
//! arrival, scheduling, execution (with security checks and completions),
//! thermal update, scheduler state update, metrics. Everything stochastic
//! draws from a single seeded RNG, so a (seed, stream) pair pins down an
//! entire run.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Tick;
use crate::sched::{Scheduler, SchedulerKind};
use crate::sim::cluster::{build_cluster, Core};
use crate::sim::metrics::Metrics;
use crate::sim::report::SimulationReport;
use crate::sim::security::SecurityMonitor;
use crate::sim::task::{Task, TaskGenerator};
use crate::sim::thermal::ThermalModel;

pub struct Environment {
    config: SimulationConfig,
    scheduler: Scheduler,
    cores: Vec<Core>,
    queue: Vec<Task>,
    generator: TaskGenerator,
    thermal: ThermalModel,
    security: SecurityMonitor,
    metrics: Metrics,
    rng: ChaCha8Rng,
    current_tick: Tick,
    seed: u64,
    stream: u64,
}

impl Environment {
    /// Build a validated environment seeded for a reproducible run
    pub fn new(config: SimulationConfig, kind: SchedulerKind, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, kind, seed, 0))
    }

    fn assemble(config: SimulationConfig, kind: SchedulerKind, seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);

        Self {
            scheduler: Scheduler::new(kind, &config),
            cores: build_cluster(config.num_cores, config.thermal.ambient),
            queue: Vec::new(),
            generator: TaskGenerator::new(&config),
            thermal: ThermalModel::new(config.thermal.clone()),
            security: SecurityMonitor::new(config.security.clone()),
            metrics: Metrics::new(&config),
            rng,
            current_tick: 0,
            seed,
            stream,
            config,
        }
    }

    /// Hand a task straight to the queue, bypassing the generator
    ///
    /// Counted as an arrival, so conservation accounting still holds for
    /// crafted workloads.
    pub fn enqueue_task(&mut self, task: Task) {
        self.metrics.record_arrival();
        self.queue.push(task);
    }

    /// Advance the simulation by one tick
    pub fn step(&mut self) {
        let tick = self.current_tick;

        // 1. Arrival
        if let Some(task) = self.generator.maybe_spawn(tick, &mut self.rng) {
            trace!(
                "tick {}: task {} arrived (burst {}, priority {}, malicious {})",
                tick,
                task.id,
                task.cpu_burst,
                task.priority,
                task.malicious
            );
            self.metrics.record_arrival();
            self.queue.push(task);
        }

        // 2. Scheduling
        self.scheduler
            .schedule(&mut self.queue, &mut self.cores, tick, &mut self.rng);

        // 3. Execution: burn one tick of CPU, run the security check on
        //    anything not yet flagged, retire completed tasks.
        for core in &mut self.cores {
            let Some(task) = core.current_task.as_mut() else {
                continue;
            };

            task.vruntime += 1;
            task.remaining_burst -= 1;
            core.busy_ticks += 1;

            if !task.detected_malicious {
                let verdict = self.security.check(task, &mut self.rng);
                if verdict.detected {
                    task.detected_malicious = true;
                    task.detection_tick = Some(tick);
                    debug!(
                        "tick {}: task {} flagged on core {} (correct: {})",
                        tick, task.id, core.id, verdict.correct
                    );
                }
            }

            if task.is_complete() {
                task.completion_tick = Some(tick);
                if let Some(done) = core.release() {
                    self.metrics.record_completion(&done, tick);
                    trace!("tick {}: task {} completed on core {}", tick, done.id, core.id);
                }
            }
        }

        // 4. Thermal
        self.thermal.step(&mut self.cores);

        // 5. Scheduler state update, exactly once per tick, after execution
        //    and thermal so trails see the post-tick cluster.
        self.scheduler.update(&self.cores);

        // 6. Metrics
        self.metrics.on_tick(&self.cores, &self.queue, tick);

        self.current_tick += 1;
    }

    /// Run to completion and produce the report
    pub fn run(mut self) -> SimulationReport {
        debug!(
            "{} run starting: seed {}, stream {}, {} cores, {} ticks",
            self.scheduler.name(),
            self.seed,
            self.stream,
            self.config.num_cores,
            self.config.duration
        );

        let start = Instant::now();
        for _ in 0..self.config.duration {
            if self.current_tick % self.config.metrics_interval == 0 {
                debug!(
                    "tick {}: {} queued, {} busy",
                    self.current_tick,
                    self.queue.len(),
                    self.cores.iter().filter(|c| !c.is_idle()).count()
                );
            }
            self.step();
        }
        let elapsed = start.elapsed();

        let report = SimulationReport::new(
            self.scheduler.kind(),
            self.seed,
            self.stream,
            &self.config,
            self.metrics,
            elapsed,
        );
        debug!("{}", report.summary_line());
        report
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn queue(&self) -> &[Task] {
        &self.queue
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Run `trials` independent simulations of one policy in parallel
///
/// Every trial shares the base seed but draws from its own RNG stream, so
/// results do not depend on thread scheduling or on how many trials run.
/// Reports come back in stream order.
pub fn run_trials(
    config: &SimulationConfig,
    kind: SchedulerKind,
    seed: u64,
    trials: u64,
) -> Result<Vec<SimulationReport>> {
    config.validate()?;
    info!("{}: running {} trials with seed {}", kind.name(), trials, seed);

    let reports: Vec<SimulationReport> = (0..trials)
        .into_par_iter()
        .map(|stream| Environment::assemble(config.clone(), kind, seed, stream).run())
        .collect();

    info!("{}: {} trials complete", kind.name(), reports.len());
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TaskId;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.num_cores = 1;
        config.duration = 5;
        config.arrival_rate = 0.0;
        config.threat_probability = 0.0;
        config
    }

    #[test]
    fn injected_task_runs_to_completion() {
        let mut env = Environment::new(quiet_config(), SchedulerKind::Priority, 1).unwrap();
        env.enqueue_task(Task::new(TaskId(0), 0, 3, 1, false));

        for _ in 0..5 {
            env.step();
        }

        // Placed at tick 0, burns ticks 0..=2, core idle afterwards.
        assert!(env.cores()[0].is_idle());
        assert!(env.queue().is_empty());
        assert_eq!(env.metrics().tasks_completed(), 1);
        assert_eq!(env.cores()[0].busy_ticks, 3);
    }

    #[test]
    fn vruntime_tracks_executed_ticks() {
        let mut env = Environment::new(quiet_config(), SchedulerKind::Cfs, 1).unwrap();
        env.enqueue_task(Task::new(TaskId(0), 0, 4, 1, false));

        env.step();
        env.step();

        let running = env.cores()[0].current_task.as_ref().unwrap();
        assert_eq!(running.vruntime, 2);
        assert_eq!(running.remaining_burst, 2);
    }

    #[test]
    fn detection_tick_is_set_once() {
        let mut config = quiet_config();
        config.security.detection_probability = 1.0;
        let mut env = Environment::new(config, SchedulerKind::Priority, 1).unwrap();
        env.enqueue_task(Task::new(TaskId(0), 0, 3, 1, true));

        env.step();
        let first = env.cores()[0].current_task.as_ref().unwrap().detection_tick;
        assert_eq!(first, Some(0));

        env.step();
        let second = env.cores()[0].current_task.as_ref().unwrap().detection_tick;
        assert_eq!(second, Some(0));
    }

    #[test]
    fn run_produces_report_with_run_parameters() {
        let config = quiet_config();
        let report = Environment::new(config, SchedulerKind::Priority, 9)
            .unwrap()
            .run();

        assert_eq!(report.scheduler, SchedulerKind::Priority);
        assert_eq!(report.seed, 9);
        assert_eq!(report.stream, 0);
        assert_eq!(report.num_cores, 1);
        assert_eq!(report.duration, 5);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = quiet_config();
        config.num_cores = 0;
        assert!(Environment::new(config, SchedulerKind::Priority, 1).is_err());
    }

    #[test]
    fn trial_reports_come_back_in_stream_order() {
        let mut config = quiet_config();
        config.duration = 20;
        let reports = run_trials(&config, SchedulerKind::Sentinels, 7, 4).unwrap();

        assert_eq!(reports.len(), 4);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.stream, i as u64);
            assert_eq!(report.seed, 7);
        }
    }
}
