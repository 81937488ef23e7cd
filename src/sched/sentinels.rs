//! Stigmergic sentinel scheduling
//!
//! Cores carry four pheromone fields that together encode performance,
//! threat, thermal and contention pressure. Schedulers and monitors never
//! talk to each other directly; everything is communicated through these
//! trails, in the manner of ant colonies marking their environment.

use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::core::config::SentinelConfig;
use crate::core::types::Tick;
use crate::sched::{roulette, STABILIZER};
use crate::sim::cluster::Core;
use crate::sim::task::Task;

/// Multi-pheromone scheduler that also quarantines flagged tasks
///
/// A task with a detection flag is never placed: it stays in the queue,
/// starved of CPU, while detections on running tasks flood their core's
/// threat trail and repel new work.
#[derive(Debug, Clone)]
pub struct SentinelScheduler {
    config: SentinelConfig,
    /// Performance reward trail; starts at 1.0
    attractive: Vec<f64>,
    /// Repulsive trail fed by detections; starts at 0.0
    threat: Vec<f64>,
    /// Thermal trail fed by core temperature; starts at 1.0
    environmental: Vec<f64>,
    /// Occupancy trail fed by busy cores; starts at 1.0
    contention: Vec<f64>,
}

impl SentinelScheduler {
    pub fn new(num_cores: usize, config: SentinelConfig) -> Self {
        Self {
            config,
            attractive: vec![1.0; num_cores],
            threat: vec![0.0; num_cores],
            environmental: vec![1.0; num_cores],
            contention: vec![1.0; num_cores],
        }
    }

    /// Placement score for `task` on core `id`
    ///
    /// Attractive trail and shorter-job heuristic in the numerator, the
    /// three repulsive trails in the denominator. Every denominator term is
    /// floored by the stabilizer so a fully evaporated trail cannot zero it.
    fn weight(&self, task: &Task, id: usize) -> f64 {
        let c = &self.config;
        let heuristic = 1.0 / (task.remaining_burst as f64 + STABILIZER);
        let numerator = self.attractive[id].powf(c.alpha) * heuristic.powf(c.beta);
        let denominator = (self.threat[id] + STABILIZER).powf(c.gamma)
            * (self.environmental[id] + STABILIZER).powf(c.delta)
            * (self.contention[id] + STABILIZER).powf(c.epsilon);
        numerator / denominator
    }

    pub fn schedule(
        &mut self,
        queue: &mut Vec<Task>,
        cores: &mut [Core],
        tick: Tick,
        rng: &mut ChaCha8Rng,
    ) {
        let mut idle: Vec<usize> = cores
            .iter()
            .filter(|c| c.is_idle())
            .map(|c| c.id)
            .collect();

        let mut next = 0;
        while next < queue.len() && !idle.is_empty() {
            if queue[next].detected_malicious {
                // Quarantined: flagged tasks stay queued and never run.
                next += 1;
                continue;
            }

            let weights: Vec<f64> = idle
                .iter()
                .map(|&id| self.weight(&queue[next], id))
                .collect();
            let core_id = idle.remove(roulette(&weights, rng));

            let task = queue.remove(next);
            trace!("tick {}: task {} -> core {} (sentinels)", tick, task.id, core_id);
            cores[core_id].assign(task);
        }
    }

    /// Evaporate all four fields, then deposit this tick's signals
    ///
    /// The environmental trail absorbs every core's temperature. Busy cores
    /// additionally mark contention, reward progress on the attractive
    /// trail, and, when their task is flagged, flood the threat trail. The
    /// attractive field shares the contention evaporation rate.
    pub fn update(&mut self, cores: &[Core]) {
        let rho_threat = self.config.rho_threat;
        let rho_env = self.config.rho_env;
        let rho_contention = self.config.rho_contention;

        for value in &mut self.attractive {
            *value *= 1.0 - rho_contention;
        }
        for value in &mut self.threat {
            *value *= 1.0 - rho_threat;
        }
        for value in &mut self.environmental {
            *value *= 1.0 - rho_env;
        }
        for value in &mut self.contention {
            *value *= 1.0 - rho_contention;
        }

        for core in cores {
            self.environmental[core.id] += rho_env * core.temperature;

            if let Some(task) = &core.current_task {
                if task.detected_malicious {
                    self.threat[core.id] += rho_threat * 100.0;
                }
                self.contention[core.id] += rho_contention;
                self.attractive[core.id] += rho_contention / (task.remaining_burst as f64 + 1.0);
            }
        }
    }
}
