//! Single-pheromone ant colony scheduling

use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::core::config::SingleAcoConfig;
use crate::core::types::Tick;
use crate::sched::{roulette, STABILIZER};
use crate::sim::cluster::Core;
use crate::sim::task::Task;

/// Places tasks by sampling cores from a single performance pheromone
/// weighted by an inverse-temperature heuristic
///
/// The baseline stochastic policy: it senses heat but has no notion of
/// threats or contention beyond what the pheromone happens to encode.
#[derive(Debug, Clone)]
pub struct SingleAcoScheduler {
    config: SingleAcoConfig,
    /// One trail per core, starting at 1.0
    pheromone: Vec<f64>,
}

impl SingleAcoScheduler {
    pub fn new(num_cores: usize, config: SingleAcoConfig) -> Self {
        Self {
            config,
            pheromone: vec![1.0; num_cores],
        }
    }

    /// Placement score for core `id`: `pheromone^alpha * (1/(temp+eps))^beta`
    fn weight(&self, id: usize, temperature: f64) -> f64 {
        let heuristic = 1.0 / (temperature + STABILIZER);
        self.pheromone[id].powf(self.config.alpha) * heuristic.powf(self.config.beta)
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

        while !queue.is_empty() && !idle.is_empty() {
            let weights: Vec<f64> = idle
                .iter()
                .map(|&id| self.weight(id, cores[id].temperature))
                .collect();
            let core_id = idle.remove(roulette(&weights, rng));

            let task = queue.remove(0);
            trace!("tick {}: task {} -> core {} (single-aco)", tick, task.id, core_id);
            cores[core_id].assign(task);
        }
    }

    /// Evaporate every trail, then reward busy cores in proportion to how
    /// close their task is to completion
    pub fn update(&mut self, cores: &[Core]) {
        for trail in &mut self.pheromone {
            *trail *= 1.0 - self.config.rho;
        }
        for core in cores {
            if let Some(task) = &core.current_task {
                self.pheromone[core.id] += 1.0 / (task.remaining_burst as f64 + 1.0);
            }
        }
    }
}
