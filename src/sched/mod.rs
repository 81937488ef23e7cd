//! Scheduling policies
//!
//! Four policies place queued tasks onto idle cores, once per tick. The
//! deterministic pair (priority, CFS) ranks the queue and fills idle cores
//! in ascending id order; the stochastic pair (single-pheromone ACO,
//! stigmergic sentinels) samples a core for each task from pheromone-derived
//! scores. No policy preempts: a placed task keeps its core until it
//! completes.

pub mod aco;
pub mod cfs;
pub mod priority;
pub mod sentinels;

pub use aco::SingleAcoScheduler;
pub use cfs::CfsScheduler;
pub use priority::PriorityScheduler;
pub use sentinels::SentinelScheduler;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::SimError;
use crate::core::types::Tick;
use crate::sim::cluster::Core;
use crate::sim::task::Task;

/// Numerical floor keeping heuristics and score denominators finite
pub(crate) const STABILIZER: f64 = 1e-5;

/// Identifies one of the four scheduling policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedulerKind {
    Priority,
    Cfs,
    SingleAco,
    Sentinels,
}

impl SchedulerKind {
    pub const ALL: [SchedulerKind; 4] = [
        SchedulerKind::Priority,
        SchedulerKind::Cfs,
        SchedulerKind::SingleAco,
        SchedulerKind::Sentinels,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SchedulerKind::Priority => "priority",
            SchedulerKind::Cfs => "cfs",
            SchedulerKind::SingleAco => "single-aco",
            SchedulerKind::Sentinels => "sentinels",
        }
    }
}

impl std::fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SchedulerKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "priority" => Ok(SchedulerKind::Priority),
            "cfs" => Ok(SchedulerKind::Cfs),
            "single-aco" | "aco" => Ok(SchedulerKind::SingleAco),
            "sentinels" => Ok(SchedulerKind::Sentinels),
            other => Err(SimError::UnknownScheduler(other.to_string())),
        }
    }
}

/// A scheduling policy together with whatever per-core state it maintains
pub enum Scheduler {
    Priority(PriorityScheduler),
    Cfs(CfsScheduler),
    SingleAco(SingleAcoScheduler),
    Sentinels(SentinelScheduler),
}

impl Scheduler {
    pub fn new(kind: SchedulerKind, config: &SimulationConfig) -> Self {
        match kind {
            SchedulerKind::Priority => Scheduler::Priority(PriorityScheduler),
            SchedulerKind::Cfs => Scheduler::Cfs(CfsScheduler),
            SchedulerKind::SingleAco => Scheduler::SingleAco(SingleAcoScheduler::new(
                config.num_cores,
                config.single_aco.clone(),
            )),
            SchedulerKind::Sentinels => Scheduler::Sentinels(SentinelScheduler::new(
                config.num_cores,
                config.sentinels.clone(),
            )),
        }
    }

    pub fn kind(&self) -> SchedulerKind {
        match self {
            Scheduler::Priority(_) => SchedulerKind::Priority,
            Scheduler::Cfs(_) => SchedulerKind::Cfs,
            Scheduler::SingleAco(_) => SchedulerKind::SingleAco,
            Scheduler::Sentinels(_) => SchedulerKind::Sentinels,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Place queued tasks onto idle cores
    ///
    /// Scheduled tasks are removed from the queue; the relative order of the
    /// tasks left behind is preserved. Only the stochastic policies consume
    /// randomness.
    pub fn schedule(
        &mut self,
        queue: &mut Vec<Task>,
        cores: &mut [Core],
        tick: Tick,
        rng: &mut ChaCha8Rng,
    ) {
        match self {
            Scheduler::Priority(s) => s.schedule(queue, cores),
            Scheduler::Cfs(s) => s.schedule(queue, cores),
            Scheduler::SingleAco(s) => s.schedule(queue, cores, tick, rng),
            Scheduler::Sentinels(s) => s.schedule(queue, cores, tick, rng),
        }
    }

    /// End-of-tick state update; a no-op for the deterministic policies
    pub fn update(&mut self, cores: &[Core]) {
        match self {
            Scheduler::Priority(_) | Scheduler::Cfs(_) => {}
            Scheduler::SingleAco(s) => s.update(cores),
            Scheduler::Sentinels(s) => s.update(cores),
        }
    }
}

/// Assign tasks to idle cores in rank order
///
/// Sorts a copy of the queue indices by `rank` (stable, so equal ranks keep
/// arrival order) and pairs the best-ranked tasks with idle cores in
/// ascending core-id order. The live queue is never reordered; chosen tasks
/// are simply removed from it.
pub(crate) fn assign_by_rank<K: Ord>(
    queue: &mut Vec<Task>,
    cores: &mut [Core],
    rank: impl Fn(&Task) -> K,
) {
    let idle: Vec<usize> = cores
        .iter()
        .filter(|c| c.is_idle())
        .map(|c| c.id)
        .collect();
    if queue.is_empty() || idle.is_empty() {
        return;
    }

    let mut order: Vec<usize> = (0..queue.len()).collect();
    order.sort_by_key(|&i| rank(&queue[i]));
    order.truncate(idle.len());

    // Pull tasks out back-to-front so the earlier queue indices stay valid.
    let mut picks: Vec<(usize, usize)> = order.into_iter().zip(idle).collect();
    picks.sort_unstable_by(|a, b| b.0.cmp(&a.0));
    for (queue_index, core_id) in picks {
        let task = queue.remove(queue_index);
        cores[core_id].assign(task);
    }
}

/// Roulette-wheel draw over non-negative weights
///
/// Returns an index with probability proportional to its weight. When the
/// total mass is zero, negative or not finite, every index is equally
/// likely. Both paths consume exactly one draw, so the stream stays aligned
/// regardless of which branch runs.
pub(crate) fn roulette(weights: &[f64], rng: &mut ChaCha8Rng) -> usize {
    debug_assert!(!weights.is_empty());

    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return rng.gen_range(0..weights.len());
    }

    let mut remaining = rng.gen::<f64>() * total;
    for (index, weight) in weights.iter().enumerate() {
        remaining -= weight;
        if remaining < 0.0 {
            return index;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TaskId;
    use crate::sim::cluster::build_cluster;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn task(id: u64, priority: i32) -> Task {
        Task::new(TaskId(id), 0, 10, priority, false)
    }

    #[test]
    fn assign_by_rank_prefers_lowest_rank() {
        let mut queue = vec![task(0, 3), task(1, 1), task(2, 2)];
        let mut cores = build_cluster(2, 40.0);

        assign_by_rank(&mut queue, &mut cores, |t| t.priority);

        assert_eq!(cores[0].current_task.as_ref().map(|t| t.id), Some(TaskId(1)));
        assert_eq!(cores[1].current_task.as_ref().map(|t| t.id), Some(TaskId(2)));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, TaskId(0));
    }

    #[test]
    fn assign_by_rank_breaks_ties_by_arrival_order() {
        let mut queue = vec![task(0, 1), task(1, 1), task(2, 1)];
        let mut cores = build_cluster(2, 40.0);

        assign_by_rank(&mut queue, &mut cores, |t| t.priority);

        assert_eq!(cores[0].current_task.as_ref().map(|t| t.id), Some(TaskId(0)));
        assert_eq!(cores[1].current_task.as_ref().map(|t| t.id), Some(TaskId(1)));
        assert_eq!(queue[0].id, TaskId(2));
    }

    #[test]
    fn assign_by_rank_skips_busy_cores() {
        let mut queue = vec![task(0, 1)];
        let mut cores = build_cluster(3, 40.0);
        cores[0].assign(task(99, 1));
        cores[1].assign(task(98, 1));

        assign_by_rank(&mut queue, &mut cores, |t| t.priority);

        assert_eq!(cores[2].current_task.as_ref().map(|t| t.id), Some(TaskId(0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn assign_by_rank_stops_when_cores_run_out() {
        let mut queue = vec![task(0, 2), task(1, 1), task(2, 3)];
        let mut cores = build_cluster(1, 40.0);

        assign_by_rank(&mut queue, &mut cores, |t| t.priority);

        assert_eq!(cores[0].current_task.as_ref().map(|t| t.id), Some(TaskId(1)));
        // Leftover queue keeps its original relative order.
        let leftover: Vec<TaskId> = queue.iter().map(|t| t.id).collect();
        assert_eq!(leftover, vec![TaskId(0), TaskId(2)]);
    }

    #[test]
    fn kind_names_parse_back() {
        for kind in SchedulerKind::ALL {
            assert_eq!(kind.name().parse::<SchedulerKind>().unwrap(), kind);
        }
        assert!("round-robin".parse::<SchedulerKind>().is_err());
    }

    #[test]
    fn roulette_certain_weight_always_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            assert_eq!(roulette(&[0.0, 4.2, 0.0], &mut rng), 1);
        }
    }

    #[test]
    fn roulette_zero_mass_falls_back_to_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut hits = [0u32; 4];
        for _ in 0..4000 {
            hits[roulette(&[0.0; 4], &mut rng)] += 1;
        }
        for &count in &hits {
            assert!(count > 800, "uniform fallback is skewed: {:?}", hits);
        }
    }

    #[test]
    fn roulette_consumes_one_draw_on_both_paths() {
        let mut weighted = ChaCha8Rng::seed_from_u64(3);
        let mut degenerate = ChaCha8Rng::seed_from_u64(3);

        roulette(&[1.0, 2.0], &mut weighted);
        roulette(&[0.0, 0.0], &mut degenerate);

        assert_eq!(weighted.gen::<u64>(), degenerate.gen::<u64>());
    }

    #[test]
    fn roulette_tracks_weight_proportions() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let weights = [1.0, 3.0];
        let mut hits = [0u32; 2];
        for _ in 0..10_000 {
            hits[roulette(&weights, &mut rng)] += 1;
        }
        let share = hits[1] as f64 / 10_000.0;
        assert!(
            (share - 0.75).abs() < 0.02,
            "expected ~75% for weight 3.0, got {}",
            share
        );
    }

    proptest! {
        #[test]
        fn roulette_index_is_always_in_range(
            weights in prop::collection::vec(0.0f64..1e6, 1..32),
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let index = roulette(&weights, &mut rng);
            prop_assert!(index < weights.len());
        }

        #[test]
        fn roulette_skips_zero_weights(
            position in 0usize..8,
            seed in any::<u64>(),
        ) {
            let mut weights = [0.0f64; 8];
            weights[position] = 1.0;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            prop_assert_eq!(roulette(&weights, &mut rng), position);
        }
    }
}
