//! Per-core temperature dynamics
//!
//! The update is a pure function of the pre-tick temperatures: every core
//! reads from one snapshot, so iteration order never affects the result.

use crate::core::config::ThermalConfig;
use crate::sim::cluster::Core;

pub struct ThermalModel {
    config: ThermalConfig,
}

impl ThermalModel {
    pub fn new(config: ThermalConfig) -> Self {
        Self { config }
    }

    /// Advance every core's temperature by one tick
    ///
    /// Busy cores heat by `active_increase`. Idle cores shed a fraction of
    /// their excess over ambient, clamped so cooling alone never pushes a
    /// core below ambient. Every core then drifts toward the average of its
    /// two adjacent cores; edge cores pair with themselves.
    ///
    /// Core ids index the adjacency, so they must be dense in `0..len` as
    /// produced by [`build_cluster`](crate::sim::cluster::build_cluster).
    pub fn step(&self, cores: &mut [Core]) {
        let snapshot: Vec<f64> = cores.iter().map(|c| c.temperature).collect();
        let last = snapshot.len().saturating_sub(1);

        for core in cores.iter_mut() {
            let i = core.id;
            let mut next = snapshot[i];

            if core.is_idle() {
                let decrease = (snapshot[i] - self.config.ambient) * self.config.idle_decay_rate;
                next -= decrease.max(0.0);
            } else {
                next += self.config.active_increase;
            }

            let left = if i > 0 { snapshot[i - 1] } else { snapshot[i] };
            let right = if i < last { snapshot[i + 1] } else { snapshot[i] };
            let neighbor_avg = (left + right) / 2.0;
            next += (neighbor_avg - snapshot[i]) * self.config.neighbor_influence;

            core.temperature = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TaskId;
    use crate::sim::cluster::build_cluster;
    use crate::sim::task::Task;

    fn model() -> ThermalModel {
        ThermalModel::new(ThermalConfig::default())
    }

    fn busy(core: &mut Core) {
        core.assign(Task::new(TaskId(0), 0, 100, 1, false));
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn busy_core_heats_linearly() {
        let mut cores = build_cluster(1, 40.0);
        busy(&mut cores[0]);

        let model = model();
        for _ in 0..10 {
            model.step(&mut cores);
        }
        // Single core: the neighbor term vanishes, leaving pure heating.
        assert_close(cores[0].temperature, 45.0);
    }

    #[test]
    fn idle_core_decays_toward_ambient() {
        let mut cores = build_cluster(1, 40.0);
        cores[0].temperature = 60.0;

        model().step(&mut cores);
        assert_close(cores[0].temperature, 58.0);
    }

    #[test]
    fn idle_cluster_at_ambient_holds_steady() {
        let mut cores = build_cluster(3, 40.0);

        // Decay and diffusion both vanish at ambient, exactly.
        for _ in 0..50 {
            model().step(&mut cores);
        }
        for core in &cores {
            assert_close(core.temperature, 40.0);
        }
    }

    #[test]
    fn cooling_never_undershoots_ambient() {
        let mut cores = build_cluster(1, 40.0);
        cores[0].temperature = 35.0;

        // Below ambient the decay term is clamped to zero.
        model().step(&mut cores);
        assert_close(cores[0].temperature, 35.0);
    }

    #[test]
    fn neighbors_pull_toward_their_average() {
        let mut cores = build_cluster(3, 40.0);
        cores[0].temperature = 80.0;

        model().step(&mut cores);
        // Middle core: no decay (at ambient), neighbor avg is (80 + 40) / 2.
        assert_close(cores[1].temperature, 40.0 + (60.0 - 40.0) * 0.01);
        // Hot edge core: decay plus the pull of its single real neighbor.
        assert_close(cores[0].temperature, 80.0 - 4.0 + (60.0 - 80.0) * 0.01);
    }

    #[test]
    fn update_reads_pre_tick_temperatures() {
        // If the update ran in place, core 1 would see core 0 already
        // cooled to 75.8 and land on a different value.
        let mut cores = build_cluster(3, 40.0);
        cores[0].temperature = 80.0;

        model().step(&mut cores);
        assert_close(cores[1].temperature, 40.2);
    }
}
