//! Tasks and the stochastic arrival process

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::{TaskId, Tick};

/// A unit of work flowing through the cluster
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub arrival_tick: Tick,
    /// Total CPU ticks this task needs
    pub cpu_burst: u32,
    /// CPU ticks still owed; the task is complete when this reaches 0
    pub remaining_burst: u32,
    /// Static priority; lower is more urgent
    pub priority: i32,
    /// Ground truth, never read by schedulers
    pub malicious: bool,
    /// Ticks of CPU received so far
    pub vruntime: u64,
    /// Verdict of the security monitor; set once, never cleared
    pub detected_malicious: bool,
    pub detection_tick: Option<Tick>,
    pub completion_tick: Option<Tick>,
}

impl Task {
    pub fn new(
        id: TaskId,
        arrival_tick: Tick,
        cpu_burst: u32,
        priority: i32,
        malicious: bool,
    ) -> Self {
        Self {
            id,
            arrival_tick,
            cpu_burst,
            remaining_burst: cpu_burst,
            priority,
            malicious,
            vruntime: 0,
            detected_malicious: false,
            detection_tick: None,
            completion_tick: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_burst == 0
    }
}

/// Spawns the task stream, at most one arrival per tick
///
/// The Poisson arrival process (`arrival_rate` per 1000 ticks) is collapsed
/// to a Bernoulli draw with `p = 1 - exp(-rate/1000)`, the probability of at
/// least one arrival within a tick.
#[derive(Debug, Clone)]
pub struct TaskGenerator {
    next_id: u64,
    arrival_probability: f64,
    threat_probability: f64,
    burst_range: (u32, u32),
    priority_range: (i32, i32),
}

impl TaskGenerator {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            next_id: 0,
            arrival_probability: 1.0 - (-config.arrival_rate / 1000.0).exp(),
            threat_probability: config.threat_probability,
            burst_range: config.burst_range,
            priority_range: config.priority_range,
        }
    }

    /// Roll the arrival dice for this tick
    pub fn maybe_spawn(&mut self, tick: Tick, rng: &mut ChaCha8Rng) -> Option<Task> {
        if rng.gen::<f64>() < self.arrival_probability {
            Some(self.spawn(tick, rng))
        } else {
            None
        }
    }

    /// Spawn one task with randomized burst, priority and intent
    pub fn spawn(&mut self, tick: Tick, rng: &mut ChaCha8Rng) -> Task {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let cpu_burst = rng.gen_range(self.burst_range.0..self.burst_range.1);
        let priority = rng.gen_range(self.priority_range.0..self.priority_range.1);
        let malicious = rng.gen::<f64>() < self.threat_probability;

        Task::new(id, tick, cpu_burst, priority, malicious)
    }

    /// How many tasks have been spawned so far
    pub fn spawned(&self) -> u64 {
        self.next_id
    }
}
