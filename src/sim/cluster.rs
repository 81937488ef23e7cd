//! The simulated CPU cores

use crate::sim::task::Task;

/// One CPU core; runs at most one task at a time
#[derive(Debug, Clone)]
pub struct Core {
    /// Position in the cluster; cores `id - 1` and `id + 1` are the thermal
    /// neighbors
    pub id: usize,
    pub temperature: f64,
    pub current_task: Option<Task>,
    /// Cumulative ticks spent executing
    pub busy_ticks: u64,
}

impl Core {
    pub fn new(id: usize, ambient: f64) -> Self {
        Self {
            id,
            temperature: ambient,
            current_task: None,
            busy_ticks: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current_task.is_none()
    }

    /// Place a task on this core
    ///
    /// Panics if the core is already busy; schedulers only ever hand out
    /// idle cores, so a double assignment is a bug in the caller.
    pub fn assign(&mut self, task: Task) {
        assert!(
            self.current_task.is_none(),
            "core {} is already running a task",
            self.id
        );
        self.current_task = Some(task);
    }

    /// Free the core, returning the task it was running
    pub fn release(&mut self) -> Option<Task> {
        self.current_task.take()
    }
}

/// Build a cluster of `num_cores` cores, all idle at ambient temperature
pub fn build_cluster(num_cores: usize, ambient: f64) -> Vec<Core> {
    (0..num_cores).map(|id| Core::new(id, ambient)).collect()
}
