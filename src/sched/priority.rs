//! Static-priority scheduling

use crate::sched::assign_by_rank;
use crate::sim::cluster::Core;
use crate::sim::task::Task;

/// Ranks the queue by static priority; lower values run first and ties run
/// in arrival order
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityScheduler;

impl PriorityScheduler {
    pub fn schedule(&mut self, queue: &mut Vec<Task>, cores: &mut [Core]) {
        assign_by_rank(queue, cores, |task| task.priority);
    }
}
