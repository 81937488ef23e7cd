//! Completely-fair-style scheduling

use crate::sched::assign_by_rank;
use crate::sim::cluster::Core;
use crate::sim::task::Task;

/// Ranks the queue by virtual runtime, so the tasks that have received the
/// least CPU run first; ties run in arrival order
///
/// Every running task accrues one tick of vruntime per tick executed, which
/// in this no-preemption model means fresh arrivals always outrank anything
/// that already had a turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct CfsScheduler;

impl CfsScheduler {
    pub fn schedule(&mut self, queue: &mut Vec<Task>, cores: &mut [Core]) {
        assign_by_rank(queue, cores, |task| task.vruntime);
    }
}
