//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for tasks, assigned sequentially at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Simulation tick counter (discrete time unit, notionally 1ms)
pub type Tick = u64;
