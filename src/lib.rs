//! sentinel-sched: a discrete-time CPU scheduling simulator
//!
//! Evaluates four scheduling policies under combined performance, thermal
//! and security pressure on a simulated multi-core cluster: static
//! priority, a CFS-style fair scheduler, single-pheromone ant colony
//! optimization, and the stigmergic sentinels design, which coordinates
//! placement and threat response purely through per-core pheromone trails.

pub mod core;
pub mod sched;
pub mod sim;
