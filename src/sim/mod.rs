//! Discrete-time simulation of a multi-core cluster
//!
//! The engine advances in 1ms ticks. Tasks arrive stochastically, a
//! scheduling policy places them onto cores, running tasks heat the chip
//! and get screened by the security monitor, and a metrics collector
//! samples the whole thing at a fixed cadence.

pub mod cluster;
pub mod environment;
pub mod metrics;
pub mod report;
pub mod security;
pub mod task;
pub mod thermal;

pub use cluster::{build_cluster, Core};
pub use environment::{run_trials, Environment};
pub use metrics::{Metrics, MetricsSeries, SummaryStats};
pub use report::{SimulationReport, TrialSummary};
pub use security::{SecurityMonitor, Verdict};
pub use task::{Task, TaskGenerator};
pub use thermal::ThermalModel;
