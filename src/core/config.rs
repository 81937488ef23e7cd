//! Simulation configuration with documented constants
//!
//! All tunable values are collected here with explanations of their purpose
//! and how they interact with each other.

use crate::core::error::{Result, SimError};
use crate::core::types::Tick;

/// Configuration for a full simulation run
///
/// Defaults are tuned so that an 8-core cluster runs at moderate pressure:
/// the queue stays short under the deterministic policies and the thermal
/// model reaches a plateau well below the hotspot threshold when load is
/// spread evenly.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    // === WORKLOAD ===
    /// Number of CPU cores in the simulated cluster
    ///
    /// Cores are laid out in a line for thermal purposes: core `i` exchanges
    /// heat with cores `i-1` and `i+1`.
    pub num_cores: usize,

    /// Total simulation length in ticks (1 tick ~ 1ms)
    pub duration: Tick,

    /// Mean task arrivals per 1000 ticks
    ///
    /// Arrivals follow a Poisson process collapsed to at most one task per
    /// tick: each tick spawns a task with probability `1 - exp(-rate/1000)`.
    /// At the default rate (20.0) a task arrives roughly every 50 ticks.
    pub arrival_rate: f64,

    /// Probability that a newly spawned task is malicious
    pub threat_probability: f64,

    /// Half-open range `[min, max)` for task CPU burst length in ticks
    ///
    /// Together with `arrival_rate` this sets the offered load: at the
    /// defaults, mean burst (~124 ticks) times arrival rate (1/50 ticks)
    /// asks for ~2.5 busy cores on average.
    pub burst_range: (u32, u32),

    /// Half-open range `[min, max)` for task priority (lower is more urgent)
    pub priority_range: (i32, i32),

    /// Ticks between metrics samples
    ///
    /// Cumulative counters (busy core-ticks, hotspot counts) accrue every
    /// tick regardless; this only sets the cadence of the time series.
    pub metrics_interval: Tick,

    // === MODELS ===
    pub thermal: ThermalConfig,
    pub security: SecurityConfig,
    pub single_aco: SingleAcoConfig,
    pub sentinels: SentinelConfig,
}

/// Per-core temperature dynamics
#[derive(Debug, Clone)]
pub struct ThermalConfig {
    /// Baseline temperature (degrees C); idle cores relax toward this
    pub ambient: f64,

    /// Degrees added per tick while a core executes a task
    pub active_increase: f64,

    /// Fraction of the excess over ambient shed per idle tick
    ///
    /// At the default (0.1) an idle core loses 10% of its excess heat per
    /// tick, so a core at 50C over ambient is back within 1C of ambient in
    /// about 40 ticks.
    pub idle_decay_rate: f64,

    /// Coupling strength toward the average of the two adjacent cores
    ///
    /// Must satisfy `idle_decay_rate + neighbor_influence <= 1`, otherwise
    /// an idle core between cool neighbors could undershoot ambient in a
    /// single step.
    pub neighbor_influence: f64,

    /// Temperature above which a core counts as a thermal hotspot
    pub hotspot_threshold: f64,
}

/// Stochastic detection of malicious tasks
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Per-tick probability of flagging a running malicious task
    ///
    /// The check repeats every tick the task runs undetected, so even
    /// modest values compound quickly: at 0.9 a malicious task survives
    /// three ticks unflagged with probability 0.001.
    pub detection_probability: f64,

    /// Per-tick probability of wrongly flagging a running benign task
    pub false_positive_probability: f64,
}

/// Parameters for the single-pheromone ACO scheduler
#[derive(Debug, Clone)]
pub struct SingleAcoConfig {
    /// Evaporation rate applied to the performance pheromone each tick
    pub rho: f64,

    /// Exponent on the pheromone term in the placement score
    pub alpha: f64,

    /// Exponent on the inverse-temperature heuristic in the placement score
    pub beta: f64,
}

/// Parameters for the stigmergic sentinels scheduler
///
/// Four pheromone fields are kept per core: attractive (performance),
/// threat (repulsive), environmental (thermal) and contention. The
/// attractive field evaporates at the contention rate `rho_contention`.
#[derive(Debug, Clone)]
pub struct SentinelConfig {
    /// Evaporation rate for the threat pheromone
    pub rho_threat: f64,

    /// Evaporation rate for the environmental pheromone; also scales the
    /// per-tick temperature deposit
    pub rho_env: f64,

    /// Evaporation rate for the contention and attractive pheromones; also
    /// the per-tick deposit on busy cores
    pub rho_contention: f64,

    /// Exponent on the attractive pheromone (numerator)
    pub alpha: f64,

    /// Exponent on the shorter-job-first heuristic (numerator)
    pub beta: f64,

    /// Exponent on the threat pheromone (denominator)
    ///
    /// The default (2.0) makes threat the strongest repulsive signal: a
    /// single detection on a core crushes its score until the pheromone
    /// evaporates.
    pub gamma: f64,

    /// Exponent on the environmental pheromone (denominator)
    pub delta: f64,

    /// Exponent on the contention pheromone (denominator)
    pub epsilon: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_cores: 8,
            duration: 20_000,
            arrival_rate: 20.0,
            threat_probability: 0.05,
            burst_range: (50, 200),
            priority_range: (1, 5),
            metrics_interval: 200,
            thermal: ThermalConfig::default(),
            security: SecurityConfig::default(),
            single_aco: SingleAcoConfig::default(),
            sentinels: SentinelConfig::default(),
        }
    }
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            ambient: 40.0,
            active_increase: 0.5,
            idle_decay_rate: 0.1,
            neighbor_influence: 0.01,
            hotspot_threshold: 85.0,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            detection_probability: 0.9,
            false_positive_probability: 0.001,
        }
    }
}

impl Default for SingleAcoConfig {
    fn default() -> Self {
        Self {
            rho: 0.1,
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            rho_threat: 0.1,
            rho_env: 0.05,
            rho_contention: 0.08,
            alpha: 1.0,
            beta: 1.0,
            gamma: 2.0,
            delta: 1.5,
            epsilon: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Check the configuration before a run; all failures are reported as
    /// [`SimError::InvalidConfig`] so a bad setup dies at startup instead
    /// of mid-simulation.
    pub fn validate(&self) -> Result<()> {
        fn probability(name: &str, value: f64) -> Result<()> {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
            Ok(())
        }

        if self.num_cores == 0 {
            return Err(SimError::InvalidConfig(
                "num_cores must be at least 1".into(),
            ));
        }
        if self.duration == 0 {
            return Err(SimError::InvalidConfig(
                "duration must be at least 1 tick".into(),
            ));
        }
        if self.metrics_interval == 0 {
            return Err(SimError::InvalidConfig(
                "metrics_interval must be at least 1 tick".into(),
            ));
        }
        if !self.arrival_rate.is_finite() || self.arrival_rate < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "arrival_rate must be finite and non-negative, got {}",
                self.arrival_rate
            )));
        }
        probability("threat_probability", self.threat_probability)?;

        if self.burst_range.0 == 0 {
            return Err(SimError::InvalidConfig(
                "burst_range minimum must be at least 1 tick".into(),
            ));
        }
        if self.burst_range.0 >= self.burst_range.1 {
            return Err(SimError::InvalidConfig(format!(
                "burst_range [{}, {}) is empty",
                self.burst_range.0, self.burst_range.1
            )));
        }
        if self.priority_range.0 >= self.priority_range.1 {
            return Err(SimError::InvalidConfig(format!(
                "priority_range [{}, {}) is empty",
                self.priority_range.0, self.priority_range.1
            )));
        }

        let t = &self.thermal;
        if !t.ambient.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "thermal.ambient must be finite, got {}",
                t.ambient
            )));
        }
        if !t.active_increase.is_finite() || t.active_increase < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "thermal.active_increase must be finite and non-negative, got {}",
                t.active_increase
            )));
        }
        probability("thermal.idle_decay_rate", t.idle_decay_rate)?;
        probability("thermal.neighbor_influence", t.neighbor_influence)?;
        if t.idle_decay_rate + t.neighbor_influence > 1.0 {
            return Err(SimError::InvalidConfig(format!(
                "thermal.idle_decay_rate ({}) + thermal.neighbor_influence ({}) must not exceed 1, \
                 or idle cores can undershoot ambient",
                t.idle_decay_rate, t.neighbor_influence
            )));
        }

        probability(
            "security.detection_probability",
            self.security.detection_probability,
        )?;
        probability(
            "security.false_positive_probability",
            self.security.false_positive_probability,
        )?;

        probability("single_aco.rho", self.single_aco.rho)?;
        for (name, value) in [
            ("single_aco.alpha", self.single_aco.alpha),
            ("single_aco.beta", self.single_aco.beta),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        let s = &self.sentinels;
        probability("sentinels.rho_threat", s.rho_threat)?;
        probability("sentinels.rho_env", s.rho_env)?;
        probability("sentinels.rho_contention", s.rho_contention)?;
        for (name, value) in [
            ("sentinels.alpha", s.alpha),
            ("sentinels.beta", s.beta),
            ("sentinels.gamma", s.gamma),
            ("sentinels.delta", s.delta),
            ("sentinels.epsilon", s.epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
