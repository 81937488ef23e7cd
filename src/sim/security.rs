//! Stochastic detection of malicious tasks

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SecurityConfig;
use crate::sim::task::Task;

/// Outcome of one per-tick check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the task is (now) flagged
    pub detected: bool,
    /// Whether the flag matches ground truth
    pub correct: bool,
}

pub struct SecurityMonitor {
    config: SecurityConfig,
}

impl SecurityMonitor {
    pub fn new(config: SecurityConfig) -> Self {
        Self { config }
    }

    /// Check one running task
    ///
    /// An already-flagged task reports `(detected, correct) = (true, true)`
    /// without consuming randomness. Otherwise exactly one draw is consumed:
    /// a malicious task is flagged with `detection_probability`, a benign
    /// one with `false_positive_probability`. The check repeats every tick
    /// the task runs, so detection odds compound over its burst.
    pub fn check(&self, task: &Task, rng: &mut ChaCha8Rng) -> Verdict {
        if task.detected_malicious {
            return Verdict {
                detected: true,
                correct: true,
            };
        }

        if task.malicious {
            if rng.gen::<f64>() < self.config.detection_probability {
                return Verdict {
                    detected: true,
                    correct: true,
                };
            }
        } else if rng.gen::<f64>() < self.config.false_positive_probability {
            return Verdict {
                detected: true,
                correct: false,
            };
        }

        Verdict {
            detected: false,
            correct: false,
        }
    }
}
