//! Exploration-rate schedules over training episodes

use serde::{Deserialize, Serialize};

use reach_rl_core::error::ensure_unit_interval;
use reach_rl_core::{RLError, Result};

/// Exploration rate as a function of the 0-based episode number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpsilonSchedule {
    /// Same rate for every episode
    Constant {
        /// Exploration rate
        epsilon: f64,
    },
    /// Straight line from `start` to `end`, then flat
    Linear {
        /// Rate at episode 0
        start: f64,
        /// Rate from `episodes` onwards
        end: f64,
        /// Length of the ramp
        episodes: usize,
    },
    /// `start * decay^episode`, never below `min`
    Exponential {
        /// Rate at episode 0
        start: f64,
        /// Floor
        min: f64,
        /// Per-episode multiplier
        decay: f64,
    },
}

impl EpsilonSchedule {
    /// Rate to use for `episode`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn at(&self, episode: usize) -> f64 {
        match *self {
            Self::Constant { epsilon } => epsilon,
            Self::Linear {
                start,
                end,
                episodes,
            } => {
                if episode >= episodes {
                    end
                } else {
                    start + (end - start) * (episode as f64 / episodes as f64)
                }
            }
            Self::Exponential { start, min, decay } => {
                (start * decay.powf(episode as f64)).max(min)
            }
        }
    }

    /// Check that every rate the schedule can produce is a probability
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Constant { epsilon } => ensure_unit_interval("epsilon", epsilon),
            Self::Linear { start, end, .. } => {
                ensure_unit_interval("schedule start", start)?;
                ensure_unit_interval("schedule end", end)
            }
            Self::Exponential { start, min, decay } => {
                ensure_unit_interval("schedule start", start)?;
                ensure_unit_interval("schedule min", min)?;
                if !(decay > 0.0 && decay <= 1.0) {
                    return Err(RLError::InvalidConfig(format!(
                        "schedule decay must be in (0, 1], got {decay}"
                    )));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_linear_ramp() {
        let schedule = EpsilonSchedule::Linear {
            start: 1.0,
            end: 0.0,
            episodes: 10,
        };
        assert_abs_diff_eq!(schedule.at(0), 1.0);
        assert_abs_diff_eq!(schedule.at(5), 0.5);
        assert_abs_diff_eq!(schedule.at(10), 0.0);
        assert_abs_diff_eq!(schedule.at(100), 0.0);
    }

    #[test]
    fn test_exponential_floors_at_minimum() {
        let schedule = EpsilonSchedule::Exponential {
            start: 1.0,
            min: 0.05,
            decay: 0.5,
        };
        assert_abs_diff_eq!(schedule.at(0), 1.0);
        assert_abs_diff_eq!(schedule.at(2), 0.25);
        assert_abs_diff_eq!(schedule.at(20), 0.05);
    }

    #[test]
    fn test_constant() {
        let schedule = EpsilonSchedule::Constant { epsilon: 0.2 };
        assert_abs_diff_eq!(schedule.at(0), 0.2);
        assert_abs_diff_eq!(schedule.at(499), 0.2);
    }

    #[test]
    fn test_validation() {
        assert!(EpsilonSchedule::Constant { epsilon: 1.2 }.validate().is_err());
        assert!(EpsilonSchedule::Linear {
            start: 0.5,
            end: -0.1,
            episodes: 3
        }
        .validate()
        .is_err());
        assert!(EpsilonSchedule::Exponential {
            start: 1.0,
            min: 0.0,
            decay: 0.0
        }
        .validate()
        .is_err());
        assert!(EpsilonSchedule::Exponential {
            start: 1.0,
            min: 0.01,
            decay: 0.99
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_serde_tagging() {
        let schedule: EpsilonSchedule =
            serde_json::from_str(r#"{"kind":"linear","start":0.3,"end":0.05,"episodes":400}"#)
                .unwrap();
        assert_eq!(
            schedule,
            EpsilonSchedule::Linear {
                start: 0.3,
                end: 0.05,
                episodes: 400
            }
        );
    }
}
