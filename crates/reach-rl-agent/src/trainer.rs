//! Episode loop that trains a [`QLearningAgent`] against an environment

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use reach_rl_core::{Agent, Environment, Outcome, RLError, Result, Transition};
use reach_rl_env::{ArmAction, ArmConfig, ArmObservation, RobotArmEnv};

use crate::q_learning::{QLearningAgent, QLearningConfig};
use crate::schedule::EpsilonSchedule;

/// Offset between the environment seed and the agent seed
const AGENT_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// Training run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Episodes to train for
    pub episodes: usize,
    /// Report progress every this many episodes
    pub report_interval: usize,
    /// Step cap of the greedy evaluation episode
    pub eval_max_steps: usize,
    /// Seed for the environment and agent random sources
    pub seed: Option<u64>,
    /// Per-episode exploration rate; the agent's own rate when unset
    pub epsilon_schedule: Option<EpsilonSchedule>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            report_interval: 50,
            eval_max_steps: 50,
            seed: None,
            epsilon_schedule: None,
        }
    }
}

impl TrainerConfig {
    /// Check every parameter
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.report_interval == 0 {
            return Err(RLError::InvalidConfig(
                "report_interval must be at least 1".into(),
            ));
        }
        if self.eval_max_steps == 0 {
            return Err(RLError::InvalidConfig(
                "eval_max_steps must be at least 1".into(),
            ));
        }
        if let Some(schedule) = &self.epsilon_schedule {
            schedule.validate()?;
        }
        Ok(())
    }
}

/// Build an environment and agent whose random sources derive from one seed
///
/// # Errors
///
/// Returns [`RLError::InvalidConfig`] if either configuration is rejected.
pub fn setup(
    arm: ArmConfig,
    q: QLearningConfig,
    seed: Option<u64>,
) -> Result<(RobotArmEnv, QLearningAgent)> {
    let env = RobotArmEnv::new(arm, seed)?;
    let agent = QLearningAgent::new(q, seed.map(|s| s.wrapping_add(AGENT_SEED_OFFSET)))?;
    Ok((env, agent))
}

/// Periodic progress entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressLine {
    /// 1-based episode number
    pub episode: usize,
    /// Episodes in the run
    pub episodes: usize,
    /// Cumulative reward of that episode
    pub total_reward: f64,
}

impl fmt::Display for ProgressLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Episode {}/{}, total reward: {:.3}",
            self.episode, self.episodes, self.total_reward
        )
    }
}

/// Per-episode results of a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Cumulative reward of each episode
    pub episode_rewards: Vec<f64>,
    /// Steps taken in each episode
    pub episode_steps: Vec<usize>,
    /// How each episode ended
    pub outcomes: Vec<Outcome>,
    /// Entries emitted every `report_interval` episodes
    pub progress: Vec<ProgressLine>,
}

impl TrainingReport {
    /// Episodes that reached the target
    #[must_use]
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Mean reward over the last `n` episodes
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn recent_mean_reward(&self, n: usize) -> Option<f64> {
        let tail = &self.episode_rewards[self.episode_rewards.len().saturating_sub(n)..];
        if tail.is_empty() {
            None
        } else {
            Some(tail.iter().sum::<f64>() / tail.len() as f64)
        }
    }
}

/// Runs Q-learning episodes
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Create a trainer
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run parameters
    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train `agent` for the configured number of episodes
    ///
    /// # Errors
    ///
    /// Propagates environment and agent failures.
    pub fn train<E>(&self, env: &mut E, agent: &mut QLearningAgent) -> Result<TrainingReport>
    where
        E: Environment<Observation = ArmObservation, Action = ArmAction>,
    {
        self.train_with(env, agent, |_| {})
    }

    /// Train like [`Trainer::train`], handing each progress entry to
    /// `on_progress` as soon as its episode completes
    ///
    /// # Errors
    ///
    /// Propagates environment and agent failures.
    pub fn train_with<E, F>(
        &self,
        env: &mut E,
        agent: &mut QLearningAgent,
        mut on_progress: F,
    ) -> Result<TrainingReport>
    where
        E: Environment<Observation = ArmObservation, Action = ArmAction>,
        F: FnMut(&ProgressLine),
    {
        let episodes = self.config.episodes;
        let mut report = TrainingReport::default();

        for episode in 0..episodes {
            if let Some(schedule) = &self.config.epsilon_schedule {
                agent.set_epsilon(schedule.at(episode));
            }

            let (mut observation, _info) = env.reset(None)?;
            let mut total_reward = 0.0;
            let mut steps = 0;

            let outcome = loop {
                let action = agent.act(&observation)?;
                let step = env.step(action)?;

                agent.observe(&Transition {
                    observation,
                    action,
                    reward: step.reward,
                    next_observation: step.observation,
                    done: step.done(),
                })?;

                total_reward += step.reward.0;
                steps += 1;
                observation = step.observation;

                if step.done() {
                    break step.outcome;
                }
            };
            agent.end_episode(total_reward);

            debug!(
                episode = episode + 1,
                steps,
                total_reward,
                ?outcome,
                epsilon = agent.epsilon(),
                "episode complete"
            );

            report.episode_rewards.push(total_reward);
            report.episode_steps.push(steps);
            report.outcomes.push(outcome);

            if (episode + 1) % self.config.report_interval == 0 {
                let line = ProgressLine {
                    episode: episode + 1,
                    episodes,
                    total_reward,
                };
                info!(
                    episode = line.episode,
                    total_reward = line.total_reward,
                    successes = report.successes(),
                    "{line}"
                );
                on_progress(&line);
                report.progress.push(line);
            }
        }

        if !agent.table().is_finite() {
            warn!("value table contains non-finite entries after training");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(episodes: usize, seed: u64) -> TrainerConfig {
        TrainerConfig {
            episodes,
            seed: Some(seed),
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn test_trainer_config_validation() {
        assert!(Trainer::new(TrainerConfig::default()).is_ok());
        assert!(Trainer::new(TrainerConfig {
            report_interval: 0,
            ..TrainerConfig::default()
        })
        .is_err());
        assert!(Trainer::new(TrainerConfig {
            eval_max_steps: 0,
            ..TrainerConfig::default()
        })
        .is_err());
        assert!(Trainer::new(TrainerConfig {
            epsilon_schedule: Some(EpsilonSchedule::Constant { epsilon: 1.5 }),
            ..TrainerConfig::default()
        })
        .is_err());
    }

    #[test]
    fn test_report_every_interval() {
        let config = quick_config(120, 11);
        let (mut env, mut agent) =
            setup(ArmConfig::default(), QLearningConfig::default(), config.seed).unwrap();
        let report = Trainer::new(config)
            .unwrap()
            .train(&mut env, &mut agent)
            .unwrap();

        assert_eq!(report.episode_rewards.len(), 120);
        assert_eq!(report.outcomes.len(), 120);
        let marks: Vec<usize> = report.progress.iter().map(|p| p.episode).collect();
        assert_eq!(marks, vec![50, 100]);
        assert_eq!(report.progress[0].total_reward, report.episode_rewards[49]);
        assert!(report.episode_steps.iter().all(|s| (1..=50).contains(s)));
    }

    #[test]
    fn test_progress_is_delivered_during_training() {
        let config = quick_config(120, 5);
        let (mut env, mut agent) =
            setup(ArmConfig::default(), QLearningConfig::default(), config.seed).unwrap();

        let mut seen = Vec::new();
        let report = Trainer::new(config)
            .unwrap()
            .train_with(&mut env, &mut agent, |line| {
                seen.push((line.episode, line.episodes, line.total_reward));
            })
            .unwrap();

        assert_eq!(
            seen,
            vec![
                (50, 120, report.episode_rewards[49]),
                (100, 120, report.episode_rewards[99]),
            ]
        );
    }

    #[test]
    fn test_epsilon_schedule_is_applied() {
        let config = TrainerConfig {
            epsilon_schedule: Some(EpsilonSchedule::Linear {
                start: 1.0,
                end: 0.0,
                episodes: 10,
            }),
            ..quick_config(10, 2)
        };
        let (mut env, mut agent) =
            setup(ArmConfig::default(), QLearningConfig::default(), config.seed).unwrap();
        Trainer::new(config)
            .unwrap()
            .train(&mut env, &mut agent)
            .unwrap();

        // Last episode ran with the value for t = 9
        assert!((agent.epsilon() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_progress_line_format() {
        let line = ProgressLine {
            episode: 50,
            episodes: 500,
            total_reward: -12.3456,
        };
        assert_eq!(line.to_string(), "Episode 50/500, total reward: -12.346");
    }

    #[test]
    fn test_recent_mean_reward() {
        let report = TrainingReport {
            episode_rewards: vec![1.0, 2.0, 3.0, 4.0],
            ..TrainingReport::default()
        };
        assert_eq!(report.recent_mean_reward(2), Some(3.5));
        assert_eq!(report.recent_mean_reward(10), Some(2.5));
        assert_eq!(TrainingReport::default().recent_mean_reward(3), None);
    }
}
