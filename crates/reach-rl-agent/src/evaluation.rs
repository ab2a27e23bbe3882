//! Greedy evaluation episode

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use reach_rl_core::{Environment, Outcome, Result, Trajectory, Transition};
use reach_rl_env::robot_arm::DISTANCE_KEY;
use reach_rl_env::{ArmAction, ArmObservation, Position};

use crate::q_learning::QLearningAgent;

/// One step of the evaluation episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationStep {
    /// 1-based step number
    pub step: usize,
    /// Action chosen
    pub action: ArmAction,
    /// Arm tip after the move
    pub agent: Position,
    /// Distance to the target after the move
    pub distance: f64,
    /// Reward received
    pub reward: f64,
}

impl fmt::Display for EvaluationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step {}: robot={}, distance={:.3}, reward={:.3}",
            self.step, self.agent, self.distance, self.reward
        )
    }
}

/// Result of a greedy evaluation episode
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Per-step diagnostics
    pub steps: Vec<EvaluationStep>,
    /// Status when the episode stopped; `InProgress` if the step cap cut it short
    pub outcome: Outcome,
    /// Recorded transitions
    pub trajectory: Trajectory<ArmObservation, ArmAction>,
}

impl EvaluationReport {
    /// Sum of rewards over the episode
    #[must_use]
    pub fn total_reward(&self) -> f64 {
        self.trajectory.total_reward
    }

    /// Discounted return from the first step
    #[must_use]
    pub fn discounted_return(&self, gamma: f64) -> f64 {
        self.trajectory.returns(gamma).first().copied().unwrap_or(0.0)
    }
}

/// Run one episode always taking the agent's best known action
///
/// Stops when the environment reports the episode done or after
/// `max_steps` steps, whichever comes first. The agent is not updated.
///
/// # Errors
///
/// Propagates environment and table lookup failures.
pub fn evaluate<E>(
    env: &mut E,
    agent: &QLearningAgent,
    max_steps: usize,
) -> Result<EvaluationReport>
where
    E: Environment<Observation = ArmObservation, Action = ArmAction>,
{
    let (mut observation, _info) = env.reset(None)?;
    let mut steps = Vec::new();
    let mut trajectory = Trajectory::new();
    let mut outcome = Outcome::InProgress;

    while !outcome.is_done() && steps.len() < max_steps {
        let action = agent.greedy_action(&observation)?;
        let step = env.step(action)?;

        let distance = step
            .info
            .number(DISTANCE_KEY)
            .unwrap_or_else(|| step.observation.distance());
        steps.push(EvaluationStep {
            step: steps.len() + 1,
            action,
            agent: step.observation.agent,
            distance,
            reward: step.reward.0,
        });
        trajectory.push(Transition {
            observation,
            action,
            reward: step.reward,
            next_observation: step.observation,
            done: step.done(),
        });

        observation = step.observation;
        outcome = step.outcome;
    }

    info!(
        steps = steps.len(),
        total_reward = trajectory.total_reward,
        ?outcome,
        "evaluation finished"
    );

    Ok(EvaluationReport {
        steps,
        outcome,
        trajectory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reach_rl_env::{ArmConfig, RobotArmEnv};

    use crate::q_learning::QLearningConfig;

    #[test]
    fn test_untrained_agent_walks_up_until_cap() {
        let mut env = RobotArmEnv::new(ArmConfig::default(), Some(4)).unwrap();
        let agent = QLearningAgent::new(QLearningConfig::default(), Some(4)).unwrap();

        // All-zero table: ties pick Up every step
        let report = evaluate(&mut env, &agent, 10).unwrap();

        assert!(!report.steps.is_empty() && report.steps.len() <= 10);
        assert!(report.steps.iter().all(|s| s.action == ArmAction::Up));
        assert_eq!(report.steps.len(), report.trajectory.len());
        assert!(report.steps.iter().all(|s| s.agent.is_within(0.0, 1.0)));
        for (i, s) in report.steps.iter().enumerate() {
            assert_eq!(s.step, i + 1);
        }
    }

    #[test]
    fn test_cap_longer_than_episode_stops_on_done() {
        let mut env = RobotArmEnv::new(ArmConfig::default(), Some(8)).unwrap();
        let agent = QLearningAgent::new(QLearningConfig::default(), Some(8)).unwrap();

        let report = evaluate(&mut env, &agent, 500).unwrap();

        assert!(report.outcome.is_done());
        assert!(report.steps.len() <= 50);
        let summed: f64 = report.steps.iter().map(|s| s.reward).sum();
        assert!((summed - report.total_reward()).abs() < 1e-9);
    }

    #[test]
    fn test_discounted_return_weights_later_rewards_less() {
        let mut env = RobotArmEnv::new(ArmConfig::default(), Some(6)).unwrap();
        let agent = QLearningAgent::new(QLearningConfig::default(), Some(6)).unwrap();

        let report = evaluate(&mut env, &agent, 3).unwrap();
        let rewards: Vec<f64> = report.steps.iter().map(|s| s.reward).collect();
        let expected: f64 = rewards
            .iter()
            .enumerate()
            .map(|(i, r)| 0.5_f64.powi(i as i32) * r)
            .sum();

        assert!((report.discounted_return(0.5) - expected).abs() < 1e-9);
        assert!((report.discounted_return(1.0) - report.total_reward()).abs() < 1e-9);
    }

    #[test]
    fn test_step_line_format() {
        let step = EvaluationStep {
            step: 3,
            action: ArmAction::Right,
            agent: Position::new(0.35, 0.2),
            distance: 0.1234,
            reward: -0.1234,
        };
        assert_eq!(
            step.to_string(),
            "Step 3: robot=[0.350, 0.200], distance=0.123, reward=-0.123"
        );
    }
}
