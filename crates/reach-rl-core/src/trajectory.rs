//! Transitions and trajectories

use serde::{Deserialize, Serialize};

use crate::Reward;

/// Single transition in a trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition<O, A> {
    /// Current observation
    pub observation: O,
    /// Action taken
    pub action: A,
    /// Reward received
    pub reward: Reward,
    /// Next observation
    pub next_observation: O,
    /// Whether episode ended
    pub done: bool,
}

/// Complete trajectory of an episode
#[derive(Debug, Clone)]
pub struct Trajectory<O, A> {
    /// Sequence of transitions
    pub transitions: Vec<Transition<O, A>>,
    /// Total reward
    pub total_reward: f64,
}

impl<O, A> Trajectory<O, A> {
    /// Create a new empty trajectory
    #[must_use]
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
            total_reward: 0.0,
        }
    }

    /// Add a transition to the trajectory
    pub fn push(&mut self, transition: Transition<O, A>) {
        self.total_reward += transition.reward.0;
        self.transitions.push(transition);
    }

    /// Get the length of the trajectory
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if trajectory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Compute returns (cumulative discounted rewards)
    #[must_use]
    pub fn returns(&self, gamma: f64) -> Vec<f64> {
        let mut returns = vec![0.0; self.len()];
        let mut running_return = 0.0;

        for i in (0..self.len()).rev() {
            if self.transitions[i].done {
                running_return = 0.0;
            }
            running_return = self.transitions[i].reward.0 + gamma * running_return;
            returns[i] = running_return;
        }

        returns
    }
}

impl<O, A> Default for Trajectory<O, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(reward: f64, done: bool) -> Transition<(), ()> {
        Transition {
            observation: (),
            action: (),
            reward: Reward(reward),
            next_observation: (),
            done,
        }
    }

    #[test]
    fn test_returns_discount_backwards() {
        let mut trajectory = Trajectory::new();
        trajectory.push(transition(1.0, false));
        trajectory.push(transition(1.0, false));
        trajectory.push(transition(1.0, true));

        assert_eq!(trajectory.len(), 3);
        assert!((trajectory.total_reward - 3.0).abs() < 1e-12);

        let returns = trajectory.returns(0.5);
        assert!((returns[2] - 1.0).abs() < 1e-12);
        assert!((returns[1] - 1.5).abs() < 1e-12);
        assert!((returns[0] - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_empty_trajectory() {
        let trajectory: Trajectory<(), ()> = Trajectory::default();
        assert!(trajectory.is_empty());
        assert!(trajectory.returns(0.9).is_empty());
    }
}
