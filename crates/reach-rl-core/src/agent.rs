//! Agent traits and types

use serde::{Deserialize, Serialize};

use crate::{Action, Observation, Transition};

/// Core agent trait
pub trait Agent: Send {
    /// Observation type
    type Observation: Observation;
    /// Action type
    type Action: Action;

    /// Select an action given an observation
    ///
    /// # Errors
    ///
    /// Returns an error if the observation cannot be mapped to an action.
    fn act(&mut self, observation: &Self::Observation) -> crate::Result<Self::Action>;

    /// Process a transition from the environment (for learning)
    ///
    /// # Errors
    ///
    /// Learning agents report observations they cannot incorporate.
    fn observe(
        &mut self,
        _transition: &Transition<Self::Observation, Self::Action>,
    ) -> crate::Result<()> {
        Ok(()) // Default: no learning
    }

    /// Called once an episode has ended
    fn end_episode(&mut self, _total_reward: f64) {}

    /// Get agent metrics
    fn metrics(&self) -> AgentMetrics {
        AgentMetrics::default()
    }
}

/// Agent metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentMetrics {
    /// Total steps taken
    pub total_steps: usize,
    /// Total episodes
    pub total_episodes: usize,
    /// Average reward per episode
    pub avg_episode_reward: f64,
    /// Loss value
    pub loss: Option<f64>,
    /// Additional metrics
    #[serde(flatten)]
    pub custom: serde_json::Map<String, serde_json::Value>,
}
