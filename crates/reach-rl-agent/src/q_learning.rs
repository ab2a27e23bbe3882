//! Epsilon-greedy tabular Q-learning

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use reach_rl_core::error::ensure_unit_interval;
use reach_rl_core::{
    Agent, AgentMetrics, DiscreteSpace, EpsilonGreedy, RLError, Result, Transition,
};
use reach_rl_env::{ArmAction, ArmObservation};

use crate::discretize::{Discretizer, StateBin};
use crate::q_table::QTable;

/// Q-learning hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Cells per axis of the state grid
    pub bins: usize,
    /// Discount factor
    pub gamma: f64,
    /// Learning rate
    pub alpha: f64,
    /// Exploration rate
    pub epsilon: f64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            bins: 7,
            gamma: 0.95,
            alpha: 0.1,
            epsilon: 0.2,
        }
    }
}

impl QLearningConfig {
    /// Check every parameter
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(RLError::InvalidConfig("bins must be at least 1".into()));
        }
        ensure_unit_interval("gamma", self.gamma)?;
        ensure_unit_interval("alpha", self.alpha)?;
        ensure_unit_interval("epsilon", self.epsilon)?;
        Ok(())
    }
}

/// Tabular Q-learning agent over binned arm-to-target offsets.
///
/// The agent owns the value table and its own random source for
/// exploration.
pub struct QLearningAgent {
    config: QLearningConfig,
    discretizer: Discretizer,
    table: QTable,
    policy: EpsilonGreedy,
    action_space: DiscreteSpace<ArmAction>,
    rng: StdRng,
    metrics: AgentMetrics,
    td_error_sum: f64,
}

impl QLearningAgent {
    /// Create an agent with a zeroed table
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: QLearningConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            discretizer: Discretizer::new(config.bins)?,
            table: QTable::new(config.bins)?,
            policy: EpsilonGreedy::new(config.epsilon)?,
            action_space: DiscreteSpace::new(),
            rng,
            metrics: AgentMetrics::default(),
            td_error_sum: 0.0,
            config,
        })
    }

    /// Hyperparameters in use
    #[must_use]
    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    /// Learned action values
    #[must_use]
    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// State binning
    #[must_use]
    pub fn discretizer(&self) -> &Discretizer {
        &self.discretizer
    }

    /// Current exploration rate
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.policy.epsilon()
    }

    /// Change the exploration rate (clamped to `[0, 1]`)
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.policy.set_epsilon(epsilon);
    }

    /// Grid cell of an observation
    #[must_use]
    pub fn state(&self, observation: &ArmObservation) -> StateBin {
        self.discretizer.observe(observation)
    }

    /// Best known action for an observation, without exploring
    ///
    /// # Errors
    ///
    /// Propagates table lookup failures.
    pub fn greedy_action(&self, observation: &ArmObservation) -> Result<ArmAction> {
        self.table.best_action(self.state(observation))
    }

    /// One-step Q-learning update; returns the temporal-difference error
    ///
    /// `target = reward + gamma * max_a Q(next, a)` is blended into
    /// `Q(state, action)` with weight `alpha`.
    ///
    /// # Errors
    ///
    /// Propagates table lookup failures.
    pub fn update(
        &mut self,
        state: StateBin,
        action: ArmAction,
        reward: f64,
        next_state: StateBin,
    ) -> Result<f64> {
        let best_next = self.table.max_value(next_state)?;
        let target = reward + self.config.gamma * best_next;
        let old = self.table.get(state, action)?;
        let new = self.table.blend(state, action, target, self.config.alpha)?;

        trace!(?state, %action, old, new, target, "q update");
        Ok(target - old)
    }
}

impl Agent for QLearningAgent {
    type Observation = ArmObservation;
    type Action = ArmAction;

    fn act(&mut self, observation: &Self::Observation) -> Result<Self::Action> {
        let state = self.state(observation);
        let table = &self.table;
        self.policy
            .try_select(&mut self.rng, &self.action_space, || table.best_action(state))
    }

    fn observe(&mut self, transition: &Transition<Self::Observation, Self::Action>) -> Result<()> {
        let state = self.state(&transition.observation);
        let next_state = self.state(&transition.next_observation);
        let td_error = self.update(state, transition.action, transition.reward.0, next_state)?;

        self.metrics.total_steps += 1;
        self.td_error_sum += td_error.abs();
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn end_episode(&mut self, total_reward: f64) {
        let metrics = &mut self.metrics;
        metrics.total_episodes += 1;
        metrics.avg_episode_reward +=
            (total_reward - metrics.avg_episode_reward) / metrics.total_episodes as f64;
    }

    #[allow(clippy::cast_precision_loss)]
    fn metrics(&self) -> AgentMetrics {
        let mut metrics = self.metrics.clone();
        if metrics.total_steps > 0 {
            metrics.loss = Some(self.td_error_sum / metrics.total_steps as f64);
        }
        metrics
            .custom
            .insert("epsilon".to_string(), serde_json::json!(self.epsilon()));
        metrics
    }
}
