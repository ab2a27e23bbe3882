//! Exploration policies

use std::convert::Infallible;

use rand::{Rng, RngCore};

use crate::ActionSpace;

/// Epsilon-greedy action selection.
///
/// With probability `epsilon` a uniformly random action is drawn from the
/// action space; otherwise the caller's greedy choice is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    /// Exploration rate
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Create a new epsilon-greedy policy
    ///
    /// # Errors
    ///
    /// Returns [`crate::RLError::InvalidConfig`] when `epsilon` is outside `[0, 1]`.
    pub fn new(epsilon: f64) -> crate::Result<Self> {
        crate::error::ensure_unit_interval("epsilon", epsilon)?;
        Ok(Self { epsilon })
    }

    /// Policy that never explores
    #[must_use]
    pub fn greedy() -> Self {
        Self { epsilon: 0.0 }
    }

    /// Current exploration rate
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Set the exploration rate
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    /// Pick an action, exploring with probability `epsilon`
    pub fn select<S, F>(&self, rng: &mut dyn RngCore, space: &S, greedy: F) -> S::Action
    where
        S: ActionSpace + ?Sized,
        F: FnOnce() -> S::Action,
    {
        match self.try_select(rng, space, || Ok::<_, Infallible>(greedy())) {
            Ok(action) => action,
            Err(never) => match never {},
        }
    }

    /// Like [`EpsilonGreedy::select`] with a fallible greedy lookup
    ///
    /// `greedy` only runs when the policy does not explore.
    ///
    /// # Errors
    ///
    /// Returns whatever error `greedy` produces.
    pub fn try_select<S, F, E>(
        &self,
        rng: &mut dyn RngCore,
        space: &S,
        greedy: F,
    ) -> std::result::Result<S::Action, E>
    where
        S: ActionSpace + ?Sized,
        F: FnOnce() -> std::result::Result<S::Action, E>,
    {
        // Zero epsilon never touches the random source
        if self.epsilon > 0.0 && rng.gen::<f64>() < self.epsilon {
            Ok(space.sample(rng))
        } else {
            greedy()
        }
    }
}
