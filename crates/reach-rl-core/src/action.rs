//! Action representations and action spaces

use std::fmt::Debug;
use std::marker::PhantomData;

use rand::{Rng, RngCore};

/// Trait for actions in an RL environment
pub trait Action: Clone + Debug + Send + Sync {
    /// Convert action to a vector representation
    fn to_vec(&self) -> Vec<f64>;
}

/// Actions drawn from a finite, ordered set.
///
/// The position of a variant in [`DiscreteAction::ALL`] is its index; tabular
/// agents use that index as the last axis of their value tables.
pub trait DiscreteAction: Action + Copy + PartialEq + 'static {
    /// Every action, in index order
    const ALL: &'static [Self];

    /// Number of distinct actions
    const COUNT: usize = Self::ALL.len();

    /// Index of this action within [`DiscreteAction::ALL`]
    fn index(self) -> usize;

    /// Look up an action by its index
    ///
    /// # Errors
    ///
    /// Returns [`crate::RLError::InvalidAction`] for indices outside `0..COUNT`.
    fn from_index(index: usize) -> crate::Result<Self> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            crate::RLError::InvalidAction(format!(
                "action code {index} is outside 0..{}",
                Self::COUNT
            ))
        })
    }
}

/// Trait for defining action spaces
pub trait ActionSpace: Send + Sync {
    /// The type of actions in this space
    type Action: Action;

    /// Sample a random action from the space using the caller's random source
    fn sample(&self, rng: &mut dyn RngCore) -> Self::Action;

    /// Check if an action is valid within this space
    fn contains(&self, action: &Self::Action) -> bool;

    /// Get the dimensionality of the action space
    fn dim(&self) -> Option<usize>;
}

/// Discrete action space over a [`DiscreteAction`] type
#[derive(Debug, Clone, Copy)]
pub struct DiscreteSpace<A> {
    /// Number of discrete actions
    pub n: usize,
    _marker: PhantomData<A>,
}

impl<A: DiscreteAction> DiscreteSpace<A> {
    /// Create the space covering every variant of `A`
    #[must_use]
    pub fn new() -> Self {
        Self {
            n: A::COUNT,
            _marker: PhantomData,
        }
    }
}

impl<A: DiscreteAction> Default for DiscreteSpace<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: DiscreteAction> ActionSpace for DiscreteSpace<A> {
    type Action = A;

    fn sample(&self, rng: &mut dyn RngCore) -> Self::Action {
        A::ALL[rng.gen_range(0..self.n)]
    }

    fn contains(&self, action: &Self::Action) -> bool {
        action.index() < self.n
    }

    fn dim(&self) -> Option<usize> {
        Some(1)
    }
}
