//! Core reinforcement learning traits and types for the reaching sandbox
//!
//! This crate provides the vocabulary shared by environments and agents:
//! actions and action spaces, observations, rewards, step results with a
//! tagged episode outcome, and the episode bookkeeping wrapper.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod agent;
pub mod environment;
pub mod error;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod trajectory;

// Re-export core traits and types
pub use action::{Action, ActionSpace, DiscreteAction, DiscreteSpace};
pub use agent::{Agent, AgentMetrics};
pub use environment::{Environment, Episode, Outcome, Step, StepInfo, TrackedEnvironment};
pub use error::{RLError, Result};
pub use observation::{BoxObservationSpace, Observation, ObservationSpace};
pub use policy::EpsilonGreedy;
pub use reward::Reward;
pub use trajectory::{Trajectory, Transition};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionSpace, Agent, Environment, Observation, ObservationSpace, Outcome, Result,
        Reward, Step,
    };
}
