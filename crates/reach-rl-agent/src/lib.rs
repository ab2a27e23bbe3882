//! Tabular Q-learning for the robot-arm reaching task
//!
//! This crate provides:
//! - state discretization of the arm-to-target offset
//! - a dense value table and an epsilon-greedy Q-learning agent
//! - exploration schedules
//! - the training loop and a greedy evaluation episode

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod discretize;
pub mod evaluation;
pub mod q_learning;
pub mod q_table;
pub mod schedule;
pub mod trainer;

// Re-export agents
pub use q_learning::{QLearningAgent, QLearningConfig};

// Re-export building blocks
pub use discretize::{discretize, Discretizer, StateBin};
pub use evaluation::{evaluate, EvaluationReport, EvaluationStep};
pub use q_table::QTable;
pub use trainer::{setup, ProgressLine, Trainer, TrainerConfig, TrainingReport};
pub use schedule::EpsilonSchedule;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        evaluate, setup, QLearningAgent, QLearningConfig, Trainer, TrainerConfig,
    };
    pub use reach_rl_core::prelude::*;
}
