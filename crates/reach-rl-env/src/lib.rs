//! 2D robot-arm reaching environment
//!
//! A point "arm tip" moves on the unit square in fixed increments and is
//! rewarded for closing the distance to a randomly placed target.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod robot_arm;
pub mod types;

// Re-export environments
pub use robot_arm::{ArmConfig, RobotArmEnv};
pub use types::{ArmAction, ArmObservation, Position};

// Re-export core types
pub use reach_rl_core::{
    Action, ActionSpace, Environment, Observation, ObservationSpace, Outcome, Reward, Step,
    StepInfo,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ArmAction, ArmConfig, ArmObservation, Position, RobotArmEnv};
    pub use reach_rl_core::prelude::*;
}
