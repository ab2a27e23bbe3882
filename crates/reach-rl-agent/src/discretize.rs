//! Binning of the arm-to-target offset
//!
//! The offset `goal - agent` lies in `[-1, 1]` on each axis. Each axis is
//! mapped linearly onto `[0, bins - 1]`, clipped and truncated, giving a
//! small grid the value table is indexed by.

use serde::{Deserialize, Serialize};

use reach_rl_core::{RLError, Result};
use reach_rl_env::{ArmObservation, Position};

/// Grid cell of a discretized state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateBin {
    x: usize,
    y: usize,
    bins: usize,
}

impl StateBin {
    /// Build a cell, checking both indices against the grid size
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidState`] if either index is `>= bins`.
    pub fn new(x: usize, y: usize, bins: usize) -> Result<Self> {
        if x >= bins || y >= bins {
            return Err(RLError::InvalidState(format!(
                "bin ({x}, {y}) outside a {bins}x{bins} grid"
            )));
        }
        Ok(Self { x, y, bins })
    }

    /// Horizontal bin
    #[must_use]
    pub fn x(&self) -> usize {
        self.x
    }

    /// Vertical bin
    #[must_use]
    pub fn y(&self) -> usize {
        self.y
    }

    /// Grid size this cell belongs to
    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }
}

/// Maps continuous arm/target positions onto a `bins x bins` grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discretizer {
    bins: usize,
}

impl Discretizer {
    /// Create a discretizer with `bins` cells per axis
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidConfig`] when `bins` is zero.
    pub fn new(bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(RLError::InvalidConfig("bins must be at least 1".into()));
        }
        Ok(Self { bins })
    }

    /// Cells per axis
    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Bin the offset from `agent` to `goal`
    #[must_use]
    pub fn discretize(&self, agent: &Position, goal: &Position) -> StateBin {
        let (dx, dy) = agent.offset_to(goal);
        StateBin {
            x: self.axis(dx),
            y: self.axis(dy),
            bins: self.bins,
        }
    }

    /// Bin an environment observation
    #[must_use]
    pub fn observe(&self, observation: &ArmObservation) -> StateBin {
        self.discretize(&observation.agent, &observation.goal)
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn axis(&self, diff: f64) -> usize {
        let top = (self.bins - 1) as f64;
        let idx = ((diff + 1.0) / 2.0 * top).clamp(0.0, top);
        // NaN casts to 0
        (idx as usize).min(self.bins - 1)
    }
}

/// Bin the offset `goal - agent` into a `bins x bins` grid
///
/// # Errors
///
/// Returns [`RLError::InvalidConfig`] when `bins` is zero.
pub fn discretize(agent: &Position, goal: &Position, bins: usize) -> Result<StateBin> {
    Ok(Discretizer::new(bins)?.discretize(agent, goal))
}
