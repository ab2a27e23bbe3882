//! Dense action-value table

use ndarray::{Array3, ArrayView1};

use reach_rl_core::{DiscreteAction, RLError, Result};
use reach_rl_env::ArmAction;

use crate::discretize::StateBin;

/// Action values indexed by `(x_bin, y_bin, action)`
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Array3<f64>,
    bins: usize,
}

impl QTable {
    /// Zero-initialised table for a `bins x bins` grid
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidConfig`] when `bins` is zero.
    pub fn new(bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(RLError::InvalidConfig("bins must be at least 1".into()));
        }
        Ok(Self {
            values: Array3::zeros((bins, bins, ArmAction::COUNT)),
            bins,
        })
    }

    /// Cells per axis
    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Underlying array
    #[must_use]
    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// Values of every action in `state`
    ///
    /// # Errors
    ///
    /// Returns [`RLError::DimensionMismatch`] if `state` was binned for a
    /// different grid size.
    pub fn row(&self, state: StateBin) -> Result<ArrayView1<'_, f64>> {
        self.check(state)?;
        Ok(self.values.slice(ndarray::s![state.x(), state.y(), ..]))
    }

    /// Value of taking `action` in `state`
    ///
    /// # Errors
    ///
    /// Returns [`RLError::DimensionMismatch`] for a state from another grid.
    pub fn get(&self, state: StateBin, action: ArmAction) -> Result<f64> {
        self.check(state)?;
        Ok(self.values[[state.x(), state.y(), action.index()]])
    }

    /// Overwrite the value of `action` in `state`
    ///
    /// # Errors
    ///
    /// Returns [`RLError::DimensionMismatch`] for a state from another grid.
    pub fn set(&mut self, state: StateBin, action: ArmAction, value: f64) -> Result<()> {
        self.check(state)?;
        self.values[[state.x(), state.y(), action.index()]] = value;
        Ok(())
    }

    /// Largest action value in `state`
    ///
    /// # Errors
    ///
    /// Returns [`RLError::DimensionMismatch`] for a state from another grid.
    pub fn max_value(&self, state: StateBin) -> Result<f64> {
        Ok(self
            .row(state)?
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max))
    }

    /// Highest-valued action in `state`; ties go to the lowest action index
    ///
    /// # Errors
    ///
    /// Returns [`RLError::DimensionMismatch`] for a state from another grid.
    pub fn best_action(&self, state: StateBin) -> Result<ArmAction> {
        let row = self.row(state)?;
        let mut best = 0;
        for (index, value) in row.iter().enumerate().skip(1) {
            if *value > row[best] {
                best = index;
            }
        }
        ArmAction::from_index(best)
    }

    /// Blend `target` into the entry: `(1 - alpha) * old + alpha * target`
    ///
    /// Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`RLError::DimensionMismatch`] for a state from another grid.
    pub fn blend(
        &mut self,
        state: StateBin,
        action: ArmAction,
        target: f64,
        alpha: f64,
    ) -> Result<f64> {
        let old = self.get(state, action)?;
        let new = (1.0 - alpha) * old + alpha * target;
        self.set(state, action, new)?;
        Ok(new)
    }

    /// Whether every entry is finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    fn check(&self, state: StateBin) -> Result<()> {
        if state.bins() == self.bins {
            Ok(())
        } else {
            Err(RLError::DimensionMismatch {
                expected: self.bins,
                actual: state.bins(),
            })
        }
    }
}
