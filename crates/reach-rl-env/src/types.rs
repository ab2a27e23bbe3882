//! Positions, actions and observations of the reaching task

use std::fmt;

use serde::{Deserialize, Serialize};

use reach_rl_core::{Action, DiscreteAction, Observation, RLError};

/// Point on the plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    #[must_use]
    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Signed per-axis offset `other - self`
    #[must_use]
    pub fn offset_to(&self, other: &Position) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }

    /// Clip both coordinates into `[low, high]`
    #[must_use]
    pub fn clamp(self, low: f64, high: f64) -> Self {
        Self {
            x: self.x.clamp(low, high),
            y: self.y.clamp(low, high),
        }
    }

    /// Whether both coordinates lie in `[low, high]`
    #[must_use]
    pub fn is_within(&self, low: f64, high: f64) -> bool {
        (low..=high).contains(&self.x) && (low..=high).contains(&self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}]", self.x, self.y)
    }
}

/// Move of the arm tip by one step along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmAction {
    /// +y
    Up,
    /// -y
    Down,
    /// -x
    Left,
    /// +x
    Right,
}

impl ArmAction {
    /// Displacement of this move for the given step size
    #[must_use]
    pub fn delta(self, step_size: f64) -> (f64, f64) {
        match self {
            Self::Up => (0.0, step_size),
            Self::Down => (0.0, -step_size),
            Self::Left => (-step_size, 0.0),
            Self::Right => (step_size, 0.0),
        }
    }
}

impl Action for ArmAction {
    fn to_vec(&self) -> Vec<f64> {
        vec![self.index() as f64]
    }
}

impl DiscreteAction for ArmAction {
    const ALL: &'static [Self] = &[Self::Up, Self::Down, Self::Left, Self::Right];

    fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

impl TryFrom<usize> for ArmAction {
    type Error = RLError;

    fn try_from(code: usize) -> Result<Self, Self::Error> {
        Self::from_index(code)
    }
}

impl fmt::Display for ArmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// Arm tip and target positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmObservation {
    /// Arm tip
    pub agent: Position,
    /// Target
    pub goal: Position,
}

impl ArmObservation {
    /// Distance from the arm tip to the target
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.agent.distance(&self.goal)
    }
}

impl Observation for ArmObservation {
    fn to_vec(&self) -> Vec<f64> {
        vec![self.agent.x, self.agent.y, self.goal.x, self.goal.y]
    }

    fn shape(&self) -> Vec<usize> {
        vec![4]
    }
}
