//! Observation representations and observation spaces

use std::fmt::Debug;

use rand::{Rng, RngCore};

/// Trait for observations from an environment
pub trait Observation: Clone + Debug + Send + Sync {
    /// Convert observation to a feature vector
    fn to_vec(&self) -> Vec<f64>;

    /// Get the shape of the observation
    fn shape(&self) -> Vec<usize>;
}

/// Trait for defining observation spaces
pub trait ObservationSpace: Send + Sync {
    /// Sample a random point of the space as a flat feature vector
    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f64>;

    /// Check if an observation is valid within this space
    fn contains(&self, obs: &dyn ObservationFeatures) -> bool;

    /// Get the shape of observations in this space
    fn shape(&self) -> Vec<usize>;
}

/// Object-safe view of an observation's features
pub trait ObservationFeatures {
    /// Flat feature vector
    fn features(&self) -> Vec<f64>;
}

impl<O: Observation> ObservationFeatures for O {
    fn features(&self) -> Vec<f64> {
        self.to_vec()
    }
}

/// Box observation space
#[derive(Debug, Clone)]
pub struct BoxObservationSpace {
    /// Lower bounds
    pub low: Vec<f64>,
    /// Upper bounds
    pub high: Vec<f64>,
    /// Shape of observations
    pub shape: Vec<usize>,
}

impl BoxObservationSpace {
    /// Box of `dim` coordinates, each in `[low, high]`
    #[must_use]
    pub fn uniform(dim: usize, low: f64, high: f64) -> Self {
        Self {
            low: vec![low; dim],
            high: vec![high; dim],
            shape: vec![dim],
        }
    }

    /// Check a raw feature vector against the bounds
    #[must_use]
    pub fn contains_vec(&self, data: &[f64]) -> bool {
        data.len() == self.low.len()
            && data
                .iter()
                .zip(&self.low)
                .zip(&self.high)
                .all(|((x, l), h)| x >= l && x <= h)
    }
}

impl ObservationSpace for BoxObservationSpace {
    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f64> {
        self.low
            .iter()
            .zip(&self.high)
            .map(|(l, h)| rng.gen_range(*l..=*h))
            .collect()
    }

    fn contains(&self, obs: &dyn ObservationFeatures) -> bool {
        self.contains_vec(&obs.features())
    }

    fn shape(&self) -> Vec<usize> {
        self.shape.clone()
    }
}
