//! Environment traits and types

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Action, ActionSpace, Observation, ObservationSpace, Reward};

/// How an episode stands after a step.
///
/// Success and running out of steps both end the episode, but only success
/// carries the goal bonus, so the two are kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The episode continues
    InProgress,
    /// The goal was reached
    Success,
    /// The step limit was hit without reaching the goal
    TimedOut,
}

impl Outcome {
    /// Whether the episode has ended
    #[must_use]
    pub fn is_done(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Whether the goal was reached
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step<O> {
    /// Observation from the environment
    pub observation: O,
    /// Reward signal
    pub reward: Reward,
    /// Episode status after this step
    pub outcome: Outcome,
    /// Whether the episode was truncated separately from `outcome`
    pub truncated: bool,
    /// Additional info from the environment
    pub info: StepInfo,
}

impl<O> Step<O> {
    /// Whether the episode ended on this step
    #[must_use]
    pub fn done(&self) -> bool {
        self.outcome.is_done()
    }
}

/// Additional information from a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Custom fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl StepInfo {
    /// Attach a numeric diagnostic
    #[must_use]
    pub fn with_number(mut self, key: &str, value: f64) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Read back a numeric diagnostic
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(serde_json::Value::as_f64)
    }
}

/// Episode information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Episode ID
    pub id: String,
    /// Total reward
    pub total_reward: f64,
    /// Number of steps
    pub steps: usize,
    /// Latest outcome
    pub outcome: Outcome,
    /// Start time
    pub start_time: chrono::DateTime<chrono::Utc>,
    /// End time
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Core environment trait
pub trait Environment: Send {
    /// Observation type
    type Observation: Observation;
    /// Action type
    type Action: Action;

    /// Get the observation space
    fn observation_space(&self) -> Box<dyn ObservationSpace>;

    /// Get the action space
    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>>;

    /// Reset the environment, reseeding its random source when `seed` is given
    ///
    /// # Errors
    ///
    /// Implementations report failures to build the initial state.
    fn reset(&mut self, seed: Option<u64>) -> crate::Result<(Self::Observation, StepInfo)>;

    /// Take a step in the environment
    ///
    /// # Errors
    ///
    /// Implementations reject actions that cannot be applied, for example
    /// stepping an episode that already ended.
    fn step(&mut self, action: Self::Action) -> crate::Result<Step<Self::Observation>>;

    /// Render the environment (optional)
    ///
    /// # Errors
    ///
    /// Returns an error if the render target cannot be written.
    fn render(&self) -> crate::Result<()> {
        Ok(())
    }

    /// Close the environment
    ///
    /// # Errors
    ///
    /// Implementations report failures to release their resources.
    fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }

    /// Get current episode info
    fn episode_info(&self) -> Option<Episode> {
        None
    }
}

/// Wrapper for environments that tracks episodes
pub struct TrackedEnvironment<E> {
    /// Inner environment
    pub env: E,
    /// Current episode
    pub episode: Option<Episode>,
    /// Step counter
    pub step_count: usize,
}

impl<E> TrackedEnvironment<E> {
    /// Create a new tracked environment
    pub fn new(env: E) -> Self {
        Self {
            env,
            episode: None,
            step_count: 0,
        }
    }

    /// Unwrap the inner environment
    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E> Environment for TrackedEnvironment<E>
where
    E: Environment,
{
    type Observation = E::Observation;
    type Action = E::Action;

    fn observation_space(&self) -> Box<dyn ObservationSpace> {
        self.env.observation_space()
    }

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        self.env.action_space()
    }

    fn reset(&mut self, seed: Option<u64>) -> crate::Result<(Self::Observation, StepInfo)> {
        // End current episode if exists
        if let Some(ref mut episode) = self.episode {
            if episode.end_time.is_none() {
                episode.end_time = Some(chrono::Utc::now());
            }
        }

        let reset = self.env.reset(seed)?;

        let episode = Episode {
            id: uuid::Uuid::new_v4().to_string(),
            total_reward: 0.0,
            steps: 0,
            outcome: Outcome::InProgress,
            start_time: chrono::Utc::now(),
            end_time: None,
        };
        debug!(episode_id = %episode.id, "episode started");
        self.episode = Some(episode);
        self.step_count = 0;

        Ok(reset)
    }

    fn step(&mut self, action: Self::Action) -> crate::Result<Step<Self::Observation>> {
        let step = self.env.step(action)?;

        self.step_count += 1;
        if let Some(ref mut episode) = self.episode {
            episode.total_reward += step.reward.0;
            episode.steps = self.step_count;
            episode.outcome = step.outcome;

            if step.done() || step.truncated {
                episode.end_time = Some(chrono::Utc::now());
                debug!(
                    episode_id = %episode.id,
                    steps = episode.steps,
                    total_reward = episode.total_reward,
                    outcome = ?episode.outcome,
                    "episode finished"
                );
            }
        }

        Ok(step)
    }

    fn render(&self) -> crate::Result<()> {
        self.env.render()
    }

    fn close(&mut self) -> crate::Result<()> {
        self.env.close()
    }

    fn episode_info(&self) -> Option<Episode> {
        self.episode.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxObservationSpace, DiscreteAction, DiscreteSpace};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Nudge;

    impl Action for Nudge {
        fn to_vec(&self) -> Vec<f64> {
            vec![0.0]
        }
    }

    impl DiscreteAction for Nudge {
        const ALL: &'static [Self] = &[Nudge];

        fn index(self) -> usize {
            0
        }
    }

    #[derive(Debug, Clone)]
    struct Counter(f64);

    impl Observation for Counter {
        fn to_vec(&self) -> Vec<f64> {
            vec![self.0]
        }

        fn shape(&self) -> Vec<usize> {
            vec![1]
        }
    }

    /// Ends after three steps, rewarding each with 0.5.
    struct Countdown {
        left: usize,
    }

    impl Environment for Countdown {
        type Observation = Counter;
        type Action = Nudge;

        fn observation_space(&self) -> Box<dyn ObservationSpace> {
            Box::new(BoxObservationSpace::uniform(1, 0.0, 3.0))
        }

        fn action_space(&self) -> Box<dyn ActionSpace<Action = Nudge>> {
            Box::new(DiscreteSpace::<Nudge>::new())
        }

        fn reset(&mut self, _seed: Option<u64>) -> crate::Result<(Counter, StepInfo)> {
            self.left = 3;
            Ok((Counter(3.0), StepInfo::default()))
        }

        fn step(&mut self, _action: Nudge) -> crate::Result<Step<Counter>> {
            self.left -= 1;
            Ok(Step {
                observation: Counter(self.left as f64),
                reward: Reward(0.5),
                outcome: if self.left == 0 {
                    Outcome::TimedOut
                } else {
                    Outcome::InProgress
                },
                truncated: false,
                info: StepInfo::default().with_number("left", self.left as f64),
            })
        }
    }

    #[test]
    fn test_outcome_flags() {
        assert!(!Outcome::InProgress.is_done());
        assert!(Outcome::Success.is_done());
        assert!(Outcome::Success.is_success());
        assert!(Outcome::TimedOut.is_done());
        assert!(!Outcome::TimedOut.is_success());
    }

    #[test]
    fn test_step_info_numbers() {
        let info = StepInfo::default().with_number("distance", 0.25);
        assert_eq!(info.number("distance"), Some(0.25));
        assert_eq!(info.number("missing"), None);
    }

    #[test]
    fn test_tracked_environment_accumulates_episode() {
        let mut env = TrackedEnvironment::new(Countdown { left: 0 });
        assert!(env.episode_info().is_none());

        env.reset(None).unwrap();
        let first_id = env.episode_info().unwrap().id;

        let mut done = false;
        while !done {
            done = env.step(Nudge).unwrap().done();
        }

        let episode = env.episode_info().unwrap();
        assert_eq!(episode.steps, 3);
        assert!((episode.total_reward - 1.5).abs() < 1e-12);
        assert_eq!(episode.outcome, Outcome::TimedOut);
        assert!(episode.end_time.is_some());

        env.reset(None).unwrap();
        let second = env.episode_info().unwrap();
        assert_ne!(second.id, first_id);
        assert_eq!(second.steps, 0);
        assert_eq!(env.step_count, 0);
    }
}
