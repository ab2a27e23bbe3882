//! Robot-arm reaching environment

use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use reach_rl_core::{
    ActionSpace, BoxObservationSpace, DiscreteSpace, Environment,
    ObservationSpace, Outcome, RLError, Result, Reward, Step, StepInfo,
};

use crate::types::{ArmAction, ArmObservation, Position};

/// Key under which the step's raw distance is reported in [`StepInfo`]
pub const DISTANCE_KEY: &str = "distance";

/// Reaching task parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    /// Distance moved per action
    pub step_size: f64,
    /// Steps after which the episode is cut off
    pub max_steps: usize,
    /// Distance below which the target counts as reached
    pub success_threshold: f64,
    /// Added to the reward on the step that reaches the target
    pub success_bonus: f64,
    /// Arm tip position after reset
    pub start: Position,
    /// Lower corner of the square targets are drawn from
    pub goal_low: f64,
    /// Upper corner of the square targets are drawn from
    pub goal_high: f64,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            step_size: 0.05,
            max_steps: 50,
            success_threshold: 0.07,
            success_bonus: 1.0,
            start: Position::new(0.2, 0.2),
            goal_low: 0.3,
            goal_high: 0.8,
        }
    }
}

impl ArmConfig {
    /// Check every parameter
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(RLError::InvalidConfig(format!(
                "step_size must be positive, got {}",
                self.step_size
            )));
        }
        if self.max_steps == 0 {
            return Err(RLError::InvalidConfig("max_steps must be at least 1".into()));
        }
        if !(self.success_threshold.is_finite() && self.success_threshold > 0.0) {
            return Err(RLError::InvalidConfig(format!(
                "success_threshold must be positive, got {}",
                self.success_threshold
            )));
        }
        if !self.success_bonus.is_finite() {
            return Err(RLError::InvalidConfig("success_bonus must be finite".into()));
        }
        if !self.start.is_within(0.0, 1.0) {
            return Err(RLError::InvalidConfig(format!(
                "start {} lies outside the unit square",
                self.start
            )));
        }
        if !(0.0 <= self.goal_low && self.goal_low < self.goal_high && self.goal_high <= 1.0) {
            return Err(RLError::InvalidConfig(format!(
                "goal region [{}, {}) must be a non-empty part of [0, 1]",
                self.goal_low, self.goal_high
            )));
        }
        Ok(())
    }
}

/// Point arm tip reaching for a target on the unit square.
///
/// Observations are `[arm_x, arm_y, target_x, target_y]`; every step costs
/// the current distance to the target, and reaching it pays a bonus.
pub struct RobotArmEnv {
    /// Configuration
    config: ArmConfig,
    /// Arm tip
    agent: Position,
    /// Target
    goal: Position,
    /// Step count
    steps: usize,
    /// Set once an episode ended; cleared by reset
    finished: bool,
    /// Goal placement randomness
    rng: StdRng,
}

impl RobotArmEnv {
    /// Create a new environment and place a first target
    ///
    /// Without a seed the random source is seeded from the OS.
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: ArmConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut env = Self {
            agent: config.start,
            goal: config.start,
            config,
            steps: 0,
            finished: false,
            rng,
        };
        env.goal = env.sample_goal();
        Ok(env)
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    /// Current arm tip position
    #[must_use]
    pub fn agent_position(&self) -> Position {
        self.agent
    }

    /// Current target position
    #[must_use]
    pub fn goal_position(&self) -> Position {
        self.goal
    }

    /// Steps taken in the current episode
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Start an episode from explicit positions instead of a random target
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidState`] if either position leaves the unit square.
    pub fn reset_to(&mut self, agent: Position, goal: Position) -> Result<ArmObservation> {
        for (name, position) in [("agent", agent), ("goal", goal)] {
            if !position.is_within(0.0, 1.0) {
                return Err(RLError::InvalidState(format!(
                    "{name} position {position} lies outside the unit square"
                )));
            }
        }
        self.agent = agent;
        self.goal = goal;
        self.steps = 0;
        self.finished = false;
        Ok(self.observation())
    }

    /// Step with a raw action code
    ///
    /// # Errors
    ///
    /// Codes outside `0..4` are rejected with [`RLError::InvalidAction`] and
    /// leave the environment untouched.
    pub fn step_index(&mut self, code: usize) -> Result<Step<ArmObservation>> {
        let action = ArmAction::try_from(code)?;
        self.step(action)
    }

    /// Write the one-line text rendering to `out`
    ///
    /// # Errors
    ///
    /// Returns [`RLError::Io`] if writing fails.
    pub fn render_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Robot: {}, Object: {}", self.agent, self.goal)?;
        Ok(())
    }

    fn observation(&self) -> ArmObservation {
        ArmObservation {
            agent: self.agent,
            goal: self.goal,
        }
    }

    fn sample_goal(&mut self) -> Position {
        let (low, high) = (self.config.goal_low, self.config.goal_high);
        Position::new(self.rng.gen_range(low..high), self.rng.gen_range(low..high))
    }

    fn outcome(&self, distance: f64) -> Outcome {
        if distance < self.config.success_threshold {
            Outcome::Success
        } else if self.steps >= self.config.max_steps {
            Outcome::TimedOut
        } else {
            Outcome::InProgress
        }
    }
}

impl Environment for RobotArmEnv {
    type Observation = ArmObservation;
    type Action = ArmAction;

    fn observation_space(&self) -> Box<dyn ObservationSpace> {
        Box::new(BoxObservationSpace::uniform(4, 0.0, 1.0))
    }

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        Box::new(DiscreteSpace::<ArmAction>::new())
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Observation, StepInfo)> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.agent = self.config.start;
        self.goal = self.sample_goal();
        self.steps = 0;
        self.finished = false;

        let obs = self.observation();
        debug!(goal = %self.goal, "reset");
        Ok((obs, StepInfo::default().with_number(DISTANCE_KEY, obs.distance())))
    }

    fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation>> {
        if self.finished {
            return Err(RLError::Environment(
                "episode finished; call reset".to_string(),
            ));
        }

        let (dx, dy) = action.delta(self.config.step_size);
        self.agent = Position::new(self.agent.x + dx, self.agent.y + dy).clamp(0.0, 1.0);
        self.steps += 1;

        let distance = self.agent.distance(&self.goal);
        let outcome = self.outcome(distance);
        let mut reward = -distance;
        if outcome.is_success() {
            reward += self.config.success_bonus;
        }
        self.finished = outcome.is_done();

        trace!(
            step = self.steps,
            action = %action,
            agent = %self.agent,
            distance,
            reward,
            ?outcome,
            "step"
        );

        Ok(Step {
            observation: self.observation(),
            reward: Reward(reward),
            outcome,
            truncated: false,
            info: StepInfo::default().with_number(DISTANCE_KEY, distance),
        })
    }

    fn render(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.render_to(&mut out)
    }
}
