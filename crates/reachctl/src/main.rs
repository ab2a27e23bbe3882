//! Train a Q-learning agent on the robot-arm reaching task, then run one
//! greedy test episode.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reach_rl_agent::{
    evaluate, setup, EpsilonSchedule, QLearningConfig, Trainer, TrainerConfig,
};
use reach_rl_core::{Agent, Environment, TrackedEnvironment};
use reach_rl_env::ArmConfig;

/// Episodes averaged for the closing training summary
const RECENT_EPISODES: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "reachctl", version, about = "Q-learning on a 2D robot-arm reaching task")]
struct Cli {
    /// Training episodes
    #[arg(long, default_value_t = TrainerConfig::default().episodes)]
    episodes: usize,

    /// Bins per axis of the discretized offset
    #[arg(long, default_value_t = QLearningConfig::default().bins)]
    bins: usize,

    /// Discount factor
    #[arg(long, default_value_t = QLearningConfig::default().gamma)]
    gamma: f64,

    /// Learning rate
    #[arg(long, default_value_t = QLearningConfig::default().alpha)]
    alpha: f64,

    /// Exploration rate during training
    #[arg(long, default_value_t = QLearningConfig::default().epsilon)]
    epsilon: f64,

    /// Decay exploration linearly to this rate over the training run
    #[arg(long)]
    epsilon_end: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final arm and target positions of the test episode
    #[arg(long)]
    render: bool,
}

fn main() -> Result<()> {
    // Structured events go to stderr; RUST_LOG=info or debug to see them
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let q_config = QLearningConfig {
        bins: cli.bins,
        gamma: cli.gamma,
        alpha: cli.alpha,
        epsilon: cli.epsilon,
    };
    let trainer_config = TrainerConfig {
        episodes: cli.episodes,
        seed: cli.seed,
        epsilon_schedule: cli.epsilon_end.map(|end| EpsilonSchedule::Linear {
            start: cli.epsilon,
            end,
            episodes: cli.episodes,
        }),
        ..TrainerConfig::default()
    };
    let eval_max_steps = trainer_config.eval_max_steps;
    info!(?q_config, ?trainer_config, "starting run");

    let (env, mut agent) = setup(ArmConfig::default(), q_config, trainer_config.seed)
        .context("invalid environment or agent configuration")?;
    let mut env = TrackedEnvironment::new(env);
    let trainer = Trainer::new(trainer_config).context("invalid trainer configuration")?;

    println!("Training Q-learning agent in RobotArmEnv...");
    let report = trainer
        .train_with(&mut env, &mut agent, |line| println!("{line}"))
        .context("training failed")?;
    println!(
        "Reached the target in {}/{} episodes",
        report.successes(),
        report.episode_rewards.len()
    );
    if let Some(mean) = report.recent_mean_reward(RECENT_EPISODES) {
        println!("Mean reward over the last {RECENT_EPISODES} episodes: {mean:.3}");
    }
    if let Some(loss) = agent.metrics().loss {
        println!("Mean |TD error|: {loss:.4}");
    }

    println!("\nTesting greedy policy after training:");
    let evaluation = evaluate(&mut env, &agent, eval_max_steps).context("evaluation failed")?;
    for step in &evaluation.steps {
        println!("{step}");
    }
    if cli.render {
        env.render().context("render failed")?;
    }
    println!(
        "Test episode finished: {:?} after {} steps, total reward {:.3}",
        evaluation.outcome,
        evaluation.steps.len(),
        evaluation.total_reward()
    );
    println!(
        "Discounted return (gamma {}): {:.3}",
        agent.config().gamma,
        evaluation.discounted_return(agent.config().gamma)
    );

    env.close()?;
    Ok(())
}
