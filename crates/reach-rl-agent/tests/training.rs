//! End-to-end training and evaluation runs

use reach_rl_agent::{evaluate, setup, QLearningConfig, Trainer, TrainerConfig};
use reach_rl_core::{Agent, Environment, TrackedEnvironment};
use reach_rl_env::ArmConfig;

fn train(seed: u64, episodes: usize) -> (reach_rl_agent::TrainingReport, reach_rl_agent::QLearningAgent) {
    let config = TrainerConfig {
        episodes,
        seed: Some(seed),
        ..TrainerConfig::default()
    };
    let (env, mut agent) =
        setup(ArmConfig::default(), QLearningConfig::default(), config.seed).unwrap();
    let mut env = TrackedEnvironment::new(env);
    let report = Trainer::new(config)
        .unwrap()
        .train(&mut env, &mut agent)
        .unwrap();
    (report, agent)
}

#[test]
fn value_table_stays_finite_over_default_run() {
    let (report, agent) = train(2024, 500);

    assert!(agent.table().is_finite());
    assert_eq!(report.episode_rewards.len(), 500);
    assert_eq!(report.progress.len(), 10);
    assert!(report.episode_rewards.iter().all(|r| r.is_finite()));

    let metrics = agent.metrics();
    assert_eq!(metrics.total_episodes, 500);
    assert_eq!(metrics.total_steps, report.episode_steps.iter().sum::<usize>());
}

#[test]
fn episodes_never_exceed_step_limit() {
    let (report, _) = train(7, 200);
    for (steps, outcome) in report.episode_steps.iter().zip(&report.outcomes) {
        assert!(*steps <= 50);
        assert!(outcome.is_done());
        if *steps < 50 {
            assert!(outcome.is_success());
        }
    }
}

#[test]
fn same_seed_gives_same_run() {
    let (first, first_agent) = train(99, 150);
    let (second, second_agent) = train(99, 150);

    assert_eq!(first, second);
    assert_eq!(first_agent.table(), second_agent.table());
}

#[test]
fn different_seeds_diverge() {
    let (first, _) = train(1, 100);
    let (second, _) = train(2, 100);
    assert_ne!(first.episode_rewards, second.episode_rewards);
}

#[test]
fn tracked_environment_records_last_episode() {
    let config = TrainerConfig {
        episodes: 30,
        seed: Some(5),
        ..TrainerConfig::default()
    };
    let (env, mut agent) =
        setup(ArmConfig::default(), QLearningConfig::default(), config.seed).unwrap();
    let mut env = TrackedEnvironment::new(env);
    let report = Trainer::new(config)
        .unwrap()
        .train(&mut env, &mut agent)
        .unwrap();

    let episode = env.episode_info().unwrap();
    assert_eq!(Some(&episode.steps), report.episode_steps.last());
    assert!((episode.total_reward - report.episode_rewards[29]).abs() < 1e-9);
    assert_eq!(Some(&episode.outcome), report.outcomes.last());
}

#[test]
fn greedy_evaluation_after_training() {
    let (_, agent) = train(31, 300);
    let (mut env, _) = setup(ArmConfig::default(), QLearningConfig::default(), Some(32)).unwrap();

    let report = evaluate(&mut env, &agent, 50).unwrap();

    assert!(!report.steps.is_empty());
    assert!(report.steps.len() <= 50);
    assert!(report.outcome.is_done());
    assert!(report.steps.iter().all(|s| s.agent.is_within(0.0, 1.0)));
    assert!(report.discounted_return(0.95).is_finite());
}

#[test]
fn default_exploration_rate_departs_from_greedy_choice() {
    use reach_rl_agent::QLearningAgent;
    use reach_rl_env::{ArmAction, ArmObservation, Position};

    let mut agent = QLearningAgent::new(QLearningConfig::default(), Some(31)).unwrap();
    let obs = ArmObservation {
        agent: Position::new(0.2, 0.2),
        goal: Position::new(0.6, 0.4),
    };
    let state = agent.state(&obs);
    agent.update(state, ArmAction::Right, 1.0, state).unwrap();
    assert_eq!(agent.greedy_action(&obs).unwrap(), ArmAction::Right);

    let draws = 20_000;
    let off_greedy = (0..draws)
        .filter(|_| agent.act(&obs).unwrap() != ArmAction::Right)
        .count();
    let fraction = off_greedy as f64 / f64::from(draws);

    // epsilon 0.2, and three of the four random actions differ from Right
    assert!((fraction - 0.15).abs() < 0.02, "fraction = {fraction}");
}
