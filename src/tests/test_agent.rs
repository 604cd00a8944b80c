use ndarray::array;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;

use crate::agent::{double_dqn_target, ControlAgent, ControlAgentBuilder, EpsilonSchedule};
use crate::approximator::ValueApproximator;
use crate::builders::NetworkBuilder;
use crate::replay_buffer::{ReplayBuffer, Transition};
use super::StubApproximator;

fn transition(reward: f32, action: usize, terminal: bool) -> Transition {
    Transition {
        state: array![0.0, 0.0],
        action,
        reward,
        next_state: array![1.0, 1.0],
        terminal,
    }
}

fn stub_agent(epsilon: EpsilonSchedule) -> ControlAgent<StubApproximator> {
    let primary = StubApproximator::constant(&[0.0, 0.0, 0.0, 0.0])
        .with_entry(&[1.0, 1.0], &[1.0, 5.0, 3.0, 2.0]);
    let target = StubApproximator::constant(&[4.0, 4.0, 4.0, 4.0]);
    ControlAgent::new(primary, target, ReplayBuffer::new(100), epsilon, 0.95).unwrap()
}

#[test]
fn test_double_dqn_target_uses_primary_action_and_target_value() {
    let primary = StubApproximator::constant(&[1.0, 5.0, 3.0, 2.0]);
    let target = StubApproximator::constant(&[4.0, 4.0, 4.0, 4.0]);

    let value = double_dqn_target(&primary, &target, 0.95, &transition(-6.0, 0, false));
    assert!((value - (-2.2)).abs() < 1e-5);

    // Target values differ per action: index 1 is read, not the target's own max.
    let target = StubApproximator::constant(&[9.0, 2.0, 9.0, 9.0]);
    let value = double_dqn_target(&primary, &target, 0.5, &transition(-1.0, 0, false));
    assert!((value - 0.0).abs() < 1e-6);
}

#[test]
fn test_terminal_target_is_reward() {
    let primary = StubApproximator::constant(&[1.0, 5.0, 3.0, 2.0]);
    let target = StubApproximator::constant(&[4.0, 4.0, 4.0, 4.0]);
    assert_eq!(double_dqn_target(&primary, &target, 0.95, &transition(-6.0, 2, true)), -6.0);
}

#[test]
fn test_learn_is_noop_below_batch_size() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut agent = stub_agent(EpsilonSchedule::default());
    for _ in 0..3 {
        agent.remember(transition(-1.0, 0, false));
    }

    assert!(agent.learn(4, &mut rng).is_none());
    assert!(agent.learn(0, &mut rng).is_none());
    assert_eq!(agent.buffer().len(), 3);
    assert!(agent.primary().updates.is_empty());
    assert_eq!(agent.epsilon(), 1.0);
    assert_eq!(agent.learn_steps(), 0);
}

#[test]
fn test_learn_overwrites_only_the_taken_action() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut agent = stub_agent(EpsilonSchedule::default());
    agent.remember(transition(-6.0, 1, false));

    let loss = agent.learn(1, &mut rng);
    assert!(loss.is_some());

    let updates = &agent.primary().updates;
    assert_eq!(updates.len(), 1);
    let (state, target_vector) = &updates[0];
    assert_eq!(state, &array![0.0, 0.0]);
    assert_eq!(target_vector[0], 0.0);
    assert!((target_vector[1] - (-2.2)).abs() < 1e-5);
    assert_eq!(target_vector[2], 0.0);
    assert_eq!(target_vector[3], 0.0);

    assert!((agent.epsilon() - 0.995).abs() < 1e-6);
    assert_eq!(agent.learn_steps(), 1);
}

#[test]
fn test_learn_processes_every_sample_of_the_batch() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut agent = stub_agent(EpsilonSchedule::default());
    for i in 0..10 {
        agent.remember(transition(-(i as f32), i % 4, i % 3 == 0));
    }

    agent.learn(6, &mut rng);
    assert_eq!(agent.primary().updates.len(), 6);
    assert_eq!(agent.buffer().len(), 10);
}

#[test]
fn test_batch_targets_see_earlier_updates() {
    let mut rng = StdRng::seed_from_u64(17);
    let primary = StubApproximator::constant(&[0.0, 0.0, 0.0, 0.0])
        .with_entry(&[1.0, 1.0], &[1.0, 5.0, 3.0, 2.0])
        .learning();
    let target = StubApproximator::constant(&[4.0, 4.0, 4.0, 4.0]);
    let mut agent =
        ControlAgent::new(primary, target, ReplayBuffer::new(10), EpsilonSchedule::default(), 0.95).unwrap();

    // Same state, different actions: -1 + 0.95 * 4 = 2.8 and -3 + 0.95 * 4 = 0.8.
    agent.remember(transition(-1.0, 0, false));
    agent.remember(transition(-3.0, 2, false));
    agent.learn(2, &mut rng).unwrap();

    let updates = &agent.primary().updates;
    assert_eq!(updates.len(), 2);
    let first = &updates[0].1;
    assert_eq!(first.iter().filter(|&&v| v != 0.0).count(), 1);

    let second = &updates[1].1;
    assert!((second[0] - 2.8).abs() < 1e-5);
    assert_eq!(second[1], 0.0);
    assert!((second[2] - 0.8).abs() < 1e-5);
    assert_eq!(second[3], 0.0);
}

#[test]
fn test_epsilon_is_non_increasing_and_floored() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut agent = stub_agent(EpsilonSchedule::new(1.0, 0.2, 0.9).unwrap());
    agent.remember(transition(-1.0, 0, false));

    let mut previous = agent.epsilon();
    for _ in 0..50 {
        agent.learn(1, &mut rng);
        assert!(agent.epsilon() <= previous);
        assert!(agent.epsilon() >= 0.2);
        previous = agent.epsilon();
    }
    assert_eq!(agent.epsilon(), 0.2);
}

#[test]
fn test_greedy_selection_is_deterministic_and_draws_nothing() {
    let primary = StubApproximator::constant(&[1.0, 3.0, 3.0, 0.0]);
    let target = primary.clone();
    let agent = ControlAgent::new(
        primary,
        target,
        ReplayBuffer::new(10),
        EpsilonSchedule::default(),
        0.95,
    )
    .unwrap();

    let mut rng = StdRng::seed_from_u64(11);
    let mut untouched = rng.clone();
    let observation = array![0.0, 0.0];
    for _ in 0..20 {
        assert_eq!(agent.select_action(observation.view(), false, &mut rng), 1);
    }
    assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
}

#[test]
fn test_full_exploration_covers_every_action() {
    let agent = stub_agent(EpsilonSchedule::new(1.0, 1.0, 1.0).unwrap());
    let mut rng = StdRng::seed_from_u64(5);
    let mut seen = [false; 4];
    for _ in 0..200 {
        let action = agent.select_action(array![0.0, 0.0].view(), true, &mut rng);
        seen[action] = true;
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn test_sync_target_copies_primary() {
    let mut agent = stub_agent(EpsilonSchedule::default());
    let next_state = array![1.0, 1.0];
    assert_eq!(agent.target().estimate(next_state.view()), array![4.0, 4.0, 4.0, 4.0]);

    agent.sync_target();
    assert_eq!(agent.target().estimate(next_state.view()), array![1.0, 5.0, 3.0, 2.0]);
}

#[test]
fn test_rejects_mismatched_action_counts() {
    let primary = StubApproximator::constant(&[0.0, 0.0, 0.0, 0.0]);
    let target = StubApproximator::constant(&[0.0, 0.0]);
    let result = ControlAgent::new(primary, target, ReplayBuffer::new(10), EpsilonSchedule::default(), 0.9);
    assert!(result.is_err());

    let primary = StubApproximator::constant(&[0.0]);
    assert!(ControlAgentBuilder::new().gamma(1.5).build(primary.clone()).is_err());
    assert!(ControlAgentBuilder::new().replay_capacity(0).build(primary).is_err());
}

#[test]
fn test_restore_failure_returns_false() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut agent = stub_agent(EpsilonSchedule::default());

    assert!(!agent.restore(&dir.path().join("missing.bin")));

    let corrupt = dir.path().join("corrupt.bin");
    std::fs::write(&corrupt, b"not a model").unwrap();
    assert!(!agent.restore(&corrupt));
    assert_eq!(agent.target().estimate(array![0.0, 0.0].view()), array![4.0, 4.0, 4.0, 4.0]);
}

#[test]
fn test_network_agent_persist_and_restore() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("agent_0_model.bin");
    let mut rng = StdRng::seed_from_u64(21);

    let build = |rng: &mut StdRng| {
        let network = NetworkBuilder::new()
            .input_size(6)
            .hidden_layers(&[16])
            .output_size(4)
            .build(rng)
            .unwrap();
        ControlAgentBuilder::new().build(network).unwrap()
    };

    let trained = build(&mut rng);
    trained.persist(&path).unwrap();

    let mut restored = build(&mut rng);
    let observation = array![3.0, 7.0, 0.0, 2.0, 0.5, 0.8];
    assert_ne!(restored.q_values(observation.view()), trained.q_values(observation.view()));

    assert!(restored.restore(&path));
    assert_eq!(restored.q_values(observation.view()), trained.q_values(observation.view()));
    assert_eq!(
        restored.target().estimate(observation.view()),
        trained.q_values(observation.view())
    );
}
