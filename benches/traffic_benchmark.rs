use criterion::{black_box, criterion_group, criterion_main, Criterion};
use junction::agent::ControlAgentBuilder;
use junction::builders::NetworkBuilder;
use junction::config::EnvironmentConfig;
use junction::environment::{SignalAction, TrafficEnvironment, OBSERVATION_SIZE};
use junction::replay_buffer::Transition;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

fn environment_episode(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let mut env = TrafficEnvironment::new(EnvironmentConfig::default()).unwrap();

    c.bench_function("environment episode (1000 steps, 4 intersections)", |b| {
        b.iter(|| {
            env.reset(&mut rng);
            loop {
                let actions: BTreeMap<usize, SignalAction> = env
                    .ids()
                    .map(|id| (id, SignalAction::ALL[rng.gen_range(0..SignalAction::COUNT)]))
                    .collect();
                let outcome = env.step(&actions, &mut rng);
                if black_box(outcome.terminal) {
                    break;
                }
            }
        })
    });
}

fn learning_step(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let network = NetworkBuilder::new()
        .input_size(OBSERVATION_SIZE)
        .hidden_layers(&[64, 64])
        .output_size(SignalAction::COUNT)
        .build(&mut rng)
        .unwrap();
    let mut agent = ControlAgentBuilder::new().build(network).unwrap();

    for _ in 0..2000 {
        let state = Array1::from_shape_fn(OBSERVATION_SIZE, |_| rng.gen_range(0.0..30.0));
        let next_state = Array1::from_shape_fn(OBSERVATION_SIZE, |_| rng.gen_range(0.0..30.0));
        agent.remember(Transition {
            state,
            action: rng.gen_range(0..SignalAction::COUNT),
            reward: -rng.gen_range(0.0..60.0),
            next_state,
            terminal: false,
        });
    }

    c.bench_function("learn (batch 32, 64x64 network)", |b| {
        b.iter(|| black_box(agent.learn(32, &mut rng)))
    });
}

criterion_group!(benches, environment_episode, learning_step);
criterion_main!(benches);
