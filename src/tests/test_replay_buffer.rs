use ndarray::array;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

use crate::replay_buffer::{ReplayBuffer, Transition};

fn transition(id: usize) -> Transition {
    Transition {
        state: array![id as f32],
        action: id % 4,
        reward: -(id as f32),
        next_state: array![id as f32 + 1.0],
        terminal: false,
    }
}

#[test]
fn test_evicts_oldest_first() {
    let capacity = 5;
    let mut buffer = ReplayBuffer::new(capacity);
    for id in 0..capacity + 3 {
        buffer.push(transition(id));
        assert!(buffer.len() <= capacity);
    }

    let kept: Vec<f32> = buffer.iter().map(|t| t.state[0]).collect();
    assert_eq!(kept, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn test_sample_is_without_replacement() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut buffer = ReplayBuffer::new(100);
    for id in 0..20 {
        buffer.push(transition(id));
    }

    for _ in 0..10 {
        let batch = buffer.sample(20, &mut rng);
        let distinct: HashSet<u32> = batch.iter().map(|t| t.state[0] as u32).collect();
        assert_eq!(batch.len(), 20);
        assert_eq!(distinct.len(), 20);
    }
}

#[test]
fn test_sample_caps_at_len() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut buffer = ReplayBuffer::new(10);
    buffer.push(transition(0));
    buffer.push(transition(1));

    assert_eq!(buffer.sample(8, &mut rng).len(), 2);
    assert!(ReplayBuffer::new(10).sample(4, &mut rng).is_empty());
}

#[test]
fn test_sampling_is_seed_deterministic() {
    let mut buffer = ReplayBuffer::new(50);
    for id in 0..50 {
        buffer.push(transition(id));
    }

    let draw = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        buffer.sample(8, &mut rng).iter().map(|t| t.action).collect::<Vec<_>>()
    };
    assert_eq!(draw(12), draw(12));
}

#[test]
fn test_clear_keeps_capacity() {
    let mut buffer = ReplayBuffer::new(3);
    buffer.push(transition(0));
    assert!(!buffer.is_empty());
    buffer.clear();
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), 3);
}

#[test]
fn test_zero_capacity_stores_nothing() {
    let mut buffer = ReplayBuffer::new(0);
    buffer.push(transition(0));
    assert!(buffer.is_empty());
}
