use log::{debug, error};
use ndarray::{Array1, ArrayView1};
use rand::Rng;
use std::path::Path;

use crate::approximator::{greedy_action, ValueApproximator};
use crate::error::{JunctionError, Result};
use crate::replay_buffer::{ReplayBuffer, Transition};
use super::exploration::EpsilonSchedule;

/// Double-DQN control agent for a single intersection.
///
/// The agent implements epsilon-greedy action selection, experience replay and
/// Double DQN bootstrapping:
/// - the primary approximator is trained on every learning step
/// - the target approximator only changes through [`ControlAgent::sync_target`]
/// - exploration decays after every learning step that actually trains
///
/// Learning processes the sampled batch one transition at a time. Every target is
/// computed against the primary approximator as it stands after the previous
/// sample's update, so estimates may drift within one batch.
///
/// # Example
///
/// ```rust
/// use junction::agent::ControlAgentBuilder;
/// use junction::builders::NetworkBuilder;
/// use junction::replay_buffer::Transition;
/// use ndarray::array;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let network = NetworkBuilder::new()
///     .input_size(2)
///     .hidden_layers(&[8])
///     .output_size(4)
///     .build(&mut rng)
///     .unwrap();
/// let mut agent = ControlAgentBuilder::new().replay_capacity(100).build(network).unwrap();
///
/// agent.remember(Transition {
///     state: array![0.0, 1.0],
///     action: 2,
///     reward: -4.0,
///     next_state: array![1.0, 0.0],
///     terminal: false,
/// });
///
/// // Not enough transitions for a batch of 32 yet.
/// assert!(agent.learn(32, &mut rng).is_none());
/// ```
pub struct ControlAgent<A: ValueApproximator> {
    primary: A,
    target: A,
    buffer: ReplayBuffer,
    epsilon: EpsilonSchedule,
    gamma: f32,
    learn_steps: usize,
}

impl<A: ValueApproximator> ControlAgent<A> {
    /// Create an agent from an explicit primary/target pair.
    ///
    /// The target is used as given; call [`ControlAgent::sync_target`] to align it
    /// with the primary.
    pub fn new(
        primary: A,
        target: A,
        buffer: ReplayBuffer,
        epsilon: EpsilonSchedule,
        gamma: f32,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&gamma) {
            return Err(JunctionError::invalid_parameter("gamma", "must be within [0, 1]"));
        }
        if primary.action_count() == 0 || primary.action_count() != target.action_count() {
            return Err(JunctionError::DimensionMismatch {
                expected: format!("{} actions", primary.action_count()),
                actual: format!("{} actions", target.action_count()),
            });
        }
        Ok(ControlAgent {
            primary,
            target,
            buffer,
            epsilon,
            gamma,
            learn_steps: 0,
        })
    }

    pub fn action_count(&self) -> usize {
        self.primary.action_count()
    }

    /// Select an action using the epsilon-greedy policy.
    ///
    /// The exploration draw only happens when `exploring` is true, so a greedy
    /// selection consumes no randomness.
    pub fn select_action<R: Rng + ?Sized>(
        &self,
        observation: ArrayView1<f32>,
        exploring: bool,
        rng: &mut R,
    ) -> usize {
        if exploring && rng.gen::<f32>() < self.epsilon.value() {
            return rng.gen_range(0..self.action_count());
        }
        greedy_action(self.primary.estimate(observation).view())
    }

    /// Primary action-value estimates for `observation`.
    pub fn q_values(&self, observation: ArrayView1<f32>) -> Array1<f32> {
        self.primary.estimate(observation)
    }

    pub fn remember(&mut self, transition: Transition) {
        self.buffer.push(transition);
    }

    /// Train on `batch_size` transitions sampled without replacement.
    ///
    /// Returns `None`, leaving buffer, approximators and epsilon untouched, while the
    /// buffer holds fewer than `batch_size` transitions. Otherwise returns the mean
    /// loss reported by the approximator.
    pub fn learn<R: Rng + ?Sized>(&mut self, batch_size: usize, rng: &mut R) -> Option<f32> {
        if batch_size == 0 || self.buffer.len() < batch_size {
            return None;
        }

        let batch = self.buffer.sample(batch_size, rng);
        let mut total_loss = 0.0;
        for transition in &batch {
            let bootstrapped = double_dqn_target(&self.primary, &self.target, self.gamma, transition);
            let mut target_vector = self.primary.estimate(transition.state.view());
            target_vector[transition.action] = bootstrapped;
            total_loss += self.primary.update(transition.state.view(), target_vector.view());
        }
        let mean_loss = total_loss / batch.len() as f32;

        self.epsilon.decay_step();
        self.learn_steps += 1;

        Some(mean_loss)
    }

    /// Copy the primary approximator's parameters into the target approximator.
    pub fn sync_target(&mut self) {
        self.target.sync_from(&self.primary);
        debug!("target synced after {} learning steps", self.learn_steps);
    }

    /// Persist the primary approximator.
    pub fn persist(&self, path: &Path) -> Result<()> {
        self.primary.persist(path)
    }

    /// Restore the primary approximator from `path` and align the target with it.
    ///
    /// Failures are logged and reported as `false`; the agent keeps its current
    /// parameters in that case.
    pub fn restore(&mut self, path: &Path) -> bool {
        match self.primary.restore(path) {
            Ok(()) => {
                self.target.sync_from(&self.primary);
                true
            }
            Err(e) => {
                error!("Error loading model from {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon.value()
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn learn_steps(&self) -> usize {
        self.learn_steps
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    pub fn primary(&self) -> &A {
        &self.primary
    }

    pub fn target(&self) -> &A {
        &self.target
    }
}

/// Double-DQN bootstrap target for one transition.
///
/// Terminal transitions return the reward alone. Otherwise the next action is the
/// primary's arg-max on `next_state` and its value is read from the target:
/// `reward + gamma * target(next_state)[argmax primary(next_state)]`.
pub fn double_dqn_target<A: ValueApproximator>(
    primary: &A,
    target: &A,
    gamma: f32,
    transition: &Transition,
) -> f32 {
    if transition.terminal {
        return transition.reward;
    }
    let next_action = greedy_action(primary.estimate(transition.next_state.view()).view());
    let next_values = target.estimate(transition.next_state.view());
    transition.reward + gamma * next_values[next_action]
}

/// Builder for ControlAgent
pub struct ControlAgentBuilder {
    gamma: f32,
    epsilon_start: f32,
    epsilon_min: f32,
    epsilon_decay: f32,
    replay_capacity: usize,
}

impl ControlAgentBuilder {
    pub fn new() -> Self {
        ControlAgentBuilder {
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            replay_capacity: 2000,
        }
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn epsilon(mut self, start: f32, min: f32, decay: f32) -> Self {
        self.epsilon_start = start;
        self.epsilon_min = min;
        self.epsilon_decay = decay;
        self
    }

    pub fn replay_capacity(mut self, capacity: usize) -> Self {
        self.replay_capacity = capacity;
        self
    }

    /// Build an agent whose target starts as an exact copy of `primary`.
    pub fn build<A: ValueApproximator + Clone>(self, primary: A) -> Result<ControlAgent<A>> {
        if self.replay_capacity == 0 {
            return Err(JunctionError::InvalidParameter {
                name: "replay_capacity".to_string(),
                reason: "Capacity must be greater than 0".to_string(),
            });
        }
        let epsilon = EpsilonSchedule::new(self.epsilon_start, self.epsilon_min, self.epsilon_decay)?;
        let target = primary.clone();
        ControlAgent::new(
            primary,
            target,
            ReplayBuffer::new(self.replay_capacity),
            epsilon,
            self.gamma,
        )
    }
}

impl Default for ControlAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
