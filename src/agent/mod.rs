//! # Signal Control Agents
//!
//! One [`ControlAgent`] drives one intersection. Each agent exclusively owns a
//! primary and a target [`ValueApproximator`](crate::approximator::ValueApproximator),
//! a [`ReplayBuffer`](crate::replay_buffer::ReplayBuffer) and an exploration schedule.
//!
//! ## Core Concepts
//!
//! - **Epsilon-greedy**: act randomly with probability epsilon while exploring,
//!   otherwise take the highest-valued action (lowest index on ties)
//! - **Experience replay**: learning samples transitions uniformly from the buffer
//! - **Double DQN**: the primary network picks the next action, the target network
//!   scores it
//! - **Target network**: frozen between explicit [`ControlAgent::sync_target`] calls
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use junction::agent::ControlAgentBuilder;
//! use junction::builders::NetworkBuilder;
//! use junction::environment::{SignalAction, OBSERVATION_SIZE};
//! use ndarray::Array1;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let network = NetworkBuilder::new()
//!     .input_size(OBSERVATION_SIZE)
//!     .hidden_layers(&[64, 64])
//!     .output_size(SignalAction::COUNT)
//!     .build(&mut rng)
//!     .unwrap();
//!
//! let agent = ControlAgentBuilder::new().build(network).unwrap();
//! let observation = Array1::zeros(OBSERVATION_SIZE);
//! let action = agent.select_action(observation.view(), true, &mut rng);
//! assert!(action < SignalAction::COUNT);
//! ```

mod control;
mod exploration;

pub use control::{double_dqn_target, ControlAgent, ControlAgentBuilder};
pub use exploration::EpsilonSchedule;
