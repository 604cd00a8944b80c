//! # Junction - Traffic Signal Control with Double DQN
//!
//! Junction simulates a grid of signalised intersections and trains one
//! independent Double-DQN agent per intersection to keep its queues short.
//!
//! ## Key Features
//!
//! - **Environment**: time-of-day shaped arrivals, two-phase signals, queue caps
//! - **Agents**: epsilon-greedy selection, experience replay, Double-DQN targets
//! - **Networks**: dense value networks with SGD or Adam, saved with bincode
//! - **Reproducibility**: every random draw comes from one seedable generator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use junction::config::TrainingConfig;
//! use junction::trainer::TrainingOrchestrator;
//!
//! let config = TrainingConfig::default()
//!     .episodes(50)
//!     .max_steps_per_episode(200)
//!     .seed(42)
//!     .model_dir("models");
//!
//! let mut trainer = TrainingOrchestrator::new(config).unwrap();
//! let summary = trainer.train().unwrap();
//! println!("final epsilon {}", summary.final_epsilon);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Linear, LeakyReLU, Tanh)
//! - [`agent`] - Double-DQN control agents and exploration schedules
//! - [`approximator`] - The value-function seam agents train through
//! - [`builders`] - Builder patterns for networks and replay buffers
//! - [`config`] - Environment and training configuration
//! - [`environment`] - The traffic grid simulation
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialisation
//! - [`metrics`] - Training metrics and tracking
//! - [`network`] - Feed-forward value network
//! - [`optimizer`] - Optimization algorithms
//! - [`replay_buffer`] - Experience replay
//! - [`trainer`] - The multi-agent training loop

pub mod activations;
pub mod agent;
pub mod approximator;
pub mod builders;
pub mod config;
pub mod environment;
pub mod error;
pub mod layers;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod trainer;

#[cfg(test)]
mod tests;
