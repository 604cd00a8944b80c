//! Configuration of the environment and of a training run.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{JunctionError, Result};

/// Configuration of [`TrafficEnvironment`](crate::environment::TrafficEnvironment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// `(rows, cols)` of the grid intersections are placed on.
    pub grid_size: (usize, usize),

    /// Number of intersections; must be a perfect square.
    pub num_intersections: usize,

    /// Episode horizon in steps.
    pub max_steps: usize,

    /// Upper bound of every queue.
    pub queue_cap: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            grid_size: (10, 10),
            num_intersections: 4,
            max_steps: 1000,
            queue_cap: 30,
        }
    }
}

impl EnvironmentConfig {
    pub fn validate(&self) -> Result<()> {
        let (rows, cols) = self.grid_size;
        if rows == 0 || cols == 0 {
            return Err(JunctionError::InvalidConfig("grid_size must be at least 1x1".to_string()));
        }
        if self.num_intersections == 0 {
            return Err(JunctionError::InvalidConfig("num_intersections must be positive".to_string()));
        }
        let side = (self.num_intersections as f64).sqrt().round() as usize;
        if side * side != self.num_intersections {
            return Err(JunctionError::InvalidConfig(format!(
                "num_intersections = {} has no integer square root",
                self.num_intersections
            )));
        }
        if self.max_steps == 0 {
            return Err(JunctionError::InvalidConfig("max_steps must be positive".to_string()));
        }
        if self.queue_cap == 0 {
            return Err(JunctionError::InvalidConfig("queue_cap must be positive".to_string()));
        }
        Ok(())
    }
}

/// Configuration of [`TrainingOrchestrator`](crate::trainer::TrainingOrchestrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Total training episodes.
    pub episodes: usize,

    /// Transitions per learning step.
    pub batch_size: usize,

    pub grid_size: (usize, usize),

    pub num_intersections: usize,

    pub max_steps_per_episode: usize,

    pub replay_capacity: usize,

    /// Discount factor.
    pub gamma: f32,

    pub epsilon_start: f32,

    pub epsilon_min: f32,

    pub epsilon_decay: f32,

    /// Target networks are synced on every episode divisible by this.
    pub target_sync_every_n_episodes: usize,

    pub learning_rate: f32,

    /// Hidden layer widths of every value network.
    pub hidden_layers: Vec<usize>,

    pub queue_cap: u32,

    /// Interval of progress log records in episodes.
    pub progress_every: usize,

    /// Seed of the shared random generator; `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Directory trained models are written to.
    pub model_dir: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            batch_size: 32,
            grid_size: (10, 10),
            num_intersections: 4,
            max_steps_per_episode: 1000,
            replay_capacity: 2000,
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            target_sync_every_n_episodes: 10,
            learning_rate: 0.001,
            hidden_layers: vec![64, 64],
            queue_cap: 30,
            progress_every: 10,
            seed: None,
            model_dir: PathBuf::from("."),
        }
    }
}

impl TrainingConfig {
    /// Sets the number of training episodes.
    pub fn episodes(mut self, v: usize) -> Self {
        self.episodes = v;
        self
    }

    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    pub fn grid_size(mut self, rows: usize, cols: usize) -> Self {
        self.grid_size = (rows, cols);
        self
    }

    pub fn num_intersections(mut self, v: usize) -> Self {
        self.num_intersections = v;
        self
    }

    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    pub fn replay_capacity(mut self, v: usize) -> Self {
        self.replay_capacity = v;
        self
    }

    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets start, floor and per-learning-step decay of epsilon.
    pub fn epsilon(mut self, start: f32, min: f32, decay: f32) -> Self {
        self.epsilon_start = start;
        self.epsilon_min = min;
        self.epsilon_decay = decay;
        self
    }

    pub fn target_sync_every_n_episodes(mut self, v: usize) -> Self {
        self.target_sync_every_n_episodes = v;
        self
    }

    pub fn learning_rate(mut self, v: f32) -> Self {
        self.learning_rate = v;
        self
    }

    pub fn hidden_layers(mut self, v: &[usize]) -> Self {
        self.hidden_layers = v.to_vec();
        self
    }

    pub fn progress_every(mut self, v: usize) -> Self {
        self.progress_every = v;
        self
    }

    pub fn seed(mut self, v: u64) -> Self {
        self.seed = Some(v);
        self
    }

    pub fn model_dir<P: Into<PathBuf>>(mut self, v: P) -> Self {
        self.model_dir = v.into();
        self
    }

    /// Environment part of this configuration.
    pub fn environment(&self) -> EnvironmentConfig {
        EnvironmentConfig {
            grid_size: self.grid_size,
            num_intersections: self.num_intersections,
            max_steps: self.max_steps_per_episode,
            queue_cap: self.queue_cap,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.environment().validate()?;
        if self.episodes == 0 {
            return Err(JunctionError::InvalidConfig("episodes must be positive".to_string()));
        }
        if self.batch_size == 0 {
            return Err(JunctionError::InvalidConfig("batch_size must be positive".to_string()));
        }
        if self.replay_capacity == 0 {
            return Err(JunctionError::InvalidConfig("replay_capacity must be positive".to_string()));
        }
        if self.target_sync_every_n_episodes == 0 {
            return Err(JunctionError::InvalidConfig(
                "target_sync_every_n_episodes must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(JunctionError::InvalidConfig("gamma must be within [0, 1]".to_string()));
        }
        if !(0.0..=1.0).contains(&self.epsilon_start)
            || !(0.0..=self.epsilon_start).contains(&self.epsilon_min)
        {
            return Err(JunctionError::InvalidConfig(
                "epsilon values must satisfy 0 <= epsilon_min <= epsilon_start <= 1".to_string(),
            ));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(JunctionError::InvalidConfig("epsilon_decay must be within (0, 1]".to_string()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(JunctionError::InvalidConfig("learning_rate must be positive".to_string()));
        }
        if self.hidden_layers.iter().any(|&width| width == 0) {
            return Err(JunctionError::InvalidConfig("hidden layer widths must be positive".to_string()));
        }
        Ok(())
    }

    /// Constructs [`TrainingConfig`] from a JSON file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Saves [`TrainingConfig`] as pretty-printed JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }
}
