use serde::{Serialize, Deserialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use crate::environment::IntersectionId;

/// Outcome of one training or evaluation episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub episode: usize,

    /// Steps taken before the terminal flag was raised
    pub steps: usize,

    /// Accumulated reward per intersection
    pub total_rewards: BTreeMap<IntersectionId, f32>,

    /// Mean of `total_rewards` over intersections
    pub average_reward: f32,

    /// Mean loss over every learning step of the episode, if any trained
    pub mean_loss: Option<f32>,

    /// Exploration rate of the first agent at episode end
    pub epsilon: f32,
}

/// Stores training metrics over time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Average per-intersection reward of each episode
    pub episode_rewards: VecDeque<f32>,

    /// Episode lengths
    pub episode_lengths: VecDeque<usize>,

    /// Mean learning loss per episode
    pub losses: VecDeque<f32>,

    /// Epsilon values at episode end
    pub epsilons: VecDeque<f32>,

    /// Total reward history per intersection
    pub agent_rewards: BTreeMap<IntersectionId, VecDeque<f32>>,
}

/// Tracks metrics during training, keeping at most `history_size` entries per series
pub struct MetricsTracker {
    metrics: TrainingMetrics,
    history_size: usize,
    episode_count: usize,
    total_steps: usize,
}

fn push_bounded<T>(series: &mut VecDeque<T>, value: T, history_size: usize) {
    if series.len() >= history_size {
        series.pop_front();
    }
    series.push_back(value);
}

impl MetricsTracker {
    pub fn new(history_size: usize) -> Self {
        MetricsTracker {
            metrics: TrainingMetrics::default(),
            history_size: history_size.max(1),
            episode_count: 0,
            total_steps: 0,
        }
    }

    /// Record a finished episode
    pub fn record_episode(&mut self, report: &EpisodeReport) {
        let history_size = self.history_size;
        push_bounded(&mut self.metrics.episode_rewards, report.average_reward, history_size);
        push_bounded(&mut self.metrics.episode_lengths, report.steps, history_size);
        push_bounded(&mut self.metrics.epsilons, report.epsilon, history_size);
        if let Some(loss) = report.mean_loss {
            push_bounded(&mut self.metrics.losses, loss, history_size);
        }
        for (&id, &reward) in &report.total_rewards {
            let series = self.metrics.agent_rewards.entry(id).or_default();
            push_bounded(series, reward, history_size);
        }

        self.episode_count += 1;
        self.total_steps += report.steps;
    }

    /// Get a reference to the metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Get recent average episode reward
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        if self.metrics.episode_rewards.is_empty() || window == 0 {
            return None;
        }

        let n = window.min(self.metrics.episode_rewards.len());
        let sum: f32 = self.metrics.episode_rewards.iter().rev().take(n).sum();
        Some(sum / n as f32)
    }

    /// Get recent average loss
    pub fn avg_loss(&self, window: usize) -> Option<f32> {
        if self.metrics.losses.is_empty() || window == 0 {
            return None;
        }

        let n = window.min(self.metrics.losses.len());
        let sum: f32 = self.metrics.losses.iter().rev().take(n).sum();
        Some(sum / n as f32)
    }

    /// Clear all metrics
    pub fn clear(&mut self) {
        self.metrics = TrainingMetrics::default();
        self.episode_count = 0;
        self.total_steps = 0;
    }

    /// Save metrics to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(&self.metrics)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load metrics from file
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> crate::error::Result<()> {
        let data = std::fs::read_to_string(path)?;
        self.metrics = serde_json::from_str(&data)?;
        Ok(())
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}
