//! Training loop that runs one independent [`ControlAgent`] per intersection.
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::{ControlAgent, ControlAgentBuilder};
use crate::builders::NetworkBuilder;
use crate::config::TrainingConfig;
use crate::environment::{IntersectionId, SignalAction, TrafficEnvironment, OBSERVATION_SIZE};
use crate::error::Result;
use crate::metrics::{EpisodeReport, MetricsTracker};
use crate::network::NeuralNetwork;
use crate::replay_buffer::Transition;

/// What [`TrainingOrchestrator::train`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub episodes: usize,
    /// Average per-intersection reward of every episode, in order
    pub average_rewards: Vec<f32>,
    pub final_epsilon: f32,
    /// Model files written after the last episode
    pub saved_paths: Vec<PathBuf>,
}

/// Path of the model file of intersection `id` inside `dir`.
pub fn model_path<P: AsRef<Path>>(dir: P, id: IntersectionId) -> PathBuf {
    dir.as_ref().join(format!("agent_{}_model.bin", id))
}

/// Owns the environment, one agent per intersection and the random generator they share.
///
/// Every tick is a barrier: all agents choose an action from their own observation,
/// the environment steps once with the joint action map, then every agent stores its
/// transition and learns. Target networks are synced at the first tick of every
/// episode whose index is a multiple of `target_sync_every_n_episodes`.
pub struct TrainingOrchestrator {
    config: TrainingConfig,
    environment: TrafficEnvironment,
    agents: BTreeMap<IntersectionId, ControlAgent<NeuralNetwork>>,
    rng: StdRng,
    metrics: MetricsTracker,
}

impl TrainingOrchestrator {
    /// Validate `config`, seed the generator and build the environment and agents.
    ///
    /// Networks are initialised from the shared generator in ascending intersection
    /// order, so a fixed `seed` reproduces the whole run.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let environment = TrafficEnvironment::new(config.environment())?;

        let mut agents = BTreeMap::new();
        for id in environment.ids() {
            let network = NetworkBuilder::new()
                .input_size(OBSERVATION_SIZE)
                .hidden_layers(&config.hidden_layers)
                .output_size(SignalAction::COUNT)
                .learning_rate(config.learning_rate)
                .build(&mut rng)?;
            let agent = ControlAgentBuilder::new()
                .gamma(config.gamma)
                .epsilon(config.epsilon_start, config.epsilon_min, config.epsilon_decay)
                .replay_capacity(config.replay_capacity)
                .build(network)?;
            agents.insert(id, agent);
        }

        Ok(TrainingOrchestrator {
            config,
            environment,
            agents,
            rng,
            metrics: MetricsTracker::default(),
        })
    }

    /// Run every configured episode, then persist all agents to `model_dir`.
    pub fn train(&mut self) -> Result<TrainingSummary> {
        let mut average_rewards = Vec::with_capacity(self.config.episodes);
        for episode in 0..self.config.episodes {
            let report = self.run_episode(episode)?;
            self.metrics.record_episode(&report);
            average_rewards.push(report.average_reward);

            if self.reports_progress(episode) {
                info!(
                    "episode {}/{}, average reward {:.2}, epsilon {:.3}",
                    episode,
                    self.config.episodes,
                    report.average_reward,
                    report.epsilon
                );
            }
        }

        let model_dir = self.config.model_dir.clone();
        let saved_paths = self.save_agents(&model_dir)?;

        Ok(TrainingSummary {
            episodes: self.config.episodes,
            average_rewards,
            final_epsilon: self.epsilon(),
            saved_paths,
        })
    }

    /// Progress is logged on episode 0 and every `progress_every` episodes after it.
    fn reports_progress(&self, episode: usize) -> bool {
        self.config.progress_every > 0 && episode % self.config.progress_every == 0
    }

    /// Run one exploring, learning episode.
    pub fn run_episode(&mut self, episode: usize) -> Result<EpisodeReport> {
        let batch_size = self.config.batch_size;
        let sync_episode = episode % self.config.target_sync_every_n_episodes == 0;

        let mut states = self.environment.reset(&mut self.rng);
        let mut total_rewards: BTreeMap<IntersectionId, f32> =
            self.agents.keys().map(|&id| (id, 0.0)).collect();
        let mut loss_sum = 0.0;
        let mut loss_count = 0usize;

        loop {
            let mut actions = BTreeMap::new();
            for (&id, agent) in &self.agents {
                let code = agent.select_action(states[&id].view(), true, &mut self.rng);
                actions.insert(id, SignalAction::try_from(code)?);
            }

            let outcome = self.environment.step(&actions, &mut self.rng);

            for (&id, agent) in self.agents.iter_mut() {
                let reward = outcome.rewards.get(&id).copied().unwrap_or_default();
                agent.remember(Transition {
                    state: states[&id].clone(),
                    action: actions[&id].index(),
                    reward,
                    next_state: outcome.observations[&id].clone(),
                    terminal: outcome.terminal,
                });
                if let Some(loss) = agent.learn(batch_size, &mut self.rng) {
                    loss_sum += loss;
                    loss_count += 1;
                }
                *total_rewards.entry(id).or_insert(0.0) += reward;
            }

            if sync_episode && self.environment.step_count() == 1 {
                for agent in self.agents.values_mut() {
                    agent.sync_target();
                }
            }

            states = outcome.observations;
            if outcome.terminal {
                break;
            }
        }

        Ok(self.report(episode, total_rewards, loss_sum, loss_count))
    }

    /// Run `episodes` greedy episodes without storing transitions or learning.
    pub fn evaluate(&mut self, episodes: usize) -> Result<Vec<EpisodeReport>> {
        let mut reports = Vec::with_capacity(episodes);
        for episode in 0..episodes {
            let mut states = self.environment.reset(&mut self.rng);
            let mut total_rewards: BTreeMap<IntersectionId, f32> =
                self.agents.keys().map(|&id| (id, 0.0)).collect();

            loop {
                let mut actions = BTreeMap::new();
                for (&id, agent) in &self.agents {
                    let code = agent.select_action(states[&id].view(), false, &mut self.rng);
                    actions.insert(id, SignalAction::try_from(code)?);
                }

                let outcome = self.environment.step(&actions, &mut self.rng);
                for (id, reward) in &outcome.rewards {
                    *total_rewards.entry(*id).or_insert(0.0) += reward;
                }

                states = outcome.observations;
                if outcome.terminal {
                    break;
                }
            }

            reports.push(self.report(episode, total_rewards, 0.0, 0));
        }
        Ok(reports)
    }

    fn report(
        &self,
        episode: usize,
        total_rewards: BTreeMap<IntersectionId, f32>,
        loss_sum: f32,
        loss_count: usize,
    ) -> EpisodeReport {
        let average_reward = if total_rewards.is_empty() {
            0.0
        } else {
            total_rewards.values().sum::<f32>() / total_rewards.len() as f32
        };
        EpisodeReport {
            episode,
            steps: self.environment.step_count(),
            total_rewards,
            average_reward,
            mean_loss: (loss_count > 0).then(|| loss_sum / loss_count as f32),
            epsilon: self.epsilon(),
        }
    }

    /// Persist every agent's primary network to `dir`, creating it if needed.
    ///
    /// Stops at the first agent that cannot be written and returns its error.
    pub fn save_agents<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut saved = Vec::with_capacity(self.agents.len());
        for (&id, agent) in &self.agents {
            let path = model_path(dir, id);
            if let Err(e) = agent.persist(&path) {
                error!("failed to save agent {} to {}: {}", id, path.display(), e);
                return Err(e);
            }
            info!("saved agent {} to {}", id, path.display());
            saved.push(path);
        }
        Ok(saved)
    }

    /// Restore every agent from `dir`, returning how many were restored.
    pub fn load_agents<P: AsRef<Path>>(&mut self, dir: P) -> usize {
        let dir = dir.as_ref();
        self.agents
            .iter_mut()
            .map(|(&id, agent)| agent.restore(&model_path(dir, id)))
            .filter(|&restored| restored)
            .count()
    }

    /// Exploration rate of the lowest-id agent.
    pub fn epsilon(&self) -> f32 {
        self.agents.values().next().map(|agent| agent.epsilon()).unwrap_or_default()
    }

    pub fn agents(&self) -> &BTreeMap<IntersectionId, ControlAgent<NeuralNetwork>> {
        &self.agents
    }

    pub fn agent(&self, id: IntersectionId) -> Option<&ControlAgent<NeuralNetwork>> {
        self.agents.get(&id)
    }

    pub fn environment(&self) -> &TrafficEnvironment {
        &self.environment
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}
