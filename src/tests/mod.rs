// Test modules for all components
pub mod test_agent;
pub mod test_replay_buffer;

use ndarray::{Array1, ArrayView1};
use std::path::Path;

use crate::approximator::ValueApproximator;
use crate::error::Result;

/// Lookup-table approximator that records every update it receives.
///
/// In learning mode an update replaces the table entry for its state with the
/// submitted target, so later estimates see it.
#[derive(Clone, Debug)]
pub struct StubApproximator {
    pub table: Vec<(Array1<f32>, Array1<f32>)>,
    pub default: Array1<f32>,
    pub updates: Vec<(Array1<f32>, Array1<f32>)>,
    pub learning: bool,
}

impl StubApproximator {
    pub fn constant(values: &[f32]) -> Self {
        StubApproximator {
            table: Vec::new(),
            default: Array1::from(values.to_vec()),
            updates: Vec::new(),
            learning: false,
        }
    }

    pub fn learning(mut self) -> Self {
        self.learning = true;
        self
    }

    pub fn with_entry(mut self, state: &[f32], values: &[f32]) -> Self {
        self.table.push((Array1::from(state.to_vec()), Array1::from(values.to_vec())));
        self
    }
}

impl ValueApproximator for StubApproximator {
    fn action_count(&self) -> usize {
        self.default.len()
    }

    fn estimate(&self, state: ArrayView1<f32>) -> Array1<f32> {
        self.table
            .iter()
            .find(|(key, _)| key.view() == state)
            .map(|(_, values)| values.clone())
            .unwrap_or_else(|| self.default.clone())
    }

    fn update(&mut self, state: ArrayView1<f32>, target: ArrayView1<f32>) -> f32 {
        let previous = self.estimate(state);
        let loss = (&previous - &target).mapv(|d| d * d).mean().unwrap_or(0.0);
        self.updates.push((state.to_owned(), target.to_owned()));
        if self.learning {
            match self.table.iter_mut().find(|(key, _)| key.view() == state) {
                Some((_, values)) => values.assign(&target),
                None => self.table.push((state.to_owned(), target.to_owned())),
            }
        }
        loss
    }

    fn sync_from(&mut self, other: &Self) {
        self.table = other.table.clone();
        self.default = other.default.clone();
    }

    fn persist(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string(&self.default.to_vec())?)?;
        Ok(())
    }

    fn restore(&mut self, path: &Path) -> Result<()> {
        let values: Vec<f32> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        self.default = Array1::from(values);
        Ok(())
    }
}
