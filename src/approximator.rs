//! The value-function approximator seam.
//!
//! Control agents only ever talk to their networks through [`ValueApproximator`]:
//! they query action-value estimates, submit target vectors, copy parameters from
//! the primary into the target, and persist or restore a trained model.

use ndarray::{Array1, ArrayView1};
use std::path::Path;

use crate::error::Result;

/// A trainable mapping from a state vector to one value estimate per action.
pub trait ValueApproximator {
    /// Length of every vector returned by [`ValueApproximator::estimate`].
    fn action_count(&self) -> usize;

    /// Action-value estimates for `state`.
    fn estimate(&self, state: ArrayView1<f32>) -> Array1<f32>;

    /// Move the estimate for `state` towards `target`, returning the training loss.
    fn update(&mut self, state: ArrayView1<f32>, target: ArrayView1<f32>) -> f32;

    /// Overwrite this approximator's parameters with `other`'s.
    fn sync_from(&mut self, other: &Self)
    where
        Self: Sized;

    fn persist(&self, path: &Path) -> Result<()>;

    /// Replace the parameters with those stored at `path`. On error the
    /// approximator is left unchanged.
    fn restore(&mut self, path: &Path) -> Result<()>;
}

/// Index of the largest value, lowest index on ties. NaN never wins.
pub fn greedy_action(values: ArrayView1<f32>) -> usize {
    let mut best_index = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (index, &value) in values.iter().enumerate() {
        if value > best_value {
            best_index = index;
            best_value = value;
        }
    }
    best_index
}
