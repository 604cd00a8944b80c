use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;

use crate::activations::Activation;
use crate::approximator::ValueApproximator;
use crate::error::{JunctionError, Result};
use crate::layers::{DenseLayer, LayerCache};
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// A Neural Network consisting of multiple dense layers and an optimizer.
///
/// This is the value-function approximator used by the control agents: it maps an
/// observation vector to one action-value estimate per signal action and is trained
/// towards target vectors with a mean-squared-error loss.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
    pub learning_rate: f32,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes, activations, and optimizer.
    ///
    /// Weights are drawn from `rng`, so two networks built from identically seeded
    /// generators are identical.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(JunctionError::invalid_parameter(
                "layer_sizes",
                "Must have at least 2 layer sizes",
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(JunctionError::DimensionMismatch {
                expected: format!("{} activations", layer_sizes.len() - 1),
                actual: format!("{} activations", activations.len()),
            });
        }
        if !(learning_rate > 0.0) {
            return Err(JunctionError::invalid_parameter(
                "learning_rate",
                "must be positive",
            ));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, &mut *rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(NeuralNetwork { layers, optimizer, learning_rate })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(DenseLayer::input_size).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(DenseLayer::output_size).unwrap_or(0)
    }

    /// Forward pass for a single input vector.
    pub fn forward(&self, input: ArrayView1<f32>) -> Array1<f32> {
        let output = self.forward_batch(input.insert_axis(Axis(0)));
        output.index_axis_move(Axis(0), 0)
    }

    /// Forward pass for a batch of input rows.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.forward_batch(current.view());
        }
        current
    }

    /// One gradient step towards `targets`; returns the mean squared error
    /// measured before the step.
    pub fn train_minibatch(&mut self, inputs: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
        let mut caches: Vec<LayerCache> = Vec::with_capacity(self.layers.len());
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            let (output, cache) = layer.forward_cached(current.view());
            caches.push(cache);
            current = output;
        }

        let output_errors = &current - &targets;
        let loss = output_errors.mapv(|e| e * e).mean().unwrap_or(0.0);

        // d(MSE)/d(output), averaged over the batch and the output units
        let scale = 2.0 / output_errors.len().max(1) as f32;
        let mut error = output_errors * scale;

        let mut gradients: Vec<(Array2<f32>, Array1<f32>)> = Vec::with_capacity(self.layers.len());
        for (layer, cache) in self.layers.iter().zip(caches.iter()).rev() {
            let (input_error, weight_gradients, bias_gradients) = layer.backward_batch(cache, error.view());
            gradients.push((weight_gradients, bias_gradients));
            error = input_error;
        }
        gradients.reverse();

        let learning_rate = self.learning_rate;
        for (index, (layer, (weight_gradients, bias_gradients))) in
            self.layers.iter_mut().zip(gradients).enumerate()
        {
            self.optimizer.update_weights(index, &mut layer.weights, &weight_gradients, learning_rate);
            self.optimizer.update_biases(index, &mut layer.biases, &bias_gradients, learning_rate);
        }
        self.optimizer.finish_step();

        loss
    }

    /// Save the network, including optimizer state, with bincode.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        let network: Self = bincode::deserialize(&data)?;
        Ok(network)
    }

    fn check_compatible(&self, other: &NeuralNetwork) -> Result<()> {
        let shapes = |n: &NeuralNetwork| {
            n.layers
                .iter()
                .map(|l| format!("{}x{}", l.input_size(), l.output_size()))
                .collect::<Vec<_>>()
                .join(",")
        };
        let expected = shapes(self);
        let actual = shapes(other);
        if expected != actual {
            return Err(JunctionError::dimension_mismatch(expected, actual));
        }
        Ok(())
    }
}

impl ValueApproximator for NeuralNetwork {
    fn action_count(&self) -> usize {
        self.output_size()
    }

    fn estimate(&self, state: ArrayView1<f32>) -> Array1<f32> {
        self.forward(state)
    }

    fn update(&mut self, state: ArrayView1<f32>, target: ArrayView1<f32>) -> f32 {
        self.train_minibatch(state.insert_axis(Axis(0)), target.insert_axis(Axis(0)))
    }

    fn sync_from(&mut self, other: &Self) {
        self.layers = other.layers.clone();
    }

    fn persist(&self, path: &Path) -> Result<()> {
        self.save(path)
    }

    fn restore(&mut self, path: &Path) -> Result<()> {
        let loaded = NeuralNetwork::load(path)?;
        self.check_compatible(&loaded)?;
        *self = loaded;
        Ok(())
    }
}
