use rand::Rng;

use crate::network::NeuralNetwork;
use crate::activations::Activation;
use crate::optimizer::{OptimizerWrapper, SGD, Adam};
use crate::error::{Result, JunctionError};

/// Builder for value networks: `input -> hidden... -> output` with a linear output layer.
pub struct NetworkBuilder {
    input_size: Option<usize>,
    output_size: Option<usize>,
    hidden_layers: Vec<usize>,
    hidden_activation: Activation,
    optimizer: OptimizerWrapper,
    learning_rate: f32,
}

impl NetworkBuilder {
    /// Create a new network builder (Adam, learning rate 0.001, no hidden layers)
    pub fn new() -> Self {
        NetworkBuilder {
            input_size: None,
            output_size: None,
            hidden_layers: Vec::new(),
            hidden_activation: Activation::Relu,
            optimizer: OptimizerWrapper::Adam(Adam::default()),
            learning_rate: 0.001,
        }
    }

    pub fn input_size(mut self, size: usize) -> Self {
        self.input_size = Some(size);
        self
    }

    pub fn output_size(mut self, size: usize) -> Self {
        self.output_size = Some(size);
        self
    }

    pub fn hidden_layers(mut self, sizes: &[usize]) -> Self {
        self.hidden_layers = sizes.to_vec();
        self
    }

    pub fn hidden_activation(mut self, activation: Activation) -> Self {
        self.hidden_activation = activation;
        self
    }

    /// Set the optimizer to SGD
    pub fn with_sgd(mut self) -> Self {
        self.optimizer = OptimizerWrapper::SGD(SGD::new());
        self
    }

    /// Set the optimizer to Adam
    pub fn with_adam(mut self, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        self.optimizer = OptimizerWrapper::Adam(Adam::new(beta1, beta2, epsilon));
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Build the network, drawing initial weights from `rng`
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<NeuralNetwork> {
        let input_size = self.input_size.ok_or_else(|| JunctionError::InvalidParameter {
            name: "input_size".to_string(),
            reason: "Input size not specified".to_string(),
        })?;
        let output_size = self.output_size.ok_or_else(|| JunctionError::InvalidParameter {
            name: "output_size".to_string(),
            reason: "Output size not specified".to_string(),
        })?;

        let mut layer_sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        layer_sizes.push(input_size);
        layer_sizes.extend_from_slice(&self.hidden_layers);
        layer_sizes.push(output_size);

        let mut activations = vec![self.hidden_activation; self.hidden_layers.len()];
        activations.push(Activation::Linear);

        NeuralNetwork::new(&layer_sizes, &activations, self.optimizer, self.learning_rate, rng)
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
