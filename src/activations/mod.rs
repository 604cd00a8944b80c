//! # Activation Functions Module
//!
//! Element-wise non-linearities used by the dense layers of the value network.
//!
//! - **ReLU**: `max(0, x)`, the default for hidden layers
//! - **Linear**: identity, used on the output layer so action values are unbounded
//! - **LeakyReLU**: ReLU with a small negative slope
//! - **Tanh**: hyperbolic tangent

pub mod functions;

pub use functions::Activation;
