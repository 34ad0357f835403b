use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::activation::ActivationType;

/// A dense layer with cached forward state for backpropagation.
#[derive(Debug, Clone)]
pub struct Layer {
    pub inputs: usize,
    pub neurons: usize,
    /// (inputs, neurons) weight matrix, applied as `input.dot(&weights)`.
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
    pub activation: ActivationType,
    weight_grads: Array2<f32>,
    bias_grads: Array1<f32>,
    input_cache: Array1<f32>,
    preactivation_cache: Array1<f32>,
}

impl Layer {
    /// Constructs a layer with He-normal weights and zero biases.
    pub fn new(inputs: usize, neurons: usize, activation: ActivationType, rng: &mut impl Rng) -> Self {
        let std_dev = (2.0 / inputs as f32).sqrt();
        let normal_dist = Normal::new(0.0, std_dev).expect("positive std dev");

        Layer {
            inputs,
            neurons,
            weights: Array2::from_shape_fn((inputs, neurons), |_| normal_dist.sample(rng)),
            bias: Array1::zeros(neurons),
            activation,
            weight_grads: Array2::zeros((inputs, neurons)),
            bias_grads: Array1::zeros(neurons),
            input_cache: Array1::zeros(inputs),
            preactivation_cache: Array1::zeros(neurons),
        }
    }

    /// Forward pass that caches input and preactivation for `backward`.
    pub fn forward(&mut self, input: &Array1<f32>) -> Array1<f32> {
        assert_eq!(input.len(), self.inputs, "Input size does not match layer's input size");

        let preactivation = input.dot(&self.weights) + &self.bias;
        let activation = self.activation;
        self.input_cache = input.clone();
        self.preactivation_cache = preactivation.clone();
        preactivation.mapv(|x| activation.apply(x))
    }

    /// Pure forward pass that leaves the training caches untouched.
    pub fn infer(&self, input: &Array1<f32>) -> Array1<f32> {
        let preactivation = input.dot(&self.weights) + &self.bias;
        let activation = self.activation;
        preactivation.mapv(|x| activation.apply(x))
    }

    /// Accumulates gradients for the most recent `forward` call and returns
    /// the loss gradient with respect to this layer's input.
    pub fn backward(&mut self, upstream: &Array1<f32>) -> Array1<f32> {
        let activation = self.activation;
        let dz = upstream * &self.preactivation_cache.mapv(|x| activation.derivative(x));
        self.weight_grads = &self.weight_grads + &outer_product(&self.input_cache, &dz);
        self.bias_grads = &self.bias_grads + &dz;
        self.weights.dot(&dz)
    }

    pub fn zero_gradients(&mut self) {
        self.weight_grads.fill(0.0);
        self.bias_grads.fill(0.0);
    }

    /// Divides accumulated gradients by the batch size.
    pub fn scale_gradients(&mut self, batch_size: usize) {
        self.weight_grads /= batch_size as f32;
        self.bias_grads /= batch_size as f32;
    }

    /// Applies one SGD update. `penalty(w)` is the regularization gradient
    /// already multiplied by the regularization rate; biases are not
    /// penalized.
    pub fn apply_gradients(&mut self, learning_rate: f32, penalty: impl Fn(f32) -> f32) {
        let penalized = &self.weight_grads + &self.weights.mapv(penalty);
        self.weights = &self.weights - &(penalized * learning_rate);
        self.bias = &self.bias - &(&self.bias_grads * learning_rate);
    }
}

fn outer_product(column: &Array1<f32>, row: &Array1<f32>) -> Array2<f32> {
    let a = column
        .view()
        .into_shape_with_order((column.len(), 1))
        .expect("column reshape");
    let b = row
        .view()
        .into_shape_with_order((1, row.len()))
        .expect("row reshape");

    a.dot(&b)
}
