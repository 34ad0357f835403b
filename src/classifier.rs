//! Small dense classifier trained with minibatch SGD.
//!
//! The network maps a 2-D point to a single tanh output; labels are ±1 and
//! the loss is the mean of ½(prediction − label)². Training state advances
//! incrementally: repeated [`Session::advance`] calls continue from the
//! accumulated weights, and only [`Session::reset`] rebuilds them.

use ndarray::{Array1, Array2};

use crate::activation::ActivationType;
use crate::dataset::Dataset;
use crate::layer::Layer;
use crate::params::HyperparameterSet;

/// Train/test loss pair measured after a training stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Losses {
    pub train: f32,
    pub test: f32,
}

/// Stateful training session over one dataset split.
///
/// Makes the incremental-versus-restart distinction explicit: `advance`
/// never resets accumulated weights, `reset` always does.
pub trait Session {
    /// Trains for exactly `steps` optimization steps from the current
    /// state and returns losses over the train/test split.
    fn advance(&mut self, data: &Dataset, steps: usize) -> Losses;

    /// Discards accumulated training state.
    fn reset(&mut self);
}

/// Feed-forward classifier built from a sampled [`HyperparameterSet`].
#[derive(Debug, Clone)]
pub struct Classifier {
    params: HyperparameterSet,
    layers: Vec<Layer>,
    /// Position in the training split for minibatch cycling.
    cursor: usize,
    steps_trained: usize,
}

impl Classifier {
    /// Builds the network described by `params`: 2 inputs, `depth` hidden
    /// layers of `width` neurons, one tanh output neuron.
    pub fn from_params(params: &HyperparameterSet) -> Self {
        Classifier {
            params: params.clone(),
            layers: build_layers(params),
            cursor: 0,
            steps_trained: 0,
        }
    }

    /// Cumulative optimization steps since construction or last reset.
    pub fn steps_trained(&self) -> usize {
        self.steps_trained
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Predicts the raw output in [-1, 1] for each row of an M×2 matrix.
    /// Pure read of the current weights.
    pub fn predict_y(&self, points: &Array2<f32>) -> Array1<f32> {
        Array1::from_iter(points.rows().into_iter().map(|point| {
            let mut current = point.to_owned();
            for layer in &self.layers {
                current = layer.infer(&current);
            }
            current[0]
        }))
    }

    fn forward_train(&mut self, input: &Array1<f32>) -> f32 {
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current);
        }
        current[0]
    }

    fn backward(&mut self, output_grad: f32) {
        let mut upstream = Array1::from_elem(1, output_grad);
        for layer in self.layers.iter_mut().rev() {
            upstream = layer.backward(&upstream);
        }
    }

    /// One SGD step: accumulate gradients over a minibatch cycled from the
    /// training split, then update every layer.
    fn sgd_step(&mut self, data: &Dataset, train_len: usize) {
        let batch_size = self.params.batch_size;
        for layer in &mut self.layers {
            layer.zero_gradients();
        }

        for offset in 0..batch_size {
            let index = (self.cursor + offset) % train_len;
            let input = data.points.row(index).to_owned();
            let target = data.labels[index];
            let prediction = self.forward_train(&input);
            self.backward(prediction - target);
        }
        self.cursor = (self.cursor + batch_size) % train_len;

        let learning_rate = self.params.learning_rate;
        let regularization = self.params.regularization;
        let rate = self.params.regularization_rate;
        for layer in &mut self.layers {
            layer.scale_gradients(batch_size);
            layer.apply_gradients(learning_rate, |w| rate * regularization.gradient(w));
        }
    }

    /// Mean squared-error loss over `[start, end)` of the dataset.
    fn loss_over(&self, data: &Dataset, start: usize, end: usize) -> f32 {
        if start == end {
            return 0.0;
        }
        let mut total = 0.0;
        for index in start..end {
            let mut current = data.points.row(index).to_owned();
            for layer in &self.layers {
                current = layer.infer(&current);
            }
            let diff = current[0] - data.labels[index];
            total += 0.5 * diff * diff;
        }
        total / (end - start) as f32
    }

    fn train_split(&self, data: &Dataset) -> usize {
        let n = data.len();
        ((self.params.training_ratio * n as f32).round() as usize).clamp(1, n - 1)
    }
}

impl Session for Classifier {
    fn advance(&mut self, data: &Dataset, steps: usize) -> Losses {
        let train_len = self.train_split(data);
        for _ in 0..steps {
            self.sgd_step(data, train_len);
        }
        self.steps_trained += steps;

        Losses {
            train: self.loss_over(data, 0, train_len),
            test: self.loss_over(data, train_len, data.len()),
        }
    }

    fn reset(&mut self) {
        self.layers = build_layers(&self.params);
        self.cursor = 0;
        self.steps_trained = 0;
    }
}

fn build_layers(params: &HyperparameterSet) -> Vec<Layer> {
    let mut rng = rand::rng();
    let mut layers = Vec::with_capacity(params.hidden_layers() + 1);
    let mut inputs = 2;
    for _ in 0..params.hidden_layers() {
        layers.push(Layer::new(inputs, params.neurons(), params.activation, &mut rng));
        inputs = params.neurons();
    }
    layers.push(Layer::new(inputs, 1, ActivationType::Tanh, &mut rng));
    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetKind;
    use crate::params::{Regularization, Topology};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_params(topology: Topology) -> HyperparameterSet {
        HyperparameterSet {
            dataset: DatasetKind::Gauss,
            noise: 0.0,
            training_ratio: 0.5,
            batch_size: 10,
            learning_rate: 0.03,
            topology,
            activation: ActivationType::Tanh,
            regularization: Regularization::None,
            regularization_rate: 0.0,
        }
    }

    fn gauss_data() -> Dataset {
        let mut rng = StdRng::seed_from_u64(11);
        Dataset::generate(DatasetKind::Gauss, 100, 0.0, &mut rng)
    }

    #[test]
    fn test_build_topology() {
        let deep = Classifier::from_params(&test_params(Topology::Hidden { depth: 3, width: 5 }));
        assert_eq!(deep.layer_count(), 4);

        let linear = Classifier::from_params(&test_params(Topology::Linear));
        assert_eq!(linear.layer_count(), 1);
    }

    #[test]
    fn test_predict_output_range_and_shape() {
        let classifier =
            Classifier::from_params(&test_params(Topology::Hidden { depth: 2, width: 4 }));
        let data = gauss_data();
        let predictions = classifier.predict_y(&data.points);
        assert_eq!(predictions.len(), data.len());
        assert!(predictions.iter().all(|p| (-1.0..=1.0).contains(p)));
    }

    #[test]
    fn test_advance_accumulates_steps_without_reset() {
        let mut classifier = Classifier::from_params(&test_params(Topology::Linear));
        let data = gauss_data();
        classifier.advance(&data, 100);
        classifier.advance(&data, 400);
        assert_eq!(classifier.steps_trained(), 500);
    }

    #[test]
    fn test_advance_losses_are_finite() {
        let mut classifier =
            Classifier::from_params(&test_params(Topology::Hidden { depth: 1, width: 8 }));
        let data = gauss_data();
        let losses = classifier.advance(&data, 200);
        assert!(losses.train.is_finite() && losses.train >= 0.0);
        assert!(losses.test.is_finite() && losses.test >= 0.0);
    }

    #[test]
    fn test_training_separates_gaussians() {
        // Two well-separated clusters are learnable by the linear model.
        let mut classifier = Classifier::from_params(&test_params(Topology::Linear));
        let data = gauss_data();
        let early = classifier.advance(&data, 1);
        let late = classifier.advance(&data, 500);
        assert!(late.train < early.train || late.train < 0.05);
    }

    #[test]
    fn test_reset_discards_progress() {
        let mut classifier = Classifier::from_params(&test_params(Topology::Linear));
        let data = gauss_data();
        classifier.advance(&data, 50);
        classifier.reset();
        assert_eq!(classifier.steps_trained(), 0);
    }

    #[test]
    fn test_regularization_shrinks_weights() {
        let mut params = test_params(Topology::Linear);
        params.regularization = Regularization::L2;
        params.regularization_rate = 3.0;
        let mut penalized = Classifier::from_params(&params);
        let data = gauss_data();
        penalized.advance(&data, 300);
        let norm: f32 = penalized.layers[0].weights.iter().map(|w| w * w).sum();
        // A heavy L2 penalty keeps the weights near zero.
        assert!(norm < 1.0, "penalized weight norm was {norm}");
    }
}
