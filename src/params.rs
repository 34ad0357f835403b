//! Hyperparameter space and random sampling.
//!
//! Ranges and choice sets mirror the parameter space of the sweep: every
//! field is drawn independently and uniformly from its declared domain, so
//! sampling is total and needs no error path.

use std::fmt;
use std::ops::RangeInclusive;

use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::ActivationType;
use crate::dataset::{Dataset, DatasetKind};

/// Points per generated dataset, always fixed.
pub const NUM_SAMPLES: usize = 200;
pub const NOISE_RANGE: RangeInclusive<f32> = 0.0..=0.5;
pub const TRAINING_RATIO_RANGE: RangeInclusive<f32> = 0.1..=0.9;
pub const BATCH_SIZE_RANGE: RangeInclusive<usize> = 1..=30;
pub const HIDDEN_LAYER_RANGE: RangeInclusive<usize> = 0..=6;
pub const HIDDEN_NEURON_RANGE: RangeInclusive<usize> = 1..=8;
pub const LEARNING_RATES: [f32; 11] = [
    0.00001, 0.0001, 0.001, 0.003, 0.01, 0.03, 0.1, 0.3, 1.0, 3.0, 10.0,
];
pub const REGULARIZATION_RATES: [f32; 10] =
    [0.0, 0.001, 0.003, 0.01, 0.03, 0.1, 0.3, 1.0, 3.0, 10.0];

/// Weight-penalty variants supported by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regularization {
    None,
    L1,
    L2,
}

impl Regularization {
    pub const ALL: [Regularization; 3] =
        [Regularization::None, Regularization::L1, Regularization::L2];

    /// Gradient of the penalty term for a single weight.
    pub fn gradient(&self, weight: f32) -> f32 {
        match self {
            Regularization::None => 0.0,
            Regularization::L1 => {
                if weight > 0.0 {
                    1.0
                } else if weight < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Regularization::L2 => weight,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Regularization::None => "none",
            Regularization::L1 => "L1",
            Regularization::L2 => "L2",
        }
    }
}

impl fmt::Display for Regularization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hidden-layer topology, sampled depth first.
///
/// The tagged form makes "no hidden layers implies zero width" hold by
/// construction instead of by a post-hoc override of a width field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Input connected straight to the output neuron.
    Linear,
    /// `depth` hidden layers of `width` neurons each.
    Hidden { depth: usize, width: usize },
}

impl Topology {
    pub fn depth(&self) -> usize {
        match self {
            Topology::Linear => 0,
            Topology::Hidden { depth, .. } => *depth,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Topology::Linear => 0,
            Topology::Hidden { width, .. } => *width,
        }
    }
}

/// Immutable per-run snapshot of every sampled parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterSet {
    pub dataset: DatasetKind,
    pub noise: f32,
    pub training_ratio: f32,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub topology: Topology,
    pub activation: ActivationType,
    pub regularization: Regularization,
    pub regularization_rate: f32,
}

impl HyperparameterSet {
    pub fn hidden_layers(&self) -> usize {
        self.topology.depth()
    }

    pub fn neurons(&self) -> usize {
        self.topology.width()
    }
}

/// Tab-separated parameter columns, in manifest order.
impl fmt::Display for HyperparameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:.2}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.dataset,
            self.noise,
            self.batch_size,
            self.learning_rate,
            self.hidden_layers(),
            self.neurons(),
            self.activation,
            self.regularization,
            self.regularization_rate,
        )
    }
}

/// Draws random points in the joint hyperparameter space.
///
/// The entropy source is injectable so tests can seed a deterministic RNG
/// and assert exact draws.
#[derive(Debug)]
pub struct ParameterSampler<R: Rng = ThreadRng> {
    rng: R,
}

impl ParameterSampler<ThreadRng> {
    /// Sampler backed by process-wide entropy.
    pub fn new() -> Self {
        ParameterSampler { rng: rand::rng() }
    }
}

impl Default for ParameterSampler<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ParameterSampler<R> {
    pub fn with_rng(rng: R) -> Self {
        ParameterSampler { rng }
    }

    /// Generates a dataset, drawing any unspecified parameter uniformly
    /// from its domain.
    pub fn sample_dataset(&mut self, kind: Option<DatasetKind>, noise: Option<f32>) -> Dataset {
        let kind = kind.unwrap_or_else(|| self.pick(&DatasetKind::ALL));
        let noise = noise.unwrap_or_else(|| self.rng.random_range(NOISE_RANGE));
        Dataset::generate(kind, NUM_SAMPLES, noise, &mut self.rng)
    }

    /// Draws a fresh training configuration for a run over `data`.
    pub fn sample_training_params(&mut self, data: &Dataset) -> HyperparameterSet {
        let depth = self.rng.random_range(HIDDEN_LAYER_RANGE);
        let topology = if depth == 0 {
            Topology::Linear
        } else {
            Topology::Hidden {
                depth,
                width: self.rng.random_range(HIDDEN_NEURON_RANGE),
            }
        };

        HyperparameterSet {
            dataset: data.kind,
            noise: data.noise,
            training_ratio: self.rng.random_range(TRAINING_RATIO_RANGE),
            batch_size: self.rng.random_range(BATCH_SIZE_RANGE),
            learning_rate: self.pick(&LEARNING_RATES),
            topology,
            activation: self.pick(&ActivationType::ALL),
            regularization: self.pick(&Regularization::ALL),
            regularization_rate: self.pick(&REGULARIZATION_RATES),
        }
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.random_range(0..items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(seed: u64) -> ParameterSampler<StdRng> {
        ParameterSampler::with_rng(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_sampled_fields_stay_in_declared_domains() {
        let mut sampler = seeded(42);
        let data = sampler.sample_dataset(None, None);
        for _ in 0..500 {
            let p = sampler.sample_training_params(&data);
            assert!(NOISE_RANGE.contains(&p.noise));
            assert!(TRAINING_RATIO_RANGE.contains(&p.training_ratio));
            assert!(BATCH_SIZE_RANGE.contains(&p.batch_size));
            assert!(HIDDEN_LAYER_RANGE.contains(&p.hidden_layers()));
            assert!(LEARNING_RATES.contains(&p.learning_rate));
            assert!(REGULARIZATION_RATES.contains(&p.regularization_rate));
            if p.hidden_layers() > 0 {
                assert!(HIDDEN_NEURON_RANGE.contains(&p.neurons()));
            }
        }
    }

    #[test]
    fn test_no_hidden_layers_means_no_neurons() {
        let mut sampler = seeded(43);
        let data = sampler.sample_dataset(None, None);
        let mut saw_linear = false;
        for _ in 0..500 {
            let p = sampler.sample_training_params(&data);
            if p.hidden_layers() == 0 {
                saw_linear = true;
                assert_eq!(p.neurons(), 0);
            }
        }
        assert!(saw_linear, "0..=6 depth should hit zero within 500 draws");
    }

    #[test]
    fn test_explicit_dataset_choice_is_honored() {
        let mut sampler = seeded(44);
        let data = sampler.sample_dataset(Some(DatasetKind::Spiral), Some(0.25));
        assert_eq!(data.kind, DatasetKind::Spiral);
        assert_eq!(data.noise, 0.25);
        assert_eq!(data.len(), NUM_SAMPLES);
    }

    #[test]
    fn test_same_seed_reproduces_draws() {
        let mut a = seeded(45);
        let mut b = seeded(45);
        let data_a = a.sample_dataset(None, None);
        let data_b = b.sample_dataset(None, None);
        assert_eq!(data_a.kind, data_b.kind);
        assert_eq!(data_a.points, data_b.points);
        assert_eq!(
            a.sample_training_params(&data_a),
            b.sample_training_params(&data_b)
        );
    }

    #[test]
    fn test_display_matches_manifest_column_order() {
        let params = HyperparameterSet {
            dataset: DatasetKind::Circle,
            noise: 0.256,
            training_ratio: 0.5,
            batch_size: 10,
            learning_rate: 0.003,
            topology: Topology::Hidden { depth: 2, width: 3 },
            activation: ActivationType::Tanh,
            regularization: Regularization::L2,
            regularization_rate: 0.1,
        };
        assert_eq!(
            params.to_string(),
            "circle\t0.26\t10\t0.003\t2\t3\ttanh\tL2\t0.1"
        );
    }
}
