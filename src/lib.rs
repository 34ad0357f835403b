//! Hyperparameter-sweep orchestrator for small classifiers on synthetic
//! 2-D datasets.
//!
//! Each sweep iteration samples random dataset and training parameters,
//! trains a fresh classifier through a fixed sequence of cumulative step
//! checkpoints, and records per-checkpoint losses plus a rendered
//! decision-boundary image in a tab-separated manifest.

pub mod activation;
pub mod classifier;
pub mod dataset;
pub mod error;
pub mod layer;
pub mod manifest;
pub mod params;
pub mod render;
pub mod sweep;
pub mod trainer;

pub use activation::ActivationType;
pub use classifier::{Classifier, Losses, Session};
pub use dataset::{Dataset, DatasetKind};
pub use error::{Result, SweepError};
pub use layer::Layer;
pub use manifest::{format_row, Manifest, MANIFEST_COLUMNS};
pub use params::{HyperparameterSet, ParameterSampler, Regularization, Topology};
pub use render::render_decision_boundary;
pub use sweep::{Sweep, SweepConfig, SweepMode, MODE_FULL, MODE_PSA_RUNS};
pub use trainer::{run_checkpoints, CheckpointMetrics, CheckpointSchedule, Stage, CHECKPOINT_STEPS};
