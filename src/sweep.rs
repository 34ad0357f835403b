//! Sweep orchestration.
//!
//! A sweep iteration owns one output directory: a `runs.txt` manifest, an
//! `images/` directory of decision-boundary renders, and a reserved `runs/`
//! subdirectory. The two modes differ only in how many iterations run and
//! whether the dataset is redrawn per run or shared across the iteration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::classifier::{Classifier, Session};
use crate::dataset::{Dataset, DatasetKind};
use crate::error::{Result, SweepError};
use crate::manifest::Manifest;
use crate::params::{HyperparameterSet, ParameterSampler};
use crate::render::render_decision_boundary;
use crate::trainer::{CheckpointMetrics, CheckpointSchedule, CHECKPOINT_STEPS};

/// Mode string for a single iteration with fresh data per run.
pub const MODE_FULL: &str = "full";
/// Mode string for one iteration per dataset kind, data shared per iteration.
pub const MODE_PSA_RUNS: &str = "psa_runs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepMode {
    /// One output directory; every run draws its own random dataset.
    Full,
    /// One output directory per dataset kind; a single fixed-noise dataset
    /// is generated per directory and reused by every run in it.
    PsaRuns,
}

impl SweepMode {
    pub fn parse(mode: &str) -> Option<SweepMode> {
        mode.parse().ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SweepMode::Full => MODE_FULL,
            SweepMode::PsaRuns => MODE_PSA_RUNS,
        }
    }
}

impl std::str::FromStr for SweepMode {
    type Err = SweepError;

    fn from_str(mode: &str) -> Result<SweepMode> {
        match mode {
            MODE_FULL => Ok(SweepMode::Full),
            MODE_PSA_RUNS => Ok(SweepMode::PsaRuns),
            _ => Err(SweepError::InvalidMode(mode.to_string())),
        }
    }
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sweep-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Directory under which iteration directories are created.
    pub output_root: PathBuf,
    /// Training runs per iteration.
    pub num_runs: usize,
    /// Cumulative step targets per run, strictly increasing.
    pub checkpoint_steps: Vec<usize>,
    /// Fixed noise for the shared dataset of a psa_runs iteration.
    pub psa_noise: f32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            output_root: PathBuf::from("output"),
            num_runs: 10,
            checkpoint_steps: CHECKPOINT_STEPS.to_vec(),
            psa_noise: 0.25,
        }
    }
}

/// Immutable context for one run, threaded through training and recording.
struct RunContext<'a> {
    run_id: usize,
    params: HyperparameterSet,
    data: &'a Dataset,
}

/// Top-level sweep controller.
pub struct Sweep<R: Rng = ThreadRng> {
    config: SweepConfig,
    sampler: ParameterSampler<R>,
}

impl Sweep<ThreadRng> {
    pub fn new(config: SweepConfig) -> Self {
        Sweep {
            config,
            sampler: ParameterSampler::new(),
        }
    }
}

impl<R: Rng> Sweep<R> {
    pub fn with_sampler(config: SweepConfig, sampler: ParameterSampler<R>) -> Self {
        Sweep { config, sampler }
    }

    /// Executes the sweep named by `mode`. An unrecognized mode is a
    /// configuration error: it is reported and the iteration is aborted
    /// with no output, but the call still returns `Ok`.
    pub fn execute_named(&mut self, mode: &str) -> Result<()> {
        match SweepMode::parse(mode) {
            Some(mode) => self.execute(mode),
            None => {
                error!(mode, "invalid sweep mode, nothing to do");
                Ok(())
            }
        }
    }

    pub fn execute(&mut self, mode: SweepMode) -> Result<()> {
        match mode {
            SweepMode::Full => {
                // Exactly one iteration in this mode.
                let out_dir = self.config.output_root.join("full");
                self.run_iteration(&out_dir, None)
            }
            SweepMode::PsaRuns => {
                for kind in DatasetKind::ALL {
                    let noise = self.config.psa_noise;
                    let dir_name = format!("{}_{}", kind, (noise * 100.0).round() as u32);
                    let out_dir = self.config.output_root.join(dir_name);
                    fs::create_dir_all(&out_dir)?;

                    let data = self.sampler.sample_dataset(Some(kind), Some(noise));
                    data.save_to_file(&out_dir.join("input.txt"))?;
                    self.run_iteration(&out_dir, Some(&data))?;
                }
                Ok(())
            }
        }
    }

    /// Runs one iteration into `out_dir`. With `shared` set, every run
    /// reuses that dataset read-only; otherwise each run draws a fresh one.
    fn run_iteration(&mut self, out_dir: &Path, shared: Option<&Dataset>) -> Result<()> {
        let images_dir = out_dir.join("images");
        fs::create_dir_all(out_dir)?;
        fs::create_dir_all(&images_dir)?;
        fs::create_dir_all(out_dir.join("runs"))?;

        let mut manifest = Manifest::create(&out_dir.join("runs.txt"))?;
        let targets = self.config.checkpoint_steps.clone();

        for run_id in 0..self.config.num_runs {
            let fresh;
            let data = match shared {
                Some(data) => data,
                None => {
                    fresh = self.sampler.sample_dataset(None, None);
                    &fresh
                }
            };
            let ctx = RunContext {
                run_id,
                params: self.sampler.sample_training_params(data),
                data,
            };

            let mut classifier = Classifier::from_params(&ctx.params);
            for stage in CheckpointSchedule::new(&targets) {
                let losses = classifier.advance(ctx.data, stage.delta);
                let metrics = CheckpointMetrics {
                    step: stage.step,
                    train_loss: losses.train,
                    test_loss: losses.test,
                };

                let image_path = images_dir.join(format!("{}.png", manifest.next_row()));
                render_decision_boundary(&classifier, ctx.data, &image_path)?;
                let row = manifest.append(&image_path, &ctx.params, &metrics)?;
                debug!(
                    row,
                    step = metrics.step,
                    train_loss = metrics.train_loss,
                    test_loss = metrics.test_loss,
                    "checkpoint recorded"
                );
            }
            info!(run = ctx.run_id, params = %ctx.params, "run complete");
        }

        manifest.flush()
    }
}
