//! Checkpointed training schedule.
//!
//! A run trains one classifier through a fixed ascending sequence of
//! cumulative step targets. Between consecutive targets only the delta is
//! trained, so checkpoints must be consumed in order: each one depends on
//! the weight state left behind by the previous one.

use crate::classifier::Session;
use crate::dataset::Dataset;

/// Cumulative step targets at which losses are measured and an image is
/// rendered. Policy constant of the sweep.
pub const CHECKPOINT_STEPS: [usize; 5] = [100, 500, 1000, 2000, 4000];

/// One stage of a checkpoint schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    /// Cumulative step count reached after this stage.
    pub step: usize,
    /// Steps to train to get there from the previous stage.
    pub delta: usize,
}

/// Lazily yields the `(step, delta)` stages for an ascending target list.
#[derive(Debug, Clone)]
pub struct CheckpointSchedule<'a> {
    targets: &'a [usize],
    prev: usize,
    index: usize,
}

impl<'a> CheckpointSchedule<'a> {
    /// Panics if the targets are not strictly increasing or start at zero;
    /// the schedule is a policy constant, not runtime input.
    pub fn new(targets: &'a [usize]) -> Self {
        assert!(
            targets.first().map_or(true, |&first| first > 0),
            "checkpoint targets must start above zero"
        );
        assert!(
            targets.windows(2).all(|pair| pair[0] < pair[1]),
            "checkpoint targets must be strictly increasing"
        );
        CheckpointSchedule {
            targets,
            prev: 0,
            index: 0,
        }
    }
}

impl Iterator for CheckpointSchedule<'_> {
    type Item = Stage;

    fn next(&mut self) -> Option<Stage> {
        let step = *self.targets.get(self.index)?;
        let stage = Stage {
            step,
            delta: step - self.prev,
        };
        self.prev = step;
        self.index += 1;
        Some(stage)
    }
}

/// Losses measured at one cumulative step target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckpointMetrics {
    pub step: usize,
    pub train_loss: f32,
    pub test_loss: f32,
}

/// Drives `session` through every checkpoint target in order, training only
/// the delta between consecutive targets, and collects the losses measured
/// at each one. Training failures propagate to the caller.
pub fn run_checkpoints<S: Session>(
    session: &mut S,
    data: &Dataset,
    targets: &[usize],
) -> Vec<CheckpointMetrics> {
    CheckpointSchedule::new(targets)
        .map(|stage| {
            let losses = session.advance(data, stage.delta);
            CheckpointMetrics {
                step: stage.step,
                train_loss: losses.train,
                test_loss: losses.test,
            }
        })
        .collect()
}
