//! Manifest file protocol.
//!
//! One `runs.txt` per sweep iteration: a tab-separated header followed by
//! one data row per checkpoint. The writer owns the row counter that also
//! names the rendered images, so ids stay globally unique and strictly
//! increasing across every run of the iteration.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::params::HyperparameterSet;
use crate::trainer::CheckpointMetrics;

/// Manifest schema, in fixed column order.
pub const MANIFEST_COLUMNS: [&str; 14] = [
    "ID",
    "imagePath",
    "dataset",
    "noise",
    "batch_size",
    "learning_rate",
    "hidden_layers",
    "neurons",
    "activation",
    "regularization",
    "regularization_rate",
    "step",
    "train_loss",
    "test_loss",
];

/// Formats one checkpoint record as a tab-separated manifest row.
pub fn format_row(
    id: usize,
    image_path: &str,
    params: &HyperparameterSet,
    metrics: &CheckpointMetrics,
) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        id, image_path, params, metrics.step, metrics.train_loss, metrics.test_loss
    )
}

/// Append-only writer for one iteration's `runs.txt`.
pub struct Manifest {
    writer: BufWriter<File>,
    next_row: usize,
}

impl Manifest {
    /// Creates the manifest file and writes the header row.
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{}", MANIFEST_COLUMNS.join("\t"))?;
        Ok(Manifest {
            writer,
            next_row: 0,
        })
    }

    /// Id the next appended row will get; also names its image file.
    pub fn next_row(&self) -> usize {
        self.next_row
    }

    /// Writes one checkpoint record immediately and advances the counter.
    pub fn append(
        &mut self,
        image_path: &Path,
        params: &HyperparameterSet,
        metrics: &CheckpointMetrics,
    ) -> Result<usize> {
        let id = self.next_row;
        let row = format_row(id, &image_path.display().to_string(), params, metrics);
        writeln!(self.writer, "{row}")?;
        self.next_row += 1;
        Ok(id)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationType;
    use crate::dataset::DatasetKind;
    use crate::params::{Regularization, Topology};
    use std::path::PathBuf;

    fn sample_params() -> HyperparameterSet {
        HyperparameterSet {
            dataset: DatasetKind::Spiral,
            noise: 0.4,
            training_ratio: 0.5,
            batch_size: 7,
            learning_rate: 0.1,
            topology: Topology::Hidden { depth: 4, width: 6 },
            activation: ActivationType::ReLU,
            regularization: Regularization::L1,
            regularization_rate: 0.03,
        }
    }

    #[test]
    fn test_format_row_column_order() {
        let metrics = CheckpointMetrics {
            step: 500,
            train_loss: 0.25,
            test_loss: 0.5,
        };
        let row = format_row(3, "images/3.png", &sample_params(), &metrics);
        assert_eq!(
            row,
            "3\timages/3.png\tspiral\t0.40\t7\t0.1\t4\t6\trelu\tL1\t0.03\t500\t0.25\t0.5"
        );
        assert_eq!(row.split('\t').count(), MANIFEST_COLUMNS.len());
    }

    #[test]
    fn test_manifest_header_and_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.txt");
        let mut manifest = Manifest::create(&path).unwrap();
        assert_eq!(manifest.next_row(), 0);

        let metrics = CheckpointMetrics {
            step: 100,
            train_loss: 1.0,
            test_loss: 2.0,
        };
        let params = sample_params();
        let first = manifest
            .append(&PathBuf::from("images/0.png"), &params, &metrics)
            .unwrap();
        let second = manifest
            .append(&PathBuf::from("images/1.png"), &params, &metrics)
            .unwrap();
        manifest.flush().unwrap();

        assert_eq!((first, second), (0, 1));
        assert_eq!(manifest.next_row(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], MANIFEST_COLUMNS.join("\t"));
        assert!(lines[1].starts_with("0\timages/0.png\t"));
        assert!(lines[2].starts_with("1\timages/1.png\t"));
    }
}
