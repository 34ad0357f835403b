//! Synthetic 2-D labeled datasets.
//!
//! Each generator produces a fixed number of points in roughly `[-6, 6]²`
//! with binary class labels of `+1` / `-1`. The `noise` parameter perturbs
//! the coordinates used for labeling, so higher noise means more points end
//! up on the wrong side of the ideal boundary.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Extent of the generated point cloud from the origin.
const RADIUS: f32 = 5.0;

/// Catalog of synthetic dataset patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetKind {
    Circle,
    Xor,
    Gauss,
    Spiral,
}

impl DatasetKind {
    /// The full dataset-name catalog, in manifest order.
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Circle,
        DatasetKind::Xor,
        DatasetKind::Gauss,
        DatasetKind::Spiral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Circle => "circle",
            DatasetKind::Xor => "xor",
            DatasetKind::Gauss => "gauss",
            DatasetKind::Spiral => "spiral",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed-size labeled 2-D point set.
///
/// Read-only after generation; sweep modes that reuse one dataset across
/// several runs hand it out by shared reference.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// N x 2 point coordinates.
    pub points: Array2<f32>,
    /// Length-N class labels, each `+1.0` or `-1.0`.
    pub labels: Array1<f32>,
    pub kind: DatasetKind,
    pub noise: f32,
}

impl Dataset {
    /// Generates `num_samples` labeled points from the named pattern.
    pub fn generate(kind: DatasetKind, num_samples: usize, noise: f32, rng: &mut impl Rng) -> Self {
        let mut flat = Vec::with_capacity(num_samples * 2);
        let mut labels = Vec::with_capacity(num_samples);
        match kind {
            DatasetKind::Circle => gen_circle(num_samples, noise, rng, &mut flat, &mut labels),
            DatasetKind::Xor => gen_xor(num_samples, noise, rng, &mut flat, &mut labels),
            DatasetKind::Gauss => gen_gauss(num_samples, noise, rng, &mut flat, &mut labels),
            DatasetKind::Spiral => gen_spiral(num_samples, noise, rng, &mut flat, &mut labels),
        }

        // Generators emit one class after the other; shuffle so a split by
        // training ratio sees both classes on both sides.
        let n = labels.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let points = Array2::from_shape_fn((n, 2), |(i, axis)| flat[order[i] * 2 + axis]);
        let labels = Array1::from_iter(order.iter().map(|&i| labels[i]));
        Dataset {
            points,
            labels,
            kind,
            noise,
        }
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persists points and labels as tab-separated text, one point per line.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for (point, label) in self.points.rows().into_iter().zip(self.labels.iter()) {
            writeln!(writer, "{}\t{}\t{}", point[0], point[1], label)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn gen_circle(n: usize, noise: f32, rng: &mut impl Rng, flat: &mut Vec<f32>, labels: &mut Vec<f32>) {
    let label_of = |x: f32, y: f32| {
        if (x * x + y * y).sqrt() < RADIUS * 0.5 {
            1.0
        } else {
            -1.0
        }
    };
    for i in 0..n {
        // Positive class inside, negative class on an outer annulus.
        let r = if i < n / 2 {
            rng.random_range(0.0..RADIUS * 0.5)
        } else {
            rng.random_range(RADIUS * 0.7..RADIUS)
        };
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let x = r * angle.sin();
        let y = r * angle.cos();
        let noise_x = rng.random_range(-RADIUS..RADIUS) * noise;
        let noise_y = rng.random_range(-RADIUS..RADIUS) * noise;
        flat.extend([x, y]);
        labels.push(label_of(x + noise_x, y + noise_y));
    }
}

fn gen_xor(n: usize, noise: f32, rng: &mut impl Rng, flat: &mut Vec<f32>, labels: &mut Vec<f32>) {
    let pad = |v: f32| if v > 0.0 { v + 0.3 } else { v - 0.3 };
    for _ in 0..n {
        let x = pad(rng.random_range(-RADIUS..RADIUS));
        let y = pad(rng.random_range(-RADIUS..RADIUS));
        let noise_x = rng.random_range(-RADIUS..RADIUS) * noise;
        let noise_y = rng.random_range(-RADIUS..RADIUS) * noise;
        let label = if (x + noise_x) * (y + noise_y) >= 0.0 {
            1.0
        } else {
            -1.0
        };
        flat.extend([x, y]);
        labels.push(label);
    }
}

fn gen_gauss(n: usize, noise: f32, rng: &mut impl Rng, flat: &mut Vec<f32>, labels: &mut Vec<f32>) {
    // Spread the clusters as noise grows: variance 0.5 at noise 0, 4.0 at 0.5.
    let variance = 0.5 + (4.0 - 0.5) * (noise / 0.5);
    let spread = Normal::new(0.0, variance.sqrt()).expect("positive std dev");
    for i in 0..n {
        let (center, label) = if i < n / 2 { (2.0, 1.0) } else { (-2.0, -1.0) };
        let x: f32 = center + spread.sample(rng);
        let y: f32 = center + spread.sample(rng);
        flat.extend([x, y]);
        labels.push(label);
    }
}

fn gen_spiral(n: usize, noise: f32, rng: &mut impl Rng, flat: &mut Vec<f32>, labels: &mut Vec<f32>) {
    let half = n / 2;
    for (delta, label) in [(0.0f32, 1.0f32), (std::f32::consts::PI, -1.0)] {
        for i in 0..half {
            let fraction = i as f32 / half as f32;
            let r = fraction * RADIUS;
            let t = 1.75 * fraction * std::f32::consts::TAU + delta;
            let x = r * t.sin() + rng.random_range(-1.0..1.0) * noise;
            let y = r * t.cos() + rng.random_range(-1.0..1.0) * noise;
            flat.extend([x, y]);
            labels.push(label);
        }
    }
}
