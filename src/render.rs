//! Decision-boundary rendering.
//!
//! Rasterizes the classifier's prediction over a dense regular grid
//! covering a fixed coordinate range (independent of the dataset's actual
//! extents) and overlays the labeled points in an orange/gray/blue
//! palette.

use std::path::Path;

use ndarray::Array2;
use plotters::prelude::*;

use crate::classifier::Classifier;
use crate::dataset::Dataset;
use crate::error::{Result, SweepError};

const IMAGE_SIZE: u32 = 300;
const GRID_CELLS: u32 = 100;
/// World-coordinate range covered by the image on both axes.
const DOMAIN: (f32, f32) = (-6.0, 6.0);

const NEGATIVE: RGBColor = RGBColor(245, 147, 34);
const NEUTRAL: RGBColor = RGBColor(232, 234, 235);
const POSITIVE: RGBColor = RGBColor(8, 119, 189);

fn class_color(prediction: f32) -> RGBColor {
    if prediction >= 0.33 {
        POSITIVE
    } else if prediction <= -0.33 {
        NEGATIVE
    } else {
        NEUTRAL
    }
}

fn to_pixel(world: f32) -> i32 {
    let (min, max) = DOMAIN;
    let fraction = (world - min) / (max - min);
    (fraction * IMAGE_SIZE as f32).round() as i32
}

/// Renders the classifier's current decision function and the dataset's
/// points to a PNG at `path`.
pub fn render_decision_boundary(
    classifier: &Classifier,
    data: &Dataset,
    path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(path, (IMAGE_SIZE, IMAGE_SIZE)).into_drawing_area();
    root.fill(&NEUTRAL).map_err(draw_error)?;

    // Evaluate the grid in one predict_y call.
    let (min, max) = DOMAIN;
    let cell_world = (max - min) / GRID_CELLS as f32;
    let cell_pixels = (IMAGE_SIZE / GRID_CELLS).max(1) as i32;
    let grid = Array2::from_shape_fn(((GRID_CELLS * GRID_CELLS) as usize, 2), |(i, axis)| {
        let gx = i as u32 % GRID_CELLS;
        let gy = i as u32 / GRID_CELLS;
        let index = if axis == 0 { gx } else { gy };
        min + (index as f32 + 0.5) * cell_world
    });
    let predictions = classifier.predict_y(&grid);

    for (i, prediction) in predictions.iter().enumerate() {
        let gx = i as u32 % GRID_CELLS;
        let gy = i as u32 / GRID_CELLS;
        let x0 = (gx as i32) * cell_pixels;
        // Pixel rows grow downward while world y grows upward.
        let y0 = IMAGE_SIZE as i32 - (gy as i32 + 1) * cell_pixels;
        root.draw(&Rectangle::new(
            [(x0, y0), (x0 + cell_pixels, y0 + cell_pixels)],
            class_color(*prediction).filled(),
        ))
        .map_err(draw_error)?;
    }

    for (point, label) in data.points.rows().into_iter().zip(data.labels.iter()) {
        let center = (to_pixel(point[0]), IMAGE_SIZE as i32 - to_pixel(point[1]));
        let color = if *label > 0.0 { POSITIVE } else { NEGATIVE };
        root.draw(&Circle::new(center, 3, color.filled()))
            .map_err(draw_error)?;
        root.draw(&Circle::new(center, 3, BLACK.stroke_width(1)))
            .map_err(draw_error)?;
    }

    root.present().map_err(draw_error)
}

fn draw_error(err: impl std::fmt::Display) -> SweepError {
    SweepError::Render(err.to_string())
}
