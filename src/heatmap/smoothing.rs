use crate::heatmap::grid::Grid;
use crate::utils::constants::GAUSSIAN_TRUNCATE;
use rayon::prelude::*;

/// Normalised 1-D Gaussian weights covering `truncate` standard deviations.
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (truncate * sigma + 0.5) as usize;
    let weights: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-0.5 * x * x / (sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Separable Gaussian blur of the grid in place.
///
/// Nodes beyond the grid edge count as zero. Any NaN within a node's
/// window makes the node NaN, so undefined regions grow by the kernel
/// radius instead of bleeding into their neighbours.
pub fn gaussian_smooth(grid: &mut Grid, sigma: f64) {
    let kernel = gaussian_kernel(sigma, GAUSSIAN_TRUNCATE);
    if kernel.len() == 1 {
        return;
    }
    let width = grid.width();
    let height = grid.height();

    let rows_done = convolve_along_rows(grid.values(), width, &kernel);
    let smoothed = convolve_along_columns(&rows_done, width, height, &kernel);
    grid.values_mut().copy_from_slice(&smoothed);
}

fn convolve_along_rows(values: &[f64], width: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut out = vec![0.0; values.len()];
    out.par_chunks_mut(width)
        .zip(values.par_chunks(width))
        .for_each(|(out_row, in_row)| {
            for (col, target) in out_row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, w) in kernel.iter().enumerate() {
                    let src = col as isize + k as isize - radius;
                    if src >= 0 && (src as usize) < width {
                        acc += w * in_row[src as usize];
                    }
                }
                *target = acc;
            }
        });
    out
}

fn convolve_along_columns(values: &[f64], width: usize, height: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut out = vec![0.0; values.len()];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out_row)| {
            for (k, w) in kernel.iter().enumerate() {
                let src = row as isize + k as isize - radius;
                if src < 0 || src as usize >= height {
                    continue;
                }
                let in_row = &values[src as usize * width..(src as usize + 1) * width];
                for (target, value) in out_row.iter_mut().zip(in_row) {
                    *target += w * value;
                }
            }
        });
    out
}
