use crate::error::{ProcessingError, Result};
use crate::models::GridSample;

/// `count` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// A regular lon/lat grid with one value per node, stored row-major with
/// rows running along increasing latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Vec<f64>,
}

impl Grid {
    /// NaN-filled grid over the bounding box of `samples`.
    pub fn spanning(samples: &[GridSample], resolution: usize) -> Result<Self> {
        if samples.is_empty() {
            return Err(ProcessingError::EmptyInput(
                "no samples to build a grid from".to_string(),
            ));
        }
        if resolution < 2 {
            return Err(ProcessingError::Config(format!(
                "grid resolution must be at least 2, got {}",
                resolution
            )));
        }

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for s in samples {
            min_x = min_x.min(s.longitude);
            max_x = max_x.max(s.longitude);
            min_y = min_y.min(s.latitude);
            max_y = max_y.max(s.latitude);
        }

        Ok(Self::new(
            linspace(min_x, max_x, resolution),
            linspace(min_y, max_y, resolution),
        ))
    }

    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        let values = vec![f64::NAN; xs.len() * ys.len()];
        Self { xs, ys, values }
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn width(&self) -> usize {
        self.xs.len()
    }

    pub fn height(&self) -> usize {
        self.ys.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.values[row * self.xs.len() + col]
    }

    pub fn set(&mut self, col: usize, row: usize, value: f64) {
        let width = self.xs.len();
        self.values[row * width + col] = value;
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Smallest and largest defined value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
