use crate::error::{ProcessingError, Result};
use serde::Serialize;

/// A stepped colour scale: `colors.len()` equal-width bands over
/// `[vmin, vmax]`. Values outside the range take the nearest end colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepColormap {
    colors: Vec<String>,
    vmin: f64,
    vmax: f64,
    caption: String,
}

impl StepColormap {
    pub fn new(colors: &[&str], vmin: f64, vmax: f64) -> Result<Self> {
        if colors.is_empty() {
            return Err(ProcessingError::Config(
                "colour ramp needs at least one colour".to_string(),
            ));
        }
        if !vmin.is_finite() || !vmax.is_finite() || vmin > vmax {
            return Err(ProcessingError::Config(format!(
                "invalid colour scale range [{}, {}]",
                vmin, vmax
            )));
        }
        Ok(Self {
            colors: colors.iter().map(|c| c.to_string()).collect(),
            vmin,
            vmax,
            caption: String::new(),
        })
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = caption.to_string();
        self
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn band_count(&self) -> usize {
        self.colors.len()
    }

    /// Band boundaries from `vmin` to `vmax`, one more than the band count.
    pub fn thresholds(&self) -> Vec<f64> {
        let n = self.colors.len();
        (0..=n)
            .map(|i| self.vmin + (self.vmax - self.vmin) * i as f64 / n as f64)
            .collect()
    }

    /// Band index of a value; `None` for NaN.
    pub fn band_index(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let n = self.colors.len();
        let span = self.vmax - self.vmin;
        if span <= 0.0 {
            return Some(if value > self.vmax { n - 1 } else { 0 });
        }
        let position = ((value - self.vmin) / span * n as f64).floor();
        Some(position.clamp(0.0, (n - 1) as f64) as usize)
    }

    pub fn color_for(&self, value: f64) -> Option<&str> {
        self.band_index(value).map(|i| self.colors[i].as_str())
    }

    /// Value interval of a band. The first band is open below and the last
    /// open above.
    pub fn band_bounds(&self, band: usize) -> (f64, f64) {
        let t = self.thresholds();
        let n = self.colors.len();
        let lower = if band == 0 { f64::NEG_INFINITY } else { t[band] };
        let upper = if band + 1 >= n { f64::INFINITY } else { t[band + 1] };
        (lower, upper)
    }
}
