use crate::error::Result;
use crate::utils::constants::{
    CONTOUR_SIGMA, DEFAULT_END_DATE, DEFAULT_GRID_RESOLUTION, DEFAULT_START_DATE, POINTS_SIGMA,
    SCALE_MEAN, SCALE_STD,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables that can be overridden from a TOML file or `AIRQ_*` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub start_date: String,
    pub end_date: String,
    pub grid_resolution: usize,
    pub contour_sigma: f64,
    pub points_sigma: f64,
    pub scale_mean: f64,
    pub scale_std: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_date: DEFAULT_START_DATE.to_string(),
            end_date: DEFAULT_END_DATE.to_string(),
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            contour_sigma: CONTOUR_SIGMA,
            points_sigma: POINTS_SIGMA,
            scale_mean: SCALE_MEAN,
            scale_std: SCALE_STD,
        }
    }
}

impl Settings {
    /// Built-in defaults, then the optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(Environment::with_prefix("AIRQ"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
