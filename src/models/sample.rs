use serde::{Deserialize, Serialize};
use validator::Validate;

/// An irregular point sample fed to the heatmap renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GridSample {
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    pub value: f64,

    /// Extra columns shown in marker popups.
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
}

impl GridSample {
    pub fn new(longitude: f64, latitude: f64, value: f64) -> Self {
        Self {
            longitude,
            latitude,
            value,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// True when coordinates and value are all usable numbers.
    pub fn is_complete(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite() && self.value.is_finite()
    }
}
