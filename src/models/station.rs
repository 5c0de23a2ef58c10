use serde::{Deserialize, Serialize};
use validator::Validate;

/// One row of a station index file: where a sensor sits and what it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationRecord {
    #[validate(length(min = 1))]
    pub slug: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    /// Remaining index columns in file order.
    pub attributes: Vec<(String, String)>,
}

impl StationRecord {
    pub fn new(slug: String, latitude: f64, longitude: f64) -> Self {
        Self {
            slug,
            latitude,
            longitude,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}
