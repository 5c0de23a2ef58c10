use crate::error::Result;
use crate::models::GridSample;
use crate::readers::TableReader;
use crate::utils::constants::{LATITUDE_COLUMN, LONGITUDE_COLUMN};
use crate::utils::frames::require_column;
use polars::prelude::*;
use std::path::Path;
use validator::Validate;

/// Turns a CSV of point measurements into heatmap samples.
///
/// Cells that do not parse as numbers become NaN, the equivalent of a null
/// in the source table; the renderer decides what to do with them.
pub struct SampleReader {
    longitude_column: String,
    latitude_column: String,
    value_column: String,
    attribute_columns: Vec<String>,
}

impl SampleReader {
    pub fn new(value_column: &str) -> Self {
        Self {
            longitude_column: LONGITUDE_COLUMN.to_string(),
            latitude_column: LATITUDE_COLUMN.to_string(),
            value_column: value_column.to_string(),
            attribute_columns: Vec::new(),
        }
    }

    pub fn with_coordinate_columns(mut self, longitude: &str, latitude: &str) -> Self {
        self.longitude_column = longitude.to_string();
        self.latitude_column = latitude.to_string();
        self
    }

    pub fn with_attribute_columns(mut self, columns: Vec<String>) -> Self {
        self.attribute_columns = columns;
        self
    }

    pub fn read_samples(&self, path: &Path) -> Result<Vec<GridSample>> {
        let df = TableReader::new().read_table(path)?;
        self.samples_from_frame(&df)
    }

    pub fn samples_from_frame(&self, df: &DataFrame) -> Result<Vec<GridSample>> {
        let numbers = |name: &str| -> Result<Float64Chunked> {
            require_column(df, name, "sample table")?;
            Ok(df.column(name)?.cast(&DataType::Float64)?.f64()?.clone())
        };
        let longitude = numbers(&self.longitude_column)?;
        let latitude = numbers(&self.latitude_column)?;
        let value = numbers(&self.value_column)?;
        let attributes: Vec<(String, StringChunked)> = self
            .attribute_columns
            .iter()
            .map(|name| {
                require_column(df, name, "sample table")?;
                let text = df.column(name)?.cast(&DataType::String)?.str()?.clone();
                Ok((name.clone(), text))
            })
            .collect::<Result<_>>()?;

        let number = |ca: &Float64Chunked, row: usize| ca.get(row).unwrap_or(f64::NAN);
        let mut samples = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let mut sample = GridSample::new(
                number(&longitude, row),
                number(&latitude, row),
                number(&value, row),
            );
            for (name, text) in &attributes {
                let cell = text.get(row).unwrap_or_default().to_string();
                sample.attributes.push((name.clone(), cell));
            }
            // Out-of-range coordinates usually mean swapped columns
            if sample.is_complete() {
                sample.validate()?;
            }
            samples.push(sample);
        }

        Ok(samples)
    }
}
