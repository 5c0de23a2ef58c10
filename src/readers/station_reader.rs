use crate::error::{ProcessingError, Result};
use crate::models::StationRecord;
use crate::readers::TableReader;
use crate::utils::constants::SLUG_COLUMN;
use crate::utils::frames::{column_names, union_distinct};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use validator::Validate;

/// Reads per-date station index files and unions them.
pub struct StationReader {
    reader: TableReader,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            reader: TableReader::new(),
        }
    }

    pub fn read_index(&self, path: &Path) -> Result<DataFrame> {
        self.reader.read_table(path)
    }

    /// Concatenate index tables, drop exact duplicates and trim stray
    /// whitespace from column names.
    pub fn union_indexes(&self, indexes: &[DataFrame]) -> Result<DataFrame> {
        let mut union = union_distinct(indexes)?;
        let trimmed: Vec<String> = column_names(&union)
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        union.set_column_names(trimmed.iter().map(String::as_str))?;
        Ok(union)
    }

    /// Typed view of an index table, keyed by slug.
    ///
    /// Coordinates are read from the first column whose trimmed,
    /// lowercased name is `lat`/`latitude` and `lon`/`lng`/`longitude`.
    pub fn station_map(&self, index: &DataFrame) -> Result<HashMap<String, Vec<StationRecord>>> {
        let names = column_names(index);
        let slug_idx = names
            .iter()
            .position(|c| c == SLUG_COLUMN)
            .ok_or_else(|| ProcessingError::MissingColumn {
                column: SLUG_COLUMN.to_string(),
                context: "station index".to_string(),
            })?;
        let lat_idx = find_column(&names, &["lat", "latitude"]);
        let lon_idx = find_column(&names, &["lon", "lng", "longitude"]);

        let columns: Vec<StringChunked> = index
            .get_columns()
            .iter()
            .map(|c| Ok(c.cast(&DataType::String)?.str()?.clone()))
            .collect::<Result<_>>()?;
        let text = |col: usize, row: usize| columns[col].get(row).unwrap_or_default().to_string();

        let mut stations: HashMap<String, Vec<StationRecord>> = HashMap::new();
        for row in 0..index.height() {
            let coordinate = |idx: Option<usize>| {
                idx.and_then(|i| text(i, row).trim().parse::<f64>().ok())
                    .unwrap_or(f64::NAN)
            };
            let mut station =
                StationRecord::new(text(slug_idx, row), coordinate(lat_idx), coordinate(lon_idx));
            for (i, name) in names.iter().enumerate() {
                if i != slug_idx && Some(i) != lat_idx && Some(i) != lon_idx {
                    station.attributes.push((name.clone(), text(i, row)));
                }
            }

            if let Err(e) = station.validate() {
                tracing::warn!("Station '{}' has invalid metadata: {}", station.slug, e);
            }

            stations
                .entry(station.slug.clone())
                .or_default()
                .push(station);
        }

        Ok(stations)
    }

    /// Slugs with more than one distinct index row. Readings for these
    /// stations are repeated once per row by the join.
    pub fn ambiguous_slugs(&self, index: &DataFrame) -> Result<Vec<String>> {
        let mut slugs: Vec<String> = self
            .station_map(index)?
            .into_iter()
            .filter(|(_, rows)| rows.len() > 1)
            .map(|(slug, _)| slug)
            .collect();
        slugs.sort();
        Ok(slugs)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

fn find_column(columns: &[String], names: &[&str]) -> Option<usize> {
    columns
        .iter()
        .position(|c| names.contains(&c.trim().to_lowercase().as_str()))
}
