use crate::error::{ProcessingError, Result};
use crate::readers::TableReader;
use crate::utils::constants::{DATE_COLUMN, SLUG_COLUMN, TIMESTAMP_COLUMN};
use crate::utils::filename::parse_data_file_name;
use polars::prelude::*;
use std::path::Path;

/// Reads one station's daily export.
///
/// Exports normally start with a licence line above the header. Some files
/// lack it, which is detected by the timestamp column missing from the
/// header after skipping; those are re-read from the first line.
pub struct ReadingReader {
    required_column: String,
}

impl ReadingReader {
    pub fn new() -> Self {
        Self {
            required_column: TIMESTAMP_COLUMN.to_string(),
        }
    }

    /// Parse a data file and tag every row with the `Date` and `Slug`
    /// encoded in its file name. Existing columns with those names are
    /// overwritten in place.
    pub fn read_readings(&self, path: &Path) -> Result<DataFrame> {
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| ProcessingError::InvalidFormat("Invalid file path".to_string()))?;
        let name = parse_data_file_name(file_name);
        if name.slug.is_empty() {
            tracing::debug!("No station slug in '{}', its rows will not join", file_name);
        }

        let readings = self
            .read_with_fallback(path)?
            .lazy()
            .with_columns([
                lit(name.date.as_str()).alias(DATE_COLUMN),
                lit(name.slug.as_str()).alias(SLUG_COLUMN),
            ])
            .collect()?;

        tracing::debug!(
            "Read {} readings for station '{}' on {}",
            readings.height(),
            name.slug,
            name.date
        );
        Ok(readings)
    }

    fn read_with_fallback(&self, path: &Path) -> Result<DataFrame> {
        let bytes = std::fs::read(path)?;

        let skipped = TableReader::with_skip_lines(1).parse_bytes(&bytes);
        if let Ok(df) = &skipped {
            if df.column(&self.required_column).is_ok() {
                return skipped;
            }
        }

        tracing::debug!(
            "No licence line in {}, parsing from the first line",
            path.display()
        );
        TableReader::new().parse_bytes(&bytes)
    }
}

impl Default for ReadingReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::frames::{column_names, string_cell};
    use std::fs;
    use tempfile::TempDir;

    const WITH_LICENSE: &str = "Data licensed under ODbL\n\
        Date (UTC),PM2.5,Humidity\n\
        2022-05-01 00:00:00,10.0,50\n\
        2022-05-01 00:01:00,11.0,51\n";

    const WITHOUT_LICENSE: &str = "Date (UTC),PM2.5,Humidity\n\
        2022-05-01 00:00:00,10.0,50\n\
        2022-05-01 00:01:00,11.0,51\n";

    #[test]
    fn test_read_readings_with_license_line() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("2022-05-01_limoilou-1.csv");
        fs::write(&path, WITH_LICENSE)?;

        let df = ReadingReader::new().read_readings(&path)?;
        assert_eq!(df.height(), 2);
        assert_eq!(
            column_names(&df),
            vec!["Date (UTC)", "PM2.5", "Humidity", "Date", "Slug"]
        );
        assert_eq!(string_cell(&df, 0, "Slug")?, Some("limoilou-1".to_string()));
        assert_eq!(string_cell(&df, 1, "Date")?, Some("2022-05-01".to_string()));
        Ok(())
    }

    #[test]
    fn test_fallback_matches_licensed_parse() -> Result<()> {
        let dir = TempDir::new()?;
        let licensed = dir.path().join("2022-05-01_a.csv");
        let bare = dir.path().join("2022-05-01_b.csv");
        fs::write(&licensed, WITH_LICENSE)?;
        fs::write(&bare, WITHOUT_LICENSE)?;

        let reader = ReadingReader::new();
        let from_licensed = reader.read_readings(&licensed)?;
        let from_bare = reader.read_readings(&bare)?;

        assert_eq!(column_names(&from_licensed), column_names(&from_bare));
        assert_eq!(from_licensed.height(), from_bare.height());
        assert_eq!(string_cell(&from_bare, 0, "PM2.5")?, Some("10.0".to_string()));
        Ok(())
    }

    #[test]
    fn test_short_file_name_reads_with_empty_slug() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("2022.csv");
        fs::write(&path, WITHOUT_LICENSE)?;

        let df = ReadingReader::new().read_readings(&path)?;
        assert_eq!(df.height(), 2);
        assert_eq!(string_cell(&df, 0, "Slug")?, Some(String::new()));
        Ok(())
    }

    #[test]
    fn test_existing_slug_column_is_overwritten() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("2022-05-01_a.csv");
        fs::write(&path, "Slug,Date (UTC),PM2.5
old,2022-05-01 00:00:00,1
")?;

        let df = ReadingReader::new().read_readings(&path)?;
        assert_eq!(column_names(&df), vec!["Slug", "Date (UTC)", "PM2.5", "Date"]);
        assert_eq!(string_cell(&df, 0, "Slug")?, Some("a".to_string()));
        Ok(())
    }
}
