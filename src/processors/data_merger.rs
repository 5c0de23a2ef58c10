use crate::error::{ProcessingError, Result};
use crate::readers::ReadingReader;
use crate::utils::constants::SLUG_COLUMN;
use crate::utils::filename::is_data_file;
use crate::utils::frames::{inner_join, union_distinct};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Row counts behind one Daily Dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySummary {
    pub date: String,
    pub files: usize,
    /// Rows parsed from the data files before joining.
    pub file_rows: usize,
    /// Rows that found a station in the index.
    pub joined_rows: usize,
    /// Rows left after dropping duplicates.
    pub rows: usize,
}

/// Builds the Daily Dataset of one date directory.
pub struct DataMerger {
    reader: ReadingReader,
}

impl DataMerger {
    pub fn new() -> Self {
        Self {
            reader: ReadingReader::new(),
        }
    }

    /// Data files of a date directory in name order.
    pub fn list_data_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let is_data = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_data_file);
            if is_data {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read, join and deduplicate every data file in `dir`.
    ///
    /// A reading whose slug has no row in `index` is dropped. A directory
    /// with no data files, or none of whose readings match a station, is an
    /// error.
    pub fn merge_directory(
        &self,
        dir: &Path,
        index: &DataFrame,
    ) -> Result<(DataFrame, DailySummary)> {
        let date = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let files = self.list_data_files(dir)?;
        if files.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "No data files in {}",
                dir.display()
            )));
        }

        let mut file_rows = 0;
        let mut joined = Vec::with_capacity(files.len());
        for file in &files {
            let readings = self.reader.read_readings(file)?;
            file_rows += readings.height();
            joined.push(inner_join(&readings, index, SLUG_COLUMN)?);
        }

        let joined_rows = joined.iter().map(DataFrame::height).sum();
        let daily = union_distinct(&joined)?;

        if daily.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "No readings in {} matched a station in the index",
                dir.display()
            )));
        }

        let summary = DailySummary {
            date,
            files: files.len(),
            file_rows,
            joined_rows,
            rows: daily.height(),
        };
        tracing::debug!(
            "{}: {} files, {} rows read, {} joined, {} after dedup",
            summary.date,
            summary.files,
            summary.file_rows,
            summary.joined_rows,
            summary.rows
        );

        Ok((daily, summary))
    }
}

impl Default for DataMerger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::TableReader;
    use crate::utils::frames::string_cell;
    use std::fs;
    use tempfile::TempDir;

    fn index() -> DataFrame {
        TableReader::new()
            .parse_bytes(b"Slug,Latitude,Longitude\na,46.8,-71.2\nb,46.9,-71.3\n")
            .unwrap()
    }

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_merge_directory_joins_and_dedups() -> Result<()> {
        let root = TempDir::new()?;
        let dir = root.path().join("2022-05-01");
        fs::create_dir(&dir)?;
        write(
            &dir,
            "2022-05-01_a.csv",
            "License\nDate (UTC),PM2.5\n2022-05-01 00:00:00,10\n2022-05-01 00:00:00,10\n",
        );
        write(
            &dir,
            "2022-05-01_b.csv",
            "Date (UTC),PM2.5\n2022-05-01 00:00:00,12\n",
        );
        write(
            &dir,
            "2022-05-01_unknown.csv",
            "License\nDate (UTC),PM2.5\n2022-05-01 00:00:00,99\n",
        );
        write(&dir, "index.csv", "Slug,Latitude,Longitude\na,46.8,-71.2\n");

        let (daily, summary) = DataMerger::new().merge_directory(&dir, &index())?;

        assert_eq!(summary.files, 3);
        assert_eq!(summary.file_rows, 4);
        assert_eq!(summary.joined_rows, 3);
        assert_eq!(summary.rows, 2);
        assert!(summary.rows <= summary.file_rows);
        let slugs: Vec<Option<&str>> = daily.column("Slug")?.str()?.into_iter().collect();
        assert_eq!(slugs, vec![Some("a"), Some("b")]);
        assert_eq!(string_cell(&daily, 1, "Latitude")?, Some("46.9".to_string()));
        Ok(())
    }

    #[test]
    fn test_empty_directory_is_an_error() -> Result<()> {
        let root = TempDir::new()?;
        write(root.path(), "index.csv", "Slug\n");
        assert!(matches!(
            DataMerger::new().merge_directory(root.path(), &index()),
            Err(ProcessingError::MissingData(_))
        ));
        Ok(())
    }

    #[test]
    fn test_no_matching_station_is_an_error() -> Result<()> {
        let root = TempDir::new()?;
        write(
            root.path(),
            "2022-05-01_zzz.csv",
            "Date (UTC),PM2.5\n2022-05-01 00:00:00,12\n",
        );
        assert!(DataMerger::new()
            .merge_directory(root.path(), &index())
            .is_err());
        Ok(())
    }

    #[test]
    fn test_short_data_file_name_is_dropped_by_join() -> Result<()> {
        let root = TempDir::new()?;
        write(
            root.path(),
            "2022-05-01_a.csv",
            "Date (UTC),PM2.5\n2022-05-01 00:00:00,12\n",
        );
        write(root.path(), "2022.csv", "Date (UTC),PM2.5\n2022-05-01 00:00:00,99\n");
        write(root.path(), "2022-05-01_.csv", "Date (UTC),PM2.5\n2022-05-01 00:00:00,98\n");

        let (daily, summary) = DataMerger::new().merge_directory(root.path(), &index())?;
        assert_eq!(summary.files, 3);
        assert_eq!(summary.file_rows, 3);
        assert_eq!(summary.rows, 1);
        assert_eq!(string_cell(&daily, 0, "PM2.5")?, Some("12".to_string()));
        Ok(())
    }

    #[test]
    fn test_list_data_files_filters_and_sorts() -> Result<()> {
        let root = TempDir::new()?;
        write(root.path(), "2022-05-01_b.csv", "");
        write(root.path(), "2022-05-01_a.csv", "");
        write(root.path(), "index.csv", "");
        fs::create_dir(root.path().join("2022-sub"))?;

        let files = DataMerger::new().list_data_files(root.path())?;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["2022-05-01_a.csv", "2022-05-01_b.csv"]);
        Ok(())
    }
}
