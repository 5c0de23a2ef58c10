use crate::error::{ProcessingError, Result};
use crate::processors::data_merger::{DailySummary, DataMerger};
use crate::readers::StationReader;
use crate::utils::constants::{DAILY_OUTPUT_DIR, DATE_COLUMN, FULL_OUTPUT_FILE, INDEX_FILE};
use crate::utils::dates::date_range;
use crate::utils::filename::daily_output_file_name;
use crate::utils::frames::{string_cell, union_distinct};
use crate::utils::progress::ProgressReporter;
use crate::writers::DatasetWriter;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Outcome of a full merge run.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub stations: usize,
    pub days: Vec<DailySummary>,
    pub daily_files: Vec<PathBuf>,
    pub full_rows: usize,
    pub full_file: PathBuf,
}

impl MergeSummary {
    pub fn summary(&self) -> String {
        let daily_rows: usize = self.days.iter().map(|d| d.rows).sum();
        let read_rows: usize = self.days.iter().map(|d| d.file_rows).sum();
        format!(
            "Merged {} days from {} stations\n  rows read: {}\n  daily rows: {}\n  full dataset rows: {}\n  output: {}",
            self.days.len(),
            self.stations,
            read_rows,
            daily_rows,
            self.full_rows,
            self.full_file.display()
        )
    }
}

/// Merges one directory per day into daily and full CSV datasets.
pub struct MergePipeline {
    data_root: PathBuf,
    output_dir: PathBuf,
    start: NaiveDate,
    end: NaiveDate,
    max_workers: usize,
}

impl MergePipeline {
    pub fn new(data_root: &Path, output_dir: &Path, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            data_root: data_root.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            start,
            end,
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Date directories covered by the configured range, end exclusive.
    pub fn date_directories(&self) -> Vec<PathBuf> {
        date_range(self.start, self.end)
            .into_iter()
            .map(|d| self.data_root.join(d.format("%Y-%m-%d").to_string()))
            .collect()
    }

    /// Union of every date directory's station index.
    pub fn load_station_index(&self, dirs: &[PathBuf]) -> Result<DataFrame> {
        let reader = StationReader::new();
        let indexes = dirs
            .par_iter()
            .map(|dir| reader.read_index(&dir.join(INDEX_FILE)))
            .collect::<Result<Vec<_>>>()?;

        let index = reader.union_indexes(&indexes)?;
        for slug in reader.ambiguous_slugs(&index)? {
            tracing::warn!(
                "Station '{}' has several index rows; its readings will be repeated",
                slug
            );
        }
        Ok(index)
    }

    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<MergeSummary> {
        let dirs = self.date_directories();
        if dirs.is_empty() {
            return Err(ProcessingError::Config(format!(
                "Empty date range {} .. {}",
                self.start, self.end
            )));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        if let Some(p) = progress {
            p.set_message("Loading station indexes...");
        }
        let index = pool.install(|| self.load_station_index(&dirs))?;
        let stations = index.height();
        tracing::info!("Loaded {} station index rows from {} days", stations, dirs.len());

        if let Some(p) = progress {
            p.set_message("Merging daily readings...");
        }
        let merger = DataMerger::new();
        let daily: Vec<(DataFrame, DailySummary)> = pool.install(|| {
            dirs.par_iter()
                .map(|dir| {
                    let result = merger.merge_directory(dir, &index);
                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    result
                })
                .collect::<Result<Vec<_>>>()
        })?;

        if let Some(p) = progress {
            p.set_message("Writing daily datasets...");
        }
        let daily_files = self.write_daily(&daily)?;

        if let Some(p) = progress {
            p.set_message("Writing full dataset...");
        }
        let frames: Vec<DataFrame> = daily.iter().map(|(df, _)| df.clone()).collect();
        let full = union_distinct(&frames)?;
        let full_file = self.output_dir.join(FULL_OUTPUT_FILE);
        DatasetWriter::new().write_frame(&full, &full_file)?;
        tracing::info!("Wrote {} rows to {}", full.height(), full_file.display());

        if let Some(p) = progress {
            p.finish_with_message(&format!("Merged {} days", daily.len()));
        }

        Ok(MergeSummary {
            stations,
            days: daily.into_iter().map(|(_, summary)| summary).collect(),
            daily_files,
            full_rows: full.height(),
            full_file,
        })
    }

    fn write_daily(&self, daily: &[(DataFrame, DailySummary)]) -> Result<Vec<PathBuf>> {
        let daily_dir = self.output_dir.join(DAILY_OUTPUT_DIR);
        if !daily_dir.is_dir() {
            std::fs::create_dir_all(&daily_dir)?;
        }

        let writer = DatasetWriter::new();
        let mut files = Vec::with_capacity(daily.len());
        for (df, summary) in daily {
            // Named after the first row's date, which matches its directory
            let date = string_cell(df, 0, DATE_COLUMN)?
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| summary.date.clone());
            let path = daily_dir.join(daily_output_file_name(&date));
            writer.write_frame(df, &path)?;
            files.push(path);
        }

        tracing::info!("Wrote {} daily datasets to {}", files.len(), daily_dir.display());
        Ok(files)
    }
}
