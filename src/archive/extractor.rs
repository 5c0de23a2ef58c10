use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// The expected directory was already present; nothing was read.
    AlreadyExtracted(PathBuf),
    Extracted { root: PathBuf, files: usize },
}

/// Unpacks the station archive next to where the merge expects it.
pub struct ArchiveExtractor {
    archive_path: PathBuf,
    destination: PathBuf,
}

impl ArchiveExtractor {
    pub fn new(archive_path: &Path, destination: &Path) -> Self {
        Self {
            archive_path: archive_path.to_path_buf(),
            destination: destination.to_path_buf(),
        }
    }

    /// Extract unless `expected_root` already exists.
    ///
    /// Only the directory's presence is checked. A partially extracted tree
    /// left by an earlier failed run is treated as complete.
    pub fn extract_if_missing(&self, expected_root: &Path) -> Result<ExtractionOutcome> {
        if expected_root.is_dir() {
            tracing::info!(
                "Archive already extracted at {}, skipping",
                expected_root.display()
            );
            return Ok(ExtractionOutcome::AlreadyExtracted(
                expected_root.to_path_buf(),
            ));
        }

        let files = self.extract_all()?;
        tracing::info!(
            "Extracted {} files from {}",
            files,
            self.archive_path.display()
        );
        Ok(ExtractionOutcome::Extracted {
            root: expected_root.to_path_buf(),
            files,
        })
    }

    fn extract_all(&self) -> Result<usize> {
        let file = File::open(&self.archive_path)?;
        let mut archive = ZipArchive::new(file)?;
        let mut extracted = 0;

        for i in 0..archive.len() {
            let mut zip_file = archive.by_index(i)?;

            // Entries that would escape the destination are skipped
            let relative = match zip_file.enclosed_name() {
                Some(name) => name.to_path_buf(),
                None => {
                    tracing::warn!("Skipping unsafe archive entry '{}'", zip_file.name());
                    continue;
                }
            };
            let dest_path = self.destination.join(relative);

            if zip_file.is_dir() {
                std::fs::create_dir_all(&dest_path)?;
                continue;
            }

            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut dest_file = File::create(&dest_path)?;
            let mut writer = BufWriter::new(&mut dest_file);
            std::io::copy(&mut zip_file, &mut writer)?;
            writer.flush()?;
            extracted += 1;
        }

        Ok(extracted)
    }
}
