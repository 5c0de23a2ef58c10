use crate::error::Result;
use crate::writers::atomic::write_atomic;
use polars::prelude::*;
use std::path::Path;

/// Writes frames as CSV, by default with a leading unnamed row-index column
/// numbered from zero. Nulls are written as empty cells.
pub struct DatasetWriter {
    include_index: bool,
}

impl DatasetWriter {
    pub fn new() -> Self {
        Self {
            include_index: true,
        }
    }

    pub fn with_index(include_index: bool) -> Self {
        Self { include_index }
    }

    pub fn write_frame(&self, df: &DataFrame, path: &Path) -> Result<()> {
        let mut frame = if self.include_index {
            df.with_row_index("".into(), None)?
        } else {
            df.clone()
        };

        write_atomic(path, |out| {
            CsvWriter::new(out)
                .include_header(true)
                .finish(&mut frame)?;
            Ok(())
        })?;

        tracing::debug!("Wrote {} rows to {}", df.height(), path.display());
        Ok(())
    }
}

impl Default for DatasetWriter {
    fn default() -> Self {
        Self::new()
    }
}
