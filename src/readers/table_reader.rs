use crate::error::{ProcessingError, Result};
use encoding_rs::UTF_8;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Loads a CSV file into a [`DataFrame`] of string columns, optionally
/// skipping leading lines that precede the header.
///
/// Cells keep their exact text so deduplication compares rows as written.
pub struct TableReader {
    skip_lines: usize,
}

impl TableReader {
    pub fn new() -> Self {
        Self { skip_lines: 0 }
    }

    pub fn with_skip_lines(skip_lines: usize) -> Self {
        Self { skip_lines }
    }

    pub fn read_table(&self, path: &Path) -> Result<DataFrame> {
        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes).map_err(|e| match e {
            ProcessingError::InvalidFormat(msg) => {
                ProcessingError::InvalidFormat(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse raw file bytes. A UTF-8 BOM is removed before parsing.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<DataFrame> {
        let (text, _, had_errors) = UTF_8.decode(bytes);
        if had_errors {
            tracing::debug!("Replaced malformed UTF-8 sequences while decoding CSV");
        }
        if text.lines().nth(self.skip_lines).is_none() {
            return Err(ProcessingError::InvalidFormat(
                "CSV has no header row".to_string(),
            ));
        }

        let parse_options = CsvParseOptions::default().with_truncate_ragged_lines(true);
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_skip_rows(self.skip_lines)
            .with_infer_schema_length(Some(0))
            .with_parse_options(parse_options)
            .into_reader_with_file_handle(Cursor::new(text.as_bytes()))
            .finish()?;

        if df.width() == 0 {
            return Err(ProcessingError::InvalidFormat(
                "CSV has no header row".to_string(),
            ));
        }
        Ok(df)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::frames::{column_names, string_cell};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_table() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "a,b")?;
        writeln!(temp_file, "1,2")?;
        writeln!(temp_file, "3,4")?;

        let df = TableReader::new().read_table(temp_file.path())?;
        assert_eq!(column_names(&df), vec!["a", "b"]);
        assert_eq!(df.height(), 2);
        Ok(())
    }

    #[test]
    fn test_cells_keep_their_text() -> Result<()> {
        let df = TableReader::new().parse_bytes(b"PM2.5,Slug\n10.0,a\n007,b\n")?;
        assert_eq!(df.column("PM2.5")?.dtype(), &DataType::String);
        assert_eq!(string_cell(&df, 0, "PM2.5")?, Some("10.0".to_string()));
        assert_eq!(string_cell(&df, 1, "PM2.5")?, Some("007".to_string()));
        Ok(())
    }

    #[test]
    fn test_skip_lines() -> Result<()> {
        let df = TableReader::with_skip_lines(1).parse_bytes(b"License CC-BY\nx,y\n1,2\n")?;
        assert_eq!(column_names(&df), vec!["x", "y"]);
        assert_eq!(string_cell(&df, 0, "y")?, Some("2".to_string()));
        Ok(())
    }

    #[test]
    fn test_bom_is_stripped() -> Result<()> {
        let df = TableReader::new().parse_bytes(b"\xEF\xBB\xBFSlug,lat\na,1\n")?;
        assert!(df.column("Slug").is_ok());
        Ok(())
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(TableReader::with_skip_lines(1)
            .parse_bytes(b"only one line")
            .is_err());
        assert!(TableReader::new().parse_bytes(b"").is_err());
    }
}
