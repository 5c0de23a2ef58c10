use crate::error::{ProcessingError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` via a temporary file in the same directory,
/// so readers never observe a half-written output.
pub fn write_atomic<F>(path: &Path, contents: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file_mut());
        contents(&mut writer)?;
        writer.flush()?;
    }
    temp.persist(path)
        .map_err(|e| ProcessingError::Io(e.error))?;
    Ok(())
}
