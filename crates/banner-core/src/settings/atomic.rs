//! Atomic file operations for safe JSON persistence.
//!
//! Writes go to a temp file in the target directory, are synced, and then
//! renamed over the target so a crash never leaves a half-written blob.

use crate::{BannerError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Read and parse a JSON file.
///
/// Returns `None` if the file doesn't exist, or an error if parsing fails.
pub fn atomic_read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BannerError::io_with_path(e, path)),
    };

    let data: T = serde_json::from_str(&contents).map_err(|e| BannerError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok(Some(data))
}

/// Write data to a JSON file atomically.
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| BannerError::io_with_path(e, parent))?;

    let serialized = serde_json::to_string_pretty(data)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| BannerError::io_with_path(e, parent))?;
    temp.write_all(serialized.as_bytes())
        .map_err(|e| BannerError::io_with_path(e, temp.path()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| BannerError::io_with_path(e, temp.path()))?;

    temp.persist(path)
        .map_err(|e| BannerError::io_with_path(e.error, path))?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}
