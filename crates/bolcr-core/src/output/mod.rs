//! JSON output writing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::WriteError;
use crate::models::record::BolRecord;

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Writes validated records to disk as JSON.
///
/// The record is serialized to a temporary file in the destination directory
/// and renamed into place, so an interrupted run never leaves a partial file
/// at the output path.
pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Serialize the record to a JSON string.
    pub fn to_string(&self, record: &BolRecord) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(record)?
        } else {
            serde_json::to_string(record)?
        };
        Ok(json)
    }

    /// Write the record to `path`, creating parent directories as needed.
    pub fn write(&self, record: &BolRecord, path: &Path) -> Result<()> {
        let json = self.to_string(record)?;
        write_atomic(path, json.as_bytes())
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `data` to `path` via a temporary file in the same directory.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
            parent.to_path_buf()
        }
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| WriteError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tmp.write_all(data).map_err(|e| WriteError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tmp.flush().map_err(|e| WriteError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tmp.persist(path).map_err(|e| WriteError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    debug!("wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}
