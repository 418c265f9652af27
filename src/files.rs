//! Scoped file reads, atomic writes, and output path naming.

use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::errors::{FilecryptError, Result};

/// Read a whole file; a missing file is reported as [`FilecryptError::FileNotFound`].
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FilecryptError::FileNotFound(path.to_path_buf()),
        _ => FilecryptError::io(path, e),
    })
}

/// Write `bytes` to `path` through a temporary sibling file.
///
/// The target only appears once every byte is flushed; on failure the
/// temporary file is removed and any previous `path` is left untouched.
pub fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FilecryptError::io(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| FilecryptError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| FilecryptError::io(path, e.error))?;
    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// `path` with `suffix` appended to its final component.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
