//! Atomic output.
//!
//! The merged document is written to a temp file next to the destination,
//! fsynced, then renamed over it. A failed merge never leaves a truncated
//! or half-written output behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{MergeError, Result};

/// Replace `path` with `contents`.
///
/// # Errors
/// [`MergeError::Io`] if the temp file cannot be created or written,
/// [`MergeError::Persist`] if it cannot be renamed over `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| MergeError::io(&dir, e))?;
    tmp.write_all(contents)
        .map_err(|e| MergeError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| MergeError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| MergeError::Persist {
        path: path.to_owned(),
        source: e.error,
    })?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}

/// Join lines that already carry their terminators.
#[must_use]
pub fn join_lines(lines: &[String]) -> Vec<u8> {
    lines.concat().into_bytes()
}
