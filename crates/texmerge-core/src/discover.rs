//! Fragment discovery: `*.{ext}` in one directory, sorted by name.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{MergeError, Result};

/// List the regular files in `dir` ending in `.{extension}`, ascending by
/// name. Hidden files are skipped, and so is `exclude` when it names one of
/// the matches.
///
/// # Errors
/// [`MergeError::NoFragments`] when nothing matches, [`MergeError::Pattern`]
/// for an unusable pattern and [`MergeError::Io`] when the directory cannot be
/// read.
pub fn discover_fragments(
    dir: &Path,
    extension: &str,
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(extension.trim_start_matches('.'))
    );
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::default()
    };

    let excluded = match exclude {
        Some(p) if p.exists() => Some(std::fs::canonicalize(p).map_err(|e| MergeError::io(p, e))?),
        _ => None,
    };

    let mut paths = Vec::new();
    for entry in glob::glob_with(&pattern, options)? {
        let path = entry.map_err(|e| {
            let path = e.path().to_owned();
            MergeError::io(path, std::io::Error::from(e))
        })?;
        if !path.is_file() {
            continue;
        }
        if let Some(excluded) = &excluded {
            let canonical = std::fs::canonicalize(&path).map_err(|e| MergeError::io(&path, e))?;
            if &canonical == excluded {
                tracing::debug!(path = %path.display(), "skipping output file");
                continue;
            }
        }
        paths.push(path);
    }

    if paths.is_empty() {
        return Err(MergeError::NoFragments { pattern });
    }
    paths.sort();
    Ok(paths)
}
