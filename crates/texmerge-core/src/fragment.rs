//! Fragments: fully-buffered documents split into terminated lines.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Location, MergeError, Result};

/// A document read from disk, split into lines.
///
/// Each line keeps its terminator (`\n` or `\r\n`); only the last line may
/// lack one. Concatenating [`Fragment::lines`] reproduces the file exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    path: PathBuf,
    lines: Vec<String>,
}

impl Fragment {
    /// Read `path` fully.
    ///
    /// # Errors
    /// [`MergeError::FileNotFound`] when the file is absent, with
    /// `included_from` attached; [`MergeError::Io`] for any other failure,
    /// including contents that are not UTF-8.
    pub fn read(path: &Path, included_from: Option<Location>) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), bytes = text.len(), "read fragment");
                Ok(Self::from_text(path, &text))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MergeError::FileNotFound {
                path: path.to_owned(),
                included_from,
            }),
            Err(e) => Err(MergeError::io(path, e)),
        }
    }

    /// Build a fragment from in-memory text.
    #[must_use]
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: text.split_inclusive('\n').map(str::to_owned).collect(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Index of the first line whose content equals `marker`.
    #[must_use]
    pub fn find_line(&self, marker: &str) -> Option<usize> {
        find_line(&self.lines, marker)
    }

    /// Number of lines whose content equals `marker`.
    #[must_use]
    pub fn count_lines(&self, marker: &str) -> usize {
        self.lines.iter().filter(|l| content(l) == marker).count()
    }
}

/// A line without its `\n` / `\r\n` terminator.
#[must_use]
pub fn content(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Index of the first line in `lines` whose content equals `marker`.
#[must_use]
pub fn find_line(lines: &[String], marker: &str) -> Option<usize> {
    lines.iter().position(|l| content(l) == marker)
}
