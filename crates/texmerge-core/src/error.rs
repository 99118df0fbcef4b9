//! Error types for merge operations.
//!
//! [`MergeError`] is the single error type returned by the includer, the
//! splicer, discovery and output. Every failure aborts the merge; variants
//! carry enough context (file, line, marker) to fix the input without
//! re-running under a debugger.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by merge operations.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A referenced or requested input file does not exist.
    #[error("file not found: {}{}", path.display(), IncludedFrom(included_from.as_ref()))]
    FileNotFound {
        /// The path that was looked up.
        path: PathBuf,
        /// The directive that referenced it, if any.
        included_from: Option<Location>,
    },

    /// An inclusion directive whose braces could not be sliced into a path.
    #[error("malformed directive at {location}: {reason}: `{text}`")]
    MalformedDirective {
        /// Where the directive was found.
        location: Location,
        /// The offending line, without its terminator.
        text: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A file includes itself, directly or through other files.
    #[error("inclusion cycle: {}", display_chain(chain))]
    IncludeCycle {
        /// Files from the outermost to the one closing the cycle.
        chain: Vec<PathBuf>,
    },

    /// A fragment lacks a required structural marker line.
    #[error("marker `{marker}` not found in {}", path.display())]
    MissingMarker {
        /// The fragment that was searched.
        path: PathBuf,
        /// The marker line, without terminator.
        marker: String,
    },

    /// A fragment's end marker precedes its start marker.
    #[error(
        "end marker (line {end_line}) precedes start marker (line {start_line}) in {}",
        path.display()
    )]
    MarkerOrder {
        /// The offending fragment.
        path: PathBuf,
        /// 1-based line of the first start marker.
        start_line: usize,
        /// 1-based line of the first end marker.
        end_line: usize,
    },

    /// The start and end markers are the same line, so no body can be
    /// delimited.
    #[error("start and end markers are both `{marker}`; they must differ")]
    SameMarkers {
        /// The shared marker line.
        marker: String,
    },

    /// Discovery found nothing to merge.
    #[error("no fragments matching `{pattern}`")]
    NoFragments {
        /// The glob pattern that matched nothing.
        pattern: String,
    },

    /// The discovery glob could not be compiled.
    #[error("invalid fragment pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Reading an input or writing the output failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The caller-supplied output sink rejected a write.
    #[error("could not write merged output: {0}")]
    Output(#[source] std::io::Error),

    /// The finished temp file could not be moved over the destination.
    #[error("could not replace {}: {source}", path.display())]
    Persist {
        /// The destination path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl MergeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A 1-based line within a named file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

struct IncludedFrom<'a>(Option<&'a Location>);

impl fmt::Display for IncludedFrom<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(loc) => write!(f, " (included from {loc})"),
            None => Ok(()),
        }
    }
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MergeError>;
