//! Marker-based splicer.
//!
//! Every fragment carries the same front and back matter; only the region
//! between the start marker and the end marker is its own. The base fragment
//! keeps its front and back matter, and each other fragment's body is
//! inserted just before the base's end marker, in order, so bodies appear in
//! the output in the order the fragments were given.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::instrument;

use crate::discover::discover_fragments;
use crate::error::{MergeError, Result};
use crate::fragment::Fragment;

pub const DEFAULT_START_MARKER: &str = r"\begin{document}";
pub const DEFAULT_END_MARKER: &str = r"\end{document}";

/// The two structural marker lines, compared without line terminators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    pub start: String,
    pub end: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MARKER.to_owned(),
            end: DEFAULT_END_MARKER.to_owned(),
        }
    }
}

/// What a splice produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpliceReport {
    pub base: PathBuf,
    /// Fragments whose bodies were inserted, in insertion order.
    pub fragments: Vec<PathBuf>,
    pub lines_inserted: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Splicer {
    markers: Markers,
}

impl Splicer {
    #[must_use]
    pub const fn new(markers: Markers) -> Self {
        Self { markers }
    }

    #[must_use]
    pub const fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Splice every fragment's body into `base`, in iteration order.
    ///
    /// # Errors
    /// [`MergeError::MissingMarker`] when the base has no end marker or a
    /// fragment lacks either marker; [`MergeError::MarkerOrder`] when a
    /// fragment's end marker does not follow its start marker;
    /// [`MergeError::SameMarkers`] when both markers are the same line.
    pub fn splice(
        &self,
        base: Fragment,
        fragments: impl IntoIterator<Item = Fragment>,
    ) -> Result<(Vec<String>, SpliceReport)> {
        self.check_markers()?;
        let mut point = self.locate(&base, &self.markers.end)?;
        let mut report = SpliceReport {
            base: base.path().to_owned(),
            fragments: Vec::new(),
            lines_inserted: 0,
        };
        let mut merged = base.into_lines();

        for fragment in fragments {
            let body = self.body(&fragment)?;
            merged.splice(point..point, body.iter().cloned());
            point += body.len();
            report.lines_inserted += body.len();
            tracing::debug!(
                fragment = %fragment.path().display(),
                lines = body.len(),
                "spliced fragment body"
            );
            report.fragments.push(fragment.path().to_owned());
        }

        Ok((merged, report))
    }

    /// Read `paths` and splice them; the first path is the base.
    ///
    /// # Errors
    /// [`MergeError::NoFragments`] when `paths` is empty, plus everything
    /// [`Fragment::read`] and [`Splicer::splice`] return.
    pub fn splice_paths(&self, paths: &[PathBuf]) -> Result<(Vec<String>, SpliceReport)> {
        let Some((base, rest)) = paths.split_first() else {
            return Err(MergeError::NoFragments {
                pattern: "<empty fragment list>".to_owned(),
            });
        };
        let base = Fragment::read(base, None)?;
        let fragments = rest
            .iter()
            .map(|p| Fragment::read(p, None))
            .collect::<Result<Vec<_>>>()?;
        self.splice(base, fragments)
    }

    /// Discover `*.{extension}` in `dir` and splice them in ascending name
    /// order. The lexicographically first file is the base. `exclude` (the
    /// output path, usually) is never treated as a fragment.
    ///
    /// # Errors
    /// Same as [`Splicer::splice_paths`], plus discovery errors.
    #[instrument(skip_all, fields(dir = %dir.display(), extension = %extension))]
    pub fn splice_dir(
        &self,
        dir: &Path,
        extension: &str,
        exclude: Option<&Path>,
    ) -> Result<(Vec<String>, SpliceReport)> {
        let paths = discover_fragments(dir, extension, exclude)?;
        tracing::info!(count = paths.len(), "discovered fragments");
        let (merged, report) = self.splice_paths(&paths)?;
        tracing::info!(
            base = %report.base.display(),
            fragments = report.fragments.len(),
            lines = report.lines_inserted,
            "splice complete"
        );
        Ok((merged, report))
    }

    /// The lines strictly between a fragment's first start and first end
    /// marker.
    ///
    /// # Errors
    /// [`MergeError::SameMarkers`], [`MergeError::MissingMarker`] or
    /// [`MergeError::MarkerOrder`].
    pub fn body<'a>(&self, fragment: &'a Fragment) -> Result<&'a [String]> {
        self.check_markers()?;
        let start = self.locate(fragment, &self.markers.start)?;
        let end = self.locate(fragment, &self.markers.end)?;
        if end <= start {
            return Err(MergeError::MarkerOrder {
                path: fragment.path().to_owned(),
                start_line: start + 1,
                end_line: end + 1,
            });
        }
        Ok(&fragment.lines()[start + 1..end])
    }

    /// Identical markers would make every body empty or inverted.
    ///
    /// # Errors
    /// [`MergeError::SameMarkers`].
    pub fn check_markers(&self) -> Result<()> {
        if self.markers.start == self.markers.end {
            return Err(MergeError::SameMarkers {
                marker: self.markers.start.clone(),
            });
        }
        Ok(())
    }

    fn locate(&self, fragment: &Fragment, marker: &str) -> Result<usize> {
        let index = fragment
            .find_line(marker)
            .ok_or_else(|| MergeError::MissingMarker {
                path: fragment.path().to_owned(),
                marker: marker.to_owned(),
            })?;
        let count = fragment.count_lines(marker);
        if count > 1 {
            tracing::warn!(
                path = %fragment.path().display(),
                marker,
                count,
                "marker appears more than once, using the first"
            );
        }
        Ok(index)
    }
}
