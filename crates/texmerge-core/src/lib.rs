//! Core merge logic for texmerge.
//!
//! Two independent ways of flattening a multi-file document:
//!
//! - [`Includer`] expands inclusion directives (`\input{path}`) recursively,
//!   depth-first, into a caller-supplied writer.
//! - [`Splicer`] takes the body of each fragment (between the start and end
//!   marker lines) and inserts it before the end marker of a base fragment.
//!
//! [`write_atomic`] puts the result on disk without ever exposing a partial
//! file.

pub mod discover;
pub mod error;
pub mod fragment;
pub mod include;
pub mod output;
pub mod splice;

pub use discover::discover_fragments;
pub use error::{Location, MergeError, Result};
pub use fragment::Fragment;
pub use include::{IncludeOptions, IncludeReport, Includer};
pub use output::{join_lines, write_atomic};
pub use splice::{Markers, SpliceReport, Splicer};
