//! texmerge library crate — the CLI's modules, exposed for integration tests.
//!
//! The merge engine itself lives in `texmerge-core`; this crate adds
//! configuration, logging, summaries and the two subcommands.

pub mod config;
pub mod emit;
pub mod format;
pub mod include_cmd;
pub mod splice_cmd;
pub mod telemetry;
