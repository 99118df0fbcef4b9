//! texmerge configuration (`texmerge.toml`).
//!
//! Defines defaults for both merge commands. Command-line flags override
//! anything set here.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use texmerge_core::include::{DEFAULT_DIRECTIVE, DEFAULT_IMPLICIT_EXTENSION};
use texmerge_core::splice::{DEFAULT_END_MARKER, DEFAULT_START_MARKER};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "texmerge.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
///
/// Missing fields use defaults. Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TexMergeConfig {
    #[serde(default)]
    pub include: IncludeConfig,

    #[serde(default)]
    pub splice: SpliceConfig,
}

// ---------------------------------------------------------------------------
// IncludeConfig
// ---------------------------------------------------------------------------

/// Settings for `texmerge include`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeConfig {
    /// Root document (default: `"book.tex"`).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Output file (default: `"book.w"`).
    #[serde(default = "default_include_output")]
    pub output: PathBuf,

    /// Directive substring (default: `"\input{"`).
    #[serde(default = "default_directive")]
    pub directive: String,

    /// Directory relative targets resolve against. Unset → the root's
    /// directory.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Extension tried for extension-less targets. Empty string disables.
    #[serde(default = "default_implicit_extension")]
    pub implicit_extension: String,
}

impl Default for IncludeConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            output: default_include_output(),
            directive: default_directive(),
            base_dir: None,
            implicit_extension: default_implicit_extension(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("book.tex")
}

fn default_include_output() -> PathBuf {
    PathBuf::from("book.w")
}

fn default_directive() -> String {
    DEFAULT_DIRECTIVE.to_owned()
}

fn default_implicit_extension() -> String {
    DEFAULT_IMPLICIT_EXTENSION.to_owned()
}

// ---------------------------------------------------------------------------
// SpliceConfig
// ---------------------------------------------------------------------------

/// Settings for `texmerge splice`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpliceConfig {
    /// Directory holding the fragments (default: `"."`).
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Fragment extension, without the dot (default: `"tex"`).
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Output file (default: `"merged.tex"`). Never picked up as a fragment.
    #[serde(default = "default_splice_output")]
    pub output: PathBuf,

    #[serde(default = "default_start_marker")]
    pub start_marker: String,

    #[serde(default = "default_end_marker")]
    pub end_marker: String,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            extension: default_extension(),
            output: default_splice_output(),
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    "tex".to_owned()
}

fn default_splice_output() -> PathBuf {
    PathBuf::from("merged.tex")
}

fn default_start_marker() -> String {
    DEFAULT_START_MARKER.to_owned()
}

fn default_end_marker() -> String {
    DEFAULT_END_MARKER.to_owned()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl TexMergeConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   returns a [`ConfigError`] with line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
