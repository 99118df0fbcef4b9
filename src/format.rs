use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::Serialize;
use texmerge_core::{IncludeReport, SpliceReport};

/// Output format for the post-merge summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable line on stderr
    #[default]
    Text,
    /// Pretty JSON on stdout - machine-parseable
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => bail!("Invalid format '{s}'. Use: text or json"),
        }
    }
}

/// Where the merged document went
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

/// Summary of one merge run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Summary {
    Include {
        output: Destination,
        bytes: usize,
        #[serde(flatten)]
        report: IncludeReport,
    },
    Splice {
        output: Destination,
        bytes: usize,
        #[serde(flatten)]
        report: SpliceReport,
    },
}

impl Summary {
    /// Render the summary in the requested format
    ///
    /// # Errors
    /// JSON serialization failed.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| anyhow::anyhow!("JSON serialization failed: {e}")),
            OutputFormat::Text => Ok(self.text()),
        }
    }

    fn text(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Include {
                output,
                bytes,
                report,
            } => {
                let _ = write!(
                    out,
                    "merged {} file(s), {} directive(s), {} line(s), {bytes} bytes -> {}",
                    report.files.len(),
                    report.directives_expanded,
                    report.lines_written,
                    destination(output),
                );
            }
            Self::Splice {
                output,
                bytes,
                report,
            } => {
                let _ = write!(
                    out,
                    "spliced {} fragment(s) into {}, {} line(s) inserted, {bytes} bytes -> {}",
                    report.fragments.len(),
                    report.base.display(),
                    report.lines_inserted,
                    destination(output),
                );
            }
        }
        out
    }
}

fn destination(dest: &Destination) -> String {
    match dest {
        Destination::File(p) => p.display().to_string(),
        Destination::Stdout => "<stdout>".to_owned(),
    }
}
