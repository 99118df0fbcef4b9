//! `texmerge splice`: insert every fragment's body into the base fragment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use texmerge_core::{Markers, Splicer, join_lines};

use crate::config::SpliceConfig;
use crate::emit::{destination, emit};
use crate::format::{Destination, Summary};

/// Splice fragment bodies between fixed markers
///
/// Fragments are the `*.EXT` files in DIR, taken in ascending name order.
/// The first one is the base. The lines between each other fragment's start
/// and end marker are inserted just before the base's end marker.
#[derive(Args, Debug, Default)]
pub struct SpliceArgs {
    /// Directory holding the fragments [default: .]
    pub dir: Option<PathBuf>,

    /// Output file, or `-` for stdout [default: merged.tex]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fragment file extension [default: tex]
    #[arg(long)]
    pub extension: Option<String>,

    /// Line opening each fragment's body [default: \begin{document}]
    #[arg(long)]
    pub start_marker: Option<String>,

    /// Line closing each fragment's body [default: \end{document}]
    #[arg(long)]
    pub end_marker: Option<String>,
}

/// Fully resolved splice settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplicePlan {
    pub dir: PathBuf,
    pub extension: String,
    pub output: PathBuf,
    pub markers: Markers,
}

impl SpliceArgs {
    #[must_use]
    pub fn resolve(&self, config: &SpliceConfig) -> SplicePlan {
        SplicePlan {
            dir: self.dir.clone().unwrap_or_else(|| config.dir.clone()),
            extension: self
                .extension
                .clone()
                .unwrap_or_else(|| config.extension.clone()),
            output: self.output.clone().unwrap_or_else(|| config.output.clone()),
            markers: Markers {
                start: self
                    .start_marker
                    .clone()
                    .unwrap_or_else(|| config.start_marker.clone()),
                end: self
                    .end_marker
                    .clone()
                    .unwrap_or_else(|| config.end_marker.clone()),
            },
        }
    }
}

/// Run the splice and deliver the result.
///
/// # Errors
/// Identical markers, discovery and splice failures, and output errors.
pub fn run(args: &SpliceArgs, config: &SpliceConfig) -> Result<Summary> {
    let plan = args.resolve(config);
    tracing::info!(
        dir = %plan.dir.display(),
        extension = %plan.extension,
        output = %plan.output.display(),
        "splice"
    );

    let splicer = Splicer::new(plan.markers);
    splicer.check_markers()?;

    let dest = destination(&plan.output);
    // A file left by an earlier run is still not a fragment when printing.
    let exclude = match &dest {
        Destination::File(p) => p.as_path(),
        Destination::Stdout => config.output.as_path(),
    };

    let (lines, report) = splicer
        .splice_dir(&plan.dir, &plan.extension, Some(exclude))
        .with_context(|| format!("splice fragments in {}", plan.dir.display()))?;

    let bytes = join_lines(&lines);
    emit(&dest, &bytes)?;

    Ok(Summary::Splice {
        output: dest,
        bytes: bytes.len(),
        report,
    })
}
