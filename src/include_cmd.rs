//! `texmerge include`: flatten a document by expanding `\input{...}`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use texmerge_core::{IncludeOptions, Includer};

use crate::config::IncludeConfig;
use crate::emit::{destination, emit, ensure_not_input};
use crate::format::Summary;

/// Expand inclusion directives recursively
///
/// Every line containing the directive is replaced by the full expansion of
/// the file named between its first `{` and first `}`. Other lines are
/// copied unchanged. The output is written only if the whole tree expands.
#[derive(Args, Debug, Default)]
pub struct IncludeArgs {
    /// Root document [default: book.tex]
    pub root: Option<PathBuf>,

    /// Output file, or `-` for stdout [default: book.w]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory that relative targets resolve against [default: the root's directory]
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Substring that marks a directive line [default: \input{]
    #[arg(long)]
    pub directive: Option<String>,

    /// Do not retry extension-less targets with the implicit extension
    #[arg(long)]
    pub no_implicit_extension: bool,
}

impl IncludeArgs {
    /// Resolve flags over config into core options, root and output.
    #[must_use]
    pub fn resolve(&self, config: &IncludeConfig) -> (IncludeOptions, PathBuf, PathBuf) {
        let implicit_extension = if self.no_implicit_extension || config.implicit_extension.is_empty() {
            None
        } else {
            Some(config.implicit_extension.clone())
        };
        let options = IncludeOptions {
            directive: self
                .directive
                .clone()
                .unwrap_or_else(|| config.directive.clone()),
            base_dir: self.base_dir.clone().or_else(|| config.base_dir.clone()),
            implicit_extension,
        };
        let root = self.root.clone().unwrap_or_else(|| config.root.clone());
        let output = self.output.clone().unwrap_or_else(|| config.output.clone());
        (options, root, output)
    }
}

/// Expand the root document and deliver the result.
///
/// # Errors
/// Expansion failures, overwriting an input, and output errors.
pub fn run(args: &IncludeArgs, config: &IncludeConfig) -> Result<Summary> {
    let (options, root, output) = args.resolve(config);
    tracing::info!(
        root = %root.display(),
        output = %output.display(),
        directive = %options.directive,
        "include"
    );

    let (bytes, report) = Includer::new(options)
        .expand_to_vec(&root)
        .with_context(|| format!("expand {}", root.display()))?;

    let dest = destination(&output);
    ensure_not_input(&dest, &report.files)?;
    emit(&dest, &bytes)?;

    Ok(Summary::Include {
        output: dest,
        bytes: bytes.len(),
        report,
    })
}
