use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use texmerge::config::{DEFAULT_CONFIG_FILE, TexMergeConfig};
use texmerge::format::{OutputFormat, Summary};
use texmerge::{include_cmd, splice_cmd, telemetry};

/// Flatten multi-file LaTeX sources into a single document
///
/// Two independent strategies:
///
///   include   expand \input{...} directives recursively, depth-first,
///             starting from a root document (book.tex -> book.w)
///
///   splice    take every *.tex in a directory, keep the first one as the
///             base, and insert the text between \begin{document} and
///             \end{document} of every other file before the base's
///             \end{document}
///
/// Output is written to a temp file and renamed into place, so a failed
/// merge never leaves a partial file behind. Defaults can be set in
/// texmerge.toml.
#[derive(Parser)]
#[command(name = "texmerge")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'texmerge <command> --help' for more information on a specific command.")]
struct Cli {
    /// Config file [default: texmerge.toml in the working directory]
    #[arg(long, global = true, env = "TEXMERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Summary format: text (stderr) or json (stdout)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Include(include_cmd::IncludeArgs),
    Splice(splice_cmd::SpliceArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = TexMergeConfig::load(&config_path).context("load configuration")?;

    let summary = match &cli.command {
        Commands::Include(args) => include_cmd::run(args, &config.include)?,
        Commands::Splice(args) => splice_cmd::run(args, &config.splice)?,
    };

    report(&summary, cli.format)
}

fn report(summary: &Summary, format: OutputFormat) -> Result<()> {
    let rendered = summary.render(format)?;
    match format {
        OutputFormat::Text => eprintln!("{rendered}"),
        OutputFormat::Json => println!("{rendered}"),
    }
    Ok(())
}
