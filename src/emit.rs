//! Delivering the merged document: atomic file replace or stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use texmerge_core::write_atomic;

use crate::format::Destination;

/// Output path meaning "write to stdout".
pub const STDOUT: &str = "-";

/// Map an output path to its destination.
#[must_use]
pub fn destination(path: &Path) -> Destination {
    if path.as_os_str() == STDOUT {
        Destination::Stdout
    } else {
        Destination::File(path.to_owned())
    }
}

/// Write `bytes` to `dest`.
///
/// # Errors
/// Writing stdout or replacing the output file failed.
pub fn emit(dest: &Destination, bytes: &[u8]) -> Result<()> {
    match dest {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("write merged output to stdout")?;
            stdout.flush().context("flush stdout")?;
        }
        Destination::File(path) => {
            write_atomic(path, bytes)
                .with_context(|| format!("write merged output to {}", path.display()))?;
        }
    }
    Ok(())
}

/// Refuse to replace a file that was read as input.
///
/// # Errors
/// `dest` is one of `inputs`.
pub fn ensure_not_input(dest: &Destination, inputs: &[PathBuf]) -> Result<()> {
    let Destination::File(out) = dest else {
        return Ok(());
    };
    let Ok(out) = std::fs::canonicalize(out) else {
        // Nothing there yet, so it cannot be an input.
        return Ok(());
    };
    for input in inputs {
        if std::fs::canonicalize(input).is_ok_and(|p| p == out) {
            bail!(
                "refusing to overwrite input file {}\n  To fix: choose a different output with -o",
                input.display()
            );
        }
    }
    Ok(())
}
