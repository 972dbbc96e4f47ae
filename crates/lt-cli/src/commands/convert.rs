//! Convert command: rewrite a results file in another format.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use lt_core::codec;

use super::util::read_results;

/// Returns the path written.
pub fn run<W: Write>(
    writer: &mut W,
    input: &Path,
    to: &str,
    out_dir: Option<&Path>,
) -> Result<PathBuf> {
    let Some(target) = codec::by_name(to) else {
        let names: Vec<&str> = codec::timing_systems().iter().map(|s| s.name()).collect();
        bail!("unknown format {to:?}, expected one of: {}", names.join(", "));
    };
    let (source, heat) = read_results(input)?;

    let name = target.filename(&heat).with_context(|| {
        format!(
            "{} has no meet, event, heat or race number to name a {} file with",
            input.display(),
            target.name()
        )
    })?;
    let dir = out_dir
        .or_else(|| input.parent())
        .unwrap_or_else(|| Path::new("."));
    let path = dir.join(name);
    target
        .write(&path, &heat)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::debug!(from = source.name(), to = target.name(), "converted");
    writeln!(writer, "Wrote {}", path.display())?;
    Ok(path)
}
