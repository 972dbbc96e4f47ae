//! Shared utilities for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use lt_core::codec::{self, TimingSystem};
use lt_core::{ColoradoScb, Heat, MeetProgram};

/// Whether the file name looks like a start list rather than results.
pub fn is_start_list(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    codec::matches_any(ColoradoScb.patterns(), name)
}

/// Picks the results format for a file from its name.
pub fn detect_format(path: &Path) -> Result<&'static dyn TimingSystem> {
    codec::detect(path).with_context(|| {
        let known: Vec<&str> = codec::timing_systems()
            .iter()
            .flat_map(|system| system.patterns().iter().copied())
            .collect();
        format!(
            "unrecognized results file {} (expected one of {})",
            path.display(),
            known.join(", ")
        )
    })
}

/// Reads a results file with whichever format its name matches.
pub fn read_results(path: &Path) -> Result<(&'static dyn TimingSystem, Heat)> {
    let system = detect_format(path)?;
    let heat = system
        .read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    tracing::debug!(format = system.name(), path = %path.display(), "read results");
    Ok((system, heat))
}
