//! Program command: the Dolphin event list for a directory of start lists.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use lt_core::{ColoradoScb, DolphinEvent, MeetProgram};

pub fn run<W: Write>(writer: &mut W, start_list_dir: &Path, output: Option<&Path>) -> Result<()> {
    let program = ColoradoScb
        .full_program(start_list_dir)
        .with_context(|| format!("failed to read start lists in {}", start_list_dir.display()))?;
    tracing::debug!(events = program.len(), "loaded meet program");

    match output {
        Some(path) => {
            DolphinEvent
                .write(path, &program)
                .with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(writer, "Wrote {} events to {}", program.len(), path.display())?;
        }
        None => {
            for line in DolphinEvent::to_csv(&program) {
                writeln!(writer, "{line}")?;
            }
        }
    }
    Ok(())
}
