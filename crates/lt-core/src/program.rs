//! Meet programs: every event's start list at once.

use std::collections::BTreeMap;
use std::path::Path;

use crate::codec::encode_lines;
use crate::error::CodecError;
use crate::heat::Heat;

/// Event number to that event's heats, in heat order.
pub type FullProgram = BTreeMap<String, Vec<Heat>>;

/// A source or sink of meet program data.
///
/// Implementations provide whichever operations their format supports; the
/// rest return [`CodecError::Unsupported`].
pub trait MeetProgram: Send + Sync {
    /// Start-list information for one heat of an event, if the directory has it.
    fn find(&self, dir: &Path, event: &str, heat: u32) -> Result<Option<Heat>, CodecError> {
        let _ = (dir, event, heat);
        Err(CodecError::Unsupported { operation: "find" })
    }

    /// Every event found in a directory.
    fn full_program(&self, dir: &Path) -> Result<FullProgram, CodecError> {
        let _ = dir;
        Err(CodecError::Unsupported {
            operation: "full_program",
        })
    }

    /// Writes a program to a file or directory, depending on the format.
    fn write(&self, path: &Path, program: &FullProgram) -> Result<(), CodecError> {
        let _ = (path, program);
        Err(CodecError::Unsupported { operation: "write" })
    }

    /// Glob patterns matching this format's file names.
    fn patterns(&self) -> &'static [&'static str] {
        &[]
    }
}

/// The event list the Dolphin timing software imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct DolphinEvent;

impl DolphinEvent {
    /// One `event,description,heats,1,A` line per event, in program order.
    pub fn to_csv(program: &FullProgram) -> Vec<String> {
        let mut events: Vec<(&String, &Vec<Heat>)> = program
            .iter()
            .filter(|(_, heats)| !heats.is_empty())
            .collect();
        events.sort_by_cached_key(|(_, heats)| heats[0].order_key());
        events
            .into_iter()
            .map(|(event, heats)| {
                format!(
                    "{event},{},{},1,A",
                    heats[0].description().unwrap_or_default(),
                    heats.len()
                )
            })
            .collect()
    }
}

impl MeetProgram for DolphinEvent {
    fn write(&self, path: &Path, program: &FullProgram) -> Result<(), CodecError> {
        let data = encode_lines(&Self::to_csv(program));
        std::fs::write(path, data).map_err(|e| CodecError::io(path, e))
    }
}
