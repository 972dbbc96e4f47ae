//! Colorado Time Systems start lists (`E###.scb`).
//!
//! One file per event. The first line is `#<event> <description>`, followed
//! by ten fixed-width lines per heat: a 20 character name, a literal `--`
//! and a 16 character team, space padded.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

use super::{decode_lines, encode_lines, file_name, matches_any, read_file};
use crate::error::{CodecError, FormatError};
use crate::heat::{Heat, NUM_LANES};
use crate::lane::Lane;
use crate::program::{FullProgram, MeetProgram};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#(\w+)\s+(.*)$").unwrap());
static LANE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.{20})--(.{16})$").unwrap());

const NAME_WIDTH: usize = 20;
const TEAM_WIDTH: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct ColoradoScb;

impl ColoradoScb {
    /// Parses a start list file into its heats, numbered from 1.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<Heat>, FormatError> {
        let lines = decode_lines(data)?;
        let Some((header, body)) = lines.split_first() else {
            return Err(FormatError::Header {
                line: String::new(),
            });
        };
        let caps = HEADER_RE.captures(header).ok_or_else(|| FormatError::Header {
            line: header.clone(),
        })?;
        if body.len() % NUM_LANES != 0 {
            return Err(FormatError::LineCount {
                expected: format!("a multiple of {NUM_LANES}"),
                actual: body.len(),
            });
        }

        let mut heats = Vec::with_capacity(body.len() / NUM_LANES);
        for (index, block) in body.chunks(NUM_LANES).enumerate() {
            let lanes = block
                .iter()
                .enumerate()
                .map(|(offset, line)| {
                    let caps = LANE_RE.captures(line).ok_or_else(|| FormatError::Line {
                        line: index * NUM_LANES + offset + 2,
                        content: line.clone(),
                    })?;
                    Ok(Lane::builder()
                        .name(caps[1].trim())
                        .team(caps[2].trim())
                        .build()?)
                })
                .collect::<Result<Vec<_>, FormatError>>()?;
            let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
            heats.push(
                Heat::builder()
                    .event(&caps[1])
                    .description(&caps[2])
                    .heat(number)
                    .lanes(lanes)
                    .build()?,
            );
        }
        debug!(event = &caps[1], heats = heats.len(), "decoded scb");
        Ok(heats)
    }

    /// Writes a start list. Names and teams longer than their columns are cut.
    pub fn encode(&self, startlist: &[Heat]) -> Result<Vec<u8>, FormatError> {
        if !crate::startlist::is_valid(startlist) {
            return Err(FormatError::InvalidStartList);
        }
        let first = &startlist[0];
        let mut lines = vec![format!(
            "#{} {}",
            first.event().unwrap_or_default(),
            first.description().unwrap_or_default()
        )];
        for heat in startlist {
            for lane in heat.lanes() {
                lines.push(format!(
                    "{:<NAME_WIDTH$.NAME_WIDTH$}--{:<TEAM_WIDTH$.TEAM_WIDTH$}",
                    lane.name(),
                    lane.team()
                ));
            }
        }
        Ok(encode_lines(&lines))
    }

    pub fn read(&self, path: &Path) -> Result<Vec<Heat>, CodecError> {
        let data = read_file(path)?;
        self.decode(&data).map_err(|e| CodecError::format(path, e))
    }

    /// `E###.scb`. Only purely numeric events have a file name.
    pub fn filename(&self, startlist: &[Heat]) -> Option<String> {
        let first = startlist.first()?;
        if first.event_alpha() != Some("") {
            return None;
        }
        Some(format!("E{:03}.scb", first.event_num()?))
    }
}

impl MeetProgram for ColoradoScb {
    /// Alphanumeric events and missing files or heats yield `None`.
    fn find(&self, dir: &Path, event: &str, heat: u32) -> Result<Option<Heat>, CodecError> {
        let Ok(number) = event.parse::<u32>() else {
            return Ok(None);
        };
        let heats = match self.read(&dir.join(format!("E{number:03}.scb"))) {
            Ok(heats) => heats,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let index = usize::try_from(heat).ok().and_then(|h| h.checked_sub(1));
        Ok(index.and_then(|i| heats.into_iter().nth(i)))
    }

    /// Start lists that fail to parse are logged and left out.
    fn full_program(&self, dir: &Path) -> Result<FullProgram, CodecError> {
        let entries = std::fs::read_dir(dir).map_err(|e| CodecError::io(dir, e))?;
        let paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && matches_any(self.patterns(), file_name(path)))
            .collect();

        let program = paths
            .par_iter()
            .filter_map(|path| match self.read(path) {
                Ok(heats) => {
                    let event = heats.first()?.event()?.to_string();
                    Some((event, heats))
                }
                // Deleted since the directory was listed.
                Err(e) if e.is_not_found() => None,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping invalid start list");
                    None
                }
            })
            .collect();
        Ok(program)
    }

    /// One `E###.scb` per event into the directory `path`.
    ///
    /// Events without a numeric event number are skipped.
    fn write(&self, path: &Path, program: &FullProgram) -> Result<(), CodecError> {
        std::fs::create_dir_all(path).map_err(|e| CodecError::io(path, e))?;
        for (event, heats) in program {
            let Some(name) = self.filename(heats) else {
                warn!(event, "start list format needs a numeric event, skipping");
                continue;
            };
            let target = path.join(name);
            let data = self
                .encode(heats)
                .map_err(|e| CodecError::format(&target, e))?;
            std::fs::write(&target, data).map_err(|e| CodecError::io(&target, e))?;
        }
        Ok(())
    }

    fn patterns(&self) -> &'static [&'static str] {
        &["*.scb"]
    }
}
