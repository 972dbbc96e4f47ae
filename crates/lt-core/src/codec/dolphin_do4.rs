//! Colorado Dolphin wireless stopwatch results (`.do4`).
//!
//! ```text
//! 69;1;1;All
//! Lane1;143.37;143.37;143.39
//! ...
//! Lane10;0;0;0
//! 731146ABD1866BB3
//! ```
//!
//! The header is `event;heat;splits;round`. Each lane then has one line per
//! split distance holding up to three watch readings, and a checksum line
//! ends the file. Blank or zero readings were not recorded. The last split
//! of a lane is the full race distance, so its readings are the backups.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{TimingSystem, decode_lines, encode_lines, file_name, modified, read_file, reading};
use crate::error::{CodecError, FormatError};
use crate::heat::{Heat, NUM_LANES, Numbering, Round};
use crate::lane::{Lane, MAX_READINGS};
use crate::time::Time;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*);(\d+);(\d+);(\w+)$").unwrap());
static LANE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Lane(\d+);([\d.]*);([\d.]*);([\d.]*)$").unwrap());
static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-\d+-\d+\w-(\d+)\.").unwrap());

/// The checksum algorithm is unknown, so written files carry a placeholder.
const CHECKSUM_PLACEHOLDER: &str = "FFFFFFFFFFFFFFFF";

#[derive(Debug, Clone, Copy, Default)]
pub struct DolphinDo4;

fn parse_reading(text: &str) -> Result<Option<Time>, FormatError> {
    if text.is_empty() {
        return Ok(None);
    }
    let time: Time = text.parse()?;
    Ok((!time.is_zero()).then_some(time))
}

/// Number of split lines each lane gets when encoding.
fn split_count(lane: &Lane) -> usize {
    lane.splits().map_or(1, |splits| splits.len().max(1))
}

/// Exactly `count` reading groups for a lane. A lane without splits writes
/// its backups as the final distance.
fn lane_groups(lane: &Lane, count: usize) -> Vec<Vec<Option<Time>>> {
    let mut groups = match (lane.splits(), lane.backups()) {
        (Some(splits), _) if !splits.is_empty() => splits.to_vec(),
        (_, Some(backups)) => {
            let mut groups = vec![Vec::new(); count.saturating_sub(1)];
            groups.push(backups.to_vec());
            groups
        }
        _ => Vec::new(),
    };
    groups.resize(count, Vec::new());
    groups
}

impl TimingSystem for DolphinDo4 {
    fn name(&self) -> &'static str {
        "do4"
    }

    fn description(&self) -> &'static str {
        "Colorado Dolphin (.do4)"
    }

    fn decode(&self, data: &[u8]) -> Result<Heat, FormatError> {
        let lines = decode_lines(data)?;
        let Some((header, body)) = lines.split_first() else {
            return Err(FormatError::Header {
                line: String::new(),
            });
        };
        let caps = HEADER_RE.captures(header).ok_or_else(|| FormatError::Header {
            line: header.clone(),
        })?;
        let bad_header = || FormatError::Header {
            line: header.clone(),
        };
        let heat_number: u32 = caps[2].parse().map_err(|_| bad_header())?;
        let num_splits: usize = caps[3].parse().map_err(|_| bad_header())?;
        let round = match &caps[4] {
            "Prelim" => Round::Prelim,
            "Final" => Round::Final,
            _ => Round::All,
        };

        let expected = num_splits
            .checked_mul(NUM_LANES)
            .and_then(|lines| lines.checked_add(1))
            .ok_or_else(bad_header)?;
        if body.len() != expected {
            return Err(FormatError::LineCount {
                expected: expected.to_string(),
                actual: body.len(),
            });
        }

        let mut splits: Vec<Vec<Vec<Option<Time>>>> = vec![Vec::new(); NUM_LANES];
        let mut first_lane = None;
        // The final line is the checksum.
        for (index, line) in body[..body.len() - 1].iter().enumerate() {
            let bad_line = || FormatError::Line {
                line: index + 2,
                content: line.clone(),
            };
            let caps = LANE_RE.captures(line).ok_or_else(bad_line)?;
            let lane_number: usize = caps[1].parse().map_err(|_| bad_line())?;
            let first = *first_lane.get_or_insert(lane_number.min(1));
            let slot = lane_number
                .checked_sub(first)
                .filter(|&slot| slot < NUM_LANES)
                .ok_or_else(bad_line)?;
            let group = (2..=4)
                .map(|i| parse_reading(&caps[i]))
                .collect::<Result<Vec<_>, _>>()?;
            splits[slot].push(group);
        }

        let lanes = splits
            .into_iter()
            .map(|groups| {
                Lane::builder()
                    .backups(groups.last().cloned())
                    .splits(Some(groups))
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = Heat::builder()
            .heat(heat_number)
            .round(round)
            .numbering(if first_lane == Some(0) {
                Numbering::ZeroToNine
            } else {
                Numbering::OneToTen
            })
            .lanes(lanes);
        if !caps[1].is_empty() {
            builder = builder.event(&caps[1]);
        }
        let heat = builder.build()?;
        debug!(event = ?heat.event(), heat = ?heat.heat(), "decoded do4");
        Ok(heat)
    }

    fn encode(&self, heat: &Heat) -> Vec<u8> {
        let num_splits = heat.lanes().map(split_count).max().unwrap_or(1);
        let round = match heat.round() {
            Some(Round::Prelim) => "Prelim",
            Some(Round::Final) => "Final",
            _ => "A",
        };

        let mut lines = vec![format!(
            "{};{};{num_splits};{round}",
            heat.event().unwrap_or_default(),
            heat.heat().unwrap_or(1)
        )];
        for (number, lane) in heat.lane_numbers().zip(heat.lanes()) {
            for mut group in lane_groups(lane, num_splits) {
                group.resize(MAX_READINGS, None);
                if group.iter().all(Option::is_none) {
                    lines.push(format!("Lane{number};0;0;0"));
                } else {
                    let readings: Vec<String> = group.into_iter().map(reading).collect();
                    lines.push(format!("Lane{number};{}", readings.join(";")));
                }
            }
        }
        lines.push(CHECKSUM_PLACEHOLDER.to_string());
        encode_lines(&lines)
    }

    /// Fills in the meet id and race number from a name like
    /// `001-002-003A-0004.do4`, plus the file's modification time.
    fn read(&self, path: &Path) -> Result<Heat, CodecError> {
        let data = read_file(path)?;
        let mut heat = self.decode(&data).map_err(|e| CodecError::format(path, e))?;

        let (meet_id, race) = FILENAME_RE
            .captures(file_name(path))
            .map_or((None, None), |caps| (Some(caps[1].to_string()), caps[2].parse().ok()));
        heat.set_meet_id(Some(meet_id.unwrap_or_else(|| "???".to_string())));
        heat.set_race(Some(race.filter(|&r| r > 0).unwrap_or(1)))?;
        heat.set_time_recorded(modified(path));
        Ok(heat)
    }

    /// `MMM-EEE-HHHR-NNNN.do4`; a missing event is written as 0.
    fn filename(&self, heat: &Heat) -> Option<String> {
        let meet: u32 = heat.meet_id()?.parse().ok()?;
        let event: u32 = match heat.event() {
            None | Some("") => 0,
            Some(event) => event.parse().ok()?,
        };
        let round = heat.round().unwrap_or(Round::All);
        Some(format!(
            "{meet:03}-{event:03}-{:03}{round}-{:04}.do4",
            heat.heat()?,
            heat.race()?
        ))
    }

    fn patterns(&self) -> &'static [&'static str] {
        &["*.do4"]
    }
}
