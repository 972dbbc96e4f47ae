//! The generic multi-vendor results interchange format (`.gen`).
//!
//! ```text
//! 21;3;4;F;110;Timer Name;1.0.0.0
//! 7;32.18;77.87;95.67;126.83;126.99;127.01;126.77;+0.78;;;
//! ...
//! 0;;;;;;;;;;;
//! ```
//!
//! The header is `event;heat;splits;round;file_version;creator;creator_version`.
//! Twelve lane lines follow, of which the first ten are used. Each holds the
//! place (`Q` for a disqualification), one time per split, three backup
//! times and four reaction time fields.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{TimingSystem, decode_lines, encode_lines, file_name, modified, read_file, reading};
use crate::error::{CodecError, FormatError};
use crate::heat::{Heat, NUM_LANES, Round};
use crate::lane::{Lane, MAX_READINGS};
use crate::time::{Time, combine_times};

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\w*);(\d+);(\d+);(\w);.*;.*;.*$").unwrap());
static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-\d+(\w|-)\d+\w(\d+)\.").unwrap());

/// Lane lines in every file, including the two unused ones.
const LINES: usize = 12;
const REACTION_FIELDS: usize = 4;
const FILE_VERSION: u32 = 100;
const CREATOR: &str = "lt";

#[derive(Debug, Clone, Copy, Default)]
pub struct Generic;

fn parse_field(text: &str) -> Result<Option<Time>, FormatError> {
    if text.is_empty() {
        Ok(None)
    } else {
        text.parse().map(Some)
    }
}

/// One combined time per split, padded to `count`.
fn combined_splits(lane: &Lane, count: usize) -> Vec<Option<Time>> {
    let mut combined: Vec<Option<Time>> = lane
        .splits()
        .unwrap_or_default()
        .iter()
        .map(|group| combine_times(group))
        .collect();
    combined.resize(count, None);
    combined
}

/// Round letter as the format writes it; timed finals are finals.
fn round_letter(heat: &Heat) -> char {
    match heat.round() {
        None | Some(Round::All) => 'F',
        Some(round) => round.letter(),
    }
}

impl TimingSystem for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn description(&self) -> &'static str {
        "Generic timing system interchange (.gen)"
    }

    fn decode(&self, data: &[u8]) -> Result<Heat, FormatError> {
        let lines = decode_lines(data)?;
        let Some((header, body)) = lines.split_first() else {
            return Err(FormatError::Header {
                line: String::new(),
            });
        };
        let bad_header = || FormatError::Header {
            line: header.clone(),
        };
        let caps = HEADER_RE.captures(header).ok_or_else(bad_header)?;
        let heat_number: u32 = caps[2].parse().map_err(|_| bad_header())?;
        let num_splits: usize = caps[3].parse().map_err(|_| bad_header())?;
        let round = match &caps[4] {
            "P" => Round::Prelim,
            "S" => Round::Semi,
            "A" => Round::All,
            _ => Round::Final,
        };

        if body.len() != LINES {
            return Err(FormatError::LineCount {
                expected: LINES.to_string(),
                actual: body.len(),
            });
        }

        let expected = num_splits
            .checked_add(MAX_READINGS + REACTION_FIELDS + 1)
            .ok_or_else(bad_header)?;
        let mut lanes = Vec::with_capacity(NUM_LANES);
        for (index, line) in body.iter().take(NUM_LANES).enumerate() {
            let fields: Vec<&str> = line.split(';').collect();
            if fields.len() != expected {
                return Err(FormatError::FieldCount {
                    line: index + 2,
                    expected,
                    actual: fields.len(),
                });
            }
            let splits = fields[1..=num_splits]
                .iter()
                .map(|field| parse_field(field).map(|time| vec![time]))
                .collect::<Result<Vec<_>, _>>()?;
            let backups = fields[num_splits + 1..=num_splits + MAX_READINGS]
                .iter()
                .map(|field| parse_field(field))
                .collect::<Result<Vec<_>, _>>()?;
            lanes.push(
                Lane::builder()
                    .dq(fields[0] == "Q")
                    .splits(Some(splits))
                    .backups(Some(backups))
                    .build()?,
            );
        }

        let heat = Heat::builder()
            .event(&caps[1])
            .heat(heat_number)
            .round(round)
            .lanes(lanes)
            .build()?;
        debug!(event = ?heat.event(), heat = ?heat.heat(), "decoded generic");
        Ok(heat)
    }

    /// Lanes without a final time are placed by their slowest split.
    fn encode(&self, heat: &Heat) -> Vec<u8> {
        let num_splits = heat
            .lanes()
            .map(|lane| lane.splits().map_or(1, |splits| splits.len().max(1)))
            .max()
            .unwrap_or(1);

        let mut scored = heat.clone();
        for number in heat.lane_numbers() {
            let Ok(lane) = scored.lane_mut(number) else {
                continue;
            };
            if lane.final_time().is_none() {
                let slowest = combined_splits(lane, num_splits).into_iter().flatten().max();
                lane.set_resolved_time(slowest);
            }
        }

        let mut lines = vec![format!(
            "{};{};{num_splits};{};{FILE_VERSION};{CREATOR};{}",
            heat.event().unwrap_or("1"),
            heat.heat().unwrap_or(1),
            round_letter(heat),
            env!("CARGO_PKG_VERSION"),
        )];
        for (number, lane) in scored.lane_numbers().zip(scored.lanes()) {
            let place = if lane.is_dq() {
                "Q".to_string()
            } else {
                scored
                    .place(number)
                    .ok()
                    .flatten()
                    .map_or_else(|| "0".to_string(), |place| place.to_string())
            };
            let mut backups = lane.backups().unwrap_or_default().to_vec();
            backups.resize(MAX_READINGS, None);

            let mut fields = vec![place];
            fields.extend(combined_splits(lane, num_splits).into_iter().map(reading));
            fields.extend(backups.into_iter().map(reading));
            fields.extend(std::iter::repeat_n(String::new(), REACTION_FIELDS));
            lines.push(fields.join(";"));
        }
        for _ in NUM_LANES..LINES {
            lines.push(format!("0{}", ";".repeat(num_splits + MAX_READINGS + REACTION_FIELDS)));
        }
        encode_lines(&lines)
    }

    /// Fills in the meet id and race number from a name like
    /// `073-032A41P0432.gen`, plus the file's modification time.
    fn read(&self, path: &Path) -> Result<Heat, CodecError> {
        let data = read_file(path)?;
        let mut heat = self.decode(&data).map_err(|e| CodecError::format(path, e))?;

        let (meet, race) = FILENAME_RE
            .captures(file_name(path))
            .map_or((None, None), |caps| {
                (caps[1].parse::<u32>().ok(), caps[3].parse::<u32>().ok())
            });
        heat.set_meet_id(Some(
            meet.map_or_else(|| "001".to_string(), |meet| meet.to_string()),
        ));
        heat.set_race(Some(race.filter(|&r| r > 0).unwrap_or(1)))?;
        heat.set_time_recorded(modified(path));
        Ok(heat)
    }

    /// `DDD-EEE[L|-]HHRNNNN.gen`, with each number wrapped to its width.
    fn filename(&self, heat: &Heat) -> Option<String> {
        let meet = match heat.meet_id() {
            None => 1,
            Some(meet) => meet.parse::<u32>().ok()?,
        };
        let event = heat.event_num().unwrap_or(1);
        let letter = heat.event_alpha().filter(|alpha| !alpha.is_empty()).unwrap_or("-");
        Some(format!(
            "{:03}-{:03}{letter}{:02}{}{:04}.gen",
            meet % 1000,
            event % 1000,
            heat.heat().unwrap_or(1) % 100,
            round_letter(heat),
            heat.race().unwrap_or(1) % 10000,
        ))
    }

    fn patterns(&self) -> &'static [&'static str] {
        &["*.gen", "*.ge2"]
    }
}
