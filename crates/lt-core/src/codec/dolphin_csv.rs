//! Colorado Dolphin CSV results export.
//!
//! ```text
//! Lane,Timer A,Timer B,Timer C,Final,Empty,DQ
//! 1,55.66,55.70,,55.68,False,False
//! ```
//!
//! Ten lane lines follow the header, sometimes with a trailing blank line.
//! Lanes are numbered 0-9 when the first line starts with `0`. The file
//! itself carries no event or heat; those live in the file name.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::debug;

use super::{TimingSystem, decode_lines, encode_lines, file_name, modified, read_file};
use crate::error::{CodecError, FormatError};
use crate::heat::{Heat, NUM_LANES, Numbering};
use crate::lane::{Lane, MAX_READINGS};
use crate::time::{Time, parse_time};

static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)_Event_(\d*)_Heat_(\d+)_Race_(\d+)_(\d+)_(\d+)_(\d+)_(\d+)_(\d+)\.csv$")
        .unwrap()
});

const HEADER: &str = "Lane,Timer A,Timer B,Timer C,Final,Empty,DQ";
const FIELDS: usize = 7;

#[derive(Debug, Clone, Copy, Default)]
pub struct DolphinCsv;

/// Final time written to the export when the lane has none of its own.
///
/// One reading is used as-is, two are averaged and truncated, and three or
/// more take the element at index `n / 2` of the sorted readings. For even
/// counts above two this differs from [`crate::time::combine_times`], which
/// averages the middle pair.
fn export_final(readings: &[Option<Time>]) -> Option<Time> {
    let mut valid: Vec<Time> = readings.iter().flatten().copied().collect();
    valid.sort_unstable();
    match valid.as_slice() {
        [] => None,
        [only] => Some(*only),
        [a, b] => Some(a.midpoint(*b).truncate()),
        many => Some(many[many.len() / 2]),
    }
}

fn csv_time(time: Option<Time>) -> String {
    time.filter(|t| !t.is_zero())
        .map(|t| t.to_string())
        .unwrap_or_default()
}

/// Month, day, year, hour and minute from capture groups 5 through 9.
fn filename_time(caps: &regex::Captures<'_>) -> Option<NaiveDateTime> {
    let number = |i: usize| caps[i].parse::<u32>().ok();
    NaiveDate::from_ymd_opt(caps[7].parse().ok()?, number(5)?, number(6)?)?
        .and_hms_opt(number(8)?, number(9)?, 0)
}

const fn flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn parse_flag(field: &str) -> bool {
    field.trim().to_lowercase().starts_with("true")
}

impl TimingSystem for DolphinCsv {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn description(&self) -> &'static str {
        "Colorado Dolphin (.csv)"
    }

    fn decode(&self, data: &[u8]) -> Result<Heat, FormatError> {
        let lines = decode_lines(data)?;
        let body = lines.get(1..).unwrap_or_default();
        if !(NUM_LANES..=NUM_LANES + 1).contains(&body.len()) {
            return Err(FormatError::LineCount {
                expected: "10 or 11".to_string(),
                actual: body.len(),
            });
        }
        let numbering = if body[0].starts_with('0') {
            Numbering::ZeroToNine
        } else {
            Numbering::OneToTen
        };
        let mut heat = Heat::builder().numbering(numbering).build()?;

        for (index, line) in body.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_number = index + 2;
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != FIELDS {
                return Err(FormatError::FieldCount {
                    line: line_number,
                    expected: FIELDS,
                    actual: fields.len(),
                });
            }
            let lane_number: u32 = fields[0].parse().map_err(|_| FormatError::Line {
                line: line_number,
                content: line.clone(),
            })?;
            let backups = fields[1..=3]
                .iter()
                .map(|f| parse_time(f))
                .collect::<Result<Vec<_>, _>>()?;
            let lane = Lane::builder()
                .backups(Some(backups))
                .empty(parse_flag(fields[5]))
                .dq(parse_flag(fields[6]))
                .build()?;
            *heat.lane_mut(lane_number)? = lane;
        }
        debug!(numbering = %heat.numbering(), "decoded dolphin csv");
        Ok(heat)
    }

    fn encode(&self, heat: &Heat) -> Vec<u8> {
        let mut lines = vec![HEADER.to_string()];
        for (number, lane) in heat.lane_numbers().zip(heat.lanes()) {
            let mut times = match (lane.backups(), lane.splits()) {
                (Some(backups), _) => backups.to_vec(),
                (None, Some(splits)) => splits.last().cloned().unwrap_or_default(),
                (None, None) => Vec::new(),
            };
            times.resize(times.len().max(MAX_READINGS), None);
            let final_time = lane
                .final_time()
                .or_else(|| lane.primary())
                .or_else(|| export_final(&times));
            lines.push(format!(
                "{number},{},{},{},{},{},{}",
                csv_time(times[0]),
                csv_time(times[1]),
                csv_time(times[2]),
                csv_time(final_time),
                flag(lane.is_empty()),
                flag(lane.is_dq()),
            ));
        }
        encode_lines(&lines)
    }

    /// Fills in meet, event, heat, race and recorded time from a name like
    /// `005_Event_12_Heat_3_Race_42_6_1_2025_14_5.csv`. Without a matching
    /// name the file's modification time is used.
    fn read(&self, path: &Path) -> Result<Heat, CodecError> {
        let data = read_file(path)?;
        let mut heat = self.decode(&data).map_err(|e| CodecError::format(path, e))?;

        let Some(caps) = FILENAME_RE.captures(file_name(path)) else {
            heat.set_time_recorded(modified(path));
            return Ok(heat);
        };
        let number = |i: usize| caps[i].parse::<u32>().ok();
        heat.set_meet_id(Some(caps[1].to_string()));
        heat.set_event(Some(&caps[2]).filter(|e| !e.is_empty()));
        heat.set_heat(number(3))?;
        heat.set_race(number(4))?;
        let recorded = filename_time(&caps).or_else(|| modified(path));
        heat.set_time_recorded(recorded);
        Ok(heat)
    }

    /// `MMM_Event_E_Heat_H_Race_R_month_day_year_hour_minute.csv`.
    fn filename(&self, heat: &Heat) -> Option<String> {
        let meet: u32 = heat.meet_id()?.parse().ok()?;
        let recorded = heat.time_recorded()?;
        Some(format!(
            "{meet:03}_Event_{}_Heat_{}_Race_{}_{}.csv",
            heat.event().unwrap_or_default(),
            heat.heat()?,
            heat.race()?,
            recorded.format("%-m_%-d_%Y_%-H_%-M"),
        ))
    }

    fn patterns(&self) -> &'static [&'static str] {
        &["*Event*Heat*Race*.csv"]
    }
}
