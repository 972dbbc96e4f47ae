//! Timing-system file formats.
//!
//! Every results format implements [`TimingSystem`]: `decode`/`encode`
//! convert between raw file bytes and a [`Heat`], and `read`/`write` add the
//! file system, recovering whatever the format keeps in its file name (meet
//! id, race number) and the file's modification time. All formats are
//! Windows-1252 text; encoding writes CRLF line endings and decoding
//! accepts either CRLF or LF.

pub mod colorado_scb;
pub mod cp1252;
pub mod dolphin_csv;
pub mod dolphin_do4;
pub mod generic;

use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};
use regex::RegexBuilder;

use crate::error::{CodecError, FormatError};
use crate::heat::Heat;
use crate::time::Time;

pub use colorado_scb::ColoradoScb;
pub use dolphin_csv::DolphinCsv;
pub use dolphin_do4::DolphinDo4;
pub use generic::Generic;

pub const LINE_ENDING: &str = "\r\n";

/// A timing system's results file format.
pub trait TimingSystem: Send + Sync {
    /// Short identifier, e.g. `"do4"`.
    fn name(&self) -> &'static str;

    /// Human-readable name of the timing system.
    fn description(&self) -> &'static str;

    fn decode(&self, data: &[u8]) -> Result<Heat, FormatError>;

    fn encode(&self, heat: &Heat) -> Vec<u8>;

    /// Reads and decodes a file.
    ///
    /// Formats that keep identity fields in the file name override this to
    /// fill them in.
    fn read(&self, path: &Path) -> Result<Heat, CodecError> {
        let data = read_file(path)?;
        self.decode(&data).map_err(|e| CodecError::format(path, e))
    }

    fn write(&self, path: &Path, heat: &Heat) -> Result<(), CodecError> {
        std::fs::write(path, self.encode(heat)).map_err(|e| CodecError::io(path, e))
    }

    /// File name this heat would be saved under, or `None` when the heat
    /// lacks an identity field the name needs.
    fn filename(&self, heat: &Heat) -> Option<String>;

    /// Glob patterns matching this format's file names.
    fn patterns(&self) -> &'static [&'static str];
}

static TIMING_SYSTEMS: [&dyn TimingSystem; 3] = [&DolphinDo4, &DolphinCsv, &Generic];

/// All supported results formats.
pub fn timing_systems() -> &'static [&'static dyn TimingSystem] {
    &TIMING_SYSTEMS
}

/// Looks up a results format by its short name.
pub fn by_name(name: &str) -> Option<&'static dyn TimingSystem> {
    timing_systems()
        .iter()
        .copied()
        .find(|system| system.name().eq_ignore_ascii_case(name))
}

/// Picks the results format whose patterns match the file name.
pub fn detect(path: &Path) -> Option<&'static dyn TimingSystem> {
    let name = file_name(path);
    timing_systems()
        .iter()
        .copied()
        .find(|system| matches_any(system.patterns(), name))
}

/// Case-insensitive match of a file name against glob patterns.
///
/// Patterns support `*` (any run of characters) and `?` (one character).
pub fn matches_any(patterns: &[&str], name: &str) -> bool {
    patterns.iter().any(|pattern| {
        RegexBuilder::new(&glob_to_regex(pattern))
            .case_insensitive(true)
            .build()
            .is_ok_and(|re| re.is_match(name))
    })
}

fn glob_to_regex(pattern: &str) -> String {
    let mut re = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            _ => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    re.push('$');
    re
}

pub(crate) fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, CodecError> {
    std::fs::read(path).map_err(|e| CodecError::io(path, e))
}

/// Local modification time of a file, if the platform reports one.
pub(crate) fn modified(path: &Path) -> Option<NaiveDateTime> {
    let mtime = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(mtime).naive_local())
}

/// Decodes Windows-1252 bytes and splits them into lines.
pub(crate) fn decode_lines(data: &[u8]) -> Result<Vec<String>, FormatError> {
    let text = cp1252::decode(data)?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Joins lines with CRLF and encodes them as Windows-1252.
pub(crate) fn encode_lines(lines: &[String]) -> Vec<u8> {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push_str(LINE_ENDING);
    }
    cp1252::encode(&text)
}

/// Formats an optional reading; absent readings are empty.
pub(crate) fn reading(time: Option<Time>) -> String {
    time.map(|t| t.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        let detected = |name: &str| detect(Path::new(name)).map(|s| s.name());
        assert_eq!(detected("/meets/001-002-003A-0004.do4"), Some("do4"));
        assert_eq!(detected("001-002-003A-0004.DO4"), Some("do4"));
        assert_eq!(
            detected("005_Event_12_Heat_3_Race_42_6_1_2025_14_5.csv"),
            Some("csv")
        );
        assert_eq!(detected("073-032-41F0432.gen"), Some("generic"));
        assert_eq!(detected("073-032-41F0432.ge2"), Some("generic"));
        assert_eq!(detected("E001.scb"), None);
        assert_eq!(detected("results.csv"), None);
    }

    #[test]
    fn test_matches_any() {
        assert!(matches_any(&["*.scb"], "E001.SCB"));
        assert!(matches_any(&["E???.scb"], "E012.scb"));
        assert!(!matches_any(&["*.scb"], "E001.scb.bak"));
        assert!(!matches_any(&["*.do4"], "results+do4"));
        assert!(!matches_any(&[], "E001.scb"));
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("DO4").map(|s| s.name()), Some("do4"));
        assert!(by_name("hytek").is_none());
        assert_eq!(timing_systems().len(), 3);
    }

    #[test]
    fn test_line_endings() {
        let lines = decode_lines(b"a\r\nb\nc").unwrap();
        assert_eq!(lines, ["a", "b", "c"]);
        assert_eq!(encode_lines(&["a".to_string(), "b".to_string()]), b"a\r\nb\r\n");
    }
}
