//! Inspect command: decode a file and show what it holds.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use lt_core::ColoradoScb;

use super::util::{is_start_list, read_results};

pub fn run<W: Write>(writer: &mut W, file: &Path, json: bool) -> Result<()> {
    let heats = if is_start_list(file) {
        ColoradoScb
            .read(file)
            .with_context(|| format!("failed to read {}", file.display()))?
    } else {
        vec![read_results(file)?.1]
    };

    if json {
        let output = if let [heat] = heats.as_slice() {
            serde_json::to_string_pretty(heat)?
        } else {
            serde_json::to_string_pretty(&heats)?
        };
        writeln!(writer, "{output}")?;
        return Ok(());
    }

    for (index, heat) in heats.iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        write!(writer, "{}", heat.to_text())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = "\
57;1;1;All
Lane1;;55.92;
Lane2;54.86;55.18;54.98
Lane3;40.03;40.05;39.96
Lane4;39.71;39.68;39.75
Lane5;50.01;49.88;49.90
Lane6;0;0;0
Lane7;0;0;0
Lane8;0;0;0
Lane9;0;0;0
Lane10;0;0;0
9EF6F5121A02D2D5";

    fn inspect(name: &str, contents: &str, json: bool) -> String {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(name);
        std::fs::write(&path, contents).unwrap();
        let mut output = Vec::new();
        run(&mut output, &path, json).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_inspect_results_text() {
        let output = inspect("007-057-001A-0012.do4", RESULTS, false);
        let head: Vec<&str> = output.lines().take(11).collect();
        assert_eq!(head[0], "Event: 57");
        assert_eq!(head[3], "Meet ID: 007");
        assert_eq!(head[4], "Race #: 12");
        assert_eq!(head[6], "Round: A");
        assert_eq!(head[7], "Numbering: 1-10");
        assert_eq!(head[8], "Lane 1:");
        assert_eq!(output.matches("Lane ").count(), 10);
    }

    #[test]
    fn test_inspect_results_json() {
        let output = inspect("007-057-001A-0012.do4", RESULTS, true);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["event"], "57");
        assert_eq!(value["race"], 12);
        assert_eq!(value["lanes"].as_array().unwrap().len(), 10);
        assert_eq!(value["lanes"][1]["backups"][0], "54.86");
    }

    #[test]
    fn test_inspect_start_list() {
        let mut lines = vec!["#5 GIRLS 9-10 50 FREE".to_string()];
        lines.extend((0..20).map(|i| {
            let name = if i == 3 { "SWIMMER, SALLY" } else { "" };
            format!("{name:<20}--{:<16}", "")
        }));
        let contents = lines.join("\n");

        let output = inspect("E005.scb", &contents, false);
        assert_eq!(output.matches("Event: 5\n").count(), 2);
        assert!(output.contains("Heat: 2\n"));
        assert!(output.contains("N: SWIMMER, SALLY"));

        let output = inspect("E005.scb", &contents, true);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["description"], "GIRLS 9-10 50 FREE");
    }

    #[test]
    fn test_inspect_unknown_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("results.txt");
        std::fs::write(&path, RESULTS).unwrap();
        let mut output = Vec::new();
        assert!(run(&mut output, &path, false).is_err());
    }
}
