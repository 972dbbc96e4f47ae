//! Resolve command: final times and places for one results file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use lt_core::{ColoradoScb, Heat, MeetProgram, NameMode, format_name, format_time};

use super::util::read_results;
use crate::Config;

pub fn run<W: Write>(
    writer: &mut W,
    results: &Path,
    start_list: Option<&Path>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let (_, mut heat) = read_results(results)?;

    if let Some(dir) = start_list.or(config.start_list_dir.as_deref()) {
        merge_start_list(&mut heat, dir)?;
    }
    heat.resolve_times(config.resolver().as_ref());

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&heat)?)?;
    } else {
        write!(writer, "{}", format_table(&heat, config))?;
    }
    Ok(())
}

/// Takes swimmer names and the description from the matching start list.
fn merge_start_list(heat: &mut Heat, dir: &Path) -> Result<()> {
    let (Some(event), Some(number)) = (heat.event(), heat.heat()) else {
        tracing::debug!("results carry no event or heat, skipping start list");
        return Ok(());
    };
    let info = ColoradoScb
        .find(dir, event, number)
        .with_context(|| format!("failed to read start list in {}", dir.display()))?;
    match info {
        Some(info) => heat.merge(Some(&info), None),
        None => tracing::debug!(dir = %dir.display(), "no start list for this heat"),
    }
    Ok(())
}

fn row(lane: &str, name: &str, width: usize, team: &str, time: &str, place: &str) -> String {
    let line = format!("{lane:>4}  {name:<width$}  {team:<16}  {time:>8}  {place}");
    line.trim_end().to_string()
}

/// The longest form of the name that fits in `width` characters.
fn fit_name(mode: NameMode, name: &str, width: usize) -> String {
    format_name(mode, name)
        .into_iter()
        .find(|variant| variant.chars().count() <= width)
        .unwrap_or_default()
}

fn format_table(heat: &Heat, config: &Config) -> String {
    let mut lines = vec![
        format!(
            "Event {}, Heat {}",
            heat.event().unwrap_or("-"),
            heat.heat().map_or_else(|| "-".to_string(), |h| h.to_string())
        ),
        row("Lane", "Name", config.name_width, "Team", "Final", "Place"),
    ];
    for (number, lane) in heat.lane_numbers().zip(heat.lanes()) {
        let time = if lane.is_dq() {
            "DQ".to_string()
        } else {
            format_time(lane.final_time())
        };
        let place = heat
            .place(number)
            .ok()
            .flatten()
            .map(|p| p.to_string())
            .unwrap_or_default();
        lines.push(row(
            &number.to_string(),
            &fit_name(config.name_mode, lane.name(), config.name_width),
            config.name_width,
            lane.team(),
            &time,
            &place,
        ));
    }
    let mut table = lines.join("\n");
    table.push('\n');
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use lt_core::ResolverKind;

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

    fn start_list(dir: &Path) {
        let mut lines = vec!["#57 GIRLS 11-12 50 BACK".to_string()];
        lines.extend((0..10).map(|i| {
            let (name, team) = if i == 3 {
                ("SWIMMER, SALLY M", "DOLPHINS")
            } else {
                ("", "")
            };
            format!("{name:<20}--{team:<16}")
        }));
        std::fs::write(dir.join("E057.scb"), lines.join("\n")).unwrap();
    }

    fn resolve(start_list: Option<&Path>, json: bool, config: &Config) -> String {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("007-057-001A-0012.do4");
        std::fs::write(&path, RESULTS).unwrap();
        let mut output = Vec::new();
        run(&mut output, &path, start_list, json, config).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_resolve_table() {
        let output = resolve(None, false, &Config::default());
        assert_snapshot!(output, @r"
        Event 57, Heat 1
        Lane  Name                  Team                 Final  Place
           1
           2                                             54.98  4
           3                                             40.03  2
           4                                             39.71  1
           5                                             49.90  3
           6
           7
           8
           9
          10
        ");
    }

    #[test]
    fn test_resolve_with_start_list_names() {
        let lists = tempfile::tempdir().unwrap();
        start_list(lists.path());
        let config = Config {
            name_mode: NameMode::FirstLast,
            ..Config::default()
        };
        let output = resolve(Some(lists.path()), false, &config);
        let lane4 = output.lines().nth(5).unwrap();
        assert_eq!(
            lane4,
            "   4  SALLY SWIMMER         DOLPHINS             39.71  1"
        );
    }

    #[test]
    fn test_resolve_shortens_names_to_width() {
        let lists = tempfile::tempdir().unwrap();
        start_list(lists.path());
        let config = Config {
            name_mode: NameMode::FirstLast,
            name_width: 10,
            ..Config::default()
        };
        let output = resolve(Some(lists.path()), false, &config);
        let mut lines = output.lines();
        assert_eq!(
            lines.nth(1).unwrap(),
            "Lane  Name        Team                 Final  Place"
        );
        assert_eq!(
            lines.nth(3).unwrap(),
            "   4  SALLY S     DOLPHINS             39.71  1"
        );
    }

    #[test]
    fn test_fit_name() {
        let name = "SWIMMER, SALLY M";
        assert_eq!(fit_name(NameMode::None, name, 20), "SWIMMER, SALLY M");
        assert_eq!(fit_name(NameMode::None, name, 14), "SWIMMER, SALLY");
        assert_eq!(fit_name(NameMode::None, name, 10), "SWIMMER, S");
        assert_eq!(fit_name(NameMode::Last, name, 4), "SWIM");
        assert_eq!(fit_name(NameMode::First, name, 0), "");
    }

    #[test]
    fn test_resolve_uses_configured_start_list_dir() {
        let lists = tempfile::tempdir().unwrap();
        start_list(lists.path());
        let config = Config {
            start_list_dir: Some(lists.path().to_path_buf()),
            ..Config::default()
        };
        let output = resolve(None, true, &config);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["description"], "GIRLS 11-12 50 BACK");
        assert_eq!(value["lanes"][3]["name"], "SWIMMER, SALLY M");
        assert_eq!(value["lanes"][3]["final_time"], "39.71");
    }

    #[test]
    fn test_resolve_missing_start_list_is_ignored() {
        let lists = tempfile::tempdir().unwrap();
        let output = resolve(Some(lists.path()), false, &Config::default());
        assert!(output.starts_with("Event 57, Heat 1\n"));
    }

    #[test]
    fn test_resolve_with_simple_resolver() {
        let config = Config {
            resolver: ResolverKind::Simple,
            min_times: 3,
            ..Config::default()
        };
        let output = resolve(None, true, &config);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(value["lanes"][0]["final_time"].is_null());
        assert_eq!(value["lanes"][3]["final_time"], "39.71");
    }
}
