//! A heat: ten lanes plus the identity of the race they swam in.

use std::fmt;
use std::fmt::Write as _;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::ValidationError;
use crate::lane::Lane;
use crate::resolver::TimeResolver;
use crate::time::Time;

/// Every heat carries exactly this many lanes.
pub const NUM_LANES: usize = 10;

static EVENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)([A-Z]*)$").unwrap());

/// Competition phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Round {
    /// Timed final; no separate prelims.
    All,
    Prelim,
    Semi,
    Final,
}

impl Round {
    pub const fn letter(self) -> char {
        match self {
            Self::All => 'A',
            Self::Prelim => 'P',
            Self::Semi => 'S',
            Self::Final => 'F',
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.letter())
    }
}

impl FromStr for Round {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::All),
            "P" => Ok(Self::Prelim),
            "S" => Ok(Self::Semi),
            "F" => Ok(Self::Final),
            other => Err(format!("unknown round: {other}")),
        }
    }
}

impl Serialize for Round {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How lane numbers map onto the ten stored lanes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Numbering {
    /// Lanes 1 through 10.
    #[default]
    OneToTen,
    /// Lanes 0 through 9.
    ZeroToNine,
}

impl Numbering {
    pub const fn range(self) -> RangeInclusive<u32> {
        match self {
            Self::OneToTen => 1..=10,
            Self::ZeroToNine => 0..=9,
        }
    }

    /// Storage index for a lane number.
    fn index(self, lane: u32) -> Option<usize> {
        if !self.range().contains(&lane) {
            return None;
        }
        let first = *self.range().start();
        usize::try_from(lane - first).ok()
    }
}

impl fmt::Display for Numbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneToTen => f.write_str("1-10"),
            Self::ZeroToNine => f.write_str("0-9"),
        }
    }
}

impl Serialize for Numbering {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One race within an event.
///
/// Used both for start-list information and for timing results; `merge`
/// combines the two into one view. Optional fields are `None` when the
/// source doesn't carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heat {
    event: Option<String>,
    heat: Option<u32>,
    description: Option<String>,
    meet_id: Option<String>,
    race: Option<u32>,
    time_recorded: Option<NaiveDateTime>,
    round: Option<Round>,
    numbering: Numbering,
    lanes: Vec<Lane>,
}

impl Default for Heat {
    fn default() -> Self {
        Self {
            event: None,
            heat: None,
            description: None,
            meet_id: None,
            race: None,
            time_recorded: None,
            round: None,
            numbering: Numbering::default(),
            lanes: vec![Lane::default(); NUM_LANES],
        }
    }
}

fn positive(field: &'static str, value: Option<u32>) -> Result<Option<u32>, ValidationError> {
    match value {
        Some(0) => Err(ValidationError::NonPositive { field, value: 0 }),
        other => Ok(other),
    }
}

impl Heat {
    pub fn builder() -> HeatBuilder {
        HeatBuilder::default()
    }

    /// Event number, uppercased. A string so that `"5S"` or `"12Z"` fit.
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub const fn heat(&self) -> Option<u32> {
        self.heat
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn meet_id(&self) -> Option<&str> {
        self.meet_id.as_deref()
    }

    pub const fn race(&self) -> Option<u32> {
        self.race
    }

    pub const fn time_recorded(&self) -> Option<NaiveDateTime> {
        self.time_recorded
    }

    pub const fn round(&self) -> Option<Round> {
        self.round
    }

    pub const fn numbering(&self) -> Numbering {
        self.numbering
    }

    pub fn set_event(&mut self, event: Option<&str>) {
        self.event = event.map(str::to_uppercase);
    }

    pub fn set_heat(&mut self, heat: Option<u32>) -> Result<(), ValidationError> {
        self.heat = positive("heat", heat)?;
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_meet_id(&mut self, meet_id: Option<String>) {
        self.meet_id = meet_id;
    }

    pub fn set_race(&mut self, race: Option<u32>) -> Result<(), ValidationError> {
        self.race = positive("race", race)?;
        Ok(())
    }

    pub const fn set_time_recorded(&mut self, time_recorded: Option<NaiveDateTime>) {
        self.time_recorded = time_recorded;
    }

    pub const fn set_round(&mut self, round: Option<Round>) {
        self.round = round;
    }

    pub const fn set_numbering(&mut self, numbering: Numbering) {
        self.numbering = numbering;
    }

    /// Numeric part of the event, e.g. 12 for `"12Z"`.
    pub fn event_num(&self) -> Option<u32> {
        let caps = EVENT_RE.captures(self.event.as_deref()?)?;
        caps[1].parse().ok()
    }

    /// Letter suffix of the event, e.g. `"Z"` for `"12Z"` and `""` for `"12"`.
    pub fn event_alpha(&self) -> Option<&str> {
        let caps = EVENT_RE.captures(self.event.as_deref()?)?;
        caps.get(2).map(|m| m.as_str())
    }

    /// Lane numbers valid under this heat's numbering.
    pub const fn lane_numbers(&self) -> RangeInclusive<u32> {
        self.numbering.range()
    }

    pub fn lane(&self, number: u32) -> Result<&Lane, ValidationError> {
        let index = self.lane_index(number)?;
        Ok(&self.lanes[index])
    }

    pub fn lane_mut(&mut self, number: u32) -> Result<&mut Lane, ValidationError> {
        let index = self.lane_index(number)?;
        Ok(&mut self.lanes[index])
    }

    /// All ten lanes in storage order.
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter()
    }

    fn lane_index(&self, number: u32) -> Result<usize, ValidationError> {
        self.numbering
            .index(number)
            .ok_or_else(|| ValidationError::LaneOutOfRange {
                lane: number,
                numbering: self.numbering.to_string(),
            })
    }

    /// Finishing place of a lane, ignoring disqualified swimmers.
    pub fn place(&self, number: u32) -> Result<Option<u32>, ValidationError> {
        self.place_with(number, false)
    }

    /// Finishing place of a lane.
    ///
    /// Standard competition ranking over lanes that have a final time and are
    /// neither empty nor (unless `ignore_dq`) disqualified: one more than the
    /// number of strictly faster lanes, so tied lanes share a place. Lanes
    /// without a usable time have no place.
    pub fn place_with(&self, number: u32, ignore_dq: bool) -> Result<Option<u32>, ValidationError> {
        let usable = |lane: &Lane| -> Option<Time> {
            if lane.is_empty() || (lane.is_dq() && !ignore_dq) {
                None
            } else {
                lane.final_time()
            }
        };

        let Some(time) = usable(self.lane(number)?) else {
            return Ok(None);
        };
        let faster = self
            .lanes
            .iter()
            .filter_map(usable)
            .filter(|&other| other < time)
            .count();
        Ok(Some(u32::try_from(faster).unwrap_or(u32::MAX - 1) + 1))
    }

    /// Runs `resolver` over every lane.
    pub fn resolve_times<R: TimeResolver + ?Sized>(&mut self, resolver: &R) {
        for lane in &mut self.lanes {
            resolver.resolve(lane);
        }
    }

    pub fn has_names(&self) -> bool {
        self.lanes.iter().any(|lane| !lane.name().is_empty())
    }

    /// Overlays start-list info and/or timing results onto this heat.
    ///
    /// `info` replaces event, heat and description, and each lane's swimmer
    /// fields. `results` replaces meet id, race, recorded time, round and
    /// numbering, and each lane's readings and flags. Lanes pair up by
    /// position.
    pub fn merge(&mut self, info: Option<&Self>, results: Option<&Self>) {
        if let Some(info) = info {
            self.event.clone_from(&info.event);
            self.heat = info.heat;
            self.description.clone_from(&info.description);
        }
        if let Some(results) = results {
            self.meet_id.clone_from(&results.meet_id);
            self.race = results.race;
            self.time_recorded = results.time_recorded;
            self.round = results.round;
            self.numbering = results.numbering;
        }
        for (index, lane) in self.lanes.iter_mut().enumerate() {
            lane.merge(
                info.map(|h| &h.lanes[index]),
                results.map(|h| &h.lanes[index]),
            );
        }
    }

    /// Compares every field carried by both heats; see [`Lane::is_similar_to`].
    pub fn is_similar_to(&self, other: &Self) -> bool {
        fn opt<T: PartialEq>(a: Option<&T>, b: Option<&T>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
        }

        opt(self.event.as_ref(), other.event.as_ref())
            && opt(self.heat.as_ref(), other.heat.as_ref())
            && opt(self.description.as_ref(), other.description.as_ref())
            && opt(self.meet_id.as_ref(), other.meet_id.as_ref())
            && opt(self.race.as_ref(), other.race.as_ref())
            && opt(self.time_recorded.as_ref(), other.time_recorded.as_ref())
            && opt(self.round.as_ref(), other.round.as_ref())
            && self
                .lanes
                .iter()
                .zip(&other.lanes)
                .all(|(a, b)| a.is_similar_to(b))
    }

    /// Sort key: event number, then letter suffix, then heat.
    ///
    /// Events that aren't a number with an optional suffix sort after all
    /// that are, by uppercase text. Missing events sort first and a missing
    /// heat counts as 0.
    pub fn order_key(&self) -> HeatOrderKey {
        HeatOrderKey {
            event: EventKey::new(self.event.as_deref().unwrap_or_default()),
            heat: self.heat.unwrap_or(0),
        }
    }

    /// Multi-line human-readable dump.
    pub fn to_text(&self) -> String {
        fn or_none(value: Option<impl fmt::Display>) -> String {
            value.map_or_else(|| "-None-".to_string(), |v| v.to_string())
        }
        fn or_none_str(value: &str) -> &str {
            if value.is_empty() { "-None-" } else { value }
        }
        fn reading(time: Option<Time>) -> String {
            time.map_or_else(|| "-".to_string(), |t| t.to_string())
        }

        let mut out = String::new();
        let _ = writeln!(out, "Event: {}", or_none(self.event.as_deref()));
        let _ = writeln!(out, "Description: {}", or_none(self.description.as_deref()));
        let _ = writeln!(out, "Heat: {}", or_none(self.heat));
        let _ = writeln!(out, "Meet ID: {}", or_none(self.meet_id.as_deref()));
        let _ = writeln!(out, "Race #: {}", or_none(self.race));
        let _ = writeln!(
            out,
            "Time Recorded: {}",
            or_none(self.time_recorded.map(|t| t.format("%Y-%m-%d %H:%M:%S")))
        );
        let _ = writeln!(out, "Round: {}", or_none(self.round));
        let _ = writeln!(out, "Numbering: {}", self.numbering);
        for (number, lane) in self.lane_numbers().zip(&self.lanes) {
            let _ = writeln!(out, "Lane {number}:");
            let _ = writeln!(
                out,
                "  N: {}  T: {}  A: {}  S: {}",
                or_none_str(lane.name()),
                or_none_str(lane.team()),
                or_none((lane.age() > 0).then_some(lane.age())),
                or_none(lane.seed_time()),
            );
            let _ = writeln!(
                out,
                "  P: {}  F: {}  DQ: {}  E: {}",
                or_none(lane.primary()),
                or_none(lane.final_time()),
                lane.is_dq(),
                lane.is_empty(),
            );
            if let Some(backups) = lane.backups() {
                let joined: Vec<String> = backups.iter().map(|&b| reading(b)).collect();
                let _ = writeln!(out, "  Backups: {}", joined.join(", "));
            }
            if let Some(splits) = lane.splits() {
                let groups: Vec<String> = splits
                    .iter()
                    .map(|group| {
                        group
                            .iter()
                            .map(|&s| reading(s))
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .collect();
                let _ = writeln!(out, "  Splits: {}", groups.join("; "));
            }
        }
        out
    }
}

/// Ordering key for heats within a meet program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeatOrderKey {
    event: EventKey,
    heat: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum EventKey {
    Blank,
    Numbered {
        number: u64,
        suffix: String,
        full: String,
    },
    Other(String),
}

impl EventKey {
    fn new(event: &str) -> Self {
        if event.is_empty() {
            return Self::Blank;
        }
        let upper = event.to_uppercase();
        let numbered = EVENT_RE.captures(&upper).and_then(|caps| {
            let number = caps[1].parse().ok()?;
            Some((number, caps[2].to_string()))
        });
        match numbered {
            Some((number, suffix)) => Self::Numbered {
                number,
                suffix,
                full: upper,
            },
            None => Self::Other(upper),
        }
    }
}

/// Validating constructor for [`Heat`].
///
/// Pads the lane list to ten, uppercases the event and rejects zero heat or
/// race numbers.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct HeatBuilder {
    event: Option<String>,
    heat: Option<u32>,
    description: Option<String>,
    meet_id: Option<String>,
    race: Option<u32>,
    time_recorded: Option<NaiveDateTime>,
    round: Option<Round>,
    numbering: Numbering,
    lanes: Vec<Lane>,
}

impl HeatBuilder {
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub const fn heat(mut self, heat: u32) -> Self {
        self.heat = Some(heat);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn meet_id(mut self, meet_id: impl Into<String>) -> Self {
        self.meet_id = Some(meet_id.into());
        self
    }

    pub const fn race(mut self, race: u32) -> Self {
        self.race = Some(race);
        self
    }

    pub const fn time_recorded(mut self, time_recorded: NaiveDateTime) -> Self {
        self.time_recorded = Some(time_recorded);
        self
    }

    pub const fn round(mut self, round: Round) -> Self {
        self.round = Some(round);
        self
    }

    pub const fn numbering(mut self, numbering: Numbering) -> Self {
        self.numbering = numbering;
        self
    }

    pub fn lanes(mut self, lanes: Vec<Lane>) -> Self {
        self.lanes = lanes;
        self
    }

    pub fn build(self) -> Result<Heat, ValidationError> {
        let mut lanes = self.lanes;
        if lanes.len() > NUM_LANES {
            return Err(ValidationError::TooManyLanes { count: lanes.len() });
        }
        lanes.resize_with(NUM_LANES, Lane::default);

        Ok(Heat {
            event: self.event.map(|e| e.to_uppercase()),
            heat: positive("heat", self.heat)?,
            description: self.description,
            meet_id: self.meet_id,
            race: positive("race", self.race)?,
            time_recorded: self.time_recorded,
            round: self.round,
            numbering: self.numbering,
            lanes,
        })
    }
}
