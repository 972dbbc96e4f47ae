//! Per-lane swimmer information and race readings.

use serde::Serialize;

use crate::error::ValidationError;
use crate::time::{ResolvedTime, Time};

/// Backup readings per lane, and readings per split distance, top out at three.
pub const MAX_READINGS: usize = 3;

/// One competitor's slot within a heat.
///
/// Swimmer fields (name, team, seed time, age) come from a start list; race
/// fields (primary, backups, splits, flags) come from the timing system.
/// `None` for `backups` or `splits` means the source doesn't record them at
/// all, which is different from a list of absent readings.
///
/// Lanes are built through [`LaneBuilder`] so that an invalid lane never
/// exists: every recorded time is non-negative, reading groups hold at most
/// three entries, and a lane with no swimmer and no readings is marked empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lane {
    name: String,
    team: String,
    seed_time: Option<ResolvedTime>,
    age: u32,
    primary: Option<Time>,
    backups: Option<Vec<Option<Time>>>,
    splits: Option<Vec<Vec<Option<Time>>>>,
    final_time: Option<Time>,
    is_dq: bool,
    is_empty: bool,
}

impl Default for Lane {
    /// A blank lane, which is always marked empty.
    fn default() -> Self {
        Self {
            name: String::new(),
            team: String::new(),
            seed_time: None,
            age: 0,
            primary: None,
            backups: None,
            splits: None,
            final_time: None,
            is_dq: false,
            is_empty: true,
        }
    }
}

impl Lane {
    pub fn builder() -> LaneBuilder {
        LaneBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub const fn seed_time(&self) -> Option<ResolvedTime> {
        self.seed_time
    }

    /// Swimmer age, 0 when unknown.
    pub const fn age(&self) -> u32 {
        self.age
    }

    pub const fn primary(&self) -> Option<Time> {
        self.primary
    }

    pub fn backups(&self) -> Option<&[Option<Time>]> {
        self.backups.as_deref()
    }

    /// Cumulative split readings; the last group is the full race distance.
    pub fn splits(&self) -> Option<&[Vec<Option<Time>>]> {
        self.splits.as_deref()
    }

    /// Resolved final time, set only by a resolver.
    pub const fn final_time(&self) -> Option<Time> {
        self.final_time
    }

    pub const fn is_dq(&self) -> bool {
        self.is_dq
    }

    pub const fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn set_final_time(&mut self, time: Option<Time>) -> Result<(), ValidationError> {
        check_time("final time", time)?;
        self.final_time = time;
        Ok(())
    }

    /// Stores a final time derived from this lane's own readings, which
    /// the builder has already checked.
    pub(crate) const fn set_resolved_time(&mut self, time: Option<Time>) {
        self.final_time = time;
    }

    /// True when neither the primary device, a backup nor any split recorded anything.
    pub fn is_noshow(&self) -> bool {
        self.primary.is_none()
            && self.backups.iter().flatten().all(Option::is_none)
            && self.splits.iter().flatten().flatten().all(Option::is_none)
    }

    /// Overlays another lane's data onto this one.
    ///
    /// `info` replaces name, team, seed time and age. `results` replaces the
    /// readings, the final time and both flags. Either may be `None`.
    pub fn merge(&mut self, info: Option<&Self>, results: Option<&Self>) {
        if let Some(info) = info {
            self.name.clone_from(&info.name);
            self.team.clone_from(&info.team);
            self.seed_time = info.seed_time;
            self.age = info.age;
        }
        if let Some(results) = results {
            self.primary = results.primary;
            self.backups.clone_from(&results.backups);
            self.splits.clone_from(&results.splits);
            self.final_time = results.final_time;
            self.is_dq = results.is_dq;
            self.is_empty = results.is_empty;
        }
        self.is_empty |= self.is_blank();
    }

    /// Equality on every field that both lanes actually carry.
    ///
    /// Empty strings, a zero age and absent optional fields on either side
    /// are skipped, so a lane decoded from a format that doesn't store a
    /// field still matches the lane that was encoded.
    pub fn is_similar_to(&self, other: &Self) -> bool {
        fn text(a: &str, b: &str) -> bool {
            a.is_empty() || b.is_empty() || a == b
        }
        fn opt<T: PartialEq>(a: Option<&T>, b: Option<&T>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
        }

        text(&self.name, &other.name)
            && text(&self.team, &other.team)
            && opt(self.seed_time.as_ref(), other.seed_time.as_ref())
            && (self.age == 0 || other.age == 0 || self.age == other.age)
            && opt(self.primary.as_ref(), other.primary.as_ref())
            && opt(self.backups.as_ref(), other.backups.as_ref())
            && opt(self.splits.as_ref(), other.splits.as_ref())
            && opt(self.final_time.as_ref(), other.final_time.as_ref())
            && self.is_dq == other.is_dq
            && self.is_empty == other.is_empty
    }

    fn is_blank(&self) -> bool {
        let unset = |t: &Option<Time>| t.is_none_or(Time::is_zero);
        self.name.is_empty()
            && self.team.is_empty()
            && unset(&self.primary)
            && unset(&self.final_time)
            && self.backups.iter().flatten().all(unset)
            && self.splits.iter().flatten().flatten().all(unset)
    }
}

fn check_time(field: &'static str, time: Option<Time>) -> Result<(), ValidationError> {
    match time {
        Some(t) if t.is_negative() => Err(ValidationError::NegativeTime { field }),
        _ => Ok(()),
    }
}

/// Validating constructor for [`Lane`].
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct LaneBuilder {
    name: String,
    team: String,
    seed_time: Option<ResolvedTime>,
    age: u32,
    primary: Option<Time>,
    backups: Option<Vec<Option<Time>>>,
    splits: Option<Vec<Vec<Option<Time>>>>,
    final_time: Option<Time>,
    is_dq: bool,
    is_empty: bool,
}

impl LaneBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    pub const fn seed_time(mut self, seed_time: Option<ResolvedTime>) -> Self {
        self.seed_time = seed_time;
        self
    }

    pub const fn age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    pub const fn primary(mut self, primary: Option<Time>) -> Self {
        self.primary = primary;
        self
    }

    pub fn backups(mut self, backups: Option<Vec<Option<Time>>>) -> Self {
        self.backups = backups;
        self
    }

    pub fn splits(mut self, splits: Option<Vec<Vec<Option<Time>>>>) -> Self {
        self.splits = splits;
        self
    }

    pub const fn final_time(mut self, final_time: Option<Time>) -> Self {
        self.final_time = final_time;
        self
    }

    pub const fn dq(mut self, is_dq: bool) -> Self {
        self.is_dq = is_dq;
        self
    }

    pub const fn empty(mut self, is_empty: bool) -> Self {
        self.is_empty = is_empty;
        self
    }

    pub fn build(self) -> Result<Lane, ValidationError> {
        match self.seed_time {
            None | Some(ResolvedTime::NoTime) => {}
            Some(ResolvedTime::Time(t)) if !t.is_negative() => {}
            Some(other) => {
                return Err(ValidationError::InvalidSeedTime {
                    value: other.to_string(),
                });
            }
        }
        check_time("primary time", self.primary)?;
        check_time("final time", self.final_time)?;

        if let Some(backups) = &self.backups {
            if backups.len() > MAX_READINGS {
                return Err(ValidationError::TooManyReadings {
                    field: "backups",
                    count: backups.len(),
                });
            }
            for &backup in backups {
                check_time("backup time", backup)?;
            }
        }
        for group in self.splits.iter().flatten() {
            if group.len() > MAX_READINGS {
                return Err(ValidationError::TooManyReadings {
                    field: "split group",
                    count: group.len(),
                });
            }
            for &split in group {
                check_time("split time", split)?;
            }
        }

        let mut lane = Lane {
            name: self.name,
            team: self.team,
            seed_time: self.seed_time,
            age: self.age,
            primary: self.primary,
            backups: self.backups,
            splits: self.splits,
            final_time: self.final_time,
            is_dq: self.is_dq,
            is_empty: self.is_empty,
        };
        lane.is_empty |= lane.is_blank();
        Ok(lane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Time {
        s.parse().unwrap()
    }

    fn full_lane(name: &str, base: i64) -> Lane {
        Lane::builder()
            .name(name)
            .team(format!("{name} Team"))
            .seed_time(Some(ResolvedTime::Time(Time::from_seconds(base))))
            .age(7)
            .primary(Some(Time::from_seconds(base + 50)))
            .backups(Some(vec![Some(Time::from_seconds(base + 1)), None]))
            .splits(Some(vec![vec![Some(Time::from_seconds(base + 14))]]))
            .final_time(Some(Time::from_seconds(base + 51)))
            .dq(true)
            .build()
            .unwrap()
    }

    // ========== Validation Tests ==========

    #[test]
    fn test_negative_times_rejected() {
        let neg = Some(t("-1.0"));
        assert!(Lane::builder().primary(neg).build().is_err());
        assert!(Lane::builder().final_time(neg).build().is_err());
        assert!(Lane::builder().backups(Some(vec![neg])).build().is_err());
        assert!(Lane::builder().splits(Some(vec![vec![neg]])).build().is_err());
        assert_eq!(
            Lane::builder()
                .seed_time(Some(ResolvedTime::Time(t("-1"))))
                .build()
                .unwrap_err(),
            ValidationError::InvalidSeedTime {
                value: "-1.00".to_string()
            }
        );
    }

    #[test]
    fn test_seed_time_markers() {
        assert!(
            Lane::builder()
                .seed_time(Some(ResolvedTime::NoTime))
                .build()
                .is_ok()
        );
        assert!(
            Lane::builder()
                .seed_time(Some(ResolvedTime::Disqualified))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_too_many_readings() {
        let four = vec![Some(t("1")); 4];
        assert_eq!(
            Lane::builder().backups(Some(four.clone())).build().unwrap_err(),
            ValidationError::TooManyReadings {
                field: "backups",
                count: 4
            }
        );
        assert!(Lane::builder().splits(Some(vec![four])).build().is_err());
    }

    #[test]
    fn test_set_final_time_validates() {
        let mut lane = Lane::default();
        assert!(lane.set_final_time(Some(t("-0.01"))).is_err());
        lane.set_final_time(Some(t("30.00"))).unwrap();
        assert_eq!(lane.final_time(), Some(t("30.00")));
    }

    #[test]
    fn test_set_resolved_time() {
        let mut lane = Lane::default();
        lane.set_resolved_time(Some(t("30.00")));
        assert_eq!(lane.final_time(), Some(t("30.00")));
        lane.set_resolved_time(None);
        assert_eq!(lane.final_time(), None);
    }

    // ========== Empty / No-show Tests ==========

    #[test]
    fn test_blank_lane_is_empty() {
        assert!(Lane::default().is_empty());
        assert!(Lane::builder().build().unwrap().is_empty());
        let zeros = Lane::builder()
            .backups(Some(vec![Some(Time::ZERO), None]))
            .build()
            .unwrap();
        assert!(zeros.is_empty());
        assert!(!Lane::builder().name("Alice").build().unwrap().is_empty());
        assert!(!Lane::builder().primary(Some(t("30"))).build().unwrap().is_empty());
    }

    #[test]
    fn test_is_noshow() {
        assert!(Lane::default().is_noshow());
        assert!(
            Lane::builder()
                .backups(Some(vec![None, None]))
                .splits(Some(vec![vec![None]]))
                .build()
                .unwrap()
                .is_noshow()
        );
        assert!(
            !Lane::builder()
                .splits(Some(vec![vec![None, Some(t("30"))]]))
                .build()
                .unwrap()
                .is_noshow()
        );
    }

    // ========== Merge Tests ==========

    #[test]
    fn test_merge_info() {
        let mut lane1 = full_lane("Alice", 1);
        let lane2 = full_lane("Bob", 2);
        lane1.merge(Some(&lane2), None);

        assert_eq!(lane1.name(), "Bob");
        assert_eq!(lane1.team(), "Bob Team");
        assert_eq!(lane1.seed_time(), Some(ResolvedTime::Time(t("2"))));
        assert_eq!(lane1.primary(), Some(t("51")));
        assert_eq!(lane1.final_time(), Some(t("52")));
        assert_eq!(lane1.splits(), Some(&[vec![Some(t("15"))]][..]));
        assert!(lane1.is_dq());
    }

    #[test]
    fn test_merge_results() {
        let mut lane1 = full_lane("Alice", 1);
        let lane2 = Lane::builder()
            .primary(Some(t("64.32")))
            .final_time(Some(t("64.54")))
            .build()
            .unwrap();
        lane1.merge(None, Some(&lane2));

        assert_eq!(lane1.name(), "Alice");
        assert_eq!(lane1.age(), 7);
        assert_eq!(lane1.primary(), Some(t("64.32")));
        assert_eq!(lane1.final_time(), Some(t("64.54")));
        assert_eq!(lane1.backups(), None);
        assert_eq!(lane1.splits(), None);
        assert!(!lane1.is_dq());
        assert!(!lane1.is_empty());
    }

    // ========== Similarity Tests ==========

    #[test]
    fn test_empty_lanes_are_similar() {
        assert!(Lane::default().is_similar_to(&Lane::default()));
    }

    #[test]
    fn test_similar_ignores_missing_fields() {
        let lane1 = full_lane("A", 1);
        let mut lane2 = full_lane("A", 1);
        assert!(lane1.is_similar_to(&lane2));

        lane2.name = "C".to_string();
        assert!(!lane1.is_similar_to(&lane2));
        assert!(!lane2.is_similar_to(&lane1));

        lane2.name = String::new();
        lane2.age = 0;
        lane2.seed_time = None;
        assert!(lane1.is_similar_to(&lane2));
        assert!(lane2.is_similar_to(&lane1));
    }

    #[test]
    fn test_similar_compares_reading_lists() {
        let with = |backups: Option<Vec<Option<Time>>>| {
            Lane::builder()
                .name("X")
                .backups(backups)
                .build()
                .unwrap()
        };
        let lane1 = with(Some(vec![Some(t("1")), Some(t("2")), Some(t("3"))]));

        assert!(lane1.is_similar_to(&with(Some(vec![Some(t("1")), Some(t("2")), Some(t("3"))]))));
        assert!(!lane1.is_similar_to(&with(Some(vec![Some(t("1")), Some(t("2")), Some(t("4"))]))));
        assert!(!lane1.is_similar_to(&with(Some(vec![Some(t("1")), Some(t("2"))]))));
        assert!(!lane1.is_similar_to(&with(Some(vec![]))));
        assert!(lane1.is_similar_to(&with(None)));
    }
}
