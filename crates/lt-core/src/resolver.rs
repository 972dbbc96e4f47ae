//! Resolution of redundant timer readings into one final time.
//!
//! A lane may carry a primary (touchpad) time, up to three backup readings
//! from plungers or stopwatches, and split readings. A resolver decides which
//! of these to trust and writes the result into [`Lane::final_time`].
//!
//! Two policies exist:
//!
//! - [`StandardResolver`] trusts the primary when at least one backup agrees
//!   with it, and otherwise synthesizes a time from the backups only if
//!   every backup agrees with the synthesized value.
//! - [`SimpleResolver`] only looks at a flat set of readings and reports why
//!   it couldn't produce a time ([`ResolvedTime::NoShow`] or
//!   [`ResolvedTime::Inconsistent`]).
//!
//! They disagree on details (the floor below which readings are ignored,
//! and whether the candidate is truncated before the agreement check), so
//! callers pick one explicitly.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::lane::Lane;
use crate::time::{MIN_VALID_TIME, ResolvedTime, Time, combine_times, median};

/// Anything that can fill in a lane's final time.
///
/// Implemented by both resolvers and by any `Fn(&mut Lane)` closure.
pub trait TimeResolver {
    fn resolve(&self, lane: &mut Lane);
}

impl<F> TimeResolver for F
where
    F: Fn(&mut Lane),
{
    fn resolve(&self, lane: &mut Lane) {
        self(lane);
    }
}

/// Which resolver policy to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    #[default]
    Standard,
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Support {
    Any,
    All,
}

/// Whether `candidate` lies within `threshold` of any/all of `times`.
fn is_supported_by(candidate: Time, times: &[Time], threshold: Time, by: Support) -> bool {
    let close = |t: &Time| candidate.distance(*t) <= threshold;
    match by {
        Support::Any => times.iter().any(close),
        Support::All => times.iter().all(close),
    }
}

/// Primary-first resolution with backup corroboration.
///
/// 1. Readings below `min_valid_time` are treated as not recorded.
/// 2. A valid primary within `threshold` of at least one valid backup wins.
/// 3. Otherwise, with at least `min_times` valid backups, their combined
///    time (see [`combine_times`]) wins if every backup is within
///    `threshold` of it.
/// 4. Otherwise the lane has no final time.
///
/// Raw readings are never modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardResolver {
    min_times: usize,
    threshold: Time,
    min_valid_time: Time,
}

impl StandardResolver {
    pub const fn new(min_times: usize, threshold: Time) -> Self {
        Self {
            min_times,
            threshold,
            min_valid_time: MIN_VALID_TIME,
        }
    }

    /// Overrides the 10.00s noise floor.
    #[must_use]
    pub const fn with_min_valid_time(mut self, min_valid_time: Time) -> Self {
        self.min_valid_time = min_valid_time;
        self
    }

    /// Computes the final time without touching the lane.
    pub fn final_time(&self, lane: &Lane) -> Option<Time> {
        let valid = |t: &Option<Time>| t.filter(|t| *t >= self.min_valid_time);
        let backups: Vec<Time> = lane.backups()?.iter().filter_map(valid).collect();

        if let Some(primary) = valid(&lane.primary()) {
            if is_supported_by(primary, &backups, self.threshold, Support::Any) {
                trace!(%primary, "primary supported by a backup");
                return Some(primary);
            }
        }

        if backups.len() < self.min_times {
            trace!(count = backups.len(), "too few valid backups");
            return None;
        }
        let present: Vec<Option<Time>> = backups.iter().copied().map(Some).collect();
        let candidate = combine_times(&present)?;
        if is_supported_by(candidate, &backups, self.threshold, Support::All) {
            trace!(%candidate, "backups agree");
            Some(candidate)
        } else {
            trace!(%candidate, "backups disagree");
            None
        }
    }
}

impl TimeResolver for StandardResolver {
    fn resolve(&self, lane: &mut Lane) {
        let time = self.final_time(lane);
        lane.set_resolved_time(time);
    }
}

/// Resolution over a flat set of readings, with a reason when it fails.
///
/// Readings of zero are ignored. No readings gives
/// [`ResolvedTime::NoShow`]; fewer than `min_times` gives
/// [`ResolvedTime::Inconsistent`]. Otherwise the candidate is the median
/// (mean of the middle two for even counts), and any reading more than
/// `threshold` from the untruncated candidate makes the result
/// inconsistent. A consistent candidate is truncated to hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleResolver {
    min_times: usize,
    threshold: Time,
}

impl SimpleResolver {
    pub const fn new(min_times: usize, threshold: Time) -> Self {
        Self {
            min_times,
            threshold,
        }
    }

    pub fn resolve_times(&self, times: &[Time]) -> ResolvedTime {
        let real: Vec<Time> = times.iter().copied().filter(|t| *t > Time::ZERO).collect();
        if real.is_empty() {
            return ResolvedTime::NoShow;
        }
        if real.len() < self.min_times {
            return ResolvedTime::Inconsistent;
        }
        let Some(candidate) = median(&real) else {
            return ResolvedTime::NoShow;
        };
        if is_supported_by(candidate, &real, self.threshold, Support::All) {
            ResolvedTime::Time(candidate.truncate())
        } else {
            ResolvedTime::Inconsistent
        }
    }
}

impl TimeResolver for SimpleResolver {
    /// Resolves the lane's backup readings; special results leave no final time.
    fn resolve(&self, lane: &mut Lane) {
        let readings: Vec<Time> = lane
            .backups()
            .unwrap_or_default()
            .iter()
            .flatten()
            .copied()
            .collect();
        let resolved = self.resolve_times(&readings);
        trace!(%resolved, "simple resolution");
        lane.set_resolved_time(resolved.time());
    }
}
