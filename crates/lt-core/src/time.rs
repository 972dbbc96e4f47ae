//! Fixed-point race times.
//!
//! A [`Time`] stores seconds as an integer count of ten-thousandths, so
//! hundredths arithmetic (sums, averages, truncation) is exact and never
//! drifts the way binary floats do. Timing files carry at most hundredths;
//! the two extra digits keep the result of averaging two readings exact
//! until it is explicitly truncated.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Ten-thousandths per second.
const SCALE: i64 = 10_000;

/// A time in seconds with exact decimal semantics.
///
/// Arithmetic saturates at the ends of the range instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(i64);

/// Readings below this are treated as sensor noise by the resolvers.
pub const MIN_VALID_TIME: Time = Time::from_hundredths(1000);

impl Time {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths.saturating_mul(100))
    }

    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds.saturating_mul(SCALE))
    }

    /// Whole hundredths, discarding anything finer.
    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0 / 100
    }

    /// Truncates to hundredths, dropping finer digits toward zero.
    ///
    /// `99.999` becomes `99.99` and `-2.127` becomes `-2.12`.
    #[must_use]
    pub const fn truncate(self) -> Self {
        Self(self.0 / 100 * 100)
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Exact midpoint of two times, before any truncation.
    #[must_use]
    pub const fn midpoint(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0) / 2)
    }

    /// Absolute difference between two times.
    #[must_use]
    pub const fn distance(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0).saturating_abs())
    }
}

impl Add for Time {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Time {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / SCALE.unsigned_abs();
        let frac = abs % SCALE.unsigned_abs();
        if frac % 100 == 0 {
            write!(f, "{sign}{whole}.{:02}", frac / 100)
        } else {
            let digits = format!("{frac:04}");
            write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
        }
    }
}

impl FromStr for Time {
    type Err = FormatError;

    /// Parses plain decimal seconds such as `"28.03"`, `"120"` or `"-2.127"`.
    ///
    /// Digits past the fourth decimal place are dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FormatError::Time {
            value: s.to_string(),
        };
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut frac_value = 0_i64;
        let mut place = SCALE / 10;
        for digit in frac.bytes().take(4) {
            frac_value += i64::from(digit - b'0') * place;
            place /= 10;
        }

        let value = whole_value
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(TimeVisitor)
    }
}

/// Accepts `"1:02.45"`, `"62.45"`, `62.45` or `62`.
struct TimeVisitor;

impl serde::de::Visitor<'_> for TimeVisitor {
    type Value = Time;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a time in seconds or m:ss.hh")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Time, E> {
        parse_time(v)
            .map_err(E::custom)?
            .ok_or_else(|| E::custom("empty time"))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Time, E> {
        // f64's Display is the shortest round-tripping form and never uses
        // an exponent, so 0.3 parses as exactly 0.30.
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Time, E> {
        v.checked_mul(SCALE)
            .map(Time)
            .ok_or_else(|| E::custom("time out of range"))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Time, E> {
        i64::try_from(v)
            .map_err(E::custom)
            .and_then(|v| self.visit_i64(v))
    }
}

/// A final or seed time, or one of the markers used when no number applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedTime {
    Time(Time),
    /// Swimmer was disqualified.
    Disqualified,
    /// Readings disagreed beyond the threshold.
    Inconsistent,
    /// Nothing was recorded at all.
    NoShow,
    /// No seed time on record.
    NoTime,
}

impl ResolvedTime {
    #[must_use]
    pub const fn time(self) -> Option<Time> {
        match self {
            Self::Time(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_special(self) -> bool {
        !matches!(self, Self::Time(_))
    }
}

impl From<Time> for ResolvedTime {
    fn from(t: Time) -> Self {
        Self::Time(t)
    }
}

impl fmt::Display for ResolvedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time(t) => write!(f, "{t}"),
            Self::Disqualified => f.write_str("DQ"),
            Self::Inconsistent => f.write_str("Inconsistent"),
            Self::NoShow => f.write_str("NoShow"),
            Self::NoTime => f.write_str("NT"),
        }
    }
}

impl FromStr for ResolvedTime {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DQ" => Ok(Self::Disqualified),
            "Inconsistent" => Ok(Self::Inconsistent),
            "NoShow" => Ok(Self::NoShow),
            "NT" => Ok(Self::NoTime),
            other => other.parse().map(Self::Time),
        }
    }
}

impl Serialize for ResolvedTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResolvedTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses `"ss.hh"` or `"m:ss.hh"`. An empty string means no time.
pub fn parse_time(text: &str) -> Result<Option<Time>, FormatError> {
    if text.is_empty() {
        return Ok(None);
    }
    let parts: Vec<&str> = text.split(':').collect();
    match parts.as_slice() {
        [seconds] => seconds.parse().map(Some),
        [minutes, seconds] => {
            let minutes: Time = minutes.parse()?;
            let seconds: Time = seconds.parse()?;
            let total = minutes
                .0
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds.0))
                .ok_or_else(|| FormatError::Time {
                    value: text.to_string(),
                })?;
            Ok(Some(Time(total)))
        }
        _ => Err(FormatError::Time {
            value: text.to_string(),
        }),
    }
}

/// Formats a time as `ss.hh` below a minute, `m:ss.hh` above, and
/// `99:59.99` once it reaches 100 minutes. `None` formats as an empty string.
pub fn format_time(time: Option<Time>) -> String {
    let Some(time) = time else {
        return String::new();
    };
    let sign = if time.is_negative() { "-" } else { "" };
    let hundredths = time.abs().hundredths();
    let minutes = hundredths / 6000;
    let seconds = hundredths % 6000;
    if minutes >= 100 {
        return "99:59.99".to_string();
    }
    let secs = format!("{:02}.{:02}", seconds / 100, seconds % 100);
    if minutes == 0 {
        format!("{sign}{secs}")
    } else {
        format!("{sign}{minutes}:{secs}")
    }
}

/// Median of a set of times without truncation.
///
/// Even counts average the two central values.
pub fn median(times: &[Time]) -> Option<Time> {
    let mut sorted = times.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 0 => Some(sorted[n / 2 - 1].midpoint(sorted[n / 2])),
        _ => Some(sorted[n / 2]),
    }
}

/// Combines readings into one candidate time, truncated to hundredths.
///
/// Absent readings are ignored: one reading is returned as-is, two are
/// averaged, and three or more take the median.
pub fn combine_times(times: &[Option<Time>]) -> Option<Time> {
    let present: Vec<Time> = times.iter().flatten().copied().collect();
    median(&present).map(Time::truncate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Time {
        s.parse().unwrap()
    }

    // ========== Parsing and Display ==========

    #[test]
    fn test_parse_and_display() {
        assert_eq!(t("15.2").to_string(), "15.20");
        assert_eq!(t("0.0").to_string(), "0.00");
        assert_eq!(t("120").to_string(), "120.00");
        assert_eq!(t(".5").to_string(), "0.50");
        assert_eq!(t("10.125").to_string(), "10.125");
        assert_eq!(t("-2.127").to_string(), "-2.127");
    }

    #[test]
    fn test_parse_drops_excess_digits() {
        assert_eq!(t("1.123456"), t("1.1234"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Time>().is_err());
        assert!(".".parse::<Time>().is_err());
        assert!("12a".parse::<Time>().is_err());
        assert!("1.2.3".parse::<Time>().is_err());
        assert!("1e3".parse::<Time>().is_err());
    }

    // ========== Truncation ==========

    #[test]
    fn test_truncate() {
        assert_eq!(t("100.00").truncate(), t("100.00"));
        assert_eq!(t("99.999").truncate(), t("99.99"));
        assert_eq!(t("10.987").truncate(), t("10.98"));
        assert_eq!(t("100.123").truncate(), t("100.12"));
        assert_eq!(t("-2.127").truncate(), t("-2.12"));
    }

    #[test]
    fn test_average_is_exact() {
        assert_eq!(t("154.37").midpoint(t("154.29")), t("154.33"));
    }

    // ========== parse_time / format_time ==========

    #[test]
    fn test_arithmetic_saturates() {
        let max = Time(i64::MAX);
        let min = Time(i64::MIN);
        assert_eq!(max + t("1.00"), max);
        assert_eq!(Time::ZERO - max - max, min);
        assert_eq!(max.midpoint(max), Time(i64::MAX / 2));
        assert_eq!(min.distance(max), max);
        assert_eq!(min.abs(), max);
        assert_eq!(Time::from_hundredths(i64::MAX), max);
        assert_eq!(Time::from_seconds(i64::MIN), min);
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("").unwrap(), None);
        assert_eq!(parse_time("0.0").unwrap(), Some(t("0")));
        assert_eq!(parse_time("00.01").unwrap(), Some(t("0.01")));
        assert_eq!(parse_time("2:00.00").unwrap(), Some(t("120")));
        assert_eq!(parse_time("30:00.00").unwrap(), Some(t("1800")));
        assert_eq!(parse_time("99:59.99").unwrap(), Some(t("5999.99")));
        assert!(parse_time("1:2:3").is_err());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "");
        assert_eq!(format_time(Some(t("0.0"))), "00.00");
        assert_eq!(format_time(Some(t("0.01"))), "00.01");
        assert_eq!(format_time(Some(t("15.2"))), "15.20");
        assert_eq!(format_time(Some(t("19.87"))), "19.87");
        assert_eq!(format_time(Some(t("50"))), "50.00");
        assert_eq!(format_time(Some(t("120.0"))), "2:00.00");
        assert_eq!(format_time(Some(t("1800"))), "30:00.00");
        assert_eq!(format_time(Some(t("9000"))), "99:59.99");
    }

    // ========== combine_times ==========

    #[test]
    fn test_combine_times() {
        assert_eq!(combine_times(&[]), None);
        assert_eq!(combine_times(&[None]), None);
        assert_eq!(combine_times(&[None, Some(t("100"))]), Some(t("100")));
        assert_eq!(combine_times(&[Some(t("100")), Some(t("200"))]), Some(t("150")));
        assert_eq!(
            combine_times(&[Some(t("200")), Some(t("100")), Some(t("300"))]),
            Some(t("200"))
        );
        assert_eq!(
            combine_times(&[
                Some(t("300")),
                Some(t("100")),
                Some(t("200")),
                Some(t("400"))
            ]),
            Some(t("250"))
        );
        assert_eq!(
            combine_times(&[Some(t("10.25")), Some(t("10.00"))]),
            Some(t("10.12"))
        );
    }

    #[test]
    fn test_median_is_untruncated() {
        assert_eq!(median(&[t("10.25"), t("10.00")]), Some(t("10.125")));
    }

    // ========== ResolvedTime ==========

    #[test]
    fn test_resolved_time_display_and_parse() {
        for (value, text) in [
            (ResolvedTime::Disqualified, "DQ"),
            (ResolvedTime::Inconsistent, "Inconsistent"),
            (ResolvedTime::NoShow, "NoShow"),
            (ResolvedTime::NoTime, "NT"),
            (ResolvedTime::Time(t("28.03")), "28.03"),
        ] {
            assert_eq!(value.to_string(), text);
            assert_eq!(text.parse::<ResolvedTime>().unwrap(), value);
        }
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&t("61.5")).unwrap();
        assert_eq!(json, "\"61.50\"");
        let back: Time = serde_json::from_str("\"1:01.50\"").unwrap();
        assert_eq!(back, t("61.5"));
        let from_float: Time = serde_json::from_str("0.3").unwrap();
        assert_eq!(from_float, t("0.30"));
        let from_int: Time = serde_json::from_str("10").unwrap();
        assert_eq!(from_int, t("10"));
        let nt: ResolvedTime = serde_json::from_str("\"NT\"").unwrap();
        assert_eq!(nt, ResolvedTime::NoTime);
    }

    #[test]
    fn test_min_valid_time() {
        assert_eq!(MIN_VALID_TIME, t("10.00"));
    }
}
