//! Rearranging start-list names (`Last, First M`) for display.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<l>(?P<li>[^,])[^,]*)(,\s+(?P<f>(?P<fi>\w)\w*)(\s+(?P<m>\w+))?)?").unwrap()
});

/// How a swimmer's name is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMode {
    /// Verbatim from the start list.
    #[default]
    None,
    /// `First`
    First,
    /// `First Last`
    FirstLast,
    /// `First L`
    FirstLastInitial,
    /// `Last, First`
    LastFirst,
    /// `Last, F`
    LastFirstInitial,
    /// `Last`
    Last,
}

impl NameMode {
    /// The next shorter mode to fall back on, if any.
    const fn shorter(self) -> Option<Self> {
        match self {
            Self::None => Some(Self::LastFirst),
            Self::LastFirst => Some(Self::LastFirstInitial),
            Self::LastFirstInitial => Some(Self::Last),
            Self::FirstLast => Some(Self::FirstLastInitial),
            Self::FirstLastInitial => Some(Self::First),
            Self::First | Self::Last => None,
        }
    }
}

fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// Rearranges a `Last, First M` name.
///
/// Names without a first name come back trimmed but otherwise unchanged for
/// every mode except [`NameMode::Last`].
pub fn arrange_name(mode: NameMode, name: &str) -> String {
    let Some(caps) = NAME_RE.captures(name) else {
        return name.trim().to_string();
    };
    let last = group(&caps, "l").trim();
    if mode == NameMode::Last {
        return last.to_string();
    }
    if caps.name("f").is_none() {
        return name.trim().to_string();
    }
    let first = group(&caps, "f");
    match mode {
        NameMode::None => name.trim().to_string(),
        NameMode::First => first.to_string(),
        NameMode::FirstLast => format!("{first} {last}"),
        NameMode::FirstLastInitial => format!("{first} {}", group(&caps, "li")),
        NameMode::LastFirst => format!("{last}, {first}"),
        NameMode::LastFirstInitial => format!("{last}, {}", group(&caps, "fi")),
        NameMode::Last => last.to_string(),
    }
}

/// The name in `mode`, followed by ever shorter variants down to `""`.
///
/// A display picks the first variant that fits.
pub fn format_name(mode: NameMode, name: &str) -> Vec<String> {
    let mut variants = vec![arrange_name(mode, name)];
    let mut current = mode;
    while let Some(next) = current.shorter() {
        variants.push(arrange_name(next, name));
        current = next;
    }
    let mut shortened: Vec<char> = variants.last().map(|v| v.chars().collect()).unwrap_or_default();
    while shortened.pop().is_some() {
        variants.push(shortened.iter().collect());
    }
    variants.dedup();
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== arrange_name Tests ==========

    #[test]
    fn test_arrange_padded_name() {
        let name = "Last, First M       ";
        let arranged = |mode| arrange_name(mode, name);
        assert_eq!(arranged(NameMode::None), "Last, First M");
        assert_eq!(arranged(NameMode::LastFirst), "Last, First");
        assert_eq!(arranged(NameMode::LastFirstInitial), "Last, F");
        assert_eq!(arranged(NameMode::First), "First");
        assert_eq!(arranged(NameMode::FirstLast), "First Last");
        assert_eq!(arranged(NameMode::FirstLastInitial), "First L");
        assert_eq!(arranged(NameMode::Last), "Last");
    }

    #[test]
    fn test_arrange_without_middle() {
        let name = "Last, First         ";
        assert_eq!(arrange_name(NameMode::None, "Last, First"), "Last, First");
        assert_eq!(arrange_name(NameMode::LastFirst, name), "Last, First");
        assert_eq!(arrange_name(NameMode::FirstLast, name), "First Last");
        assert_eq!(arrange_name(NameMode::Last, name), "Last");
    }

    #[test]
    fn test_arrange_single_name() {
        assert_eq!(arrange_name(NameMode::FirstLast, "Cher   "), "Cher");
        assert_eq!(arrange_name(NameMode::Last, "Cher   "), "Cher");
        assert_eq!(arrange_name(NameMode::First, ""), "");
    }

    // ========== format_name Tests ==========

    #[test]
    fn test_format_name_variants() {
        assert_eq!(
            format_name(NameMode::None, "Last, First M"),
            ["Last, First M", "Last, First", "Last, F", "Last", "Las", "La", "L", ""]
        );
        assert_eq!(
            format_name(NameMode::LastFirst, "Last, First M"),
            ["Last, First", "Last, F", "Last", "Las", "La", "L", ""]
        );
        assert_eq!(
            format_name(NameMode::FirstLast, "Last, First M"),
            ["First Last", "First L", "First", "Firs", "Fir", "Fi", "F", ""]
        );
    }

    #[test]
    fn test_format_name_drops_repeats() {
        assert_eq!(
            format_name(NameMode::None, "Ng, Al"),
            ["Ng, Al", "Ng, A", "Ng", "N", ""]
        );
        assert_eq!(format_name(NameMode::Last, ""), [""]);
    }

    #[test]
    fn test_name_mode_serde() {
        let mode: NameMode = serde_json::from_str("\"last_first_initial\"").unwrap();
        assert_eq!(mode, NameMode::LastFirstInitial);
        assert_eq!(serde_json::to_string(&NameMode::None).unwrap(), "\"none\"");
    }
}
