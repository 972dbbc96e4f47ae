//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use lt_core::{
    MIN_VALID_TIME, NameMode, ResolverKind, SimpleResolver, StandardResolver, Time, TimeResolver,
};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Readings needed before a time is synthesized from backups.
    pub min_times: usize,
    /// Largest gap between readings that still counts as agreement.
    pub time_threshold: Time,
    /// Readings below this are ignored by the standard resolver.
    pub min_valid_time: Time,
    pub resolver: ResolverKind,
    pub name_mode: NameMode,
    /// Widest name the results table shows before shortening it.
    pub name_width: usize,
    /// Where to look up start lists by default.
    pub start_list_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_times: 2,
            time_threshold: Time::from_hundredths(30),
            min_valid_time: MIN_VALID_TIME,
            resolver: ResolverKind::default(),
            name_mode: NameMode::default(),
            name_width: 20,
            start_list_dir: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // LT_MIN_TIMES, LT_TIME_THRESHOLD, ...
        figment = figment.merge(Env::prefixed("LT_"));

        figment.extract()
    }

    /// The configured resolver policy.
    pub fn resolver(&self) -> Box<dyn TimeResolver> {
        match self.resolver {
            ResolverKind::Standard => Box::new(
                StandardResolver::new(self.min_times, self.time_threshold)
                    .with_min_valid_time(self.min_valid_time),
            ),
            ResolverKind::Simple => {
                Box::new(SimpleResolver::new(self.min_times, self.time_threshold))
            }
        }
    }
}

/// Returns the platform-specific config directory for lt.
///
/// On Linux: `~/.config/lt`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use lt_core::Lane;

    fn t(s: &str) -> Time {
        s.parse().unwrap()
    }

    #[test]
    fn test_dirs_config_path_ends_with_lt() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "lt");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.min_times, 2);
        assert_eq!(config.time_threshold, t("0.30"));
        assert_eq!(config.min_valid_time, t("10.00"));
        assert_eq!(config.resolver, ResolverKind::Standard);
        assert_eq!(config.name_mode, NameMode::None);
        assert_eq!(config.name_width, 20);
        assert!(config.start_list_dir.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("lt.toml");
        std::fs::write(
            &path,
            r#"
min_times = 3
time_threshold = 0.5
min_valid_time = "1:00.00"
resolver = "simple"
name_mode = "last_first"
name_width = 12
start_list_dir = "/meets/lists"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.min_times, 3);
        assert_eq!(config.time_threshold, t("0.50"));
        assert_eq!(config.min_valid_time, t("60.00"));
        assert_eq!(config.resolver, ResolverKind::Simple);
        assert_eq!(config.name_mode, NameMode::LastFirst);
        assert_eq!(config.name_width, 12);
        assert_eq!(config.start_list_dir, Some(PathBuf::from("/meets/lists")));
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("lt.toml");
        std::fs::write(&path, "resolver = \"fancy\"\n").unwrap();
        assert!(Config::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_resolver_follows_config() {
        let lane = || {
            Lane::builder()
                .backups(Some(vec![Some(t("60.10")), Some(t("60.20"))]))
                .build()
                .unwrap()
        };

        let mut resolved = lane();
        Config::default().resolver().resolve(&mut resolved);
        assert_eq!(resolved.final_time(), Some(t("60.15")));

        let strict = Config {
            min_times: 3,
            resolver: ResolverKind::Simple,
            ..Config::default()
        };
        let mut resolved = lane();
        strict.resolver().resolve(&mut resolved);
        assert_eq!(resolved.final_time(), None);
    }
}
