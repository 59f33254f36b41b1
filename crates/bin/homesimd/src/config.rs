//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `homesim.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduler clock settings.
    pub engine: EngineConfig,
    /// Where the initial home comes from.
    pub home: HomeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Scheduler clock configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between two scheduler ticks.
    pub tick_interval_secs: u64,
}

/// Seed home configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    /// JSON file holding `{"devices": [...]}`. An empty home when unset.
    pub seed_file: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `homesim.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homesim.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(ConfigError::Io(err)),
        };
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides read through `lookup`. `RUST_LOG` wins over
    /// `HOMESIM_LOG`; an unparsable tick interval is ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secs) = lookup("HOMESIM_TICK_SECS").and_then(|v| v.trim().parse().ok()) {
            self.engine.tick_interval_secs = secs;
        }
        if let Some(path) = lookup("HOMESIM_SEED").filter(|v| !v.is_empty()) {
            self.home.seed_file = Some(PathBuf::from(path));
        }
        if let Some(filter) = lookup("RUST_LOG").or_else(|| lookup("HOMESIM_LOG")) {
            self.logging.filter = filter;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.tick_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "tick_interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Interval between two scheduler ticks.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.engine.tick_interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homesimd=info,homesim_app=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.tick_interval_secs, 1);
        assert!(config.home.seed_file.is_none());
        assert_eq!(config.logging.filter, "homesimd=info,homesim_app=info");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.engine.tick_interval_secs, 1);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [engine]
            tick_interval_secs = 5

            [home]
            seed_file = 'home.json'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.tick_interval_secs, 5);
        assert_eq!(config.home.seed_file, Some(PathBuf::from("home.json")));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.engine.tick_interval_secs, 1);
    }

    #[test]
    fn should_reject_zero_tick_interval() {
        let mut config = Config::default();
        config.engine.tick_interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_convert_tick_interval_to_duration() {
        let config: Config = toml::from_str("[engine]\ntick_interval_secs = 3").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_secs(3));
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn should_override_file_values_from_env() {
        let mut config: Config = toml::from_str("[engine]\ntick_interval_secs = 5").unwrap();
        config.apply_overrides(env(&[
            ("HOMESIM_TICK_SECS", "2"),
            ("HOMESIM_SEED", "/etc/homesim/home.json"),
            ("HOMESIM_LOG", "homesimd=debug"),
        ]));
        assert_eq!(config.engine.tick_interval_secs, 2);
        assert_eq!(
            config.home.seed_file,
            Some(PathBuf::from("/etc/homesim/home.json"))
        );
        assert_eq!(config.logging.filter, "homesimd=debug");
    }

    #[test]
    fn should_prefer_rust_log_over_homesim_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("HOMESIM_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_tick_override() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("HOMESIM_TICK_SECS", "soon")]));
        assert_eq!(config.engine.tick_interval_secs, 1);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
