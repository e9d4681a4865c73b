//! TOML-based application configuration.
//!
//! Stores tuning for both components:
//! - Hyperfocus urgency thresholds and the tick interval
//! - Default break length
//! - Energy learning window and the encouragement RNG seed
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::hyperfocus::UrgencyThresholds;

/// Hyperfocus guard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperfocusConfig {
    #[serde(default = "default_gentle")]
    pub gentle_after_min: u32,
    #[serde(default = "default_strong")]
    pub strong_after_min: u32,
    #[serde(default = "default_urgent")]
    pub urgent_after_min: u32,
    #[serde(default = "default_emergency")]
    pub emergency_after_min: u32,
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_break_min")]
    pub default_break_min: u32,
}

/// Energy advisor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// How many recent outcomes feed the completion rate.
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
    /// Minimum recent outcomes before the level is re-inferred.
    #[serde(default = "default_min_recent_sessions")]
    pub min_recent_sessions: usize,
    /// Fixed seed for encouragement selection (random when unset).
    #[serde(default)]
    pub encouragement_seed: Option<u64>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hyperfocus: HyperfocusConfig,
    #[serde(default)]
    pub energy: EnergyConfig,
}

fn default_gentle() -> u32 {
    25
}
fn default_strong() -> u32 {
    45
}
fn default_urgent() -> u32 {
    90
}
fn default_emergency() -> u32 {
    120
}
fn default_tick_interval_secs() -> u64 {
    60
}
fn default_break_min() -> u32 {
    10
}
fn default_recent_window() -> usize {
    5
}
fn default_min_recent_sessions() -> usize {
    3
}

impl Default for HyperfocusConfig {
    fn default() -> Self {
        Self {
            gentle_after_min: default_gentle(),
            strong_after_min: default_strong(),
            urgent_after_min: default_urgent(),
            emergency_after_min: default_emergency(),
            tick_interval_secs: default_tick_interval_secs(),
            default_break_min: default_break_min(),
        }
    }
}

impl HyperfocusConfig {
    pub fn thresholds(&self) -> UrgencyThresholds {
        UrgencyThresholds {
            gentle_min: self.gentle_after_min,
            strong_min: self.strong_after_min,
            urgent_min: self.urgent_after_min,
            emergency_min: self.emergency_after_min,
        }
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_interval_secs)
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            recent_window: default_recent_window(),
            min_recent_sessions: default_min_recent_sessions(),
            encouragement_seed: None,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    // Optional fields serialize as null when unset.
                    serde_json::Value::Null => {
                        if value.eq_ignore_ascii_case("none") || value.is_empty() {
                            serde_json::Value::Null
                        } else {
                            serde_json::Value::Number(
                                value
                                    .parse::<u64>()
                                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                                    .into(),
                            )
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Reject values the components cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = &self.hyperfocus;
        let ordered = h.gentle_after_min > 0
            && h.gentle_after_min < h.strong_after_min
            && h.strong_after_min < h.urgent_after_min
            && h.urgent_after_min < h.emergency_after_min;
        if !ordered {
            return Err(ConfigError::InvalidValue {
                key: "hyperfocus".into(),
                message: "urgency thresholds must be positive and strictly increasing".into(),
            });
        }
        if !(1..=60).contains(&h.tick_interval_secs) {
            return Err(ConfigError::InvalidValue {
                key: "hyperfocus.tick_interval_secs".into(),
                message: "must be between 1 and 60 seconds".into(),
            });
        }
        let e = &self.energy;
        if e.recent_window == 0 || e.min_recent_sessions == 0 || e.min_recent_sessions > e.recent_window {
            return Err(ConfigError::InvalidValue {
                key: "energy".into(),
                message: "min_recent_sessions must be between 1 and recent_window".into(),
            });
        }
        // TOML integers are signed 64-bit.
        if e.encouragement_seed.is_some_and(|seed| i64::try_from(seed).is_err()) {
            return Err(ConfigError::InvalidValue {
                key: "energy.encouragement_seed".into(),
                message: format!("must be at most {}", i64::MAX),
            });
        }
        Ok(())
    }

    /// Location of `config.toml` inside the data directory.
    pub fn file_path() -> crate::error::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Restore one top-level section (`hyperfocus` or `energy`) to its
    /// defaults, leaving the other untouched.
    pub fn reset_section(&mut self, section: &str) -> Result<(), ConfigError> {
        match section {
            "hyperfocus" => self.hyperfocus = HyperfocusConfig::default(),
            "energy" => self.energy = EnergyConfig::default(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(&Self::file_path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> crate::error::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(ConfigError::from)?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration fails validation. On error `self` is
    /// left unchanged.
    pub fn apply(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist.
    pub fn set(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e: CoreError| {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.hyperfocus.tick_interval_secs, 60);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[hyperfocus]\ngentle_after_min = 20\n").unwrap();
        assert_eq!(parsed.hyperfocus.gentle_after_min, 20);
        assert_eq!(parsed.hyperfocus.strong_after_min, 45);
        assert_eq!(parsed.energy.recent_window, 5);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("hyperfocus.urgent_after_min").as_deref(), Some("90"));
        assert_eq!(cfg.get("energy.encouragement_seed").as_deref(), Some("null"));
        assert!(cfg.get("hyperfocus.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("hyperfocus.tick_interval_secs", "30").unwrap();
        assert_eq!(cfg.hyperfocus.tick_interval_secs, 30);
    }

    #[test]
    fn apply_sets_optional_seed() {
        let mut cfg = Config::default();
        cfg.apply("energy.encouragement_seed", "42").unwrap();
        assert_eq!(cfg.energy.encouragement_seed, Some(42));
        cfg.apply("energy.encouragement_seed", "none").unwrap();
        assert_eq!(cfg.energy.encouragement_seed, None);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("hyperfocus.nonexistent", "1").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_non_numeric_value() {
        let mut cfg = Config::default();
        assert!(cfg.apply("hyperfocus.gentle_after_min", "soon").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn apply_rejects_unordered_thresholds() {
        let mut cfg = Config::default();
        assert!(cfg.apply("hyperfocus.strong_after_min", "100").is_err());
        assert_eq!(cfg.hyperfocus.strong_after_min, 45);
    }

    #[test]
    fn validate_rejects_slow_tick() {
        let mut cfg = Config::default();
        cfg.hyperfocus.tick_interval_secs = 120;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn apply_rejects_seed_beyond_toml_range() {
        let mut cfg = Config::default();
        let err = cfg
            .apply("energy.encouragement_seed", &u64::MAX.to_string())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "energy.encouragement_seed"
        ));
        assert_eq!(cfg, Config::default());

        cfg.apply("energy.encouragement_seed", &i64::MAX.to_string()).unwrap();
        assert!(toml::to_string_pretty(&cfg).is_ok());
    }

    #[test]
    fn reset_section_keeps_the_other_section() {
        let mut cfg = Config::default();
        cfg.hyperfocus.default_break_min = 12;
        cfg.energy.recent_window = 8;
        cfg.reset_section("energy").unwrap();
        assert_eq!(cfg.energy, EnergyConfig::default());
        assert_eq!(cfg.hyperfocus.default_break_min, 12);

        assert!(matches!(
            cfg.reset_section("timer"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(cfg.hyperfocus.default_break_min, 12);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_reads_saved_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.hyperfocus.default_break_min = 15;
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().hyperfocus.default_break_min, 15);
    }
}
