//! TOML-based application configuration.
//!
//! Stores:
//! - The daily working bound free time is computed within
//! - Display rounding and reason thresholds for the allocator
//! - Default time preferences used when a snapshot carries none
//!
//! Configuration is stored at `~/.config/freeslot/config.toml`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::preferences::Preferences;
use crate::scheduler::AllocatorConfig;
use crate::time::{TimeOfDay, MINUTES_PER_DAY};
use crate::timetable::WorkingBound;
use crate::window::DayRange;

/// Engine-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_working_start")]
    pub working_start: TimeOfDay,
    #[serde(default = "default_working_end")]
    pub working_end: TimeOfDay,
    #[serde(default = "default_display_grid")]
    pub display_grid_minutes: u16,
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: i64,
    #[serde(default = "default_tight_fit_percent")]
    pub tight_fit_percent: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/freeslot/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub preferences: Preferences,
}

// Default functions
fn default_working_start() -> TimeOfDay {
    WorkingBound::default().range().start()
}
fn default_working_end() -> TimeOfDay {
    WorkingBound::default().range().end()
}
fn default_display_grid() -> u16 {
    60
}
fn default_due_soon_days() -> i64 {
    3
}
fn default_tight_fit_percent() -> u32 {
    75
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            working_start: default_working_start(),
            working_end: default_working_end(),
            display_grid_minutes: default_display_grid(),
            due_soon_days: default_due_soon_days(),
            tight_fit_percent: default_tight_fit_percent(),
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
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<i64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults there if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
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
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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

    /// Set a config value by dot-separated key. The change is validated but
    /// not saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is rejected.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;
        if engine.working_start >= engine.working_end {
            return Err(ConfigError::InvalidValue {
                key: "engine.working_end".into(),
                message: format!(
                    "working day must end after it starts ({} >= {})",
                    engine.working_start, engine.working_end
                ),
            });
        }
        let grid = engine.display_grid_minutes;
        if grid == 0 || MINUTES_PER_DAY % grid != 0 {
            return Err(ConfigError::InvalidValue {
                key: "engine.display_grid_minutes".into(),
                message: format!("{grid} does not evenly divide a day"),
            });
        }
        if engine.tight_fit_percent > 100 {
            return Err(ConfigError::InvalidValue {
                key: "engine.tight_fit_percent".into(),
                message: format!("{} is above 100", engine.tight_fit_percent),
            });
        }
        Ok(())
    }

    pub fn working_bound(&self) -> WorkingBound {
        DayRange::new(self.engine.working_start, self.engine.working_end)
            .map(WorkingBound)
            .unwrap_or_default()
    }

    /// Allocator settings, measuring due dates from `reference_date`.
    pub fn allocator_config(&self, reference_date: Option<NaiveDate>) -> AllocatorConfig {
        AllocatorConfig {
            display_grid_minutes: self.engine.display_grid_minutes,
            due_soon_days: self.engine.due_soon_days,
            tight_fit_percent: self.engine.tight_fit_percent,
            reference_date,
        }
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
        assert_eq!(parsed.engine.working_start.to_string(), "09:00");
        assert_eq!(parsed.engine.working_end.to_string(), "18:00");
        assert_eq!(parsed.engine.display_grid_minutes, 60);
        assert!(parsed.preferences.is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [engine]
            working_end = "21:00"

            [preferences]
            avoid = [{ start = "12:00", end = "13:00" }]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.engine.working_start.to_string(), "09:00");
        assert_eq!(cfg.working_bound().range(), DayRange::parse("09:00", "21:00").unwrap());
        assert_eq!(cfg.preferences.avoid.len(), 1);
        assert_eq!(cfg.engine.due_soon_days, 3);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("engine.working_start").as_deref(), Some("09:00"));
        assert_eq!(cfg.get("engine.tight_fit_percent").as_deref(), Some("75"));
        assert_eq!(cfg.get("engine.nope"), None);
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("engine.working_start", "08:30").unwrap();
        cfg.set("engine.display_grid_minutes", "30").unwrap();
        assert_eq!(cfg.engine.working_start.to_string(), "08:30");
        assert_eq!(cfg.engine.display_grid_minutes, 30);
    }

    #[test]
    fn set_accepts_json_for_lists() {
        let mut cfg = Config::default();
        cfg.set("preferences.preferred", r#"[{"start":"13:00","end":"17:00"}]"#)
            .unwrap();
        assert_eq!(cfg.preferences.preferred, vec![DayRange::parse("13:00", "17:00").unwrap()]);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.set("engine.theme", "dark"), Err(ConfigError::UnknownKey(_))));
        assert!(cfg.set("engine.working_start", "25:00").is_err());
        assert!(cfg.set("engine.display_grid_minutes", "abc").is_err());
        // would put the start after the end
        assert!(cfg.set("engine.working_start", "19:00").is_err());
        assert!(cfg.set("engine.display_grid_minutes", "7").is_err());
        assert_eq!(cfg.engine.working_start.to_string(), "09:00");
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.engine.tight_fit_percent, 75);
    }

    #[test]
    fn save_and_reload_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("engine.due_soon_days", "5").unwrap();
        cfg.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.engine.due_soon_days, 5);
        assert_eq!(reloaded.allocator_config(None).due_soon_days, 5);
    }

    #[test]
    fn load_from_rejects_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine]\nworking_start = \"18:00\"\nworking_end = \"09:00\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::InvalidValue { .. })));

        std::fs::write(&path, "engine = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));
    }
}
