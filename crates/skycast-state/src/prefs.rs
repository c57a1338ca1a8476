//! User display preferences, persisted as individual string-keyed
//! entries in a JSON document. Booleans are stored in their string
//! form and parsed back on load; unparseable entries are logged and
//! fall back to built-in defaults, never surfaced to the caller.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use skycast_core::units::{ClockFormat, LengthUnit, SpeedUnit, TemperatureUnit};

pub const TEMP_UNIT_KEY: &str = "tempUnit";
pub const SPEED_UNIT_KEY: &str = "speedUnit";
pub const LENGTH_UNIT_KEY: &str = "lengthUnit";
pub const CLOCK_FORMAT_KEY: &str = "clockTime";
pub const MOUSE_HIDE_KEY: &str = "mouseHide";
pub const SCREENSAVER_ENABLED_KEY: &str = "screensaverEnabled";
pub const SCREENSAVER_TIMEOUT_KEY: &str = "screensaverTimeout";
pub const SCREENSAVER_DURATION_KEY: &str = "screensaverDuration";
pub const SCREENSAVER_TYPE_KEY: &str = "screensaverType";

/// What the screensaver shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScreensaverKind {
    #[default]
    Images,
    Video,
    Animation,
}

impl ScreensaverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Video => "video",
            Self::Animation => "animation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "images" => Some(Self::Images),
            "video" => Some(Self::Video),
            "animation" => Some(Self::Animation),
            _ => None,
        }
    }
}

/// Screensaver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreensaverPrefs {
    pub enabled: bool,
    pub timeout_minutes: u32,
    pub duration_minutes: u32,
    pub kind: ScreensaverKind,
}

impl Default for ScreensaverPrefs {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_minutes: 60,
            duration_minutes: 3,
            kind: ScreensaverKind::Images,
        }
    }
}

/// All persisted display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub temp_unit: TemperatureUnit,
    pub speed_unit: SpeedUnit,
    pub length_unit: LengthUnit,
    pub clock_format: ClockFormat,
    pub mouse_hide: bool,
    pub screensaver: ScreensaverPrefs,
}

/// String-keyed preference storage backed by a JSON file.
#[derive(Debug, Clone)]
pub struct PrefStore {
    path: PathBuf,
}

impl PrefStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("prefs.json"),
        }
    }

    /// Store one entry, read-modify-writing the whole document.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let contents =
            serde_json::to_string_pretty(&map).context("Failed to serialize preferences")?;
        std::fs::write(&self.path, contents).context("Failed to write preferences file")?;

        Ok(())
    }

    /// Read one raw entry.
    pub fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    /// Seed a `Preferences` value from storage, defaulting each field
    /// that is absent or unparseable.
    pub fn load(&self) -> Preferences {
        let map = self.read_map();
        let mut prefs = Preferences::default();

        if let Some(raw) = map.get(TEMP_UNIT_KEY) {
            match TemperatureUnit::parse(raw) {
                Some(unit) => prefs.temp_unit = unit,
                None => tracing::warn!("Ignoring stored temperature unit {:?}", raw),
            }
        }
        if let Some(raw) = map.get(SPEED_UNIT_KEY) {
            match SpeedUnit::parse(raw) {
                Some(unit) => prefs.speed_unit = unit,
                None => tracing::warn!("Ignoring stored speed unit {:?}", raw),
            }
        }
        if let Some(raw) = map.get(LENGTH_UNIT_KEY) {
            match LengthUnit::parse(raw) {
                Some(unit) => prefs.length_unit = unit,
                None => tracing::warn!("Ignoring stored length unit {:?}", raw),
            }
        }
        if let Some(raw) = map.get(CLOCK_FORMAT_KEY) {
            match ClockFormat::parse(raw) {
                Some(format) => prefs.clock_format = format,
                None => tracing::warn!("Ignoring stored clock format {:?}", raw),
            }
        }
        if let Some(raw) = map.get(MOUSE_HIDE_KEY) {
            match raw.parse::<bool>() {
                Ok(value) => prefs.mouse_hide = value,
                Err(_) => tracing::warn!("Ignoring stored mouse-hide flag {:?}", raw),
            }
        }
        if let Some(raw) = map.get(SCREENSAVER_ENABLED_KEY) {
            match raw.parse::<bool>() {
                Ok(value) => prefs.screensaver.enabled = value,
                Err(_) => tracing::warn!("Ignoring stored screensaver-enabled flag {:?}", raw),
            }
        }
        if let Some(raw) = map.get(SCREENSAVER_TIMEOUT_KEY) {
            match raw.parse::<u32>() {
                Ok(minutes) => prefs.screensaver.timeout_minutes = minutes,
                Err(_) => tracing::warn!("Ignoring stored screensaver timeout {:?}", raw),
            }
        }
        if let Some(raw) = map.get(SCREENSAVER_DURATION_KEY) {
            match raw.parse::<u32>() {
                Ok(minutes) => prefs.screensaver.duration_minutes = minutes,
                Err(_) => tracing::warn!("Ignoring stored screensaver duration {:?}", raw),
            }
        }
        if let Some(raw) = map.get(SCREENSAVER_TYPE_KEY) {
            match ScreensaverKind::parse(raw) {
                Some(kind) => prefs.screensaver.kind = kind,
                None => tracing::warn!("Ignoring stored screensaver type {:?}", raw),
            }
        }

        prefs
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_str(&contents) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Preferences file is malformed, using defaults: {}", e);
                BTreeMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PrefStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let (_dir, store) = store();
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn saved_units_round_trip() {
        let (_dir, store) = store();
        store.set(TEMP_UNIT_KEY, "c").unwrap();
        store.set(SPEED_UNIT_KEY, "ms").unwrap();
        store.set(LENGTH_UNIT_KEY, "mm").unwrap();
        store.set(CLOCK_FORMAT_KEY, "24").unwrap();

        let prefs = store.load();
        assert_eq!(prefs.temp_unit, TemperatureUnit::Celsius);
        assert_eq!(prefs.speed_unit, SpeedUnit::Ms);
        assert_eq!(prefs.length_unit, LengthUnit::Millimeters);
        assert_eq!(prefs.clock_format, ClockFormat::TwentyFourHour);
    }

    #[test]
    fn booleans_round_trip_as_strings() {
        let (_dir, store) = store();
        store.set(MOUSE_HIDE_KEY, "true").unwrap();
        store.set(SCREENSAVER_ENABLED_KEY, "false").unwrap();

        let prefs = store.load();
        assert!(prefs.mouse_hide);
        assert!(!prefs.screensaver.enabled);
    }

    #[test]
    fn screensaver_settings_round_trip() {
        let (_dir, store) = store();
        store.set(SCREENSAVER_TIMEOUT_KEY, "15").unwrap();
        store.set(SCREENSAVER_DURATION_KEY, "5").unwrap();
        store.set(SCREENSAVER_TYPE_KEY, "video").unwrap();

        let prefs = store.load();
        assert_eq!(prefs.screensaver.timeout_minutes, 15);
        assert_eq!(prefs.screensaver.duration_minutes, 5);
        assert_eq!(prefs.screensaver.kind, ScreensaverKind::Video);
    }

    #[test]
    fn unparseable_entries_fall_back_to_defaults() {
        let (_dir, store) = store();
        store.set(TEMP_UNIT_KEY, "kelvin").unwrap();
        store.set(SCREENSAVER_TIMEOUT_KEY, "soon").unwrap();
        store.set(MOUSE_HIDE_KEY, "maybe").unwrap();

        let prefs = store.load();
        assert_eq!(prefs.temp_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(prefs.screensaver.timeout_minutes, 60);
        assert!(!prefs.mouse_hide);
    }

    #[test]
    fn malformed_file_is_treated_as_empty() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("prefs.json"), "not json").unwrap();
        assert_eq!(store.load(), Preferences::default());
    }
}
