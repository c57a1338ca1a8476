//! The server-persisted settings document: API keys and an optional
//! starting position, stored as a single JSON file.
//!
//! Lifecycle is create-if-absent, read-many, replace-whole on save.
//! There is no versioning and no optimistic concurrency; the last
//! writer wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// User settings persisted by the local server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub weather_api_key: Option<String>,
    pub map_api_key: Option<String>,
    pub reverse_geo_api_key: Option<String>,
    pub starting_lat: Option<String>,
    pub starting_lon: Option<String>,
}

impl Settings {
    /// Parse the configured starting position, if both halves are
    /// present and numeric.
    pub fn starting_position(&self) -> Option<(f64, f64)> {
        let lat = self.starting_lat.as_deref()?.trim().parse::<f64>().ok()?;
        let lon = self.starting_lon.as_deref()?.trim().parse::<f64>().ok()?;
        Some((lat, lon))
    }
}

/// On-disk store for the settings document.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("settings.json"),
        }
    }

    /// Read the settings document, creating a default (empty) one on
    /// disk if none exists yet.
    pub fn load_or_create(&self) -> Result<Settings> {
        if !self.path.exists() {
            let settings = Settings::default();
            self.replace(&settings)?;
            return Ok(settings);
        }

        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read settings file")?;
        let settings: Settings =
            serde_json::from_str(&contents).context("Failed to parse settings file")?;

        Ok(settings)
    }

    /// Replace the whole document.
    pub fn replace(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        let contents =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
        std::fs::write(&self.path, contents).context("Failed to write settings file")?;

        Ok(())
    }

    /// Upsert a single field by its JSON name, returning the updated
    /// document.
    pub fn set_field(&self, name: &str, value: &serde_json::Value) -> Result<Settings> {
        let text = coerce_to_string(value)
            .ok_or_else(|| ConfigError::Invalid(format!("Unsupported value for {name}")))?;

        let mut settings = self.load_or_create()?;
        *field_mut(&mut settings, name)
            .ok_or_else(|| ConfigError::Invalid(format!("Unknown setting: {name}")))? = Some(text);

        self.replace(&settings)?;
        Ok(settings)
    }

    /// Remove a single field by its JSON name, returning the updated
    /// document.
    pub fn remove_field(&self, name: &str) -> Result<Settings> {
        let mut settings = self.load_or_create()?;
        *field_mut(&mut settings, name)
            .ok_or_else(|| ConfigError::Invalid(format!("Unknown setting: {name}")))? = None;

        self.replace(&settings)?;
        Ok(settings)
    }
}

fn field_mut<'a>(settings: &'a mut Settings, name: &str) -> Option<&'a mut Option<String>> {
    match name {
        "weatherApiKey" => Some(&mut settings.weather_api_key),
        "mapApiKey" => Some(&mut settings.map_api_key),
        "reverseGeoApiKey" => Some(&mut settings.reverse_geo_api_key),
        "startingLat" => Some(&mut settings.starting_lat),
        "startingLon" => Some(&mut settings.starting_lon),
        _ => None,
    }
}

fn coerce_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn load_creates_default_document() {
        let (dir, store) = store();
        let settings = store.load_or_create().unwrap();
        assert_eq!(settings, Settings::default());
        assert!(dir.path().join("settings.json").exists());
    }

    #[test]
    fn replace_round_trips() {
        let (_dir, store) = store();
        let settings = Settings {
            weather_api_key: Some("wkey".into()),
            map_api_key: Some("mkey".into()),
            reverse_geo_api_key: None,
            starting_lat: Some("40.0".into()),
            starting_lon: Some("-75.0".into()),
        };
        store.replace(&settings).unwrap();
        assert_eq!(store.load_or_create().unwrap(), settings);
    }

    #[test]
    fn set_and_remove_single_field() {
        let (_dir, store) = store();
        let updated = store
            .set_field("weatherApiKey", &serde_json::json!("abc123"))
            .unwrap();
        assert_eq!(updated.weather_api_key.as_deref(), Some("abc123"));

        let updated = store.remove_field("weatherApiKey").unwrap();
        assert_eq!(updated.weather_api_key, None);
    }

    #[test]
    fn numeric_values_are_stored_as_strings() {
        let (_dir, store) = store();
        let updated = store
            .set_field("startingLat", &serde_json::json!(40.7))
            .unwrap();
        assert_eq!(updated.starting_lat.as_deref(), Some("40.7"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let (_dir, store) = store();
        assert!(store.set_field("apiKey", &serde_json::json!("x")).is_err());
        assert!(store.remove_field("apiKey").is_err());
    }

    #[test]
    fn starting_position_requires_both_numeric_halves() {
        let mut settings = Settings {
            starting_lat: Some("40.0".into()),
            starting_lon: Some("-75.0".into()),
            ..Settings::default()
        };
        assert_eq!(settings.starting_position(), Some((40.0, -75.0)));

        settings.starting_lon = None;
        assert_eq!(settings.starting_position(), None);

        settings.starting_lon = Some("not-a-number".into());
        assert_eq!(settings.starting_position(), None);
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let settings = Settings {
            weather_api_key: Some("k".into()),
            ..Settings::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("weatherApiKey").is_some());
        assert!(json.get("startingLat").is_some());
    }
}
