//! Persisted widget preferences (temperature unit and saved location).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skyboard_core::TemperatureUnit;

pub use skyboard_core::store::{FileStore, MemoryStore, PreferenceStore};

pub const UNIT_STORAGE_KEY: &str = "weather-unit-preference";
pub const LOCATION_STORAGE_KEY: &str = "weather-location-preference";

/// A postal code the user searched for. Its presence skips device location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPreference {
    pub zip_code: String,
    pub name: String,
}

/// Saved unit, if one is stored and readable.
pub fn load_unit(store: &dyn PreferenceStore) -> Option<TemperatureUnit> {
    match store.get(UNIT_STORAGE_KEY) {
        Ok(Some(raw)) => match raw.parse() {
            Ok(unit) => Some(unit),
            Err(e) => {
                tracing::warn!("Ignoring stored unit preference: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Failed to read unit preference: {}", e);
            None
        }
    }
}

pub fn save_unit(store: &dyn PreferenceStore, unit: TemperatureUnit) -> Result<()> {
    store.set(UNIT_STORAGE_KEY, unit.as_str())
}

/// Saved location, if one is stored and parses.
pub fn load_location(store: &dyn PreferenceStore) -> Option<LocationPreference> {
    let raw = match store.get(LOCATION_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read location preference: {}", e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(pref) => Some(pref),
        Err(e) => {
            tracing::warn!("Ignoring malformed location preference: {}", e);
            None
        }
    }
}

pub fn save_location(store: &dyn PreferenceStore, pref: &LocationPreference) -> Result<()> {
    let json = serde_json::to_string(pref).context("Failed to serialize location preference")?;
    store.set(LOCATION_STORAGE_KEY, &json)
}
