//! Weather service for Skyboard
//!
//! Aggregates current conditions, the 5 day forecast and the daily forecast
//! from OpenWeatherMap behind a 15 minute cache, resolves locations from the
//! device or a postal code, and drives the widget session state.

pub mod cache;
pub mod clock;
pub mod geocode;
pub mod location;
mod owm;
pub mod prefs;
pub mod provider;
pub mod session;
pub mod types;
pub mod units;
pub mod view;

pub use cache::{CacheEntry, WeatherCache, CACHE_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use location::{DeviceLocator, GeolocationResolver, NoDeviceLocator, StaticLocator};
pub use prefs::{FileStore, LocationPreference, MemoryStore, PreferenceStore};
pub use provider::{ProviderSettings, WeatherProvider};
pub use session::{FetchOrigin, SessionState, WeatherSession};
pub use skyboard_core::{TemperatureUnit, WeatherError};
pub use types::*;
