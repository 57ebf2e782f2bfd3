//! Weather widget session: the state machine behind load, refresh, search
//! and unit toggle.
//!
//! Fetches run on spawned tasks and report back over a channel, so the owner
//! (a UI loop or the CLI) decides when results are applied via [`WeatherSession::poll`]
//! or [`WeatherSession::settle`]. Starting a new fetch aborts the previous one
//! and results tagged with an older generation are dropped.

use skyboard_core::{TemperatureUnit, WeatherError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::prefs::{self, LocationPreference, PreferenceStore};
use crate::provider::WeatherProvider;
use crate::types::WeatherBundle;

/// What the widget is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing requested yet
    Idle,
    Loading,
    Ready {
        weather: WeatherBundle,
        unit: TemperatureUnit,
    },
    /// Display with `to_string()`; `user_message()` for friendlier text
    Errored(WeatherError),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// How a fetch resolves its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Device location, then coordinates
    Device,
    /// Postal code restored from preferences
    SavedLocation { zip_code: String },
    /// Postal code typed by the user; persisted on success and never replayed
    Search { zip_code: String },
}

/// Messages sent from fetch tasks back to the session
#[derive(Debug)]
pub enum WeatherServiceMessage {
    FetchDone {
        generation: u64,
        origin: FetchOrigin,
        result: Result<WeatherBundle, WeatherError>,
    },
}

pub struct WeatherSession {
    provider: WeatherProvider,
    prefs: Arc<dyn PreferenceStore>,
    country: String,
    unit: TemperatureUnit,
    state: SessionState,
    generation: u64,
    task: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<WeatherServiceMessage>,
    rx: mpsc::UnboundedReceiver<WeatherServiceMessage>,
}

impl WeatherSession {
    /// Create a session. The stored unit wins over `default_unit`.
    pub fn new(
        provider: WeatherProvider,
        prefs: Arc<dyn PreferenceStore>,
        default_unit: TemperatureUnit,
        country: impl Into<String>,
    ) -> Self {
        let unit = prefs::load_unit(prefs.as_ref()).unwrap_or(default_unit);
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            provider,
            prefs,
            country: country.into(),
            unit,
            state: SessionState::Idle,
            generation: 0,
            task: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn location_preference(&self) -> Option<LocationPreference> {
        prefs::load_location(self.prefs.as_ref())
    }

    /// First load: the saved location if there is one, otherwise the device.
    pub fn initialize(&mut self) {
        let origin = self.resolution_path();
        self.start(origin);
    }

    /// Reload the saved location, or the device location when none is saved.
    /// Goes through the cache, so a refresh inside the TTL window makes no
    /// requests. A failed search is not retried.
    pub fn refresh(&mut self) {
        let origin = self.resolution_path();
        self.start(origin);
    }

    /// Look up a user-entered postal code. Blank input is ignored and
    /// returns `false`.
    pub fn search_location(&mut self, input: &str) -> bool {
        let zip_code = input.trim();
        if zip_code.is_empty() {
            return false;
        }

        self.start(FetchOrigin::Search {
            zip_code: zip_code.to_string(),
        });
        true
    }

    /// Flip celsius/fahrenheit and persist it. Never refetches.
    pub fn toggle_unit(&mut self) -> TemperatureUnit {
        self.unit = self.unit.toggled();

        if let Err(e) = prefs::save_unit(self.prefs.as_ref(), self.unit) {
            tracing::warn!("Failed to save unit preference: {}", e);
        }

        if let SessionState::Ready { unit, .. } = &mut self.state {
            *unit = self.unit;
        }

        self.unit
    }

    /// Apply any finished results without waiting. Returns true if the state
    /// may have changed.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
            applied = true;
        }
        applied
    }

    /// Wait for the current fetch, if any, and apply its result.
    pub async fn settle(&mut self) -> &SessionState {
        if let Some(handle) = self.task.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::error!("Weather fetch task failed: {}", e);
                    self.state = SessionState::Errored(WeatherError::WeatherUnavailable(
                        "Failed to fetch weather data".to_string(),
                    ));
                }
            }
        }

        self.poll();
        &self.state
    }

    fn resolution_path(&self) -> FetchOrigin {
        if let Some(saved) = self.location_preference() {
            return FetchOrigin::SavedLocation {
                zip_code: saved.zip_code,
            };
        }

        FetchOrigin::Device
    }

    fn start(&mut self, origin: FetchOrigin) {
        if let Some(previous) = self.task.take() {
            previous.abort();
        }

        self.generation += 1;
        self.state = SessionState::Loading;

        tracing::info!("Fetching weather ({:?}, generation {})", origin, self.generation);

        let provider = self.provider.clone();
        let tx = self.tx.clone();
        let country = self.country.clone();
        let generation = self.generation;

        self.task = Some(tokio::spawn(async move {
            let result = match &origin {
                FetchOrigin::Device => match provider.resolver().resolve_by_device().await {
                    Ok(coords) => provider.fetch_by_coordinates(coords.lat, coords.lon).await,
                    Err(e) => Err(e),
                },
                FetchOrigin::SavedLocation { zip_code } | FetchOrigin::Search { zip_code } => {
                    provider.fetch_by_zip(zip_code, &country).await
                }
            };

            let _ = tx.send(WeatherServiceMessage::FetchDone {
                generation,
                origin,
                result,
            });
        }));
    }

    fn apply(&mut self, message: WeatherServiceMessage) {
        let WeatherServiceMessage::FetchDone {
            generation,
            origin,
            result,
        } = message;

        if generation != self.generation {
            tracing::debug!(
                "Dropping superseded weather result (generation {}, current {})",
                generation,
                self.generation
            );
            return;
        }

        match result {
            Ok(weather) => {
                if let FetchOrigin::Search { zip_code } = &origin {
                    let pref = LocationPreference {
                        zip_code: zip_code.clone(),
                        name: weather.current.place_name.clone(),
                    };
                    if let Err(e) = prefs::save_location(self.prefs.as_ref(), &pref) {
                        tracing::warn!("Failed to save location preference: {}", e);
                    }
                }

                self.state = SessionState::Ready {
                    weather,
                    unit: self.unit,
                };
            }
            Err(e) => {
                tracing::warn!("Weather fetch failed: {}", e);
                self.state = SessionState::Errored(e);
            }
        }
    }
}

impl Drop for WeatherSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
