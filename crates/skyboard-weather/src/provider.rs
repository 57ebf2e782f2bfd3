//! Weather aggregation against the OpenWeatherMap API.
//!
//! A lookup fans out to three endpoints at once (current conditions, the
//! 5 day / 3 hour forecast and the daily forecast), merges the answers and
//! caches the merged result per [`LocationKey`]. Only the daily forecast is
//! optional; losing either of the other two fails the whole lookup.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use skyboard_core::{NetworkError, ReqwestErrorExt, WeatherConfig, WeatherError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

use crate::cache::WeatherCache;
use crate::geocode::Geocoder;
use crate::location::{DeviceLocator, GeolocationResolver};
use crate::owm::{ApiCurrent, ApiDaily, ApiForecast};
use crate::types::{Coordinates, CurrentConditions, DailyForecast, Forecast, LocationKey, WeatherBundle};

const UNAVAILABLE_MESSAGE: &str = "Weather data not available";
const FAILED_MESSAGE: &str = "Failed to fetch weather data";
const DAILY_EXCLUDE: &str = "current,minutely,hourly,alerts";

type FetchResult = Result<WeatherBundle, WeatherError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Endpoints and credential for the weather API.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_base_url: String,
    pub onecall_url: String,
    pub geo_url: String,
    pub api_key: String,
}

impl ProviderSettings {
    pub fn from_config(config: &WeatherConfig) -> Self {
        Self {
            api_base_url: config.api_base_url.clone(),
            onecall_url: config.onecall_url.clone(),
            geo_url: config.geo_url.clone(),
            api_key: config.resolved_api_key(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    client: Client,
    settings: ProviderSettings,
    cache: Arc<WeatherCache>,
    resolver: GeolocationResolver,
    in_flight: Mutex<HashMap<LocationKey, SharedFetch>>,
}

impl WeatherProvider {
    pub fn new(
        settings: ProviderSettings,
        cache: Arc<WeatherCache>,
        locator: Arc<dyn DeviceLocator>,
    ) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .user_agent(concat!("skyboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        let geocoder = Geocoder::new(client.clone(), settings.geo_url.clone(), settings.api_key.clone());
        let resolver = GeolocationResolver::new(locator, geocoder);

        Ok(Self {
            inner: Arc::new(ProviderInner {
                client,
                settings,
                cache,
                resolver,
                in_flight: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// The resolver used for device and postal code lookups.
    pub fn resolver(&self) -> &GeolocationResolver {
        &self.inner.resolver
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.inner.cache
    }

    /// Weather for a coordinate pair, cached under `"<lat>,<lon>"`.
    pub async fn fetch_by_coordinates(&self, lat: f64, lon: f64) -> FetchResult {
        let coords = Coordinates::new(lat, lon);
        let key = LocationKey::for_coordinates(&coords);
        let inner = self.inner.clone();

        self.fetch_keyed(key, async move { inner.fetch_fresh(coords).await })
            .await
    }

    /// Weather for a postal code, cached under `"zip:<code>,<country>"`.
    ///
    /// A cache hit skips geocoding as well as the weather requests.
    pub async fn fetch_by_zip(&self, code: &str, country: &str) -> FetchResult {
        let key = LocationKey::for_postal_code(code, country);
        let inner = self.inner.clone();
        let code = code.to_string();
        let country = country.to_string();

        self.fetch_keyed(key, async move {
            let coords = inner.resolver.resolve_by_postal_code(&code, &country).await?;
            inner.fetch_fresh(coords).await
        })
        .await
    }

    /// Lookups currently running in the background.
    pub fn pending_fetches(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// Serve `key` from the cache, join an identical fetch already running,
    /// or start `fetch` and publish it for others to join.
    ///
    /// The fetch runs on its own task, so it completes, fills the cache and
    /// leaves `in_flight` even when every caller awaiting it is dropped.
    async fn fetch_keyed<F>(&self, key: LocationKey, fetch: F) -> FetchResult
    where
        F: Future<Output = FetchResult> + Send + 'static,
    {
        let shared = {
            let mut in_flight = self.inner.in_flight.lock();

            if let Some(entry) = self.inner.cache.get(&key) {
                tracing::debug!("Using cached weather for {}", key);
                return Ok(entry.weather);
            }

            match in_flight.get(&key).cloned() {
                Some(running) => {
                    tracing::debug!("Joining in-flight weather fetch for {}", key);
                    running
                }
                None => {
                    let inner = self.inner.clone();
                    let task_key = key.clone();
                    let handle = tokio::spawn(async move {
                        let result = fetch.await;
                        if let Ok(weather) = &result {
                            inner.cache.store(task_key.clone(), weather.clone());
                        }
                        inner.in_flight.lock().remove(&task_key);
                        result
                    });

                    let task = async move {
                        handle.await.unwrap_or_else(|e| {
                            tracing::error!("Weather fetch task failed: {}", e);
                            Err(WeatherError::WeatherUnavailable(FAILED_MESSAGE.to_string()))
                        })
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(key, task.clone());
                    task
                }
            }
        };

        shared.await
    }
}

impl ProviderInner {
    /// Fire all three requests, then wait for all of them.
    #[instrument(skip(self), level = "info")]
    async fn fetch_fresh(&self, coords: Coordinates) -> FetchResult {
        let base = self.settings.api_base_url.trim_end_matches('/');
        let current_url = format!("{}/weather", base);
        let forecast_url = format!("{}/forecast", base);

        let (current, forecast, daily) = tokio::join!(
            self.get_json::<ApiCurrent>(&current_url, &coords, &[]),
            self.get_json::<ApiForecast>(&forecast_url, &coords, &[]),
            self.fetch_daily(&coords),
        );

        let current = CurrentConditions::from(current.map_err(WeatherError::WeatherUnavailable)?);
        let forecast = Forecast::from(forecast.map_err(WeatherError::WeatherUnavailable)?);

        tracing::info!(
            "Fetched weather for {} ({} forecast points, daily: {})",
            current.place_name,
            forecast.entries.len(),
            daily.is_some()
        );

        Ok(WeatherBundle {
            current,
            forecast: Some(forecast),
            daily,
        })
    }

    /// Any failure here only drops the daily forecast from the result.
    async fn fetch_daily(&self, coords: &Coordinates) -> Option<DailyForecast> {
        match self
            .get_json::<ApiDaily>(&self.settings.onecall_url, coords, &[("exclude", DAILY_EXCLUDE)])
            .await
        {
            Ok(daily) => Some(DailyForecast::from(daily)),
            Err(e) => {
                tracing::debug!("Daily forecast not available: {}", e);
                None
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        coords: &Coordinates,
        extra: &[(&str, &str)],
    ) -> Result<T, String> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();

        let response = self
            .client
            .get(url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.settings.api_key.as_str()),
                ("units", "metric"),
            ])
            .query(extra)
            .send()
            .await
            .map_err(|e| e.into_network_error().to_string())?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned status {}", url, status);
            return Err(UNAVAILABLE_MESSAGE.to_string());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| e.into_network_error().to_string())
    }
}

impl std::fmt::Debug for ProviderInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderInner")
            .field("api_base_url", &self.settings.api_base_url)
            .field("cache", &self.cache)
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}
