//! Location resolution: device location capability or postal code lookup.

use async_trait::async_trait;
use skyboard_core::{WeatherConfig, WeatherError};
use std::sync::Arc;

use crate::geocode::Geocoder;
use crate::types::Coordinates;

/// A platform capability that reports where the device is.
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    /// Whether the capability exists at all on this system.
    fn is_available(&self) -> bool {
        true
    }

    /// Ask the platform for the current position. Suspends until it answers.
    ///
    /// Implementations report a refusal as `PermissionDenied` and a failure
    /// or timeout as `Unavailable`.
    async fn current_location(&self) -> Result<Coordinates, WeatherError>;
}

/// No device location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeviceLocator;

#[async_trait]
impl DeviceLocator for NoDeviceLocator {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_location(&self) -> Result<Coordinates, WeatherError> {
        Err(WeatherError::Unavailable(
            "Unable to retrieve your location".to_string(),
        ))
    }
}

/// A device whose position is known up front (configuration or command line).
#[derive(Debug, Clone, Copy)]
pub struct StaticLocator {
    coords: Coordinates,
}

impl StaticLocator {
    pub fn new(coords: Coordinates) -> Self {
        Self { coords }
    }
}

#[async_trait]
impl DeviceLocator for StaticLocator {
    async fn current_location(&self) -> Result<Coordinates, WeatherError> {
        Ok(self.coords)
    }
}

/// Build the device locator described by the weather configuration.
pub fn locator_from_config(config: &WeatherConfig) -> Arc<dyn DeviceLocator> {
    match config.device_location {
        Some(loc) => Arc::new(StaticLocator::new(Coordinates::new(
            loc.latitude,
            loc.longitude,
        ))),
        None => Arc::new(NoDeviceLocator),
    }
}

/// Turns either a device position or a postal code into coordinates.
#[derive(Clone)]
pub struct GeolocationResolver {
    locator: Arc<dyn DeviceLocator>,
    geocoder: Geocoder,
}

impl GeolocationResolver {
    pub fn new(locator: Arc<dyn DeviceLocator>, geocoder: Geocoder) -> Self {
        Self { locator, geocoder }
    }

    /// Coordinates from the device location capability. No retry.
    pub async fn resolve_by_device(&self) -> Result<Coordinates, WeatherError> {
        if !self.locator.is_available() {
            return Err(WeatherError::UnsupportedCapability(
                "Geolocation is not supported on this device".to_string(),
            ));
        }

        let coords = self.locator.current_location().await?;
        tracing::info!("Got location: {}, {}", coords.lat, coords.lon);
        Ok(coords)
    }

    /// Coordinates for a postal code via the geocoding endpoint.
    pub async fn resolve_by_postal_code(
        &self,
        code: &str,
        country: &str,
    ) -> Result<Coordinates, WeatherError> {
        self.geocoder.resolve_by_postal_code(code, country).await
    }
}

impl std::fmt::Debug for GeolocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeolocationResolver")
            .field("device_available", &self.locator.is_available())
            .field("geocoder", &self.geocoder)
            .finish()
    }
}
