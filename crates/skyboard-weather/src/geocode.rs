//! Forward geocoding: postal code to coordinates via the OpenWeatherMap geo API.

use reqwest::Client;
use skyboard_core::WeatherError;
use tracing::instrument;

use crate::owm::ApiGeo;
use crate::types::Coordinates;

const NOT_FOUND_MESSAGE: &str = "Location not found";

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    geo_url: String,
    api_key: String,
}

impl Geocoder {
    pub fn new(client: Client, geo_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            geo_url: geo_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Look up the coordinates of a postal code.
    ///
    /// One request, no retry. Any failure (transport, non-2xx status,
    /// unreadable body) is reported as `LocationNotFound`.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_by_postal_code(
        &self,
        code: &str,
        country: &str,
    ) -> Result<Coordinates, WeatherError> {
        let url = format!("{}/zip", self.geo_url.trim_end_matches('/'));
        let zip = format!("{},{}", code, country);

        let response = match self
            .client
            .get(&url)
            .query(&[("zip", zip.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Geocode request failed: {}", e);
                return Err(not_found());
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Geocode returned status {}", response.status());
            return Err(not_found());
        }

        let body: ApiGeo = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Geocode parse error: {}", e);
                return Err(not_found());
            }
        };

        let coords = body.coordinates().ok_or_else(not_found)?;
        tracing::info!("Geocoded {} to {}, {}", zip, coords.lat, coords.lon);
        Ok(coords)
    }
}

fn not_found() -> WeatherError {
    WeatherError::LocationNotFound(NOT_FOUND_MESSAGE.to_string())
}
