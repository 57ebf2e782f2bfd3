use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Forecast points kept from the 5 day / 3 hour endpoint.
pub const MAX_HOURLY_ENTRIES: usize = 40;

/// Days kept from the daily endpoint.
pub const MAX_DAILY_ENTRIES: usize = 8;

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Cache key for a weather lookup.
///
/// Coordinate lookups and postal code lookups produce different keys even
/// when they describe the same place; keys are never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey(String);

impl LocationKey {
    /// `"<lat>,<lon>"`
    pub fn for_coordinates(coords: &Coordinates) -> Self {
        Self(format!("{},{}", coords.lat, coords.lon))
    }

    /// `"zip:<code>,<country>"`
    pub fn for_postal_code(code: &str, country: &str) -> Self {
        Self(format!("zip:{},{}", code, country))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Weather condition as reported by the API (`weather[0]`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherDescriptor {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Current conditions. Temperatures are Celsius, wind speed is m/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    /// hPa
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub weather: WeatherDescriptor,
    pub place_name: String,
    pub country: String,
}

impl CurrentConditions {
    pub fn description(&self) -> &str {
        &self.weather.description
    }

    pub fn icon(&self) -> &str {
        &self.weather.icon
    }
}

/// One 3-hour forecast point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub weather: WeatherDescriptor,
}

/// 5 day / 3 hour forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub entries: Vec<HourlyForecastEntry>,
    pub city_name: String,
    pub country: String,
    /// Seconds east of UTC
    pub timezone_offset: i32,
}

/// One day of the daily forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: DateTime<Utc>,
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub weather: WeatherDescriptor,
}

/// Daily forecast (up to 8 days)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub days: Vec<DailyForecastEntry>,
    /// Seconds east of UTC
    pub timezone_offset: i32,
}

/// Merged result of one weather lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub current: CurrentConditions,
    pub forecast: Option<Forecast>,
    pub daily: Option<DailyForecast>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_key_format() {
        let key = LocationKey::for_coordinates(&Coordinates::new(37.7749, -122.4194));
        assert_eq!(key.as_str(), "37.7749,-122.4194");
    }

    #[test]
    fn test_postal_code_key_format() {
        let key = LocationKey::for_postal_code("94103", "US");
        assert_eq!(key.to_string(), "zip:94103,US");
    }

    #[test]
    fn test_zip_and_coordinate_keys_are_distinct() {
        let by_coords = LocationKey::for_coordinates(&Coordinates::new(37.7725, -122.4091));
        let by_zip = LocationKey::for_postal_code("94103", "US");
        assert_ne!(by_coords, by_zip);
    }
}
