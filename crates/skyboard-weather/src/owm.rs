//! OpenWeatherMap response bodies and their conversion into domain types.

use chrono::DateTime;
use serde::Deserialize;

use crate::types::{
    Coordinates, CurrentConditions, DailyForecast, DailyForecastEntry, Forecast,
    HourlyForecastEntry, WeatherDescriptor, MAX_DAILY_ENTRIES, MAX_HOURLY_ENTRIES,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiWeather {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiWind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiSys {
    #[serde(default)]
    country: String,
}

/// `GET /weather`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiCurrent {
    #[serde(default)]
    weather: Vec<ApiWeather>,
    main: ApiMain,
    #[serde(default)]
    wind: ApiWind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: ApiSys,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastItem {
    dt: i64,
    main: ApiMain,
    #[serde(default)]
    weather: Vec<ApiWeather>,
    #[serde(default)]
    wind: ApiWind,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiCity {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    timezone: i32,
}

/// `GET /forecast`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecast {
    list: Vec<ApiForecastItem>,
    #[serde(default)]
    city: ApiCity,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiDayTemp {
    day: f64,
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiDay {
    dt: i64,
    temp: ApiDayTemp,
    #[serde(default)]
    weather: Vec<ApiWeather>,
}

/// `GET /onecall`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiDaily {
    daily: Vec<ApiDay>,
    #[serde(default)]
    timezone_offset: i32,
}

/// `GET /geo/1.0/zip`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiGeo {
    lat: f64,
    lon: f64,
}

fn first_descriptor(weather: Vec<ApiWeather>) -> WeatherDescriptor {
    weather
        .into_iter()
        .next()
        .map(|w| WeatherDescriptor {
            id: w.id,
            main: w.main,
            description: w.description,
            icon: w.icon,
        })
        .unwrap_or_default()
}

impl From<ApiCurrent> for CurrentConditions {
    fn from(api: ApiCurrent) -> Self {
        Self {
            temperature: api.main.temp,
            feels_like: api.main.feels_like,
            temp_min: api.main.temp_min,
            temp_max: api.main.temp_max,
            humidity: api.main.humidity,
            pressure: api.main.pressure,
            wind_speed: api.wind.speed,
            wind_deg: api.wind.deg,
            weather: first_descriptor(api.weather),
            place_name: api.name,
            country: api.sys.country,
        }
    }
}

impl From<ApiForecast> for Forecast {
    fn from(api: ApiForecast) -> Self {
        let entries = api
            .list
            .into_iter()
            .take(MAX_HOURLY_ENTRIES)
            .map(|item| HourlyForecastEntry {
                timestamp: DateTime::from_timestamp(item.dt, 0).unwrap_or_default(),
                temperature: item.main.temp,
                feels_like: item.main.feels_like,
                humidity: item.main.humidity,
                wind_speed: item.wind.speed,
                wind_deg: item.wind.deg,
                weather: first_descriptor(item.weather),
            })
            .collect();

        Self {
            entries,
            city_name: api.city.name,
            country: api.city.country,
            timezone_offset: api.city.timezone,
        }
    }
}

impl From<ApiDaily> for DailyForecast {
    fn from(api: ApiDaily) -> Self {
        let days = api
            .daily
            .into_iter()
            .take(MAX_DAILY_ENTRIES)
            .map(|day| DailyForecastEntry {
                date: DateTime::from_timestamp(day.dt, 0).unwrap_or_default(),
                day: day.temp.day,
                min: day.temp.min,
                max: day.temp.max,
                weather: first_descriptor(day.weather),
            })
            .collect();

        Self {
            days,
            timezone_offset: api.timezone_offset,
        }
    }
}

impl ApiGeo {
    /// Coordinates, if both are finite numbers.
    pub(crate) fn coordinates(&self) -> Option<Coordinates> {
        (self.lat.is_finite() && self.lon.is_finite()).then(|| Coordinates::new(self.lat, self.lon))
    }
}
