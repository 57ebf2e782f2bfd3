//! Temperature and wind helpers used at presentation time.
//!
//! Values are stored in Celsius and m/s; nothing in here is ever persisted.

pub use skyboard_core::TemperatureUnit;

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Round to the nearest integer, halves toward positive infinity.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Convert a Celsius reading into `unit`.
pub fn convert(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    }
}

/// Rounded temperature with its unit symbol, e.g. `"32°F"`.
pub fn format(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{}{}", round_half_up(convert(celsius, unit)), unit.symbol())
}

/// Eight-point compass label for a bearing in degrees.
///
/// Each label owns a 45° sector centered on it, so N spans 337.5..22.5.
pub fn wind_direction(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = round_half_up(normalized / 45.0).rem_euclid(8) as usize;
    COMPASS[index]
}

/// Wind speed in whole km/h from m/s.
pub fn wind_speed_kmh(metres_per_second: f64) -> i64 {
    round_half_up(metres_per_second * 3.6)
}
