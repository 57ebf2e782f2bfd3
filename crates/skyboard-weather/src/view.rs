//! Presentation helpers for the 24 hour chart and the daily strip.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::types::{DailyForecast, Forecast};
use crate::units::{self, round_half_up, TemperatureUnit};

/// Forecast points shown on the chart (8 x 3h).
pub const CHART_POINTS: usize = 8;

const CHART_TICKS: usize = 5;
const DAILY_DAYS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Wall-clock time at the forecast location
    pub time: NaiveDateTime,
    pub temperature: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyChart {
    pub points: Vec<ChartPoint>,
    pub axis_min: i64,
    pub axis_max: i64,
    pub ticks: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub high: String,
    pub low: String,
    pub description: String,
    pub icon: String,
}

/// Next 24 hours of temperatures with a padded y-axis. `None` for an empty
/// forecast.
pub fn hourly_chart(forecast: &Forecast, unit: TemperatureUnit) -> Option<HourlyChart> {
    let points: Vec<ChartPoint> = forecast
        .entries
        .iter()
        .take(CHART_POINTS)
        .map(|entry| ChartPoint {
            time: local_time(entry.timestamp, forecast.timezone_offset),
            temperature: round_half_up(units::convert(entry.temperature, unit)),
        })
        .collect();

    let min = points.iter().map(|p| p.temperature).min()?;
    let max = points.iter().map(|p| p.temperature).max()?;

    // 20% of the spread on each side
    let padding = ((max - min) as f64 * 0.2).ceil() as i64;
    let axis_min = min - padding;
    let axis_max = max + padding;

    let step = (axis_max - axis_min) as f64 / (CHART_TICKS - 1) as f64;
    let ticks = (0..CHART_TICKS)
        .map(|i| round_half_up(axis_min as f64 + i as f64 * step))
        .collect();

    Some(HourlyChart {
        points,
        axis_min,
        axis_max,
        ticks,
    })
}

/// Formatted high/low per day, at most eight days.
pub fn daily_summary(daily: &DailyForecast, unit: TemperatureUnit) -> Vec<DaySummary> {
    daily
        .days
        .iter()
        .take(DAILY_DAYS)
        .map(|day| DaySummary {
            date: local_time(day.date, daily.timezone_offset).date(),
            high: units::format(day.max, unit),
            low: units::format(day.min, unit),
            description: day.weather.description.clone(),
            icon: day.weather.icon.clone(),
        })
        .collect()
}

fn local_time(timestamp: DateTime<Utc>, offset_seconds: i32) -> NaiveDateTime {
    match FixedOffset::east_opt(offset_seconds) {
        Some(offset) => timestamp.with_timezone(&offset).naive_local(),
        None => timestamp.naive_utc(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::types::{DailyForecastEntry, HourlyForecastEntry, WeatherDescriptor};

    fn forecast(temps: &[f64], offset: i32) -> Forecast {
        let entries = temps
            .iter()
            .enumerate()
            .map(|(i, t)| HourlyForecastEntry {
                timestamp: DateTime::from_timestamp(1_700_000_000 + i as i64 * 10_800, 0).unwrap(),
                temperature: *t,
                feels_like: *t,
                humidity: 50,
                wind_speed: 1.0,
                wind_deg: 0.0,
                weather: WeatherDescriptor::default(),
            })
            .collect();
        Forecast {
            entries,
            city_name: "Testville".into(),
            country: "US".into(),
            timezone_offset: offset,
        }
    }

    #[test]
    fn test_chart_uses_first_eight_points() {
        let temps: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let chart = hourly_chart(&forecast(&temps, 0), TemperatureUnit::Celsius).unwrap();
        assert_eq!(chart.points.len(), 8);
        assert_eq!(chart.points.last().unwrap().temperature, 7);
    }

    #[test]
    fn test_chart_axis_padding_and_ticks() {
        // spread 10 -> padding 2 -> axis 8..22
        let chart =
            hourly_chart(&forecast(&[10.0, 14.2, 20.0], 0), TemperatureUnit::Celsius).unwrap();
        assert_eq!(chart.axis_min, 8);
        assert_eq!(chart.axis_max, 22);
        assert_eq!(chart.ticks, vec![8, 12, 15, 19, 22]);
    }

    #[test]
    fn test_chart_flat_temperatures() {
        let chart = hourly_chart(&forecast(&[5.0, 5.0], 0), TemperatureUnit::Celsius).unwrap();
        assert_eq!((chart.axis_min, chart.axis_max), (5, 5));
        assert_eq!(chart.ticks, vec![5; 5]);
    }

    #[test]
    fn test_chart_converts_unit() {
        let chart = hourly_chart(&forecast(&[0.0], 0), TemperatureUnit::Fahrenheit).unwrap();
        assert_eq!(chart.points[0].temperature, 32);
    }

    #[test]
    fn test_chart_local_time_applies_offset() {
        let utc = hourly_chart(&forecast(&[1.0], 0), TemperatureUnit::Celsius).unwrap();
        let shifted = hourly_chart(&forecast(&[1.0], 3600), TemperatureUnit::Celsius).unwrap();
        assert_eq!(
            shifted.points[0].time - utc.points[0].time,
            chrono::Duration::hours(1)
        );
    }

    #[test]
    fn test_empty_forecast_has_no_chart() {
        assert!(hourly_chart(&forecast(&[], 0), TemperatureUnit::Celsius).is_none());
    }

    #[test]
    fn test_daily_summary_formats_and_truncates() {
        let days = (0..10)
            .map(|i| DailyForecastEntry {
                date: DateTime::from_timestamp(1_700_000_000 + i * 86_400, 0).unwrap(),
                day: 10.0,
                min: 0.0,
                max: 100.0,
                weather: WeatherDescriptor {
                    id: 800,
                    main: "Clear".into(),
                    description: "clear sky".into(),
                    icon: "01d".into(),
                },
            })
            .collect();
        let daily = DailyForecast {
            days,
            timezone_offset: 0,
        };

        let summary = daily_summary(&daily, TemperatureUnit::Fahrenheit);
        assert_eq!(summary.len(), 8);
        assert_eq!(summary[0].high, "212°F");
        assert_eq!(summary[0].low, "32°F");
        assert_eq!(summary[0].description, "clear sky");
        assert_eq!(
            summary[1].date - summary[0].date,
            chrono::Duration::days(1)
        );
    }
}
