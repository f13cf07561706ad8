//! One row of the day file.

use crate::models::Extreme;
use chrono::NaiveDate;

/// Daily extremes and totals for one calendar date. Every quantity is
/// optional; `None` means it was never observed.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,

    pub high_gust: Option<Extreme<f64>>,
    /// Degrees; only meaningful alongside `high_gust`
    pub high_gust_bearing: i32,
    pub low_temp: Option<Extreme<f64>>,
    pub high_temp: Option<Extreme<f64>>,
    pub low_press: Option<Extreme<f64>>,
    pub high_press: Option<Extreme<f64>>,
    pub high_rain_rate: Option<Extreme<f64>>,
    pub total_rain: Option<f64>,
    pub avg_temp: Option<f64>,
    pub wind_run: Option<f64>,
    pub high_avg_wind: Option<Extreme<f64>>,
    pub low_humidity: Option<Extreme<i32>>,
    pub high_humidity: Option<Extreme<i32>>,
    pub et: Option<f64>,
    pub sunshine_hours: Option<f64>,
    pub high_heat_index: Option<Extreme<f64>>,
    pub high_app_temp: Option<Extreme<f64>>,
    pub low_app_temp: Option<Extreme<f64>>,
    pub high_hourly_rain: Option<Extreme<f64>>,
    pub low_wind_chill: Option<Extreme<f64>>,
    pub high_dew_point: Option<Extreme<f64>>,
    pub low_dew_point: Option<Extreme<f64>>,
    pub dominant_wind_bearing: Option<i32>,
    pub heating_degree_days: Option<f64>,
    pub cooling_degree_days: Option<f64>,
    pub high_solar: Option<Extreme<i32>>,
    pub high_uv: Option<Extreme<f64>>,
    pub high_feels_like: Option<Extreme<f64>>,
    pub low_feels_like: Option<Extreme<f64>>,
    pub high_humidex: Option<Extreme<f64>>,
    pub chill_hours: Option<f64>,
    pub high_rain_24h: Option<Extreme<f64>>,
}

impl DayRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            high_gust: None,
            high_gust_bearing: 0,
            low_temp: None,
            high_temp: None,
            low_press: None,
            high_press: None,
            high_rain_rate: None,
            total_rain: None,
            avg_temp: None,
            wind_run: None,
            high_avg_wind: None,
            low_humidity: None,
            high_humidity: None,
            et: None,
            sunshine_hours: None,
            high_heat_index: None,
            high_app_temp: None,
            low_app_temp: None,
            high_hourly_rain: None,
            low_wind_chill: None,
            high_dew_point: None,
            low_dew_point: None,
            dominant_wind_bearing: None,
            heating_degree_days: None,
            cooling_degree_days: None,
            high_solar: None,
            high_uv: None,
            high_feels_like: None,
            low_feels_like: None,
            high_humidex: None,
            chill_hours: None,
            high_rain_24h: None,
        }
    }

    /// A row can only be written once gust, temperature and pressure
    /// extremes are all known
    pub fn is_complete(&self) -> bool {
        self.high_gust.is_some()
            && self.low_temp.is_some()
            && self.high_temp.is_some()
            && self.low_press.is_some()
            && self.high_press.is_some()
    }
}
