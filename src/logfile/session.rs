//! Running state carried between interval samples.

use crate::models::Extreme;
use crate::units::{RainMeasure, UnitConverter};
use crate::wlk::records::RainField;
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Extremes of quantities only the interval samples can provide. Reset at
/// the start of every physical day and copied into the day file when the
/// day closes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionExtrema {
    pub humidex_high: Option<Extreme<f64>>,
    pub apparent_high: Option<Extreme<f64>>,
    pub apparent_low: Option<Extreme<f64>>,
    pub feels_like_high: Option<Extreme<f64>>,
    pub feels_like_low: Option<Extreme<f64>>,
    /// Minutes spent below the chill-hour threshold
    pub chill_minutes: u32,
    /// Samples folded in since the last reset
    pub samples: usize,
}

impl SessionExtrema {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Interval state owned by the driver. The extremes and today's rain are
/// per day; the yearly rain counter runs for the whole import.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub extrema: SessionExtrema,
    pub rain: RainCounters,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new physical day
    pub fn start_day(&mut self) {
        self.extrema.reset();
        self.rain.start_day();
    }
}

/// Rain since midnight and since the start of the year, in clicks
#[derive(Debug, Clone, Copy, Default)]
pub struct RainCounters {
    today_clicks: u32,
    year_clicks: u32,
    year: Option<i32>,
    bucket: Option<(f64, RainMeasure)>,
}

impl RainCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear today's total at the start of a physical day
    pub fn start_day(&mut self) {
        self.today_clicks = 0;
    }

    /// Add one sample's clicks. The year total restarts when the calendar
    /// year changes; the daily total is also cleared by the midnight sample.
    pub fn add(&mut self, rain: RainField, ts: NaiveDateTime) {
        if self.year != Some(ts.year()) {
            self.year_clicks = 0;
            self.year = Some(ts.year());
        }

        let clicks = u32::from(rain.clicks);
        self.year_clicks += clicks;
        self.today_clicks += clicks;
        self.bucket = Some(rain.collector.bucket());

        if ts.hour() == 0 && ts.minute() == 0 {
            self.today_clicks = 0;
        }
    }

    pub fn today_clicks(&self) -> u32 {
        self.today_clicks
    }

    pub fn year_clicks(&self) -> u32 {
        self.year_clicks
    }

    fn to_user(&self, clicks: u32, units: &UnitConverter) -> f64 {
        let (bucket, measure) = self.bucket.unwrap_or((0.01, RainMeasure::Inches));
        units.rain_to_user(f64::from(clicks) * bucket, measure)
    }

    /// Rain since midnight in the display unit
    pub fn today(&self, units: &UnitConverter) -> f64 {
        self.to_user(self.today_clicks, units)
    }

    /// Running counter in the display unit
    pub fn counter(&self, units: &UnitConverter) -> f64 {
        self.to_user(self.year_clicks, units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_midnight_sample_clears_today() {
        let mut rain = RainCounters::new();
        rain.add(RainField::from_raw(0x1003), at(2024, 3, 9, 23, 50));
        rain.add(RainField::from_raw(0x1002), at(2024, 3, 9, 23, 55));
        assert_eq!(rain.today_clicks(), 5);

        // The midnight sample is added then cleared
        rain.add(RainField::from_raw(0x1004), at(2024, 3, 10, 0, 0));
        assert_eq!(rain.today_clicks(), 0);
        assert_eq!(rain.year_clicks(), 9);

        rain.add(RainField::from_raw(0x1001), at(2024, 3, 10, 0, 5));
        assert_eq!(rain.today_clicks(), 1);
    }

    #[test]
    fn test_new_day_clears_today_without_midnight_sample() {
        let mut ctx = SessionContext::new();
        ctx.rain.add(RainField::from_raw(0x1003), at(2024, 1, 9, 23, 50));
        assert_eq!(ctx.rain.today_clicks(), 3);

        ctx.start_day();
        assert_eq!(ctx.rain.today_clicks(), 0);
        assert_eq!(ctx.rain.year_clicks(), 3);
    }

    #[test]
    fn test_year_change_restarts_counter() {
        let mut rain = RainCounters::new();
        rain.add(RainField::from_raw(0x1010), at(2023, 12, 31, 23, 55));
        assert_eq!(rain.year_clicks(), 16);

        rain.add(RainField::from_raw(0x1002), at(2024, 1, 1, 0, 0));
        assert_eq!(rain.year_clicks(), 2);
    }

    #[test]
    fn test_counter_uses_collector_measure() {
        let units = UnitConverter::default();
        let mut rain = RainCounters::new();
        rain.add(RainField::from_raw(0x2005), at(2024, 3, 9, 10, 0));

        assert!((rain.counter(&units) - 1.0).abs() < 1e-9);
        assert!((rain.today(&units) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_session_reset() {
        let mut session = SessionExtrema {
            chill_minutes: 30,
            samples: 3,
            ..Default::default()
        };
        session.reset();
        assert_eq!(session, SessionExtrema::default());
    }
}
