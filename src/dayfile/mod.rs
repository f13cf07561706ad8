//! Day file aggregation.
//!
//! Keeps one [`DayRecord`] per date, seeded from the existing `dayfile.txt`
//! and updated from the daily summary records and the interval session
//! extremes. The whole file is rewritten once at the end of a run.
//!
//! Summary values are range checked in device units before conversion; a
//! value outside its plausible range is ignored without affecting the rest
//! of the record. Highs and lows only move on a strictly better value, so
//! the first occurrence of a tie is kept.

pub mod record;
pub mod row;

pub use record::DayRecord;

use crate::calibration::Calibration;
use crate::config::ImportConfig;
use crate::constants::{BYTE_SENTINEL, DATE_FORMAT, ranges};
use crate::error::{Result, WlkError};
use crate::logfile::session::SessionExtrema;
use crate::models::{lower, raise};
use crate::output;
use crate::units::UnitConverter;
use crate::wlk::records::{DailySummary1, DailySummary2, Summary1Time, Summary2Time};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

fn open_range(value: f64, (min, max): (f64, f64)) -> bool {
    value > min && value < max
}

fn half_open_range(value: f64, (min, max): (f64, f64)) -> bool {
    value >= min && value < max
}

fn closed_range(value: f64, (min, max): (f64, f64)) -> bool {
    value >= min && value <= max
}

/// `minutes` past midnight on `date`
fn minutes_past(date: NaiveDate, minutes: u16) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + TimeDelta::minutes(i64::from(minutes))
}

#[derive(Debug)]
pub struct DayFile {
    records: BTreeMap<NaiveDate, DayRecord>,
    units: UnitConverter,
    calibration: Calibration,
    rollover_hour: u32,
    chill_season_start: u32,
}

impl DayFile {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            records: BTreeMap::new(),
            units: config.converter(),
            calibration: config.calibration.clone(),
            rollover_hour: config.station.rollover_hour,
            chill_season_start: config.chill_hours.season_start,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.records.get(&date)
    }

    pub fn iter(&self) -> btree_map::Values<'_, NaiveDate, DayRecord> {
        self.records.values()
    }

    fn entry(&mut self, date: NaiveDate) -> &mut DayRecord {
        self.records
            .entry(date)
            .or_insert_with(|| DayRecord::new(date))
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load an existing day file. A missing file is not an error.
    pub fn load(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            info!(
                "No day file found at {}, a new one will be created",
                path.display()
            );
            return Ok(0);
        }

        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|source| WlkError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        let count = self.read_rows(reader, path)?;
        info!("Loaded {} days from {}", count, path.display());
        Ok(count)
    }

    /// Load rows from any reader; `path` is only used in error reports
    pub fn load_from_reader<R: Read>(&mut self, reader: R, path: &Path) -> Result<usize> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        self.read_rows(reader, path)
    }

    fn read_rows<R: Read>(&mut self, mut reader: csv::Reader<R>, path: &Path) -> Result<usize> {
        let mut record = StringRecord::new();
        let mut count = 0;

        while reader
            .read_record(&mut record)
            .map_err(|source| WlkError::Csv {
                path: path.to_path_buf(),
                source,
            })?
        {
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let line = record
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or(count + 1);

            let rec = row::parse_row(&record, self.rollover_hour).map_err(|e| {
                WlkError::DayFileParse {
                    path: path.to_path_buf(),
                    line,
                    field: e.field,
                    value: e.value,
                    reason: e.reason,
                }
            })?;

            if self.records.contains_key(&rec.date) {
                return Err(WlkError::DuplicateDay {
                    path: path.to_path_buf(),
                    line,
                    date: rec.date.format(DATE_FORMAT).to_string(),
                });
            }
            self.records.insert(rec.date, rec);
            count += 1;
        }

        Ok(count)
    }

    // =========================================================================
    // Folding
    // =========================================================================

    /// Merge a first daily summary into the record for `date`
    pub fn fold_summary1(&mut self, date: NaiveDate, rec: &DailySummary1) {
        let units = self.units;
        let cal = &self.calibration;
        let day = self
            .records
            .entry(date)
            .or_insert_with(|| DayRecord::new(date));
        let at = |slot: Summary1Time| minutes_past(date, rec.time(slot));
        let tenths = |raw: i16| f64::from(raw) / 10.0;
        let thousandths = |raw: i16| f64::from(raw) / 1000.0;

        // Outdoor temperature
        let raw = tenths(rec.outside_temp_hi);
        if open_range(raw, ranges::TEMP_F) {
            let value = cal.temp.calibrate(units.temp_f_to_user(raw));
            raise(&mut day.high_temp, value, at(Summary1Time::HighTemp));
        }
        let raw = tenths(rec.outside_temp_low);
        if open_range(raw, ranges::TEMP_F) {
            let value = cal.temp.calibrate(units.temp_f_to_user(raw));
            lower(&mut day.low_temp, value, at(Summary1Time::LowTemp));
        }
        let raw = tenths(rec.outside_temp_avg);
        if open_range(raw, ranges::TEMP_F) {
            day.avg_temp = Some(cal.temp.calibrate(units.temp_f_to_user(raw)));
        }

        // Wind chill and dew point are derived, so no calibration
        let raw = tenths(rec.wind_chill_low);
        if open_range(raw, ranges::TEMP_F) {
            let value = units.temp_f_to_user(raw);
            lower(&mut day.low_wind_chill, value, at(Summary1Time::LowWindChill));
        }
        let raw = tenths(rec.dew_point_hi);
        if open_range(raw, ranges::TEMP_F) {
            let value = units.temp_f_to_user(raw);
            raise(&mut day.high_dew_point, value, at(Summary1Time::HighDewPoint));
        }
        let raw = tenths(rec.dew_point_low);
        if open_range(raw, ranges::TEMP_F) {
            let value = units.temp_f_to_user(raw);
            lower(&mut day.low_dew_point, value, at(Summary1Time::LowDewPoint));
        }

        // Humidity is held as whole percent
        let value = cal.hum.calibrate(tenths(rec.outside_humidity_hi));
        if closed_range(value, ranges::HUMIDITY) {
            raise(
                &mut day.high_humidity,
                value as i32,
                at(Summary1Time::HighHumidity),
            );
        }
        let value = cal.hum.calibrate(tenths(rec.outside_humidity_low));
        if closed_range(value, ranges::HUMIDITY) {
            lower(
                &mut day.low_humidity,
                value as i32,
                at(Summary1Time::LowHumidity),
            );
        }

        // Pressure: the high is converted then calibrated, the low is
        // calibrated in inHg and range checked after calibration
        let raw = thousandths(rec.barometer_hi);
        if open_range(raw, ranges::PRESS_INHG) {
            let value = cal.press.calibrate(units.press_inhg_to_user(raw));
            raise(&mut day.high_press, value, at(Summary1Time::HighBarometer));
        }
        let calibrated = cal.press.calibrate(thousandths(rec.barometer_low));
        if open_range(calibrated, ranges::PRESS_INHG) {
            let value = units.press_inhg_to_user(calibrated);
            lower(&mut day.low_press, value, at(Summary1Time::LowBarometer));
        }

        // Wind
        let raw = tenths(rec.wind_gust_hi);
        if half_open_range(raw, ranges::WIND_MPH) {
            let value = cal.wind_gust.calibrate(units.wind_mph_to_user(raw));
            if raise(&mut day.high_gust, value, at(Summary1Time::HighGust))
                && rec.wind_dir_gust_hi != BYTE_SENTINEL
            {
                day.high_gust_bearing = i32::from(rec.wind_dir_gust_hi) * 360 / 16;
            }
        }
        let raw = tenths(rec.wind_avg_hi);
        if half_open_range(raw, ranges::WIND_MPH) {
            let value = cal.wind_speed.calibrate(units.wind_mph_to_user(raw));
            raise(&mut day.high_avg_wind, value, at(Summary1Time::HighAvgWind));
        }

        // Rain
        let raw = thousandths(rec.rain_rate_hi);
        if half_open_range(raw, ranges::RAIN_RATE) {
            let value = cal.rain.calibrate(units.rain_in_to_user(raw));
            raise(&mut day.high_rain_rate, value, at(Summary1Time::HighRainRate));
        }

        let value = cal.uv.calibrate(tenths(i16::from(rec.uv_hi)));
        if half_open_range(value, ranges::UV) {
            raise(&mut day.high_uv, value, at(Summary1Time::HighUv));
        }

        // Totals are range checked calibrated but stored uncalibrated
        let raw = thousandths(rec.daily_rain_total);
        if half_open_range(cal.rain.calibrate(raw), ranges::DAILY_RAIN) {
            let value = units.rain_in_to_user(raw);
            if day.total_rain.is_none_or(|total| value > total) {
                day.total_rain = Some(value);
            }
        }
        let raw = tenths(rec.wind_run);
        if half_open_range(cal.wind_speed.calibrate(raw), ranges::WIND_RUN) {
            let value = units.miles_to_user(raw);
            if day.wind_run.is_none_or(|run| value > run) {
                day.wind_run = Some(value);
            }
        }
    }

    /// Merge a second daily summary into the record for `date`
    pub fn fold_summary2(&mut self, date: NaiveDate, rec: &DailySummary2) {
        let units = self.units;
        let day = self.entry(date);
        let at = |slot: Summary2Time| minutes_past(date, rec.time(slot));

        if rec.solar_hi != i16::MAX && rec.solar_hi >= 0 {
            raise(
                &mut day.high_solar,
                i32::from(rec.solar_hi),
                at(Summary2Time::HighSolar),
            );
        }

        let raw = f64::from(rec.daily_et) / 1000.0;
        if half_open_range(raw, ranges::ET) {
            day.et = Some(units.rain_in_to_user(raw));
        }

        let raw = f64::from(rec.heat_index_hi) / 10.0;
        if open_range(raw, ranges::TEMP_F) {
            let value = units.temp_f_to_user(raw);
            raise(&mut day.high_heat_index, value, at(Summary2Time::HighHeatIndex));
        }

        let raw = f64::from(rec.heat_degree_days) / 10.0;
        if open_range(raw, ranges::DEGREE_DAYS) {
            day.heating_degree_days = Some(units.degree_days_f_to_user(raw));
        }
        let raw = f64::from(rec.cool_degree_days) / 10.0;
        if open_range(raw, ranges::DEGREE_DAYS) {
            day.cooling_degree_days = Some(units.degree_days_f_to_user(raw));
        }

        let (min, max) = ranges::SUNSHINE_MINUTES;
        if (min..=max).contains(&rec.sunlight_minutes) {
            day.sunshine_hours = Some(f64::from(rec.sunlight_minutes) / 60.0);
        }
    }

    /// Copy the interval-derived extremes of a day into its record and
    /// extend the running chill-hour total
    pub fn fold_session(&mut self, date: NaiveDate, session: &SessionExtrema) {
        let previous_chill = if date.day() == 1 && date.month() == self.chill_season_start {
            0.0
        } else {
            date.pred_opt()
                .and_then(|prev| self.records.get(&prev))
                .and_then(|prev| prev.chill_hours)
                .unwrap_or(0.0)
        };

        let day = self.entry(date);
        if session.humidex_high.is_some() {
            day.high_humidex = session.humidex_high;
        }
        if session.apparent_high.is_some() {
            day.high_app_temp = session.apparent_high;
        }
        if session.apparent_low.is_some() {
            day.low_app_temp = session.apparent_low;
        }
        if session.feels_like_high.is_some() {
            day.high_feels_like = session.feels_like_high;
        }
        if session.feels_like_low.is_some() {
            day.low_feels_like = session.feels_like_low;
        }
        if session.samples > 0 {
            day.chill_hours = Some(previous_chill + f64::from(session.chill_minutes) / 60.0);
        }
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Rows for every complete day, in date order
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.values().filter_map(|rec| {
            let row = row::format_row(rec, &self.units);
            if row.is_none() {
                debug!(
                    "Day {} is missing a mandatory value, not written",
                    rec.date.format(DATE_FORMAT)
                );
            }
            row
        })
    }

    /// Rewrite the day file, keeping a backup of the previous one
    pub fn write(&self, path: &Path) -> Result<usize> {
        let count = output::write_file(path, self.rows())?;
        info!("Wrote {} days to {}", count, path.display());
        Ok(count)
    }
}
