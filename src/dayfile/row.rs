//! Day file row layout.
//!
//! A row has 55 positional fields: the date, then each quantity's value
//! followed by its time where it has one. Quantities that were never
//! observed are written as empty fields, and an empty field reads back as
//! "not observed".

use crate::constants::{DATE_FORMAT, DAY_FILE_FIELDS, TIME_FORMAT};
use crate::dayfile::record::DayRecord;
use crate::models::Extreme;
use crate::units::{UnitConverter, fixed};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use csv::StringRecord;

/// Positions of the fields that cannot be empty
pub mod mandatory {
    pub const DATE: usize = 0;
    pub const HIGH_GUST: usize = 1;
    pub const LOW_TEMP: usize = 4;
    pub const HIGH_TEMP: usize = 6;
    pub const LOW_PRESS: usize = 8;
    pub const HIGH_PRESS: usize = 10;
}

/// A field that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: usize,
    pub value: String,
    pub reason: String,
}

// =============================================================================
// Formatting
// =============================================================================

struct RowBuilder {
    fields: Vec<String>,
}

impl RowBuilder {
    fn new() -> Self {
        Self {
            fields: Vec::with_capacity(DAY_FILE_FIELDS),
        }
    }

    fn push(&mut self, field: String) {
        self.fields.push(field);
    }

    fn value<T: Copy>(&mut self, value: Option<T>, fmt: impl Fn(T) -> String) {
        self.push(value.map(fmt).unwrap_or_default());
    }

    fn extreme<T: Copy>(&mut self, extreme: &Option<Extreme<T>>, fmt: impl Fn(T) -> String) {
        match extreme {
            Some(e) => {
                self.push(fmt(e.value));
                self.push(e.time.format(TIME_FORMAT).to_string());
            }
            None => {
                self.push(String::new());
                self.push(String::new());
            }
        }
    }
}

/// Render a day as its 55 fields, or `None` if a mandatory quantity is
/// missing
pub fn format_row(rec: &DayRecord, units: &UnitConverter) -> Option<Vec<String>> {
    if !rec.is_complete() {
        return None;
    }

    let temp = |v: f64| units.fmt_temp(v);
    let rain = |v: f64| units.fmt_rain(v);
    let one_dp = |v: f64| fixed(v, 1);
    let int = |v: i32| v.to_string();

    let mut row = RowBuilder::new();
    row.push(rec.date.format(DATE_FORMAT).to_string());

    let gust = rec.high_gust?;
    row.push(units.fmt_wind(gust.value));
    row.push(rec.high_gust_bearing.to_string());
    row.push(gust.time.format(TIME_FORMAT).to_string());

    row.extreme(&rec.low_temp, temp);
    row.extreme(&rec.high_temp, temp);
    row.extreme(&rec.low_press, |v| units.fmt_press(v));
    row.extreme(&rec.high_press, |v| units.fmt_press(v));
    row.extreme(&rec.high_rain_rate, rain);
    row.value(rec.total_rain, rain);
    row.value(rec.avg_temp, temp);
    row.value(rec.wind_run, |v| fixed(v, units.decimals.wind_run));
    row.extreme(&rec.high_avg_wind, |v| units.fmt_wind_avg(v));
    row.extreme(&rec.low_humidity, int);
    row.extreme(&rec.high_humidity, int);
    row.value(rec.et, |v| units.fmt_et(v));
    row.value(rec.sunshine_hours, |v| units.fmt_sunshine(v));
    row.extreme(&rec.high_heat_index, temp);
    row.extreme(&rec.high_app_temp, temp);
    row.extreme(&rec.low_app_temp, temp);
    row.extreme(&rec.high_hourly_rain, rain);
    row.extreme(&rec.low_wind_chill, temp);
    row.extreme(&rec.high_dew_point, temp);
    row.extreme(&rec.low_dew_point, temp);
    row.value(rec.dominant_wind_bearing, int);
    row.value(rec.heating_degree_days, one_dp);
    row.value(rec.cooling_degree_days, one_dp);
    row.extreme(&rec.high_solar, int);
    row.extreme(&rec.high_uv, |v| units.fmt_uv(v));
    row.extreme(&rec.high_feels_like, temp);
    row.extreme(&rec.low_feels_like, temp);
    row.extreme(&rec.high_humidex, temp);
    row.value(rec.chill_hours, one_dp);
    row.extreme(&rec.high_rain_24h, rain);

    debug_assert_eq!(row.fields.len(), DAY_FILE_FIELDS);
    Some(row.fields)
}

// =============================================================================
// Parsing
// =============================================================================

struct RowParser<'a> {
    record: &'a StringRecord,
    date: NaiveDate,
    rollover_hour: u32,
}

impl RowParser<'_> {
    fn raw(&self, idx: usize) -> &str {
        self.record.get(idx).unwrap_or("").trim()
    }

    fn error(&self, idx: usize, reason: &str) -> FieldError {
        FieldError {
            field: idx,
            value: self.raw(idx).to_string(),
            reason: reason.to_string(),
        }
    }

    fn number(&self, idx: usize) -> Result<Option<f64>, FieldError> {
        let raw = self.raw(idx);
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(self.error(idx, "not a number")),
        }
    }

    fn integer(&self, idx: usize) -> Result<Option<i32>, FieldError> {
        Ok(self.number(idx)?.map(|v| v.round() as i32))
    }

    /// Times before the rollover hour belong to the following calendar day
    fn time(&self, idx: usize) -> Result<Option<NaiveDateTime>, FieldError> {
        let raw = self.raw(idx);
        if raw.is_empty() {
            return Ok(None);
        }
        let time = NaiveTime::parse_from_str(raw, TIME_FORMAT)
            .map_err(|_| self.error(idx, "not a time of day (HH:MM)"))?;

        let stamp = self.date.and_time(time);
        if self.rollover_hour != 0 && time.hour() < self.rollover_hour {
            return Ok(stamp.checked_add_days(Days::new(1)));
        }
        Ok(Some(stamp))
    }

    /// Value at `idx` with its time at `idx + 1`
    fn extreme<T>(
        &self,
        idx: usize,
        value: fn(&Self, usize) -> Result<Option<T>, FieldError>,
    ) -> Result<Option<Extreme<T>>, FieldError> {
        let Some(v) = value(self, idx)? else {
            return Ok(None);
        };
        match self.time(idx + 1)? {
            Some(time) => Ok(Some(Extreme::new(v, time))),
            None => Err(self.error(idx + 1, "missing time for a recorded value")),
        }
    }

    fn required<T>(&self, idx: usize, value: Option<T>) -> Result<T, FieldError> {
        value.ok_or_else(|| self.error(idx, "required field is empty"))
    }
}

/// Parse one row. Empty fields are "not observed"; anything else that does
/// not parse is an error naming the field position.
pub fn parse_row(record: &StringRecord, rollover_hour: u32) -> Result<DayRecord, FieldError> {
    let raw_date = record.get(mandatory::DATE).unwrap_or("").trim();
    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| FieldError {
        field: mandatory::DATE,
        value: raw_date.to_string(),
        reason: "not a date (dd/mm/yy)".to_string(),
    })?;

    let p = RowParser {
        record,
        date,
        rollover_hour,
    };
    let num = RowParser::number;
    let int = RowParser::integer;

    let mut rec = DayRecord::new(date);

    // bearing sits between the gust value and its time
    let gust = p.required(mandatory::HIGH_GUST, p.number(mandatory::HIGH_GUST)?)?;
    rec.high_gust_bearing = p.integer(2)?.unwrap_or(0);
    let gust_time = p.required(3, p.time(3)?)?;
    rec.high_gust = Some(Extreme::new(gust, gust_time));

    let low_temp = p.extreme(mandatory::LOW_TEMP, num)?;
    rec.low_temp = Some(p.required(mandatory::LOW_TEMP, low_temp)?);
    let high_temp = p.extreme(mandatory::HIGH_TEMP, num)?;
    rec.high_temp = Some(p.required(mandatory::HIGH_TEMP, high_temp)?);
    let low_press = p.extreme(mandatory::LOW_PRESS, num)?;
    rec.low_press = Some(p.required(mandatory::LOW_PRESS, low_press)?);
    let high_press = p.extreme(mandatory::HIGH_PRESS, num)?;
    rec.high_press = Some(p.required(mandatory::HIGH_PRESS, high_press)?);

    rec.high_rain_rate = p.extreme(12, num)?;
    rec.total_rain = p.number(14)?;
    rec.avg_temp = p.number(15)?;
    rec.wind_run = p.number(16)?;
    rec.high_avg_wind = p.extreme(17, num)?;
    rec.low_humidity = p.extreme(19, int)?;
    rec.high_humidity = p.extreme(21, int)?;
    rec.et = p.number(23)?;
    rec.sunshine_hours = p.number(24)?;
    rec.high_heat_index = p.extreme(25, num)?;
    rec.high_app_temp = p.extreme(27, num)?;
    rec.low_app_temp = p.extreme(29, num)?;
    rec.high_hourly_rain = p.extreme(31, num)?;
    rec.low_wind_chill = p.extreme(33, num)?;
    rec.high_dew_point = p.extreme(35, num)?;
    rec.low_dew_point = p.extreme(37, num)?;
    rec.dominant_wind_bearing = p.integer(39)?;
    rec.heating_degree_days = p.number(40)?;
    rec.cooling_degree_days = p.number(41)?;
    rec.high_solar = p.extreme(42, int)?;
    rec.high_uv = p.extreme(44, num)?;
    rec.high_feels_like = p.extreme(46, num)?;
    rec.low_feels_like = p.extreme(48, num)?;
    rec.high_humidex = p.extreme(50, num)?;
    rec.chill_hours = p.number(52)?;
    rec.high_rain_24h = p.extreme(53, num)?;

    Ok(rec)
}
