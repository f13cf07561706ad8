//! Monthly interval log (`YYYYMMlog.txt`).

use crate::calibration::Calibration;
use crate::config::{ImportConfig, SolarOptions};
use crate::constants::{
    BYTE_SENTINEL, DATE_FORMAT, LOG_FILE_FIELDS, RAW_BYTE_READING_MAX, RAW_HUMIDITY_MAX,
    RAW_TEMP_MISSING, TIME_FORMAT,
};
use crate::logfile::session::SessionContext;
use crate::logfile::{MonthLog, log_file_name};
use crate::meteo;
use crate::models::{lower, raise};
use crate::solar;
use crate::units::UnitConverter;
use crate::wlk::records::ArchiveRecord;
use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// One converted archive sample. Values are in display units; derived
/// quantities that could not be computed are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalLogRecord {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: i32,
    pub dew_point: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub wind_bearing: i32,
    pub rain_rate: f64,
    pub rain_today: f64,
    pub pressure: f64,
    pub rain_counter: f64,
    pub inside_temp: f64,
    pub inside_humidity: i32,
    pub wind_chill: f64,
    pub heat_index: f64,
    pub uv: f64,
    pub solar: i32,
    pub et: f64,
    pub apparent_temp: f64,
    pub solar_max: i32,
    pub feels_like: f64,
    pub humidex: f64,
}

impl IntervalLogRecord {
    fn to_row(&self, units: &UnitConverter) -> Vec<String> {
        let row = vec![
            self.timestamp.format(DATE_FORMAT).to_string(),
            self.timestamp.format(TIME_FORMAT).to_string(),
            units.fmt_temp(self.temperature),
            self.humidity.to_string(),
            units.fmt_temp(self.dew_point),
            units.fmt_wind_avg(self.wind_speed),
            units.fmt_wind(self.wind_gust),
            self.wind_bearing.to_string(),
            units.fmt_rain(self.rain_rate),
            units.fmt_rain(self.rain_today),
            units.fmt_press(self.pressure),
            units.fmt_rain(self.rain_counter),
            units.fmt_temp(self.inside_temp),
            self.inside_humidity.to_string(),
            units.fmt_wind(self.wind_gust),
            units.fmt_temp(self.wind_chill),
            units.fmt_temp(self.heat_index),
            units.fmt_uv(self.uv),
            self.solar.to_string(),
            units.fmt_et(self.et),
            "0.0".to_string(), // annual ET
            units.fmt_temp(self.apparent_temp),
            self.solar_max.to_string(),
            units.fmt_sunshine(0.0),
            self.wind_bearing.to_string(),
            units.fmt_rain(0.0), // RG-11
            units.fmt_rain(self.rain_today),
            units.fmt_temp(self.feels_like),
            units.fmt_temp(self.humidex),
        ];
        debug_assert_eq!(row.len(), LOG_FILE_FIELDS);
        row
    }
}

/// Site description for the theoretical solar maximum
#[derive(Debug, Clone, Copy)]
struct Site {
    latitude: f64,
    longitude: f64,
    altitude_m: f64,
    solar: SolarOptions,
}

impl Site {
    /// Archive timestamps are station local time
    fn solar_max(&self, ts: NaiveDateTime) -> i32 {
        let utc = Local
            .from_local_datetime(&ts)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&ts));
        solar::solar_max(
            utc,
            self.latitude,
            self.longitude,
            self.altitude_m,
            &self.solar,
        )
        .round() as i32
    }
}

/// Buffers one month of interval samples
#[derive(Debug)]
pub struct IntervalLog {
    records: BTreeMap<NaiveDateTime, IntervalLogRecord>,
    units: UnitConverter,
    calibration: Calibration,
    chill_threshold: f64,
    site: Site,
}

impl IntervalLog {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            records: BTreeMap::new(),
            units: config.converter(),
            calibration: config.calibration.clone(),
            chill_threshold: config.chill_threshold(),
            site: Site {
                latitude: config.station.latitude,
                longitude: config.station.longitude,
                altitude_m: config.station.altitude_m(),
                solar: config.solar.options(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, ts: NaiveDateTime) -> Option<&IntervalLogRecord> {
        self.records.get(&ts)
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.keys().next().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.keys().next_back().copied()
    }

    /// Convert one archive record and update the session state
    pub fn add_sample(&mut self, rec: &ArchiveRecord, ts: NaiveDateTime, ctx: &mut SessionContext) {
        let units = &self.units;
        let cal = &self.calibration;

        let temp_valid = rec.outside_temp > RAW_TEMP_MISSING;
        let hum_valid = (0..=RAW_HUMIDITY_MAX).contains(&rec.outside_humidity);
        let wind_valid = rec.wind_speed >= 0;

        let temperature = if temp_valid {
            cal.temp
                .calibrate(units.temp_f_to_user(f64::from(rec.outside_temp) / 10.0))
        } else {
            0.0
        };
        let inside_temp = if rec.inside_temp > RAW_TEMP_MISSING {
            cal.in_temp
                .calibrate(units.temp_f_to_user(f64::from(rec.inside_temp) / 10.0))
        } else {
            0.0
        };
        let humidity = if rec.outside_humidity < 0 {
            0
        } else {
            cal.hum.calibrate(f64::from(rec.outside_humidity) / 10.0) as i32
        };
        let inside_humidity = if rec.inside_humidity < 0 {
            0
        } else {
            cal.in_hum.calibrate(f64::from(rec.inside_humidity) / 10.0) as i32
        };
        let pressure = if rec.barometer < 0 {
            0.0
        } else {
            cal.press
                .calibrate(units.press_inhg_to_user(f64::from(rec.barometer) / 1000.0))
        };

        let wind_speed = if wind_valid {
            cal.wind_speed
                .calibrate(units.wind_mph_to_user(f64::from(rec.wind_speed) / 10.0))
        } else {
            0.0
        };
        let wind_gust = if rec.wind_speed_gust < 0 {
            0.0
        } else {
            cal.wind_gust
                .calibrate(units.wind_mph_to_user(f64::from(rec.wind_speed_gust) / 10.0))
        };
        let wind_bearing = if rec.wind_dir == BYTE_SENTINEL {
            0
        } else {
            (f64::from(rec.wind_dir) * 22.5 + cal.wind_dir.offset) as i32
        };

        // Rain
        ctx.rain.add(rec.rain, ts);
        let (bucket, measure) = rec.rain.collector.bucket();
        let rain_rate = if rec.rain_rate_hi < 0 {
            0.0
        } else {
            cal.rain
                .calibrate(units.rain_to_user(f64::from(rec.rain_rate_hi) * bucket, measure))
        };
        let rain_today = ctx.rain.today(units);
        let rain_counter = ctx.rain.counter(units);

        let solar = if rec.solar < 0 {
            0
        } else {
            cal.solar.calibrate(f64::from(rec.solar)) as i32
        };
        let uv = if rec.uv > RAW_BYTE_READING_MAX {
            0.0
        } else {
            cal.uv.calibrate(f64::from(rec.uv) / 10.0)
        };
        let et = if rec.et > RAW_BYTE_READING_MAX {
            0.0
        } else {
            units.rain_in_to_user(f64::from(rec.et) / 1000.0)
        };

        // Derived quantities are computed in °C
        let temp_c = units.user_temp_to_c(temperature);
        let hum = f64::from(humidity);
        let wind_kph = units.user_wind_to_kph(wind_speed);
        let to_user = |c: f64| units.temp_c_to_user(c);

        let wind_chill = if temp_valid && wind_valid {
            to_user(meteo::wind_chill(temp_c, wind_kph))
        } else {
            0.0
        };

        let (heat_index, humidex, dew_point) = if temp_valid && hum_valid {
            (
                to_user(meteo::heat_index(temp_c, hum)),
                to_user(meteo::humidex(temp_c, hum)),
                to_user(meteo::dew_point(temp_c, hum)),
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        let session = &mut ctx.extrema;
        if temp_valid && hum_valid {
            raise(&mut session.humidex_high, humidex, ts);
        }

        let (apparent_temp, feels_like) = if temp_valid && hum_valid && wind_valid {
            let apparent = to_user(meteo::apparent_temperature(
                temp_c,
                units.user_wind_to_ms(wind_speed),
                hum,
            ));
            let feels = to_user(meteo::feels_like(temp_c, wind_kph, hum));

            raise(&mut session.apparent_high, apparent, ts);
            lower(&mut session.apparent_low, apparent, ts);
            raise(&mut session.feels_like_high, feels, ts);
            lower(&mut session.feels_like_low, feels, ts);
            (apparent, feels)
        } else {
            (0.0, 0.0)
        };

        if temp_valid && temperature < self.chill_threshold {
            session.chill_minutes += u32::from(rec.archive_interval);
        }
        session.samples += 1;

        let record = IntervalLogRecord {
            timestamp: ts,
            temperature,
            humidity,
            dew_point,
            wind_speed,
            wind_gust,
            wind_bearing,
            rain_rate,
            rain_today,
            pressure,
            rain_counter,
            inside_temp,
            inside_humidity,
            wind_chill,
            heat_index,
            uv,
            solar,
            et,
            apparent_temp,
            solar_max: self.site.solar_max(ts),
            feels_like,
            humidex,
        };
        if self.records.insert(ts, record).is_some() {
            debug!("Replaced duplicate interval sample at {}", ts);
        }
    }

    /// Serialize the buffered month and clear it. Nothing to write yields
    /// `None`.
    pub fn flush(&mut self) -> Option<MonthLog> {
        let first = self.first_timestamp()?;
        let records = std::mem::take(&mut self.records);
        let rows = records
            .values()
            .map(|rec| rec.to_row(&self.units))
            .collect();

        Some(MonthLog {
            file_name: log_file_name(first),
            rows,
        })
    }

    /// Drop the buffered month without writing; returns the samples dropped
    pub fn reset(&mut self) -> usize {
        let dropped = self.records.len();
        self.records.clear();
        dropped
    }
}
