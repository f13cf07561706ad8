//! Monthly extra-sensor log (`ExtraLogYYYYMMlog.txt`).
//!
//! Soil, leaf and extra temperature/humidity channels. Samples where every
//! channel reports "not present" are skipped entirely.

use crate::config::ImportConfig;
use crate::constants::{
    BYTE_SENTINEL, BYTE_TEMP_OFFSET, DATE_FORMAT, EXTRA_LOG_DATA_FIELDS, TIME_FORMAT,
};
use crate::logfile::{MonthLog, extra_log_file_name};
use crate::meteo;
use crate::units::UnitConverter;
use crate::wlk::records::ArchiveRecord;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::debug;

const EXTRA_CHANNELS: usize = 10;
const SOIL_CHANNELS: usize = 16;
const LEAF_CHANNELS: usize = 2;

/// One extra-sensor sample in display units; absent channels are zero
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraLogRecord {
    pub timestamp: NaiveDateTime,
    pub temperature: [f64; EXTRA_CHANNELS],
    pub humidity: [i32; EXTRA_CHANNELS],
    pub dew_point: [f64; EXTRA_CHANNELS],
    pub soil_temp: [f64; SOIL_CHANNELS],
    pub soil_moisture: [i32; SOIL_CHANNELS],
    pub leaf_wetness: [i32; LEAF_CHANNELS],
}

impl ExtraLogRecord {
    fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            temperature: [0.0; EXTRA_CHANNELS],
            humidity: [0; EXTRA_CHANNELS],
            dew_point: [0.0; EXTRA_CHANNELS],
            soil_temp: [0.0; SOIL_CHANNELS],
            soil_moisture: [0; SOIL_CHANNELS],
            leaf_wetness: [0; LEAF_CHANNELS],
        }
    }

    fn to_row(&self, units: &UnitConverter) -> Vec<String> {
        let zeros = |n: usize| std::iter::repeat_n("0".to_string(), n);
        let temp = |v: &f64| units.fmt_temp(*v);
        let int = |v: &i32| v.to_string();

        let mut row = vec![
            self.timestamp.format(DATE_FORMAT).to_string(),
            self.timestamp.format(TIME_FORMAT).to_string(),
        ];
        row.extend(self.temperature.iter().map(temp));
        row.extend(self.humidity.iter().map(int));
        row.extend(self.dew_point.iter().map(temp));
        row.extend(self.soil_temp[..4].iter().map(temp));
        row.extend(self.soil_moisture[..4].iter().map(int));
        row.extend(zeros(4)); // leaf temperature
        row.extend(self.leaf_wetness.iter().map(int));
        row.extend(self.soil_temp[4..].iter().map(temp));
        row.extend(self.soil_moisture[4..].iter().map(int));
        row.extend(zeros(4)); // air quality
        row.extend(zeros(4)); // air quality average
        row.extend(zeros(8)); // user temperatures
        row.extend(zeros(8)); // CO2 sensor
        debug_assert_eq!(row.len(), 2 + EXTRA_LOG_DATA_FIELDS);
        row
    }
}

/// True if every channel the extra log writes reports "not present"
fn logged_channels_disconnected(rec: &ArchiveRecord) -> bool {
    rec.soil_temp
        .iter()
        .chain(&rec.soil_moisture)
        .chain(rec.leaf_wetness.iter().take(LEAF_CHANNELS))
        .chain(&rec.extra_temp)
        .chain(&rec.extra_humidity)
        .all(|&b| b == BYTE_SENTINEL)
}

/// Buffers one month of extra-sensor samples
#[derive(Debug)]
pub struct ExtraLog {
    records: BTreeMap<NaiveDateTime, ExtraLogRecord>,
    units: UnitConverter,
}

impl ExtraLog {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            records: BTreeMap::new(),
            units: config.converter(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, ts: NaiveDateTime) -> Option<&ExtraLogRecord> {
        self.records.get(&ts)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.keys().next_back().copied()
    }

    fn byte_temp(&self, raw: u8) -> f64 {
        self.units
            .temp_f_to_user(f64::from(i32::from(raw) - BYTE_TEMP_OFFSET))
    }

    /// Returns false if the sample carried no extra-sensor data
    pub fn add_sample(&mut self, rec: &ArchiveRecord, ts: NaiveDateTime) -> bool {
        if logged_channels_disconnected(rec) {
            debug!("Skipping extra log entry for {}", ts);
            return false;
        }

        let mut out = ExtraLogRecord::new(ts);
        let present = |b: u8| b != BYTE_SENTINEL;

        for (i, &raw) in rec.soil_temp.iter().enumerate() {
            if present(raw) {
                out.soil_temp[i] = self.byte_temp(raw);
            }
        }
        for (i, &raw) in rec.soil_moisture.iter().enumerate() {
            if present(raw) {
                out.soil_moisture[i] = i32::from(raw);
            }
        }
        for (i, &raw) in rec.leaf_wetness.iter().take(LEAF_CHANNELS).enumerate() {
            if present(raw) {
                out.leaf_wetness[i] = i32::from(raw);
            }
        }
        for (i, (&temp, &hum)) in rec.extra_temp.iter().zip(&rec.extra_humidity).enumerate() {
            if present(temp) {
                out.temperature[i] = self.byte_temp(temp);
            }
            if present(hum) {
                out.humidity[i] = i32::from(hum);
            }
            if present(temp) && present(hum) {
                let temp_c = self.units.user_temp_to_c(out.temperature[i]);
                out.dew_point[i] = self
                    .units
                    .temp_c_to_user(meteo::dew_point(temp_c, f64::from(hum)));
            }
        }

        self.records.insert(ts, out);
        true
    }

    pub fn flush(&mut self) -> Option<MonthLog> {
        let first = *self.records.keys().next()?;
        let records = std::mem::take(&mut self.records);
        let rows = records
            .values()
            .map(|rec| rec.to_row(&self.units))
            .collect();

        Some(MonthLog {
            file_name: extra_log_file_name(first),
            rows,
        })
    }

    pub fn reset(&mut self) -> usize {
        let dropped = self.records.len();
        self.records.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{PressureUnit, RainUnit, TempUnit, WindUnit};
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn with_channels() -> ArchiveRecord {
        ArchiveRecord {
            soil_temp: [150, 255, 255, 255, 255, 140],
            soil_moisture: [23, 255, 255, 255, 255, 255],
            leaf_wetness: [255, 4, 255, 255],
            extra_temp: [160, 145, 255, 255, 255, 255, 255],
            extra_humidity: [61, 255, 255, 255, 255, 255, 255],
            ..Default::default()
        }
    }

    #[test]
    fn test_disconnected_sample_is_skipped() {
        let mut log = ExtraLog::new(&ImportConfig::default());
        assert!(!log.add_sample(&ArchiveRecord::default(), at(10, 0)));
        assert!(log.is_empty());
        assert_eq!(log.flush(), None);
    }

    #[test]
    fn test_unlogged_leaf_channels_do_not_keep_sample() {
        let mut rec = ArchiveRecord::default();
        rec.leaf_wetness[2] = 7;
        rec.leaf_wetness[3] = 0;

        let mut log = ExtraLog::new(&ImportConfig::default());
        assert!(!log.add_sample(&rec, at(10, 0)));
        assert!(log.is_empty());

        rec.leaf_wetness[1] = 5;
        assert!(log.add_sample(&rec, at(10, 5)));
        assert_eq!(log.get(at(10, 5)).unwrap().leaf_wetness, [0, 5]);
    }

    #[test]
    fn test_channel_values_fahrenheit() {
        let config = ImportConfig::default().with_units(
            TempUnit::Fahrenheit,
            PressureUnit::Mb,
            WindUnit::Mph,
            RainUnit::Mm,
        );
        let mut log = ExtraLog::new(&config);
        assert!(log.add_sample(&with_channels(), at(10, 0)));

        let rec = log.get(at(10, 0)).unwrap();
        assert_eq!(rec.temperature[0], 70.0);
        assert_eq!(rec.temperature[1], 55.0);
        assert_eq!(rec.temperature[2], 0.0);
        assert_eq!(rec.humidity[0], 61);
        assert_eq!(rec.soil_temp[0], 60.0);
        assert_eq!(rec.soil_temp[5], 50.0);
        assert_eq!(rec.soil_moisture[0], 23);
        assert_eq!(rec.leaf_wetness, [0, 4]);

        // Dew point only where both temperature and humidity exist, and
        // computed from the converted temperature
        let expected = meteo::c_to_f(meteo::dew_point(meteo::f_to_c(70.0), 61.0));
        assert!((rec.dew_point[0] - expected).abs() < 1e-9);
        assert!(rec.dew_point[0] < 70.0);
        assert_eq!(rec.dew_point[1], 0.0);
    }

    #[test]
    fn test_row_layout() {
        let mut log = ExtraLog::new(&ImportConfig::default());
        log.add_sample(&with_channels(), at(10, 5));

        let month = log.flush().unwrap();
        assert_eq!(month.file_name, "ExtraLog202403log.txt");
        let row = &month.rows[0];
        assert_eq!(row.len(), 94);
        assert_eq!(row[0], "09/03/24");
        assert_eq!(row[1], "10:05");
        // 70 °F
        assert_eq!(row[2], "21.1");
        assert_eq!(row[4], "0.0");
        assert_eq!(row[12], "61");
        assert_eq!(row[13], "0");
        // soil temp 1 and moisture 1
        assert_eq!(row[32], "15.6");
        assert_eq!(row[36], "23");
        // leaf temperature placeholders then leaf wetness
        assert_eq!(&row[40..44], &["0", "0", "0", "0"]);
        assert_eq!(row[44], "0");
        assert_eq!(row[45], "4");
        // soil temp 6 lands in the second soil block
        assert_eq!(row[47], "10.0");
        assert!(row[70..].iter().all(|f| f == "0"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut log = ExtraLog::new(&ImportConfig::default());
        log.add_sample(&with_channels(), at(10, 0));
        assert_eq!(log.last_timestamp(), Some(at(10, 0)));
        assert_eq!(log.reset(), 1);
        assert!(log.is_empty());
    }
}
