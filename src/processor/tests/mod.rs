//! Driver tests over synthetic WLK files
//!
//! Each test lays out a `wlk/` and `data/` directory in a temp dir and runs
//! the importer end to end.

pub mod month_rollover;

use crate::config::{ImportConfig, StationConfig};
use crate::processor::WlkImporter;
use crate::wlk::records::{ArchiveRecord, DailySummary1, Summary1Time, WlkRecord};
use crate::wlk::WlkFileBuilder;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Temp directory with an empty `wlk/` source directory
pub struct Fixture {
    pub temp_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("wlk")).unwrap();
        Self { temp_dir }
    }

    pub fn wlk_dir(&self) -> PathBuf {
        self.temp_dir.path().join("wlk")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    pub fn write_wlk(&self, name: &str, builder: WlkFileBuilder) {
        builder.write_to(&self.wlk_dir().join(name)).unwrap();
    }

    pub fn write_raw(&self, name: &str, bytes: &[u8]) {
        fs::write(self.wlk_dir().join(name), bytes).unwrap();
    }

    pub fn importer(&self) -> WlkImporter {
        WlkImporter::new(davis_config(), self.wlk_dir(), self.data_dir())
    }

    pub fn read_data(&self, name: &str) -> String {
        fs::read_to_string(self.data_dir().join(name)).unwrap()
    }

    pub fn data_exists(&self, name: &str) -> bool {
        self.data_dir().join(name).exists()
    }
}

/// Davis station, metric defaults
pub fn davis_config() -> ImportConfig {
    ImportConfig {
        station: StationConfig {
            station_type: 1,
            ..Default::default()
        },
        ..Default::default()
    }
    .validated()
}

/// Archive sample with the core outdoor channels populated
pub fn sample(packed_time: i16) -> WlkRecord {
    WlkRecord::Archive(ArchiveRecord {
        packed_time,
        outside_temp: 600,
        outside_temp_hi: 610,
        outside_temp_low: 590,
        inside_temp: 700,
        barometer: 29_921,
        outside_humidity: 650,
        inside_humidity: 400,
        wind_speed: 50,
        wind_speed_gust: 120,
        wind_dir: 4,
        ..Default::default()
    })
}

/// Daily summary carrying every mandatory day file field
pub fn summary1() -> WlkRecord {
    let mut rec = DailySummary1 {
        data_span: 1440,
        outside_temp_hi: 721,
        outside_temp_low: 488,
        outside_temp_avg: 600,
        outside_humidity_hi: 955,
        outside_humidity_low: 412,
        barometer_hi: 30_012,
        barometer_low: 29_850,
        wind_gust_hi: 254,
        wind_dir_gust_hi: 12,
        wind_run: 1205,
        ..Default::default()
    };
    rec.times[Summary1Time::HighTemp as usize] = 14 * 60;
    rec.times[Summary1Time::LowTemp as usize] = 6 * 60;
    rec.times[Summary1Time::HighGust as usize] = 13 * 60 + 42;
    WlkRecord::Summary1(rec)
}

pub fn lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.is_empty()).collect()
}
