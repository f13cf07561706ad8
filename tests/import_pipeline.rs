//! End-to-end import through the public API

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wlk_import::wlk::records::{ArchiveRecord, DailySummary1, Summary1Time};
use wlk_import::{ImportConfig, WlkError, WlkFileBuilder, WlkImporter, WlkRecord};

const CONFIG: &str = r#"
[station]
latitude = 51.5
longitude = -0.1
station_type = 1

[units]
temperature = "fahrenheit"
pressure = "inhg"
wind = "mph"
rain = "in"

[calibration.temp]
offset = 1.0
"#;

fn archive(packed_time: i16) -> WlkRecord {
    WlkRecord::Archive(ArchiveRecord {
        packed_time,
        outside_temp: 600,
        inside_temp: 700,
        barometer: 29_921,
        outside_humidity: 650,
        inside_humidity: 400,
        wind_speed: 50,
        wind_speed_gust: 120,
        wind_dir: 8,
        ..Default::default()
    })
}

fn summary() -> WlkRecord {
    let mut rec = DailySummary1 {
        outside_temp_hi: 721,
        outside_temp_low: 488,
        outside_temp_avg: 600,
        barometer_hi: 30_012,
        barometer_low: 29_850,
        wind_gust_hi: 254,
        wind_dir_gust_hi: 4,
        ..Default::default()
    };
    rec.times[Summary1Time::HighTemp as usize] = 14 * 60;
    rec.times[Summary1Time::LowTemp as usize] = 6 * 60;
    rec.times[Summary1Time::HighGust as usize] = 13 * 60 + 42;
    WlkRecord::Summary1(rec)
}

fn station_root() -> TempDir {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("importwlk.toml"), CONFIG).unwrap();
    fs::create_dir_all(root.path().join("wlk")).unwrap();
    root
}

fn importer(root: &Path) -> WlkImporter {
    let config = ImportConfig::load(&root.join("importwlk.toml")).unwrap();
    WlkImporter::new(config, root.join("wlk"), root.join("data"))
}

#[test]
fn test_import_two_months() {
    let root = station_root();
    WlkFileBuilder::new()
        .day(30, vec![summary(), archive(720)])
        .day(31, vec![summary(), archive(720), archive(1440)])
        .write_to(&root.path().join("wlk").join("2023-12.wlk"))
        .unwrap();
    WlkFileBuilder::new()
        .day(1, vec![summary(), archive(5)])
        .write_to(&root.path().join("wlk").join("2024-01.wlk"))
        .unwrap();

    let stats = importer(root.path()).run().unwrap();

    assert_eq!(stats.files_found, 2);
    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.archive_records, 4);
    assert_eq!(stats.summary_records, 3);
    assert_eq!(stats.day_rows_written, 3);

    let data = root.path().join("data");
    let dec = fs::read_to_string(data.join("202312log.txt")).unwrap();
    let dec_rows: Vec<&str> = dec.lines().collect();
    assert_eq!(dec_rows.len(), 2);
    let fields: Vec<&str> = dec_rows[0].split(',').collect();
    assert_eq!(fields[0], "30/12/23");
    assert_eq!(fields[1], "12:00");
    // 60.0 °F plus the one degree calibration offset
    assert_eq!(fields[2], "61.0");
    assert_eq!(fields[3], "65");
    // direction code 8
    assert_eq!(fields[7], "180");

    let jan = fs::read_to_string(data.join("202401log.txt")).unwrap();
    let jan_rows: Vec<&str> = jan.lines().collect();
    assert_eq!(jan_rows.len(), 2);
    assert!(jan_rows[0].starts_with("01/01/24,00:00,"));

    let day_file = fs::read_to_string(data.join("dayfile.txt")).unwrap();
    let dates: Vec<&str> = day_file
        .lines()
        .map(|line| line.split(',').next().unwrap_or(""))
        .collect();
    assert_eq!(dates, vec!["30/12/23", "31/12/23", "01/01/24"]);
}

#[test]
fn test_rerun_backs_up_outputs() {
    let root = station_root();
    WlkFileBuilder::new()
        .day(5, vec![summary(), archive(600)])
        .write_to(&root.path().join("wlk").join("2024-03.wlk"))
        .unwrap();

    importer(root.path()).run().unwrap();
    let second = importer(root.path()).run().unwrap();
    assert_eq!(second.day_rows_written, 1);

    let data = root.path().join("data");
    assert!(data.join("dayfile.txt.sav").exists());
    assert!(data.join("202403log.txt.sav").exists());
    assert_eq!(
        fs::read_to_string(data.join("dayfile.txt")).unwrap(),
        fs::read_to_string(data.join("dayfile.txt.sav")).unwrap()
    );
}

#[test]
fn test_missing_config_file() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("importwlk.toml");

    match ImportConfig::load(&path).unwrap_err() {
        WlkError::ConfigNotFound { path: missing } => assert_eq!(missing, path),
        other => panic!("Expected ConfigNotFound, got {:?}", other),
    }
}
