//! Month boundary handling across consecutive files

use super::*;
use crate::wlk::records::RainField;

fn with_rain(record: WlkRecord, raw: u16) -> WlkRecord {
    match record {
        WlkRecord::Archive(mut rec) => {
            rec.rain = RainField::from_raw(raw);
            WlkRecord::Archive(rec)
        }
        other => other,
    }
}

/// January whose last sample is stamped 24:00 on the 31st
fn january(fixture: &Fixture) {
    fixture.write_wlk(
        "2024-01.wlk",
        WlkFileBuilder::new().day(31, vec![summary1(), sample(1435), sample(1440)]),
    );
}

#[test]
fn test_midnight_sample_opens_next_month() {
    let fixture = Fixture::new();
    january(&fixture);
    fixture.write_wlk(
        "2024-02.wlk",
        WlkFileBuilder::new().day(1, vec![sample(5)]),
    );

    let stats = fixture.importer().run().unwrap();

    let jan = fixture.read_data("202401log.txt");
    let jan_rows = lines(&jan);
    assert_eq!(jan_rows.len(), 1);
    assert!(jan_rows[0].starts_with("31/01/24,23:55,"));

    let feb = fixture.read_data("202402log.txt");
    let feb_rows = lines(&feb);
    assert_eq!(feb_rows.len(), 2);
    assert!(feb_rows[0].starts_with("01/02/24,00:00,"));
    assert!(feb_rows[1].starts_with("01/02/24,00:05,"));

    assert_eq!(stats.samples_discarded, 0);
    assert_eq!(stats.log_files_written, 2);
}

#[test]
fn test_missing_month_discards_carried_samples() {
    let fixture = Fixture::new();
    january(&fixture);
    fixture.write_wlk(
        "2024-03.wlk",
        WlkFileBuilder::new().day(2, vec![sample(600)]),
    );

    let stats = fixture.importer().run().unwrap();

    assert_eq!(lines(&fixture.read_data("202401log.txt")).len(), 1);
    assert!(!fixture.data_exists("202402log.txt"));

    let march = fixture.read_data("202403log.txt");
    let rows = lines(&march);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with("02/03/24,10:00,"));
    assert_eq!(stats.samples_discarded, 1);
}

#[test]
fn test_sample_carried_past_last_file_is_dropped() {
    let fixture = Fixture::new();
    january(&fixture);

    let stats = fixture.importer().run().unwrap();

    assert_eq!(lines(&fixture.read_data("202401log.txt")).len(), 1);
    assert!(!fixture.data_exists("202402log.txt"));
    assert_eq!(stats.samples_discarded, 1);
}

#[test]
fn test_rain_counter_restarts_with_new_year() {
    let fixture = Fixture::new();
    fixture.write_wlk(
        "2023-12.wlk",
        WlkFileBuilder::new().day(
            31,
            vec![with_rain(sample(1435), 0x1003), sample(1440)],
        ),
    );
    fixture.write_wlk(
        "2024-01.wlk",
        WlkFileBuilder::new().day(1, vec![with_rain(sample(5), 0x1002)]),
    );

    fixture.importer().run().unwrap();

    let dec = fixture.read_data("202312log.txt");
    let dec_fields: Vec<&str> = lines(&dec)[0].split(',').collect();
    // 0.03 in
    assert_eq!(dec_fields[11], "0.8");

    let jan = fixture.read_data("202401log.txt");
    let rows: Vec<Vec<&str>> = lines(&jan).iter().map(|l| l.split(',').collect()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][11], "0.0");
    // 0.02 in today and for the year
    assert_eq!(rows[1][9], "0.5");
    assert_eq!(rows[1][11], "0.5");
}

#[test]
fn test_rain_today_starts_at_zero_on_each_day() {
    let fixture = Fixture::new();
    fixture.write_wlk(
        "2024-01.wlk",
        WlkFileBuilder::new()
            .day(9, vec![with_rain(sample(1430), 0x1003)])
            .day(10, vec![with_rain(sample(5), 0x1000)]),
    );

    fixture.importer().run().unwrap();

    let jan = fixture.read_data("202401log.txt");
    let rows: Vec<Vec<&str>> = lines(&jan).iter().map(|l| l.split(',').collect()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][..2], &["09/01/24", "23:50"]);
    assert_eq!(rows[0][9], "0.8");
    assert_eq!(&rows[1][..2], &["10/01/24", "00:05"]);
    assert_eq!(rows[1][9], "0.0");
    // the yearly counter carries on
    assert_eq!(rows[1][11], "0.8");
}

#[test]
fn test_next_month_sample_before_last_day_is_skipped() {
    let fixture = Fixture::new();
    fixture.write_wlk(
        "2024-03.wlk",
        WlkFileBuilder::new()
            // 22 days on from the 10th is 1 April 00:00
            .day(10, vec![sample(600), sample(22 * 1440)])
            .day(12, vec![sample(600)]),
    );

    let stats = fixture.importer().run().unwrap();

    let march = fixture.read_data("202403log.txt");
    let rows = lines(&march);
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("10/03/24,10:00,"));
    assert!(rows[1].starts_with("12/03/24,10:00,"));
    assert!(!fixture.data_exists("202404log.txt"));
    assert_eq!(stats.samples_discarded, 1);
    assert_eq!(stats.log_files_written, 1);
}
