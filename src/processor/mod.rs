//! Import driver.
//!
//! Walks the monthly archives in name order, routes archive records to the
//! two interval logs and daily summaries to the day file, and decides when a
//! month of interval data is complete.
//!
//! A WLK file for month M ends with the midnight sample that opens M+1, so
//! the month's logs are written as soon as a sample from a later month shows
//! up on the file's last populated day. That sample then starts the next
//! month's buffer. If the next file is not the following month, the carried
//! buffer is discarded. Out-of-month samples on earlier days are skipped.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use self::discovery::{FileDiscovery, WlkFile};

use crate::config::ImportConfig;
use crate::constants::{DAY_FILE_NAME, WLK_DEGREE_DAY_BASE_F};
use crate::dayfile::DayFile;
use crate::error::{Result, WlkError};
use crate::logfile::{ExtraLog, IntervalLog, SessionContext};
use crate::models::ImportStats;
use crate::units::UnitConverter;
use crate::wlk::reader::{WlkReader, slot_capacity};
use crate::wlk::records::{ArchiveRecord, WlkRecord};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{Read, Seek};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How far a file got before it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Complete,
    Aborted,
}

/// Per-file scan state
#[derive(Debug, Default)]
struct MonthState {
    /// The month's logs have been written
    flushed: bool,
    /// The day being scanned is the last populated day in the file
    last_day: bool,
}

/// Imports every monthly archive under one root
#[derive(Debug)]
pub struct WlkImporter {
    config: ImportConfig,
    wlk_dir: PathBuf,
    data_dir: PathBuf,
    day_file: DayFile,
    log: IntervalLog,
    extra_log: ExtraLog,
    session: SessionContext,
    stats: ImportStats,
    show_progress: bool,
}

impl WlkImporter {
    pub fn new(config: ImportConfig, wlk_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            day_file: DayFile::new(&config),
            log: IntervalLog::new(&config),
            extra_log: ExtraLog::new(&config),
            session: SessionContext::new(),
            stats: ImportStats::default(),
            show_progress: false,
            config,
            wlk_dir,
            data_dir,
        }
    }

    /// Show a progress bar while scanning files
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn day_file(&self) -> &DayFile {
        &self.day_file
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    pub fn day_file_path(&self) -> PathBuf {
        self.data_dir.join(DAY_FILE_NAME)
    }

    /// Main import entry point
    pub fn run(&mut self) -> Result<ImportStats> {
        let start_time = Instant::now();
        self.report_settings();

        let mut discovery = FileDiscovery::new(self.wlk_dir.clone());
        let files = discovery.discover()?;
        self.stats.files_found = files.len();
        info!(
            "Found {} WLK files in {}",
            files.len(),
            self.wlk_dir.display()
        );

        fs::create_dir_all(&self.data_dir)?;
        let day_file_path = self.day_file_path();
        self.day_file.load(&day_file_path)?;

        let pb = self.create_progress_bar(files.len() as u64);
        for file in &files {
            pb.set_message(file.name());
            match self.import_file(file) {
                Ok(FileOutcome::Complete) => self.stats.files_processed += 1,
                Ok(FileOutcome::Aborted) => self.stats.files_failed += 1,
                Err(e) if e.is_file_local() => {
                    warn!("Skipping {}: {}", file.name(), e);
                    self.stats.files_failed += 1;
                }
                Err(e) => {
                    pb.abandon();
                    return Err(e);
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("done");

        // Samples carried past the last file have no month file to close them
        let pending = self.log.reset();
        self.extra_log.reset();
        if pending > 0 {
            warn!("Discarding {} samples after the last WLK file", pending);
            self.stats.samples_discarded += pending;
        }

        self.stats.day_rows_written = self.day_file.write(&day_file_path)?;
        self.stats.processing_time_ms = start_time.elapsed().as_millis();
        Ok(self.stats.clone())
    }

    fn create_progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }

    /// Log the settings that affect how the archives are interpreted
    fn report_settings(&self) {
        let station = &self.config.station;
        if station.rollover_hour == 0 {
            info!("Using midnight rollover");
        } else {
            warn!(
                "Rollover hour is {}:00 but WeatherLink days end at midnight; \
                 day file entries will use midnight days",
                station.rollover_hour
            );
        }

        let units: UnitConverter = self.config.converter();
        let thresholds = [
            ("heating", self.config.noaa.heating_threshold),
            ("cooling", self.config.noaa.cooling_threshold),
        ];
        for (name, threshold) in thresholds {
            if let Some(value) = threshold {
                let value_f = units.user_temp_to_f(value);
                if (value_f - WLK_DEGREE_DAY_BASE_F).abs() > 0.1 {
                    warn!(
                        "NOAA {} threshold {} differs from the {} °F base WeatherLink \
                         uses for degree days",
                        name, value, WLK_DEGREE_DAY_BASE_F
                    );
                }
            }
        }

        let channels = self.config.calibration.active_channels();
        if !channels.is_empty() {
            info!("Calibration applied to: {}", channels.join(", "));
        }
    }

    // =========================================================================
    // Per-file scan
    // =========================================================================

    fn import_file(&mut self, file: &WlkFile) -> Result<FileOutcome> {
        let mut reader = WlkReader::open(&file.path).map_err(|e| match e {
            WlkError::Io(source) => WlkError::FileOpen {
                path: file.path.clone(),
                source,
            },
            other => other,
        })?;
        self.import_reader(file, &mut reader)
    }

    fn import_reader<R: Read + Seek>(
        &mut self,
        file: &WlkFile,
        reader: &mut WlkReader<R>,
    ) -> Result<FileOutcome> {
        let total_records = reader.header().total_records;
        let days: Vec<u32> = reader.header().populated_days().map(|(d, _)| d).collect();
        info!(
            "{} contains {} records covering {} days",
            file.name(),
            total_records,
            days.len()
        );
        if let Ok(meta) = fs::metadata(&file.path) {
            let capacity = slot_capacity(meta.len());
            if capacity != u64::try_from(total_records).unwrap_or(0) {
                debug!(
                    "{} has room for {} records, header says {}",
                    file.name(),
                    capacity,
                    total_records
                );
            }
        }

        let mut month = MonthState::default();
        let mut outcome = FileOutcome::Complete;

        let final_day = days.iter().rev().copied().find(|&d| file.date(d).is_some());
        for day in days {
            month.last_day = Some(day) == final_day;
            let Some(date) = file.date(day) else {
                warn!("{}: day {} is not a calendar date, skipped", file.name(), day);
                continue;
            };

            match self.import_day(file, reader, day, date, &mut month) {
                Ok(()) => {}
                Err(e) if e.is_file_local() => {
                    warn!(
                        "{}: {}; abandoning the rest of the file",
                        file.name(),
                        e
                    );
                    outcome = FileOutcome::Aborted;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        if !month.flushed {
            self.flush_month()?;
        }
        Ok(outcome)
    }

    fn import_day<R: Read + Seek>(
        &mut self,
        file: &WlkFile,
        reader: &mut WlkReader<R>,
        day: u32,
        date: NaiveDate,
        month: &mut MonthState,
    ) -> Result<()> {
        self.stats.days_scanned += 1;
        self.session.start_day();
        let mut day_folded = false;

        let mut result = Ok(());
        for item in reader.day_records(day)? {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            };

            match record {
                WlkRecord::Archive(rec) => {
                    self.stats.archive_records += 1;
                    let ts = archive_timestamp(date, &rec);

                    if ts.month() != file.month {
                        // Only the closing midnight sample may leave the month
                        if !month.last_day {
                            warn!(
                                "{}: sample stamped {} on day {} is outside the month, skipped",
                                file.name(),
                                ts.format("%Y-%m-%d %H:%M"),
                                day
                            );
                            self.stats.samples_discarded += 1;
                            continue;
                        }
                        if !month.flushed {
                            self.day_file.fold_session(date, &self.session.extrema);
                            self.flush_month()?;
                            month.flushed = true;
                            day_folded = true;
                        }
                    }

                    self.add_sample(&rec, ts);
                }
                WlkRecord::Summary1(rec) => {
                    self.stats.summary_records += 1;
                    self.day_file.fold_summary1(date, &rec);
                }
                WlkRecord::Summary2(rec) => {
                    self.stats.summary_records += 1;
                    self.day_file.fold_summary2(date, &rec);
                }
            }
        }

        if !day_folded {
            self.day_file.fold_session(date, &self.session.extrema);
        }
        result
    }

    fn add_sample(&mut self, rec: &ArchiveRecord, ts: NaiveDateTime) {
        if let Some(last) = self.log.last_timestamp() {
            if last.month() != ts.month() || last.year() != ts.year() {
                let dropped = self.log.reset();
                self.extra_log.reset();
                self.stats.samples_discarded += dropped;
                warn!(
                    "Discarding {} samples from {} with no following month",
                    dropped,
                    last.format("%Y-%m")
                );
            }
        }

        self.log.add_sample(rec, ts, &mut self.session);
        self.extra_log.add_sample(rec, ts);
    }

    /// Write out and clear both interval logs
    fn flush_month(&mut self) -> Result<()> {
        match self.log.flush() {
            Some(month) => {
                month.write(&self.data_dir)?;
                self.stats.log_files_written += 1;
            }
            None => info!("No interval records to write"),
        }
        if let Some(month) = self.extra_log.flush() {
            month.write(&self.data_dir)?;
            self.stats.log_files_written += 1;
        }
        Ok(())
    }
}

/// Timestamp of an archive record: its day plus the packed minutes, which
/// may run into the following day
pub fn archive_timestamp(date: NaiveDate, rec: &ArchiveRecord) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + TimeDelta::minutes(i64::from(rec.packed_time))
}
