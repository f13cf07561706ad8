//! Core data structures shared by the aggregators and the driver.
//!
//! [`Extreme`] is the (value, time) pair every daily high and low is kept
//! as; [`ImportStats`] collects the run totals reported at the end.

use chrono::NaiveDateTime;
use colored::*;

/// Best value seen for a quantity and when it occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extreme<T> {
    pub value: T,
    pub time: NaiveDateTime,
}

impl<T> Extreme<T> {
    pub fn new(value: T, time: NaiveDateTime) -> Self {
        Self { value, time }
    }
}

/// Replace `slot` if `value` is strictly greater. Returns true on update.
pub fn raise<T: PartialOrd + Copy>(
    slot: &mut Option<Extreme<T>>,
    value: T,
    time: NaiveDateTime,
) -> bool {
    match slot {
        Some(current) if !(value > current.value) => false,
        _ => {
            *slot = Some(Extreme::new(value, time));
            true
        }
    }
}

/// Replace `slot` if `value` is strictly lower. Returns true on update.
pub fn lower<T: PartialOrd + Copy>(
    slot: &mut Option<Extreme<T>>,
    value: T,
    time: NaiveDateTime,
) -> bool {
    match slot {
        Some(current) if !(value < current.value) => false,
        _ => {
            *slot = Some(Extreme::new(value, time));
            true
        }
    }
}

/// Import run statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub files_found: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    /// Populated days scanned across all files
    pub days_scanned: usize,
    pub archive_records: usize,
    pub summary_records: usize,
    /// Interval samples dropped because their month never closed
    pub samples_discarded: usize,
    /// Monthly log and extra log files written
    pub log_files_written: usize,
    /// Rows written to the day file
    pub day_rows_written: usize,
    pub processing_time_ms: u128,
}

impl ImportStats {
    pub fn total_records(&self) -> usize {
        self.archive_records + self.summary_records
    }

    pub fn print_summary(&self) {
        println!("\n{}", "Import Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            self.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {} of {}",
            "Files processed:".bright_cyan(),
            self.files_processed.to_string().bright_white(),
            self.files_found
        );
        if self.files_failed > 0 {
            println!(
                "  {} {}",
                "Files failed:".bright_red(),
                self.files_failed.to_string().bright_red().bold()
            );
        }
        println!(
            "  {} {} ({} archive, {} summary) over {} days",
            "Records:".bright_cyan(),
            self.total_records().to_string().bright_white().bold(),
            self.archive_records,
            self.summary_records,
            self.days_scanned
        );
        if self.samples_discarded > 0 {
            println!(
                "  {} {}",
                "Samples discarded:".bright_yellow(),
                self.samples_discarded.to_string().bright_yellow()
            );
        }
        println!(
            "  {} {}",
            "Log files written:".bright_cyan(),
            self.log_files_written.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Day file rows:".bright_cyan(),
            self.day_rows_written.to_string().bright_white().bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_raise_is_strict() {
        let mut slot = None;
        assert!(raise(&mut slot, 10.0, at(1, 0)));
        assert!(!raise(&mut slot, 10.0, at(2, 0)));
        assert!(!raise(&mut slot, 9.5, at(3, 0)));
        assert_eq!(slot, Some(Extreme::new(10.0, at(1, 0))));

        assert!(raise(&mut slot, 10.1, at(4, 0)));
        assert_eq!(slot.unwrap().time, at(4, 0));
    }

    #[test]
    fn test_lower_is_strict() {
        let mut slot = None;
        assert!(lower(&mut slot, 55, at(5, 0)));
        assert!(!lower(&mut slot, 55, at(6, 0)));
        assert!(lower(&mut slot, 54, at(7, 0)));
        assert_eq!(slot, Some(Extreme::new(54, at(7, 0))));
    }

    #[test]
    fn test_total_records() {
        let stats = ImportStats {
            archive_records: 280,
            summary_records: 2,
            ..Default::default()
        };
        assert_eq!(stats.total_records(), 282);
    }
}
