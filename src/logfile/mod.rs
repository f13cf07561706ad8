//! Monthly interval logs.
//!
//! Both aggregators buffer one month of archive samples keyed by timestamp
//! and hand back the finished rows on [`IntervalLog::flush`] /
//! [`ExtraLog::flush`]. The driver decides when a month is complete.

pub mod extra;
pub mod interval;
pub mod session;

pub use extra::{ExtraLog, ExtraLogRecord};
pub use interval::{IntervalLog, IntervalLogRecord};
pub use session::{RainCounters, SessionContext, SessionExtrema};

use crate::error::Result;
use crate::output;
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::info;

/// `YYYYMMlog.txt`
pub fn log_file_name(ts: NaiveDateTime) -> String {
    format!("{}log.txt", ts.format("%Y%m"))
}

/// `ExtraLogYYYYMMlog.txt`
pub fn extra_log_file_name(ts: NaiveDateTime) -> String {
    format!("ExtraLog{}log.txt", ts.format("%Y%m"))
}

/// One month of serialized rows ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct MonthLog {
    pub file_name: String,
    pub rows: Vec<Vec<String>>,
}

impl MonthLog {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write into `data_dir`, backing up any previous file of the same name
    pub fn write(self, data_dir: &Path) -> Result<usize> {
        let path = data_dir.join(&self.file_name);
        info!("Writing {} rows to {}", self.rows.len(), path.display());
        output::write_file(&path, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_file_names() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(log_file_name(ts), "202403log.txt");
        assert_eq!(extra_log_file_name(ts), "ExtraLog202403log.txt");
    }
}
