//! WLK Import Library
//!
//! Imports Davis WeatherLink `.wlk` monthly archive files into the
//! comma-separated monthly log files and the cumulative day file used by
//! Cumulus-style weather station software.
//!
//! This library provides tools for:
//! - Decoding the WLK header, day index and the three 88-byte record types
//! - Calibrating and converting readings into the configured display units
//! - Building monthly interval logs and extra-sensor logs
//! - Merging daily summaries into an existing day file
//! - Deriving apparent temperature, feels-like, humidex and solar maximum

pub mod calibration;
pub mod config;
pub mod constants;
pub mod dayfile;
pub mod error;
pub mod logfile;
pub mod meteo;
pub mod models;
pub mod output;
pub mod processor;
pub mod solar;
pub mod units;
pub mod wlk;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::ImportConfig;
pub use dayfile::{DayFile, DayRecord};
pub use error::{Result, WlkError};
pub use logfile::{ExtraLog, IntervalLog};
pub use models::ImportStats;
pub use processor::WlkImporter;
pub use wlk::{WlkFileBuilder, WlkReader, WlkRecord};
