//! Error handling for WLK import operations.
//!
//! Provides error types with enough context (file, day, byte offset, field
//! index) to locate the offending source data, plus the classification the
//! scan driver uses to decide between skipping a file and aborting the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WlkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("The source directory '{path}' does not exist")]
    SourceDirNotFound { path: PathBuf },

    #[error("Cannot open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid WLK file name: {path} (expected YYYY-MM.wlk)")]
    InvalidFileName { path: PathBuf },

    #[error("Invalid WLK header in {path}: {reason}")]
    InvalidHeader { path: PathBuf, reason: String },

    #[error("Unknown record type {tag} at byte offset {offset} (day {day}, record {index})")]
    UnknownRecordType {
        tag: u8,
        offset: u64,
        day: u32,
        index: usize,
    },

    #[error("Read error in {path} (day {day}, record {index}): {source}")]
    RecordRead {
        path: PathBuf,
        day: u32,
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Truncated record at byte offset {offset} (day {day}, record {index})")]
    TruncatedRecord { offset: u64, day: u32, index: usize },

    #[error("Day file {path} line {line}: field {field} ('{value}') is invalid - {reason}")]
    DayFileParse {
        path: PathBuf,
        line: usize,
        field: usize,
        value: String,
        reason: String,
    },

    #[error("Day file {path} line {line}: duplicate entry for {date}")]
    DuplicateDay {
        path: PathBuf,
        line: usize,
        date: String,
    },

    #[error("CSV error reading {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl WlkError {
    /// Errors confined to a single month file; the driver logs them and
    /// moves on to the next file.
    pub fn is_file_local(&self) -> bool {
        matches!(
            self,
            WlkError::FileOpen { .. }
                | WlkError::InvalidFileName { .. }
                | WlkError::InvalidHeader { .. }
                | WlkError::UnknownRecordType { .. }
                | WlkError::TruncatedRecord { .. }
                | WlkError::RecordRead { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WlkError>;
