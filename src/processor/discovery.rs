//! WLK file discovery.
//!
//! Finds the `YYYY-MM.wlk` monthly archives in the source directory and
//! returns them in name order, which is also chronological order.

use crate::constants::{WLK_FILE_PATTERN, WLK_FILE_REGEX};
use crate::error::{Result, WlkError};
use chrono::NaiveDate;
use glob::Pattern;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A monthly archive and the month its name claims to cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WlkFile {
    pub path: PathBuf,
    pub year: i32,
    pub month: u32,
}

impl WlkFile {
    /// Parse year and month from the file name
    pub fn from_path(path: &Path, pattern: &Regex) -> Result<Self> {
        let invalid = || WlkError::InvalidFileName {
            path: path.to_path_buf(),
        };

        let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
        let caps = pattern.captures(name).ok_or_else(invalid)?;
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let month: u32 = caps[2].parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Ok(Self {
            path: path.to_path_buf(),
            year,
            month,
        })
    }

    /// Calendar date for a day of this file's month, if it exists
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// File discovery for the WLK source directory
#[derive(Debug)]
pub struct FileDiscovery {
    wlk_dir: PathBuf,
    skipped: usize,
}

impl FileDiscovery {
    pub fn new(wlk_dir: PathBuf) -> Self {
        Self {
            wlk_dir,
            skipped: 0,
        }
    }

    /// Files that matched the glob but not the naming convention
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Discover all monthly archives, sorted by file name
    pub fn discover(&mut self) -> Result<Vec<WlkFile>> {
        if !self.wlk_dir.is_dir() {
            return Err(WlkError::SourceDirNotFound {
                path: self.wlk_dir.clone(),
            });
        }

        let name_pattern = Regex::new(WLK_FILE_REGEX).map_err(|e| WlkError::Configuration {
            message: format!("invalid file name pattern: {}", e),
        })?;

        let dir = Pattern::escape(&self.wlk_dir.to_string_lossy());
        let glob_pattern = format!("{}/{}", dir, WLK_FILE_PATTERN);
        debug!("Searching for WLK files matching {}", glob_pattern);

        let entries = glob::glob(&glob_pattern).map_err(|e| WlkError::Configuration {
            message: format!("invalid glob pattern {}: {}", glob_pattern, e),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Cannot read {}: {}", e.path().display(), e.error());
                    self.skipped += 1;
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            match WlkFile::from_path(&path, &name_pattern) {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!("{}", e);
                    self.skipped += 1;
                }
            }
        }

        files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        debug!("Found {} WLK files", files.len());
        Ok(files)
    }
}
