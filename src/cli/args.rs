//! Command-line argument definitions
//!
//! The importer works on a single station root directory. By default the
//! archives are read from `<root>/wlk`, output goes to `<root>/data` and the
//! configuration is read from `<root>/importwlk.toml`.

use crate::constants::{CONFIG_FILE_NAME, DATA_DIR_NAME, DIAGS_DIR_NAME, WLK_DIR_NAME};
use crate::error::{Result, WlkError};
use clap::Parser;
use std::path::PathBuf;

/// Import Davis WeatherLink monthly archives into log and day files
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wlk-import",
    version,
    about = "Import Davis WeatherLink .wlk archives into monthly log files and the day file",
    long_about = "Reads every YYYY-MM.wlk archive in the source directory in date order and \
                  writes YYYYMMlog.txt and ExtraLogYYYYMMlog.txt for each month, then merges \
                  the daily summaries into dayfile.txt. Existing output files are kept as \
                  .sav backups."
)]
pub struct Args {
    /// Station root directory
    #[arg(
        short = 'r',
        long = "root",
        value_name = "PATH",
        default_value = ".",
        help = "Station root directory"
    )]
    pub root: PathBuf,

    /// Configuration file, defaults to <root>/importwlk.toml
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the .wlk files, defaults to <root>/wlk
    #[arg(long = "wlk-dir", value_name = "PATH")]
    pub wlk_dir: Option<PathBuf>,

    /// Output directory, defaults to <root>/data
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors, no progress bar
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Check the root directory before anything is written under it
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(WlkError::Configuration {
                message: format!("Root directory does not exist: {}", self.root.display()),
            });
        }
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE_NAME))
    }

    pub fn wlk_dir(&self) -> PathBuf {
        self.wlk_dir
            .clone()
            .unwrap_or_else(|| self.root.join(WLK_DIR_NAME))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| self.root.join(DATA_DIR_NAME))
    }

    pub fn diags_dir(&self) -> PathBuf {
        self.root.join(DIAGS_DIR_NAME)
    }

    /// Get the log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
