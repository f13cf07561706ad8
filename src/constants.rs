//! Application constants for the WLK importer
//!
//! Binary layout sizes, record tags, sentinel values and the file naming
//! conventions shared by the readers and writers.

// =============================================================================
// WLK Binary Layout
// =============================================================================

/// Size of the fixed file header: 16 id bytes, i32 record count and
/// 32 day index entries of (i16, i32)
pub const HEADER_BYTES: u64 = 212;

/// Length of the id block at the start of the header
pub const HEADER_ID_BYTES: usize = 16;

/// Number of day index entries (entry 0 is unused)
pub const DAY_INDEX_ENTRIES: usize = 32;

/// Every record occupies one slot of this many bytes, tag included
pub const RECORD_SLOT_BYTES: usize = 88;

/// Bytes following the tag byte in each slot
pub const RECORD_BODY_BYTES: usize = RECORD_SLOT_BYTES - 1;

/// Record type tags
pub mod record_tags {
    pub const ARCHIVE: u8 = 1;
    pub const DAILY_SUMMARY_1: u8 = 2;
    pub const DAILY_SUMMARY_2: u8 = 3;
}

// =============================================================================
// Sentinels
// =============================================================================

/// Byte channels (direction codes, soil, leaf, extra sensors) use this for
/// "not present"
pub const BYTE_SENTINEL: u8 = 255;

/// Byte-encoded temperatures are stored as whole °F plus this offset
pub const BYTE_TEMP_OFFSET: i32 = 90;

/// Raw tenths-of-°F values at or below this are treated as missing
pub const RAW_TEMP_MISSING: i16 = -2000;

/// Raw humidity (tenths of %) upper bound for a valid reading
pub const RAW_HUMIDITY_MAX: i16 = 1000;

/// UV and ET bytes above this are treated as missing
pub const RAW_BYTE_READING_MAX: u8 = 200;

// =============================================================================
// Plausibility Ranges (device units, before conversion)
// =============================================================================

pub mod ranges {
    /// Temperature °F, exclusive both ends
    pub const TEMP_F: (f64, f64) = (-150.0, 250.0);
    /// Pressure inHg, exclusive both ends
    pub const PRESS_INHG: (f64, f64) = (25.0, 32.5);
    /// Wind mph, [min, max)
    pub const WIND_MPH: (f64, f64) = (0.0, 200.0);
    /// Rain rate in/h, [min, max)
    pub const RAIN_RATE: (f64, f64) = (0.0, 300.0);
    /// Humidity %, inclusive both ends
    pub const HUMIDITY: (f64, f64) = (0.0, 100.0);
    /// UV index, [min, max)
    pub const UV: (f64, f64) = (0.0, 20.0);
    /// Daily rain in, [min, max)
    pub const DAILY_RAIN: (f64, f64) = (0.0, 32.0);
    /// Wind run miles, [min, max)
    pub const WIND_RUN: (f64, f64) = (0.0, 3200.0);
    /// Daily ET in, [min, max)
    pub const ET: (f64, f64) = (0.0, 320.0);
    /// Degree days, exclusive both ends
    pub const DEGREE_DAYS: (f64, f64) = (-320.0, 320.0);
    /// Sunshine minutes, inclusive both ends
    pub const SUNSHINE_MINUTES: (i16, i16) = (0, 1440);
}

// =============================================================================
// File Names
// =============================================================================

/// Directory under the root holding the `.wlk` archives
pub const WLK_DIR_NAME: &str = "wlk";

/// Directory under the root receiving the generated files
pub const DATA_DIR_NAME: &str = "data";

/// Directory under the root receiving diagnostics traces
pub const DIAGS_DIR_NAME: &str = "MXdiags";

/// Glob matched against the wlk directory
pub const WLK_FILE_PATTERN: &str = "????-??.wlk";

/// Regex used to pull year and month out of a wlk file name
pub const WLK_FILE_REGEX: &str = r"^(\d{4})-(\d{2})\.wlk$";

pub const DAY_FILE_NAME: &str = "dayfile.txt";

pub const CONFIG_FILE_NAME: &str = "importwlk.toml";

// =============================================================================
// Text Formats
// =============================================================================

pub const DATE_FORMAT: &str = "%d/%m/%y";

pub const TIME_FORMAT: &str = "%H:%M";

/// Number of positional fields in a day file row
pub const DAY_FILE_FIELDS: usize = 55;

/// Number of positional fields in an interval log row
pub const LOG_FILE_FIELDS: usize = 29;

/// Number of data fields (after date and time) in an extra log row
pub const EXTRA_LOG_DATA_FIELDS: usize = 92;

/// WeatherLink computes degree days against this base
pub const WLK_DEGREE_DAY_BASE_F: f64 = 65.0;
