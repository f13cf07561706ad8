//! Reading and writing the WeatherLink `.wlk` monthly archive format.
//!
//! A file holds one calendar month: a fixed header indexing each day,
//! followed by 88-byte record slots. See [`header`] for the index layout and
//! [`records`] for the three record types.

pub mod builder;
pub mod header;
pub mod reader;
pub mod records;
pub mod timepack;

pub use builder::WlkFileBuilder;
pub use header::{DayIndex, WlkHeader};
pub use reader::{DayRecords, WlkReader};
pub use records::{
    ArchiveRecord, DailySummary1, DailySummary2, RainCollector, RainField, Summary1Time,
    Summary2Time, WlkRecord,
};
