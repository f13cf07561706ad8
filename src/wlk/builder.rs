//! Assembles synthetic WLK files from typed records.
//!
//! Used to produce fixtures and to re-encode decoded months. Days are laid
//! out in ascending order with their records in the order given.

use crate::error::Result;
use crate::wlk::header::{DayIndex, WlkHeader};
use crate::wlk::records::WlkRecord;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct WlkFileBuilder {
    days: BTreeMap<u32, Vec<WlkRecord>>,
}

impl WlkFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to `day` (1-31)
    pub fn day(mut self, day: u32, records: Vec<WlkRecord>) -> Self {
        self.days.entry(day).or_default().extend(records);
        self
    }

    pub fn header(&self) -> WlkHeader {
        let mut header = WlkHeader::default();
        let mut next_slot: i32 = 0;

        for (&day, records) in &self.days {
            if let Some(entry) = header.days.get_mut(day as usize) {
                let count = i16::try_from(records.len()).unwrap_or(i16::MAX);
                *entry = DayIndex {
                    records_in_day: count,
                    start_position: next_slot,
                };
                next_slot += i32::from(count);
            }
        }
        header.total_records = next_slot;
        header
    }

    pub fn build(&self) -> Vec<u8> {
        let header = self.header();
        let mut bytes = header.to_bytes().to_vec();
        for (&day, records) in &self.days {
            if header.day(day).is_none() {
                continue;
            }
            for record in records {
                bytes.extend_from_slice(&record.encode());
            }
        }
        bytes
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.build())?;
        Ok(())
    }
}
