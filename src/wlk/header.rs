//! WLK file header and day index.
//!
//! The header is 212 bytes: a 16-byte id block, the total record count and
//! 32 day index entries. Entry *d* gives the number of 88-byte slots for day
//! *d* and the slot number of its first record; entry 0 is unused.

use crate::constants::{DAY_INDEX_ENTRIES, HEADER_BYTES, HEADER_ID_BYTES, RECORD_SLOT_BYTES};
use crate::error::{Result, WlkError};
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// Index entry for one day of the month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayIndex {
    pub records_in_day: i16,
    pub start_position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WlkHeader {
    pub id: [u8; HEADER_ID_BYTES],
    pub total_records: i32,
    pub days: [DayIndex; DAY_INDEX_ENTRIES],
}

impl Default for WlkHeader {
    fn default() -> Self {
        let mut id = [0u8; HEADER_ID_BYTES];
        id[..7].copy_from_slice(b"WDAT5.0");
        id[14] = 5;
        Self {
            id,
            total_records: 0,
            days: [DayIndex::default(); DAY_INDEX_ENTRIES],
        }
    }
}

impl WlkHeader {
    /// Decode a complete header block
    pub fn parse(bytes: &[u8; HEADER_BYTES as usize]) -> Self {
        let mut id = [0u8; HEADER_ID_BYTES];
        id.copy_from_slice(&bytes[..HEADER_ID_BYTES]);

        let total_records = i32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);

        let mut days = [DayIndex::default(); DAY_INDEX_ENTRIES];
        for (i, entry) in days.iter_mut().enumerate() {
            let base = 20 + i * 6;
            entry.records_in_day = i16::from_le_bytes([bytes[base], bytes[base + 1]]);
            entry.start_position = i32::from_le_bytes([
                bytes[base + 2],
                bytes[base + 3],
                bytes[base + 4],
                bytes[base + 5],
            ]);
        }

        Self {
            id,
            total_records,
            days,
        }
    }

    /// Read the header from the start of a stream. A short read is reported
    /// as an invalid header for `path`.
    pub fn read_from<R: Read>(reader: &mut R, path: &Path) -> Result<Self> {
        let mut bytes = [0u8; HEADER_BYTES as usize];
        reader.read_exact(&mut bytes).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => WlkError::InvalidHeader {
                path: path.to_path_buf(),
                reason: format!("file is shorter than the {}-byte header", HEADER_BYTES),
            },
            _ => WlkError::Io(e),
        })?;

        let header = Self::parse(&bytes);
        if !header.id.starts_with(b"WDAT") {
            debug!(
                "Unexpected id block in {}: {:?}",
                path.display(),
                String::from_utf8_lossy(&header.id)
            );
        }

        Ok(header)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_BYTES as usize] {
        let mut bytes = [0u8; HEADER_BYTES as usize];
        bytes[..HEADER_ID_BYTES].copy_from_slice(&self.id);
        bytes[16..20].copy_from_slice(&self.total_records.to_le_bytes());
        for (i, entry) in self.days.iter().enumerate() {
            let base = 20 + i * 6;
            bytes[base..base + 2].copy_from_slice(&entry.records_in_day.to_le_bytes());
            bytes[base + 2..base + 6].copy_from_slice(&entry.start_position.to_le_bytes());
        }
        bytes
    }

    /// Index entry for a day of the month (1-31)
    pub fn day(&self, day: u32) -> Option<&DayIndex> {
        if day == 0 {
            return None;
        }
        self.days.get(day as usize)
    }

    /// Byte offset of the first record for `day`, if the entry is usable
    pub fn day_offset(&self, day: u32) -> Option<u64> {
        let entry = self.day(day)?;
        let start = u64::try_from(entry.start_position).ok()?;
        Some(HEADER_BYTES + start * RECORD_SLOT_BYTES as u64)
    }

    /// Days (1-31) with at least one record, in ascending order
    pub fn populated_days(&self) -> impl Iterator<Item = (u32, DayIndex)> + '_ {
        self.days
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, entry)| entry.records_in_day > 0)
            .map(|(day, entry)| (day as u32, *entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_day_offset() {
        let mut header = WlkHeader::default();
        header.days[5] = DayIndex {
            records_in_day: 3,
            start_position: 10,
        };

        assert_eq!(header.day_offset(5), Some(212 + 10 * 88));
        assert_eq!(header.day_offset(0), None);
        assert_eq!(header.day_offset(32), None);
    }

    #[test]
    fn test_negative_start_is_unusable() {
        let mut header = WlkHeader::default();
        header.days[2] = DayIndex {
            records_in_day: 1,
            start_position: -4,
        };
        assert_eq!(header.day_offset(2), None);
    }

    #[test]
    fn test_byte_layout_round_trip() {
        let mut header = WlkHeader {
            total_records: 400,
            ..Default::default()
        };
        header.days[1] = DayIndex {
            records_in_day: 290,
            start_position: 0,
        };
        header.days[31] = DayIndex {
            records_in_day: 110,
            start_position: 290,
        };

        let bytes = header.to_bytes();
        assert_eq!(&bytes[..4], b"WDAT");
        assert_eq!(&bytes[16..20], &400i32.to_le_bytes());
        assert_eq!(WlkHeader::parse(&bytes), header);
    }

    #[test]
    fn test_populated_days_skip_entry_zero() {
        let mut header = WlkHeader::default();
        header.days[0] = DayIndex {
            records_in_day: 7,
            start_position: 0,
        };
        header.days[3] = DayIndex {
            records_in_day: 2,
            start_position: 0,
        };
        header.days[9] = DayIndex {
            records_in_day: 1,
            start_position: 2,
        };

        let days: Vec<u32> = header.populated_days().map(|(d, _)| d).collect();
        assert_eq!(days, vec![3, 9]);
    }

    #[test]
    fn test_short_header_is_invalid() {
        let mut cursor = Cursor::new(vec![0u8; 100]);
        let result = WlkHeader::read_from(&mut cursor, Path::new("2024-01.wlk"));

        match result.unwrap_err() {
            WlkError::InvalidHeader { path, .. } => {
                assert_eq!(path, Path::new("2024-01.wlk"));
            }
            other => panic!("Expected InvalidHeader, got {:?}", other),
        }
    }
}
