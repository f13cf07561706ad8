//! Sequential access to the records of a WLK file, one day at a time.

use crate::constants::{HEADER_BYTES, RECORD_SLOT_BYTES};
use crate::error::{Result, WlkError};
use crate::wlk::header::WlkHeader;
use crate::wlk::records::{DecodeError, WlkRecord, decode_record};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Open WLK file positioned after its header
#[derive(Debug)]
pub struct WlkReader<R> {
    inner: R,
    header: WlkHeader,
    path: PathBuf,
}

impl WlkReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), path)
    }
}

impl<R: Read + Seek> WlkReader<R> {
    /// Wrap a stream and read its header
    pub fn from_reader(mut inner: R, path: &Path) -> Result<Self> {
        inner.seek(SeekFrom::Start(0))?;
        let header = WlkHeader::read_from(&mut inner, path)?;
        Ok(Self {
            inner,
            header,
            path: path.to_path_buf(),
        })
    }

    pub fn header(&self) -> &WlkHeader {
        &self.header
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterate the records indexed for `day`. The iterator yields at most
    /// one error and stops after it.
    pub fn day_records(&mut self, day: u32) -> Result<DayRecords<'_, R>> {
        let (count, offset) = match (self.header.day(day), self.header.day_offset(day)) {
            (Some(entry), Some(offset)) => (
                usize::try_from(entry.records_in_day).unwrap_or(0),
                offset,
            ),
            _ => {
                return Err(WlkError::InvalidHeader {
                    path: self.path.clone(),
                    reason: format!("day {} has no usable index entry", day),
                });
            }
        };

        self.inner
            .seek(SeekFrom::Start(offset))
            .map_err(|source| WlkError::RecordRead {
                path: self.path.clone(),
                day,
                index: 0,
                source,
            })?;

        Ok(DayRecords {
            inner: &mut self.inner,
            path: &self.path,
            day,
            offset,
            index: 0,
            count,
            done: false,
        })
    }
}

pub struct DayRecords<'a, R> {
    inner: &'a mut R,
    path: &'a Path,
    day: u32,
    offset: u64,
    index: usize,
    count: usize,
    done: bool,
}

impl<R: Read> DayRecords<'_, R> {
    fn read_next(&mut self) -> Result<WlkRecord> {
        let mut slot = [0u8; RECORD_SLOT_BYTES];
        self.inner.read_exact(&mut slot).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => WlkError::TruncatedRecord {
                offset: self.offset,
                day: self.day,
                index: self.index,
            },
            _ => WlkError::RecordRead {
                path: self.path.to_path_buf(),
                day: self.day,
                index: self.index,
                source: e,
            },
        })?;

        decode_record(slot[0], &slot[1..]).map_err(|e| match e {
            DecodeError::UnknownTag(tag) => WlkError::UnknownRecordType {
                tag,
                offset: self.offset,
                day: self.day,
                index: self.index,
            },
            DecodeError::ShortBody { .. } => WlkError::TruncatedRecord {
                offset: self.offset,
                day: self.day,
                index: self.index,
            },
        })
    }
}

impl<R: Read> Iterator for DayRecords<'_, R> {
    type Item = Result<WlkRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.count {
            return None;
        }

        let item = self.read_next();
        if item.is_err() {
            self.done = true;
        }
        self.index += 1;
        self.offset += RECORD_SLOT_BYTES as u64;
        Some(item)
    }
}

/// Number of slots that fit in a file of `len` bytes
pub fn slot_capacity(len: u64) -> u64 {
    len.saturating_sub(HEADER_BYTES) / RECORD_SLOT_BYTES as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wlk::builder::WlkFileBuilder;
    use crate::wlk::records::{ArchiveRecord, DailySummary1};
    use std::io::Cursor;

    fn open(bytes: Vec<u8>) -> WlkReader<Cursor<Vec<u8>>> {
        WlkReader::from_reader(Cursor::new(bytes), Path::new("2024-02.wlk")).unwrap()
    }

    #[test]
    fn test_reads_day_records_in_slot_order() {
        let bytes = WlkFileBuilder::new()
            .day(
                3,
                vec![
                    WlkRecord::Summary1(DailySummary1::default()),
                    WlkRecord::Archive(ArchiveRecord {
                        packed_time: 5,
                        ..Default::default()
                    }),
                ],
            )
            .build();

        let mut reader = open(bytes);
        let records: Vec<WlkRecord> = reader
            .day_records(3)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], WlkRecord::Summary1(_)));
        match &records[1] {
            WlkRecord::Archive(rec) => assert_eq!(rec.packed_time, 5),
            other => panic!("Expected archive record, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_stops_iteration() {
        let mut bytes = WlkFileBuilder::new()
            .day(
                1,
                vec![
                    WlkRecord::Archive(ArchiveRecord::default()),
                    WlkRecord::Archive(ArchiveRecord::default()),
                    WlkRecord::Archive(ArchiveRecord::default()),
                ],
            )
            .build();
        // Corrupt the tag of the second slot
        bytes[HEADER_BYTES as usize + RECORD_SLOT_BYTES] = 9;

        let mut reader = open(bytes);
        let items: Vec<Result<WlkRecord>> = reader.day_records(1).unwrap().collect();

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        match items[1].as_ref().unwrap_err() {
            WlkError::UnknownRecordType {
                tag,
                offset,
                day,
                index,
            } => {
                assert_eq!(*tag, 9);
                assert_eq!(*offset, HEADER_BYTES + RECORD_SLOT_BYTES as u64);
                assert_eq!(*day, 1);
                assert_eq!(*index, 1);
            }
            other => panic!("Expected UnknownRecordType, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_file() {
        let mut bytes = WlkFileBuilder::new()
            .day(2, vec![WlkRecord::Archive(ArchiveRecord::default())])
            .build();
        bytes.truncate(HEADER_BYTES as usize + 40);

        let mut reader = open(bytes);
        let items: Vec<Result<WlkRecord>> = reader.day_records(2).unwrap().collect();

        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0],
            Err(WlkError::TruncatedRecord { day: 2, index: 0, .. })
        ));
    }

    /// Serves the header, then fails every read
    struct FailsAfterHeader(Cursor<Vec<u8>>);

    impl Read for FailsAfterHeader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.position() >= HEADER_BYTES {
                return Err(std::io::Error::other("device not ready"));
            }
            self.0.read(buf)
        }
    }

    impl Seek for FailsAfterHeader {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.0.seek(pos)
        }
    }

    #[test]
    fn test_read_failure_names_file_day_and_record() {
        let bytes = WlkFileBuilder::new()
            .day(4, vec![WlkRecord::Archive(ArchiveRecord::default())])
            .build();
        let mut reader = WlkReader::from_reader(
            FailsAfterHeader(Cursor::new(bytes)),
            Path::new("2024-02.wlk"),
        )
        .unwrap();

        let items: Vec<Result<WlkRecord>> = reader.day_records(4).unwrap().collect();
        assert_eq!(items.len(), 1);
        let err = items[0].as_ref().unwrap_err();
        assert!(err.is_file_local());
        match err {
            WlkError::RecordRead { path, day, index, .. } => {
                assert_eq!(path, Path::new("2024-02.wlk"));
                assert_eq!(*day, 4);
                assert_eq!(*index, 0);
            }
            other => panic!("Expected RecordRead, got {:?}", other),
        }
    }

    #[test]
    fn test_slot_capacity() {
        assert_eq!(slot_capacity(212), 0);
        assert_eq!(slot_capacity(212 + 88 * 3 + 10), 3);
        assert_eq!(slot_capacity(100), 0);
    }
}
