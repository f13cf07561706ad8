//! Decoders for the three 88-byte record layouts.
//!
//! Every slot starts with a one-byte type tag; the decoders here consume the
//! remaining 87 bytes. All multi-byte fields are little-endian. Values are
//! kept in raw device units; conversion happens in the aggregators.

use crate::constants::{BYTE_SENTINEL, RECORD_BODY_BYTES, RECORD_SLOT_BYTES, record_tags};
use crate::units::RainMeasure;
use crate::wlk::timepack::{pack_12bit, unpack_12bit};
use thiserror::Error;

pub const SUMMARY1_TIME_SLOTS: usize = 18;
pub const SUMMARY2_TIME_SLOTS: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown record type {0}")]
    UnknownTag(u8),

    #[error("record body is {found} bytes, expected {expected}")]
    ShortBody { expected: usize, found: usize },
}

// =============================================================================
// Rain collector
// =============================================================================

/// Rain collector type, from the top nibble of the rain field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainCollector {
    TenthInch,
    HundredthInch,
    FifthMm,
    OneMm,
    TenthMm,
    Unknown(u8),
}

impl RainCollector {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => RainCollector::TenthInch,
            1 => RainCollector::HundredthInch,
            2 => RainCollector::FifthMm,
            3 => RainCollector::OneMm,
            6 => RainCollector::TenthMm,
            other => RainCollector::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            RainCollector::TenthInch => 0,
            RainCollector::HundredthInch => 1,
            RainCollector::FifthMm => 2,
            RainCollector::OneMm => 3,
            RainCollector::TenthMm => 6,
            RainCollector::Unknown(code) => code,
        }
    }

    /// Amount per bucket tip. Unrecognised collectors are treated as 0.01 in.
    pub fn bucket(self) -> (f64, RainMeasure) {
        match self {
            RainCollector::TenthInch => (0.1, RainMeasure::Inches),
            RainCollector::HundredthInch => (0.01, RainMeasure::Inches),
            RainCollector::FifthMm => (0.2, RainMeasure::Millimetres),
            RainCollector::OneMm => (1.0, RainMeasure::Millimetres),
            RainCollector::TenthMm => (0.1, RainMeasure::Millimetres),
            RainCollector::Unknown(_) => (0.01, RainMeasure::Inches),
        }
    }
}

/// Rain field of an archive record: collector type plus click count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainField {
    pub collector: RainCollector,
    pub clicks: u16,
}

impl RainField {
    pub fn from_raw(raw: u16) -> Self {
        Self {
            collector: RainCollector::from_code((raw >> 12) as u8),
            clicks: raw & 0x0FFF,
        }
    }

    pub fn to_raw(self) -> u16 {
        (u16::from(self.collector.code() & 0x0F) << 12) | (self.clicks & 0x0FFF)
    }

    /// Rain amount in the collector's native unit
    pub fn amount(self) -> (f64, RainMeasure) {
        let (bucket, measure) = self.collector.bucket();
        (f64::from(self.clicks) * bucket, measure)
    }
}

impl Default for RainField {
    fn default() -> Self {
        Self {
            collector: RainCollector::HundredthInch,
            clicks: 0,
        }
    }
}

// =============================================================================
// Byte cursor
// =============================================================================

/// Sequential little-endian reader over a slot body of known length
struct BodyReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BodyReader<'a> {
    fn new(buf: &'a [u8]) -> std::result::Result<Self, DecodeError> {
        if buf.len() < RECORD_BODY_BYTES {
            return Err(DecodeError::ShortBody {
                expected: RECORD_BODY_BYTES,
                found: buf.len(),
            });
        }
        Ok(Self { buf, pos: 0 })
    }

    fn u8(&mut self) -> u8 {
        let v = self.buf[self.pos];
        self.pos += 1;
        v
    }

    fn i16(&mut self) -> i16 {
        let v = i16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        v
    }

    fn u16(&mut self) -> u16 {
        let v = u16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        v
    }

    fn bytes<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }
}

/// Sequential writer producing a full slot, tag first
struct SlotWriter {
    buf: [u8; RECORD_SLOT_BYTES],
    pos: usize,
}

impl SlotWriter {
    fn new(tag: u8) -> Self {
        let mut buf = [0u8; RECORD_SLOT_BYTES];
        buf[0] = tag;
        Self { buf, pos: 1 }
    }

    fn u8(&mut self, v: u8) {
        self.buf[self.pos] = v;
        self.pos += 1;
    }

    fn i16(&mut self, v: i16) {
        self.put(&v.to_le_bytes());
    }

    fn u16(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn finish(self) -> [u8; RECORD_SLOT_BYTES] {
        debug_assert_eq!(self.pos, RECORD_SLOT_BYTES);
        self.buf
    }
}

// =============================================================================
// Archive record (type 1)
// =============================================================================

/// One archive interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    /// Minutes covered by this record
    pub archive_interval: u8,
    pub flags1: u8,
    pub flags2: u8,
    /// Minutes past midnight of the record's day; may exceed 1439
    pub packed_time: i16,
    /// Tenths of °F
    pub outside_temp: i16,
    pub outside_temp_hi: i16,
    pub outside_temp_low: i16,
    pub inside_temp: i16,
    /// Thousandths of inHg
    pub barometer: i16,
    /// Tenths of %
    pub outside_humidity: i16,
    pub inside_humidity: i16,
    pub rain: RainField,
    /// Clicks per hour
    pub rain_rate_hi: i16,
    /// Tenths of mph
    pub wind_speed: i16,
    pub wind_speed_gust: i16,
    /// Direction code 0-15, 255 for none
    pub wind_dir: u8,
    pub wind_dir_gust: u8,
    pub wind_samples: i16,
    /// W/m²
    pub solar: i16,
    pub solar_hi: i16,
    /// Tenths of UV index
    pub uv: u8,
    pub uv_hi: u8,
    pub forecast: u8,
    /// Thousandths of an inch
    pub et: u8,
    /// Whole °F plus 90
    pub soil_temp: [u8; 6],
    /// Centibars
    pub soil_moisture: [u8; 6],
    pub leaf_wetness: [u8; 4],
    /// Whole °F plus 90
    pub extra_temp: [u8; 7],
    /// Whole %
    pub extra_humidity: [u8; 7],
}

impl Default for ArchiveRecord {
    fn default() -> Self {
        Self {
            archive_interval: 5,
            flags1: 0,
            flags2: 0,
            packed_time: 0,
            outside_temp: i16::MIN,
            outside_temp_hi: i16::MIN,
            outside_temp_low: i16::MIN,
            inside_temp: i16::MIN,
            barometer: 0,
            outside_humidity: i16::MIN,
            inside_humidity: i16::MIN,
            rain: RainField::default(),
            rain_rate_hi: 0,
            wind_speed: i16::MIN,
            wind_speed_gust: i16::MIN,
            wind_dir: BYTE_SENTINEL,
            wind_dir_gust: BYTE_SENTINEL,
            wind_samples: 0,
            solar: i16::MIN,
            solar_hi: i16::MIN,
            uv: BYTE_SENTINEL,
            uv_hi: BYTE_SENTINEL,
            forecast: 0,
            et: 0,
            soil_temp: [BYTE_SENTINEL; 6],
            soil_moisture: [BYTE_SENTINEL; 6],
            leaf_wetness: [BYTE_SENTINEL; 4],
            extra_temp: [BYTE_SENTINEL; 7],
            extra_humidity: [BYTE_SENTINEL; 7],
        }
    }
}

impl ArchiveRecord {
    fn decode(body: &[u8]) -> std::result::Result<Self, DecodeError> {
        let mut r = BodyReader::new(body)?;

        let archive_interval = r.u8();
        let flags1 = r.u8();
        let flags2 = r.u8();
        let packed_time = r.i16();
        let outside_temp = r.i16();
        let outside_temp_hi = r.i16();
        let outside_temp_low = r.i16();
        let inside_temp = r.i16();
        let barometer = r.i16();
        let outside_humidity = r.i16();
        let inside_humidity = r.i16();
        let rain = RainField::from_raw(r.u16());
        let rain_rate_hi = r.i16();
        let wind_speed = r.i16();
        let wind_speed_gust = r.i16();
        let wind_dir = r.u8();
        let wind_dir_gust = r.u8();
        let wind_samples = r.i16();
        let solar = r.i16();
        let solar_hi = r.i16();
        let uv = r.u8();
        let uv_hi = r.u8();
        r.skip(4); // leaf temperatures
        r.skip(2); // extra radiation
        r.skip(12); // reserved for future sensors
        let forecast = r.u8();
        let et = r.u8();

        Ok(Self {
            archive_interval,
            flags1,
            flags2,
            packed_time,
            outside_temp,
            outside_temp_hi,
            outside_temp_low,
            inside_temp,
            barometer,
            outside_humidity,
            inside_humidity,
            rain,
            rain_rate_hi,
            wind_speed,
            wind_speed_gust,
            wind_dir,
            wind_dir_gust,
            wind_samples,
            solar,
            solar_hi,
            uv,
            uv_hi,
            forecast,
            et,
            soil_temp: r.bytes(),
            soil_moisture: r.bytes(),
            leaf_wetness: r.bytes(),
            extra_temp: r.bytes(),
            extra_humidity: r.bytes(),
        })
    }

    fn encode(&self) -> [u8; RECORD_SLOT_BYTES] {
        let mut w = SlotWriter::new(record_tags::ARCHIVE);
        w.u8(self.archive_interval);
        w.u8(self.flags1);
        w.u8(self.flags2);
        w.i16(self.packed_time);
        w.i16(self.outside_temp);
        w.i16(self.outside_temp_hi);
        w.i16(self.outside_temp_low);
        w.i16(self.inside_temp);
        w.i16(self.barometer);
        w.i16(self.outside_humidity);
        w.i16(self.inside_humidity);
        w.u16(self.rain.to_raw());
        w.i16(self.rain_rate_hi);
        w.i16(self.wind_speed);
        w.i16(self.wind_speed_gust);
        w.u8(self.wind_dir);
        w.u8(self.wind_dir_gust);
        w.i16(self.wind_samples);
        w.i16(self.solar);
        w.i16(self.solar_hi);
        w.u8(self.uv);
        w.u8(self.uv_hi);
        w.skip(4 + 2 + 12);
        w.u8(self.forecast);
        w.u8(self.et);
        w.put(&self.soil_temp);
        w.put(&self.soil_moisture);
        w.put(&self.leaf_wetness);
        w.put(&self.extra_temp);
        w.put(&self.extra_humidity);
        w.finish()
    }

    /// Wind transmitter id from the low three bits of the second flag byte
    pub fn wind_transmitter(&self) -> u8 {
        self.flags2 & 0x07
    }
}

// =============================================================================
// Daily summary 1 (type 2)
// =============================================================================

/// Time-of-extreme slots in [`DailySummary1::times`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summary1Time {
    HighTemp = 0,
    LowTemp = 1,
    HighInsideTemp = 2,
    LowInsideTemp = 3,
    HighWindChill = 4,
    LowWindChill = 5,
    HighDewPoint = 6,
    LowDewPoint = 7,
    HighHumidity = 8,
    LowHumidity = 9,
    HighInsideHumidity = 10,
    LowInsideHumidity = 11,
    HighBarometer = 12,
    LowBarometer = 13,
    HighGust = 14,
    HighAvgWind = 15,
    HighRainRate = 16,
    HighUv = 17,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailySummary1 {
    /// Minutes of data in the day
    pub data_span: i16,
    /// Tenths of °F
    pub outside_temp_hi: i16,
    pub outside_temp_low: i16,
    pub inside_temp_hi: i16,
    pub inside_temp_low: i16,
    pub outside_temp_avg: i16,
    pub inside_temp_avg: i16,
    pub wind_chill_hi: i16,
    pub wind_chill_low: i16,
    pub dew_point_hi: i16,
    pub dew_point_low: i16,
    pub wind_chill_avg: i16,
    pub dew_point_avg: i16,
    /// Tenths of %
    pub outside_humidity_hi: i16,
    pub outside_humidity_low: i16,
    pub inside_humidity_hi: i16,
    pub inside_humidity_low: i16,
    pub outside_humidity_avg: i16,
    /// Thousandths of inHg
    pub barometer_hi: i16,
    pub barometer_low: i16,
    pub barometer_avg: i16,
    /// Tenths of mph
    pub wind_gust_hi: i16,
    pub wind_avg: i16,
    /// Tenths of a mile
    pub wind_run: i16,
    pub wind_avg_hi: i16,
    pub wind_dir_gust_hi: u8,
    pub wind_dir_avg_hi: u8,
    /// Thousandths of an inch
    pub daily_rain_total: i16,
    pub rain_rate_hi: i16,
    /// Tenths of UV index
    pub uv_hi: u8,
    /// Minutes past midnight for each extreme
    pub times: [u16; SUMMARY1_TIME_SLOTS],
}

impl DailySummary1 {
    fn decode(body: &[u8]) -> std::result::Result<Self, DecodeError> {
        let mut r = BodyReader::new(body)?;

        r.skip(1); // padding
        let mut rec = Self {
            data_span: r.i16(),
            outside_temp_hi: r.i16(),
            outside_temp_low: r.i16(),
            inside_temp_hi: r.i16(),
            inside_temp_low: r.i16(),
            outside_temp_avg: r.i16(),
            inside_temp_avg: r.i16(),
            wind_chill_hi: r.i16(),
            wind_chill_low: r.i16(),
            dew_point_hi: r.i16(),
            dew_point_low: r.i16(),
            wind_chill_avg: r.i16(),
            dew_point_avg: r.i16(),
            outside_humidity_hi: r.i16(),
            outside_humidity_low: r.i16(),
            inside_humidity_hi: r.i16(),
            inside_humidity_low: r.i16(),
            outside_humidity_avg: r.i16(),
            barometer_hi: r.i16(),
            barometer_low: r.i16(),
            barometer_avg: r.i16(),
            wind_gust_hi: r.i16(),
            wind_avg: r.i16(),
            wind_run: r.i16(),
            wind_avg_hi: r.i16(),
            wind_dir_gust_hi: r.u8(),
            wind_dir_avg_hi: r.u8(),
            daily_rain_total: r.i16(),
            rain_rate_hi: r.i16(),
            uv_hi: 0,
            times: [0; SUMMARY1_TIME_SLOTS],
        };
        r.skip(2); // UV dose
        rec.uv_hi = r.u8();

        let packed: [u8; 27] = r.bytes();
        if let Some(times) = unpack_12bit(&packed, SUMMARY1_TIME_SLOTS) {
            rec.times.copy_from_slice(&times);
        }

        Ok(rec)
    }

    fn encode(&self) -> [u8; RECORD_SLOT_BYTES] {
        let mut w = SlotWriter::new(record_tags::DAILY_SUMMARY_1);
        w.skip(1);
        for v in [
            self.data_span,
            self.outside_temp_hi,
            self.outside_temp_low,
            self.inside_temp_hi,
            self.inside_temp_low,
            self.outside_temp_avg,
            self.inside_temp_avg,
            self.wind_chill_hi,
            self.wind_chill_low,
            self.dew_point_hi,
            self.dew_point_low,
            self.wind_chill_avg,
            self.dew_point_avg,
            self.outside_humidity_hi,
            self.outside_humidity_low,
            self.inside_humidity_hi,
            self.inside_humidity_low,
            self.outside_humidity_avg,
            self.barometer_hi,
            self.barometer_low,
            self.barometer_avg,
            self.wind_gust_hi,
            self.wind_avg,
            self.wind_run,
            self.wind_avg_hi,
        ] {
            w.i16(v);
        }
        w.u8(self.wind_dir_gust_hi);
        w.u8(self.wind_dir_avg_hi);
        w.i16(self.daily_rain_total);
        w.i16(self.rain_rate_hi);
        w.skip(2);
        w.u8(self.uv_hi);
        w.put(&pack_12bit(&self.times));
        w.finish()
    }

    pub fn time(&self, slot: Summary1Time) -> u16 {
        self.times[slot as usize]
    }
}

// =============================================================================
// Daily summary 2 (type 3)
// =============================================================================

/// Time-of-extreme slots in [`DailySummary2::times`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summary2Time {
    HighSolar = 0,
    HighHeatIndex = 1,
    LowHeatIndex = 2,
    HighThsw = 3,
    LowThsw = 4,
    HighThw = 5,
    LowThw = 6,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailySummary2 {
    pub num_wind_packets: i16,
    /// W/m², `i16::MAX` when there is no solar sensor
    pub solar_hi: i16,
    pub sunlight_minutes: i16,
    /// Thousandths of an inch
    pub daily_et: i16,
    /// Tenths of °F
    pub heat_index_hi: i16,
    pub heat_index_low: i16,
    pub heat_index_avg: i16,
    pub thsw_hi: i16,
    pub thsw_low: i16,
    pub thw_hi: i16,
    pub thw_low: i16,
    /// Tenths of a °F day, base 65 °F
    pub heat_degree_days: i16,
    pub cool_degree_days: i16,
    /// Direction frequency bins, kept raw
    pub dir_bins: [u8; 24],
    pub times: [u16; SUMMARY2_TIME_SLOTS],
}

impl DailySummary2 {
    fn decode(body: &[u8]) -> std::result::Result<Self, DecodeError> {
        let mut r = BodyReader::new(body)?;

        r.skip(1); // padding
        r.skip(2); // today's weather
        let num_wind_packets = r.i16();
        let solar_hi = r.i16();
        r.skip(2); // daily solar energy
        let sunlight_minutes = r.i16();
        let daily_et = r.i16();
        let heat_index_hi = r.i16();
        let heat_index_low = r.i16();
        let heat_index_avg = r.i16();
        let thsw_hi = r.i16();
        let thsw_low = r.i16();
        let thw_hi = r.i16();
        let thw_low = r.i16();
        let heat_degree_days = r.i16();
        r.skip(6); // wet bulb high, low and average
        let dir_bins = r.bytes();
        let packed: [u8; 15] = r.bytes();
        let cool_degree_days = r.i16();
        r.skip(11); // reserved

        let mut times = [0u16; SUMMARY2_TIME_SLOTS];
        if let Some(values) = unpack_12bit(&packed, SUMMARY2_TIME_SLOTS) {
            times.copy_from_slice(&values);
        }

        Ok(Self {
            num_wind_packets,
            solar_hi,
            sunlight_minutes,
            daily_et,
            heat_index_hi,
            heat_index_low,
            heat_index_avg,
            thsw_hi,
            thsw_low,
            thw_hi,
            thw_low,
            heat_degree_days,
            cool_degree_days,
            dir_bins,
            times,
        })
    }

    fn encode(&self) -> [u8; RECORD_SLOT_BYTES] {
        let mut w = SlotWriter::new(record_tags::DAILY_SUMMARY_2);
        w.skip(1 + 2);
        w.i16(self.num_wind_packets);
        w.i16(self.solar_hi);
        w.skip(2);
        for v in [
            self.sunlight_minutes,
            self.daily_et,
            self.heat_index_hi,
            self.heat_index_low,
            self.heat_index_avg,
            self.thsw_hi,
            self.thsw_low,
            self.thw_hi,
            self.thw_low,
            self.heat_degree_days,
        ] {
            w.i16(v);
        }
        w.skip(6);
        w.put(&self.dir_bins);
        w.put(&pack_12bit(&self.times));
        w.i16(self.cool_degree_days);
        w.skip(11);
        w.finish()
    }

    pub fn time(&self, slot: Summary2Time) -> u16 {
        self.times[slot as usize]
    }
}

// =============================================================================
// Dispatch
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WlkRecord {
    Archive(ArchiveRecord),
    Summary1(DailySummary1),
    Summary2(DailySummary2),
}

impl WlkRecord {
    pub fn tag(&self) -> u8 {
        match self {
            WlkRecord::Archive(_) => record_tags::ARCHIVE,
            WlkRecord::Summary1(_) => record_tags::DAILY_SUMMARY_1,
            WlkRecord::Summary2(_) => record_tags::DAILY_SUMMARY_2,
        }
    }

    /// Serialize to a full 88-byte slot
    pub fn encode(&self) -> [u8; RECORD_SLOT_BYTES] {
        match self {
            WlkRecord::Archive(rec) => rec.encode(),
            WlkRecord::Summary1(rec) => rec.encode(),
            WlkRecord::Summary2(rec) => rec.encode(),
        }
    }
}

/// Decode the 87-byte body that follows `tag`
pub fn decode_record(tag: u8, body: &[u8]) -> std::result::Result<WlkRecord, DecodeError> {
    match tag {
        record_tags::ARCHIVE => ArchiveRecord::decode(body).map(WlkRecord::Archive),
        record_tags::DAILY_SUMMARY_1 => DailySummary1::decode(body).map(WlkRecord::Summary1),
        record_tags::DAILY_SUMMARY_2 => DailySummary2::decode(body).map(WlkRecord::Summary2),
        other => Err(DecodeError::UnknownTag(other)),
    }
}

/// Decode a full slot, tag included
pub fn decode_slot(slot: &[u8]) -> std::result::Result<WlkRecord, DecodeError> {
    match slot.split_first() {
        Some((&tag, body)) => decode_record(tag, body),
        None => Err(DecodeError::ShortBody {
            expected: RECORD_BODY_BYTES,
            found: 0,
        }),
    }
}
