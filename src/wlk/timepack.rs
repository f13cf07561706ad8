//! 12-bit packed minute offsets used by the daily summary records.
//!
//! Two values share three bytes: byte 0 holds the low 8 bits of the even
//! value, byte 1 the low 8 bits of the odd value, and byte 2 carries both
//! high nibbles (even value in the low nibble, odd value in the high nibble).

/// Largest value a 12-bit slot can hold
pub const MAX_PACKED_VALUE: u16 = 0x0FFF;

/// Bytes needed to hold `count` packed values
pub const fn packed_len(count: usize) -> usize {
    count.div_ceil(2) * 3
}

/// Unpack `count` 12-bit values. Returns `None` if `bytes` is too short.
pub fn unpack_12bit(bytes: &[u8], count: usize) -> Option<Vec<u16>> {
    if bytes.len() < packed_len(count) {
        return None;
    }

    let values = (0..count)
        .map(|i| {
            let base = (i / 2) * 3;
            let shared = u16::from(bytes[base + 2]);
            if i % 2 == 0 {
                u16::from(bytes[base]) | ((shared & 0x0F) << 8)
            } else {
                u16::from(bytes[base + 1]) | ((shared & 0xF0) << 4)
            }
        })
        .collect();

    Some(values)
}

/// Inverse of [`unpack_12bit`]. Values above 4095 are truncated to 12 bits.
pub fn pack_12bit(values: &[u16]) -> Vec<u8> {
    let mut bytes = vec![0u8; packed_len(values.len())];

    for (i, &value) in values.iter().enumerate() {
        let value = value & MAX_PACKED_VALUE;
        let base = (i / 2) * 3;
        let low = (value & 0xFF) as u8;
        let high = (value >> 8) as u8;
        if i % 2 == 0 {
            bytes[base] = low;
            bytes[base + 2] |= high;
        } else {
            bytes[base + 1] = low;
            bytes[base + 2] |= high << 4;
        }
    }

    bytes
}
