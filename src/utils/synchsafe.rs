// src/utils/synchsafe.rs
use crate::error::{Id3Error, Result};
use byteorder::{BigEndian, ByteOrder};

/// Largest value a 4-byte synchsafe integer can hold (2^28 - 1)
pub const SYNCHSAFE_MAX: u32 = (1 << 28) - 1;

/// Decode a 4-byte synchsafe integer. Bit 7 of every byte is ignored.
pub fn decode_synchsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | (b & 0x7F) as u32)
}

/// Encode `value` as a 4-byte synchsafe integer.
///
/// Only the low 28 bits are representable; callers bound sizes with
/// [`try_encode_synchsafe`] before reaching this point.
pub fn encode_synchsafe(value: u32) -> [u8; 4] {
    debug_assert!(value <= SYNCHSAFE_MAX, "synchsafe overflow: {}", value);
    let spread = (value & 0x7F)
        | ((value & 0x3F80) << 1)
        | ((value & 0x1F_C000) << 2)
        | ((value & 0x0FE0_0000) << 3);
    let mut out = [0u8; 4];
    BigEndian::write_u32(&mut out, spread);
    out
}

/// Encode a byte count, failing with [`Id3Error::TagTooLarge`] past 28 bits
pub fn try_encode_synchsafe(size: usize) -> Result<[u8; 4]> {
    if size > SYNCHSAFE_MAX as usize {
        return Err(Id3Error::TagTooLarge(size));
    }
    Ok(encode_synchsafe(size as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_values() {
        assert_eq!(encode_synchsafe(0), [0, 0, 0, 0]);
        assert_eq!(encode_synchsafe(0x7F), [0, 0, 0, 0x7F]);
        assert_eq!(encode_synchsafe(0x80), [0, 0, 1, 0]);
        assert_eq!(encode_synchsafe(1024), [0, 0, 0x08, 0]);
        assert_eq!(encode_synchsafe(SYNCHSAFE_MAX), [0x7F, 0x7F, 0x7F, 0x7F]);
        assert_eq!(decode_synchsafe([0, 0, 0x02, 0x01]), 257);
    }

    #[test]
    fn test_high_bit_ignored() {
        assert_eq!(decode_synchsafe([0x80, 0x80, 0x80, 0x8A]), 10);
        assert_eq!(decode_synchsafe([0xFF, 0xFF, 0xFF, 0xFF]), SYNCHSAFE_MAX);
    }

    #[test]
    fn test_encoded_bytes_never_set_high_bit() {
        for value in [1u32, 300, 65_535, 1 << 20, SYNCHSAFE_MAX] {
            assert!(encode_synchsafe(value).iter().all(|b| b & 0x80 == 0));
        }
    }

    #[test]
    fn test_try_encode_bounds() {
        assert!(try_encode_synchsafe(SYNCHSAFE_MAX as usize).is_ok());
        assert!(matches!(
            try_encode_synchsafe(SYNCHSAFE_MAX as usize + 1),
            Err(Id3Error::TagTooLarge(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_synchsafe_roundtrip(value in 0u32..=SYNCHSAFE_MAX) {
            prop_assert_eq!(decode_synchsafe(encode_synchsafe(value)), value);
        }
    }
}
