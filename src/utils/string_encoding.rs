// src/utils/string_encoding.rs
use crate::types::Encoding;
use smallvec::SmallVec;
use tracing::warn;

/// Decode a frame text field into a Rust string.
///
/// ISO-8859-1 maps byte-for-byte onto the first 256 code points. UTF-16 honours a
/// leading byte-order mark and falls back to big-endian without one. Invalid
/// sequences are replaced with U+FFFD rather than rejected.
pub fn decode_text(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Iso88591 => decode_latin1(bytes),
        Encoding::Utf16 | Encoding::Utf16Be => decode_utf16(bytes),
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
    }
}

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_utf16(bytes: &[u8]) -> String {
    let (big_endian, body) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (false, rest),
        [0xFE, 0xFF, rest @ ..] => (true, rest),
        _ => (true, bytes),
    };

    let units = body.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });

    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Encode a string for the wire in the given encoding.
///
/// UTF-16 with BOM is written little-endian. Code points above U+00FF have no
/// ISO-8859-1 representation and are clamped to `?`.
pub fn encode_text(s: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Iso88591 => encode_latin1(s),
        Encoding::Utf8 => s.as_bytes().to_vec(),
        Encoding::Utf16 => {
            let mut out = Vec::with_capacity(2 + s.len() * 2);
            out.extend_from_slice(&[0xFF, 0xFE]);
            for unit in s.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out
        }
        Encoding::Utf16Be => s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect(),
    }
}

pub fn encode_latin1(s: &str) -> Vec<u8> {
    let mut clamped = 0usize;
    let out: Vec<u8> = s
        .chars()
        .map(|c| match u8::try_from(c as u32) {
            Ok(b) => b,
            Err(_) => {
                clamped += 1;
                b'?'
            }
        })
        .collect();
    if clamped > 0 {
        warn!("Clamped {} code points outside ISO-8859-1 in {:?}", clamped, s);
    }
    out
}

/// Byte length of `encode_text(s, encoding)` without allocating
pub fn encoded_len(s: &str, encoding: Encoding) -> usize {
    match encoding {
        Encoding::Iso88591 => s.chars().count(),
        Encoding::Utf8 => s.len(),
        Encoding::Utf16 => 2 + s.encode_utf16().count() * 2,
        Encoding::Utf16Be => s.encode_utf16().count() * 2,
    }
}

/// Split `data` on the encoding's null terminator into at most `max_parts`
/// segments; the final segment keeps the unsplit remainder.
///
/// UTF-16 data is scanned on code-unit boundaries so a zero byte inside a unit
/// is never taken for a terminator.
pub fn split_terminated(data: &[u8], encoding: Encoding, max_parts: usize) -> SmallVec<[&[u8]; 2]> {
    let mut parts = SmallVec::new();
    if max_parts == 0 {
        return parts;
    }

    let step = encoding.terminator().len();
    let mut start = 0;
    let mut i = 0;
    while parts.len() + 1 < max_parts && i + step <= data.len() {
        if data[i..i + step].iter().all(|&b| b == 0) {
            parts.push(&data[start..i]);
            start = i + step;
        }
        i += step;
    }
    parts.push(&data[start..]);
    parts
}

/// Strip the one trailing terminator some writers append to the last text field.
///
/// Only a single terminator is removed; any NUL before it belongs to the value.
pub fn trim_terminator(data: &[u8], encoding: Encoding) -> &[u8] {
    let step = encoding.terminator().len();
    let mut end = data.len();
    if step == 2 {
        // Only whole code units can be terminators
        end -= end % 2;
    }
    if end >= step && data[end - step..end].iter().all(|&b| b == 0) {
        end -= step;
    }
    &data[..end]
}
