// src/frame/reader.rs
use crate::error::{Id3Error, Result, UnsupportedFeature};
use crate::frame::{Frame, FrameContent, FrameHeader, FrameId};
use crate::types::{Encoding, FrameFlags, PictureType, Version};
use crate::utils::{decode_latin1, decode_synchsafe, decode_text, split_terminated, trim_terminator};
use byteorder::{BigEndian, ByteOrder};
use std::io::{ErrorKind, Read};
use tracing::debug;

/// Streams frames out of a tag body.
///
/// The reader is bounded by the tag's declared size; it never reads past it.
/// Running into padding (a zero identifier) or into fewer bytes than a frame
/// header ends the stream cleanly.
pub struct FrameReader<R: Read> {
    inner: R,
    version: Version,
    remaining: usize,
    finished: bool,
}

impl<R: Read> FrameReader<R> {
    /// `tag_size` is the size from the tag header, excluding the header itself
    pub fn new(inner: R, version: Version, tag_size: usize) -> Self {
        FrameReader { inner, version, remaining: tag_size, finished: false }
    }

    /// Bytes of the tag body not yet consumed
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Read the next frame, or `None` at padding or the end of the tag
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }
        if self.remaining < FrameHeader::SIZE {
            self.finished = true;
            return Ok(None);
        }

        let mut raw = [0u8; FrameHeader::SIZE];
        match self.inner.read_exact(&mut raw) {
            Ok(()) => {}
            // The file ended before the tag did; treat it like the end of the tag
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finished = true;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }
        self.remaining -= FrameHeader::SIZE;

        let id_bytes = [raw[0], raw[1], raw[2], raw[3]];
        if id_bytes == [0; 4] {
            debug!("Reached padding with {} bytes left in tag", self.remaining + FrameHeader::SIZE);
            self.finished = true;
            return Ok(None);
        }

        let id = FrameId::from_bytes(id_bytes).ok_or_else(|| {
            self.finished = true;
            Id3Error::NotAFrameHeader { id: id_bytes }
        })?;

        let size = if self.version.major >= 4 {
            decode_synchsafe([raw[4], raw[5], raw[6], raw[7]])
        } else {
            BigEndian::read_u32(&raw[4..8])
        } as usize;
        let flags = FrameFlags::from_raw(BigEndian::read_u16(&raw[8..10]), self.version);

        if let Some(feature) = undecodable_feature(&flags) {
            self.finished = true;
            return Err(Id3Error::Unsupported(feature));
        }

        if size > self.remaining {
            self.finished = true;
            return Err(Id3Error::TruncatedFrame {
                id: id.to_string(),
                declared: size,
                available: self.remaining,
            });
        }

        let mut payload = vec![0u8; size];
        if let Err(e) = self.inner.read_exact(&mut payload) {
            self.finished = true;
            if e.kind() == ErrorKind::UnexpectedEof {
                return Err(Id3Error::TruncatedFrame {
                    id: id.to_string(),
                    declared: size,
                    available: 0,
                });
            }
            return Err(e.into());
        }
        self.remaining -= size;

        let header = FrameHeader { id, flags };
        Ok(Some(Frame { header, content: decode_content(id, payload) }))
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

/// Parse exactly one frame from `bytes` using the frame layout of `version`
pub fn parse_frame(bytes: &[u8], version: Version) -> Result<Frame> {
    let mut reader = FrameReader::new(bytes, version, bytes.len());
    reader.next_frame()?.ok_or(Id3Error::NotAFrameHeader { id: [0; 4] })
}

fn undecodable_feature(flags: &FrameFlags) -> Option<UnsupportedFeature> {
    if flags.compressed {
        Some(UnsupportedFeature::CompressedFrame)
    } else if flags.encrypted {
        Some(UnsupportedFeature::EncryptedFrame)
    } else if flags.grouped {
        Some(UnsupportedFeature::GroupedFrame)
    } else if flags.unsynchronised {
        Some(UnsupportedFeature::FrameUnsynchronisation)
    } else if flags.data_length_indicator {
        Some(UnsupportedFeature::DataLengthIndicator)
    } else {
        None
    }
}

/// Dispatch on the identifier. Payloads too short for their layout fall back
/// to `Unsupported` so their bytes survive a rewrite untouched.
fn decode_content(id: FrameId, payload: Vec<u8>) -> FrameContent {
    if id == FrameId::MCDI {
        return FrameContent::MusicCdId(payload);
    }

    let decoded = if id.is_text() {
        decode_text_information(&payload)
    } else if id.is_url() {
        Some(FrameContent::Url(decode_latin1(trim_terminator(&payload, Encoding::Iso88591))))
    } else {
        match id {
            FrameId::TXXX => decode_user_text(&payload),
            FrameId::WXXX => decode_user_url(&payload),
            FrameId::UFID => decode_unique_file_id(&payload),
            FrameId::COMM => decode_comment(&payload),
            FrameId::APIC => decode_picture(&payload),
            FrameId::PRIV => decode_private(&payload),
            _ => None,
        }
    };

    decoded.unwrap_or(FrameContent::Unsupported(payload))
}

/// Split off the encoding byte. Unknown markers are read as ISO-8859-1, which
/// keeps every byte of the text.
fn split_encoding(payload: &[u8]) -> Option<(Encoding, &[u8])> {
    let (&marker, rest) = payload.split_first()?;
    Some((Encoding::from_u8(marker).unwrap_or(Encoding::Iso88591), rest))
}

fn decode_text_information(payload: &[u8]) -> Option<FrameContent> {
    if payload.is_empty() {
        return Some(FrameContent::Text(String::new()));
    }
    let (encoding, rest) = split_encoding(payload)?;
    Some(FrameContent::Text(decode_text(trim_terminator(rest, encoding), encoding)))
}

fn decode_user_text(payload: &[u8]) -> Option<FrameContent> {
    let (encoding, rest) = split_encoding(payload)?;
    let (description, text) = two_fields(rest, encoding);
    Some(FrameContent::UserText {
        description: decode_text(description, encoding),
        text: decode_text(trim_terminator(text, encoding), encoding),
    })
}

fn decode_user_url(payload: &[u8]) -> Option<FrameContent> {
    let (encoding, rest) = split_encoding(payload)?;
    let (description, url) = two_fields(rest, encoding);
    Some(FrameContent::UserUrl {
        description: decode_text(description, encoding),
        url: decode_latin1(trim_terminator(url, Encoding::Iso88591)),
    })
}

fn decode_unique_file_id(payload: &[u8]) -> Option<FrameContent> {
    let (owner, identifier) = two_fields(payload, Encoding::Iso88591);
    Some(FrameContent::UniqueFileId {
        owner: decode_latin1(owner),
        identifier: identifier.to_vec(),
    })
}

fn decode_comment(payload: &[u8]) -> Option<FrameContent> {
    let (encoding, rest) = split_encoding(payload)?;
    if rest.len() < 3 {
        return None;
    }
    let language = [rest[0], rest[1], rest[2]];
    let (description, text) = two_fields(&rest[3..], encoding);
    Some(FrameContent::Comment {
        language,
        description: decode_text(description, encoding),
        text: decode_text(trim_terminator(text, encoding), encoding),
    })
}

fn decode_picture(payload: &[u8]) -> Option<FrameContent> {
    let (encoding, rest) = split_encoding(payload)?;
    let (mime, rest) = two_fields(rest, Encoding::Iso88591);
    let (&picture_type, rest) = rest.split_first()?;
    let (description, data) = two_fields(rest, encoding);
    Some(FrameContent::Picture {
        mime_type: decode_latin1(mime),
        picture_type: PictureType::from_u8(picture_type),
        description: decode_text(description, encoding),
        data: data.to_vec(),
    })
}

fn decode_private(payload: &[u8]) -> Option<FrameContent> {
    let (owner, data) = two_fields(payload, Encoding::Iso88591);
    Some(FrameContent::Private { owner: decode_latin1(owner), data: data.to_vec() })
}

/// First terminated field and everything after it (empty when unterminated)
fn two_fields(data: &[u8], encoding: Encoding) -> (&[u8], &[u8]) {
    let parts = split_terminated(data, encoding, 2);
    match parts.as_slice() {
        [first, second] => (*first, *second),
        [first] => (*first, &[]),
        _ => (&[], &[]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame(id: &[u8; 4], payload: &[u8], flags: u16) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&crate::utils::encode_synchsafe(payload.len() as u32));
        out.extend_from_slice(&flags.to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_text_frame_encodings() {
        let latin = raw_frame(b"TIT2", &[0, b'C', b'a', b'f', 0xE9], 0);
        let frame = parse_frame(&latin, Version::CURRENT).unwrap();
        assert_eq!(frame.content, FrameContent::Text("Café".into()));

        let utf16 = raw_frame(b"TPE1", &[1, 0xFF, 0xFE, b'A', 0, b'B', 0, 0, 0], 0);
        let frame = parse_frame(&utf16, Version::CURRENT).unwrap();
        assert_eq!(frame.content, FrameContent::Text("AB".into()));

        let utf16be = raw_frame(b"TALB", &[2, 0, b'X'], 0);
        let frame = parse_frame(&utf16be, Version::CURRENT).unwrap();
        assert_eq!(frame.content, FrameContent::Text("X".into()));
    }

    #[test]
    fn test_only_one_trailing_terminator_is_stripped() {
        let frame = parse_frame(&raw_frame(b"TPE1", b"\x03Alice\0\0", 0), Version::CURRENT).unwrap();
        assert_eq!(frame.content, FrameContent::Text("Alice\0".into()));

        let utf16 = [1, 0xFF, 0xFE, b'A', 0, 0, 0, 0, 0];
        let frame = parse_frame(&raw_frame(b"TPE1", &utf16, 0), Version::CURRENT).unwrap();
        assert_eq!(frame.content, FrameContent::Text("A\0".into()));
    }

    #[test]
    fn test_v3_frame_size_is_plain_integer() {
        // 200 bytes: plain 0x000000C8, synchsafe would read it as 0x48
        let mut payload = vec![0u8];
        payload.extend(std::iter::repeat(b'a').take(199));
        let mut raw = b"TIT2".to_vec();
        raw.extend_from_slice(&200u32.to_be_bytes());
        raw.extend_from_slice(&[0, 0]);
        raw.extend_from_slice(&payload);

        let frame = parse_frame(&raw, Version::V3).unwrap();
        assert_eq!(frame.value().map(str::len), Some(199));
    }

    #[test]
    fn test_user_text_utf16_fields() {
        let payload = [1, 0xFF, 0xFE, b'K', 0, 0, 0, 0xFF, 0xFE, b'V', 0];
        let frame = parse_frame(&raw_frame(b"TXXX", &payload, 0), Version::CURRENT).unwrap();
        assert_eq!(
            frame.content,
            FrameContent::UserText { description: "K".into(), text: "V".into() }
        );
    }

    #[test]
    fn test_user_url_description_and_latin1_url() {
        let frame = parse_frame(
            &raw_frame(b"WXXX", b"\x03home\0http://a.b/\xE9", 0),
            Version::CURRENT,
        )
        .unwrap();
        assert_eq!(
            frame.content,
            FrameContent::UserUrl { description: "home".into(), url: "http://a.b/é".into() }
        );
    }

    #[test]
    fn test_ufid_keeps_identifier_bytes() {
        let frame = parse_frame(
            &raw_frame(b"UFID", b"http://musicbrainz.org\0\x00\xFF\x10", 0),
            Version::CURRENT,
        )
        .unwrap();
        assert_eq!(
            frame.content,
            FrameContent::UniqueFileId {
                owner: "http://musicbrainz.org".into(),
                identifier: vec![0x00, 0xFF, 0x10],
            }
        );
    }

    #[test]
    fn test_comment_layout() {
        let frame = parse_frame(&raw_frame(b"COMM", b"\x00engdesc\0body", 0), Version::CURRENT).unwrap();
        assert_eq!(
            frame.content,
            FrameContent::Comment {
                language: *b"eng",
                description: "desc".into(),
                text: "body".into(),
            }
        );
    }

    #[test]
    fn test_short_comment_falls_back_to_unsupported() {
        let frame = parse_frame(&raw_frame(b"COMM", b"\x00en", 0), Version::CURRENT).unwrap();
        assert_eq!(frame.content, FrameContent::Unsupported(b"\x00en".to_vec()));
    }

    #[test]
    fn test_picture_layout() {
        let payload = b"\x03image/png\0\x03cover\0\x89PNG";
        let frame = parse_frame(&raw_frame(b"APIC", payload, 0), Version::CURRENT).unwrap();
        assert_eq!(
            frame.content,
            FrameContent::Picture {
                mime_type: "image/png".into(),
                picture_type: PictureType::CoverFront,
                description: "cover".into(),
                data: b"\x89PNG".to_vec(),
            }
        );
    }

    #[test]
    fn test_unknown_frame_is_kept_verbatim() {
        let payload = b"\x00eng\0some lyrics";
        let frame = parse_frame(&raw_frame(b"USLT", payload, 0), Version::CURRENT).unwrap();
        assert_eq!(frame.id(), "USLT");
        assert_eq!(frame.content, FrameContent::Unsupported(payload.to_vec()));
    }

    #[test]
    fn test_invalid_identifier() {
        let raw = raw_frame(b"tit2", b"\x03x", 0);
        assert!(matches!(
            parse_frame(&raw, Version::CURRENT),
            Err(Id3Error::NotAFrameHeader { id }) if &id == b"tit2"
        ));
    }

    #[test]
    fn test_compressed_encrypted_grouped_are_rejected() {
        let cases = [
            (0x0008u16, Version::CURRENT, UnsupportedFeature::CompressedFrame),
            (0x0004, Version::CURRENT, UnsupportedFeature::EncryptedFrame),
            (0x0040, Version::CURRENT, UnsupportedFeature::GroupedFrame),
            (0x0002, Version::CURRENT, UnsupportedFeature::FrameUnsynchronisation),
            (0x0080, Version::V3, UnsupportedFeature::CompressedFrame),
            (0x0040, Version::V3, UnsupportedFeature::EncryptedFrame),
            (0x0020, Version::V3, UnsupportedFeature::GroupedFrame),
        ];
        for (flags, version, expected) in cases {
            // A 2-byte size reads the same synchsafe or plain
            let raw = raw_frame(b"TIT2", b"\x03x", flags);
            match parse_frame(&raw, version) {
                Err(Id3Error::Unsupported(feature)) => assert_eq!(feature, expected),
                other => panic!("flags {flags:#06x}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_status_flags_are_preserved() {
        let frame = parse_frame(&raw_frame(b"TIT2", b"\x03x", 0x6000), Version::CURRENT).unwrap();
        assert!(frame.flags().discard_on_tag_alter);
        assert!(frame.flags().discard_on_file_alter);
        assert!(!frame.flags().read_only);
        assert!(!frame.flags().preserve_on_tag_alter());
    }

    #[test]
    fn test_reader_stops_at_padding() {
        let mut body = raw_frame(b"TIT2", b"\x03One", 0);
        body.extend(raw_frame(b"TALB", b"\x03Two", 0));
        body.extend(vec![0u8; 32]);

        let frames: Vec<Frame> = FrameReader::new(body.as_slice(), Version::CURRENT, body.len())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].value(), Some("Two"));
    }

    #[test]
    fn test_reader_stops_on_short_tail() {
        let mut body = raw_frame(b"TIT2", b"\x03One", 0);
        body.extend_from_slice(b"TAL");
        let mut reader = FrameReader::new(body.as_slice(), Version::CURRENT, body.len());
        assert!(reader.next_frame().unwrap().is_some());
        assert!(reader.next_frame().unwrap().is_none());
        assert!(reader.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_reader_rejects_oversized_frame() {
        let mut body = raw_frame(b"TIT2", b"\x03One", 0);
        body[7] = 0x7F;
        let mut reader = FrameReader::new(body.as_slice(), Version::CURRENT, body.len());
        assert!(matches!(
            reader.next_frame(),
            Err(Id3Error::TruncatedFrame { declared: 127, available: 4, .. })
        ));
    }
}
