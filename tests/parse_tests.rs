// tests/parse_tests.rs
use id3v2_rs::*;
use proptest::prelude::*;

fn tag_bytes(version: u8, frames: &[u8], padding: usize) -> Vec<u8> {
    let mut bytes = b"ID3".to_vec();
    bytes.extend_from_slice(&[version, 0, 0]);
    bytes.extend_from_slice(&utils::encode_synchsafe((frames.len() + padding) as u32));
    bytes.extend_from_slice(frames);
    bytes.extend(std::iter::repeat(0).take(padding));
    bytes
}

#[test]
fn test_header_only_example() {
    let mut bytes = vec![0x49, 0x44, 0x33, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0A];
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(b"\xFF\xFBaudio");

    let tag = Tag::from_bytes(&bytes).unwrap();
    assert!(tag.is_empty());
    assert_eq!(tag.header.version.to_string(), "ID3v2.4.0");
}

#[test]
fn test_header_rejection() {
    let err = Tag::from_bytes(b"ID4\x04\x00\x00\x00\x00\x00\x00").unwrap_err();
    assert!(err.is_not_a_tag());

    let err = Tag::from_bytes(b"ID3\x05\x00\x00\x00\x00\x00\x00").unwrap_err();
    assert!(matches!(err, Id3Error::UnsupportedVersion(v) if v.major == 5));

    let err = Tag::from_bytes(b"ID3\x04\x00\x40\x00\x00\x00\x00").unwrap_err();
    assert!(matches!(err, Id3Error::Unsupported(UnsupportedFeature::ExtendedHeader)));

    let err = Tag::from_bytes(b"ID3\x03\x00\x80\x00\x00\x00\x00").unwrap_err();
    assert!(matches!(err, Id3Error::Unsupported(UnsupportedFeature::Unsynchronisation)));
}

#[test]
fn test_mixed_encodings() {
    let mut frames = Vec::new();
    // ISO-8859-1 title with a high byte
    frames.extend_from_slice(b"TIT2\x00\x00\x00\x05\x00\x00\x00Caf\xE9");
    // UTF-16 with BOM artist
    frames.extend_from_slice(b"TPE1\x00\x00\x00\x07\x00\x00\x01\xFF\xFEO\x00k\x00");
    // UTF-16BE album
    frames.extend_from_slice(b"TALB\x00\x00\x00\x05\x00\x00\x02\x00H\x00i");
    // UTF-8 publisher
    frames.extend_from_slice(b"TPUB\x00\x00\x00\x03\x00\x00\x03\xC3\xA9");

    let tag = Tag::from_bytes(&tag_bytes(4, &frames, 8)).unwrap();
    assert_eq!(tag.title(), Some("Café"));
    assert_eq!(tag.artist(), Some("Ok"));
    assert_eq!(tag.album(), Some("Hi"));
    assert_eq!(tag.publisher(), Some("é"));
}

#[test]
fn test_unknown_frames_survive_rewrite() {
    let mut frames = Vec::new();
    frames.extend_from_slice(b"USLT\x00\x00\x00\x0A\x00\x00\x00eng\x00words");
    frames.extend_from_slice(b"TIT2\x00\x00\x00\x02\x00\x00\x00x");

    let tag = Tag::from_bytes(&tag_bytes(4, &frames, 0)).unwrap();
    let uslt = tag.frames().first(FrameId::new("USLT").unwrap()).unwrap();
    assert_eq!(uslt.content, FrameContent::Unsupported(b"\x00eng\x00words".to_vec()));

    let rewritten = Tag::from_bytes(&tag.to_bytes(0).unwrap()).unwrap();
    assert_eq!(rewritten.frames(), tag.frames());
}

#[test]
fn test_partial_result_on_malformed_frame() {
    let mut frames = Vec::new();
    frames.extend_from_slice(b"TIT2\x00\x00\x00\x02\x00\x00\x00x");
    frames.extend_from_slice(b"TPE1\x00\x00\x00\x02\x00\x00\x00y");
    frames.extend_from_slice(b"tpe2\x00\x00\x00\x02\x00\x00\x00z");

    let err = Tag::from_bytes(&tag_bytes(4, &frames, 0)).unwrap_err();
    assert!(err.to_string().contains("2 frames"));
    let (tag, cause) = err.into_partial().unwrap();
    assert_eq!(tag.title(), Some("x"));
    assert_eq!(tag.artist(), Some("y"));
    assert!(matches!(cause, Id3Error::NotAFrameHeader { .. }));
}

#[test]
fn test_truncated_frame_is_partial() {
    let frames = b"TIT2\x00\x00\x01\x00\x00\x00\x00x";
    let err = Tag::from_bytes(&tag_bytes(4, frames, 0)).unwrap_err();
    let (tag, cause) = err.into_partial().unwrap();
    assert!(tag.is_empty());
    assert!(matches!(cause, Id3Error::TruncatedFrame { declared: 128, .. }));
}

#[test]
fn test_v3_frame_flags_and_sizes() {
    // 0x0080 is "compressed" in v2.3
    let frames = b"TIT2\x00\x00\x00\x02\x00\x80\x00x";
    let err = Tag::from_bytes(&tag_bytes(3, frames, 0)).unwrap_err();
    assert!(matches!(err, Id3Error::Unsupported(UnsupportedFeature::CompressedFrame)));

    // A 200-byte v2.3 frame: plain size 0xC8, which is not valid synchsafe
    let mut frames = b"PRIV\x00\x00\x00\xC8\x00\x00".to_vec();
    frames.extend_from_slice(b"me\x00");
    frames.extend(std::iter::repeat(9u8).take(197));
    let tag = Tag::from_bytes(&tag_bytes(3, &frames, 0)).unwrap();
    match &tag.frames().first(FrameId::PRIV).unwrap().content {
        FrameContent::Private { owner, data } => {
            assert_eq!(owner, "me");
            assert_eq!(data.len(), 197);
        }
        other => panic!("expected PRIV, got {:?}", other),
    }
}

#[test]
fn test_picture_roundtrip() {
    let mut tag = Tag::new();
    tag.add_frame(Frame::picture("image/png", PictureType::CoverFront, "cover", vec![0x89, b'P', b'N', b'G']));
    let parsed = Tag::from_bytes(&tag.to_bytes(0).unwrap()).unwrap();
    assert_eq!(parsed.frames(), tag.frames());
}

#[test]
fn test_trailing_empty_values_roundtrip() {
    let mut tag = Tag::new();
    tag.set_text_slice("TPE1", &["Alice", ""]).unwrap();
    tag.set_text("TXXX:KEY", "v\0").unwrap();
    tag.add_comment(&Comment::new("eng", "", "body\0"));

    let parsed = Tag::from_bytes(&tag.to_bytes(0).unwrap()).unwrap();
    assert_eq!(parsed.get_text_slice("TPE1").unwrap(), vec!["Alice", ""]);
    assert_eq!(parsed.get_text("TXXX:KEY").unwrap(), Some("v\0"));
    assert_eq!(parsed.frames(), tag.frames());
}

proptest! {
    #[test]
    fn prop_tag_size_roundtrip(size in 0u32..(1 << 28)) {
        let header = parse_header(&emit_header(size as usize).unwrap()).unwrap();
        prop_assert_eq!(header.size, size);
    }

    #[test]
    fn prop_text_tag_roundtrip(
        title in "[^\\x00]{0,40}",
        artist in "[^\\x00]{0,40}",
        padding in 0usize..64,
    ) {
        let mut tag = Tag::new();
        tag.set_title(title.clone());
        tag.set_artist(artist.clone());
        let bytes = tag.to_bytes(padding).unwrap();
        prop_assert_eq!(bytes.len(), 10 + tag.size() + padding);

        let parsed = Tag::from_bytes(&bytes).unwrap();
        prop_assert_eq!(parsed.title(), Some(title.as_str()));
        prop_assert_eq!(parsed.artist(), Some(artist.as_str()));
    }
}
