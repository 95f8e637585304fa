// src/types.rs
use std::fmt;

/// ID3v2 tag version (`major.minor`, e.g. 4.0 for ID3v2.4.0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    /// The version every tag is written as
    pub const CURRENT: Version = Version { major: 4, minor: 0 };
    pub const V3: Version = Version { major: 3, minor: 0 };

    pub fn new(major: u8, minor: u8) -> Self {
        Version { major, minor }
    }

    /// Whether this codec can read tags of this version
    pub fn is_supported(&self) -> bool {
        (3..=4).contains(&self.major)
    }

    pub fn to_bytes(&self) -> [u8; 2] {
        [self.major, self.minor]
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID3v2.{}.{}", self.major, self.minor)
    }
}

/// Tag header flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderFlags(u8);

impl HeaderFlags {
    pub const UNSYNCHRONISATION: u8 = 1 << 7;
    pub const EXTENDED_HEADER: u8 = 1 << 6;
    pub const EXPERIMENTAL: u8 = 1 << 5;
    pub const UNDEFINED: u8 = 0x1F;

    pub fn new(flags: u8) -> Self {
        HeaderFlags(flags)
    }

    pub fn empty() -> Self {
        HeaderFlags(0)
    }

    pub fn unsynchronisation(&self) -> bool {
        self.0 & Self::UNSYNCHRONISATION != 0
    }

    pub fn extended_header(&self) -> bool {
        self.0 & Self::EXTENDED_HEADER != 0
    }

    pub fn experimental(&self) -> bool {
        self.0 & Self::EXPERIMENTAL != 0
    }

    pub fn undefined_bits_set(&self) -> bool {
        self.0 & Self::UNDEFINED != 0
    }

    pub fn raw_value(&self) -> u8 {
        self.0
    }
}

/// Per-frame flags, normalised across the v2.3 and v2.4 bit layouts.
///
/// The status bits are stored as "discard" markers, which is how both versions
/// encode them on disk; `preserve_on_*` are the negations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFlags {
    pub discard_on_tag_alter: bool,
    pub discard_on_file_alter: bool,
    pub read_only: bool,
    pub grouped: bool,
    pub compressed: bool,
    pub encrypted: bool,
    pub unsynchronised: bool,
    pub data_length_indicator: bool,
}

impl FrameFlags {
    // ID3v2.3: %abc00000 %ijk00000
    const V3_TAG_ALTER: u16 = 0x8000;
    const V3_FILE_ALTER: u16 = 0x4000;
    const V3_READ_ONLY: u16 = 0x2000;
    const V3_COMPRESSED: u16 = 0x0080;
    const V3_ENCRYPTED: u16 = 0x0040;
    const V3_GROUPED: u16 = 0x0020;

    // ID3v2.4: %0abc0000 %0h00kmnp
    const V4_TAG_ALTER: u16 = 0x4000;
    const V4_FILE_ALTER: u16 = 0x2000;
    const V4_READ_ONLY: u16 = 0x1000;
    const V4_GROUPED: u16 = 0x0040;
    const V4_COMPRESSED: u16 = 0x0008;
    const V4_ENCRYPTED: u16 = 0x0004;
    const V4_UNSYNCHRONISED: u16 = 0x0002;
    const V4_DATA_LENGTH: u16 = 0x0001;

    pub fn empty() -> Self {
        FrameFlags::default()
    }

    /// Decode the two flag bytes using the layout of the given tag version
    pub fn from_raw(raw: u16, version: Version) -> Self {
        if version.major == 3 {
            FrameFlags {
                discard_on_tag_alter: raw & Self::V3_TAG_ALTER != 0,
                discard_on_file_alter: raw & Self::V3_FILE_ALTER != 0,
                read_only: raw & Self::V3_READ_ONLY != 0,
                grouped: raw & Self::V3_GROUPED != 0,
                compressed: raw & Self::V3_COMPRESSED != 0,
                encrypted: raw & Self::V3_ENCRYPTED != 0,
                unsynchronised: false,
                data_length_indicator: false,
            }
        } else {
            FrameFlags {
                discard_on_tag_alter: raw & Self::V4_TAG_ALTER != 0,
                discard_on_file_alter: raw & Self::V4_FILE_ALTER != 0,
                read_only: raw & Self::V4_READ_ONLY != 0,
                grouped: raw & Self::V4_GROUPED != 0,
                compressed: raw & Self::V4_COMPRESSED != 0,
                encrypted: raw & Self::V4_ENCRYPTED != 0,
                unsynchronised: raw & Self::V4_UNSYNCHRONISED != 0,
                data_length_indicator: raw & Self::V4_DATA_LENGTH != 0,
            }
        }
    }

    /// Encode using the ID3v2.4 layout, the only layout this crate writes
    pub fn to_raw_v4(&self) -> u16 {
        let mut raw = 0u16;
        let bits = [
            (self.discard_on_tag_alter, Self::V4_TAG_ALTER),
            (self.discard_on_file_alter, Self::V4_FILE_ALTER),
            (self.read_only, Self::V4_READ_ONLY),
            (self.grouped, Self::V4_GROUPED),
            (self.compressed, Self::V4_COMPRESSED),
            (self.encrypted, Self::V4_ENCRYPTED),
            (self.unsynchronised, Self::V4_UNSYNCHRONISED),
            (self.data_length_indicator, Self::V4_DATA_LENGTH),
        ];
        for (set, bit) in bits {
            if set {
                raw |= bit;
            }
        }
        raw
    }

    pub fn preserve_on_tag_alter(&self) -> bool {
        !self.discard_on_tag_alter
    }

    pub fn preserve_on_file_alter(&self) -> bool {
        !self.discard_on_file_alter
    }
}

/// Text encoding marker carried in the first payload byte of text-bearing frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Encoding {
    Iso88591 = 0,
    Utf16 = 1,
    Utf16Be = 2,
    Utf8 = 3,
}

impl Encoding {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Encoding::Iso88591),
            1 => Some(Encoding::Utf16),
            2 => Some(Encoding::Utf16Be),
            3 => Some(Encoding::Utf8),
            _ => None,
        }
    }

    /// Null terminator for strings in this encoding
    pub fn terminator(&self) -> &'static [u8] {
        match self {
            Encoding::Utf16 | Encoding::Utf16Be => &[0, 0],
            Encoding::Iso88591 | Encoding::Utf8 => &[0],
        }
    }

    pub fn is_utf16(&self) -> bool {
        matches!(self, Encoding::Utf16 | Encoding::Utf16Be)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Iso88591 => "ISO-8859-1",
            Encoding::Utf16 => "UTF-16",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf8 => "UTF-8",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attached picture kind (APIC picture type byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureType {
    Other,
    FileIcon,
    OtherFileIcon,
    CoverFront,
    CoverBack,
    Leaflet,
    Media,
    LeadArtist,
    Artist,
    Conductor,
    Band,
    Composer,
    Lyricist,
    RecordingLocation,
    DuringRecording,
    DuringPerformance,
    ScreenCapture,
    BrightColouredFish,
    Illustration,
    BandLogo,
    PublisherLogo,
    Undefined(u8),
}

impl PictureType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => PictureType::Other,
            0x01 => PictureType::FileIcon,
            0x02 => PictureType::OtherFileIcon,
            0x03 => PictureType::CoverFront,
            0x04 => PictureType::CoverBack,
            0x05 => PictureType::Leaflet,
            0x06 => PictureType::Media,
            0x07 => PictureType::LeadArtist,
            0x08 => PictureType::Artist,
            0x09 => PictureType::Conductor,
            0x0A => PictureType::Band,
            0x0B => PictureType::Composer,
            0x0C => PictureType::Lyricist,
            0x0D => PictureType::RecordingLocation,
            0x0E => PictureType::DuringRecording,
            0x0F => PictureType::DuringPerformance,
            0x10 => PictureType::ScreenCapture,
            0x11 => PictureType::BrightColouredFish,
            0x12 => PictureType::Illustration,
            0x13 => PictureType::BandLogo,
            0x14 => PictureType::PublisherLogo,
            other => PictureType::Undefined(other),
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            PictureType::Other => 0x00,
            PictureType::FileIcon => 0x01,
            PictureType::OtherFileIcon => 0x02,
            PictureType::CoverFront => 0x03,
            PictureType::CoverBack => 0x04,
            PictureType::Leaflet => 0x05,
            PictureType::Media => 0x06,
            PictureType::LeadArtist => 0x07,
            PictureType::Artist => 0x08,
            PictureType::Conductor => 0x09,
            PictureType::Band => 0x0A,
            PictureType::Composer => 0x0B,
            PictureType::Lyricist => 0x0C,
            PictureType::RecordingLocation => 0x0D,
            PictureType::DuringRecording => 0x0E,
            PictureType::DuringPerformance => 0x0F,
            PictureType::ScreenCapture => 0x10,
            PictureType::BrightColouredFish => 0x11,
            PictureType::Illustration => 0x12,
            PictureType::BandLogo => 0x13,
            PictureType::PublisherLogo => 0x14,
            PictureType::Undefined(value) => *value,
        }
    }
}
