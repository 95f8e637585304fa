// src/header/tag_header.rs
use crate::error::{Id3Error, Result, UnsupportedFeature};
use crate::types::{HeaderFlags, Version};
use crate::utils::{decode_synchsafe, try_encode_synchsafe};
use std::io::{Read, Write};

/// ID3v2 tag header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagHeader {
    pub version: Version,
    pub flags: HeaderFlags,
    /// Size of the tag excluding this 10-byte header
    pub size: u32,
}

impl TagHeader {
    pub const SIZE: usize = 10;
    pub const MAGIC: &'static [u8; 3] = b"ID3";

    /// Byte offset at which the audio data following this tag begins
    pub fn tag_end(&self) -> u64 {
        Self::SIZE as u64 + self.size as u64
    }
}

/// Parse the 10-byte tag header.
///
/// A magic mismatch yields [`Id3Error::NotATagHeader`], which callers treat as an
/// untagged file. Extended headers and unsynchronised tags are rejected outright.
pub fn parse_header(bytes: &[u8; TagHeader::SIZE]) -> Result<TagHeader> {
    let magic = [bytes[0], bytes[1], bytes[2]];
    if &magic != TagHeader::MAGIC {
        return Err(Id3Error::NotATagHeader { magic });
    }

    let version = Version::new(bytes[3], bytes[4]);
    if !version.is_supported() {
        return Err(Id3Error::UnsupportedVersion(version));
    }

    let flags = HeaderFlags::new(bytes[5]);
    if flags.extended_header() {
        return Err(Id3Error::Unsupported(UnsupportedFeature::ExtendedHeader));
    }
    if flags.unsynchronisation() {
        return Err(Id3Error::Unsupported(UnsupportedFeature::Unsynchronisation));
    }

    let size = decode_synchsafe([bytes[6], bytes[7], bytes[8], bytes[9]]);

    Ok(TagHeader { version, flags, size })
}

/// Read and parse a tag header from the current position of `reader`
pub fn read_header<R: Read>(reader: &mut R) -> Result<TagHeader> {
    let mut bytes = [0u8; TagHeader::SIZE];
    reader.read_exact(&mut bytes)?;
    parse_header(&bytes)
}

/// Build a header for a tag body of `total_size` bytes.
///
/// Always written as ID3v2.4.0 with no flags set.
pub fn emit_header(total_size: usize) -> Result<[u8; TagHeader::SIZE]> {
    let size = try_encode_synchsafe(total_size)?;
    let version = Version::CURRENT.to_bytes();

    let mut out = [0u8; TagHeader::SIZE];
    out[0..3].copy_from_slice(TagHeader::MAGIC);
    out[3..5].copy_from_slice(&version);
    out[5] = 0;
    out[6..10].copy_from_slice(&size);
    Ok(out)
}

pub fn write_header<W: Write>(writer: &mut W, total_size: usize) -> Result<()> {
    writer.write_all(&emit_header(total_size)?)?;
    Ok(())
}
