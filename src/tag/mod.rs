// src/tag/mod.rs
//! In-memory tag: a header plus the frame store.

mod accessors;
mod frames_map;
mod upgrade;

pub use accessors::Comment;
pub use frames_map::FramesMap;

use crate::error::{Id3Error, Result};
use crate::frame::{Frame, FrameReader};
use crate::header::{read_header, write_header, TagHeader};
use crate::types::{HeaderFlags, Version};
use std::io::{self, Read, Write};
use tracing::debug;

/// An ID3v2 tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub header: TagHeader,
    frames: FramesMap,
}

impl Default for Tag {
    fn default() -> Self {
        Tag::new()
    }
}

impl Tag {
    /// An empty ID3v2.4.0 tag
    pub fn new() -> Self {
        Tag {
            header: TagHeader { version: Version::CURRENT, flags: HeaderFlags::empty(), size: 0 },
            frames: FramesMap::new(),
        }
    }

    /// Parse a tag, header first, from the current position of `reader`.
    ///
    /// A malformed or truncated frame stops parsing; the frames read before
    /// it are returned inside [`Id3Error::Partial`].
    pub fn parse<R: Read>(reader: &mut R) -> Result<Tag> {
        let header = read_header(reader)?;
        Self::parse_body(reader, header)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Tag> {
        let mut reader = bytes;
        Self::parse(&mut reader)
    }

    /// Parse the frames of a tag whose header has already been consumed
    pub fn parse_body<R: Read>(reader: R, header: TagHeader) -> Result<Tag> {
        let body = reader.take(u64::from(header.size));
        let mut frames = FrameReader::new(body, header.version, header.size as usize);
        let mut tag = Tag { header, frames: FramesMap::new() };

        loop {
            match frames.next_frame() {
                Ok(Some(frame)) => tag.frames.add_frame(frame),
                Ok(None) => break,
                Err(err @ (Id3Error::NotAFrameHeader { .. } | Id3Error::TruncatedFrame { .. })) => {
                    return Err(Id3Error::Partial { tag: Box::new(tag), source: Box::new(err) });
                }
                Err(err) => return Err(err),
            }
        }

        debug!("Parsed {} tag with {} frames", tag.header.version, tag.len());
        Ok(tag)
    }

    /// Encoded size of all frames, excluding the tag header and padding
    pub fn size(&self) -> usize {
        self.frames.size()
    }

    /// Write the tag with `padding` zero bytes after the frames
    pub fn encode<W: Write>(&self, writer: &mut W, padding: usize) -> Result<()> {
        self.write_image(writer, self.size() + padding)
    }

    pub fn to_bytes(&self, padding: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(TagHeader::SIZE + self.size() + padding);
        self.encode(&mut out, padding)?;
        Ok(out)
    }

    /// Write header, frames and zero fill for a tag body of exactly `tag_size` bytes
    pub(crate) fn write_image<W: Write>(&self, writer: &mut W, tag_size: usize) -> Result<()> {
        let frames_size = self.size();
        debug_assert!(frames_size <= tag_size);

        write_header(writer, tag_size)?;
        self.frames.encode_all(writer)?;
        let fill = tag_size.saturating_sub(frames_size) as u64;
        io::copy(&mut io::repeat(0).take(fill), writer)?;
        Ok(())
    }

    pub fn frames(&self) -> &FramesMap {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut FramesMap {
        &mut self.frames
    }

    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.add_frame(frame);
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frames.set_frame(frame);
    }

    /// Number of frames in the tag
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        Err(Id3Error::NotImplemented("tag validation"))
    }

    pub fn sanitize(&mut self) -> Result<()> {
        Err(Id3Error::NotImplemented("tag sanitisation"))
    }
}
