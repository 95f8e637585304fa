// src/error.rs
use crate::tag::Tag;
use crate::types::Version;
use std::fmt;
use std::io;
use thiserror::Error;

/// Format features this codec recognises but does not decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedFeature {
    ExtendedHeader,
    Unsynchronisation,
    CompressedFrame,
    EncryptedFrame,
    GroupedFrame,
    FrameUnsynchronisation,
    DataLengthIndicator,
}

impl fmt::Display for UnsupportedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnsupportedFeature::ExtendedHeader => "extended header",
            UnsupportedFeature::Unsynchronisation => "unsynchronised tag",
            UnsupportedFeature::CompressedFrame => "compressed frame",
            UnsupportedFeature::EncryptedFrame => "encrypted frame",
            UnsupportedFeature::GroupedFrame => "grouped frame",
            UnsupportedFeature::FrameUnsynchronisation => "unsynchronised frame",
            UnsupportedFeature::DataLengthIndicator => "frame data length indicator",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Id3Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Not an ID3v2 header: {magic:?}")]
    NotATagHeader { magic: [u8; 3] },

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(Version),

    #[error("Unsupported feature: {0}")]
    Unsupported(UnsupportedFeature),

    #[error("Not a frame header (ID = {id:?})")]
    NotAFrameHeader { id: [u8; 4] },

    #[error("Invalid frame identifier: {0:?}")]
    InvalidFrameId(String),

    #[error("Frame {id} declares {declared} bytes but only {available} remain in the tag")]
    TruncatedFrame { id: String, declared: usize, available: usize },

    #[error("Tag too large: {0} bytes does not fit a synchsafe integer")]
    TagTooLarge(usize),

    #[error("Tag parsing stopped after {} frames: {source}", .tag.len())]
    Partial {
        tag: Box<Tag>,
        #[source]
        source: Box<Id3Error>,
    },

    #[error("Invalid number in text frame: {0:?}")]
    InvalidNumber(String),

    #[error("Invalid timestamp in text frame: {0:?}")]
    InvalidTimestamp(String),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

impl Id3Error {
    /// True for the "no tag present" condition, which callers treat as an untagged file
    pub fn is_not_a_tag(&self) -> bool {
        matches!(self, Id3Error::NotATagHeader { .. })
    }

    /// Splits a partial parse into the frames recovered so far and the error that stopped it
    pub fn into_partial(self) -> std::result::Result<(Tag, Id3Error), Id3Error> {
        match self {
            Id3Error::Partial { tag, source } => Ok((*tag, *source)),
            other => Err(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Id3Error>;
