// src/frame/mod.rs
//! Frame model and wire codec.
//!
//! A [`Frame`] pairs a [`FrameHeader`] with a closed set of payload shapes in
//! [`FrameContent`]. Parsing dispatches on the identifier once, in
//! [`FrameReader`]; encoding is a single match in [`Frame::encode`].

mod reader;
mod writer;

pub use reader::{parse_frame, FrameReader};

use crate::error::{Id3Error, Result};
use crate::types::{FrameFlags, PictureType};
use std::fmt;
use std::str::FromStr;

/// Four-character frame identifier made of `0-9` and `A-Z`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId([u8; 4]);

impl FrameId {
    pub const TXXX: FrameId = FrameId(*b"TXXX");
    pub const WXXX: FrameId = FrameId(*b"WXXX");
    pub const UFID: FrameId = FrameId(*b"UFID");
    pub const COMM: FrameId = FrameId(*b"COMM");
    pub const APIC: FrameId = FrameId(*b"APIC");
    pub const PRIV: FrameId = FrameId(*b"PRIV");
    pub const MCDI: FrameId = FrameId(*b"MCDI");
    /// Legacy v2.3 recording dates frame, dropped on encode
    pub const TRDA: FrameId = FrameId(*b"TRDA");

    pub const TALB: FrameId = FrameId(*b"TALB");
    pub const TBPM: FrameId = FrameId(*b"TBPM");
    pub const TCOM: FrameId = FrameId(*b"TCOM");
    pub const TCON: FrameId = FrameId(*b"TCON");
    pub const TDEN: FrameId = FrameId(*b"TDEN");
    pub const TDLY: FrameId = FrameId(*b"TDLY");
    pub const TDOR: FrameId = FrameId(*b"TDOR");
    pub const TDRC: FrameId = FrameId(*b"TDRC");
    pub const TDTG: FrameId = FrameId(*b"TDTG");
    pub const TEXT: FrameId = FrameId(*b"TEXT");
    pub const TIT2: FrameId = FrameId(*b"TIT2");
    pub const TLAN: FrameId = FrameId(*b"TLAN");
    pub const TLEN: FrameId = FrameId(*b"TLEN");
    pub const TMOO: FrameId = FrameId(*b"TMOO");
    pub const TOFN: FrameId = FrameId(*b"TOFN");
    pub const TOLY: FrameId = FrameId(*b"TOLY");
    pub const TOPE: FrameId = FrameId(*b"TOPE");
    pub const TOWN: FrameId = FrameId(*b"TOWN");
    pub const TPE1: FrameId = FrameId(*b"TPE1");
    pub const TPE2: FrameId = FrameId(*b"TPE2");
    pub const TPE3: FrameId = FrameId(*b"TPE3");
    pub const TPUB: FrameId = FrameId(*b"TPUB");
    pub const TRSN: FrameId = FrameId(*b"TRSN");
    pub const TRSO: FrameId = FrameId(*b"TRSO");
    pub const TSOA: FrameId = FrameId(*b"TSOA");
    pub const TSOP: FrameId = FrameId(*b"TSOP");
    pub const TSOT: FrameId = FrameId(*b"TSOT");
    pub const TSRC: FrameId = FrameId(*b"TSRC");

    // ID3v2.3 date frames replaced by TDRC/TDOR in v2.4
    pub const TYER: FrameId = FrameId(*b"TYER");
    pub const TDAT: FrameId = FrameId(*b"TDAT");
    pub const TIME: FrameId = FrameId(*b"TIME");
    pub const TORY: FrameId = FrameId(*b"TORY");
    pub const XDOR: FrameId = FrameId(*b"XDOR");

    pub fn new(id: &str) -> Result<Self> {
        let bytes: [u8; 4] = id
            .as_bytes()
            .try_into()
            .map_err(|_| Id3Error::InvalidFrameId(id.to_string()))?;
        Self::from_bytes(bytes).ok_or_else(|| Id3Error::InvalidFrameId(id.to_string()))
    }

    /// Validate raw identifier bytes
    pub fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
        if bytes.iter().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()) {
            Some(FrameId(bytes))
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Validated as ASCII on construction
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    /// `T***` text information frame (excluding `TXXX`)
    pub fn is_text(&self) -> bool {
        self.0[0] == b'T' && *self != Self::TXXX
    }

    /// `W***` URL link frame (excluding `WXXX`)
    pub fn is_url(&self) -> bool {
        self.0[0] == b'W' && *self != Self::WXXX
    }
}

impl FromStr for FrameId {
    type Err = Id3Error;

    fn from_str(s: &str) -> Result<Self> {
        FrameId::new(s)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for FrameId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

/// Identifier and per-instance flags shared by every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub id: FrameId,
    pub flags: FrameFlags,
}

impl FrameHeader {
    pub const SIZE: usize = 10;

    pub fn new(id: FrameId) -> Self {
        FrameHeader { id, flags: FrameFlags::empty() }
    }
}

/// Frame payload, one case per supported layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameContent {
    /// `T***` except `TXXX`; multiple values are NUL-separated
    Text(String),
    /// `TXXX`
    UserText { description: String, text: String },
    /// `W***` except `WXXX`
    Url(String),
    /// `WXXX`
    UserUrl { description: String, url: String },
    /// `UFID`
    UniqueFileId { owner: String, identifier: Vec<u8> },
    /// `COMM`
    Comment { language: [u8; 3], description: String, text: String },
    /// `APIC`
    Picture {
        mime_type: String,
        picture_type: PictureType,
        description: String,
        data: Vec<u8>,
    },
    /// `PRIV`
    Private { owner: String, data: Vec<u8> },
    /// `MCDI`
    MusicCdId(Vec<u8>),
    /// Any identifier this codec does not model; bytes are kept verbatim
    Unsupported(Vec<u8>),
}

/// A single metadata record in a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub content: FrameContent,
}

impl Frame {
    pub fn new(id: FrameId, content: FrameContent) -> Self {
        Frame { header: FrameHeader::new(id), content }
    }

    /// Text information frame; `id` must be a `T***` identifier other than `TXXX`
    pub fn text(id: &str, text: impl Into<String>) -> Result<Self> {
        let id = FrameId::new(id)?;
        if !id.is_text() {
            return Err(Id3Error::InvalidFrameId(id.to_string()));
        }
        Ok(Frame::new(id, FrameContent::Text(text.into())))
    }

    /// URL link frame; `id` must be a `W***` identifier other than `WXXX`
    pub fn url(id: &str, url: impl Into<String>) -> Result<Self> {
        let id = FrameId::new(id)?;
        if !id.is_url() {
            return Err(Id3Error::InvalidFrameId(id.to_string()));
        }
        Ok(Frame::new(id, FrameContent::Url(url.into())))
    }

    pub fn user_text(description: impl Into<String>, text: impl Into<String>) -> Self {
        Frame::new(
            FrameId::TXXX,
            FrameContent::UserText { description: description.into(), text: text.into() },
        )
    }

    pub fn user_url(description: impl Into<String>, url: impl Into<String>) -> Self {
        Frame::new(
            FrameId::WXXX,
            FrameContent::UserUrl { description: description.into(), url: url.into() },
        )
    }

    pub fn unique_file_id(owner: impl Into<String>, identifier: impl Into<Vec<u8>>) -> Self {
        Frame::new(
            FrameId::UFID,
            FrameContent::UniqueFileId { owner: owner.into(), identifier: identifier.into() },
        )
    }

    /// Comment frame. `language` is an ISO-639-2 code; it is truncated or
    /// padded with spaces to exactly three bytes.
    pub fn comment(language: &str, description: impl Into<String>, text: impl Into<String>) -> Self {
        Frame::new(
            FrameId::COMM,
            FrameContent::Comment {
                language: language_code(language),
                description: description.into(),
                text: text.into(),
            },
        )
    }

    pub fn picture(
        mime_type: impl Into<String>,
        picture_type: PictureType,
        description: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Frame::new(
            FrameId::APIC,
            FrameContent::Picture {
                mime_type: mime_type.into(),
                picture_type,
                description: description.into(),
                data: data.into(),
            },
        )
    }

    pub fn private(owner: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Frame::new(FrameId::PRIV, FrameContent::Private { owner: owner.into(), data: data.into() })
    }

    pub fn id(&self) -> FrameId {
        self.header.id
    }

    pub fn flags(&self) -> FrameFlags {
        self.header.flags
    }

    pub fn with_flags(mut self, flags: FrameFlags) -> Self {
        self.header.flags = flags;
        self
    }

    /// The frame's primary textual value, if it has one
    pub fn value(&self) -> Option<&str> {
        match &self.content {
            FrameContent::Text(text)
            | FrameContent::UserText { text, .. }
            | FrameContent::Comment { text, .. } => Some(text),
            FrameContent::Url(url) | FrameContent::UserUrl { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Description used to key `TXXX`, `WXXX`, `COMM` and `APIC` frames
    pub fn description(&self) -> Option<&str> {
        match &self.content {
            FrameContent::UserText { description, .. }
            | FrameContent::UserUrl { description, .. }
            | FrameContent::Comment { description, .. }
            | FrameContent::Picture { description, .. } => Some(description),
            _ => None,
        }
    }
}

fn language_code(language: &str) -> [u8; 3] {
    let mut code = [b' '; 3];
    for (slot, b) in code.iter_mut().zip(language.bytes().filter(u8::is_ascii)) {
        *slot = b;
    }
    code
}
