// src/lib.rs
//! # id3v2-rs
//!
//! Reading and rewriting ID3v2.3 / ID3v2.4 tags at the start of audio files.
//!
//! ## Features
//!
//! - **Typed frames**: text, URL, comment, user-defined, picture, private and
//!   unique file identifier frames, with unknown frames kept byte-for-byte
//! - **Text codecs**: ISO-8859-1, UTF-16 (with or without BOM) and UTF-8
//! - **Safe saves**: in-place overwrite when the tag fits its reserved space,
//!   otherwise a full rebuild staged in memory or a temporary file before the
//!   original is touched
//! - **Legacy upgrade**: ID3v2.3 date and multi-value frames rewritten for v2.4
//!
//! ## Quick Start
//!
//! ### Editing a file
//!
//! ```rust,no_run
//! use id3v2_rs::*;
//!
//! fn main() -> Result<()> {
//!     let mut file = Id3File::open("song.mp3")?;
//!
//!     file.tag_mut().set_title("A Title");
//!     file.tag_mut().set_text("TXXX:CATALOG", "ABC-123")?;
//!
//!     match file.save()? {
//!         SaveOutcome::InPlace { .. } => println!("Tag rewritten in place"),
//!         SaveOutcome::Rebuild { .. } => println!("File rebuilt"),
//!     }
//!     file.close()
//! }
//! ```
//!
//! ### Parsing tag bytes
//!
//! ```rust
//! use id3v2_rs::*;
//!
//! fn main() -> Result<()> {
//!     let mut tag = Tag::new();
//!     tag.set_frame(Frame::text("TIT2", "Hello")?);
//!
//!     let bytes = tag.to_bytes(DEFAULT_PADDING)?;
//!     let parsed = Tag::from_bytes(&bytes)?;
//!     assert_eq!(parsed.title(), Some("Hello"));
//!     Ok(())
//! }
//! ```

// Modules
pub mod error;
pub mod file;
pub mod frame;
pub mod header;
pub mod tag;
pub mod types;
pub mod utils;

// Re-export commonly used types at the crate root for convenience
pub use error::{Id3Error, Result, UnsupportedFeature};

pub use types::{Encoding, FrameFlags, HeaderFlags, PictureType, Version};

pub use header::{emit_header, parse_header, TagHeader};

pub use frame::{parse_frame, Frame, FrameContent, FrameHeader, FrameId, FrameReader};

pub use tag::{Comment, FramesMap, Tag};

pub use file::{
    FileOptions, Id3File, SaveOutcome, ScratchKind, DEFAULT_IN_MEMORY_THRESHOLD, DEFAULT_PADDING,
};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use id3v2_rs::prelude::*;
    //! ```

    pub use crate::error::{Id3Error, Result};
    pub use crate::file::{FileOptions, Id3File, SaveOutcome};
    pub use crate::frame::{Frame, FrameContent, FrameId};
    pub use crate::tag::{Comment, Tag};
    pub use crate::types::{PictureType, Version};
}

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");
