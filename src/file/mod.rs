// src/file/mod.rs
//! Binding between an audio file on disk and its tag.

mod save;

pub use save::{
    FileOptions, SaveOutcome, ScratchKind, DEFAULT_IN_MEMORY_THRESHOLD, DEFAULT_PADDING,
};

use crate::error::{Id3Error, Result};
use crate::header::{read_header, TagHeader};
use crate::tag::Tag;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;
use tracing::{debug, warn};

/// An audio file opened for tag editing.
///
/// The audio region is located once when the file is opened and only moves
/// when a save rebuilds the file.
pub struct Id3File {
    file: File,
    file_size: u64,
    audio_offset: u64,
    /// Tag body size currently on disk; `None` for an untagged file
    reserved: Option<u32>,
    tag: Tag,
    options: FileOptions,
}

impl Id3File {
    /// Open `path` read-write with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, FileOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: FileOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        debug!("Opened {}", path.display());
        Self::from_file_with(file, options)
    }

    /// Take ownership of an already opened file; it must be readable, writable and seekable
    pub fn from_file(file: File) -> Result<Self> {
        Self::from_file_with(file, FileOptions::default())
    }

    pub fn from_file_with(mut file: File, options: FileOptions) -> Result<Self> {
        let file_size = file.metadata()?.len();
        file.seek(SeekFrom::Start(0))?;

        let (mut tag, reserved, audio_offset) = match read_header(&mut file) {
            Ok(header) => {
                let tag = Tag::parse_body(&mut file, header)?;
                // Only the bytes that exist on disk can be overwritten in place
                let available = file_size.saturating_sub(TagHeader::SIZE as u64);
                if u64::from(header.size) > available {
                    warn!(
                        "Tag declares {} bytes but the file holds {} after the header",
                        header.size, available
                    );
                }
                let reserved = u64::from(header.size).min(available) as u32;
                (tag, Some(reserved), header.tag_end().min(file_size))
            }
            Err(err) if err.is_not_a_tag() || is_short_file(&err) => {
                warn!("No ID3v2 tag found; starting with an empty tag");
                (Tag::new(), None, 0)
            }
            Err(err) => return Err(err),
        };

        if options.upgrade_legacy && tag.needs_upgrade() {
            tag.upgrade();
        }

        Ok(Id3File { file, file_size, audio_offset, reserved, tag, options })
    }

    /// True when the file carried a tag when opened or has been saved since
    pub fn has_tag(&self) -> bool {
        self.reserved.is_some()
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn tag_mut(&mut self) -> &mut Tag {
        &mut self.tag
    }

    pub fn options(&self) -> &FileOptions {
        &self.options
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Byte range of the audio data that follows the tag
    pub fn audio_range(&self) -> Range<u64> {
        self.audio_offset..self.file_size
    }

    /// Reader over the audio region, positioned at its start
    pub fn audio_reader(&mut self) -> Result<io::Take<&mut File>> {
        self.file.seek(SeekFrom::Start(self.audio_offset))?;
        let len = self.file_size - self.audio_offset;
        Ok((&mut self.file).take(len))
    }

    /// Flush pending writes to disk and release the file
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

fn is_short_file(err: &Id3Error) -> bool {
    matches!(err, Id3Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}

impl std::fmt::Debug for Id3File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id3File")
            .field("file_size", &self.file_size)
            .field("audio_range", &self.audio_range())
            .field("reserved", &self.reserved)
            .field("frames", &self.tag.len())
            .finish()
    }
}
