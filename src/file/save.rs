// src/file/save.rs
use crate::error::{Id3Error, Result};
use crate::file::Id3File;
use crate::header::TagHeader;
use crate::types::{HeaderFlags, Version};
use bytes::{BufMut, BytesMut};
use chrono::Utc;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use tracing::{debug, info};

/// Zero bytes appended after the frames whenever a tag is written from scratch
pub const DEFAULT_PADDING: usize = 1024;

/// Files smaller than this are rebuilt in memory; larger ones go through a temporary file
pub const DEFAULT_IN_MEMORY_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Settings applied when a file is opened and saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOptions {
    pub padding: usize,
    pub in_memory_threshold: u64,
    /// Run [`Tag::upgrade`](crate::tag::Tag::upgrade) on ID3v2.3 tags at open
    pub upgrade_legacy: bool,
    /// Stamp `TDTG` with the current UTC time on every save
    pub tagging_time: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        FileOptions {
            padding: DEFAULT_PADDING,
            in_memory_threshold: DEFAULT_IN_MEMORY_THRESHOLD,
            upgrade_legacy: true,
            tagging_time: true,
        }
    }
}

impl FileOptions {
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_in_memory_threshold(mut self, threshold: u64) -> Self {
        self.in_memory_threshold = threshold;
        self
    }

    pub fn with_upgrade_legacy(mut self, upgrade: bool) -> Self {
        self.upgrade_legacy = upgrade;
        self
    }

    pub fn with_tagging_time(mut self, stamp: bool) -> Self {
        self.tagging_time = stamp;
        self
    }
}

/// Where a rebuilt file image is staged before it replaces the original
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchKind {
    Memory,
    TempFile,
}

impl ScratchKind {
    /// Memory for files strictly below `threshold`, a temporary file otherwise
    pub fn for_file_size(file_size: u64, threshold: u64) -> Self {
        if file_size < threshold {
            ScratchKind::Memory
        } else {
            ScratchKind::TempFile
        }
    }
}

/// How a save committed the tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Tag overwritten within its existing space; audio did not move
    InPlace { reserved: u32 },
    /// Whole file rewritten with a new tag body of `tag_size` bytes
    Rebuild { scratch: ScratchKind, tag_size: u32 },
}

impl Id3File {
    /// Write the tag back using the options the file was opened with
    pub fn save(&mut self) -> Result<SaveOutcome> {
        let options = self.options;
        self.save_with(&options)
    }

    /// Write the tag back.
    ///
    /// When the existing tag has room for every frame the tag is overwritten
    /// in place. Otherwise the complete new file is staged first and the
    /// original is only truncated once staging succeeded.
    pub fn save_with(&mut self, options: &FileOptions) -> Result<SaveOutcome> {
        if options.tagging_time {
            self.stamp_tagging_time()?;
        }
        let frames_size = self.tag.size();

        let outcome = match self.reserved {
            Some(reserved) if !self.tag.is_empty() && frames_size <= reserved as usize => {
                debug!("Saving in place: {} bytes of frames into {} reserved", frames_size, reserved);
                self.save_in_place(reserved)?
            }
            _ => {
                debug!(
                    "Rebuilding file: {} bytes of frames, reserved {:?}",
                    frames_size, self.reserved
                );
                self.rebuild(frames_size, options)?
            }
        };

        info!("Saved {} frames ({:?})", self.tag.len(), outcome);
        Ok(outcome)
    }

    /// Write the complete new file image to `writer` without touching the file.
    ///
    /// Returns the number of bytes written.
    pub fn save_to<W: Write>(&mut self, writer: &mut W) -> Result<u64> {
        if self.options.tagging_time {
            self.stamp_tagging_time()?;
        }
        let tag_size = self.tag.size() + self.options.padding;
        self.write_image(writer, tag_size)
    }

    fn stamp_tagging_time(&mut self) -> Result<()> {
        self.tag.set_tagging_time(Utc::now().naive_utc())
    }

    fn save_in_place(&mut self, reserved: u32) -> Result<SaveOutcome> {
        let mut image = Vec::with_capacity(TagHeader::SIZE + reserved as usize);
        self.tag.write_image(&mut image, reserved as usize)?;

        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&image)?;
        self.file.flush()?;

        self.commit_header(reserved);
        Ok(SaveOutcome::InPlace { reserved })
    }

    fn rebuild(&mut self, frames_size: usize, options: &FileOptions) -> Result<SaveOutcome> {
        let tag_size = frames_size + options.padding;
        let tag_size_u32 = u32::try_from(tag_size).map_err(|_| Id3Error::TagTooLarge(tag_size))?;
        let scratch = ScratchKind::for_file_size(self.file_size, options.in_memory_threshold);
        debug!("Staging rebuild in {:?} for a {} byte file", scratch, self.file_size);

        let new_size = match scratch {
            ScratchKind::Memory => {
                let capacity = TagHeader::SIZE + tag_size + (self.file_size - self.audio_offset) as usize;
                let mut staged = BytesMut::with_capacity(capacity).writer();
                self.write_image(&mut staged, tag_size)?;
                let staged = staged.into_inner();
                let mut source: &[u8] = &staged;
                self.replace_contents(&mut source)?
            }
            ScratchKind::TempFile => {
                // Unlinked on creation; the space is reclaimed when it drops,
                // on the error path too
                let mut staged = tempfile::tempfile()?;
                {
                    let mut writer = BufWriter::new(&mut staged);
                    self.write_image(&mut writer, tag_size)?;
                    writer.flush()?;
                }
                staged.seek(SeekFrom::Start(0))?;
                self.replace_contents(&mut staged)?
            }
        };

        self.file_size = new_size;
        self.audio_offset = TagHeader::SIZE as u64 + u64::from(tag_size_u32);
        self.reserved = Some(tag_size_u32);
        self.commit_header(tag_size_u32);
        Ok(SaveOutcome::Rebuild { scratch, tag_size: tag_size_u32 })
    }

    /// Tag with `tag_size` body bytes followed by the current audio region
    fn write_image<W: Write>(&mut self, writer: &mut W, tag_size: usize) -> Result<u64> {
        self.tag.write_image(writer, tag_size)?;

        let audio_len = self.file_size - self.audio_offset;
        self.file.seek(SeekFrom::Start(self.audio_offset))?;
        let copied = io::copy(&mut (&mut self.file).take(audio_len), writer)?;
        if copied != audio_len {
            return Err(Id3Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("audio region ended after {} of {} bytes", copied, audio_len),
            )));
        }

        Ok((TagHeader::SIZE + tag_size) as u64 + audio_len)
    }

    /// Truncate the file and copy the staged image in; returns the new length
    fn replace_contents<R: Read>(&mut self, staged: &mut R) -> Result<u64> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        let written = io::copy(staged, &mut self.file)?;
        self.file.flush()?;
        Ok(written)
    }

    fn commit_header(&mut self, size: u32) {
        self.tag.header = TagHeader { version: Version::CURRENT, flags: HeaderFlags::empty(), size };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = FileOptions::default();
        assert_eq!(options.padding, 1024);
        assert_eq!(options.in_memory_threshold, 10 * 1024 * 1024);
        assert!(options.upgrade_legacy);
        assert!(options.tagging_time);

        let options = options
            .with_padding(0)
            .with_in_memory_threshold(1)
            .with_tagging_time(false);
        assert_eq!(options.padding, 0);
        assert_eq!(options.in_memory_threshold, 1);
        assert!(!options.tagging_time);
    }

    #[test]
    fn test_scratch_threshold_boundary() {
        let threshold = DEFAULT_IN_MEMORY_THRESHOLD;
        assert_eq!(ScratchKind::for_file_size(threshold - 1, threshold), ScratchKind::Memory);
        assert_eq!(ScratchKind::for_file_size(threshold, threshold), ScratchKind::TempFile);
        assert_eq!(ScratchKind::for_file_size(0, 0), ScratchKind::TempFile);
    }
}
