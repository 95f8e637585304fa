// src/frame/writer.rs
use crate::error::Result;
use crate::frame::{Frame, FrameContent, FrameHeader, FrameId};
use crate::types::Encoding;
use crate::utils::{encode_latin1, encoded_len, try_encode_synchsafe};
use bytes::{BufMut, BytesMut};
use std::io::Write;
use tracing::debug;

/// Encoding marker written for every free-text field
const WRITE_ENCODING: Encoding = Encoding::Utf8;

impl Frame {
    /// Encoded size in bytes, including the 10-byte frame header.
    ///
    /// Matches exactly what [`Frame::encode`] writes. `TRDA` frames are dropped
    /// on encode and so have size zero.
    pub fn size(&self) -> usize {
        if self.is_dropped_on_encode() {
            return 0;
        }
        FrameHeader::SIZE + self.payload_len()
    }

    /// Write the frame header and payload in ID3v2.4 layout
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.is_dropped_on_encode() {
            debug!("Skipping legacy {} frame", self.header.id);
            return Ok(());
        }

        let payload_len = self.payload_len();
        let mut buf = BytesMut::with_capacity(FrameHeader::SIZE + payload_len);
        buf.put_slice(self.header.id.as_bytes());
        buf.put_slice(&try_encode_synchsafe(payload_len)?);
        buf.put_u16(self.header.flags.to_raw_v4());
        self.put_payload(&mut buf);
        debug_assert_eq!(buf.len(), FrameHeader::SIZE + payload_len);

        writer.write_all(&buf)?;
        Ok(())
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.size());
        self.encode(&mut out)?;
        Ok(out)
    }

    fn is_dropped_on_encode(&self) -> bool {
        self.header.id == FrameId::TRDA && matches!(self.content, FrameContent::Text(_))
    }

    fn payload_len(&self) -> usize {
        let text = |s: &str| encoded_len(s, WRITE_ENCODING);
        let latin1 = |s: &str| encoded_len(s, Encoding::Iso88591);
        let nul = WRITE_ENCODING.terminator().len();

        match &self.content {
            FrameContent::Text(value) => 1 + text(value) + closing_len(value, nul),
            FrameContent::UserText { description, text: value } => {
                1 + text(description) + nul + text(value) + closing_len(value, nul)
            }
            FrameContent::Url(url) => latin1(url) + closing_len(url, 1),
            FrameContent::UserUrl { description, url } => {
                1 + text(description) + nul + latin1(url) + closing_len(url, 1)
            }
            FrameContent::UniqueFileId { owner, identifier } => latin1(owner) + 1 + identifier.len(),
            FrameContent::Comment { description, text: value, .. } => {
                1 + 3 + text(description) + nul + text(value) + closing_len(value, nul)
            }
            FrameContent::Picture { mime_type, description, data, .. } => {
                1 + latin1(mime_type) + 1 + 1 + text(description) + nul + data.len()
            }
            FrameContent::Private { owner, data } => latin1(owner) + 1 + data.len(),
            FrameContent::MusicCdId(data) | FrameContent::Unsupported(data) => data.len(),
        }
    }

    fn put_payload(&self, buf: &mut BytesMut) {
        let nul = WRITE_ENCODING.terminator();

        match &self.content {
            FrameContent::Text(value) => {
                buf.put_u8(WRITE_ENCODING as u8);
                put_last_field(buf, value.as_bytes(), nul);
            }
            FrameContent::UserText { description, text } => {
                buf.put_u8(WRITE_ENCODING as u8);
                buf.put_slice(description.as_bytes());
                buf.put_slice(nul);
                put_last_field(buf, text.as_bytes(), nul);
            }
            FrameContent::Url(url) => {
                put_last_field(buf, &encode_latin1(url), &[0]);
            }
            FrameContent::UserUrl { description, url } => {
                buf.put_u8(WRITE_ENCODING as u8);
                buf.put_slice(description.as_bytes());
                buf.put_slice(nul);
                put_last_field(buf, &encode_latin1(url), &[0]);
            }
            FrameContent::UniqueFileId { owner, identifier } => {
                buf.put_slice(&encode_latin1(owner));
                buf.put_u8(0);
                buf.put_slice(identifier);
            }
            FrameContent::Comment { language, description, text } => {
                buf.put_u8(WRITE_ENCODING as u8);
                buf.put_slice(language);
                buf.put_slice(description.as_bytes());
                buf.put_slice(nul);
                put_last_field(buf, text.as_bytes(), nul);
            }
            FrameContent::Picture { mime_type, picture_type, description, data } => {
                buf.put_u8(WRITE_ENCODING as u8);
                buf.put_slice(&encode_latin1(mime_type));
                buf.put_u8(0);
                buf.put_u8(picture_type.to_u8());
                buf.put_slice(description.as_bytes());
                buf.put_slice(nul);
                buf.put_slice(data);
            }
            FrameContent::Private { owner, data } => {
                buf.put_slice(&encode_latin1(owner));
                buf.put_u8(0);
                buf.put_slice(data);
            }
            FrameContent::MusicCdId(data) | FrameContent::Unsupported(data) => {
                buf.put_slice(data);
            }
        }
    }
}

/// Bytes of the extra terminator written after a last field that ends in NUL
fn closing_len(value: &str, terminator_len: usize) -> usize {
    if value.ends_with('\0') {
        terminator_len
    } else {
        0
    }
}

/// Readers strip one trailing terminator from the last field, so a value that
/// itself ends in NUL is closed with one more
fn put_last_field(buf: &mut BytesMut, bytes: &[u8], terminator: &[u8]) {
    buf.put_slice(bytes);
    if bytes.last() == Some(&0) {
        buf.put_slice(terminator);
    }
}
