// src/tag/accessors.rs
//! Typed getters and setters projected over the frame store.
//!
//! Text identifiers may use the `TXXX:<description>` form to address the
//! user-defined text frame with that description.

use crate::error::{Id3Error, Result};
use crate::frame::{Frame, FrameContent, FrameId};
use crate::tag::Tag;
use chrono::{NaiveDate, NaiveDateTime};
use std::str::FromStr;
use std::time::Duration;

const USER_TEXT_PREFIX: &str = "TXXX:";

/// Separator between values of a multi-valued text frame
const VALUE_SEPARATOR: char = '\0';

/// Layout used when writing timestamps
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A `COMM` frame's fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub language: String,
    pub description: String,
    pub text: String,
}

impl Comment {
    pub fn new(language: impl Into<String>, description: impl Into<String>, text: impl Into<String>) -> Self {
        Comment { language: language.into(), description: description.into(), text: text.into() }
    }

    fn from_frame(frame: &Frame) -> Option<Self> {
        match &frame.content {
            FrameContent::Comment { language, description, text } => Some(Comment {
                language: String::from_utf8_lossy(language).trim_end().to_string(),
                description: description.clone(),
                text: text.clone(),
            }),
            _ => None,
        }
    }

    fn to_frame(&self) -> Frame {
        Frame::comment(&self.language, self.description.clone(), self.text.clone())
    }
}

enum TextKey<'a> {
    Frame(FrameId),
    UserText(&'a str),
}

fn text_key(id: &str) -> Result<TextKey<'_>> {
    if let Some(description) = id.strip_prefix(USER_TEXT_PREFIX) {
        return Ok(TextKey::UserText(description));
    }
    let id = FrameId::new(id)?;
    if !id.is_text() {
        return Err(Id3Error::InvalidFrameId(id.to_string()));
    }
    Ok(TextKey::Frame(id))
}

macro_rules! text_accessors {
    ($($(#[$doc:meta])* $get:ident, $set:ident => $id:ident;)*) => {
        impl Tag {
            $(
                $(#[$doc])*
                pub fn $get(&self) -> Option<&str> {
                    self.text_value(FrameId::$id)
                }

                pub fn $set(&mut self, value: impl Into<String>) {
                    self.put_text(FrameId::$id, value.into());
                }
            )*
        }
    };
}

text_accessors! {
    album, set_album => TALB;
    /// Lead performer; use [`Tag::artists`] when several are listed
    artist, set_artist => TPE1;
    /// Band, orchestra or accompaniment
    band, set_band => TPE2;
    conductor, set_conductor => TPE3;
    /// Original performer; use [`Tag::original_artists`] when several are listed
    original_artist, set_original_artist => TOPE;
    composer, set_composer => TCOM;
    title, set_title => TIT2;
    publisher, set_publisher => TPUB;
    /// Internet radio station name
    station_name, set_station_name => TRSN;
    station_owner, set_station_owner => TRSO;
    /// File owner or licensee
    owner, set_owner => TOWN;
    original_filename, set_original_filename => TOFN;
    album_sort_order, set_album_sort_order => TSOA;
    performer_sort_order, set_performer_sort_order => TSOP;
    title_sort_order, set_title_sort_order => TSOT;
    isrc, set_isrc => TSRC;
    mood, set_mood => TMOO;
}

impl Tag {
    /// Value of a text frame or `TXXX:<description>` pseudo-frame
    pub fn get_text(&self, id: &str) -> Result<Option<&str>> {
        Ok(match text_key(id)? {
            TextKey::Frame(id) => self.text_value(id),
            TextKey::UserText(description) => {
                self.frames().user_text(description).and_then(Frame::value)
            }
        })
    }

    /// Replace a text frame, or the `TXXX` frame with the given description
    pub fn set_text(&mut self, id: &str, value: impl Into<String>) -> Result<()> {
        match text_key(id)? {
            TextKey::Frame(id) => self.put_text(id, value.into()),
            TextKey::UserText(description) => {
                self.set_frame(Frame::user_text(description, value));
            }
        }
        Ok(())
    }

    /// Remove a text frame, or the `TXXX` frame with the given description
    pub fn remove_text(&mut self, id: &str) -> Result<()> {
        match text_key(id)? {
            TextKey::Frame(id) => {
                self.frames_mut().remove_frames(id);
            }
            TextKey::UserText(description) => {
                self.frames_mut().remove_user_text(description);
            }
        }
        Ok(())
    }

    pub fn get_text_number<T: FromStr>(&self, id: &str) -> Result<Option<T>> {
        match self.get_text(id)? {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Id3Error::InvalidNumber(value.to_string())),
            None => Ok(None),
        }
    }

    pub fn set_text_number<T: ToString>(&mut self, id: &str, value: T) -> Result<()> {
        self.set_text(id, value.to_string())
    }

    /// Values of a multi-valued text frame; empty when the frame is absent
    pub fn get_text_slice(&self, id: &str) -> Result<Vec<String>> {
        Ok(self
            .get_text(id)?
            .map(|value| value.split(VALUE_SEPARATOR).map(str::to_string).collect())
            .unwrap_or_default())
    }

    pub fn set_text_slice<S: AsRef<str>>(&mut self, id: &str, values: &[S]) -> Result<()> {
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(&VALUE_SEPARATOR.to_string());
        self.set_text(id, joined)
    }

    /// Timestamp stored as `YYYY[-MM[-DD[THH[:MM[:SS]]]]]`; missing parts default
    /// to the start of the period
    pub fn get_text_time(&self, id: &str) -> Result<Option<NaiveDateTime>> {
        match self.get_text(id)? {
            Some(value) => parse_timestamp(value)
                .map(Some)
                .ok_or_else(|| Id3Error::InvalidTimestamp(value.to_string())),
            None => Ok(None),
        }
    }

    pub fn set_text_time(&mut self, id: &str, time: NaiveDateTime) -> Result<()> {
        self.set_text(id, time.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn artists(&self) -> Vec<String> {
        self.text_values(FrameId::TPE1)
    }

    pub fn set_artists<S: AsRef<str>>(&mut self, artists: &[S]) -> Result<()> {
        self.set_text_slice("TPE1", artists)
    }

    pub fn original_artists(&self) -> Vec<String> {
        self.text_values(FrameId::TOPE)
    }

    pub fn set_original_artists<S: AsRef<str>>(&mut self, artists: &[S]) -> Result<()> {
        self.set_text_slice("TOPE", artists)
    }

    pub fn composers(&self) -> Vec<String> {
        self.text_values(FrameId::TCOM)
    }

    pub fn set_composers<S: AsRef<str>>(&mut self, composers: &[S]) -> Result<()> {
        self.set_text_slice("TCOM", composers)
    }

    pub fn genres(&self) -> Vec<String> {
        self.text_values(FrameId::TCON)
    }

    pub fn set_genres<S: AsRef<str>>(&mut self, genres: &[S]) -> Result<()> {
        self.set_text_slice("TCON", genres)
    }

    /// ISO-639-2 language codes of the lyrics
    pub fn languages(&self) -> Vec<String> {
        self.text_values(FrameId::TLAN)
    }

    pub fn set_languages<S: AsRef<str>>(&mut self, languages: &[S]) -> Result<()> {
        self.set_text_slice("TLAN", languages)
    }

    /// First listed language
    pub fn language(&self) -> Option<String> {
        self.text_values(FrameId::TLAN).into_iter().next()
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.put_text(FrameId::TLAN, language.into());
    }

    /// Audio length from `TLEN`, stored in milliseconds
    pub fn length(&self) -> Result<Option<Duration>> {
        Ok(self.get_text_number::<u64>("TLEN")?.map(Duration::from_millis))
    }

    pub fn set_length(&mut self, length: Duration) -> Result<()> {
        self.set_text_number("TLEN", length.as_millis())
    }

    /// Silence between songs in a playlist, stored in milliseconds
    pub fn playlist_delay(&self) -> Result<Option<Duration>> {
        Ok(self.get_text_number::<u64>("TDLY")?.map(Duration::from_millis))
    }

    pub fn set_playlist_delay(&mut self, delay: Duration) -> Result<()> {
        self.set_text_number("TDLY", delay.as_millis())
    }

    pub fn bpm(&self) -> Result<Option<u32>> {
        self.get_text_number("TBPM")
    }

    pub fn set_bpm(&mut self, bpm: u32) -> Result<()> {
        self.set_text_number("TBPM", bpm)
    }

    pub fn recording_time(&self) -> Result<Option<NaiveDateTime>> {
        self.get_text_time("TDRC")
    }

    pub fn set_recording_time(&mut self, time: NaiveDateTime) -> Result<()> {
        self.set_text_time("TDRC", time)
    }

    pub fn original_release_time(&self) -> Result<Option<NaiveDateTime>> {
        self.get_text_time("TDOR")
    }

    pub fn set_original_release_time(&mut self, time: NaiveDateTime) -> Result<()> {
        self.set_text_time("TDOR", time)
    }

    pub fn encoding_time(&self) -> Result<Option<NaiveDateTime>> {
        self.get_text_time("TDEN")
    }

    pub fn set_encoding_time(&mut self, time: NaiveDateTime) -> Result<()> {
        self.set_text_time("TDEN", time)
    }

    /// When the tag was last written; saves stamp it unless disabled in the file options
    pub fn tagging_time(&self) -> Result<Option<NaiveDateTime>> {
        self.get_text_time("TDTG")
    }

    pub fn set_tagging_time(&mut self, time: NaiveDateTime) -> Result<()> {
        self.set_text_time("TDTG", time)
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.frames()
            .frames(FrameId::COMM)
            .iter()
            .filter_map(Comment::from_frame)
            .collect()
    }

    /// Replace every `COMM` frame
    pub fn set_comments(&mut self, comments: &[Comment]) {
        let frames = comments.iter().map(Comment::to_frame).collect();
        self.frames_mut().replace_frames(FrameId::COMM, frames);
    }

    pub fn add_comment(&mut self, comment: &Comment) {
        self.add_frame(comment.to_frame());
    }

    /// `(description, text)` of every `TXXX` frame
    pub fn user_text_frames(&self) -> Vec<(&str, &str)> {
        self.frames()
            .frames(FrameId::TXXX)
            .iter()
            .filter_map(|frame| match &frame.content {
                FrameContent::UserText { description, text } => Some((description.as_str(), text.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Identifier bytes of the `UFID` frame owned by `owner`
    pub fn unique_file_id(&self, owner: &str) -> Option<&[u8]> {
        self.frames().frames(FrameId::UFID).iter().find_map(|frame| match &frame.content {
            FrameContent::UniqueFileId { owner: o, identifier } if o == owner => Some(identifier.as_slice()),
            _ => None,
        })
    }

    pub(crate) fn text_value(&self, id: FrameId) -> Option<&str> {
        self.frames().frames(id).iter().find_map(|frame| match &frame.content {
            FrameContent::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    fn text_values(&self, id: FrameId) -> Vec<String> {
        self.text_value(id)
            .map(|value| value.split(VALUE_SEPARATOR).map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub(crate) fn put_text(&mut self, id: FrameId, value: String) {
        self.set_frame(Frame::new(id, FrameContent::Text(value)));
    }
}

/// Parse `YYYY[-MM[-DD[THH[:MM[:SS]]]]]`
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let (date, time) = match value.trim().split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (value.trim(), None),
    };

    let mut date_parts = date.split('-');
    let year: i32 = digits(date_parts.next()?, 4)?;
    let month: u32 = date_parts.next().map_or(Some(1), |m| digits(m, 2))?;
    let day: u32 = date_parts.next().map_or(Some(1), |d| digits(d, 2))?;
    if date_parts.next().is_some() {
        return None;
    }

    let (hour, minute, second) = match time {
        Some(time) => {
            // A time is only meaningful after a full date
            if date.len() != "YYYY-MM-DD".len() {
                return None;
            }
            let mut time_parts = time.split(':');
            let hour: u32 = digits(time_parts.next()?, 2)?;
            let minute: u32 = time_parts.next().map_or(Some(0), |m| digits(m, 2))?;
            let second: u32 = time_parts.next().map_or(Some(0), |s| digits(s, 2))?;
            if time_parts.next().is_some() {
                return None;
            }
            (hour, minute, second)
        }
        None => (0, 0, 0),
    };

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

fn digits<T: FromStr>(field: &str, width: usize) -> Option<T> {
    if field.len() == width && field.bytes().all(|b| b.is_ascii_digit()) {
        field.parse().ok()
    } else {
        None
    }
}
