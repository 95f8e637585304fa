// src/tag/upgrade.rs
use crate::frame::{FrameContent, FrameId};
use crate::tag::Tag;
use crate::types::Version;
use chrono::{NaiveDate, NaiveTime};
use tracing::warn;

/// Text frames whose v2.3 values separate entries with `/`
const SLASH_SEPARATED: [FrameId; 7] = [
    FrameId::TLAN,
    FrameId::TCON,
    FrameId::TPE1,
    FrameId::TOPE,
    FrameId::TCOM,
    FrameId::TEXT,
    FrameId::TOLY,
];

impl Tag {
    /// True when the tag was read from an older major version than this crate writes
    pub fn needs_upgrade(&self) -> bool {
        self.header.version.major < Version::CURRENT.major
    }

    /// Rewrite ID3v2.3 frames into their ID3v2.4 equivalents.
    ///
    /// Best effort: frames whose content cannot be interpreted are left as they
    /// are. `TRDA` stays in the store and is dropped when the tag is encoded.
    pub fn upgrade(&mut self) {
        if !self.needs_upgrade() {
            return;
        }

        self.upgrade_recording_time();
        self.upgrade_original_release_time();
        self.split_slash_separated();

        if self.frames().has_frame(FrameId::XDOR) {
            warn!("Leaving XDOR frame untouched; it has no ID3v2.4 equivalent in this crate");
        }

        self.header.version = Version::CURRENT;
    }

    /// TYER (`YYYY`), TDAT (`DDMM`) and TIME (`HHMM`) become one TDRC timestamp
    fn upgrade_recording_time(&mut self) {
        let Some(year) = self.text_value(FrameId::TYER).and_then(parse_year) else {
            if self.frames().has_frame(FrameId::TYER) {
                warn!("Unreadable TYER frame; keeping legacy date frames");
            }
            return;
        };

        let date = self
            .text_value(FrameId::TDAT)
            .and_then(split_pair)
            .and_then(|(day, month)| NaiveDate::from_ymd_opt(year, month, day));
        let time = self
            .text_value(FrameId::TIME)
            .and_then(split_pair)
            .and_then(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0));

        let timestamp = match (date, time) {
            (Some(date), Some(time)) => date.and_time(time).format("%Y-%m-%dT%H:%M").to_string(),
            (Some(date), None) => date.format("%Y-%m-%d").to_string(),
            (None, _) => format!("{:04}", year),
        };

        if !self.frames().has_frame(FrameId::TDRC) {
            self.put_text(FrameId::TDRC, timestamp);
        }
        for legacy in [FrameId::TYER, FrameId::TDAT, FrameId::TIME] {
            self.frames_mut().remove_frames(legacy);
        }
        warn!("Upgraded legacy date frames to TDRC");
    }

    fn upgrade_original_release_time(&mut self) {
        let Some(year) = self.text_value(FrameId::TORY).and_then(parse_year) else {
            return;
        };
        if !self.frames().has_frame(FrameId::TDOR) {
            self.put_text(FrameId::TDOR, format!("{:04}", year));
        }
        self.frames_mut().remove_frames(FrameId::TORY);
        warn!("Upgraded TORY to TDOR");
    }

    fn split_slash_separated(&mut self) {
        for id in SLASH_SEPARATED {
            let mut frames = self.frames_mut().remove_frames(id);
            for frame in &mut frames {
                if let FrameContent::Text(text) = &mut frame.content {
                    if text.contains('/') {
                        *text = text.replace('/', "\0");
                    }
                }
            }
            self.frames_mut().replace_frames(id, frames);
        }
    }
}

fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse().ok()
    } else {
        None
    }
}

/// Split a four-digit `AABB` field into its two halves
fn split_pair(value: &str) -> Option<(u32, u32)> {
    let value = value.trim();
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((value[..2].parse().ok()?, value[2..].parse().ok()?))
}
