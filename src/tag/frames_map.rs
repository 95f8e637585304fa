// src/tag/frames_map.rs
use crate::error::Result;
use crate::frame::{Frame, FrameContent, FrameId};
use std::collections::BTreeMap;
use std::io::Write;

/// Frames grouped by identifier.
///
/// Buckets iterate in identifier order so encoding is deterministic; frames
/// within a bucket keep insertion order. Empty buckets are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramesMap {
    buckets: BTreeMap<FrameId, Vec<Frame>>,
}

impl FramesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded size of every frame, sub-headers included
    pub fn size(&self) -> usize {
        self.iter().map(Frame::size).sum()
    }

    /// Write every frame, bucket by bucket
    pub fn encode_all<W: Write>(&self, writer: &mut W) -> Result<()> {
        for frame in self.iter() {
            frame.encode(writer)?;
        }
        Ok(())
    }

    /// Append a frame to its bucket without touching existing entries
    pub fn add_frame(&mut self, frame: Frame) {
        self.buckets.entry(frame.id()).or_default().push(frame);
    }

    /// Store a frame with replacement semantics.
    ///
    /// A `TXXX` frame replaces the entry with the same description, or is
    /// appended when none matches. Any other frame replaces its whole bucket.
    pub fn set_frame(&mut self, frame: Frame) {
        if let FrameContent::UserText { description, .. } = &frame.content {
            let bucket = self.buckets.entry(FrameId::TXXX).or_default();
            match bucket.iter_mut().find(|f| f.description() == Some(description.as_str())) {
                Some(existing) => *existing = frame,
                None => bucket.push(frame),
            }
            return;
        }
        self.buckets.insert(frame.id(), vec![frame]);
    }

    pub fn frames(&self, id: FrameId) -> &[Frame] {
        self.buckets.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, id: FrameId) -> Option<&Frame> {
        self.frames(id).first()
    }

    pub fn has_frame(&self, id: FrameId) -> bool {
        self.buckets.contains_key(&id)
    }

    /// Remove a bucket, returning its frames
    pub fn remove_frames(&mut self, id: FrameId) -> Vec<Frame> {
        self.buckets.remove(&id).unwrap_or_default()
    }

    /// Replace a bucket wholesale; an empty `frames` removes it
    pub fn replace_frames(&mut self, id: FrameId, frames: Vec<Frame>) {
        if frames.is_empty() {
            self.buckets.remove(&id);
        } else {
            self.buckets.insert(id, frames);
        }
    }

    /// The `TXXX` frame carrying `description`, if any
    pub fn user_text(&self, description: &str) -> Option<&Frame> {
        self.frames(FrameId::TXXX)
            .iter()
            .find(|f| f.description() == Some(description))
    }

    /// Remove the `TXXX` frame carrying `description`
    pub fn remove_user_text(&mut self, description: &str) -> Option<Frame> {
        let bucket = self.buckets.get_mut(&FrameId::TXXX)?;
        let index = bucket.iter().position(|f| f.description() == Some(description))?;
        let removed = bucket.remove(index);
        if bucket.is_empty() {
            self.buckets.remove(&FrameId::TXXX);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    pub fn ids(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.buckets.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.buckets.values().flatten()
    }

    /// Total number of frames across all buckets
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Extend<Frame> for FramesMap {
    fn extend<I: IntoIterator<Item = Frame>>(&mut self, iter: I) {
        for frame in iter {
            self.add_frame(frame);
        }
    }
}

impl FromIterator<Frame> for FramesMap {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        let mut map = FramesMap::new();
        map.extend(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_text_replaces_bucket() {
        let mut map = FramesMap::new();
        map.add_frame(Frame::text("TIT2", "one").unwrap());
        map.add_frame(Frame::text("TIT2", "two").unwrap());
        assert_eq!(map.frames(FrameId::TIT2).len(), 2);

        map.set_frame(Frame::text("TIT2", "three").unwrap());
        assert_eq!(map.frames(FrameId::TIT2).len(), 1);
        assert_eq!(map.first(FrameId::TIT2).unwrap().value(), Some("three"));
    }

    #[test]
    fn test_user_text_dedupes_by_description() {
        let mut map = FramesMap::new();
        map.set_frame(Frame::user_text("A", "1"));
        map.set_frame(Frame::user_text("B", "2"));
        map.set_frame(Frame::user_text("A", "3"));

        let bucket = map.frames(FrameId::TXXX);
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[0].value(), Some("3"));
        assert_eq!(bucket[1].value(), Some("2"));
        assert_eq!(map.user_text("B").unwrap().value(), Some("2"));
    }

    #[test]
    fn test_comments_accumulate() {
        let mut map = FramesMap::new();
        map.add_frame(Frame::comment("eng", "", "first"));
        map.add_frame(Frame::comment("eng", "other", "second"));
        assert_eq!(map.frames(FrameId::COMM).len(), 2);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_remove_user_text_drops_empty_bucket() {
        let mut map = FramesMap::new();
        map.set_frame(Frame::user_text("A", "1"));
        assert!(map.remove_user_text("missing").is_none());
        assert!(map.remove_user_text("A").is_some());
        assert!(!map.has_frame(FrameId::TXXX));
        assert!(map.is_empty());
    }

    #[test]
    fn test_size_matches_encoded_bytes() {
        let map: FramesMap = vec![
            Frame::text("TIT2", "Hello").unwrap(),
            Frame::text("TPE1", "Artist").unwrap(),
            Frame::comment("eng", "", "note"),
            Frame::text("TRDA", "dropped").unwrap(),
        ]
        .into_iter()
        .collect();

        let mut out = Vec::new();
        map.encode_all(&mut out).unwrap();
        assert_eq!(map.size(), out.len());
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_encoding_order_is_stable() {
        let mut a = FramesMap::new();
        a.add_frame(Frame::text("TPE1", "x").unwrap());
        a.add_frame(Frame::text("TALB", "y").unwrap());
        let mut b = FramesMap::new();
        b.add_frame(Frame::text("TALB", "y").unwrap());
        b.add_frame(Frame::text("TPE1", "x").unwrap());

        let (mut out_a, mut out_b) = (Vec::new(), Vec::new());
        a.encode_all(&mut out_a).unwrap();
        b.encode_all(&mut out_b).unwrap();
        assert_eq!(out_a, out_b);
        assert_eq!(a.ids().collect::<Vec<_>>(), vec![FrameId::TALB, FrameId::TPE1]);
    }

    #[test]
    fn test_replace_frames_with_empty_removes() {
        let mut map = FramesMap::new();
        map.add_frame(Frame::text("TIT2", "x").unwrap());
        map.replace_frames(FrameId::TIT2, Vec::new());
        assert!(!map.has_frame(FrameId::TIT2));
    }
}
