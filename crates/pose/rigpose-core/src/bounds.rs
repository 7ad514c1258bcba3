//! Running min/max frame numbers per rig, used to size animation timelines.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i32,
    pub end: i32,
    /// Number of frames observed (not `end - start + 1`; streams may have gaps).
    pub frames: u32,
}

impl FrameRange {
    fn single(frame: i32) -> Self {
        Self {
            start: frame,
            end: frame,
            frames: 1,
        }
    }

    fn include(&mut self, frame: i32) {
        self.start = self.start.min(frame);
        self.end = self.end.max(frame);
        self.frames = self.frames.saturating_add(1);
    }

    fn merge(&mut self, other: &FrameRange) {
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
        self.frames = self.frames.saturating_add(other.frames);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameBounds {
    rigs: HashMap<String, FrameRange>,
}

impl FrameBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, rig_id: &str, frame: i32) {
        match self.rigs.get_mut(rig_id) {
            Some(range) => range.include(frame),
            None => {
                self.rigs.insert(rig_id.to_string(), FrameRange::single(frame));
            }
        }
    }

    #[inline]
    pub fn get(&self, rig_id: &str) -> Option<FrameRange> {
        self.rigs.get(rig_id).copied()
    }

    /// Range across every rig.
    pub fn global(&self) -> Option<FrameRange> {
        let mut iter = self.rigs.values();
        let mut acc = *iter.next()?;
        for range in iter {
            acc.merge(range);
        }
        Some(acc)
    }

    /// `(rig_id, range)` pairs sorted by rig id.
    pub fn rigs(&self) -> Vec<(&str, FrameRange)> {
        let mut rigs: Vec<(&str, FrameRange)> =
            self.rigs.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        rigs.sort_by(|a, b| a.0.cmp(b.0));
        rigs
    }

    pub fn merge(&mut self, other: &FrameBounds) {
        for (rig, range) in &other.rigs {
            match self.rigs.get_mut(rig) {
                Some(existing) => existing.merge(range),
                None => {
                    self.rigs.insert(rig.clone(), *range);
                }
            }
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rigs.is_empty()
    }
}
