//! Frame-to-subtitle alignment
//!
//! A frame at `t` picks up every subtitle interval whose span intersects
//! `[t - tolerance, t + tolerance]`. Each interval is handed out at most once
//! per document: the caller threads one `ConsumedSet` through every frame of a
//! build, so a cue spanning several frames is only captioned on the first.
use crate::subtitles::{IntervalKey, SubtitleIndex, SubtitleInterval};
use std::collections::HashSet;

/// Interval keys already attached to some frame in the current build
#[derive(Debug, Clone, Default)]
pub struct ConsumedSet {
    keys: HashSet<IntervalKey>,
}

impl ConsumedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &IntervalKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns false if the key was already consumed
    pub fn consume(&mut self, key: IntervalKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Result of aligning one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameAlignment {
    /// Keys consumed by this frame, in index order
    pub keys: Vec<IntervalKey>,
    /// Matched texts joined with newlines; empty when nothing matched
    pub text: String,
}

/// `start <= t + tolerance && end >= t - tolerance`, both bounds inclusive
pub fn interval_matches(interval: &SubtitleInterval, timestamp_seconds: f64, tolerance: f64) -> bool {
    interval.start_seconds <= timestamp_seconds + tolerance
        && interval.end_seconds >= timestamp_seconds - tolerance
}

/// Align one frame and record what it consumed
pub fn align_frame(
    timestamp_seconds: u64,
    index: &SubtitleIndex,
    consumed: &mut ConsumedSet,
    tolerance: f64,
) -> FrameAlignment {
    let t = timestamp_seconds as f64;
    let mut keys = Vec::new();
    let mut texts = Vec::new();

    for interval in index {
        if !interval_matches(interval, t, tolerance) {
            continue;
        }
        let key = interval.key();
        if consumed.consume(key) {
            keys.push(key);
            texts.push(interval.text.as_str());
        }
    }

    FrameAlignment {
        keys,
        text: texts.join("\n"),
    }
}

/// Matched subtitle text for a frame; consumes the matched intervals
pub fn align(timestamp_seconds: u64, index: &SubtitleIndex, consumed: &mut ConsumedSet, tolerance: f64) -> String {
    align_frame(timestamp_seconds, index, consumed, tolerance).text
}
