//! Time-indexed subtitle intervals and their lookup by frame time
use super::srt::{clock_seconds, parse_srt, parse_srt_file, SubtitleCue};
use crate::error::Result;
use scraper::Html;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// A cue's display span paired with its cleaned text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleInterval {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl SubtitleInterval {
    pub fn key(&self) -> IntervalKey {
        IntervalKey::new(self.start_seconds, self.end_seconds)
    }
}

/// Identity of an interval: its `(start, end)` pair, compared bit-for-bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalKey {
    start_bits: u64,
    end_bits: u64,
}

impl IntervalKey {
    pub fn new(start_seconds: f64, end_seconds: f64) -> Self {
        // fold -0.0 into 0.0 so both spell the same key
        let bits = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
        Self {
            start_bits: bits(start_seconds),
            end_bits: bits(end_seconds),
        }
    }

    pub fn start(&self) -> f64 {
        f64::from_bits(self.start_bits)
    }

    pub fn end(&self) -> f64 {
        f64::from_bits(self.end_bits)
    }
}

/// Ordered collection of subtitle intervals with unique `(start, end)` keys.
///
/// Iteration order is insertion order (cue order in the source file). Inserting
/// a key that already exists replaces its text in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubtitleIndex {
    intervals: Vec<SubtitleInterval>,
    #[serde(skip)]
    positions: HashMap<IntervalKey, usize>,
}

impl SubtitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from parsed cues
    pub fn build<'a, I>(cues: I) -> Self
    where
        I: IntoIterator<Item = &'a SubtitleCue>,
    {
        let mut index = Self::new();
        for cue in cues {
            index.insert(SubtitleInterval {
                start_seconds: clock_seconds(cue.start),
                end_seconds: clock_seconds(cue.end),
                text: clean_cue_text(&cue.text),
            });
        }
        debug!("Built subtitle index with {} intervals", index.len());
        index
    }

    /// Parse SRT content and build the index
    pub fn from_srt_str(content: &str) -> Result<Self> {
        let cues = parse_srt(content)?;
        Ok(Self::build(&cues))
    }

    /// Parse an SRT file and build the index
    pub fn from_srt_file(path: &Path) -> Result<Self> {
        let cues = parse_srt_file(path)?;
        let index = Self::build(&cues);
        info!("📜 Loaded {} subtitle intervals from {}", index.len(), path.display());
        Ok(index)
    }

    /// Insert an interval; a duplicate key overwrites the stored text
    pub fn insert(&mut self, interval: SubtitleInterval) {
        let key = interval.key();
        match self.positions.get(&key) {
            Some(&pos) => self.intervals[pos].text = interval.text,
            None => {
                self.positions.insert(key, self.intervals.len());
                self.intervals.push(interval);
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubtitleInterval> {
        self.intervals.iter()
    }

    pub fn get(&self, key: &IntervalKey) -> Option<&SubtitleInterval> {
        self.positions.get(key).map(|&pos| &self.intervals[pos])
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

impl<'a> IntoIterator for &'a SubtitleIndex {
    type Item = &'a SubtitleInterval;
    type IntoIter = std::slice::Iter<'a, SubtitleInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

/// Strip markup and keep only characters the PDF fonts can encode (Latin-1).
/// Characters outside that range are dropped, not substituted.
pub fn clean_cue_text(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let plain: String = fragment.root_element().text().collect();
    plain.chars().filter(|c| (*c as u32) < 256).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cue(start_ms: u64, end_ms: u64, text: &str) -> SubtitleCue {
        SubtitleCue::new(0, Duration::from_millis(start_ms), Duration::from_millis(end_ms), text)
    }

    #[test]
    fn test_clean_cue_text_strips_markup() {
        assert_eq!(clean_cue_text("<i>Hello</i> <b>there</b>"), "Hello there");
        assert_eq!(clean_cue_text("<font color=\"#ff0000\">Red</font>\nline"), "Red\nline");
        assert_eq!(clean_cue_text("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_clean_cue_text_drops_non_latin1() {
        assert_eq!(clean_cue_text("Café ♪ 東京"), "Café  ");
        assert_eq!(clean_cue_text("naïve ½"), "naïve ½");
    }

    #[test]
    fn test_build_converts_times_to_seconds() {
        let index = SubtitleIndex::build(&[cue(10_000, 12_500, "<i>Hello</i>")]);
        let interval = index.iter().next().unwrap();
        assert_eq!(interval.start_seconds, 10.0);
        assert_eq!(interval.end_seconds, 12.5);
        assert_eq!(interval.text, "Hello");
    }

    #[test]
    fn test_duplicate_key_overwrites_text_in_place() {
        let cues = [cue(1_000, 2_000, "first"), cue(3_000, 4_000, "middle"), cue(1_000, 2_000, "last")];
        let index = SubtitleIndex::build(&cues);
        assert_eq!(index.len(), 2);
        let texts: Vec<&str> = index.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["last", "middle"]);
        assert_eq!(index.get(&IntervalKey::new(1.0, 2.0)).unwrap().text, "last");
    }

    #[test]
    fn test_build_is_idempotent() {
        let content = "1\n00:00:01,000 --> 00:00:02,000\n<i>One</i>\n\n2\n00:00:02,000 --> 00:00:05,000\nTwo ♫\n";
        let first = SubtitleIndex::from_srt_str(content).unwrap();
        let second = SubtitleIndex::from_srt_str(content).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_interval_key_roundtrip() {
        let key = IntervalKey::new(10.25, 12.0);
        assert_eq!(key.start(), 10.25);
        assert_eq!(key.end(), 12.0);
        assert_eq!(IntervalKey::new(-0.0, 1.0), IntervalKey::new(0.0, 1.0));
    }
}
