//! Screenshot frames ordered by capture time
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One extracted screenshot on the video timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Elapsed whole seconds into the video
    pub timestamp_seconds: u64,
    /// Screenshot file
    pub image: PathBuf,
}

/// Zero-padding width for a timeline whose last timestamp is `max_seconds`.
/// All names in one directory share this width, so sorting names sorts time.
pub fn pad_width(max_seconds: u64, min_width: usize) -> usize {
    max_seconds.to_string().len().max(min_width)
}

/// `screenshot-007.jpg` style file name
pub fn screenshot_file_name(prefix: &str, seconds: u64, width: usize, extension: &str) -> String {
    format!("{}-{:0width$}.{}", prefix, seconds, extension, width = width)
}

/// Timestamp encoded in a screenshot file name, if it follows the scheme
pub fn parse_timestamp(file_name: &str) -> Option<u64> {
    let stem = file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name);
    let (_, digits) = stem.rsplit_once('-')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Lists the screenshots of a directory as an ordered timeline
#[derive(Debug, Clone)]
pub struct FrameTimeline {
    image_extensions: Vec<String>,
}

impl FrameTimeline {
    pub fn new(image_extensions: Vec<String>) -> Self {
        Self { image_extensions }
    }

    /// Recognized images in `dir`, sorted by file name
    pub fn list(&self, dir: &Path) -> Result<Vec<Frame>> {
        let mut named = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if self.is_image(name) {
                named.push((name.to_string(), entry.into_path()));
            }
        }

        named.sort_by(|a, b| a.0.cmp(&b.0));

        let mut frames = Vec::with_capacity(named.len());
        for (name, path) in named {
            match parse_timestamp(&name) {
                Some(timestamp_seconds) => frames.push(Frame {
                    timestamp_seconds,
                    image: path,
                }),
                None => warn!("Skipping image without a timestamp in its name: {}", name),
            }
        }

        debug!("Timeline of {} frames in {}", frames.len(), dir.display());
        Ok(frames)
    }

    fn is_image(&self, name: &str) -> bool {
        name.rsplit_once('.')
            .map(|(_, ext)| self.image_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn timeline() -> FrameTimeline {
        FrameTimeline::new(vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()])
    }

    #[test]
    fn test_file_name_padding() {
        assert_eq!(screenshot_file_name("screenshot", 7, pad_width(90, 3), "jpg"), "screenshot-007.jpg");
        assert_eq!(screenshot_file_name("screenshot", 7, pad_width(7200, 3), "jpg"), "screenshot-0007.jpg");
        assert_eq!(pad_width(12345, 3), 5);
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("screenshot-042.jpg"), Some(42));
        assert_eq!(parse_timestamp("screenshot-1200.PNG"), Some(1200));
        assert_eq!(parse_timestamp("cover.jpg"), None);
        assert_eq!(parse_timestamp("screenshot-abc.jpg"), None);
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in [
            "screenshot-010.jpg",
            "screenshot-000.jpg",
            "screenshot-005.JPEG",
            "notes.txt",
            "Final.pdf",
            "poster.png",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let frames = timeline().list(dir.path()).unwrap();
        let stamps: Vec<u64> = frames.iter().map(|f| f.timestamp_seconds).collect();
        assert_eq!(stamps, vec![0, 5, 10]);
        assert_eq!(frames[0].image, dir.path().join("screenshot-000.jpg"));
    }

    #[test]
    fn test_lexicographic_order_matches_time_with_shared_width() {
        let dir = TempDir::new().unwrap();
        let width = pad_width(1500, 3);
        for secs in [0u64, 500, 1000, 1500] {
            let name = screenshot_file_name("screenshot", secs, width, "jpg");
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let frames = timeline().list(dir.path()).unwrap();
        let stamps: Vec<u64> = frames.iter().map(|f| f.timestamp_seconds).collect();
        assert_eq!(stamps, vec![0, 500, 1000, 1500]);
    }

    #[test]
    fn test_list_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        assert!(timeline().list(&dir.path().join("missing")).is_err());
    }
}
