//! Document model and assembly
//!
//! A document is a title page, the cast gallery pages, then the screenshots
//! two per page with their aligned subtitle text. Assembly is pure; writing
//! the result to disk is done by a [`Renderer`].

pub mod pdf;
pub mod render;

pub use pdf::PdfRenderer;
pub use render::{render_document, RenderStats, Renderer};

use crate::alignment::{align_frame, ConsumedSet};
use crate::cast::GalleryPage;
use crate::subtitles::SubtitleIndex;
use crate::timeline::Frame;
use tracing::debug;

/// Screenshots per frame page
pub const FRAMES_PER_PAGE: usize = 2;

/// A screenshot together with the subtitle text aligned to it
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFrame {
    pub frame: Frame,
    /// Empty when no unconsumed subtitle matched
    pub text: String,
}

/// One or two aligned frames
#[derive(Debug, Clone, PartialEq)]
pub struct FramePage {
    /// 1-based among frame pages
    pub number: usize,
    pub frames: Vec<AlignedFrame>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Title { title: String },
    Gallery(GalleryPage),
    Frames(FramePage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn gallery_pages(&self) -> impl Iterator<Item = &GalleryPage> {
        self.pages.iter().filter_map(|p| match p {
            Page::Gallery(g) => Some(g),
            _ => None,
        })
    }

    pub fn frame_pages(&self) -> impl Iterator<Item = &FramePage> {
        self.pages.iter().filter_map(|p| match p {
            Page::Frames(f) => Some(f),
            _ => None,
        })
    }

    /// Every aligned frame in document order
    pub fn aligned_frames(&self) -> impl Iterator<Item = &AlignedFrame> {
        self.frame_pages().flat_map(|p| p.frames.iter())
    }
}

/// Build the page sequence. One `ConsumedSet` spans the whole build, so each
/// subtitle interval is attached to at most one frame of the document.
pub fn assemble(
    title: &str,
    cast_pages: Vec<GalleryPage>,
    frames: &[Frame],
    index: &SubtitleIndex,
    tolerance: f64,
) -> Document {
    let mut consumed = ConsumedSet::new();
    let mut pages = Vec::with_capacity(1 + cast_pages.len() + frames.len().div_ceil(FRAMES_PER_PAGE));

    pages.push(Page::Title {
        title: title.to_string(),
    });
    pages.extend(cast_pages.into_iter().map(Page::Gallery));

    for (i, chunk) in frames.chunks(FRAMES_PER_PAGE).enumerate() {
        let aligned = chunk
            .iter()
            .map(|frame| AlignedFrame {
                frame: frame.clone(),
                text: align_frame(frame.timestamp_seconds, index, &mut consumed, tolerance).text,
            })
            .collect();
        pages.push(Page::Frames(FramePage {
            number: i + 1,
            frames: aligned,
        }));
    }

    debug!(
        "Assembled {} pages, {} of {} subtitle intervals used",
        pages.len(),
        consumed.len(),
        index.len()
    );

    Document {
        title: title.to_string(),
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::{build_pages, CastEntry};
    use crate::subtitles::SubtitleInterval;
    use std::path::PathBuf;

    fn frames(timestamps: &[u64]) -> Vec<Frame> {
        timestamps
            .iter()
            .map(|t| Frame {
                timestamp_seconds: *t,
                image: PathBuf::from(format!("screenshot-{:03}.jpg", t)),
            })
            .collect()
    }

    fn index_of(intervals: &[(f64, f64, &str)]) -> SubtitleIndex {
        let mut index = SubtitleIndex::new();
        for (start, end, text) in intervals {
            index.insert(SubtitleInterval {
                start_seconds: *start,
                end_seconds: *end,
                text: text.to_string(),
            });
        }
        index
    }

    #[test]
    fn test_seven_frames_make_four_pages() {
        let doc = assemble("Movie", Vec::new(), &frames(&[0, 5, 10, 15, 20, 25, 30]), &SubtitleIndex::new(), 2.5);
        let pages: Vec<_> = doc.frame_pages().collect();
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[3].frames.len(), 1);
        assert_eq!(pages[3].frames[0].frame.timestamp_seconds, 30);
        assert!(pages[..3].iter().all(|p| p.frames.len() == 2));
    }

    #[test]
    fn test_frame_page_count() {
        for m in 0..12u64 {
            let ts: Vec<u64> = (0..m).map(|i| i * 5).collect();
            let doc = assemble("Movie", Vec::new(), &frames(&ts), &SubtitleIndex::new(), 2.5);
            assert_eq!(doc.frame_pages().count(), (m as usize).div_ceil(2), "m={}", m);
            assert_eq!(doc.aligned_frames().count(), m as usize);
        }
    }

    #[test]
    fn test_page_order() {
        let cast: Vec<CastEntry> = (0..20)
            .map(|i| CastEntry {
                name: format!("Actor {}", i),
                character: String::new(),
                image_url: None,
            })
            .collect();
        let gallery = build_pages(&cast, 16).unwrap();
        let doc = assemble("Movie", gallery, &frames(&[0, 5, 10]), &SubtitleIndex::new(), 2.5);

        assert!(matches!(&doc.pages[0], Page::Title { title } if title == "Movie"));
        assert!(matches!(&doc.pages[1], Page::Gallery(g) if g.number == 1 && g.entries.len() == 16));
        assert!(matches!(&doc.pages[2], Page::Gallery(g) if g.number == 2 && g.entries.len() == 4));
        assert!(matches!(&doc.pages[3], Page::Frames(f) if f.number == 1));
        assert!(matches!(&doc.pages[4], Page::Frames(f) if f.number == 2 && f.frames.len() == 1));
        assert_eq!(doc.pages.len(), 5);
    }

    #[test]
    fn test_consumption_spans_pages() {
        // [10, 12] matches frames at 10 and 15 (tolerance 2.5) but only the first keeps it
        let index = index_of(&[(10.0, 12.0, "Hello"), (14.0, 16.0, "World")]);
        let doc = assemble("Movie", Vec::new(), &frames(&[0, 10, 15, 20]), &index, 2.5);
        let texts: Vec<&str> = doc.aligned_frames().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["", "Hello", "World", ""]);
    }

    #[test]
    fn test_reassembly_is_deterministic() {
        let index = index_of(&[(1.0, 3.0, "a"), (4.0, 9.0, "b"), (8.0, 12.0, "c")]);
        let fs = frames(&[0, 5, 10, 15]);
        assert_eq!(assemble("M", Vec::new(), &fs, &index, 2.5), assemble("M", Vec::new(), &fs, &index, 2.5));
    }
}
