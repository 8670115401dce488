//! Subshot - illustrated movie digests
//!
//! Takes periodic screenshots of a video, downloads a matching subtitle and
//! the cast list, and lays it all out as a single PDF: a cast gallery followed
//! by the screenshots, two per page, each captioned with the subtitle lines
//! spoken around it.

pub mod alignment;
pub mod cast;
pub mod config;
pub mod document;
pub mod error;
pub mod filename;
pub mod pipeline;
pub mod subtitles;
pub mod timeline;
pub mod video;

// Re-export main types for easy access
pub use crate::alignment::{align, align_frame, interval_matches, ConsumedSet, FrameAlignment};
pub use crate::cast::{build_pages, CastEntry, CastTable, GalleryPage, ImdbScraper};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::document::{assemble, render_document, Document, Page, PdfRenderer, Renderer};
pub use crate::error::{Error, Result};
pub use crate::filename::MovieInfo;
pub use crate::pipeline::{build_document, Pipeline, PipelineOutcome, PipelineRequest};
pub use crate::subtitles::{IntervalKey, SubdlClient, SubtitleIndex, SubtitleInterval};
pub use crate::timeline::{Frame, FrameTimeline};
pub use crate::video::VideoProcessor;
