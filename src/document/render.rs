//! Walks an assembled document onto a drawing surface
use super::{Document, Page};
use crate::cast::thumbnail::load_thumbnail;
use crate::cast::{CastEntry, ThumbnailFetcher};
use crate::error::Result;
use std::path::Path;
use tracing::{info, warn};

pub const CAST_HEADING: &str = "Cast and Crew";

/// Drawing surface a [`Document`] is rendered onto.
///
/// Implementations lay content out top to bottom and break pages on their
/// own when something does not fit.
pub trait Renderer {
    /// Start a new sheet
    fn begin_page(&mut self) -> Result<()>;

    fn title(&mut self, text: &str) -> Result<()>;

    fn heading(&mut self, text: &str) -> Result<()>;

    /// One gallery row; `thumbnail` is a normalized portrait when available
    fn cast_entry(&mut self, entry: &CastEntry, thumbnail: Option<&Path>) -> Result<()>;

    /// A screenshot at full content width
    fn frame_image(&mut self, path: &Path) -> Result<()>;

    /// Flowing multi-line text
    fn text_block(&mut self, text: &str) -> Result<()>;

    /// Write the output file
    fn finish(&mut self, output: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub sheets_started: usize,
    pub thumbnails_embedded: usize,
    pub thumbnails_skipped: usize,
    pub frames_rendered: usize,
}

/// Walk `doc` page by page onto `renderer`, then write it to `output`.
///
/// The first gallery page shares the title sheet. A portrait that cannot be
/// fetched or decoded is logged and its entry is drawn as text only.
pub async fn render_document(
    doc: &Document,
    renderer: &mut dyn Renderer,
    fetcher: &dyn ThumbnailFetcher,
    thumbnail_size: (u32, u32),
    output: &Path,
) -> Result<RenderStats> {
    let mut stats = RenderStats::default();
    let has_gallery = doc.gallery_pages().next().is_some();

    for page in &doc.pages {
        match page {
            Page::Title { title } => {
                renderer.begin_page()?;
                stats.sheets_started += 1;
                renderer.title(title)?;
                if has_gallery {
                    renderer.heading(CAST_HEADING)?;
                }
            }
            Page::Gallery(gallery) => {
                if gallery.number > 1 {
                    renderer.begin_page()?;
                    stats.sheets_started += 1;
                }
                for entry in &gallery.entries {
                    let Some(url) = entry.image_url.as_deref() else {
                        renderer.cast_entry(entry, None)?;
                        continue;
                    };

                    match load_thumbnail(fetcher, url, thumbnail_size.0, thumbnail_size.1).await {
                        Ok(thumbnail) => {
                            renderer.cast_entry(entry, Some(thumbnail.path()))?;
                            stats.thumbnails_embedded += 1;
                        }
                        Err(e) => {
                            warn!("Failed to load image for {}: {}", entry.name, e);
                            renderer.cast_entry(entry, None)?;
                            stats.thumbnails_skipped += 1;
                        }
                    }
                }
            }
            Page::Frames(frame_page) => {
                renderer.begin_page()?;
                stats.sheets_started += 1;
                for aligned in &frame_page.frames {
                    renderer.frame_image(&aligned.frame.image)?;
                    if !aligned.text.is_empty() {
                        renderer.text_block(&aligned.text)?;
                    }
                    stats.frames_rendered += 1;
                }
            }
        }
    }

    renderer.finish(output)?;
    info!(
        "📄 Rendered {} frames, {} portraits ({} skipped) to {}",
        stats.frames_rendered,
        stats.thumbnails_embedded,
        stats.thumbnails_skipped,
        output.display()
    );
    Ok(stats)
}
