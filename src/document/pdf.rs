//! A4 PDF output through printpdf
use super::render::Renderer;
use crate::cast::CastEntry;
use crate::error::{Error, Result};
use printpdf::image_crate::{self, DynamicImage};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP_MARGIN: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 15.0;
const SIDE_MARGIN: f32 = 10.0;

const IMAGE_DPI: f32 = 300.0;
const MAX_FRAME_HEIGHT: f32 = 120.0;

/// First gallery row on the title sheet; 16 rows still clear the bottom margin
const CAST_TOP: f32 = 40.0;
const CAST_ROW_HEIGHT: f32 = 15.0;
const CAST_NAME_X: f32 = 40.0;
const CAST_CHARACTER_X: f32 = 120.0;
const CAST_THUMB_X: f32 = 15.0;
const CAST_THUMB_WIDTH: f32 = 8.0;
const TITLE_ADVANCE: f32 = 15.0;

const TEXT_LINE_HEIGHT: f32 = 8.0;
const TEXT_WRAP_CHARS: usize = 90;

const PT_TO_MM: f32 = 0.3528;

fn render_err(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}

/// Top-down cursor layout over A4 sheets with automatic page breaks
pub struct PdfRenderer {
    doc: Option<PdfDocumentReference>,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// The sheet created with the document has not been handed out yet
    first_sheet_unused: bool,
    sheets: usize,
    /// Distance from the top edge in mm
    cursor: f32,
}

impl PdfRenderer {
    pub fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(render_err)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc: Some(doc),
            layer,
            regular,
            bold,
            first_sheet_unused: true,
            sheets: 0,
            cursor: TOP_MARGIN,
        })
    }

    fn add_sheet(&mut self) -> Result<()> {
        let doc = self
            .doc
            .as_ref()
            .ok_or_else(|| Error::Render("document already written".to_string()))?;
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = doc.get_page(page).get_layer(layer);
        self.cursor = TOP_MARGIN;
        self.sheets += 1;
        Ok(())
    }

    /// Sheets started so far, automatic breaks included
    pub fn sheet_count(&self) -> usize {
        self.sheets
    }

    /// Break to a new sheet when `height` mm would cross the bottom margin
    fn ensure_space(&mut self, height: f32) -> Result<()> {
        if self.cursor + height > PAGE_HEIGHT - BOTTOM_MARGIN && self.cursor > TOP_MARGIN {
            self.add_sheet()?;
        }
        Ok(())
    }

    fn text_at(&self, text: &str, size_pt: f32, x: f32, top: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size_pt, Mm(x), Mm(PAGE_HEIGHT - top), font);
    }

    fn centered(&mut self, text: &str, size_pt: f32, advance: f32) -> Result<()> {
        self.ensure_space(advance)?;
        let x = ((PAGE_WIDTH - approx_text_width(text, size_pt)) / 2.0).max(SIDE_MARGIN);
        self.text_at(text, size_pt, x, self.cursor + size_pt * PT_TO_MM, true);
        self.cursor += advance;
        Ok(())
    }

    /// Place `image` with its top-left corner at (`x`, `top`), `width` mm wide.
    /// Returns the drawn height.
    fn place_image(&self, image: &DynamicImage, x: f32, top: f32, width: f32) -> f32 {
        let (px_w, px_h) = (image.width() as f32, image.height() as f32);
        let natural_width = px_w / IMAGE_DPI * 25.4;
        let scale = width / natural_width;
        let height = width * px_h / px_w;

        Image::from_dynamic_image(image).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(PAGE_HEIGHT - top - height)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        height
    }
}

impl Renderer for PdfRenderer {
    fn begin_page(&mut self) -> Result<()> {
        if self.first_sheet_unused {
            self.first_sheet_unused = false;
            self.cursor = TOP_MARGIN;
            self.sheets = 1;
            return Ok(());
        }
        self.add_sheet()
    }

    fn title(&mut self, text: &str) -> Result<()> {
        self.centered(text, 24.0, TITLE_ADVANCE)
    }

    fn heading(&mut self, text: &str) -> Result<()> {
        self.centered(text, 20.0, TITLE_ADVANCE)?;
        self.cursor = self.cursor.max(CAST_TOP);
        Ok(())
    }

    fn cast_entry(&mut self, entry: &CastEntry, thumbnail: Option<&Path>) -> Result<()> {
        self.ensure_space(CAST_ROW_HEIGHT)?;
        let baseline = self.cursor + CAST_ROW_HEIGHT / 2.0;

        self.text_at(&format!("Name: {}", entry.name), 8.0, CAST_NAME_X, baseline, true);
        self.text_at(&format!("Character: {}", entry.character), 8.0, CAST_CHARACTER_X, baseline, false);

        if let Some(path) = thumbnail {
            let image = open_rgb(path)?;
            self.place_image(&image, CAST_THUMB_X, self.cursor + 2.0, CAST_THUMB_WIDTH);
        }

        self.cursor += CAST_ROW_HEIGHT;
        Ok(())
    }

    fn frame_image(&mut self, path: &Path) -> Result<()> {
        let image = open_rgb(path)?;
        let full_width = PAGE_WIDTH - 2.0 * SIDE_MARGIN;
        let aspect = image.height() as f32 / image.width().max(1) as f32;
        let width = if full_width * aspect > MAX_FRAME_HEIGHT {
            MAX_FRAME_HEIGHT / aspect
        } else {
            full_width
        };

        self.ensure_space(width * aspect)?;
        let x = (PAGE_WIDTH - width) / 2.0;
        let height = self.place_image(&image, x, self.cursor, width);
        self.cursor += height + 4.0;
        Ok(())
    }

    fn text_block(&mut self, text: &str) -> Result<()> {
        for line in text.lines().flat_map(|l| wrap_text(l, TEXT_WRAP_CHARS)) {
            self.ensure_space(TEXT_LINE_HEIGHT)?;
            self.text_at(&line, 12.0, SIDE_MARGIN, self.cursor + 12.0 * PT_TO_MM, false);
            self.cursor += TEXT_LINE_HEIGHT;
        }
        self.cursor += 4.0;
        Ok(())
    }

    fn finish(&mut self, output: &Path) -> Result<()> {
        let doc = self
            .doc
            .take()
            .ok_or_else(|| Error::Render("document already written".to_string()))?;
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(output)?);
        doc.save(&mut writer).map_err(render_err)?;
        debug!("Wrote PDF to {}", output.display());
        Ok(())
    }
}

fn open_rgb(path: &Path) -> Result<DynamicImage> {
    let image = image_crate::open(path)
        .map_err(|e| Error::Render(format!("cannot read image {}: {}", path.display(), e)))?;
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

/// Helvetica averages roughly half an em per glyph
fn approx_text_width(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * 0.5 * PT_TO_MM
}

/// Greedy word wrap at `max_line_length` characters
pub fn wrap_text(text: &str, max_line_length: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.chars().count() + 1 + word.chars().count() <= max_line_length {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_crate::{Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three four", 9), vec!["one two", "three", "four"]);
        assert_eq!(wrap_text("   ", 10), Vec::<String>::new());
        assert_eq!(wrap_text("unbreakablewordlongerthanlimit", 5), vec!["unbreakablewordlongerthanlimit"]);
    }

    #[test]
    fn test_writes_pdf_file() {
        let dir = TempDir::new().unwrap();
        let frame_path = dir.path().join("screenshot-000.png");
        RgbImage::from_pixel(64, 36, Rgb([10, 20, 30])).save(&frame_path).unwrap();

        let output = dir.path().join("Final.pdf");
        let mut pdf = PdfRenderer::new("Inception").unwrap();
        pdf.begin_page().unwrap();
        pdf.title("Inception").unwrap();
        pdf.heading("Cast and Crew").unwrap();
        let entry = CastEntry {
            name: "Leonardo DiCaprio".to_string(),
            character: "Cobb".to_string(),
            image_url: None,
        };
        for _ in 0..40 {
            pdf.cast_entry(&entry, Some(&frame_path)).unwrap();
        }
        pdf.begin_page().unwrap();
        pdf.frame_image(&frame_path).unwrap();
        pdf.text_block(&"a long subtitle line ".repeat(200)).unwrap();
        pdf.finish(&output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(pdf.finish(&output).is_err());
    }

    #[test]
    fn test_full_gallery_group_fits_title_sheet() {
        let entry = CastEntry {
            name: "Tom Hardy".to_string(),
            character: "Eames".to_string(),
            image_url: None,
        };
        let mut pdf = PdfRenderer::new("Inception").unwrap();
        pdf.begin_page().unwrap();
        pdf.title("Inception").unwrap();
        pdf.heading("Cast and Crew").unwrap();
        for _ in 0..16 {
            pdf.cast_entry(&entry, None).unwrap();
        }
        assert_eq!(pdf.sheet_count(), 1);

        pdf.begin_page().unwrap();
        for _ in 0..16 {
            pdf.cast_entry(&entry, None).unwrap();
        }
        assert_eq!(pdf.sheet_count(), 2);
    }

    #[test]
    fn test_seventeenth_row_breaks_title_sheet() {
        let entry = CastEntry {
            name: "Tom Hardy".to_string(),
            character: "Eames".to_string(),
            image_url: None,
        };
        let mut pdf = PdfRenderer::new("Inception").unwrap();
        pdf.begin_page().unwrap();
        pdf.title("Inception").unwrap();
        pdf.heading("Cast and Crew").unwrap();
        for _ in 0..17 {
            pdf.cast_entry(&entry, None).unwrap();
        }
        assert_eq!(pdf.sheet_count(), 2);
    }

    #[test]
    fn test_missing_frame_image_is_render_error() {
        let mut pdf = PdfRenderer::new("x").unwrap();
        pdf.begin_page().unwrap();
        assert!(matches!(
            pdf.frame_image(Path::new("/nonexistent/screenshot-000.jpg")),
            Err(Error::Render(_))
        ));
    }
}
