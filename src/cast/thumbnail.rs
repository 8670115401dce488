use crate::config::HttpConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ColorType;
use reqwest::Client;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::debug;

/// Source of raw cast portrait bytes
#[async_trait]
pub trait ThumbnailFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches portraits over HTTP
pub struct HttpThumbnailFetcher {
    client: Client,
}

impl HttpThumbnailFetcher {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .user_agent(http.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ThumbnailFetcher for HttpThumbnailFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::external("thumbnail", format!("HTTP {} for {}", response.status(), url)));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// A normalized portrait living in a scratch file.
/// The file is deleted when the thumbnail is dropped.
#[derive(Debug)]
pub struct Thumbnail {
    file: NamedTempFile,
    width: u32,
    height: u32,
}

impl Thumbnail {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Decode, force RGB, resize to exactly `width` x `height` (no crop) and
/// re-encode as JPEG into a scratch file
pub fn normalize(bytes: &[u8], width: u32, height: u32) -> Result<Thumbnail> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded.to_rgb8();
    let resized = image::imageops::resize(&rgb, width, height, FilterType::Lanczos3);

    let file = tempfile::Builder::new()
        .prefix("cast-")
        .suffix(".jpg")
        .tempfile()?;
    let mut writer = BufWriter::new(file.as_file());
    JpegEncoder::new_with_quality(&mut writer, 100).encode(resized.as_raw(), width, height, ColorType::Rgb8)?;
    writer.flush()?;
    drop(writer);

    debug!("Normalized thumbnail to {}x{} at {}", width, height, file.path().display());
    Ok(Thumbnail { file, width, height })
}

/// Fetch and normalize one portrait. Any failure is reported as
/// `RenderRecoverable` so the caller can fall back to a text-only entry.
pub async fn load_thumbnail(
    fetcher: &dyn ThumbnailFetcher,
    url: &str,
    width: u32,
    height: u32,
) -> Result<Thumbnail> {
    let bytes = fetcher
        .fetch(url)
        .await
        .map_err(|e| Error::RenderRecoverable(format!("{}: {}", url, e)))?;
    normalize(&bytes, width, height).map_err(|e| Error::RenderRecoverable(format!("{}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 128]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    struct StaticFetcher(Option<Vec<u8>>);

    #[async_trait]
    impl ThumbnailFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.0
                .clone()
                .ok_or_else(|| Error::external("thumbnail", format!("unreachable: {}", url)))
        }
    }

    #[test]
    fn test_normalize_produces_fixed_dimensions() {
        let thumb = normalize(&png_bytes(120, 60), 350, 400).unwrap();
        assert_eq!(thumb.dimensions(), (350, 400));

        let reopened = image::open(thumb.path()).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (350, 400));
    }

    #[test]
    fn test_scratch_file_removed_on_drop() {
        let thumb = normalize(&png_bytes(10, 10), 35, 40).unwrap();
        let path = thumb.path().to_path_buf();
        assert!(path.exists());
        drop(thumb);
        assert!(!path.exists());
    }

    #[test]
    fn test_normalize_rejects_non_images() {
        assert!(matches!(normalize(b"<html>404</html>", 35, 40), Err(Error::Image(_))));
    }

    #[tokio::test]
    async fn test_load_thumbnail_failures_are_recoverable() {
        let err = load_thumbnail(&StaticFetcher(None), "https://img/missing.jpg", 35, 40)
            .await
            .unwrap_err();
        assert!(err.is_recoverable());

        let err = load_thumbnail(&StaticFetcher(Some(b"garbage".to_vec())), "https://img/bad.jpg", 35, 40)
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_load_thumbnail_success() {
        let thumb = load_thumbnail(&StaticFetcher(Some(png_bytes(8, 8))), "https://img/ok.png", 35, 40)
            .await
            .unwrap();
        assert_eq!(thumb.dimensions(), (35, 40));
    }
}
