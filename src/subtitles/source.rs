//! subdl.com scraper: finds and downloads a subtitle archive for a release
use crate::config::{HttpConfig, SubtitleConfig};
use crate::error::{Error, Result};
use crate::filename::MovieInfo;
use reqwest::Client;
use scraper::{Html, Selector};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use zip::ZipArchive;

const SERVICE: &str = "subdl";

/// Subtitle site client
#[derive(Clone)]
pub struct SubdlClient {
    client: Client,
    config: SubtitleConfig,
}

impl SubdlClient {
    pub fn new(config: SubtitleConfig, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .user_agent(http.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    /// Find, download and unpack the subtitle for `movie` into `dest_dir`.
    /// Returns the path of the extracted `.srt` file.
    pub async fn fetch_subtitle(&self, movie: &MovieInfo, dest_dir: &Path) -> Result<PathBuf> {
        info!("🔍 Searching subtitles for: {} ({} {})", movie.name, movie.quality, movie.kind);

        let search_url = format!(
            "{}/search?query={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&movie.search_slug())
        );
        let search_html = self.get_html(&search_url).await?;

        let pages = extract_subtitle_pages(&search_html);
        let Some(page) = pages.first() else {
            return Err(Error::NotFound(format!("no subtitles listed for '{}'", movie.name)));
        };
        debug!("Found {} subtitle pages, using {}", pages.len(), page);

        let language_url = format!(
            "{}/{}",
            self.absolute_url(page)?.trim_end_matches('/'),
            self.config.language
        );
        let language_html = self.get_html(&language_url).await?;

        let links = extract_download_links(
            &language_html,
            &self.config.download_prefix,
            &movie.quality,
            &movie.kind,
        );
        let Some(download_url) = links.first() else {
            return Err(Error::NotFound(format!(
                "no {} subtitle matching {} {}",
                self.config.language, movie.quality, movie.kind
            )));
        };

        info!("⬇️ Downloading subtitle archive: {}", download_url);
        let response = self
            .client
            .get(download_url)
            .send()
            .await
            .map_err(|e| Error::external(SERVICE, e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::external(
                SERVICE,
                format!("HTTP {} for {}", response.status(), download_url),
            ));
        }
        let archive = response
            .bytes()
            .await
            .map_err(|e| Error::external(SERVICE, e.to_string()))?;

        let srt_path = extract_srt(&archive, dest_dir)?;
        info!("✅ Subtitle saved to: {}", srt_path.display());
        Ok(srt_path)
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::external(SERVICE, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::external(SERVICE, format!("HTTP {} for {}", response.status(), url)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::external(SERVICE, e.to_string()))
    }

    fn absolute_url(&self, href: &str) -> Result<String> {
        let base = Url::parse(&self.config.base_url)
            .map_err(|e| Error::Config(format!("invalid subtitles base_url: {}", e)))?;
        base.join(href)
            .map(String::from)
            .map_err(|e| Error::external(SERVICE, format!("bad link '{}': {}", href, e)))
    }
}

/// Unique `/subtitle/` links on a search result page, in page order
pub fn extract_subtitle_pages(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut pages: Vec<String> = Vec::new();
    for link in document.select(&selector) {
        if let Some(href) = link.value().attr("href") {
            if href.contains("/subtitle/") && !pages.iter().any(|p| p == href) {
                pages.push(href.to_string());
            }
        }
    }
    pages
}

/// Direct download links whose label mentions `quality`.
///
/// Labels are lowercased with dashes removed before matching. Links whose
/// label also mentions `kind` are ordered first; page order is kept otherwise.
pub fn extract_download_links(html: &str, download_prefix: &str, quality: &str, kind: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(&format!("a[href^=\"{}\"]", download_prefix)) else {
        warn!("Invalid download prefix selector: {}", download_prefix);
        return Vec::new();
    };

    let quality = quality.to_lowercase();
    let kind = kind.to_lowercase();

    let mut preferred = Vec::new();
    let mut others = Vec::new();
    for link in document.select(&selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if href.contains("info") || href.contains("ubitle/sd") {
            continue;
        }

        let label = link
            .text()
            .collect::<String>()
            .to_lowercase()
            .trim()
            .replace('-', "");
        if !label.contains(&quality) {
            continue;
        }

        if label.contains(&kind) {
            preferred.push(href.to_string());
        } else {
            others.push(href.to_string());
        }
    }

    preferred.extend(others);
    preferred
}

/// Write the first `.srt` entry of a zip archive into `dest_dir`
pub fn extract_srt(archive_bytes: &[u8], dest_dir: &Path) -> Result<PathBuf> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))?;
    std::fs::create_dir_all(dest_dir)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.is_file() || !entry.name().to_ascii_lowercase().ends_with(".srt") {
            continue;
        }

        // Flatten into dest_dir; reject entries that escape the archive root
        let Some(file_name) = entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()))
        else {
            warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };

        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;

        let target = dest_dir.join(file_name);
        std::fs::write(&target, contents)?;
        return Ok(target);
    }

    Err(Error::NotFound("subtitle archive contains no .srt file".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <a href="/">Home</a>
          <a href="/subtitle/sd123/inception">Inception (2010)</a>
          <a href="/subtitle/sd123/inception">Inception poster</a>
          <a href="/subtitle/sd999/inception-2">Inception 2</a>
        </body></html>"#;

    const LANGUAGE_PAGE: &str = r#"
        <html><body>
          <a href="https://dl.subdl.com/subtitle/info/1">Info 1080p</a>
          <a href="https://dl.subdl.com/subtitle/1-720.zip">Inception.2010.720p.BluRay</a>
          <a href="https://dl.subdl.com/subtitle/2-1080-web.zip">Inception.2010.1080p.WEB-DL</a>
          <a href="https://dl.subdl.com/subtitle/3-1080-br.zip">Inception.2010.1080p.Blu-Ray.x264</a>
          <a href="https://example.com/subtitle/4.zip">Inception 1080p BluRay mirror</a>
        </body></html>"#;

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, body) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_subtitle_pages_dedupes_in_order() {
        let pages = extract_subtitle_pages(SEARCH_PAGE);
        assert_eq!(pages, vec!["/subtitle/sd123/inception", "/subtitle/sd999/inception-2"]);
    }

    #[test]
    fn test_extract_download_links_filters_quality_and_prefers_type() {
        let links = extract_download_links(LANGUAGE_PAGE, "https://dl.subdl.com/subtitle/", "1080P", "Bluray");
        assert_eq!(
            links,
            vec![
                "https://dl.subdl.com/subtitle/3-1080-br.zip",
                "https://dl.subdl.com/subtitle/2-1080-web.zip",
            ]
        );
    }

    #[test]
    fn test_extract_download_links_none_matching() {
        let links = extract_download_links(LANGUAGE_PAGE, "https://dl.subdl.com/subtitle/", "2160P", "Bluray");
        assert!(links.is_empty());
    }

    #[test]
    fn test_extract_srt_picks_first_srt_entry() {
        let dir = TempDir::new().unwrap();
        let archive = zip_with(&[
            ("readme.txt", "hello"),
            ("subs/Inception.srt", "1\n00:00:01,000 --> 00:00:02,000\nHi\n"),
            ("other.srt", "ignored"),
        ]);

        let path = extract_srt(&archive, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("Inception.srt"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("Hi"));
        assert!(!dir.path().join("other.srt").exists());
    }

    #[test]
    fn test_extract_srt_without_subtitles() {
        let dir = TempDir::new().unwrap();
        let archive = zip_with(&[("readme.txt", "hello")]);
        assert!(matches!(extract_srt(&archive, dir.path()), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_extract_srt_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(extract_srt(b"not a zip", dir.path()), Err(Error::Zip(_))));
    }
}
